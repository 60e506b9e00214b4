use crate::consensus::quorum::verify_commit;
use crate::error::VerificationError;
use crate::types::commit::{Commit, SignedHeader};
use crate::types::validator::ValidatorSet;

/// Something that can decide whether a commit is valid for one chain.
pub trait Certifier {
    fn chain_id(&self) -> &str;

    /// The currently trusted validator set.
    fn validators(&self) -> &ValidatorSet;

    /// Hash of the currently trusted validator set.
    fn hash(&self) -> [u8; 32];

    /// Verify `commit` against the trusted validator set.
    fn certify(&mut self, commit: &Commit) -> Result<(), VerificationError>;
}

/// Certifies commits against one fixed validator set.
///
/// Verification never mutates the certifier, so [`StaticCertifier::verify`]
/// can be shared freely across threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticCertifier {
    chain_id: String,
    validators: ValidatorSet,
    validators_hash: [u8; 32],
}

impl StaticCertifier {
    pub fn new(chain_id: impl Into<String>, validators: ValidatorSet) -> Self {
        let validators_hash = validators.hash();
        Self {
            chain_id: chain_id.into(),
            validators,
            validators_hash,
        }
    }

    /// Check that `commit` carries a quorum of the trusted set for its block.
    pub fn verify(&self, commit: &Commit) -> Result<(), VerificationError> {
        verify_commit(
            &self.validators,
            &self.chain_id,
            &commit.block_id,
            commit.height,
            commit,
        )
    }

    /// Like [`StaticCertifier::verify`], but also checks that the header
    /// belongs to this chain and was produced by exactly the trusted set.
    pub fn verify_header(&self, signed_header: &SignedHeader) -> Result<(), VerificationError> {
        signed_header.validate_basic(&self.chain_id)?;

        let got = signed_header.validators_hash();
        if got != self.validators_hash {
            return Err(VerificationError::ValidatorsChanged {
                expected: hex::encode(self.validators_hash),
                got: hex::encode(got),
            });
        }

        self.verify(&signed_header.commit)
    }
}

impl Certifier for StaticCertifier {
    fn chain_id(&self) -> &str {
        &self.chain_id
    }

    fn validators(&self) -> &ValidatorSet {
        &self.validators
    }

    fn hash(&self) -> [u8; 32] {
        self.validators_hash
    }

    fn certify(&mut self, commit: &Commit) -> Result<(), VerificationError> {
        self.verify(commit)
    }
}
