use serde::{Deserialize, Serialize};

use crate::consensus::quorum::verify_commit;
use crate::crypto::{merkle_root, sha256_hash, uint64_to_leaf};
use crate::error::VerificationError;
use crate::types::validator::ValidatorSet;
use crate::types::vote::{BlockId, Vote};

/// A block header, reduced to the fields the light client needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub chain_id: String,
    pub height: u64,
    /// Hash of the validator set that signs this block.
    pub validators_hash: [u8; 32],
    /// Hash of the validator set that signs the next block.
    pub next_validators_hash: [u8; 32],
    pub app_hash: [u8; 32],
    pub consensus_hash: [u8; 32],
    pub last_results_hash: [u8; 32],
    pub last_block_hash: [u8; 32],
}

impl Header {
    /// Merkle root of the header fields, in declaration order.
    pub fn hash(&self) -> [u8; 32] {
        let leaves = [
            sha256_hash(self.chain_id.as_bytes()),
            uint64_to_leaf(self.height),
            self.validators_hash,
            self.next_validators_hash,
            self.app_hash,
            self.consensus_hash,
            self.last_results_hash,
            self.last_block_hash,
        ];
        merkle_root(&leaves)
    }
}

/// The precommits that finalized a block at a height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub height: u64,
    pub block_id: BlockId,
    /// One slot per validator index; `None` where the validator did not sign.
    pub precommits: Vec<Option<Vote>>,
}

impl Commit {
    /// Round of the first present precommit.
    pub fn round(&self) -> Option<u32> {
        self.votes().next().map(|vote| vote.round)
    }

    /// Present votes in slot order.
    pub fn votes(&self) -> impl Iterator<Item = &Vote> {
        self.precommits.iter().flatten()
    }

    pub fn size(&self) -> usize {
        self.precommits.len()
    }
}

/// A header together with the commit that signed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedHeader {
    pub header: Header,
    pub commit: Commit,
}

impl SignedHeader {
    pub fn height(&self) -> u64 {
        self.header.height
    }

    pub fn validators_hash(&self) -> [u8; 32] {
        self.header.validators_hash
    }

    /// Check the header and commit refer to each other on the expected chain.
    pub fn validate_basic(&self, chain_id: &str) -> Result<(), VerificationError> {
        if self.header.chain_id != chain_id {
            return Err(VerificationError::ValidationFailed(format!(
                "header chain id {:?} does not match {:?}",
                self.header.chain_id, chain_id
            )));
        }

        if self.commit.height != self.header.height {
            return Err(VerificationError::ValidationFailed(format!(
                "commit height {} does not match header height {}",
                self.commit.height, self.header.height
            )));
        }

        if self.commit.block_id.is_zero() {
            return Err(VerificationError::ValidationFailed(
                "commit is for a nil block".into(),
            ));
        }

        let header_hash = self.header.hash();
        if self.commit.block_id.hash != header_hash {
            return Err(VerificationError::ValidationFailed(format!(
                "commit signs block {} but header hashes to {}",
                hex::encode(self.commit.block_id.hash),
                hex::encode(header_hash)
            )));
        }

        Ok(())
    }
}

/// A signed header plus the validator set that produced it.
/// This is the evidence required to move a certifier to a new validator set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullCommit {
    pub signed_header: SignedHeader,
    pub validators: ValidatorSet,
}

impl FullCommit {
    pub fn new(signed_header: SignedHeader, validators: ValidatorSet) -> Self {
        Self {
            signed_header,
            validators,
        }
    }

    pub fn height(&self) -> u64 {
        self.signed_header.height()
    }

    pub fn commit(&self) -> &Commit {
        &self.signed_header.commit
    }

    /// Hash of the validator set the header asserts for the next block.
    pub fn next_validators_hash(&self) -> [u8; 32] {
        self.signed_header.header.next_validators_hash
    }

    /// Self-consistency: the header, commit and validator set all agree, and
    /// the commit carries a quorum of the validator set it claims.
    pub fn validate_basic(&self, chain_id: &str) -> Result<(), VerificationError> {
        self.signed_header.validate_basic(chain_id)?;

        let vals_hash = self.validators.hash();
        if self.signed_header.validators_hash() != vals_hash {
            return Err(VerificationError::ValidationFailed(format!(
                "header validators hash {} does not match supplied set {}",
                hex::encode(self.signed_header.validators_hash()),
                hex::encode(vals_hash)
            )));
        }

        let commit = self.commit();
        verify_commit(
            &self.validators,
            chain_id,
            &commit.block_id,
            self.height(),
            commit,
        )
    }
}
