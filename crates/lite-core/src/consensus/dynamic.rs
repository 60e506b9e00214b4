use tracing::{info, warn};

use crate::consensus::certifier::{Certifier, StaticCertifier};
use crate::consensus::quorum::verify_commit_any;
use crate::consensus::trust_root::{TrustRoot, TrustRootError};
use crate::error::VerificationError;
use crate::types::commit::{Commit, FullCommit, SignedHeader};
use crate::types::validator::ValidatorSet;

/// The trusted validator set and the height it is trusted at.
/// Always replaced as a whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrustedState {
    pub certifier: StaticCertifier,
    pub height: u64,
}

/// A certifier that can follow validator set changes forward in time.
///
/// `certify` behaves like [`StaticCertifier`] against the current set.
/// `update` moves to a new validator set when a [`FullCommit`] proves the
/// transition is safe: the new set's commit must also be signed by more
/// than two thirds of the currently trusted power.
///
/// Mutation requires `&mut self`, so the borrow checker serializes updates
/// against every other call on the same instance.
#[derive(Clone, Debug)]
pub struct DynamicCertifier {
    trusted: TrustedState,
}

impl DynamicCertifier {
    pub fn new(chain_id: impl Into<String>, validators: ValidatorSet, height: u64) -> Self {
        Self {
            trusted: TrustedState {
                certifier: StaticCertifier::new(chain_id, validators),
                height,
            },
        }
    }

    /// Build a certifier seeded with an out-of-band trust root.
    /// The root is validated first, including any pinned validators hash.
    pub fn from_trust_root(root: TrustRoot) -> Result<Self, TrustRootError> {
        root.validate()?;
        Ok(Self::new(root.chain_id, root.validators, root.height))
    }

    pub fn last_height(&self) -> u64 {
        self.trusted.height
    }

    pub fn trusted_state(&self) -> &TrustedState {
        &self.trusted
    }

    /// Certify a signed header against the trusted set, including the check
    /// that the header was produced by that exact set.
    pub fn certify_header(&mut self, signed_header: &SignedHeader) -> Result<(), VerificationError> {
        self.trusted.certifier.verify_header(signed_header)?;
        self.advance_to(signed_header.height());
        Ok(())
    }

    /// Move the trusted set to `full_commit.validators` if the change is safe.
    ///
    /// On any error the trusted set and height are left untouched.
    pub fn update(&mut self, full_commit: &FullCommit) -> Result<(), VerificationError> {
        let height = full_commit.height();
        let last_height = self.trusted.height;

        // only follow changes forward
        if height <= last_height {
            return Err(VerificationError::PastTime { height, last_height });
        }

        let chain_id = self.chain_id().to_string();
        full_commit.validate_basic(&chain_id)?;

        let commit = full_commit.commit();
        if let Err(err) = verify_commit_any(
            self.validators(),
            &full_commit.validators,
            &chain_id,
            &commit.block_id,
            height,
            commit,
        ) {
            warn!(%height, %err, "rejecting validator set transition");
            return Err(match err {
                VerificationError::TooMuchChange { .. } => err,
                other => VerificationError::UnprovenChange {
                    reason: other.to_string(),
                },
            });
        }

        let next = TrustedState {
            certifier: StaticCertifier::new(chain_id, full_commit.validators.clone()),
            height,
        };
        info!(
            %height,
            from = %hex::encode(self.hash()),
            to = %hex::encode(next.certifier.hash()),
            "updated trusted validator set"
        );
        self.trusted = next;

        Ok(())
    }

    // Lower heights may be re-certified but never move the height back.
    fn advance_to(&mut self, height: u64) {
        self.trusted.height = self.trusted.height.max(height);
    }
}

impl Certifier for DynamicCertifier {
    fn chain_id(&self) -> &str {
        self.trusted.certifier.chain_id()
    }

    fn validators(&self) -> &ValidatorSet {
        self.trusted.certifier.validators()
    }

    fn hash(&self) -> [u8; 32] {
        self.trusted.certifier.hash()
    }

    fn certify(&mut self, commit: &Commit) -> Result<(), VerificationError> {
        self.trusted.certifier.verify(commit)?;
        self.advance_to(commit.height);
        Ok(())
    }
}
