//! # Lite Core
//!
//! Verification core of a BFT light client.
//!
//! Given a chain id and a validator set it already trusts, this crate decides
//! whether a later commit is valid and whether a proposed validator set change
//! can be followed safely. It does no networking and no persistence.
//!
//! ## Trust Model
//!
//! - **Commit verification** (`consensus::certifier`): a commit is accepted
//!   when more than 2/3 of the trusted voting power precommitted its block.
//!
//! - **Validator set transitions** (`consensus::dynamic`): a new set is only
//!   adopted if its commit is *also* signed by more than 2/3 of the currently
//!   trusted power, and only at a strictly later height. Trust carries forward
//!   one hop at a time under the usual fewer-than-1/3-Byzantine assumption.
//!
//! ## Usage
//!
//! ```ignore
//! use lite_core::{Certifier, DynamicCertifier, TrustRoot};
//!
//! let mut cert = DynamicCertifier::from_trust_root(TrustRoot::from_json(json)?)?;
//! cert.certify(&commit)?;
//! cert.update(&full_commit)?;
//! ```

pub mod consensus;
pub mod crypto;
pub mod error;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types for convenience
pub use consensus::{
    certifier::{Certifier, StaticCertifier},
    dynamic::{DynamicCertifier, TrustedState},
    quorum::{has_quorum, quorum_threshold, verify_commit, verify_commit_any},
    trust_root::{parse_hash, TrustRoot, TrustRootError},
};
pub use crypto::{Address, BlsPublicKey, BlsSignature, Verifier};
pub use error::VerificationError;
pub use types::{commit::*, validator::*, vote::*};
