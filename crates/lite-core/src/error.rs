use thiserror::Error;

use crate::crypto::Address;

/// Errors returned by commit verification and validator set transitions.
///
/// None of these leave a certifier modified. `TooMuchChange` is kept apart
/// from `InsufficientSignatures` because callers react to it differently,
/// typically by fetching intermediate checkpoints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Height {height} is not after the last trusted height {last_height}")]
    PastTime { height: u64, last_height: u64 },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Insufficient voting power: {signed}/{total} signed (need more than {required})")]
    InsufficientSignatures {
        signed: u64,
        total: u64,
        required: u64,
    },

    #[error("Too much change: trusted set signed {old_signed}/{old_total}, new set signed {new_signed}/{new_total}")]
    TooMuchChange {
        old_signed: u64,
        old_total: u64,
        new_signed: u64,
        new_total: u64,
    },

    /// The overlap check against the trusted set failed before a tally
    /// could be completed.
    #[error("Too much change: transition cannot be proven against the trusted set: {reason}")]
    UnprovenChange { reason: String },

    #[error("Validators changed: commit is bound to set {got}, trusted set is {expected}")]
    ValidatorsChanged { expected: String, got: String },

    #[error("Invalid signature on precommit from validator {index}")]
    InvalidSignature { index: usize },

    #[error("Invalid validator index {index} in precommit slot {slot}")]
    InvalidValidatorIndex { index: usize, slot: usize },

    #[error("Invalid validator address {address} for validator {index}")]
    InvalidValidatorAddress { index: usize, address: Address },
}

impl VerificationError {
    pub fn is_past_time(&self) -> bool {
        matches!(self, Self::PastTime { .. })
    }

    pub fn is_too_much_change(&self) -> bool {
        matches!(self, Self::TooMuchChange { .. } | Self::UnprovenChange { .. })
    }

    pub fn is_validators_changed(&self) -> bool {
        matches!(self, Self::ValidatorsChanged { .. })
    }

    pub fn is_insufficient_signatures(&self) -> bool {
        matches!(self, Self::InsufficientSignatures { .. })
    }
}
