use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::validator::ValidatorSet;

/// Errors that can occur loading a trust root.
#[derive(Debug, Error)]
pub enum TrustRootError {
    #[error("Trust root chain id is empty")]
    EmptyChainId,

    #[error("Trust root format invalid: {reason}")]
    InvalidFormat { reason: String },

    #[error("Pinned validators hash {expected} does not match the supplied set {actual}")]
    HashMismatch { expected: String, actual: String },
}

/// The out-of-band starting point of a light client.
///
/// This is the one moment of trust: the caller vouches for this chain id,
/// validator set and height. Everything after it is verified.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrustRoot {
    pub chain_id: String,
    pub height: u64,
    pub validators: ValidatorSet,
    /// Optional hex hash the validator set must match, for roots copied
    /// from a source that publishes only the hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validators_hash: Option<String>,
}

impl TrustRoot {
    /// Parse and validate a JSON trust root.
    pub fn from_json(json: &str) -> Result<Self, TrustRootError> {
        let root: TrustRoot =
            serde_json::from_str(json).map_err(|e| TrustRootError::InvalidFormat {
                reason: e.to_string(),
            })?;
        root.validate()?;
        Ok(root)
    }

    pub fn validate(&self) -> Result<(), TrustRootError> {
        if self.chain_id.is_empty() {
            return Err(TrustRootError::EmptyChainId);
        }

        if let Some(pinned) = &self.validators_hash {
            let expected = parse_hash(pinned)?;
            let actual = self.validators.hash();
            if expected != actual {
                return Err(TrustRootError::HashMismatch {
                    expected: hex::encode(expected),
                    actual: hex::encode(actual),
                });
            }
        }

        Ok(())
    }
}

/// Parse a hex-encoded 32-byte hash, with or without a `0x` prefix.
pub fn parse_hash(hex_str: &str) -> Result<[u8; 32], TrustRootError> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);

    if hex_str.len() != 64 {
        return Err(TrustRootError::InvalidFormat {
            reason: format!("Expected 64 hex characters, got {}", hex_str.len()),
        });
    }

    let bytes = hex::decode(hex_str).map_err(|e| TrustRootError::InvalidFormat {
        reason: format!("Invalid hex: {}", e),
    })?;

    let mut result = [0u8; 32];
    result.copy_from_slice(&bytes);
    Ok(result)
}
