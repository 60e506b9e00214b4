use serde::{Deserialize, Serialize};

use crate::crypto::{Address, BlsSignature, Verifier};
use crate::error::VerificationError;
use crate::types::validator::Validator;

/// The consensus step a vote was cast in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteType {
    Prevote,
    Precommit,
}

impl VoteType {
    /// Wire byte used in the sign bytes.
    pub fn as_byte(self) -> u8 {
        match self {
            VoteType::Prevote => 0x01,
            VoteType::Precommit => 0x02,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VoteType::Prevote => "Prevote",
            VoteType::Precommit => "Precommit",
        }
    }
}

/// Header of the part set a block was gossiped as.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartSetHeader {
    pub total: u32,
    pub hash: [u8; 32],
}

/// Identifies a block. The zero value is a vote for nil.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId {
    pub hash: [u8; 32],
    pub parts: PartSetHeader,
}

impl BlockId {
    pub fn new(hash: [u8; 32], parts: PartSetHeader) -> Self {
        Self { hash, parts }
    }

    pub fn is_zero(&self) -> bool {
        self.hash == [0u8; 32] && self.parts == PartSetHeader::default()
    }
}

/// A single validator's signed vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub validator_address: Address,
    /// Position of the validator in the set it signed under.
    pub validator_index: usize,
    pub height: u64,
    pub round: u32,
    pub vote_type: VoteType,
    /// Zero if the vote is for nil.
    pub block_id: BlockId,
    pub signature: BlsSignature,
}

impl Vote {
    /// Canonical, chain-scoped bytes that the validator signs.
    ///
    /// JSON with lexicographically ordered keys and no whitespace:
    /// `{"chain_id":..,"vote":{"block_id":{"hash":..,"parts":{"hash":..,"total":..}},"height":..,"round":..,"type":..}}`.
    /// Address, index and signature are not covered. Signers and verifiers
    /// across the network must agree on this layout, so changing it is a
    /// breaking, explicitly versioned change.
    pub fn sign_bytes(&self, chain_id: &str) -> Vec<u8> {
        canonical_sign_bytes(
            chain_id,
            self.height,
            self.round,
            self.vote_type,
            &self.block_id,
        )
    }

    /// Check that this vote was cast by `validator` and carries its signature.
    pub fn verify(&self, chain_id: &str, validator: &Validator) -> Result<(), VerificationError> {
        if self.validator_address != validator.address {
            return Err(VerificationError::InvalidValidatorAddress {
                index: self.validator_index,
                address: self.validator_address,
            });
        }

        if !validator
            .pub_key
            .verify(&self.sign_bytes(chain_id), &self.signature)
        {
            return Err(VerificationError::InvalidSignature {
                index: self.validator_index,
            });
        }

        Ok(())
    }
}

impl std::fmt::Display for Vote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Vote{{{}:{} {}/{:02}/{}({}) {} {}}}",
            self.validator_index,
            self.validator_address.fingerprint(),
            self.height,
            self.round,
            self.vote_type.as_byte(),
            self.vote_type.name(),
            hex::encode_upper(&self.block_id.hash[..6]),
            hex::encode_upper(&self.signature.0[..6]),
        )
    }
}

/// Sign bytes for an arbitrary vote, shared by signers and verifiers.
pub fn canonical_sign_bytes(
    chain_id: &str,
    height: u64,
    round: u32,
    vote_type: VoteType,
    block_id: &BlockId,
) -> Vec<u8> {
    // serde_json's default map is a BTreeMap, which yields sorted keys.
    serde_json::json!({
        "chain_id": chain_id,
        "vote": {
            "block_id": {
                "hash": hex::encode_upper(block_id.hash),
                "parts": {
                    "hash": hex::encode_upper(block_id.parts.hash),
                    "total": block_id.parts.total,
                },
            },
            "height": height,
            "round": round,
            "type": vote_type.as_byte(),
        },
    })
    .to_string()
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ValKeys;
    use hex_literal::hex;

    const BLOCK_HASH: [u8; 32] =
        hex!("aabbccddeeff00112233445566778899aabbccddeeff00112233445566778899");

    fn block_id() -> BlockId {
        BlockId::new(
            BLOCK_HASH,
            PartSetHeader {
                total: 1,
                hash: [0x11; 32],
            },
        )
    }

    #[test]
    fn test_sign_bytes_layout() {
        let bytes = canonical_sign_bytes("test-chain", 7, 2, VoteType::Precommit, &block_id());
        let text = String::from_utf8(bytes).unwrap();

        let expected = format!(
            "{{\"chain_id\":\"test-chain\",\"vote\":{{\"block_id\":{{\"hash\":\"{}\",\"parts\":{{\"hash\":\"{}\",\"total\":1}}}},\"height\":7,\"round\":2,\"type\":2}}}}",
            hex::encode_upper(BLOCK_HASH),
            hex::encode_upper([0x11u8; 32]),
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_sign_bytes_scoped_by_chain_and_type() {
        let id = block_id();
        let base = canonical_sign_bytes("a", 1, 0, VoteType::Precommit, &id);
        assert_ne!(base, canonical_sign_bytes("b", 1, 0, VoteType::Precommit, &id));
        assert_ne!(base, canonical_sign_bytes("a", 1, 0, VoteType::Prevote, &id));
        assert_ne!(base, canonical_sign_bytes("a", 1, 1, VoteType::Precommit, &id));
    }

    #[test]
    fn test_zero_block_id_is_nil() {
        assert!(BlockId::default().is_zero());
        assert!(!block_id().is_zero());
    }

    #[test]
    fn test_vote_verify() {
        let keys = ValKeys::generate(2);
        let vals = keys.to_validators(10, 0);
        let (index, validator) = vals.get_by_address(&keys.public_key(0).address()).unwrap();
        let vote = keys.sign_vote(0, index, "chain", 5, 0, VoteType::Precommit, &block_id());

        assert!(vote.verify("chain", validator).is_ok());
        assert!(matches!(
            vote.verify("other-chain", validator),
            Err(VerificationError::InvalidSignature { .. })
        ));

        let (_, other) = vals.get_by_address(&keys.public_key(1).address()).unwrap();
        assert!(matches!(
            vote.verify("chain", other),
            Err(VerificationError::InvalidValidatorAddress { .. })
        ));
    }

    #[test]
    fn test_vote_display() {
        let keys = ValKeys::generate(1);
        let vote = keys.sign_vote(0, 3, "chain", 12, 1, VoteType::Precommit, &block_id());
        let shown = vote.to_string();
        assert!(shown.starts_with(&format!(
            "Vote{{3:{} 12/01/2(Precommit) AABBCCDDEEFF ",
            vote.validator_address.fingerprint()
        )));
    }
}
