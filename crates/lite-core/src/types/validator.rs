use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{merkle_root, sha256_hash, Address, BlsPublicKey, ADDRESS_LEN, BLS_PUBKEY_LEN};

/// Errors building a validator set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidatorSetError {
    #[error("Validator set is empty")]
    Empty,

    #[error("Validator set total voting power is zero")]
    ZeroTotalPower,

    #[error("Validator set total voting power overflows u64")]
    PowerOverflow,

    #[error("Duplicate validator address {address}")]
    DuplicateValidator { address: Address },

    #[error("Validator address {address} does not match its public key")]
    AddressMismatch { address: Address },
}

/// One member of a validator set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Identity; always the address of `pub_key`.
    pub address: Address,
    pub pub_key: BlsPublicKey,
    pub voting_power: u64,
}

impl Validator {
    pub fn new(pub_key: BlsPublicKey, voting_power: u64) -> Self {
        Self {
            address: pub_key.address(),
            pub_key,
            voting_power,
        }
    }

    /// Leaf committed to by the validator set hash.
    fn hash_leaf(&self) -> [u8; 32] {
        let mut data = Vec::with_capacity(ADDRESS_LEN + BLS_PUBKEY_LEN + 8);
        data.extend_from_slice(&self.address.0);
        data.extend_from_slice(&self.pub_key.0);
        data.extend_from_slice(&self.voting_power.to_be_bytes());
        sha256_hash(&data)
    }
}

/// An immutable, address-ordered set of validators.
///
/// Construction enforces unique identities and a non-zero total voting power.
/// A validator set change always produces a new `ValidatorSet`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Validator>", into = "Vec<Validator>")]
pub struct ValidatorSet {
    validators: Vec<Validator>,
    total_voting_power: u64,
}

impl ValidatorSet {
    /// Build a set from validators in any order. The set is sorted by address.
    pub fn new(mut validators: Vec<Validator>) -> Result<Self, ValidatorSetError> {
        if validators.is_empty() {
            return Err(ValidatorSetError::Empty);
        }

        if let Some(v) = validators.iter().find(|v| v.pub_key.address() != v.address) {
            return Err(ValidatorSetError::AddressMismatch { address: v.address });
        }

        validators.sort_by(|a, b| a.address.cmp(&b.address));
        if let Some(pair) = validators.windows(2).find(|w| w[0].address == w[1].address) {
            return Err(ValidatorSetError::DuplicateValidator {
                address: pair[0].address,
            });
        }

        let total_voting_power = validators
            .iter()
            .try_fold(0u64, |acc, v| acc.checked_add(v.voting_power))
            .ok_or(ValidatorSetError::PowerOverflow)?;
        if total_voting_power == 0 {
            return Err(ValidatorSetError::ZeroTotalPower);
        }

        Ok(Self {
            validators,
            total_voting_power,
        })
    }

    pub fn size(&self) -> usize {
        self.validators.len()
    }

    pub fn total_voting_power(&self) -> u64 {
        self.total_voting_power
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn iter(&self) -> impl Iterator<Item = &Validator> {
        self.validators.iter()
    }

    pub fn get_by_index(&self, index: usize) -> Option<&Validator> {
        self.validators.get(index)
    }

    /// Look up a validator by identity, returning its index in this set.
    pub fn get_by_address(&self, address: &Address) -> Option<(usize, &Validator)> {
        self.validators
            .binary_search_by(|v| v.address.cmp(address))
            .ok()
            .map(|index| (index, &self.validators[index]))
    }

    pub fn has_address(&self, address: &Address) -> bool {
        self.get_by_address(address).is_some()
    }

    /// Content hash binding a header to this exact set (order, keys and powers).
    pub fn hash(&self) -> [u8; 32] {
        let leaves: Vec<[u8; 32]> = self.validators.iter().map(Validator::hash_leaf).collect();
        merkle_root(&leaves)
    }
}

impl TryFrom<Vec<Validator>> for ValidatorSet {
    type Error = ValidatorSetError;

    fn try_from(validators: Vec<Validator>) -> Result<Self, Self::Error> {
        Self::new(validators)
    }
}

impl From<ValidatorSet> for Vec<Validator> {
    fn from(set: ValidatorSet) -> Self {
        set.validators
    }
}
