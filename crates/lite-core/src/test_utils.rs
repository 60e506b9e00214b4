//! Deterministic validator keys and commit generation for tests.

use std::ops::Range;

use blst::min_pk::SecretKey;

use crate::crypto::{sha256_hash, BlsPublicKey, BlsSignature, SIGNATURE_DST};
use crate::types::commit::{Commit, FullCommit, Header, SignedHeader};
use crate::types::validator::{Validator, ValidatorSet};
use crate::types::vote::{canonical_sign_bytes, BlockId, PartSetHeader, Vote, VoteType};

/// An ordered list of validator secret keys.
///
/// Key `i` always means the i-th key of this list, independent of where its
/// validator lands in an address-sorted [`ValidatorSet`].
#[derive(Clone, Debug)]
pub struct ValKeys {
    seeds: Vec<u64>,
}

impl ValKeys {
    pub fn generate(n: usize) -> Self {
        Self::generate_from(0, n)
    }

    /// `n` keys that share nothing with keys generated from other offsets.
    pub fn generate_from(offset: u64, n: usize) -> Self {
        Self {
            seeds: (offset..offset + n as u64).collect(),
        }
    }

    /// These keys plus `n` fresh ones.
    pub fn extend(&self, n: usize) -> Self {
        let next = self.seeds.iter().max().map_or(0, |m| m + 1);
        let mut seeds = self.seeds.clone();
        seeds.extend(next..next + n as u64);
        Self { seeds }
    }

    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            seeds: self.seeds[range].to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    fn secret(&self, i: usize) -> SecretKey {
        let ikm = sha256_hash(&self.seeds[i].to_be_bytes());
        SecretKey::key_gen(&ikm, &[]).unwrap()
    }

    pub fn public_key(&self, i: usize) -> BlsPublicKey {
        BlsPublicKey(self.secret(i).sk_to_pk().to_bytes())
    }

    pub fn sign(&self, i: usize, message: &[u8]) -> BlsSignature {
        BlsSignature(self.secret(i).sign(message, SIGNATURE_DST, &[]).to_bytes())
    }

    /// Key `i` gets power `init + i * inc`.
    pub fn to_validators(&self, init: u64, inc: u64) -> ValidatorSet {
        let powers: Vec<u64> = (0..self.len()).map(|i| init + i as u64 * inc).collect();
        self.with_powers(&powers)
    }

    /// Key `i` gets `powers[i]`.
    pub fn with_powers(&self, powers: &[u64]) -> ValidatorSet {
        let vals = powers
            .iter()
            .enumerate()
            .map(|(i, &power)| Validator::new(self.public_key(i), power))
            .collect();
        ValidatorSet::new(vals).unwrap()
    }

    /// Index of key `i` within `vals`, if it is a member.
    pub fn index_in(&self, i: usize, vals: &ValidatorSet) -> Option<usize> {
        vals.get_by_address(&self.public_key(i).address())
            .map(|(index, _)| index)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn sign_vote(
        &self,
        i: usize,
        validator_index: usize,
        chain_id: &str,
        height: u64,
        round: u32,
        vote_type: VoteType,
        block_id: &BlockId,
    ) -> Vote {
        let bytes = canonical_sign_bytes(chain_id, height, round, vote_type, block_id);
        Vote {
            validator_address: self.public_key(i).address(),
            validator_index,
            height,
            round,
            vote_type,
            block_id: block_id.clone(),
            signature: self.sign(i, &bytes),
        }
    }

    pub fn gen_header(&self, chain_id: &str, height: u64, vals: &ValidatorSet, app: &[u8]) -> Header {
        Header {
            chain_id: chain_id.to_string(),
            height,
            validators_hash: vals.hash(),
            next_validators_hash: vals.hash(),
            app_hash: sha256_hash(app),
            consensus_hash: sha256_hash(b"params"),
            last_results_hash: sha256_hash(b"results"),
            last_block_hash: [0u8; 32],
        }
    }

    /// Signed header for `vals` where keys `first..last` precommit.
    pub fn gen_commit(
        &self,
        chain_id: &str,
        height: u64,
        vals: &ValidatorSet,
        app: &[u8],
        first: usize,
        last: usize,
    ) -> SignedHeader {
        let header = self.gen_header(chain_id, height, vals, app);
        let block_id = BlockId::new(
            header.hash(),
            PartSetHeader {
                total: 1,
                hash: sha256_hash(b"parts"),
            },
        );

        let mut precommits = vec![None; vals.size()];
        for i in first..last {
            if let Some(index) = self.index_in(i, vals) {
                precommits[index] = Some(self.sign_vote(
                    i,
                    index,
                    chain_id,
                    height,
                    0,
                    VoteType::Precommit,
                    &block_id,
                ));
            }
        }

        SignedHeader {
            header,
            commit: Commit {
                height,
                block_id,
                precommits,
            },
        }
    }

    pub fn gen_full_commit(
        &self,
        chain_id: &str,
        height: u64,
        vals: &ValidatorSet,
        app: &[u8],
        first: usize,
        last: usize,
    ) -> FullCommit {
        let signed_header = self.gen_commit(chain_id, height, vals, app, first, last);
        FullCommit::new(signed_header, vals.clone())
    }
}
