use bitvec::prelude::*;
use tracing::debug;

use crate::crypto::Verifier;
use crate::error::VerificationError;
use crate::types::commit::Commit;
use crate::types::validator::ValidatorSet;
use crate::types::vote::{BlockId, Vote, VoteType};

/// Largest voting power that does NOT constitute a quorum: `floor(total * 2 / 3)`.
pub fn quorum_threshold(total: u64) -> u64 {
    total / 3 * 2 + (total % 3) * 2 / 3
}

/// Quorum is strictly more than two thirds of `total`.
pub fn has_quorum(signed: u64, total: u64) -> bool {
    signed > quorum_threshold(total)
}

/// Verify that `commit` is a quorum of `vals` precommitting `block_id` at `height`.
///
/// Votes for other blocks and votes whose address does not match the
/// validator at their index are not counted. A bad signature, a vote whose
/// index disagrees with its slot, or a vote from the wrong height, round or
/// step rejects the whole commit.
pub fn verify_commit(
    vals: &ValidatorSet,
    chain_id: &str,
    block_id: &BlockId,
    height: u64,
    commit: &Commit,
) -> Result<(), VerificationError> {
    check_commit_shape(vals, block_id, height, commit)?;

    let round = commit.round();
    let mut tallied = 0u64;

    for (slot, vote) in present_votes(commit) {
        check_vote_step(vote, height, round)?;

        if vote.validator_index != slot {
            return Err(VerificationError::InvalidValidatorIndex {
                index: vote.validator_index,
                slot,
            });
        }

        // Sizes match, so every slot has a validator.
        let Some(validator) = vals.get_by_index(slot) else {
            return Err(VerificationError::InvalidValidatorIndex {
                index: vote.validator_index,
                slot,
            });
        };

        match vote.verify(chain_id, validator) {
            Ok(()) => {}
            Err(VerificationError::InvalidValidatorAddress { address, .. }) => {
                debug!(%slot, %address, expected = %validator.address, "ignoring precommit from unexpected address");
                continue;
            }
            Err(err) => return Err(err),
        }

        if vote.block_id != *block_id {
            debug!(%slot, "ignoring precommit for another block");
            continue;
        }

        tallied += validator.voting_power;
    }

    let total = vals.total_voting_power();
    if !has_quorum(tallied, total) {
        return Err(VerificationError::InsufficientSignatures {
            signed: tallied,
            total,
            required: quorum_threshold(total),
        });
    }

    Ok(())
}

/// Verify that a commit produced by `new_set` would also be a quorum of the
/// trusted `old_set`.
///
/// Signers are matched into `old_set` by address and weighted by their power
/// there, independent of their index in `new_set`. A signer only counts
/// towards `new_set` if its key at that index is unchanged. Both sides must
/// exceed two thirds, otherwise the transition is `TooMuchChange`.
pub fn verify_commit_any(
    old_set: &ValidatorSet,
    new_set: &ValidatorSet,
    chain_id: &str,
    block_id: &BlockId,
    height: u64,
    commit: &Commit,
) -> Result<(), VerificationError> {
    check_commit_shape(new_set, block_id, height, commit)?;

    let round = commit.round();
    let mut seen = bitvec![0; old_set.size()];
    let mut old_signed = 0u64;
    let mut new_signed = 0u64;

    for (slot, vote) in present_votes(commit) {
        check_vote_step(vote, height, round)?;

        if vote.block_id != *block_id {
            continue;
        }

        // Unknown to the trusted set, or already counted.
        let Some((old_index, old_val)) = old_set.get_by_address(&vote.validator_address) else {
            continue;
        };
        if seen[old_index] {
            debug!(%slot, address = %vote.validator_address, "ignoring duplicate precommit");
            continue;
        }
        seen.set(old_index, true);

        if !old_val
            .pub_key
            .verify(&vote.sign_bytes(chain_id), &vote.signature)
        {
            return Err(VerificationError::InvalidSignature {
                index: vote.validator_index,
            });
        }

        old_signed += old_val.voting_power;

        if let Some(new_val) = new_set.get_by_index(slot) {
            if new_val.pub_key == old_val.pub_key {
                new_signed += new_val.voting_power;
            }
        }
    }

    let old_total = old_set.total_voting_power();
    let new_total = new_set.total_voting_power();
    if !has_quorum(old_signed, old_total) || !has_quorum(new_signed, new_total) {
        return Err(VerificationError::TooMuchChange {
            old_signed,
            old_total,
            new_signed,
            new_total,
        });
    }

    Ok(())
}

fn present_votes(commit: &Commit) -> impl Iterator<Item = (usize, &Vote)> {
    commit
        .precommits
        .iter()
        .enumerate()
        .filter_map(|(slot, vote)| vote.as_ref().map(|v| (slot, v)))
}

fn check_commit_shape(
    vals: &ValidatorSet,
    block_id: &BlockId,
    height: u64,
    commit: &Commit,
) -> Result<(), VerificationError> {
    if block_id.is_zero() || commit.block_id.is_zero() {
        return Err(VerificationError::ValidationFailed(
            "commit is for a nil block".into(),
        ));
    }

    if commit.block_id != *block_id {
        return Err(VerificationError::ValidationFailed(
            "commit block id does not match the expected block".into(),
        ));
    }

    if commit.height != height {
        return Err(VerificationError::ValidationFailed(format!(
            "commit height {} does not match expected height {}",
            commit.height, height
        )));
    }

    if commit.size() != vals.size() {
        return Err(VerificationError::ValidationFailed(format!(
            "commit has {} precommit slots for a set of {} validators",
            commit.size(),
            vals.size()
        )));
    }

    Ok(())
}

fn check_vote_step(vote: &Vote, height: u64, round: Option<u32>) -> Result<(), VerificationError> {
    if vote.height != height {
        return Err(VerificationError::ValidationFailed(format!(
            "precommit {} has height {}, expected {}",
            vote.validator_index, vote.height, height
        )));
    }

    if Some(vote.round) != round {
        return Err(VerificationError::ValidationFailed(format!(
            "precommit {} has round {}, expected {:?}",
            vote.validator_index, vote.round, round
        )));
    }

    match vote.vote_type {
        VoteType::Precommit => Ok(()),
        VoteType::Prevote => Err(VerificationError::ValidationFailed(format!(
            "vote {} in commit is a prevote",
            vote.validator_index
        ))),
    }
}
