use std::collections::BTreeMap;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::*;
use crate::matrix::{normalize, RankMatrix};

/// Hare transfer of the surplus of an elected candidate.
///
/// The ballots ranking `winner` first are shuffled with `seed`. The first
/// `quota` of them are exhausted: they were used up electing the winner. The
/// others (the surplus) keep circulating with their next preference promoted
/// to first rank. The winner's column is zeroed in every ballot.
///
/// In the returned stats, `exhausted` counts the surplus ballots that had no
/// further preference.
pub fn transfer_surplus(
    matrix: &mut RankMatrix,
    winner: CandidateIndex,
    quota: u64,
    seed: u64,
) -> TransferStats {
    let mut holders = matrix.voters_ranking_first(winner);
    let votes = holders.len() as u64;
    let surplus = votes.saturating_sub(quota);
    let num_to_remove = (votes - surplus) as usize;

    let mut rng = StdRng::seed_from_u64(seed);
    holders.shuffle(&mut rng);
    let (removed, retained) = holders.split_at(num_to_remove);
    debug!(
        "transfer_surplus: candidate {} votes {} surplus {} removed {:?} retained {:?}",
        winner, votes, surplus, removed, retained
    );

    for voter in removed.iter() {
        matrix.zero_row(*voter);
    }
    matrix.zero_column(winner);
    normalize(matrix);

    let (transfers, exhausted) = count_transfers(matrix, retained);
    TransferStats {
        candidate: winner,
        votes,
        surplus,
        transfers,
        exhausted,
    }
}

/// Where the given ballots now go: count per new first choice, and the
/// number of ballots with no candidate left.
pub(crate) fn count_transfers(
    matrix: &RankMatrix,
    voters: &[usize],
) -> (Vec<(CandidateIndex, u64)>, u64) {
    let mut transfers: BTreeMap<CandidateIndex, u64> = BTreeMap::new();
    let mut exhausted: u64 = 0;
    for voter in voters.iter() {
        match matrix.first_choice(*voter) {
            Some(cid) => *transfers.entry(cid).or_insert(0) += 1,
            None => exhausted += 1,
        }
    }
    (transfers.into_iter().collect(), exhausted)
}

/// Derives the seed of one transfer from the seed of the election, so that
/// several winners of the same round are not shuffled identically.
pub fn derive_seed(election_seed: u64, num_round: u32, candidate: CandidateIndex) -> u64 {
    let digest = sha256::digest(format!(
        "{:020}{:08}{}",
        election_seed, num_round, candidate
    ));
    digest
        .get(..16)
        .and_then(|prefix| u64::from_str_radix(prefix, 16).ok())
        .unwrap_or(election_seed)
}
