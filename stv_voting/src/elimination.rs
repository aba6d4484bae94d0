use log::debug;
use snafu::ensure;

use crate::config::*;
use crate::matrix::{normalize, Rank, RankMatrix};

// Flag to indicate how the loser was found.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub(crate) enum TiebreakSituation {
    // Unique minimum at this preference depth.
    Depth(Rank),
    // All the depths were tied, the tiebreak mode decided.
    Fallback,
}

/// Finds the candidate with the fewest votes at the first preference depth
/// that separates the tied candidates. Columns that are entirely zero
/// (eliminated or elected) are never considered.
pub(crate) fn find_loser(
    matrix: &RankMatrix,
    tiebreak: TieBreakMode,
    num_round: u32,
) -> Result<(CandidateIndex, TiebreakSituation), VotingErrors> {
    let mut tied: Vec<CandidateIndex> = (0..matrix.num_candidates())
        .filter(|cid| !matrix.column_is_zero(*cid))
        .collect();
    ensure!(!tied.is_empty(), EmptyElectionSnafu {});

    for depth in 1..=(matrix.num_candidates() as Rank) {
        let tally = matrix.tally_at_rank(depth);
        // Exact-depth counts, not cumulative ones.
        let min_count = tied.iter().map(|cid| tally[*cid]).min().unwrap_or(0);
        tied.retain(|cid| tally[*cid] == min_count);
        debug!(
            "find_loser: depth {} min_count {} candidates {:?}",
            depth, min_count, tied
        );
        if let [loser] = tied.as_slice() {
            return Ok((*loser, TiebreakSituation::Depth(depth)));
        }
    }

    let loser = match tiebreak {
        TieBreakMode::Strict => {
            return UnresolvedTieSnafu {
                round: num_round,
                candidates: tied,
            }
            .fail();
        }
        // For loser selection, the selection is done in reverse candidate order.
        TieBreakMode::UseCandidateOrder => tied.iter().max().cloned(),
        TieBreakMode::Random(seed) => candidate_permutation_crypto(&tied, seed, num_round)
            .first()
            .cloned(),
    };
    let loser = loser.ok_or(VotingErrors::EmptyElection {})?;
    debug!(
        "find_loser: tie between {:?} broken by {:?} mode: {}",
        tied, tiebreak, loser
    );
    Ok((loser, TiebreakSituation::Fallback))
}

/// Eliminates one candidate: its column is zeroed and the ballots that
/// ranked it first move on to their next preference.
///
/// Returns the index of the eliminated candidate.
pub fn select_loser_and_eliminate(
    matrix: &mut RankMatrix,
    tiebreak: TieBreakMode,
    num_round: u32,
) -> Result<CandidateIndex, VotingErrors> {
    // Duplicate ranks would otherwise shadow each other when closing the gap.
    normalize(matrix);
    let (loser, situation) = find_loser(matrix, tiebreak, num_round)?;
    debug!(
        "select_loser_and_eliminate: eliminating {} ({:?})",
        loser, situation
    );

    // Close the gap on the ballots that had the loser on top.
    for voter in matrix.voters_ranking_first(loser) {
        for r in matrix.row_mut(voter).iter_mut() {
            *r = r.saturating_sub(1);
        }
    }
    matrix.zero_column(loser);
    normalize(matrix);
    Ok(loser)
}

/// Generates a "random" permutation of the candidates. Random in this context
/// means hard to guess in advance: the order is given by a SHA-256 digest of
/// the seed, the round and the candidate.
pub(crate) fn candidate_permutation_crypto(
    candidates: &[CandidateIndex],
    seed: u32,
    num_round: u32,
) -> Vec<CandidateIndex> {
    let mut data: Vec<(CandidateIndex, String)> = candidates
        .iter()
        .map(|cid| {
            (
                *cid,
                sha256::digest(format!("{:08}{:08}{}", seed, num_round, cid)),
            )
        })
        .collect();
    data.sort_by(|a, b| a.1.cmp(&b.1));
    data.iter().map(|p| p.0).collect()
}
