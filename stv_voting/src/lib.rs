pub mod builder;
mod config;
mod elimination;
pub mod manual;
mod matrix;
mod quota;
mod transfer;

use log::{debug, info};
use snafu::ensure;

pub use crate::config::*;
pub use crate::elimination::select_loser_and_eliminate;
pub use crate::matrix::{normalize, normalized, Rank, RankMatrix};
pub use crate::quota::{droop_quota, hare_quota, quota};
pub use crate::transfer::{derive_seed, transfer_surplus};

use crate::transfer::count_transfers;

/// Status of a candidate, as read from the matrix and the list of winners.
pub fn candidate_status(
    matrix: &RankMatrix,
    winners: &[CandidateIndex],
    candidate: CandidateIndex,
) -> CandidateStatus {
    if winners.contains(&candidate) {
        CandidateStatus::Elected
    } else if matrix.column_is_zero(candidate) {
        CandidateStatus::Eliminated
    } else {
        CandidateStatus::Active
    }
}

// The mutable state of one election. The matrix is a private copy of the
// ballots and is modified in place from round to round.
struct ElectionState {
    matrix: RankMatrix,
    quota: u64,
    reallocation: Reallocation,
    seed: u64,
    winners: Vec<CandidateIndex>,
    round_stats: Vec<RoundStats>,
}

impl ElectionState {
    fn active_candidates(&self) -> Vec<CandidateIndex> {
        (0..self.matrix.num_candidates())
            .filter(|cid| {
                candidate_status(&self.matrix, &self.winners, *cid) == CandidateStatus::Active
            })
            .collect()
    }

    fn elect(&mut self, candidate: CandidateIndex, num_round: u32) -> TransferStats {
        let seed = derive_seed(self.seed, num_round, candidate);
        let stats = match self.reallocation {
            Reallocation::Hare => transfer_surplus(&mut self.matrix, candidate, self.quota, seed),
        };
        info!(
            "Round {}: candidate {} elected with {} votes, surplus {} -> {:?}, {} exhausted",
            num_round, candidate, stats.votes, stats.surplus, stats.transfers, stats.exhausted
        );
        self.winners.push(candidate);
        stats
    }

    fn eliminate(
        &mut self,
        tiebreak: TieBreakMode,
        num_round: u32,
    ) -> Result<TransferStats, VotingErrors> {
        let tally = self.matrix.tally();
        let previous_first = self.matrix.first_choices();
        let loser = select_loser_and_eliminate(&mut self.matrix, tiebreak, num_round)?;
        let moved: Vec<usize> = previous_first
            .iter()
            .enumerate()
            .filter_map(|(v, c)| if *c == Some(loser) { Some(v) } else { None })
            .collect();
        let (transfers, exhausted) = count_transfers(&self.matrix, &moved);
        info!(
            "Round {}: candidate {} eliminated -> {:?}, {} exhausted",
            num_round, loser, transfers, exhausted
        );
        Ok(TransferStats {
            candidate: loser,
            votes: tally[loser],
            surplus: 0,
            transfers,
            exhausted,
        })
    }
}

/// Runs the single transferable vote over the given ballots.
///
/// Arguments:
/// * `ballots` the ranks given by each voter (rows) to each candidate (columns).
/// It is copied and never modified.
/// * `rules` the rules that govern this election
pub fn run_voting_stats(
    ballots: &RankMatrix,
    rules: &VoteRules,
) -> Result<VotingResult, VotingErrors> {
    ensure!(rules.number_of_winners > 0, NoSeatsSnafu {});
    ensure!(
        ballots.num_candidates() > 0 && ballots.num_voters() > 0,
        EmptyElectionSnafu {}
    );
    let seats = rules.number_of_winners as usize;

    let matrix = normalized(ballots);
    let active_ballots = matrix.active_ballots() as u64;
    let quota = quota::quota(rules.quota_mode, active_ballots, seats as u64);
    let seed = rules.random_seed.unwrap_or_else(rand::random);
    info!(
        "Processing {} ballots ({} active) for {} candidates, {} seats, quota {}, rules: {:?}",
        matrix.num_voters(),
        active_ballots,
        matrix.num_candidates(),
        seats,
        quota,
        rules
    );

    let mut state = ElectionState {
        matrix,
        quota,
        reallocation: rules.reallocation,
        seed,
        winners: Vec::new(),
        round_stats: Vec::new(),
    };

    while state.winners.len() < seats {
        let num_round = (state.round_stats.len() + 1) as u32;
        let remaining = state.active_candidates();
        let needed = seats - state.winners.len();
        ensure!(
            remaining.len() >= needed,
            DegenerateElectionSnafu {
                round: num_round,
                needed,
                remaining: remaining.len(),
            }
        );

        let tally = state.matrix.tally();
        info!("Round {} tally: {:?}", num_round, tally);

        let round_winners: Vec<CandidateIndex> = remaining
            .iter()
            .cloned()
            .filter(|cid| tally[*cid] >= state.quota)
            .collect();
        debug!("run_voting_stats: round winners {:?}", round_winners);

        let mut rs = RoundStats {
            round: num_round,
            tally,
            elected: Vec::new(),
            eliminated: None,
        };

        if !round_winners.is_empty() {
            // Each winner is processed on the matrix left by the previous one.
            for cid in round_winners {
                if state.winners.len() == seats {
                    break;
                }
                rs.elected.push(state.elect(cid, num_round));
            }
        } else if rules.elect_remaining && remaining.len() == needed {
            debug!(
                "run_voting_stats: electing all the remaining candidates {:?}",
                remaining
            );
            for cid in remaining {
                rs.elected.push(state.elect(cid, num_round));
            }
        } else {
            rs.eliminated = Some(state.eliminate(rules.tiebreak_mode, num_round)?);
        }

        debug_assert!(state.matrix.is_dense());
        state.round_stats.push(rs);
    }

    info!("Winners: {:?}", state.winners);
    Ok(VotingResult {
        winners: state.winners,
        quota: state.quota,
        round_stats: state.round_stats,
    })
}

/// Convenience wrapper returning only the winners, in election order.
pub fn run_stv<R: AsRef<[Rank]>>(
    ballots: &[R],
    rules: &VoteRules,
) -> Result<Vec<CandidateIndex>, VotingErrors> {
    let matrix = RankMatrix::from_rows(ballots)?;
    Ok(run_voting_stats(&matrix, rules)?.winners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn repeat(rows: &[(&[Rank], usize)]) -> RankMatrix {
        let mut res: Vec<Vec<Rank>> = Vec::new();
        for (row, count) in rows.iter() {
            for _ in 0..*count {
                res.push(row.to_vec());
            }
        }
        RankMatrix::from_rows(&res).unwrap()
    }

    fn rules(seats: u32) -> VoteRules {
        VoteRules {
            random_seed: Some(0),
            ..VoteRules::with_seats(seats)
        }
    }

    #[test]
    fn majority_first_round() {
        init();
        let ballots = repeat(&[(&[1, 2, 3], 3), (&[2, 1, 3], 2)]);
        let res = run_voting_stats(&ballots, &rules(1)).unwrap();
        assert_eq!(res.winners, vec![0]);
        assert_eq!(res.quota, 3);
        assert_eq!(res.round_stats.len(), 1);
        assert_eq!(res.round_stats[0].tally, vec![3, 2, 0]);
    }

    #[test]
    fn elimination_then_election() {
        init();
        let ballots = repeat(&[(&[1, 0, 0], 4), (&[0, 1, 0], 3), (&[0, 2, 1], 2)]);
        let res = run_voting_stats(&ballots, &rules(1)).unwrap();
        assert_eq!(res.quota, 5);
        assert_eq!(res.winners, vec![1]);
        assert_eq!(
            res.round_stats[0].eliminated,
            Some(TransferStats {
                candidate: 2,
                votes: 2,
                surplus: 0,
                transfers: vec![(1, 2)],
                exhausted: 0,
            })
        );
        assert_eq!(res.round_stats[1].tally, vec![4, 5, 0]);
        assert_eq!(res.round_stats[1].elected[0].candidate, 1);
    }

    #[test]
    fn surplus_elects_second_seat() {
        init();
        let ballots = repeat(&[(&[1, 2, 0], 6), (&[0, 0, 1], 2), (&[0, 1, 0], 2)]);
        let res = run_voting_stats(&ballots, &rules(2)).unwrap();
        assert_eq!(res.quota, 4);
        assert_eq!(res.winners, vec![0, 1]);
        let first = &res.round_stats[0];
        assert_eq!(first.tally, vec![6, 2, 2]);
        assert_eq!(first.elected[0].surplus, 2);
        assert_eq!(first.elected[0].transfers, vec![(1, 2)]);
        assert_eq!(res.round_stats[1].tally, vec![0, 4, 2]);
    }

    #[test]
    fn two_winners_in_one_round() {
        init();
        let rows: Vec<Vec<Rank>> = vec![
            vec![1, 2, 0],
            vec![1, 0, 2],
            vec![1, 2, 3],
            vec![1, 3, 2],
            vec![2, 1, 0],
            vec![0, 1, 2],
            vec![3, 1, 2],
            vec![0, 1, 0],
            vec![0, 0, 1],
        ];
        let ballots = RankMatrix::from_rows(&rows).unwrap();
        let r = VoteRules {
            random_seed: Some(5),
            ..VoteRules::with_seats(2)
        };
        let res = run_voting_stats(&ballots, &r).unwrap();
        assert_eq!(res.quota, 4);
        assert_eq!(res.winners, vec![0, 1]);
        assert_eq!(res.round_stats.len(), 1);
        assert_eq!(res.round_stats[0].tally, vec![4, 4, 1]);
        let no_surplus = |candidate| TransferStats {
            candidate,
            votes: 4,
            surplus: 0,
            transfers: vec![],
            exhausted: 0,
        };
        assert_eq!(res.round_stats[0].elected, vec![no_surplus(0), no_surplus(1)]);
    }

    #[test]
    fn same_round_winners_use_their_own_seed() {
        init();
        let ballots = repeat(&[
            (&[1, 0, 2, 0], 2),
            (&[1, 0, 0, 2], 2),
            (&[1, 0, 2, 3], 1),
            (&[1, 0, 3, 2], 1),
            (&[0, 1, 2, 0], 2),
            (&[0, 1, 0, 2], 2),
            (&[0, 1, 0, 0], 1),
            (&[0, 1, 3, 2], 1),
        ]);
        let seed = 5;
        let r = VoteRules {
            random_seed: Some(seed),
            ..VoteRules::with_seats(2)
        };
        let res = run_voting_stats(&ballots, &r).unwrap();
        assert_eq!(res.quota, 5);
        assert_eq!(res.winners, vec![0, 1]);
        assert_eq!(res.round_stats.len(), 1);

        // Replays the two transfers, the second one on the matrix left by the first.
        let mut replay = normalized(&ballots);
        let first = transfer_surplus(&mut replay, 0, 5, derive_seed(seed, 1, 0));
        let second = transfer_surplus(&mut replay, 1, 5, derive_seed(seed, 1, 1));
        assert_eq!(first.surplus, 1);
        assert_eq!(second.surplus, 1);
        assert_eq!(res.round_stats[0].elected, vec![first, second]);
    }

    #[test]
    fn stops_when_seats_are_filled() {
        init();
        let ballots = repeat(&[
            (&[1, 0, 0, 0], 1),
            (&[0, 1, 0, 0], 1),
            (&[0, 0, 1, 0], 1),
            (&[0, 0, 0, 1], 1),
        ]);
        let r = VoteRules {
            quota_mode: QuotaMode::Hare,
            ..rules(3)
        };
        let res = run_voting_stats(&ballots, &r).unwrap();
        // Every candidate reaches the quota of 1, only three seats.
        assert_eq!(res.quota, 1);
        assert_eq!(res.winners, vec![0, 1, 2]);
        assert_eq!(res.round_stats.len(), 1);
        assert_eq!(res.round_stats[0].elected.len(), 3);
    }

    #[test]
    fn hare_quota_needs_a_vote() {
        init();
        let ballots = repeat(&[(&[1, 2, 3], 1)]);
        let r = VoteRules {
            quota_mode: QuotaMode::Hare,
            ..rules(2)
        };
        // A single ballot elects a single candidate, the others got no vote.
        assert_eq!(
            run_voting_stats(&ballots, &r),
            Err(VotingErrors::DegenerateElection {
                round: 2,
                needed: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn alternating_ballots_report_the_tie() {
        init();
        let mut rows: Vec<Vec<Rank>> = Vec::new();
        for _ in 0..5 {
            rows.push(vec![1, 2]);
            rows.push(vec![2, 1]);
        }
        let res = run_stv(&rows, &rules(1));
        assert_eq!(
            res,
            Err(VotingErrors::UnresolvedTie {
                round: 1,
                candidates: vec![0, 1]
            })
        );
    }

    #[test]
    fn more_seats_than_candidates() {
        let ballots = repeat(&[(&[1, 2], 3)]);
        assert_eq!(
            run_voting_stats(&ballots, &rules(3)),
            Err(VotingErrors::DegenerateElection {
                round: 1,
                needed: 3,
                remaining: 2
            })
        );
    }

    #[test]
    fn exhausted_candidates_are_degenerate() {
        init();
        let ballots = repeat(&[(&[1, 0, 0], 3), (&[0, 1, 0], 2), (&[0, 0, 1], 1)]);
        assert_eq!(
            run_voting_stats(&ballots, &rules(1)),
            Err(VotingErrors::DegenerateElection {
                round: 4,
                needed: 1,
                remaining: 0
            })
        );

        let elect_remaining = VoteRules {
            elect_remaining: true,
            ..rules(1)
        };
        let res = run_voting_stats(&ballots, &elect_remaining).unwrap();
        assert_eq!(res.winners, vec![0]);
        assert_eq!(res.round_stats.len(), 3);
    }

    #[test]
    fn invalid_inputs() {
        let rows: Vec<Vec<Rank>> = vec![vec![1, 2], vec![1]];
        assert_eq!(
            run_stv(&rows, &rules(1)),
            Err(VotingErrors::InvalidShape {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        let rows: Vec<Vec<Rank>> = vec![vec![1, 2]];
        assert_eq!(run_stv(&rows, &rules(0)), Err(VotingErrors::NoSeats {}));
        let rows: Vec<Vec<Rank>> = vec![];
        assert_eq!(run_stv(&rows, &rules(1)), Err(VotingErrors::EmptyElection {}));
    }

    #[test]
    fn quota_counts_active_ballots() {
        let rows: Vec<Vec<Rank>> = vec![vec![1, 2], vec![0, 0], vec![2, 1], vec![1, 2]];
        let matrix = RankMatrix::from_rows(&rows).unwrap();
        let res = run_voting_stats(&matrix, &rules(1)).unwrap();
        assert_eq!(res.quota, 2);
        assert_eq!(res.winners, vec![0]);
        // The caller's ballots are left untouched.
        assert_eq!(matrix.rows(), rows.as_slice());
    }

    #[test]
    fn status_view() {
        let rows: Vec<Vec<Rank>> = vec![vec![1, 0, 2], vec![0, 0, 1]];
        let matrix = RankMatrix::from_rows(&rows).unwrap();
        assert_eq!(candidate_status(&matrix, &[], 0), CandidateStatus::Active);
        assert_eq!(candidate_status(&matrix, &[], 1), CandidateStatus::Eliminated);
        assert_eq!(candidate_status(&matrix, &[1], 1), CandidateStatus::Elected);
    }

    fn random_election(seed: u64, voters: usize, candidates: usize) -> RankMatrix {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rows: Vec<Vec<Rank>> = Vec::new();
        for _ in 0..voters {
            let mut row: Vec<Rank> = (1..=candidates as Rank).collect();
            row.shuffle(&mut rng);
            rows.push(row);
        }
        RankMatrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn random_elections_fill_all_seats() {
        init();
        for seed in 0..20u64 {
            let ballots = random_election(seed, 12, 5);
            let r = VoteRules {
                random_seed: Some(seed),
                tiebreak_mode: TieBreakMode::UseCandidateOrder,
                ..VoteRules::with_seats(2)
            };
            let res = run_voting_stats(&ballots, &r).unwrap();
            assert_eq!(res.winners.len(), 2);
            assert_ne!(res.winners[0], res.winners[1]);
            // Same seed, same outcome.
            assert_eq!(run_voting_stats(&ballots, &r).unwrap(), res);
        }
    }
}
