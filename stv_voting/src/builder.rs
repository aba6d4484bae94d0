use snafu::ensure;

pub use crate::config::*;
use crate::matrix::{Rank, RankMatrix};

/// A builder for adding ballots one row at a time.
///
/// Every row is checked against the number of candidates when it is added.
///
/// ```
/// pub use stv_voting::builder::Builder;
/// pub use stv_voting::VoteRules;
/// # use stv_voting::VotingErrors;
///
/// let mut builder = Builder::new(&VoteRules::with_seats(1))?.candidates(3)?;
///
/// builder.add_ballots(&[1, 2, 0], 3)?;
/// builder.add_ballot(&[2, 1, 0])?;
///
/// let result = builder.run()?;
/// assert_eq!(result.winners, vec![0]);
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: VoteRules,
    pub(crate) _ballots: RankMatrix,
}

impl Builder {
    pub fn new(rules: &VoteRules) -> Result<Builder, VotingErrors> {
        ensure!(rules.number_of_winners > 0, NoSeatsSnafu {});
        Ok(Builder {
            _rules: rules.clone(),
            _ballots: RankMatrix::with_candidates(0),
        })
    }

    /// Sets the number of candidates. Ballots added before are dropped.
    pub fn candidates(self, num_candidates: usize) -> Result<Builder, VotingErrors> {
        ensure!(num_candidates > 0, EmptyElectionSnafu {});
        Ok(Builder {
            _rules: self._rules,
            _ballots: RankMatrix::with_candidates(num_candidates),
        })
    }

    /// Adds the ranks given by one voter, one entry per candidate.
    pub fn add_ballot(&mut self, ranks: &[Rank]) -> Result<(), VotingErrors> {
        self.add_ballots(ranks, 1)
    }

    /// Adds `count` identical ballots.
    pub fn add_ballots(&mut self, ranks: &[Rank], count: u32) -> Result<(), VotingErrors> {
        ensure!(
            ranks.len() == self._ballots.num_candidates(),
            InvalidShapeSnafu {
                row: self._ballots.num_voters(),
                expected: self._ballots.num_candidates(),
                found: ranks.len(),
            }
        );
        for _ in 0..count {
            self._ballots.push_row(ranks.to_vec());
        }
        Ok(())
    }

    pub fn build(&self) -> RankMatrix {
        self._ballots.clone()
    }

    pub fn run(&self) -> Result<VotingResult, VotingErrors> {
        crate::run_voting_stats(&self._ballots, &self._rules)
    }
}
