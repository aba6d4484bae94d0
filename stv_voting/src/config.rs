// ********* Input data structures ***********

use snafu::Snafu;
use std::str::FromStr;

/// Identifies a candidate by its column in the ballot matrix.
pub type CandidateIndex = usize;

// ******** Output data structures *********

/// Movement of ballots away from one candidate in a round.
///
/// For an elected candidate, `surplus` is the number of ballots that kept
/// circulating. For an eliminated candidate it is always zero.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TransferStats {
    pub candidate: CandidateIndex,
    /// First-rank votes held by the candidate when it was processed.
    pub votes: u64,
    pub surplus: u64,
    /// New first choice of each moved ballot, in column order.
    pub transfers: Vec<(CandidateIndex, u64)>,
    pub exhausted: u64,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// First-rank tally of every column at the start of the round.
    pub tally: Vec<u64>,
    pub elected: Vec<TransferStats>,
    pub eliminated: Option<TransferStats>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VotingResult {
    /// Winning columns, in the order they were elected.
    pub winners: Vec<CandidateIndex>,
    pub quota: u64,
    pub round_stats: Vec<RoundStats>,
}

/// Status of a candidate, derived from the ballot matrix and the winners.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum CandidateStatus {
    Active,
    Eliminated,
    Elected,
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VotingErrors {
    #[snafu(display("ballot row {row} has {found} entries, expected {expected}"))]
    InvalidShape {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[snafu(display("the number of seats must be positive"))]
    NoSeats {},
    #[snafu(display("the election has no candidates or no ballots"))]
    EmptyElection {},
    #[snafu(display(
        "round {round}: {needed} seats still to fill but only {remaining} candidates remain"
    ))]
    DegenerateElection {
        round: u32,
        needed: usize,
        remaining: usize,
    },
    #[snafu(display("round {round}: tie between candidates {candidates:?} could not be broken"))]
    UnresolvedTie {
        round: u32,
        candidates: Vec<CandidateIndex>,
    },
    #[snafu(display("unknown reallocation strategy {name:?}"))]
    UnknownReallocation { name: String },
}

// ********* Configuration **********

/// How the ballots of an elected candidate are redistributed.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Reallocation {
    /// Randomly selects which ballots carry the surplus forward.
    Hare,
}

impl FromStr for Reallocation {
    type Err = VotingErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hare" => Ok(Reallocation::Hare),
            x => UnknownReallocationSnafu { name: x }.fail(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum QuotaMode {
    /// floor(votes / (seats + 1)) + 1
    Droop,
    /// floor(votes / seats)
    Hare,
}

/// What to do when the elimination tie-break runs out of preference depths.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// Stop the count and report the tie.
    Strict,
    /// Eliminate the tied candidate with the highest column index.
    UseCandidateOrder,
    /// Eliminate according to a hash-based permutation of the tied candidates.
    Random(u32),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRules {
    pub number_of_winners: u32,
    pub reallocation: Reallocation,
    /// Seed for the surplus transfers. A fresh one is drawn for every
    /// election when not provided.
    pub random_seed: Option<u64>,
    pub quota_mode: QuotaMode,
    pub tiebreak_mode: TieBreakMode,
    /// Elect all the remaining candidates once they are exactly as many as
    /// the seats left to fill.
    pub elect_remaining: bool,
}

impl VoteRules {
    pub const DEFAULT_RULES: VoteRules = VoteRules {
        number_of_winners: 1,
        reallocation: Reallocation::Hare,
        random_seed: None,
        quota_mode: QuotaMode::Droop,
        tiebreak_mode: TieBreakMode::Strict,
        elect_remaining: false,
    };

    pub fn with_seats(seats: u32) -> VoteRules {
        VoteRules {
            number_of_winners: seats,
            ..VoteRules::DEFAULT_RULES
        }
    }
}

impl Default for VoteRules {
    fn default() -> Self {
        VoteRules::DEFAULT_RULES
    }
}
