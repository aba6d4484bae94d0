use log::debug;
use snafu::ensure;

use crate::config::*;

/// Rank given by a voter to a candidate. 1 is the most preferred, 0 means
/// that the candidate is not (or no longer) ranked on this ballot.
pub type Rank = u32;

/// Voters as rows, candidates as columns.
///
/// Invariant (after [`normalize`]): the non-zero entries of every row are
/// exactly `1..=k` for some `k`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct RankMatrix {
    num_candidates: usize,
    rows: Vec<Vec<Rank>>,
}

impl RankMatrix {
    /// Copies the rows into a new matrix, checking that they all have the
    /// same width.
    pub fn from_rows<R: AsRef<[Rank]>>(rows: &[R]) -> Result<RankMatrix, VotingErrors> {
        let num_candidates = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut res: Vec<Vec<Rank>> = Vec::with_capacity(rows.len());
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            ensure!(
                r.len() == num_candidates,
                InvalidShapeSnafu {
                    row,
                    expected: num_candidates,
                    found: r.len(),
                }
            );
            res.push(r.to_vec());
        }
        Ok(RankMatrix {
            num_candidates,
            rows: res,
        })
    }

    pub(crate) fn with_candidates(num_candidates: usize) -> RankMatrix {
        RankMatrix {
            num_candidates,
            rows: Vec::new(),
        }
    }

    pub(crate) fn push_row(&mut self, row: Vec<Rank>) {
        debug_assert_eq!(row.len(), self.num_candidates);
        self.rows.push(row);
    }

    pub fn num_voters(&self) -> usize {
        self.rows.len()
    }

    pub fn num_candidates(&self) -> usize {
        self.num_candidates
    }

    pub fn rows(&self) -> &[Vec<Rank>] {
        &self.rows
    }

    pub fn row(&self, voter: usize) -> &[Rank] {
        &self.rows[voter]
    }

    pub(crate) fn row_mut(&mut self, voter: usize) -> &mut [Rank] {
        &mut self.rows[voter]
    }

    pub fn get(&self, voter: usize, candidate: CandidateIndex) -> Rank {
        self.rows[voter][candidate]
    }

    pub(crate) fn zero_column(&mut self, candidate: CandidateIndex) {
        for row in self.rows.iter_mut() {
            row[candidate] = 0;
        }
    }

    pub(crate) fn zero_row(&mut self, voter: usize) {
        for r in self.rows[voter].iter_mut() {
            *r = 0;
        }
    }

    pub fn column_is_zero(&self, candidate: CandidateIndex) -> bool {
        self.rows.iter().all(|row| row[candidate] == 0)
    }

    pub fn row_is_zero(&self, voter: usize) -> bool {
        self.rows[voter].iter().all(|r| *r == 0)
    }

    /// Number of ballots that still rank at least one candidate.
    pub fn active_ballots(&self) -> usize {
        (0..self.rows.len()).filter(|v| !self.row_is_zero(*v)).count()
    }

    /// Count, per candidate, of the voters giving exactly `rank` to this candidate.
    pub fn tally_at_rank(&self, rank: Rank) -> Vec<u64> {
        let mut tally = vec![0u64; self.num_candidates];
        for row in self.rows.iter() {
            for (cid, r) in row.iter().enumerate() {
                if *r == rank {
                    tally[cid] += 1;
                }
            }
        }
        tally
    }

    /// First-rank tally.
    pub fn tally(&self) -> Vec<u64> {
        self.tally_at_rank(1)
    }

    /// The candidate ranked first on this ballot, if any.
    pub fn first_choice(&self, voter: usize) -> Option<CandidateIndex> {
        self.rows[voter].iter().position(|r| *r == 1)
    }

    pub fn first_choices(&self) -> Vec<Option<CandidateIndex>> {
        (0..self.rows.len()).map(|v| self.first_choice(v)).collect()
    }

    /// The voters ranking this candidate first, in increasing order.
    pub fn voters_ranking_first(&self, candidate: CandidateIndex) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(v, row)| if row[candidate] == 1 { Some(v) } else { None })
            .collect()
    }

    pub fn is_dense(&self) -> bool {
        self.rows.iter().all(|row| {
            let mut ranks: Vec<Rank> = row.iter().cloned().filter(|r| *r > 0).collect();
            ranks.sort_unstable();
            ranks.iter().enumerate().all(|(idx, r)| *r as usize == idx + 1)
        })
    }
}

/// Rewrites every row so that the ranked candidates get the ranks `1..=k`
/// while keeping their relative order. Equal values keep the column order.
/// Unranked cells stay at zero.
pub fn normalize(matrix: &mut RankMatrix) {
    let mut order: Vec<CandidateIndex> = Vec::with_capacity(matrix.num_candidates);
    for row in matrix.rows.iter_mut() {
        order.clear();
        order.extend((0..row.len()).filter(|cid| row[*cid] > 0));
        // The sort is stable: ties are resolved by column order.
        order.sort_by_key(|cid| row[*cid]);
        for (pos, cid) in order.iter().enumerate() {
            row[*cid] = (pos + 1) as Rank;
        }
    }
    debug!(
        "normalize: {} ballots over {} candidates",
        matrix.rows.len(),
        matrix.num_candidates
    );
}

/// Same as [`normalize`], leaving the input untouched.
pub fn normalized(matrix: &RankMatrix) -> RankMatrix {
    let mut res = matrix.clone();
    normalize(&mut res);
    res
}
