// Score voting: the candidate with the largest sum of ratings wins.

use crate::election::*;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoreResult {
    pub winner: CandidateIndex,
    /// Sum of the ratings received by each candidate.
    pub scores: Vec<u64>,
}

/// Sums the ratings (voters as rows, candidates as columns) of each candidate.
/// Among candidates with the same total, the last column wins.
pub fn score_calculator(data: &[Vec<u32>]) -> ElectionResult<ScoreResult> {
    let matrix = RankMatrix::from_rows(data).context(VotingSnafu {})?;
    let mut scores: Vec<u64> = vec![0; matrix.num_candidates()];
    for row in matrix.rows() {
        for (cid, rating) in row.iter().enumerate() {
            scores[cid] += *rating as u64;
        }
    }
    debug!("score_calculator: scores {:?}", scores);

    let winner = scores
        .iter()
        .enumerate()
        .max_by_key(|(_, s)| **s)
        .map(|(cid, _)| cid)
        .context(NoScoresSnafu {})?;
    Ok(ScoreResult { winner, scores })
}
