// Reweighted range voting (https://www.rangevoting.org/RRVr.html).

use crate::election::*;

#[derive(PartialEq, Debug, Clone)]
pub struct ReweightedResult {
    /// Winners, in the order they were elected.
    pub winners: Vec<CandidateIndex>,
    /// Weighted score of every candidate, for each round.
    pub round_scores: Vec<Vec<f64>>,
}

/// Multi-winner election using reweighted range voting.
///
/// Arguments:
/// * `data` the ratings, voters as rows and candidates as columns. 0 means unrated.
/// * `num_winners` the number of candidates to elect
/// * `c_ratio` the proportionality factor. 1.0 gives greatest divisors
/// (d'Hondt, Jefferson), 0.5 gives major fractions (Webster, Sainte-Laguë).
/// * `weights` the initial weight of each voter, uniform if not provided
pub fn reweighted_range(
    data: &[Vec<u32>],
    num_winners: usize,
    c_ratio: f64,
    weights: Option<&[f64]>,
) -> ElectionResult<ReweightedResult> {
    let matrix = RankMatrix::from_rows(data).context(VotingSnafu {})?;
    let num_voters = matrix.num_voters();
    let num_candidates = matrix.num_candidates();
    ensure!(
        num_winners <= num_candidates,
        TooManyWinnersSnafu {
            requested: num_winners,
            candidates: num_candidates,
        }
    );
    if c_ratio <= 0.0 {
        whatever!("The proportionality factor must be positive, got {}", c_ratio);
    }
    let max_score = data.iter().flatten().max().cloned().unwrap_or(0);
    ensure!(max_score > 0, NoScoresSnafu {});
    let c = max_score as f64 * c_ratio;

    let mut weights: Vec<f64> = match weights {
        Some(w) if w.len() == num_voters => w.to_vec(),
        Some(w) => {
            whatever!("Expected {} voter weights, got {}", num_voters, w.len())
        }
        None => vec![1.0; num_voters],
    };
    // Total score given to the winners by each voter.
    let mut winner_sum: Vec<f64> = vec![0.0; num_voters];
    let mut winners: Vec<CandidateIndex> = Vec::new();
    let mut round_scores: Vec<Vec<f64>> = Vec::new();

    for num_round in 1..=num_winners {
        // Winners keep a score of zero.
        let mut sums: Vec<f64> = vec![0.0; num_candidates];
        for (row, w) in matrix.rows().iter().zip(weights.iter()) {
            for (cid, rating) in row.iter().enumerate() {
                if !winners.contains(&cid) {
                    sums[cid] += *rating as f64 * w;
                }
            }
        }
        info!("Round {}: net scores {:?}", num_round, sums);

        // The first candidate with the greatest score, skipping the winners.
        let mut winner: Option<CandidateIndex> = None;
        for cid in (0..num_candidates).filter(|cid| !winners.contains(cid)) {
            match winner {
                Some(w) if sums[w] >= sums[cid] => {}
                _ => winner = Some(cid),
            }
        }
        let winner = winner.context(NoScoresSnafu {})?;
        info!("Round {}: winner {}", num_round, winner);

        for (voter, ws) in winner_sum.iter_mut().enumerate() {
            *ws += matrix.get(voter, winner) as f64;
        }
        for (w, ws) in weights.iter_mut().zip(winner_sum.iter()) {
            *w = c / (c + ws);
        }
        winners.push(winner);
        round_scores.push(sums);
    }

    Ok(ReweightedResult {
        winners,
        round_scores,
    })
}
