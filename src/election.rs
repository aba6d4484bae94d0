use log::{debug, info};

use snafu::{prelude::*, Snafu};
use stv_voting::*;

use std::collections::HashSet;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::election::config_reader::*;

pub mod reweighted;
pub mod score;

use crate::election::reweighted::{reweighted_range, ReweightedResult};
use crate::election::score::{score_calculator, ScoreResult};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ElectionError {
    #[snafu(display("Error opening configuration file {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the election configuration"))]
    ParsingConfig { source: serde_json::Error },
    #[snafu(display("Error serializing the election summary"))]
    SerializingSummary { source: serde_json::Error },
    #[snafu(display("Tabulation failed: {source}"))]
    Voting { source: VotingErrors },
    #[snafu(display("No candidate received any score"))]
    NoScores {},
    #[snafu(display("Cannot elect {requested} winners among {candidates} candidates"))]
    TooManyWinners { requested: usize, candidates: usize },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ElectionResult<T> = Result<T, ElectionError>;

/// The result of an election, for each of the supported methods.
#[derive(PartialEq, Debug, Clone)]
pub enum ElectionOutcome {
    Stv(VotingResult),
    Score(ScoreResult),
    ReweightedRange(ReweightedResult),
}

impl ElectionOutcome {
    /// The winning columns, in the order they were elected.
    pub fn winners(&self) -> Vec<CandidateIndex> {
        match self {
            ElectionOutcome::Stv(vr) => vr.winners.clone(),
            ElectionOutcome::Score(sr) => vec![sr.winner],
            ElectionOutcome::ReweightedRange(rr) => rr.winners.clone(),
        }
    }
}

pub mod config_reader {
    use crate::election::*;

    #[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub enum Method {
        #[default]
        Stv,
        Score,
        ReweightedRange,
    }

    #[derive(PartialEq, Debug, Clone, Deserialize)]
    pub struct ElectionConfig {
        #[serde(default)]
        pub method: Method,
        #[serde(rename = "numberOfWinners")]
        pub number_of_winners: Option<u32>,
        pub reallocation: Option<String>,
        #[serde(rename = "randomSeed")]
        pub random_seed: Option<u64>,
        #[serde(rename = "tiebreakMode")]
        pub tiebreak_mode: Option<String>,
        pub quota: Option<String>,
        #[serde(rename = "electRemaining")]
        pub elect_remaining: Option<bool>,
        /// Proportionality factor of the reweighted range voting.
        #[serde(rename = "cRatio")]
        pub c_ratio: Option<f64>,
        pub candidates: Option<Vec<String>>,
        pub ballots: Vec<Vec<Rank>>,
    }

    impl ElectionConfig {
        pub fn from_json_str(s: &str) -> ElectionResult<ElectionConfig> {
            serde_json::from_str(s).context(ParsingConfigSnafu {})
        }

        pub fn from_path(path: &str) -> ElectionResult<ElectionConfig> {
            let contents = fs::read_to_string(path).context(OpeningConfigSnafu { path })?;
            debug!("read config: {} bytes from {:?}", contents.len(), path);
            ElectionConfig::from_json_str(&contents)
        }

        pub fn num_winners(&self) -> u32 {
            self.number_of_winners.unwrap_or(1)
        }

        /// The names of the candidates, or their column numbers if not provided.
        pub fn candidate_names(&self) -> Vec<String> {
            match &self.candidates {
                Some(names) => names.clone(),
                None => {
                    let width = self.ballots.first().map(|b| b.len()).unwrap_or(0);
                    (0..width).map(|cid| cid.to_string()).collect()
                }
            }
        }
    }

    pub fn validate_rules(config: &ElectionConfig) -> ElectionResult<VoteRules> {
        let res = VoteRules {
            number_of_winners: config.num_winners(),
            reallocation: match config.reallocation.as_deref() {
                None => Reallocation::Hare,
                Some(s) => s.parse::<Reallocation>().context(VotingSnafu {})?,
            },
            random_seed: config.random_seed,
            quota_mode: match config.quota.as_deref() {
                None | Some("droop") => QuotaMode::Droop,
                Some("hare") => QuotaMode::Hare,
                Some(x) => {
                    whatever!("Cannot use quota {:?}: currently not implemented", x)
                }
            },
            tiebreak_mode: match config.tiebreak_mode.as_deref() {
                None | Some("strict") => TieBreakMode::Strict,
                Some("useCandidateOrder") => TieBreakMode::UseCandidateOrder,
                Some("random") => {
                    let seed = match config.random_seed.map(u32::try_from) {
                        Some(Ok(x)) => x,
                        x => {
                            whatever!(
                                "Tiebreak mode random needs a randomSeed that fits 32 bits, got {:?}",
                                x
                            )
                        }
                    };
                    TieBreakMode::Random(seed)
                }
                Some(x) => {
                    whatever!(
                        "Cannot use tiebreak mode {:?} (currently not implemented)",
                        x
                    )
                }
            },
            elect_remaining: config.elect_remaining.unwrap_or(false),
        };
        Ok(res)
    }
}

fn validate_candidates(config: &ElectionConfig) -> ElectionResult<()> {
    if let (Some(names), Some(first)) = (&config.candidates, config.ballots.first()) {
        if names.len() != first.len() {
            whatever!(
                "{} candidates declared but the ballots have {} columns",
                names.len(),
                first.len()
            );
        }
        let unique: HashSet<&String> = names.iter().collect();
        if unique.len() != names.len() {
            whatever!("Duplicate candidate names in {:?}", names);
        }
    }
    Ok(())
}

/// Runs the election described by the configuration.
pub fn run_election(config: &ElectionConfig) -> ElectionResult<ElectionOutcome> {
    validate_candidates(config)?;
    info!(
        "Running {:?} election with {} ballots",
        config.method,
        config.ballots.len()
    );
    let outcome = match config.method {
        Method::Stv => {
            let rules = validate_rules(config)?;
            let ballots = RankMatrix::from_rows(&config.ballots).context(VotingSnafu {})?;
            ElectionOutcome::Stv(run_voting_stats(&ballots, &rules).context(VotingSnafu {})?)
        }
        Method::Score => ElectionOutcome::Score(score_calculator(&config.ballots)?),
        Method::ReweightedRange => ElectionOutcome::ReweightedRange(reweighted_range(
            &config.ballots,
            config.num_winners() as usize,
            config.c_ratio.unwrap_or(1.0),
            None,
        )?),
    };
    info!("Winners: {:?}", outcome.winners());
    Ok(outcome)
}

fn stv_rounds_to_json(vr: &VotingResult, names: &[String]) -> Vec<JSValue> {
    let name = |cid: CandidateIndex| -> String {
        names.get(cid).cloned().unwrap_or_else(|| cid.to_string())
    };
    let transfers_to_json = |ts: &TransferStats| -> JSMap<String, JSValue> {
        let mut transfers: JSMap<String, JSValue> = JSMap::new();
        for (cid, count) in ts.transfers.iter() {
            transfers.insert(name(*cid), json!(count.to_string()));
        }
        if ts.exhausted > 0 {
            transfers.insert("exhausted".to_string(), json!(ts.exhausted.to_string()));
        }
        transfers
    };

    // Candidates elected or eliminated in an earlier round are not part of the tally.
    let mut gone: HashSet<CandidateIndex> = HashSet::new();
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in vr.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (cid, count) in round_stat.tally.iter().enumerate() {
            if !gone.contains(&cid) {
                tally.insert(name(cid), json!(count.to_string()));
            }
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        for ts in round_stat.elected.iter() {
            tally_results.push(json!({
                "elected": name(ts.candidate),
                "transfers": transfers_to_json(ts)
            }));
            gone.insert(ts.candidate);
        }
        if let Some(ts) = &round_stat.eliminated {
            tally_results.push(json!({
                "eliminated": name(ts.candidate),
                "transfers": transfers_to_json(ts)
            }));
            gone.insert(ts.candidate);
        }

        l.push(json!({"round": round_stat.round, "tally": tally, "tallyResults": tally_results}));
    }
    l
}

/// A JSON summary of the outcome, using the candidate names of the configuration.
pub fn build_summary_js(config: &ElectionConfig, outcome: &ElectionOutcome) -> JSValue {
    let names = config.candidate_names();
    let name = |cid: &CandidateIndex| -> String {
        names.get(*cid).cloned().unwrap_or_else(|| cid.to_string())
    };
    let winners: Vec<String> = outcome.winners().iter().map(name).collect();
    match outcome {
        ElectionOutcome::Stv(vr) => json!({
            "method": config.method,
            "numberOfWinners": config.num_winners(),
            "threshold": vr.quota.to_string(),
            "winners": winners,
            "results": stv_rounds_to_json(vr, &names),
        }),
        ElectionOutcome::Score(sr) => {
            let mut scores: JSMap<String, JSValue> = JSMap::new();
            for (cid, s) in sr.scores.iter().enumerate() {
                scores.insert(name(&cid), json!(s));
            }
            json!({
                "method": config.method,
                "winners": winners,
                "scores": scores,
            })
        }
        ElectionOutcome::ReweightedRange(rr) => {
            let mut rounds: Vec<JSValue> = Vec::new();
            for (idx, (round_scores, winner)) in
                rr.round_scores.iter().zip(rr.winners.iter()).enumerate()
            {
                let mut scores: JSMap<String, JSValue> = JSMap::new();
                for (cid, s) in round_scores.iter().enumerate() {
                    scores.insert(name(&cid), json!(s));
                }
                rounds.push(json!({
                    "round": idx + 1,
                    "scores": scores,
                    "elected": name(winner),
                }));
            }
            json!({
                "method": config.method,
                "numberOfWinners": config.num_winners(),
                "winners": winners,
                "results": rounds,
            })
        }
    }
}

pub fn summary_to_string(summary: &JSValue) -> ElectionResult<String> {
    serde_json::to_string_pretty(summary).context(SerializingSummarySnafu {})
}

/// Reads the configuration at the given path, runs the election and returns
/// its summary.
pub fn run_election_file(config_path: &str) -> ElectionResult<JSValue> {
    info!("Attempting to read election file {:?}", config_path);
    let config = ElectionConfig::from_path(config_path)?;
    let outcome = run_election(&config)?;
    Ok(build_summary_js(&config, &outcome))
}
