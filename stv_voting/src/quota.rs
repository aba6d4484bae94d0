use crate::config::QuotaMode;

/// Minimum number of votes that guarantees election: `floor(votes / (seats + 1)) + 1`.
pub fn droop_quota(votes: u64, seats: u64) -> u64 {
    votes / (seats + 1) + 1
}

/// `floor(votes / seats)`, at least 1 so that a candidate without votes never
/// reaches it. Zero seats gives a quota of zero.
pub fn hare_quota(votes: u64, seats: u64) -> u64 {
    votes.checked_div(seats).map(|q| q.max(1)).unwrap_or(0)
}

pub fn quota(mode: QuotaMode, votes: u64, seats: u64) -> u64 {
    match mode {
        QuotaMode::Droop => droop_quota(votes, seats),
        QuotaMode::Hare => hare_quota(votes, seats),
    }
}
