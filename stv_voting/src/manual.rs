/*!

This is the long-form manual for `stv_voting`.

## Ballot matrix

The ballots are a matrix of ranks, with the voters as rows and the candidates as
columns. The cell for a voter and a candidate holds the rank given by this voter
to this candidate: `1` for the most preferred candidate, `2` for the next one,
and so on. `0` means that the candidate is not ranked on this ballot.

|          | Anna | Bob | Clara |
|----------|------|-----|-------|
| ballot 1 | 1    | 2   | 0     |
| ballot 2 | 0    | 1   | 2     |
| ballot 3 | 2    | 3   | 1     |

The ranks do not need to be compact on input: `[0, 5, 2]` is read as
`[0, 2, 1]`. Equal values are ordered by column. Ratings where a smaller value
means a stronger preference can be passed as-is.

## Counting

The count proceeds in rounds:

1. Every ballot counts for the candidate ranked first on it.
2. All the candidates reaching the quota are elected. For each of them, the
   ballots that elected them are shuffled: a quota of them is used up, the
   others (the surplus) move on to their next preference.
3. If nobody reaches the quota, the candidate with the fewest first preferences
   is eliminated and its ballots move on to their next preference.

The count stops when all the seats are filled.

### Quota

By default, the Droop quota `floor(votes / (seats + 1)) + 1` is used, where
`votes` is the number of ballots ranking at least one candidate. The Hare quota
`floor(votes / seats)` is also available through `QuotaMode::Hare`. It never
goes below 1, even with fewer ballots than seats.

### Ties

When several candidates have the fewest first preferences, the tie is broken by
the number of second preferences, then third preferences, and so on (exact
counts at each rank, not cumulative ones). If no rank separates them, the
behaviour depends on `TieBreakMode`:

- `Strict` (default): the count stops with `VotingErrors::UnresolvedTie`.
- `UseCandidateOrder`: the tied candidate with the highest column is eliminated.
- `Random(seed)`: the tied candidates are ordered by a SHA-256 digest of the
  seed, the round and the column.

### Reproducibility

The surplus transfers are random. Passing `random_seed` in the rules makes the
count reproducible: the seed of each transfer is derived from it, the round and
the elected candidate. Without a seed, a new one is drawn for every election.

### Failures

Besides ties, the count stops with `VotingErrors::DegenerateElection` when fewer
candidates remain than seats to fill. Setting `elect_remaining` elects the last
candidates instead, once they are exactly as many as the open seats.

 */
