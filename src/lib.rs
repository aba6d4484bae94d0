/*!
Tabulation of elections from a JSON description: single transferable vote
(through `stv_voting`), score voting and reweighted range voting.

```
use stv_tabulation::*;

let config = ElectionConfig::from_json_str(
    r#"{
        "method": "stv",
        "numberOfWinners": 1,
        "randomSeed": 3,
        "candidates": ["Anna", "Bob", "Clara"],
        "ballots": [[1, 2, 0], [1, 0, 2], [2, 1, 0], [1, 2, 3]]
    }"#,
)?;
let outcome = run_election(&config)?;
assert_eq!(outcome.winners(), vec![0]);
# Ok::<(), ElectionError>(())
```
*/

pub mod election;

pub use crate::election::config_reader::*;
pub use crate::election::reweighted::{reweighted_range, ReweightedResult};
pub use crate::election::score::{score_calculator, ScoreResult};
pub use crate::election::*;
