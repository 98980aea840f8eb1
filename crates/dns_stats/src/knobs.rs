//! Tunable parameters for the statistics core.
//!
//! Every knob can be overridden with an environment variable of the same
//! name.
#![deny(missing_docs)]

use std::sync::LazyLock;

use cmd_util::env::env_config;

/// Upper bound for [`STATS_HISTORY_ELEMENTS`]. Larger overrides are capped to
/// it.
pub const MAX_STATS_HISTORY_ELEMENTS: usize = 100_000;

/// Number of buckets each periodic series holds. A report can cover at most
/// `STATS_HISTORY_ELEMENTS - 1` buckets, since rates are computed between
/// adjacent buckets.
pub static STATS_HISTORY_ELEMENTS: LazyLock<usize> =
    LazyLock::new(|| cap_history_elements(env_config("STATS_HISTORY_ELEMENTS", 60)));

/// How many entries a top-N ranking returns when the request doesn't say.
pub static STATS_TOP_DEFAULT: LazyLock<usize> =
    LazyLock::new(|| env_config("STATS_TOP_DEFAULT", 10));

fn cap_history_elements(requested: usize) -> usize {
    if requested > MAX_STATS_HISTORY_ELEMENTS {
        tracing::warn!(
            "STATS_HISTORY_ELEMENTS={requested} is too large, capping to \
             {MAX_STATS_HISTORY_ELEMENTS}"
        );
        return MAX_STATS_HISTORY_ELEMENTS;
    }
    requested
}
