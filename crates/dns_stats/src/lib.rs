//! Statistics for the DNS filtering service. This crate turns the raw
//! counters the service collects into the numbers its API reports.
//!
//! There are two independent pipelines:
//!
//! - Time series: the service keeps a fixed number of buckets of cumulative
//!   counters per metric (see [`PeriodicStats`]). A report clamps a requested
//!   `[start, end)` window of bucket indexes, differences adjacent buckets to
//!   recover per-bucket rates and derives the average processing time per
//!   bucket.
//! - Rankings: query log entries are scanned for a host, client or block
//!   reason, counted into a [`FrequencyMap`] and ranked by descending count.
//!
//! # Implementation notes
//! Buckets are indexed newest first: index `0` is the bucket currently being
//! written and index `i + 1` is the bucket immediately before `i`. Every
//! series in a store has the same length, so the delta series derived from
//! them stay aligned bucket for bucket.
//!
//! All computations here are pure and synchronous. [`SharedStats`] is the
//! only type that owns a lock, and it only holds it for the duration of a
//! single computation.

pub mod http;
pub mod knobs;
pub mod query_log;
mod rate;
mod report;
mod snapshot;
mod store;
mod top;
mod window;


pub use crate::{
    query_log::{
        count_field,
        LogField,
        TopStats,
    },
    rate::compute_rate,
    report::{
        build_report,
        WindowedReport,
    },
    snapshot::{
        summarize_snapshot,
        SnapshotSummary,
    },
    store::{
        FilterOutcome,
        PeriodicStats,
        SharedStats,
        StatsConfig,
        StatsMetric,
        StatsSnapshot,
        StatsStoreError,
    },
    top::{
        produce_top,
        sort_by_value,
        FrequencyMap,
        RankedMap,
    },
    window::{
        clamp_window,
        window_slice,
    },
};
