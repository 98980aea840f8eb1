use serde::Serialize;

use crate::{
    rate::compute_rate,
    store::{
        PeriodicStats,
        StatsMetric,
    },
    window::{
        clamp_window,
        window_slice,
    },
};

/// Per-bucket rates over a window of the periodic stats. Every series has
/// the same length and entry `k` of each series describes the same bucket.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WindowedReport {
    pub dns_queries: Vec<f64>,
    pub blocked_filtering: Vec<f64>,
    pub replaced_safebrowsing: Vec<f64>,
    pub replaced_safesearch: Vec<f64>,
    pub replaced_parental: Vec<f64>,
    /// Milliseconds.
    pub avg_processing_time: Vec<f64>,
}

impl WindowedReport {
    /// Number of buckets covered by the report.
    pub fn len(&self) -> usize {
        self.dns_queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dns_queries.is_empty()
    }
}

/// Build the report for the bucket window `[start, end)`. The window is
/// clamped to the store's history first; a window that ends up empty or
/// inverted produces empty series rather than an error, so any client
/// supplied range can be served.
pub fn build_report(stats: &PeriodicStats, start: i64, end: i64) -> WindowedReport {
    let window = clamp_window(start, end, stats.history_len());
    let rate = |metric| compute_rate(window_slice(stats.series(metric), &window));

    let count = rate(StatsMetric::ProcessingTimeCount);
    let sum = rate(StatsMetric::ProcessingTimeSum);
    // Processing time is stored in seconds and reported in milliseconds.
    let avg_processing_time = sum
        .iter()
        .zip(&count)
        .map(|(sum, count)| {
            if *count == 0.0 {
                0.0
            } else {
                sum / count * 1000.0
            }
        })
        .collect();

    WindowedReport {
        dns_queries: rate(StatsMetric::TotalRequests),
        blocked_filtering: rate(StatsMetric::FilteredLists),
        replaced_safebrowsing: rate(StatsMetric::FilteredSafebrowsing),
        replaced_safesearch: rate(StatsMetric::FilteredSafesearch),
        replaced_parental: rate(StatsMetric::FilteredParental),
        avg_processing_time,
    }
}
