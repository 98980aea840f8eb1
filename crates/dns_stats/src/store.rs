use std::{
    fmt,
    time::Duration,
};

use parking_lot::RwLock;

use crate::{
    knobs::STATS_HISTORY_ELEMENTS,
    report::{
        build_report,
        WindowedReport,
    },
    snapshot::{
        summarize_snapshot,
        SnapshotSummary,
    },
};

const NUM_METRICS: usize = 7;

/// The counters tracked per bucket. Each one has its own series in
/// [`PeriodicStats`] and its own field in [`StatsSnapshot`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatsMetric {
    TotalRequests,
    FilteredLists,
    FilteredSafebrowsing,
    FilteredSafesearch,
    FilteredParental,
    /// Sum of processing times, in seconds.
    ProcessingTimeSum,
    ProcessingTimeCount,
}

impl StatsMetric {
    pub const ALL: [StatsMetric; NUM_METRICS] = [
        StatsMetric::TotalRequests,
        StatsMetric::FilteredLists,
        StatsMetric::FilteredSafebrowsing,
        StatsMetric::FilteredSafesearch,
        StatsMetric::FilteredParental,
        StatsMetric::ProcessingTimeSum,
        StatsMetric::ProcessingTimeCount,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatsMetric::TotalRequests => "total_requests",
            StatsMetric::FilteredLists => "filtered_lists",
            StatsMetric::FilteredSafebrowsing => "filtered_safebrowsing",
            StatsMetric::FilteredSafesearch => "filtered_safesearch",
            StatsMetric::FilteredParental => "filtered_parental",
            StatsMetric::ProcessingTimeSum => "processing_time_sum",
            StatsMetric::ProcessingTimeCount => "processing_time_count",
        }
    }
}

impl fmt::Display for StatsMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a single DNS query was handled, as far as the statistics care.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterOutcome {
    NotFiltered,
    FilteredList,
    FilteredSafeBrowsing,
    FilteredSafeSearch,
    FilteredParental,
}

impl FilterOutcome {
    /// The filter counter this outcome increments, if any.
    pub fn metric(&self) -> Option<StatsMetric> {
        match self {
            FilterOutcome::NotFiltered => None,
            FilterOutcome::FilteredList => Some(StatsMetric::FilteredLists),
            FilterOutcome::FilteredSafeBrowsing => Some(StatsMetric::FilteredSafebrowsing),
            FilterOutcome::FilteredSafeSearch => Some(StatsMetric::FilteredSafesearch),
            FilterOutcome::FilteredParental => Some(StatsMetric::FilteredParental),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct StatsConfig {
    /// Number of buckets in every series.
    pub history_len: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            history_len: *STATS_HISTORY_ELEMENTS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatsStoreError {
    #[error("Series for {metric} has {actual} buckets, expected {expected}")]
    SeriesLengthMismatch {
        metric: StatsMetric,
        expected: usize,
        actual: usize,
    },
}

/// Bucketed history of cumulative counters, one series per [`StatsMetric`].
/// Index `0` is the newest bucket.
#[derive(Clone, Debug)]
pub struct PeriodicStats {
    config: StatsConfig,
    series: [Vec<f64>; NUM_METRICS],
}

impl PeriodicStats {
    pub fn new(config: StatsConfig) -> Self {
        Self {
            config,
            series: std::array::from_fn(|_| vec![0.0; config.history_len]),
        }
    }

    /// Build a store from existing series. Metrics that aren't provided are
    /// zero filled. Fails if any provided series doesn't have exactly
    /// `config.history_len` buckets.
    pub fn from_series(
        config: StatsConfig,
        series: impl IntoIterator<Item = (StatsMetric, Vec<f64>)>,
    ) -> Result<Self, StatsStoreError> {
        let mut stats = Self::new(config);
        for (metric, values) in series {
            if values.len() != config.history_len {
                return Err(StatsStoreError::SeriesLengthMismatch {
                    metric,
                    expected: config.history_len,
                    actual: values.len(),
                });
            }
            stats.series[metric.index()] = values;
        }
        Ok(stats)
    }

    pub fn history_len(&self) -> usize {
        self.config.history_len
    }

    pub fn series(&self, metric: StatsMetric) -> &[f64] {
        &self.series[metric.index()]
    }

    /// Add `amount` to the newest bucket of `metric`.
    pub fn record(&mut self, metric: StatsMetric, amount: f64) {
        if let Some(newest) = self.series[metric.index()].first_mut() {
            *newest += amount;
        }
    }

    /// Start a new bucket in every series. The oldest bucket is dropped and
    /// the new bucket starts from the previous newest value, so a bucket
    /// that records nothing has a zero rate.
    pub fn advance_bucket(&mut self) {
        for series in &mut self.series {
            series.rotate_right(1);
            if series.len() > 1 {
                series[0] = series[1];
            }
        }
    }

    /// Time series report for the bucket window `[start, end)`.
    pub fn report(&self, start: i64, end: i64) -> WindowedReport {
        build_report(self, start, end)
    }
}

/// Running totals since the service started.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatsSnapshot {
    pub total_requests: f64,
    pub filtered_lists: f64,
    pub filtered_safebrowsing: f64,
    pub filtered_safesearch: f64,
    pub filtered_parental: f64,
    /// Seconds.
    pub processing_time_sum: f64,
    pub processing_time_count: f64,
}

impl StatsSnapshot {
    pub fn record(&mut self, metric: StatsMetric, amount: f64) {
        let value = match metric {
            StatsMetric::TotalRequests => &mut self.total_requests,
            StatsMetric::FilteredLists => &mut self.filtered_lists,
            StatsMetric::FilteredSafebrowsing => &mut self.filtered_safebrowsing,
            StatsMetric::FilteredSafesearch => &mut self.filtered_safesearch,
            StatsMetric::FilteredParental => &mut self.filtered_parental,
            StatsMetric::ProcessingTimeSum => &mut self.processing_time_sum,
            StatsMetric::ProcessingTimeCount => &mut self.processing_time_count,
        };
        *value += amount;
    }

    pub fn summary(&self) -> SnapshotSummary {
        summarize_snapshot(self)
    }
}

struct StatsState {
    periodic: PeriodicStats,
    snapshot: StatsSnapshot,
}

impl StatsState {
    fn record(&mut self, metric: StatsMetric, amount: f64) {
        self.periodic.record(metric, amount);
        self.snapshot.record(metric, amount);
    }
}

/// The statistics a running service shares between its query path, which
/// records, and its API, which reads.
pub struct SharedStats {
    inner: RwLock<StatsState>,
}

impl SharedStats {
    pub fn new(config: StatsConfig) -> Self {
        Self {
            inner: RwLock::new(StatsState {
                periodic: PeriodicStats::new(config),
                snapshot: StatsSnapshot::default(),
            }),
        }
    }

    /// Count one processed query into the newest bucket and the snapshot.
    pub fn record_query(&self, outcome: FilterOutcome, elapsed: Duration) {
        let mut state = self.inner.write();
        state.record(StatsMetric::TotalRequests, 1.0);
        if let Some(metric) = outcome.metric() {
            state.record(metric, 1.0);
        }
        state.record(StatsMetric::ProcessingTimeSum, elapsed.as_secs_f64());
        state.record(StatsMetric::ProcessingTimeCount, 1.0);
    }

    pub fn advance_bucket(&self) {
        let mut state = self.inner.write();
        state.periodic.advance_bucket();
        tracing::debug!(
            "Advanced stats bucket, {} queries so far",
            state.snapshot.total_requests
        );
    }

    pub fn history_len(&self) -> usize {
        self.inner.read().periodic.history_len()
    }

    pub fn report(&self, start: i64, end: i64) -> WindowedReport {
        self.inner.read().periodic.report(start, end)
    }

    pub fn summary(&self) -> SnapshotSummary {
        self.inner.read().snapshot.summary()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.inner.read().snapshot.clone()
    }
}

impl Default for SharedStats {
    fn default() -> Self {
        Self::new(StatsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::Arc,
        thread,
        time::Duration,
    };

    use super::*;

    fn config(history_len: usize) -> StatsConfig {
        StatsConfig { history_len }
    }

    #[test]
    fn test_new_store_is_zero_filled() {
        let stats = PeriodicStats::new(config(4));
        for metric in StatsMetric::ALL {
            assert_eq!(stats.series(metric), &[0.0; 4]);
        }
    }

    #[test]
    fn test_from_series_rejects_misaligned_series() {
        let err = PeriodicStats::from_series(
            config(3),
            [(StatsMetric::FilteredParental, vec![1.0, 2.0])],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StatsStoreError::SeriesLengthMismatch {
                metric: StatsMetric::FilteredParental,
                expected: 3,
                actual: 2,
            }
        ));
    }

    #[test]
    fn test_record_and_advance() {
        cmd_util::env::config_test();
        let mut stats = PeriodicStats::new(config(3));
        stats.record(StatsMetric::TotalRequests, 5.0);
        stats.advance_bucket();
        stats.record(StatsMetric::TotalRequests, 2.0);
        stats.advance_bucket();
        assert_eq!(stats.series(StatsMetric::TotalRequests), &[7.0, 7.0, 5.0]);

        // The oldest bucket falls off the end.
        stats.record(StatsMetric::TotalRequests, 1.0);
        stats.advance_bucket();
        assert_eq!(stats.series(StatsMetric::TotalRequests), &[8.0, 8.0, 7.0]);

        // Only the quiet newest bucket has a zero rate.
        assert_eq!(stats.report(0, 3).dns_queries, vec![0.0, 1.0]);
    }

    #[test]
    fn test_degenerate_history_lengths() {
        let mut empty = PeriodicStats::new(config(0));
        empty.record(StatsMetric::TotalRequests, 1.0);
        empty.advance_bucket();
        assert!(empty.series(StatsMetric::TotalRequests).is_empty());

        let mut single = PeriodicStats::new(config(1));
        single.record(StatsMetric::TotalRequests, 1.0);
        single.advance_bucket();
        single.record(StatsMetric::TotalRequests, 1.0);
        assert_eq!(single.series(StatsMetric::TotalRequests), &[2.0]);
    }

    #[test]
    fn test_shared_stats_records_queries() {
        cmd_util::env::config_test();
        let stats = SharedStats::new(config(4));
        stats.record_query(FilterOutcome::NotFiltered, Duration::from_millis(10));
        stats.record_query(FilterOutcome::FilteredParental, Duration::from_millis(30));
        stats.advance_bucket();
        stats.record_query(FilterOutcome::FilteredList, Duration::from_millis(20));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 3.0);
        assert_eq!(snapshot.filtered_parental, 1.0);
        assert_eq!(snapshot.filtered_lists, 1.0);
        assert_eq!(snapshot.processing_time_count, 3.0);

        let report = stats.report(0, 3);
        assert_eq!(report.dns_queries, vec![1.0, 2.0]);
        assert_eq!(report.replaced_parental, vec![0.0, 1.0]);
        assert_eq!(report.blocked_filtering, vec![1.0, 0.0]);
        assert!((report.avg_processing_time[0] - 20.0).abs() < 1e-9);
        assert!((report.avg_processing_time[1] - 20.0).abs() < 1e-9);

        let summary = stats.summary();
        assert_eq!(summary.dns_queries, 3.0);
        assert!((summary.avg_processing_time - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_shared_stats_concurrent_readers() {
        let stats = Arc::new(SharedStats::new(config(8)));
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let stats = stats.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        stats.record_query(FilterOutcome::NotFiltered, Duration::from_millis(1));
                        let report = stats.report(0, 8);
                        assert_eq!(report.len(), 7);
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(stats.snapshot().total_requests, 400.0);
        assert_eq!(stats.history_len(), 8);
    }
}
