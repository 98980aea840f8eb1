use serde::Serialize;

use crate::store::StatsSnapshot;

/// Totals since start, as reported by the stats API. Unlike
/// [`crate::WindowedReport`] these are plain running totals, not rates, and
/// `avg_processing_time` is left in seconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub dns_queries: f64,
    pub blocked_filtering: f64,
    pub replaced_safebrowsing: f64,
    pub replaced_safesearch: f64,
    pub replaced_parental: f64,
    pub avg_processing_time: f64,
}

pub fn summarize_snapshot(snapshot: &StatsSnapshot) -> SnapshotSummary {
    let avg_processing_time = if snapshot.processing_time_count > 0.0 {
        snapshot.processing_time_sum / snapshot.processing_time_count
    } else {
        0.0
    };
    SnapshotSummary {
        dns_queries: snapshot.total_requests,
        blocked_filtering: snapshot.filtered_lists,
        replaced_safebrowsing: snapshot.filtered_safebrowsing,
        replaced_safesearch: snapshot.filtered_safesearch,
        replaced_parental: snapshot.filtered_parental,
        avg_processing_time,
    }
}
