//! Frequency counting over decoded query log entries.
//!
//! Entries are loosely typed JSON. Every accessor here narrows to a string
//! and treats a missing field or a value of the wrong shape as absent, so a
//! malformed entry is skipped rather than failing the whole scan.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::top::{
    produce_top,
    FrequencyMap,
    RankedMap,
};

/// Block reasons are prefixed with this when a filter acted on the query.
const FILTERED_REASON_PREFIX: &str = "Filtered";

/// The queried host, from `entry.question.host`.
pub fn get_host(entry: &JsonValue) -> Option<&str> {
    entry.get("question")?.get("host")?.as_str()
}

/// Why the query was or wasn't filtered, from `entry.reason`.
pub fn get_reason(entry: &JsonValue) -> Option<&str> {
    entry.get("reason")?.as_str()
}

/// The client that sent the query, from `entry.client`.
pub fn get_client(entry: &JsonValue) -> Option<&str> {
    entry.get("client")?.as_str()
}

pub fn is_filtered_reason(reason: &str) -> bool {
    reason.starts_with(FILTERED_REASON_PREFIX)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogField {
    Host,
    Reason,
    Client,
}

impl LogField {
    pub fn extract<'a>(&self, entry: &'a JsonValue) -> Option<&'a str> {
        match self {
            LogField::Host => get_host(entry),
            LogField::Reason => get_reason(entry),
            LogField::Client => get_client(entry),
        }
    }
}

/// Count how often each value of `field` occurs. Entries without the field
/// don't contribute.
pub fn count_field<'a>(
    entries: impl IntoIterator<Item = &'a JsonValue>,
    field: LogField,
) -> FrequencyMap {
    let mut counts = FrequencyMap::new();
    for entry in entries {
        match field.extract(entry) {
            Some(value) => *counts.entry(value.to_owned()).or_default() += 1,
            None => tracing::trace!("Query log entry has no {field:?}"),
        }
    }
    counts
}

/// Rankings shown on the dashboard, computed in a single pass over the log.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TopStats {
    pub top_queried_domains: RankedMap,
    pub top_blocked_domains: RankedMap,
    pub top_clients: RankedMap,
    pub top_block_reasons: RankedMap,
}

impl TopStats {
    pub fn compute<'a>(entries: impl IntoIterator<Item = &'a JsonValue>, top: usize) -> Self {
        let mut domains = FrequencyMap::new();
        let mut blocked = FrequencyMap::new();
        let mut clients = FrequencyMap::new();
        let mut reasons = FrequencyMap::new();
        for entry in entries {
            let host = get_host(entry);
            if let Some(host) = host {
                *domains.entry(host.to_owned()).or_default() += 1;
            }
            if let Some(client) = get_client(entry) {
                *clients.entry(client.to_owned()).or_default() += 1;
            }
            if let Some(reason) = get_reason(entry).filter(|r| is_filtered_reason(r)) {
                *reasons.entry(reason.to_owned()).or_default() += 1;
                if let Some(host) = host {
                    *blocked.entry(host.to_owned()).or_default() += 1;
                }
            }
        }
        Self {
            top_queried_domains: produce_top(&domains, top),
            top_blocked_domains: produce_top(&blocked, top),
            top_clients: produce_top(&clients, top),
            top_block_reasons: produce_top(&reasons, top),
        }
    }
}
