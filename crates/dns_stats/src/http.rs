//! Request handling helpers shared by the stats endpoints. Routing and
//! transport live in the service; this module only classifies bad requests.

use std::{
    collections::BTreeMap,
    io::BufRead,
};

use anyhow::Context;
use cmd_util::keyvalue::split_key_value;
use errors::ErrorMetadata;
use http::Method;

use crate::knobs::STATS_TOP_DEFAULT;

/// Reject requests whose method isn't `expected` with a 405.
pub fn ensure_method(expected: Method, actual: &Method) -> anyhow::Result<()> {
    if *actual != expected {
        tracing::debug!("Rejecting {actual} request, expected {expected}");
        anyhow::bail!(ErrorMetadata::method_not_allowed(
            "MethodNotAllowed",
            format!("This request must be {expected}"),
        ));
    }
    Ok(())
}

pub fn ensure_get(actual: &Method) -> anyhow::Result<()> {
    ensure_method(Method::GET, actual)
}

pub fn ensure_post(actual: &Method) -> anyhow::Result<()> {
    ensure_method(Method::POST, actual)
}

pub fn ensure_put(actual: &Method) -> anyhow::Result<()> {
    ensure_method(Method::PUT, actual)
}

pub fn ensure_delete(actual: &Method) -> anyhow::Result<()> {
    ensure_method(Method::DELETE, actual)
}

/// Parse a request body made of `key=value` lines. Blank lines are skipped,
/// keys and values are trimmed, and a repeated key keeps its last value. A
/// line without `=` fails the whole body with a 400. Bytes that aren't valid
/// UTF-8 are replaced with U+FFFD rather than rejected.
pub fn parse_parameters_from_body(body: impl BufRead) -> anyhow::Result<BTreeMap<String, String>> {
    let mut parameters = BTreeMap::new();
    for (i, line) in body.split(b'\n').enumerate() {
        let mut line = line.context("Failed to read request body")?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.is_empty() {
            continue;
        }
        let line = String::from_utf8_lossy(&line);
        let Some((key, value)) = split_key_value(&line) else {
            anyhow::bail!(ErrorMetadata::bad_request(
                "InvalidRequestBody",
                format!("Got invalid request body: line {} has no `=`", i + 1),
            ));
        };
        parameters.insert(key.to_owned(), value.to_owned());
    }
    Ok(parameters)
}

/// Window and ranking size requested from the stats endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsQuery {
    pub start: i64,
    pub end: i64,
    pub top: usize,
}

impl StatsQuery {
    /// Read `start`, `end` and `top` from parsed parameters. Missing values
    /// default to the whole history and the default ranking size. Negative
    /// `top` asks for nothing.
    pub fn from_parameters(
        parameters: &BTreeMap<String, String>,
        history_len: usize,
    ) -> anyhow::Result<Self> {
        let default_end = i64::try_from(history_len).unwrap_or(i64::MAX);
        let start = int_parameter(parameters, "start")?.unwrap_or(0);
        let end = int_parameter(parameters, "end")?.unwrap_or(default_end);
        let top = match int_parameter(parameters, "top")? {
            Some(top) => usize::try_from(top).unwrap_or(0),
            None => *STATS_TOP_DEFAULT,
        };
        Ok(Self { start, end, top })
    }
}

fn int_parameter(parameters: &BTreeMap<String, String>, name: &str) -> anyhow::Result<Option<i64>> {
    let Some(value) = parameters.get(name) else {
        return Ok(None);
    };
    let parsed = value.parse().map_err(|e| {
        ErrorMetadata::bad_request(
            "InvalidParameter",
            format!("Parameter {name} must be an integer, got {value:?}: {e}"),
        )
    })?;
    Ok(Some(parsed))
}
