//! Typed entities parsed from API responses.
//!
//! # Design
//! Each entity is built by one `from_response` function that reads a JSON
//! response through private `Deserialize` records, so every tolerated
//! response shape is spelled out in a single place. Entities are immutable;
//! polling a job means fetching a fresh instance. `to_map` is the inverse
//! mapping, for callers that persist or log results.

mod status;
mod style_check;
mod style_guide;
mod style_rewrite;
mod style_suggestion;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

pub use status::WorkflowStatus;
pub use style_check::StyleCheck;
pub use style_guide::StyleGuide;
pub use style_rewrite::StyleRewrite;
pub use style_suggestion::StyleSuggestion;

/// Deserialize a response record, reporting which entity was malformed.
fn parse_record<T: DeserializeOwned>(entity: &str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| {
        Error::generic(format!("Malformed {entity} response: {e}")).with_source(e)
    })
}

/// Resolve the `id` / `workflow_id` fallback used by job endpoints.
fn require_id(entity: &str, id: Option<String>, workflow_id: Option<String>) -> Result<String> {
    id.or(workflow_id).ok_or_else(|| {
        Error::generic(format!("Malformed {entity} response: missing field `id` or `workflow_id`"))
    })
}

/// Offset-less layouts, taken as UTC.
const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC,
/// and a bare date as its midnight.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts);
    }
    // `+0000` style offsets
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(ts);
    }
    if let Some(naive) = NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
    {
        return Ok(naive.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
        .map_err(|e| Error::generic(format!("Invalid timestamp {raw:?}: {e}")).with_source(e))
}

fn parse_optional_timestamp(raw: Option<&str>) -> Result<Option<DateTime<FixedOffset>>> {
    raw.map(parse_timestamp).transpose()
}

/// Render as `2025-01-20T14:30:00+00:00`.
pub(crate) fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

fn timestamp_value(ts: Option<&DateTime<FixedOffset>>) -> Value {
    ts.map(|t| Value::String(format_timestamp(t))).unwrap_or(Value::Null)
}
