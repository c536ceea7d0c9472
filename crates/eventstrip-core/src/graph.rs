//! Microsoft Graph calendar payload parsing.
//!
//! Converts the JSON shape returned by the Graph calendar endpoints into
//! [`Event`] values:
//! - [`event_from_json`]: one record, with a typed error on failure
//! - [`events_from_json`]: a batch, dropping records that fail
//! - [`events_from_payload`]: the `{ "value": [ ... ] }` response envelope

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::event::{Event, ShowAs};
use crate::links;

/// Fallback title for events without a usable subject.
const UNTITLED: &str = "(No title)";

/// Format of Graph timestamps that carry no UTC offset.
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// An error converting one Graph event record into an [`Event`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventParseError {
    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A start or end timestamp could not be parsed.
    #[error("invalid {which} timestamp: {value}")]
    InvalidTimestamp {
        /// Which timestamp failed ("start" or "end").
        which: &'static str,
        /// The offending payload value.
        value: String,
    },

    /// The payload names a time zone the zone database does not know.
    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),

    /// The end timestamp precedes the start timestamp.
    #[error("event ends before it starts")]
    EndBeforeStart,

    /// The record is not a JSON object of the expected shape.
    #[error("malformed event record: {0}")]
    Malformed(String),
}

/// One event record from the Graph API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphEvent {
    id: Option<String>,
    subject: Option<String>,
    start: Option<GraphDateTime>,
    end: Option<GraphDateTime>,
    show_as: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    web_link: Option<String>,
    online_meeting: Option<GraphOnlineMeeting>,
    location: Option<GraphLocation>,
    body: Option<GraphItemBody>,
    body_preview: Option<String>,
}

/// A Graph timestamp with its IANA time zone.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphDateTime {
    date_time: String,
    time_zone: Option<String>,
}

/// Online-meeting details from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphOnlineMeeting {
    join_url: Option<String>,
}

/// Event body from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphItemBody {
    content: Option<String>,
}

/// Event location from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphLocation {
    display_name: Option<String>,
}

/// Response envelope from the Graph list-events endpoints.
///
/// Entries stay raw JSON here so that one malformed record cannot fail the
/// whole envelope.
#[derive(Debug, Deserialize)]
struct GraphEventList {
    #[serde(default)]
    value: Vec<Value>,
}

/// Converts one Graph event record into an [`Event`].
///
/// Required fields are the id and both timestamps; everything else
/// degrades to a default. A blank subject becomes "(No title)" rather than
/// a failure.
pub fn event_from_json(value: &Value) -> Result<Event, EventParseError> {
    let record: GraphEvent = serde_json::from_value(value.clone())
        .map_err(|e| EventParseError::Malformed(e.to_string()))?;

    // Borrows the whole record, so it has to run before fields move out.
    let join_url = resolve_join_url(&record);

    let uid = match record.id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(EventParseError::MissingField("id")),
    };

    let start = record.start.ok_or(EventParseError::MissingField("start"))?;
    let end = record.end.ok_or(EventParseError::MissingField("end"))?;
    let start_time = parse_graph_time("start", &start)?;
    let end_time = parse_graph_time("end", &end)?;
    if end_time < start_time {
        return Err(EventParseError::EndBeforeStart);
    }

    let title = match record.subject {
        Some(ref s) if !s.trim().is_empty() => s.clone(),
        _ => UNTITLED.to_string(),
    };

    let show_as = record
        .show_as
        .as_deref()
        .map(parse_show_as)
        .unwrap_or_default();

    let mut event = Event::new(uid, title, start_time, end_time)
        .with_show_as(show_as)
        .with_categories(record.categories);
    if let Some(url) = record.web_link {
        event = event.with_web_link(url);
    }
    if let Some(url) = join_url {
        event = event.with_join_url(url);
    }
    Ok(event)
}

/// Converts an array of Graph event records, dropping records that fail.
///
/// The relative order of the surviving events follows the input. Failures
/// are logged at warn level and never abort the batch.
pub fn events_from_json(values: &[Value]) -> Vec<Event> {
    let mut events = Vec::with_capacity(values.len());
    for value in values {
        match event_from_json(value) {
            Ok(event) => events.push(event),
            Err(err) => {
                let uid = value.get("id").and_then(Value::as_str).unwrap_or("?");
                warn!(uid = %uid, error = %err, "Skipping unparseable event record");
            }
        }
    }
    events
}

/// Parses a Graph list-events response body.
///
/// Accepts the `{ "value": [ ... ] }` envelope and applies the per-record
/// conversion; only a body that is not valid JSON of that shape is an
/// error.
pub fn events_from_payload(payload: &str) -> Result<Vec<Event>, EventParseError> {
    let list: GraphEventList =
        serde_json::from_str(payload).map_err(|e| EventParseError::Malformed(e.to_string()))?;
    Ok(events_from_json(&list.value))
}

/// Maps a Graph `showAs` string onto [`ShowAs`].
///
/// Graph also sends `workingElsewhere`; that and anything unrecognized
/// collapse to `Unknown`, which a busy-only scan ignores.
fn parse_show_as(value: &str) -> ShowAs {
    match value {
        "free" => ShowAs::Free,
        "tentative" => ShowAs::Tentative,
        "busy" => ShowAs::Busy,
        "oof" => ShowAs::OutOfOffice,
        _ => ShowAs::Unknown,
    }
}

/// Parses one `{ dateTime, timeZone }` pair into a UTC instant.
///
/// Timestamps carrying a UTC offset are taken as-is. Offset-less
/// timestamps are resolved through the record's IANA time zone; a missing
/// zone means UTC. On a DST fall-back ambiguity the earlier instant wins;
/// a time inside a spring-forward gap is rejected.
fn parse_graph_time(
    which: &'static str,
    time: &GraphDateTime,
) -> Result<DateTime<Utc>, EventParseError> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(&time.date_time) {
        return Ok(with_offset.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(&time.date_time, NAIVE_FORMAT).map_err(|_| {
        EventParseError::InvalidTimestamp {
            which,
            value: time.date_time.clone(),
        }
    })?;

    let zone = time.time_zone.as_deref().unwrap_or("UTC");
    let tz: Tz = zone
        .parse()
        .map_err(|_| EventParseError::UnknownTimeZone(zone.to_string()))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| EventParseError::InvalidTimestamp {
            which,
            value: time.date_time.clone(),
        })
}

/// Resolves the event's join link.
///
/// The dedicated `onlineMeeting.joinUrl` field wins; after that, the first
/// recognized link in the location display name, the body content, and the
/// body preview, in that order. SafeLinks are unwrapped at every step.
fn resolve_join_url(record: &GraphEvent) -> Option<String> {
    if let Some(url) = record
        .online_meeting
        .as_ref()
        .and_then(|m| m.join_url.as_deref())
    {
        return Some(links::unwrap_safelink(url));
    }

    let fallbacks = [
        record
            .location
            .as_ref()
            .and_then(|l| l.display_name.as_deref()),
        record.body.as_ref().and_then(|b| b.content.as_deref()),
        record.body_preview.as_deref(),
    ];
    fallbacks.into_iter().flatten().find_map(links::extract_join_url)
}
