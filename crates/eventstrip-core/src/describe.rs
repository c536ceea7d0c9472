//! Human-readable time distance descriptions.
//!
//! Renders the distance between two instants as the short phrase shown next
//! to an event title in a narrow strip: "now", "in 5 min", "in 1 h 5 min",
//! "started 2 min ago".

use chrono::{DateTime, Utc};

/// Describes the distance from `reference` to `target` at whole-minute
/// granularity.
///
/// Differences under one minute in either direction render as "now". Future
/// targets read "in 5 min"; past targets read "started 5 min ago". Hours
/// split out once the distance reaches sixty minutes.
pub fn time_diff_description(reference: DateTime<Utc>, target: DateTime<Utc>) -> String {
    // num_minutes truncates toward zero, so sub-minute distances land on 0
    let minutes = (target - reference).num_minutes();

    if minutes == 0 {
        return "now".to_string();
    }

    let span = span_text(minutes.unsigned_abs());
    if minutes > 0 {
        format!("in {}", span)
    } else {
        format!("started {} ago", span)
    }
}

/// Renders an absolute minute count as "5 min", "1 h", or "1 h 5 min".
fn span_text(total_minutes: u64) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours == 0 {
        format!("{} min", minutes)
    } else if minutes == 0 {
        format!("{} h", hours)
    } else {
        format!("{} h {} min", hours, minutes)
    }
}
