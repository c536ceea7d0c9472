//! The calendar event model.
//!
//! This module provides the core types for representing calendar events:
//! - [`ShowAs`]: the availability an attendee advertises for an event
//! - [`Event`]: a single calendar event parsed from a calendar payload
//! - [`find_soonest_event`]: selection of the next not-yet-ended event

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::describe::time_diff_description;
use crate::links::{self, JoinKind};

/// The availability an attendee advertises for an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowAs {
    /// The availability is not known.
    #[default]
    Unknown,
    /// The attendee is free during the event.
    Free,
    /// The attendee has tentatively accepted.
    Tentative,
    /// The attendee is busy during the event.
    Busy,
    /// The attendee is out of the office.
    OutOfOffice,
}

impl ShowAs {
    /// Returns true if this status blocks the attendee's calendar.
    ///
    /// Only `Busy` and `OutOfOffice` block; `Unknown` does not, so a
    /// busy-only scan never picks up events with unrecognized status.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy | Self::OutOfOffice)
    }

    /// Returns a human-readable name for this status.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Free => "Free",
            Self::Tentative => "Tentative",
            Self::Busy => "Busy",
            Self::OutOfOffice => "Out of office",
        }
    }
}

/// A single calendar event.
///
/// Value-like and immutable once constructed: the fetch layer builds a
/// fresh list on every refresh cycle and the previous one is dropped
/// wholesale, so there is no incremental mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (calendar-provider specific).
    pub uid: String,
    /// The event title/subject.
    pub title: String,
    /// When the event starts.
    pub start_time: DateTime<Utc>,
    /// When the event ends. Never earlier than `start_time`; the parsing
    /// layer rejects payloads that violate this.
    pub end_time: DateTime<Utc>,
    /// The attendee's advertised availability.
    pub show_as: ShowAs,
    /// Category tags, in payload order.
    pub categories: Vec<String>,
    /// URL to open the event in a web calendar client.
    pub web_link: Option<String>,
    /// Conferencing join link, if one was found in the payload.
    pub join_url: Option<String>,
}

impl Event {
    /// Creates a new Event with required fields.
    pub fn new(
        uid: impl Into<String>,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            start_time,
            end_time,
            show_as: ShowAs::Unknown,
            categories: Vec::new(),
            web_link: None,
            join_url: None,
        }
    }

    /// Builder method to set availability.
    pub fn with_show_as(mut self, show_as: ShowAs) -> Self {
        self.show_as = show_as;
        self
    }

    /// Builder method to set category tags.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// Builder method to set the web calendar link.
    pub fn with_web_link(mut self, url: impl Into<String>) -> Self {
        self.web_link = Some(url.into());
        self
    }

    /// Builder method to set the conferencing join link.
    pub fn with_join_url(mut self, url: impl Into<String>) -> Self {
        self.join_url = Some(url.into());
        self
    }

    /// Checks if the event is ongoing at the given time.
    ///
    /// The start is inclusive, the end exclusive. Never true together with
    /// [`Event::is_ended_at`] for the same instant.
    pub fn is_current_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Checks if the event is ongoing right now.
    pub fn is_current(&self) -> bool {
        self.is_current_at(Utc::now())
    }

    /// Checks if the event is over at the given time.
    pub fn is_ended_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }

    /// Checks if the event is over right now.
    pub fn is_ended(&self) -> bool {
        self.is_ended_at(Utc::now())
    }

    /// Returns the conferencing provider detected from the join link.
    pub fn join_kind(&self) -> Option<JoinKind> {
        self.join_url.as_deref().and_then(links::detect_join_kind)
    }

    /// Returns true if the join link points at Microsoft Teams.
    pub fn is_teams(&self) -> bool {
        self.join_kind() == Some(JoinKind::Teams)
    }

    /// Returns true if the join link points at Cisco Webex.
    pub fn is_webex(&self) -> bool {
        self.join_kind() == Some(JoinKind::Webex)
    }

    /// Returns a join URL that opens the conferencing client directly.
    ///
    /// `None` when there is no join link or it belongs to no recognized
    /// provider; that is the "no direct join available" state, not an
    /// error.
    pub fn direct_join_url(&self) -> Option<String> {
        links::direct_join_url(self.join_url.as_deref()?)
    }

    /// Renders the start time relative to the given instant ("in 5 min").
    pub fn start_time_desc_at(&self, now: DateTime<Utc>) -> String {
        time_diff_description(now, self.start_time)
    }

    /// Renders the start time relative to the current instant.
    ///
    /// Recomputed on every call; "now" keeps moving under a displayed
    /// event, so the result must not be cached.
    pub fn start_time_desc(&self) -> String {
        self.start_time_desc_at(Utc::now())
    }

    /// Returns whole minutes until the event starts from the given time.
    ///
    /// Negative once the event has started.
    pub fn minutes_until_start_at(&self, now: DateTime<Utc>) -> i64 {
        (self.start_time - now).num_minutes()
    }

    /// Returns the duration of the event in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

impl fmt::Display for Event {
    /// Formats as `title (start - end, availability)` with UTC clock times.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} - {}, {})",
            self.title,
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M"),
            self.show_as.display_name()
        )
    }
}

/// Returns the event with the earliest start among those not yet ended at
/// the given time.
///
/// A single left-to-right scan keeping a running best candidate. Events
/// whose `is_ended_at` is true are skipped; with `busy_only`, events whose
/// status does not block the calendar are skipped too. The comparison is
/// strict, so ties on start time keep the earliest list position. An empty
/// or fully-filtered list yields `None`.
pub fn find_soonest_event_at(
    events: &[Event],
    busy_only: bool,
    now: DateTime<Utc>,
) -> Option<&Event> {
    let mut best: Option<&Event> = None;
    for event in events {
        if event.is_ended_at(now) {
            continue;
        }
        if busy_only && !event.show_as.is_busy() {
            continue;
        }
        if best.is_none_or(|b| event.start_time < b.start_time) {
            best = Some(event);
        }
    }
    best
}

/// Returns the soonest not-yet-ended event relative to the current instant.
///
/// See [`find_soonest_event_at`] for the selection rules.
pub fn find_soonest_event(events: &[Event], busy_only: bool) -> Option<&Event> {
    find_soonest_event_at(events, busy_only, Utc::now())
}
