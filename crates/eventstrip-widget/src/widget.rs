//! The next-event widget state machine.
//!
//! [`NextEventWidget`] holds the ordered list of today's events, resolves
//! which one counts as "current", and tells its delegate when that
//! selection changes identity or when the held data has gone stale.

use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::debug;

use eventstrip_core::event::{Event, find_soonest_event_at};

use crate::config::WidgetConfig;

/// Callbacks from the widget to its host.
///
/// There is exactly one registered observer; it renders the current event
/// and owns the actual data fetching.
pub trait NextEventDelegate {
    /// The resolved current event changed identity.
    ///
    /// `None` means the widget has nothing to show and the host should
    /// render its idle state.
    fn current_event_changed(&mut self, event: Option<&Event>);

    /// The widget considers its data stale and wants a fresh list.
    ///
    /// The host fetches on its own schedule and delivers the result
    /// through [`NextEventWidget::show_events`]; nothing here blocks on
    /// that.
    fn request_reload(&mut self);
}

/// Resolves "the next event" over a held list and notifies on change.
///
/// All operations are synchronous and expected to run on the host's main
/// context. The widget performs no IO and owns no timer; the periodic
/// [`refresh`](NextEventWidget::refresh) tick is the host's job.
pub struct NextEventWidget {
    config: WidgetConfig,
    events: Vec<Event>,
    current: Option<Event>,
    loaded_at: Option<Instant>,
    delegate: Option<Box<dyn NextEventDelegate>>,
}

impl NextEventWidget {
    /// Creates a widget with the given policy and no delegate.
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            config,
            events: Vec::new(),
            current: None,
            loaded_at: None,
            delegate: None,
        }
    }

    /// Creates a widget with the default policy.
    pub fn with_defaults() -> Self {
        Self::new(WidgetConfig::default())
    }

    /// Registers the delegate, replacing any previous one.
    pub fn set_delegate(&mut self, delegate: Box<dyn NextEventDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Replaces the held event list wholesale.
    ///
    /// The previous current-event pointer is discarded without notifying;
    /// a subsequent [`select_event`](NextEventWidget::select_event) call
    /// re-resolves and re-renders. Also stamps the data age consulted by
    /// [`refresh`](NextEventWidget::refresh).
    pub fn show_events(&mut self, events: Vec<Event>) {
        debug!(count = events.len(), "Loaded event list");
        self.events = events;
        self.current = None;
        self.loaded_at = Some(Instant::now());
    }

    /// Re-runs the soonest-event selection and notifies on change.
    pub fn select_event(&mut self) {
        self.select_event_at(Utc::now());
    }

    /// Selection against an explicit "now", for hosts driving time.
    ///
    /// The delegate hears about it only when the winner differs from the
    /// held current event by uid (or one side is none).
    pub fn select_event_at(&mut self, now: DateTime<Utc>) {
        let winner = find_soonest_event_at(&self.events, self.config.busy_only, now).cloned();

        let changed = match (&self.current, &winner) {
            (None, None) => false,
            (Some(held), Some(new)) => held.uid != new.uid,
            _ => true,
        };
        if !changed {
            return;
        }

        debug!(
            uid = winner.as_ref().map_or("-", |e| e.uid.as_str()),
            "Current event changed"
        );
        self.current = winner;
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.current_event_changed(self.current.as_ref());
        }
    }

    /// Periodic tick: re-resolves the current event, then requests a
    /// reload if the held data is stale.
    ///
    /// Upcoming-to-current and current-to-ended transitions are observed
    /// here without new data arriving.
    pub fn refresh(&mut self) {
        self.refresh_at(Utc::now());
    }

    /// Refresh against an explicit "now", for hosts driving time.
    pub fn refresh_at(&mut self, now: DateTime<Utc>) {
        self.select_event_at(now);
        if self.is_stale() {
            debug!("Event data stale, requesting reload");
            if let Some(delegate) = self.delegate.as_mut() {
                delegate.request_reload();
            }
        }
    }

    /// The held events, in source order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The resolved current event, if any.
    ///
    /// Always a uid-member of [`events`](NextEventWidget::events), or
    /// none.
    pub fn current_event(&self) -> Option<&Event> {
        self.current.as_ref()
    }

    /// Returns true when the held data is older than the configured
    /// threshold, or nothing has been loaded yet.
    pub fn is_stale(&self) -> bool {
        match self.loaded_at {
            Some(loaded_at) => loaded_at.elapsed() >= self.config.stale_after,
            None => true,
        }
    }

    /// The active policy.
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }
}
