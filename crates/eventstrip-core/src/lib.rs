//! Core types: events, show-as states, join links, Graph payload parsing

pub mod describe;
pub mod event;
pub mod graph;
pub mod links;
pub mod tracing;

pub use describe::time_diff_description;
pub use event::{Event, ShowAs, find_soonest_event, find_soonest_event_at};
pub use graph::{EventParseError, event_from_json, events_from_json, events_from_payload};
pub use links::{JoinKind, detect_join_kind, direct_join_url, extract_join_url, unwrap_safelink};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
