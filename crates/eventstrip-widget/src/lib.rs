//! Next-event widget state machine with delegate callbacks

pub mod config;
pub mod widget;

pub use config::WidgetConfig;
pub use widget::{NextEventDelegate, NextEventWidget};
