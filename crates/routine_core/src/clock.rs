//! Device-local clock helpers.
//!
//! All comparisons in core use naive local instants; there is no timezone
//! handling beyond the device clock.

use crate::model::task::Instant;
use chrono::{Local, Timelike};

const CLOCK_DISPLAY_FORMAT: &str = "%I:%M:%S %p";

/// Current device-local instant, truncated to whole seconds.
pub fn local_now() -> Instant {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Live clock text in `hh:mm:ss AM/PM` form.
pub fn format_clock(now: Instant) -> String {
    now.format(CLOCK_DISPLAY_FORMAT).to_string()
}
