//! Shared fixtures for conversion integration tests

use chrono::NaiveDate;
use kestrel_convert::SessionCallbacks;
use kestrel_value::ZoneId;

/// A session pinned to a fixed moment, so date windowing and verb
/// substitution are deterministic.
pub fn setup_session() -> SessionCallbacks {
    let now = NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    SessionCallbacks::new(now, ZoneId::UTC, false)
}
