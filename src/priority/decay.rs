//! Temporal decay for signal weighting (pure math, no DB).

use chrono::{DateTime, Utc};

/// Hours over which a signal's influence decays linearly to the floor.
pub const DECAY_WINDOW_HOURS: f64 = 72.0;

/// Weight floor: a signal older than the decay window still contributes,
/// so a project's priority never collapses abruptly when signals age out
/// of the window together.
pub const MIN_DECAY_WEIGHT: f64 = 0.1;

/// Decayed weight of one signal: `max(0.1, 1 - age/72h) * confidence`.
///
/// Monotonically non-increasing in age, floored at `MIN_DECAY_WEIGHT`
/// before the confidence multiplier is applied.
pub fn decay_weight(age_hours: f64, confidence: f64) -> f64 {
    let linear = 1.0 - age_hours.max(0.0) / DECAY_WINDOW_HOURS;
    linear.max(MIN_DECAY_WEIGHT) * confidence.clamp(0.0, 1.0)
}

/// Parse an RFC3339/ISO-8601 timestamp and compute fractional hours since now.
pub fn age_hours_from_now(created_at_iso: &str) -> f64 {
    let parsed = match DateTime::parse_from_rfc3339(created_at_iso) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => {
            // Try SQLite datetime format (no timezone)
            match chrono::NaiveDateTime::parse_from_str(created_at_iso, "%Y-%m-%d %H:%M:%S") {
                Ok(naive) => naive.and_utc(),
                Err(_) => return 0.0,
            }
        }
    };
    let duration = Utc::now() - parsed;
    let secs = duration.num_seconds() as f64;
    (secs / 3600.0).max(0.0)
}
