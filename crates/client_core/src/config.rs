//! Fixed interaction constants. These are compile-time values, not settings.

use std::time::Duration;

pub const INITIAL_COUNT: u32 = 5;
/// Horizontal displacement a release must exceed to count as a vote.
pub const SWIPE_THRESHOLD: f64 = 80.0;
/// Displacement inside which the card shows no leaning.
pub const LEAN_DEADZONE: f64 = 10.0;
pub const EXIT_ANIMATION: Duration = Duration::from_millis(350);
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub initial_count: u32,
    pub swipe_threshold: f64,
    pub lean_deadzone: f64,
    pub exit_animation: Duration,
    pub notice_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_count: INITIAL_COUNT,
            swipe_threshold: SWIPE_THRESHOLD,
            lean_deadzone: LEAN_DEADZONE,
            exit_animation: EXIT_ANIMATION,
            notice_ttl: NOTICE_TTL,
        }
    }
}
