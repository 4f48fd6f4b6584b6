//! Resource endpoints.

pub mod languages;
pub mod songs;

use std::time::Instant;

/// Milliseconds since `start`, for latency fields in response logs.
fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
