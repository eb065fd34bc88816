//! Time-related utilities with clock abstraction for testability.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for tests that need time to pass
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a new manual clock starting at the given timestamp
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    /// Move the clock forward by `millis`
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// UTC offset of the machine's local time zone right now
pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// Convert Unix timestamp (milliseconds) to `YYYY-MM-DD HH:MM:SS` in the given offset.
///
/// Returns `None` when the timestamp cannot be represented.
pub fn timestamp_to_display(timestamp_millis: i64, offset: &FixedOffset) -> Option<String> {
    let utc = DateTime::<Utc>::from_timestamp_millis(timestamp_millis)?;
    Some(
        utc.with_timezone(offset)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    )
}
