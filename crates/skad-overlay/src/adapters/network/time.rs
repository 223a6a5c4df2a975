use crate::ports::TimeSource;

// ============================================================================
// SystemTimeSource - Production Time Source
// ============================================================================

/// Production time source using the system clock.
///
/// # Example
///
/// ```rust
/// use skad_overlay::adapters::network::SystemTimeSource;
/// use skad_overlay::ports::TimeSource;
///
/// let time_source = SystemTimeSource::new();
/// assert!(time_source.now_nanos() > 0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    /// Create a new system time source.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemTimeSource {
    fn now_nanos(&self) -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};

        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
    }
}
