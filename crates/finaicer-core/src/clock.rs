//! Wall-clock access for the time-dependent detectors
//!
//! The duplicate and unusual-hour rules compare against the moment of
//! evaluation, so the engine reads time through [`Clock`] instead of calling
//! `Local::now()` directly.

use chrono::{DateTime, FixedOffset, Local};

pub trait Clock: Send + Sync {
    /// Current instant in the user's local offset
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Reads the host clock and time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// Parse an RFC 3339 instant, e.g. `2024-03-05T03:15:00-05:00`
    pub fn parse(rfc3339: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(rfc3339).ok().map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::parse("2024-03-05T03:15:00-05:00").unwrap();
        assert_eq!(clock.now().hour(), 3);
        assert_eq!(clock.now().offset().local_minus_utc(), -5 * 3600);
        assert!(FixedClock::parse("not a time").is_none());
    }
}
