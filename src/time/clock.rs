//! Time sources for the registry functions
//!
//! Every registry function reads "now" through a [`Clock`], so tests and the
//! CLI `--now` flag can pin the instant and get exact output.

use std::fmt::Debug;

use chrono::{DateTime, Utc};

/// Source of the current instant
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock of the running process
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Parse an RFC 3339 timestamp such as `2024-03-15T12:00:00Z`
    pub fn from_rfc3339(value: &str) -> Result<Self, chrono::ParseError> {
        let instant = DateTime::parse_from_rfc3339(value)?;
        Ok(Self(instant.with_timezone(&Utc)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_returns_its_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_fixed_clock_from_rfc3339_normalizes_to_utc() {
        let clock = FixedClock::from_rfc3339("2024-03-15T14:30:00+02:00").unwrap();
        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_fixed_clock_rejects_garbage() {
        assert!(FixedClock::from_rfc3339("yesterday-ish").is_err());
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let a = SystemClock.now();
        let b = SystemClock.now();
        assert!(b >= a);
    }
}
