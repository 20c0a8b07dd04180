//! Timezone resolution for layout/timezone function arguments

use std::fmt;

use chrono::{DateTime, Days, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use thiserror::Error;

use super::layout::{Stamp, DEFAULT_LAYOUT};

/// Errors from looking up a timezone by name
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("unknown time zone {name}")]
    UnknownZone { name: String },
}

/// A resolved timezone used to turn an instant into wall-clock fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Utc,
    /// Zone of the running process
    Local,
    /// Entry from the IANA time zone database
    Zone(Tz),
}

impl Location {
    /// Look up a location by name
    ///
    /// Accepts `UTC`, `Local` and any IANA zone name (`America/New_York`).
    /// The empty name is UTC.
    pub fn from_name(name: &str) -> Result<Self, LocationError> {
        match name {
            "" | "UTC" => Ok(Location::Utc),
            "Local" => Ok(Location::Local),
            _ => name
                .parse::<Tz>()
                .map(Location::Zone)
                .map_err(|_| LocationError::UnknownZone {
                    name: name.to_string(),
                }),
        }
    }

    /// Identifier of the location, equal to the name it was resolved from
    pub fn name(&self) -> &'static str {
        match self {
            Location::Utc => "UTC",
            Location::Local => "Local",
            Location::Zone(tz) => tz.name(),
        }
    }

    /// Wall-clock fields of `instant` in this location, `days_back` calendar
    /// days earlier
    ///
    /// `None` when the result falls outside the representable date range.
    pub fn stamp(&self, instant: DateTime<Utc>, days_back: u64) -> Option<Stamp> {
        match self {
            Location::Utc => stamp_of(&calendar_days_back(instant, days_back)?, true),
            // The process zone has no portable abbreviation; MST prints the offset
            Location::Local => stamp_of(
                &calendar_days_back(instant.with_timezone(&chrono::Local), days_back)?,
                false,
            ),
            Location::Zone(tz) => {
                stamp_of(&calendar_days_back(instant.with_timezone(tz), days_back)?, true)
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Subtract whole calendar days keeping the wall-clock time
///
/// Falls back to 24-hour steps when the shifted wall time does not exist in
/// the zone (DST gap).
fn calendar_days_back<Z: TimeZone>(dt: DateTime<Z>, days: u64) -> Option<DateTime<Z>> {
    if days == 0 {
        return Some(dt);
    }
    dt.clone().checked_sub_days(Days::new(days)).or_else(|| {
        let delta = TimeDelta::try_days(i64::try_from(days).ok()?)?;
        dt.checked_sub_signed(delta)
    })
}

fn stamp_of<Z>(dt: &DateTime<Z>, named: bool) -> Option<Stamp>
where
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    let offset = dt.offset().fix();
    Some(Stamp {
        local: dt.naive_utc().checked_add_offset(offset)?,
        offset_seconds: offset.local_minus_utc(),
        zone: if named {
            dt.offset().to_string()
        } else {
            String::new()
        },
    })
}

/// Effective layout and location for a `today`/`yesterday` style call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeArgs {
    pub layout: String,
    pub location: Location,
}

/// Resolve user-supplied layout and timezone arguments
///
/// An empty layout becomes [`DEFAULT_LAYOUT`], an empty timezone becomes UTC.
/// Unknown timezone names fall back to UTC; the failure is only logged.
pub fn resolve_time_args(layout: &str, timezone: &str) -> TimeArgs {
    let layout = if layout.is_empty() {
        DEFAULT_LAYOUT
    } else {
        layout
    };
    let timezone = if timezone.is_empty() { "UTC" } else { timezone };

    let location = match Location::from_name(timezone) {
        Ok(location) => location,
        Err(e) => {
            warn!("Error setting user-specified timezone {}: {}", timezone, e);
            Location::Utc
        }
    };

    debug!("Layout: {}, Location: {}", layout, location);
    TimeArgs {
        layout: layout.to_string(),
        location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::layout::format;
    use chrono::{NaiveDate, Timelike};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_valid_zone_names_round_trip() {
        for name in ["America/New_York", "Europe/Berlin", "Asia/Tokyo", "US/Eastern", "UTC", "Local"] {
            let args = resolve_time_args("", name);
            assert_eq!(args.location.name(), name);
        }
    }

    #[test]
    fn test_unknown_zone_falls_back_to_utc() {
        let args = resolve_time_args("15:04", "Mars/Olympus_Mons");
        assert_eq!(args.location, Location::Utc);
        assert_eq!(args.layout, "15:04");
    }

    #[test]
    fn test_empty_arguments_use_defaults() {
        let args = resolve_time_args("", "");
        assert_eq!(args.layout, DEFAULT_LAYOUT);
        assert_eq!(args.location, Location::Utc);
    }

    #[test]
    fn test_from_name_reports_unknown_zone() {
        assert_eq!(
            Location::from_name("Nowhere/Special"),
            Err(LocationError::UnknownZone {
                name: "Nowhere/Special".to_string()
            })
        );
    }

    #[test]
    fn test_stamp_converts_to_zone() {
        let tz: Tz = "Asia/Tokyo".parse().unwrap();
        let stamp = Location::Zone(tz).stamp(utc(2024, 3, 15, 20, 0), 0).unwrap();
        assert_eq!(stamp.local.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert_eq!(stamp.local.hour(), 5);
        assert_eq!(stamp.offset_seconds, 9 * 3600);
        assert_eq!(stamp.zone, "JST");
    }

    #[test]
    fn test_stamp_days_back_keeps_wall_time() {
        let tz: Tz = "Europe/Berlin".parse().unwrap();
        // 2024-03-31 is the spring-forward day in Berlin; one day back the offset differs
        let stamp = Location::Zone(tz).stamp(utc(2024, 3, 31, 10, 0), 1).unwrap();
        assert_eq!(stamp.local.date(), NaiveDate::from_ymd_opt(2024, 3, 30).unwrap());
        assert_eq!(stamp.local.hour(), 12);
        assert_eq!(stamp.offset_seconds, 3600);
    }

    #[test]
    fn test_stamp_days_back_across_dst_gap() {
        let tz: Tz = "Europe/Berlin".parse().unwrap();
        // 02:30 CEST on 2024-04-01; 02:30 on 2024-03-31 does not exist, so step back 24h
        let stamp = Location::Zone(tz).stamp(utc(2024, 4, 1, 0, 30), 1).unwrap();
        assert_eq!(stamp.local.date(), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(stamp.local.hour(), 1);
        assert_eq!(stamp.local.minute(), 30);
    }

    #[test]
    fn test_utc_stamp() {
        let stamp = Location::Utc.stamp(utc(2024, 1, 1, 0, 15), 1).unwrap();
        assert_eq!(stamp.local.date(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(stamp.offset_seconds, 0);
        assert_eq!(stamp.zone, "UTC");
    }

    #[test]
    fn test_local_stamp_prints_offset_for_zone_name() {
        let stamp = Location::Local.stamp(utc(2024, 3, 15, 12, 0), 0).unwrap();
        assert!(stamp.zone.is_empty());
        assert_eq!(format(&stamp, "MST"), format(&stamp, "-0700"));
        assert_eq!(format(&stamp, "MST").len(), 5);
    }

    #[test]
    fn test_stamp_out_of_range_is_none() {
        let tz: Tz = "America/New_York".parse().unwrap();
        assert_eq!(Location::Zone(tz).stamp(DateTime::<Utc>::MIN_UTC, 0), None);
        assert_eq!(Location::Utc.stamp(DateTime::<Utc>::MIN_UTC, 1), None);
        assert!(Location::Utc.stamp(DateTime::<Utc>::MIN_UTC, 0).is_some());
    }
}
