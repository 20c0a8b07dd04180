//! Reference-time layouts
//!
//! A layout shows how the reference time `Mon Jan 2 15:04:05 MST 2006`
//! (`01/02 03:04:05PM '06 -0700`) would be written; every recognized element
//! is replaced by the matching field of the formatted time and everything
//! else is copied as-is. `"2006-01-02"` renders a date, `"15:04"` a 24-hour
//! clock time, `"Jan _2 3:04PM"` a syslog-style stamp.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Year-month-day, used when no layout is given
pub const DEFAULT_LAYOUT: &str = "2006-01-02";

const LONG_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const LONG_DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Wall-clock fields of an instant in some location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub local: NaiveDateTime,
    /// Seconds east of UTC
    pub offset_seconds: i32,
    /// Zone abbreviation (`CET`, `UTC`); empty when the zone has no name, in
    /// which case `MST` prints the `-0700` offset
    pub zone: String,
}

/// How much of the UTC offset an offset element prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffsetPrecision {
    Hours,
    Minutes,
    Seconds,
}

/// Layout element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    LongMonth,
    Month,
    NumMonth,
    ZeroMonth,
    LongWeekDay,
    WeekDay,
    Day,
    UnderDay,
    ZeroDay,
    UnderYearDay,
    ZeroYearDay,
    Hour,
    Hour12,
    ZeroHour12,
    Minute,
    ZeroMinute,
    Second,
    ZeroSecond,
    LongYear,
    Year,
    UpperPm,
    LowerPm,
    ZoneName,
    /// `-0700` family; `utc_z` for the `Z0700` family which prints `Z` at UTC
    Offset {
        utc_z: bool,
        colons: bool,
        precision: OffsetPrecision,
    },
    /// `.000` (fixed) or `.999` (trailing zeros trimmed)
    Fraction {
        separator: char,
        digits: usize,
        trim: bool,
    },
}

const OFFSETS: [(&str, bool, OffsetPrecision); 5] = [
    ("070000", false, OffsetPrecision::Seconds),
    ("07:00:00", true, OffsetPrecision::Seconds),
    ("0700", false, OffsetPrecision::Minutes),
    ("07:00", true, OffsetPrecision::Minutes),
    ("07", false, OffsetPrecision::Hours),
];

fn starts_with_lower(rest: &[u8]) -> bool {
    rest.first().is_some_and(|c| c.is_ascii_lowercase())
}

/// Find the first layout element: (byte offset, element, element length)
fn next_element(layout: &str) -> Option<(usize, Element, usize)> {
    let bytes = layout.as_bytes();
    for i in 0..bytes.len() {
        let rest = &bytes[i..];
        match bytes[i] {
            b'J' if rest.starts_with(b"Jan") => {
                if rest.starts_with(b"January") {
                    return Some((i, Element::LongMonth, 7));
                }
                if !starts_with_lower(&rest[3..]) {
                    return Some((i, Element::Month, 3));
                }
            }
            b'M' => {
                if rest.starts_with(b"Mon") {
                    if rest.starts_with(b"Monday") {
                        return Some((i, Element::LongWeekDay, 6));
                    }
                    if !starts_with_lower(&rest[3..]) {
                        return Some((i, Element::WeekDay, 3));
                    }
                }
                if rest.starts_with(b"MST") {
                    return Some((i, Element::ZoneName, 3));
                }
            }
            b'0' => {
                if let Some(&next) = rest.get(1).filter(|c| (b'1'..=b'6').contains(*c)) {
                    let element = match next {
                        b'1' => Element::ZeroMonth,
                        b'2' => Element::ZeroDay,
                        b'3' => Element::ZeroHour12,
                        b'4' => Element::ZeroMinute,
                        b'5' => Element::ZeroSecond,
                        _ => Element::Year,
                    };
                    return Some((i, element, 2));
                }
                if rest.starts_with(b"002") {
                    return Some((i, Element::ZeroYearDay, 3));
                }
            }
            b'1' => {
                if rest.starts_with(b"15") {
                    return Some((i, Element::Hour, 2));
                }
                return Some((i, Element::NumMonth, 1));
            }
            b'2' => {
                if rest.starts_with(b"2006") {
                    return Some((i, Element::LongYear, 4));
                }
                return Some((i, Element::Day, 1));
            }
            b'_' => {
                if rest.starts_with(b"_2") {
                    // "_2006" is a literal underscore followed by the year
                    if rest.starts_with(b"_2006") {
                        return Some((i + 1, Element::LongYear, 4));
                    }
                    return Some((i, Element::UnderDay, 2));
                }
                if rest.starts_with(b"__2") {
                    return Some((i, Element::UnderYearDay, 3));
                }
            }
            b'3' => return Some((i, Element::Hour12, 1)),
            b'4' => return Some((i, Element::Minute, 1)),
            b'5' => return Some((i, Element::Second, 1)),
            b'P' if rest.starts_with(b"PM") => return Some((i, Element::UpperPm, 2)),
            b'p' if rest.starts_with(b"pm") => return Some((i, Element::LowerPm, 2)),
            b'-' | b'Z' => {
                for (pattern, colons, precision) in OFFSETS {
                    if rest[1..].starts_with(pattern.as_bytes()) {
                        let element = Element::Offset {
                            utc_z: bytes[i] == b'Z',
                            colons,
                            precision,
                        };
                        return Some((i, element, pattern.len() + 1));
                    }
                }
            }
            b'.' | b',' => {
                if let Some(&digit) = rest.get(1).filter(|c| matches!(**c, b'0' | b'9')) {
                    let run = rest[1..].iter().take_while(|&&c| c == digit).count();
                    let followed_by_digit = rest.get(1 + run).is_some_and(u8::is_ascii_digit);
                    if !followed_by_digit {
                        let element = Element::Fraction {
                            separator: bytes[i] as char,
                            digits: run,
                            trim: digit == b'9',
                        };
                        return Some((i, element, run + 1));
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn push_padded(out: &mut String, value: i64, width: usize, pad: char) {
    let digits = value.unsigned_abs().to_string();
    if value < 0 {
        out.push('-');
    }
    for _ in digits.len()..width {
        out.push(pad);
    }
    out.push_str(&digits);
}

fn push_offset(
    out: &mut String,
    offset_seconds: i32,
    utc_z: bool,
    colons: bool,
    precision: OffsetPrecision,
) {
    if utc_z && offset_seconds == 0 {
        out.push('Z');
        return;
    }
    out.push(if offset_seconds < 0 { '-' } else { '+' });
    let abs = i64::from(offset_seconds.unsigned_abs());
    push_padded(out, abs / 3600, 2, '0');
    if precision == OffsetPrecision::Hours {
        return;
    }
    if colons {
        out.push(':');
    }
    push_padded(out, abs / 60 % 60, 2, '0');
    if precision == OffsetPrecision::Seconds {
        if colons {
            out.push(':');
        }
        push_padded(out, abs % 60, 2, '0');
    }
}

fn push_fraction(out: &mut String, nanos: u32, separator: char, digits: usize, trim: bool) {
    if trim && (digits == 0 || nanos == 0) {
        return;
    }
    let all = format!("{:09}", nanos);
    let mut frac = &all[..digits.min(9)];
    if trim {
        frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            return;
        }
    }
    out.push(separator);
    out.push_str(frac);
}

impl Element {
    fn render(self, stamp: &Stamp, out: &mut String) {
        let t = &stamp.local;
        match self {
            Element::LongMonth => out.push_str(LONG_MONTHS[t.month0() as usize]),
            Element::Month => out.push_str(&LONG_MONTHS[t.month0() as usize][..3]),
            Element::NumMonth => push_padded(out, t.month().into(), 0, '0'),
            Element::ZeroMonth => push_padded(out, t.month().into(), 2, '0'),
            Element::LongWeekDay => {
                out.push_str(LONG_DAYS[t.weekday().num_days_from_sunday() as usize])
            }
            Element::WeekDay => {
                out.push_str(&LONG_DAYS[t.weekday().num_days_from_sunday() as usize][..3])
            }
            Element::Day => push_padded(out, t.day().into(), 0, '0'),
            Element::UnderDay => push_padded(out, t.day().into(), 2, ' '),
            Element::ZeroDay => push_padded(out, t.day().into(), 2, '0'),
            Element::UnderYearDay => push_padded(out, t.ordinal().into(), 3, ' '),
            Element::ZeroYearDay => push_padded(out, t.ordinal().into(), 3, '0'),
            Element::Hour => push_padded(out, t.hour().into(), 2, '0'),
            Element::Hour12 | Element::ZeroHour12 => {
                let hour = match t.hour() % 12 {
                    0 => 12,
                    h => h,
                };
                let width = if self == Element::ZeroHour12 { 2 } else { 0 };
                push_padded(out, hour.into(), width, '0');
            }
            Element::Minute => push_padded(out, t.minute().into(), 0, '0'),
            Element::ZeroMinute => push_padded(out, t.minute().into(), 2, '0'),
            Element::Second => push_padded(out, t.second().into(), 0, '0'),
            Element::ZeroSecond => push_padded(out, t.second().into(), 2, '0'),
            Element::LongYear => push_padded(out, t.year().into(), 4, '0'),
            Element::Year => push_padded(out, i64::from(t.year()).rem_euclid(100), 2, '0'),
            Element::UpperPm => out.push_str(if t.hour() >= 12 { "PM" } else { "AM" }),
            Element::LowerPm => out.push_str(if t.hour() >= 12 { "pm" } else { "am" }),
            Element::ZoneName => {
                if stamp.zone.is_empty() {
                    push_offset(out, stamp.offset_seconds, false, false, OffsetPrecision::Minutes);
                } else {
                    out.push_str(&stamp.zone);
                }
            }
            Element::Offset {
                utc_z,
                colons,
                precision,
            } => push_offset(out, stamp.offset_seconds, utc_z, colons, precision),
            Element::Fraction {
                separator,
                digits,
                trim,
            } => push_fraction(out, t.nanosecond() % 1_000_000_000, separator, digits, trim),
        }
    }
}

/// Render `stamp` according to `layout`
pub fn format(stamp: &Stamp, layout: &str) -> String {
    let mut out = String::with_capacity(layout.len() + 8);
    let mut rest = layout;
    while let Some((start, element, len)) = next_element(rest) {
        out.push_str(&rest[..start]);
        element.render(stamp, &mut out);
        rest = &rest[start + len..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn stamp(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, nanos: u32) -> Stamp {
        Stamp {
            local: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_nano_opt(h, min, s, nanos)
                .unwrap(),
            offset_seconds: 0,
            zone: "UTC".to_string(),
        }
    }

    fn with_offset(mut stamp: Stamp, offset_seconds: i32, zone: &str) -> Stamp {
        stamp.offset_seconds = offset_seconds;
        stamp.zone = zone.to_string();
        stamp
    }

    #[test]
    fn test_default_layout() {
        let s = stamp(2024, 3, 5, 9, 7, 2, 0);
        assert_eq!(format(&s, DEFAULT_LAYOUT), "2024-03-05");
    }

    #[test]
    fn test_clock_elements() {
        let s = stamp(2024, 3, 5, 21, 7, 2, 0);
        assert_eq!(format(&s, "15:04:05"), "21:07:02");
        assert_eq!(format(&s, "3:4:5 PM"), "9:7:2 PM");
        assert_eq!(format(&s, "03:04 pm"), "09:07 pm");
    }

    #[test]
    fn test_midnight_and_noon_on_12_hour_clock() {
        assert_eq!(format(&stamp(2024, 1, 1, 0, 30, 0, 0), "3:04PM"), "12:30AM");
        assert_eq!(format(&stamp(2024, 1, 1, 12, 30, 0, 0), "3:04PM"), "12:30PM");
    }

    #[test]
    fn test_names() {
        let s = stamp(2024, 3, 15, 0, 0, 0, 0);
        assert_eq!(format(&s, "Monday, January 2"), "Friday, March 15");
        assert_eq!(format(&s, "Mon Jan _2"), "Fri Mar 15");
        assert_eq!(format(&stamp(2024, 3, 5, 0, 0, 0, 0), "Jan _2"), "Mar  5");
    }

    #[test]
    fn test_lowercase_after_name_is_literal() {
        let s = stamp(2024, 3, 15, 0, 0, 0, 0);
        assert_eq!(format(&s, "Janet Monkey"), "Janet Monkey");
    }

    #[test]
    fn test_short_year_and_year_day() {
        let s = stamp(2024, 2, 9, 0, 0, 0, 0);
        assert_eq!(format(&s, "06/1/2"), "24/2/9");
        assert_eq!(format(&s, "002"), "040");
        assert_eq!(format(&s, "__2"), " 40");
    }

    #[test]
    fn test_underscore_before_long_year_is_literal() {
        let s = stamp(2024, 2, 9, 0, 0, 0, 0);
        assert_eq!(format(&s, "backup_2006"), "backup_2024");
    }

    #[test]
    fn test_offsets() {
        let s = with_offset(stamp(2024, 3, 15, 8, 0, 0, 0), -(4 * 3600 + 30 * 60), "");
        assert_eq!(format(&s, "-0700"), "-0430");
        assert_eq!(format(&s, "-07:00"), "-04:30");
        assert_eq!(format(&s, "-07"), "-04");
        assert_eq!(format(&s, "-07:00:00"), "-04:30:00");
        assert_eq!(format(&s, "Z07:00"), "-04:30");
        assert_eq!(format(&s, "MST"), "-0430");
    }

    #[test]
    fn test_iso_offset_prints_z_at_utc() {
        let s = stamp(2024, 3, 15, 8, 0, 0, 0);
        assert_eq!(format(&s, "2006-01-02T15:04:05Z07:00"), "2024-03-15T08:00:00Z");
        assert_eq!(format(&s, "-07:00"), "+00:00");
    }

    #[test]
    fn test_zone_abbreviation() {
        let s = with_offset(stamp(2024, 1, 15, 8, 0, 0, 0), 3600, "CET");
        assert_eq!(format(&s, "15:04 MST"), "08:00 CET");
    }

    #[test]
    fn test_fractional_seconds() {
        let s = stamp(2024, 1, 1, 0, 0, 5, 120_000_000);
        assert_eq!(format(&s, "05.000"), "05.120");
        assert_eq!(format(&s, "05.999"), "05.12");
        assert_eq!(format(&s, "05,000000"), "05,120000");
        let whole = stamp(2024, 1, 1, 0, 0, 5, 0);
        assert_eq!(format(&whole, "05.999"), "05");
    }

    #[test]
    fn test_fraction_followed_by_digit_is_not_an_element() {
        let s = stamp(2024, 3, 1, 0, 0, 5, 0);
        assert_eq!(format(&s, "v.01"), "v.03");
    }

    #[test]
    fn test_literal_text_is_kept() {
        let s = stamp(2024, 3, 15, 0, 0, 0, 0);
        assert_eq!(format(&s, "date: 2006/01/02 ✓"), "date: 2024/03/15 ✓");
        assert_eq!(format(&s, "%Y"), "%Y");
        assert_eq!(format(&s, ""), "");
    }
}
