//! Date/time literal parsing and rendering
//!
//! The parser reads up to three leading date components (digits or an
//! English month name), infers their order, then up to four clock
//! components and an optional trailing zone token. The assembled result is
//! validated against the calendar before anything is returned; that check
//! is the engine's only guard against values like February 30th.

use crate::callbacks::Callbacks;
use crate::error::{Error, Result, printable};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use kestrel_value::ZoneId;
use kestrel_value::encoding::TIME_UNITS_PER_SECOND;

/// What the caller wants out of the literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Date,
    Time,
    Timestamp,
}

/// A parsed literal: the moment itself plus the zone token's resolution,
/// when one was present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub datetime: NaiveDateTime,
    pub zone: Option<ZoneId>,
}

const MONTH_NAMES: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

const MONTH_ABBR: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Comp {
    Num { value: u32, digits: usize },
    Month(u32),
}

#[derive(Debug, Default)]
struct Parts {
    date: Vec<Comp>,
    /// `.` separated components 0 and 1 (the day.month.year convention).
    dotted: bool,
    clock: Vec<(u32, usize)>,
    zone: Option<String>,
}

/// Month number for a name of at least three letters that prefixes exactly
/// one English month.
fn month_by_name(word: &str) -> Option<u32> {
    if word.len() < 3 {
        return None;
    }
    let upper = word.to_ascii_uppercase();
    let mut found = None;
    for (idx, name) in MONTH_NAMES.iter().enumerate() {
        if name.starts_with(&upper) {
            if found.is_some() {
                return None;
            }
            found = Some(idx as u32 + 1);
        }
    }
    found
}

fn split_parts(text: &str, expect: Expect) -> Result<Parts> {
    let malformed = || Error::MalformedLiteral(printable(text));
    let bytes = text.as_bytes();
    let mut parts = Parts::default();
    let mut in_clock = expect == Expect::Time;
    let mut i = 0;

    while i < bytes.len() {
        // separator run before the next field; remember its shape
        let mut sep: Option<u8> = None;
        let mut spaced = false;
        while i < bytes.len() {
            match bytes[i] {
                b' ' => spaced = true,
                // a dash after a blank starts an offset zone, not a field
                b'-' if spaced => break,
                c @ (b',' | b'-' | b'/' | b'.' | b':') => {
                    if sep.is_none() {
                        sep = Some(c);
                    }
                }
                _ => break,
            }
            i += 1;
        }
        if i >= bytes.len() {
            if sep.is_some() {
                return Err(malformed());
            }
            break;
        }

        let first_field = parts.date.is_empty() && parts.clock.is_empty();
        if first_field && sep.is_some() {
            return Err(malformed());
        }
        if sep.is_none() && !spaced && !first_field {
            return Err(malformed());
        }

        match bytes[i] {
            b'+' => {
                parts.zone = Some(text[i..].trim().to_string());
                break;
            }
            b'-' if !first_field && spaced => {
                // a dash after a space can only start an offset zone
                parts.zone = Some(text[i..].trim().to_string());
                break;
            }
            b'0'..=b'9' => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let digits = i - start;
                let value: u32 = text[start..i].parse().map_err(|_| malformed())?;
                if !in_clock && parts.date.len() < 3 {
                    match parts.date.len() {
                        0 => {}
                        1 => {
                            if !matches!(sep, Some(b',' | b'-' | b'/' | b'.')) && !spaced {
                                return Err(malformed());
                            }
                            if sep == Some(b'.') {
                                parts.dotted = true;
                            }
                        }
                        _ => {
                            if !matches!(sep, Some(b',' | b'-' | b'/' | b'.')) && !spaced {
                                return Err(malformed());
                            }
                        }
                    }
                    parts.date.push(Comp::Num { value, digits });
                    if parts.date.len() == 3 {
                        in_clock = true;
                    }
                } else {
                    match parts.clock.len() {
                        0 => {
                            // the hour follows the date after a blank
                            if expect != Expect::Time && !spaced && sep != Some(b',') {
                                return Err(malformed());
                            }
                        }
                        1 | 2 => {
                            if sep != Some(b':') {
                                return Err(malformed());
                            }
                        }
                        3 => {
                            if sep != Some(b'.') {
                                return Err(malformed());
                            }
                        }
                        _ => return Err(malformed()),
                    }
                    parts.clock.push((value, digits));
                }
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let word = &text[start..i];
                let month_slot = !in_clock
                    && parts.date.len() < 2
                    && !parts.date.iter().any(|c| matches!(c, Comp::Month(_)));
                if month_slot && expect != Expect::Time {
                    let month = month_by_name(word).ok_or_else(malformed)?;
                    parts.date.push(Comp::Month(month));
                } else if parts.date.len() == 3 || !parts.clock.is_empty() || in_clock {
                    // date/clock complete; the rest names a zone
                    parts.zone = Some(text[start..].trim().to_string());
                    break;
                } else {
                    return Err(malformed());
                }
            }
            _ => return Err(malformed()),
        }
    }

    Ok(parts)
}

/// Resolve the date component order once all leading components are known.
fn infer_date(parts: &Parts, text: &str, cb: &dyn Callbacks) -> Result<NaiveDate> {
    let malformed = || Error::MalformedLiteral(printable(text));
    let invalid = || Error::CalendarValidity(printable(text));
    if parts.date.len() != 3 {
        return Err(malformed());
    }

    let iso = matches!(&parts.date[0], Comp::Num { digits, .. } if *digits > 2);
    let month_at_0 = matches!(&parts.date[0], Comp::Month(_));
    let month_at_1 = matches!(&parts.date[1], Comp::Month(_));

    // positions of (year, month, day) within the three components
    let (yp, mp, dp) = if iso {
        (0, 1, 2)
    } else if month_at_0 {
        (2, 0, 1)
    } else if month_at_1 || parts.dotted {
        (2, 1, 0)
    } else {
        (2, 0, 1)
    };

    let month = match &parts.date[mp] {
        Comp::Month(m) => *m,
        Comp::Num { value, .. } => *value,
    };
    let day = match &parts.date[dp] {
        Comp::Num { value, .. } => *value,
        Comp::Month(_) => return Err(malformed()),
    };
    let year = match &parts.date[yp] {
        Comp::Num { value, digits } => {
            if *digits <= 2 {
                window_year(*value as i32, cb.local_date().year())
            } else {
                *value as i32
            }
        }
        Comp::Month(_) => return Err(malformed()),
    };

    if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
        return Err(invalid());
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Two-digit years land in the century that puts them within fifty years
/// of the current date.
fn window_year(short: i32, current: i32) -> i32 {
    let low = current - 50;
    low + (short - low).rem_euclid(100)
}

fn assemble_clock(parts: &Parts, text: &str) -> Result<NaiveTime> {
    let invalid = || Error::CalendarValidity(printable(text));
    let mut it = parts.clock.iter();
    let hour = it.next().map(|&(v, _)| v).unwrap_or(0);
    let minute = it.next().map(|&(v, _)| v).unwrap_or(0);
    let second = it.next().map(|&(v, _)| v).unwrap_or(0);
    let fraction = it
        .next()
        .map(|&(v, digits)| scale_fraction(v, digits))
        .unwrap_or(0);
    if hour > 23 || minute > 59 || second > 59 {
        return Err(invalid());
    }
    NaiveTime::from_num_seconds_from_midnight_opt(
        hour * 3600 + minute * 60 + second,
        fraction * 100_000,
    )
    .ok_or_else(invalid)
}

/// Normalize a fraction field to ten-thousandths of a second.
fn scale_fraction(value: u32, digits: usize) -> u32 {
    let mut v = value;
    let mut d = digits;
    while d > 4 {
        v /= 10;
        d -= 1;
    }
    while d < 4 {
        v *= 10;
        d += 1;
    }
    v.min(TIME_UNITS_PER_SECOND - 1)
}

fn verb_moment(word: &str, cb: &dyn Callbacks) -> Result<Option<NaiveDateTime>> {
    let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0);
    let shifted = match word {
        "NOW" => Some(cb.current_timestamp()),
        "TODAY" => midnight(cb.local_date()),
        "TOMORROW" => cb.local_date().succ_opt().and_then(midnight),
        "YESTERDAY" => cb.local_date().pred_opt().and_then(midnight),
        _ => return Ok(None),
    };
    shifted
        .map(Some)
        .ok_or_else(|| Error::CalendarValidity(printable(word)))
}

/// Parse a date/time literal.
///
/// The clock part is optional when a date is expected and vice versa is an
/// error: a bare clock cannot satisfy `Expect::Date` because `:` never
/// separates date components.
pub fn parse_moment(text: &str, expect: Expect, cb: &dyn Callbacks) -> Result<Moment> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::MalformedLiteral(printable(text)));
    }

    // special verbs stand entirely on their own
    if let Some(dt) = verb_moment(&trimmed.to_ascii_uppercase(), cb)? {
        return Ok(Moment {
            datetime: dt,
            zone: None,
        });
    }

    let parts = split_parts(trimmed, expect)?;
    let time = assemble_clock(&parts, trimmed)?;
    let datetime = match expect {
        Expect::Time => {
            if parts.clock.is_empty() {
                return Err(Error::MalformedLiteral(printable(text)));
            }
            cb.local_date().and_time(time)
        }
        Expect::Date | Expect::Timestamp => {
            let date = infer_date(&parts, trimmed, cb)?;
            date.and_time(time)
        }
    };

    let zone = match &parts.zone {
        Some(token) => Some(cb.zone_by_name(token)?),
        None => None,
    };
    Ok(Moment { datetime, zone })
}

fn time_fraction(time: NaiveTime) -> u32 {
    use chrono::Timelike;
    (time.nanosecond() / 100_000).min(TIME_UNITS_PER_SECOND - 1)
}

pub(crate) fn format_date_text(date: NaiveDate, legacy: bool) -> String {
    if legacy {
        format!(
            "{:02}-{}-{:04}",
            date.day(),
            MONTH_ABBR[date.month0() as usize],
            date.year()
        )
    } else {
        format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
    }
}

pub(crate) fn format_time_text(time: NaiveTime, legacy: bool) -> String {
    use chrono::Timelike;
    if legacy {
        format!(
            "{}:{:02}:{:02}.{:04}",
            time.hour(),
            time.minute(),
            time.second(),
            time_fraction(time)
        )
    } else {
        format!(
            "{:02}:{:02}:{:02}.{:04}",
            time.hour(),
            time.minute(),
            time.second(),
            time_fraction(time)
        )
    }
}

pub(crate) fn format_timestamp_text(ts: NaiveDateTime, legacy: bool) -> String {
    format!(
        "{} {}",
        format_date_text(ts.date(), legacy),
        format_time_text(ts.time(), legacy)
    )
}
