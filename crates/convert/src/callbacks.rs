//! Capability interface abstracting session context out of conversion
//!
//! The same conversion code runs embedded in the engine (live session and
//! transaction state) and inside standalone tools (process defaults). All
//! environment-sensitive behavior goes through this trait; the conversion
//! logic itself holds no session state and is safe to call concurrently
//! with independent callback instances.

use crate::error::{Error, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use kestrel_value::{CharsetId, ZoneId};

/// Session/environment capabilities a conversion may need.
///
/// Constructed fresh per call site and never shared across threads. The
/// default method bodies implement the engine-neutral behavior; the
/// engine-embedded implementation overrides what its collaborators
/// (charset registry, time-zone table) can do better.
pub trait Callbacks {
    /// Convert text bytes between charsets.
    ///
    /// The default covers the engine's built-in charsets, which all agree
    /// on the ASCII plane: bytes pass through unchanged after target-side
    /// validation. A real charset registry replaces this wholesale.
    fn transliterate(&self, from: CharsetId, to: CharsetId, bytes: &[u8]) -> Result<Vec<u8>> {
        let _ = from;
        self.validate_bytes(to, bytes)?;
        Ok(bytes.to_vec())
    }

    /// Well-formedness of `bytes` under `charset`.
    fn validate_bytes(&self, charset: CharsetId, bytes: &[u8]) -> Result<()> {
        match charset {
            CharsetId::UTF8 => std::str::from_utf8(bytes)
                .map(|_| ())
                .map_err(|_| Error::CharsetValidity(charset)),
            CharsetId::ASCII => bytes
                .is_ascii()
                .then_some(())
                .ok_or(Error::CharsetValidity(charset)),
            // NONE and OCTETS accept anything
            _ => Ok(()),
        }
    }

    /// How many source bytes survive a copy into `capacity`. Only trailing
    /// pad bytes may be dropped; anything else is a truncation error
    /// carrying both lengths.
    fn truncate_len(&self, charset: CharsetId, bytes: &[u8], capacity: usize) -> Result<usize> {
        if bytes.len() <= capacity {
            return Ok(bytes.len());
        }
        let pad = charset.pad_byte();
        if bytes[capacity..].iter().all(|&b| b == pad) {
            Ok(capacity)
        } else {
            Err(Error::StringTruncation {
                source_len: bytes.len(),
                dest_len: capacity,
            })
        }
    }

    /// Calendar date for `TODAY` and for promoting a bare time of day.
    fn local_date(&self) -> NaiveDate;

    /// Timestamp substituted for the `NOW` verb.
    fn current_timestamp(&self) -> NaiveDateTime;

    /// Zone stamped onto zone-aware results whose source carries none.
    fn session_zone(&self) -> ZoneId;

    /// Textual form of a zone handle, for date/time rendering.
    fn zone_name(&self, zone: ZoneId) -> Result<String> {
        format_offset_zone(zone)
    }

    /// Resolve a trailing zone token from a date/time literal.
    fn zone_by_name(&self, name: &str) -> Result<ZoneId> {
        parse_offset_zone(name)
    }

    /// Render date/time text in the pre-ISO layout.
    fn legacy_datetime_format(&self) -> bool {
        false
    }
}

/// Engine-embedded flavor: wired to a session snapshot taken at call time.
#[derive(Debug, Clone)]
pub struct SessionCallbacks {
    now: NaiveDateTime,
    zone: ZoneId,
    legacy_format: bool,
}

impl SessionCallbacks {
    pub fn new(now: NaiveDateTime, zone: ZoneId, legacy_format: bool) -> Self {
        SessionCallbacks {
            now,
            zone,
            legacy_format,
        }
    }
}

impl Callbacks for SessionCallbacks {
    fn local_date(&self) -> NaiveDate {
        self.now.date()
    }

    fn current_timestamp(&self) -> NaiveDateTime {
        self.now
    }

    fn session_zone(&self) -> ZoneId {
        self.zone
    }

    fn legacy_datetime_format(&self) -> bool {
        self.legacy_format
    }
}

/// Standalone-tool flavor: process-local clock, UTC session zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCallbacks {
    pub legacy_format: bool,
}

impl Callbacks for SystemCallbacks {
    fn local_date(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn current_timestamp(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn session_zone(&self) -> ZoneId {
        ZoneId::UTC
    }

    fn legacy_datetime_format(&self) -> bool {
        self.legacy_format
    }
}

/// Render a fixed-offset zone handle. Region handles need the time-zone
/// collaborator and are not renderable here.
pub(crate) fn format_offset_zone(zone: ZoneId) -> Result<String> {
    if zone == ZoneId::UTC {
        return Ok("UTC".into());
    }
    match zone.offset_minutes() {
        Some(m) => {
            let sign = if m < 0 { '-' } else { '+' };
            let m = m.abs();
            Ok(format!("{}{:02}:{:02}", sign, m / 60, m % 60))
        }
        None => Err(Error::MalformedLiteral(format!("time zone id {}", zone.0))),
    }
}

/// Parse a zone token: `UTC`, `GMT`, or a `±HH:MM` / `±HH` offset.
pub(crate) fn parse_offset_zone(name: &str) -> Result<ZoneId> {
    let token = name.trim();
    if token.eq_ignore_ascii_case("utc") || token.eq_ignore_ascii_case("gmt") {
        return Ok(ZoneId::UTC);
    }
    let bad = || Error::MalformedLiteral(format!("time zone '{}'", token));
    let (sign, rest) = match token.as_bytes().first() {
        Some(b'+') => (1i32, &token[1..]),
        Some(b'-') => (-1i32, &token[1..]),
        _ => return Err(bad()),
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };
    let h: i32 = hours.parse().map_err(|_| bad())?;
    let m: i32 = minutes.parse().map_err(|_| bad())?;
    if h > 23 || m > 59 {
        return Err(bad());
    }
    ZoneId::from_offset(sign * (h * 60 + m)).ok_or_else(bad)
}
