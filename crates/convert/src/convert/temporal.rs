//! Date/time "get" conversions
//!
//! The date/time kinds form a small lattice: a date or a time promotes
//! into a timestamp, a timestamp projects back down, and textual sources
//! go through the literal parser. A bare time promoted to a timestamp
//! borrows the callbacks' local date.

use crate::callbacks::Callbacks;
use crate::datetime::{Expect, Moment, parse_moment};
use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use kestrel_value::{Kind, ValueRef, ZoneId};

/// Time plus the zone it carried, if any.
pub(crate) struct ZonedTime {
    pub time: NaiveTime,
    pub zone: Option<ZoneId>,
}

/// Timestamp plus the zone it carried, if any.
pub(crate) struct ZonedTimestamp {
    pub datetime: NaiveDateTime,
    pub zone: Option<ZoneId>,
}

fn parsed(source: &ValueRef, expect: Expect, cb: &dyn Callbacks) -> Result<Moment> {
    parse_moment(&super::string::source_text(source, cb)?, expect, cb)
}

/// Read `source` as a calendar date.
pub fn get_date(source: &ValueRef, cb: &dyn Callbacks) -> Result<NaiveDate> {
    match source.kind {
        Kind::Date => source.read_date().map_err(Into::into),
        Kind::Timestamp | Kind::TimestampTz => Ok(source.read_timestamp()?.date()),
        Kind::Text | Kind::VarText | Kind::CText => {
            Ok(parsed(source, Expect::Date, cb)?.datetime.date())
        }
        other => Err(Error::UnsupportedConversion {
            from: other,
            to: Kind::Date,
        }),
    }
}

pub(crate) fn get_time_zoned(source: &ValueRef, cb: &dyn Callbacks) -> Result<ZonedTime> {
    match source.kind {
        Kind::Time => Ok(ZonedTime {
            time: source.read_time()?,
            zone: None,
        }),
        Kind::TimeTz => Ok(ZonedTime {
            time: source.read_time()?,
            zone: Some(source.read_zone()?),
        }),
        Kind::Timestamp => Ok(ZonedTime {
            time: source.read_timestamp()?.time(),
            zone: None,
        }),
        Kind::TimestampTz => Ok(ZonedTime {
            time: source.read_timestamp()?.time(),
            zone: Some(source.read_zone()?),
        }),
        Kind::Text | Kind::VarText | Kind::CText => {
            let m = parsed(source, Expect::Time, cb)?;
            Ok(ZonedTime {
                time: m.datetime.time(),
                zone: m.zone,
            })
        }
        other => Err(Error::UnsupportedConversion {
            from: other,
            to: Kind::Time,
        }),
    }
}

/// Read `source` as a time of day.
pub fn get_time(source: &ValueRef, cb: &dyn Callbacks) -> Result<NaiveTime> {
    get_time_zoned(source, cb).map(|z| z.time)
}

pub(crate) fn get_timestamp_zoned(source: &ValueRef, cb: &dyn Callbacks) -> Result<ZonedTimestamp> {
    match source.kind {
        Kind::Timestamp => Ok(ZonedTimestamp {
            datetime: source.read_timestamp()?,
            zone: None,
        }),
        Kind::TimestampTz => Ok(ZonedTimestamp {
            datetime: source.read_timestamp()?,
            zone: Some(source.read_zone()?),
        }),
        // a date is that day's midnight
        Kind::Date => {
            let date = source.read_date()?;
            Ok(ZonedTimestamp {
                datetime: date.and_time(midnight()),
                zone: None,
            })
        }
        // a bare time lands on the session's local date
        Kind::Time => Ok(ZonedTimestamp {
            datetime: cb.local_date().and_time(source.read_time()?),
            zone: None,
        }),
        Kind::TimeTz => Ok(ZonedTimestamp {
            datetime: cb.local_date().and_time(source.read_time()?),
            zone: Some(source.read_zone()?),
        }),
        Kind::Text | Kind::VarText | Kind::CText => {
            let m = parsed(source, Expect::Timestamp, cb)?;
            Ok(ZonedTimestamp {
                datetime: m.datetime,
                zone: m.zone,
            })
        }
        other => Err(Error::UnsupportedConversion {
            from: other,
            to: Kind::Timestamp,
        }),
    }
}

/// Read `source` as a timestamp.
pub fn get_timestamp(source: &ValueRef, cb: &dyn Callbacks) -> Result<NaiveDateTime> {
    get_timestamp_zoned(source, cb).map(|z| z.datetime)
}

fn midnight() -> NaiveTime {
    NaiveTime::MIN
}
