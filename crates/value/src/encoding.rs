//! Raw byte layout for every scalar kind
//!
//! Conversion writes into caller-owned record buffers, so the byte layout
//! of each kind lives here, next to nothing else. All integers are
//! little-endian. Dates count days since 1970-01-01; times count
//! ten-thousandths of a second since midnight.

use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;

/// Days from 0001-01-01 (CE) to 1970-01-01, the engine's date epoch.
const UNIX_EPOCH_DAYS: i32 = 719_163;

/// Time values tick in ten-thousandths of a second.
pub const TIME_UNITS_PER_SECOND: u32 = 10_000;

const TIME_UNITS_PER_DAY: u32 = 86_400 * TIME_UNITS_PER_SECOND;

fn window<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| Error::Storage(format!("expected {} raw bytes, found {}", N, bytes.len())))
}

macro_rules! int_codec {
    ($read:ident, $write:ident, $t:ty, $n:literal) => {
        pub fn $read(bytes: &[u8]) -> Result<$t> {
            Ok(<$t>::from_le_bytes(window::<$n>(bytes)?))
        }

        pub fn $write(out: &mut [u8], value: $t) -> Result<()> {
            if out.len() != $n {
                return Err(Error::Storage(format!(
                    "expected {} raw bytes, found {}",
                    $n,
                    out.len()
                )));
            }
            out.copy_from_slice(&value.to_le_bytes());
            Ok(())
        }
    };
}

int_codec!(read_i16, write_i16, i16, 2);
int_codec!(read_i32, write_i32, i32, 4);
int_codec!(read_i64, write_i64, i64, 8);
int_codec!(read_i128, write_i128, i128, 16);
int_codec!(read_u16, write_u16, u16, 2);
int_codec!(read_u32, write_u32, u32, 4);
int_codec!(read_u64, write_u64, u64, 8);
int_codec!(read_u128, write_u128, u128, 16);
int_codec!(read_f32_bits, write_f32_bits, u32, 4);
int_codec!(read_f64_bits, write_f64_bits, u64, 8);

pub fn read_f32(bytes: &[u8]) -> Result<f32> {
    Ok(f32::from_bits(read_f32_bits(bytes)?))
}

pub fn write_f32(out: &mut [u8], value: f32) -> Result<()> {
    write_f32_bits(out, value.to_bits())
}

pub fn read_f64(bytes: &[u8]) -> Result<f64> {
    Ok(f64::from_bits(read_f64_bits(bytes)?))
}

pub fn write_f64(out: &mut [u8], value: f64) -> Result<()> {
    write_f64_bits(out, value.to_bits())
}

pub fn encode_date(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - UNIX_EPOCH_DAYS
}

pub fn decode_date(days: i32) -> Result<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| Error::Storage(format!("day number {} outside the calendar", days)))
}

pub fn encode_time(time: NaiveTime) -> u32 {
    // leap-second nanos land in the same tick as 59.9999
    let sub = (time.nanosecond() / 100_000).min(TIME_UNITS_PER_SECOND - 1);
    time.num_seconds_from_midnight() * TIME_UNITS_PER_SECOND + sub
}

pub fn decode_time(units: u32) -> Result<NaiveTime> {
    if units >= TIME_UNITS_PER_DAY {
        return Err(Error::Storage(format!("time value {} past midnight", units)));
    }
    let secs = units / TIME_UNITS_PER_SECOND;
    let nanos = (units % TIME_UNITS_PER_SECOND) * 100_000;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
        .ok_or_else(|| Error::Storage(format!("time value {} past midnight", units)))
}

pub fn read_date(bytes: &[u8]) -> Result<NaiveDate> {
    decode_date(read_i32(bytes)?)
}

pub fn write_date(out: &mut [u8], date: NaiveDate) -> Result<()> {
    write_i32(out, encode_date(date))
}

pub fn read_time(bytes: &[u8]) -> Result<NaiveTime> {
    decode_time(read_u32(bytes)?)
}

pub fn write_time(out: &mut [u8], time: NaiveTime) -> Result<()> {
    write_u32(out, encode_time(time))
}

pub fn read_timestamp(bytes: &[u8]) -> Result<NaiveDateTime> {
    let raw = window::<8>(bytes)?;
    let date = read_date(&raw[..4])?;
    let time = read_time(&raw[4..])?;
    Ok(date.and_time(time))
}

pub fn write_timestamp(out: &mut [u8], ts: NaiveDateTime) -> Result<()> {
    if out.len() != 8 {
        return Err(Error::Storage(format!(
            "expected 8 raw bytes, found {}",
            out.len()
        )));
    }
    write_date(&mut out[..4], ts.date())?;
    write_time(&mut out[4..], ts.time())
}

pub fn read_decimal(bytes: &[u8]) -> Result<Decimal> {
    Ok(Decimal::deserialize(window::<16>(bytes)?))
}

pub fn write_decimal(out: &mut [u8], value: Decimal) -> Result<()> {
    if out.len() != 16 {
        return Err(Error::Storage(format!(
            "expected 16 raw bytes, found {}",
            out.len()
        )));
    }
    out.copy_from_slice(&value.serialize());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_epoch() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(encode_date(epoch), 0);
        assert_eq!(decode_date(0).unwrap(), epoch);

        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(decode_date(encode_date(d)).unwrap(), d);
        assert!(encode_date(d) > 0);

        let before = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
        assert_eq!(encode_date(before), -1);
    }

    #[test]
    fn test_time_units() {
        let t = NaiveTime::from_hms_milli_opt(10, 30, 45, 500).unwrap();
        let units = encode_time(t);
        assert_eq!(units, (10 * 3600 + 30 * 60 + 45) * 10_000 + 5_000);
        assert_eq!(decode_time(units).unwrap(), t);
        assert!(decode_time(864_000_000).is_err());
    }

    #[test]
    fn test_int_windows() {
        let mut buf = [0u8; 4];
        write_i32(&mut buf, -7).unwrap();
        assert_eq!(read_i32(&buf).unwrap(), -7);
        assert!(read_i32(&buf[..3]).is_err());
        assert!(write_i16(&mut buf, 1).is_err());
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let mut buf = [0u8; 8];
        write_timestamp(&mut buf, ts).unwrap();
        assert_eq!(read_timestamp(&buf).unwrap(), ts);
    }

    #[test]
    fn test_decimal_roundtrip() {
        let d = Decimal::new(12345, 2);
        let mut buf = [0u8; 16];
        write_decimal(&mut buf, d).unwrap();
        assert_eq!(read_decimal(&buf).unwrap(), d);
    }
}
