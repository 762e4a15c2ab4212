//! Borrowed descriptors over raw scalar storage
//!
//! A descriptor never owns its bytes: the record or message buffer does.
//! [`ValueRef`] is the read side, [`ValueMut`] the write side; the write
//! side's kind/scale/length/charset describe the shape the caller wants
//! produced, its prior byte content is never read.

use crate::encoding;
use crate::error::{Error, Result};
use crate::types::{CharsetId, Kind, ZoneId};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// Read-only view of one scalar value.
#[derive(Debug, Clone, Copy)]
pub struct ValueRef<'a> {
    pub kind: Kind,
    /// Power-of-ten scale; meaningful only for exact numeric kinds.
    pub scale: i8,
    /// Charset tag; meaningful only for text kinds.
    pub charset: CharsetId,
    pub bytes: &'a [u8],
}

impl<'a> ValueRef<'a> {
    pub fn new(kind: Kind, bytes: &'a [u8]) -> Self {
        ValueRef {
            kind,
            scale: 0,
            charset: CharsetId::NONE,
            bytes,
        }
    }

    pub fn with_scale(mut self, scale: i8) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_charset(mut self, charset: CharsetId) -> Self {
        self.charset = charset;
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn read_i16(&self) -> Result<i16> {
        encoding::read_i16(self.bytes)
    }

    pub fn read_i32(&self) -> Result<i32> {
        encoding::read_i32(self.bytes)
    }

    pub fn read_i64(&self) -> Result<i64> {
        encoding::read_i64(self.bytes)
    }

    pub fn read_i128(&self) -> Result<i128> {
        encoding::read_i128(self.bytes)
    }

    pub fn read_u16(&self) -> Result<u16> {
        encoding::read_u16(self.bytes)
    }

    pub fn read_u32(&self) -> Result<u32> {
        encoding::read_u32(self.bytes)
    }

    pub fn read_u64(&self) -> Result<u64> {
        encoding::read_u64(self.bytes)
    }

    pub fn read_u128(&self) -> Result<u128> {
        encoding::read_u128(self.bytes)
    }

    pub fn read_f32(&self) -> Result<f32> {
        encoding::read_f32(self.bytes)
    }

    pub fn read_f64(&self) -> Result<f64> {
        encoding::read_f64(self.bytes)
    }

    pub fn read_decimal(&self) -> Result<Decimal> {
        encoding::read_decimal(self.bytes)
    }

    pub fn read_date(&self) -> Result<NaiveDate> {
        encoding::read_date(self.bytes)
    }

    pub fn read_time(&self) -> Result<NaiveTime> {
        let raw = self.datetime_window(Kind::Time, 4)?;
        encoding::read_time(raw)
    }

    pub fn read_timestamp(&self) -> Result<NaiveDateTime> {
        let raw = self.datetime_window(Kind::Timestamp, 8)?;
        encoding::read_timestamp(raw)
    }

    /// Zone handle of a zone-aware date/time value.
    pub fn read_zone(&self) -> Result<ZoneId> {
        if !self.kind.has_zone() {
            return Err(Error::Storage(format!("{} carries no zone", self.kind)));
        }
        let n = self.bytes.len();
        if n < 2 {
            return Err(Error::Storage("zone-aware value too short".into()));
        }
        Ok(ZoneId(encoding::read_u16(&self.bytes[n - 2..])?))
    }

    pub fn read_bool(&self) -> Result<bool> {
        match self.bytes {
            [0] => Ok(false),
            [_] => Ok(true),
            _ => Err(Error::Storage(format!(
                "expected 1 raw byte, found {}",
                self.bytes.len()
            ))),
        }
    }

    /// Payload bytes of a text value: the full window for fixed text, the
    /// counted prefix for varying text, up to the NUL for C text.
    pub fn text_bytes(&self) -> Result<&'a [u8]> {
        match self.kind {
            Kind::Text => Ok(self.bytes),
            Kind::VarText => {
                if self.bytes.len() < 2 {
                    return Err(Error::Storage("varying text shorter than its count".into()));
                }
                let declared = encoding::read_u16(&self.bytes[..2])? as usize;
                self.bytes
                    .get(2..2 + declared)
                    .ok_or_else(|| Error::Storage("varying text count past the window".into()))
            }
            Kind::CText => {
                let end = self
                    .bytes
                    .iter()
                    .position(|&b| b == 0)
                    .unwrap_or(self.bytes.len());
                Ok(&self.bytes[..end])
            }
            other => Err(Error::Storage(format!("{} is not a text kind", other))),
        }
    }

    // TimeTz/TimestampTz share the leading layout of their zone-less kind.
    fn datetime_window(&self, base: Kind, len: usize) -> Result<&'a [u8]> {
        if self.kind == base {
            return Ok(self.bytes);
        }
        self.bytes
            .get(..len)
            .ok_or_else(|| Error::Storage(format!("{} value too short", self.kind)))
    }
}

/// Write-side descriptor: the desired result shape plus the destination
/// window to fill.
#[derive(Debug)]
pub struct ValueMut<'a> {
    pub kind: Kind,
    pub scale: i8,
    pub charset: CharsetId,
    pub bytes: &'a mut [u8],
}

impl<'a> ValueMut<'a> {
    pub fn new(kind: Kind, bytes: &'a mut [u8]) -> Self {
        ValueMut {
            kind,
            scale: 0,
            charset: CharsetId::NONE,
            bytes,
        }
    }

    pub fn with_scale(mut self, scale: i8) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_charset(mut self, charset: CharsetId) -> Self {
        self.charset = charset;
        self
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Re-borrow as a read view (used by the fast path and by tests).
    pub fn as_ref(&self) -> ValueRef<'_> {
        ValueRef {
            kind: self.kind,
            scale: self.scale,
            charset: self.charset,
            bytes: self.bytes,
        }
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        encoding::write_i16(self.bytes, value)
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        encoding::write_i32(self.bytes, value)
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        encoding::write_i64(self.bytes, value)
    }

    pub fn write_i128(&mut self, value: i128) -> Result<()> {
        encoding::write_i128(self.bytes, value)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        encoding::write_u16(self.bytes, value)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        encoding::write_u32(self.bytes, value)
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        encoding::write_u64(self.bytes, value)
    }

    pub fn write_u128(&mut self, value: u128) -> Result<()> {
        encoding::write_u128(self.bytes, value)
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        encoding::write_f32(self.bytes, value)
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        encoding::write_f64(self.bytes, value)
    }

    pub fn write_decimal(&mut self, value: Decimal) -> Result<()> {
        encoding::write_decimal(self.bytes, value)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        match self.bytes {
            [slot] => {
                *slot = value as u8;
                Ok(())
            }
            _ => Err(Error::Storage(format!(
                "expected 1 raw byte, found {}",
                self.bytes.len()
            ))),
        }
    }

    pub fn write_date(&mut self, date: NaiveDate) -> Result<()> {
        encoding::write_date(self.bytes, date)
    }

    pub fn write_time(&mut self, time: NaiveTime, zone: Option<ZoneId>) -> Result<()> {
        match (self.kind, zone) {
            (Kind::Time, None) => encoding::write_time(self.bytes, time),
            (Kind::TimeTz, Some(z)) => {
                if self.bytes.len() != 6 {
                    return Err(Error::Storage(format!(
                        "expected 6 raw bytes, found {}",
                        self.bytes.len()
                    )));
                }
                encoding::write_time(&mut self.bytes[..4], time)?;
                encoding::write_u16(&mut self.bytes[4..], z.0)
            }
            _ => Err(Error::Storage(format!(
                "time written with mismatched zone for {}",
                self.kind
            ))),
        }
    }

    pub fn write_timestamp(&mut self, ts: NaiveDateTime, zone: Option<ZoneId>) -> Result<()> {
        match (self.kind, zone) {
            (Kind::Timestamp, None) => encoding::write_timestamp(self.bytes, ts),
            (Kind::TimestampTz, Some(z)) => {
                if self.bytes.len() != 10 {
                    return Err(Error::Storage(format!(
                        "expected 10 raw bytes, found {}",
                        self.bytes.len()
                    )));
                }
                encoding::write_timestamp(&mut self.bytes[..8], ts)?;
                encoding::write_u16(&mut self.bytes[8..], z.0)
            }
            _ => Err(Error::Storage(format!(
                "timestamp written with mismatched zone for {}",
                self.kind
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_text_window() {
        let mut raw = vec![3, 0];
        raw.extend_from_slice(b"abcXX");
        let v = ValueRef::new(Kind::VarText, &raw).with_charset(CharsetId::ASCII);
        assert_eq!(v.text_bytes().unwrap(), b"abc");

        let short = [9u8, 0, b'a'];
        let v = ValueRef::new(Kind::VarText, &short);
        assert!(v.text_bytes().is_err());
    }

    #[test]
    fn test_c_text_stops_at_nul() {
        let raw = b"ab\0cd";
        let v = ValueRef::new(Kind::CText, raw);
        assert_eq!(v.text_bytes().unwrap(), b"ab");
    }

    #[test]
    fn test_zone_tail() {
        let mut raw = [0u8; 6];
        raw[4..].copy_from_slice(&ZoneId::UTC.0.to_le_bytes());
        let v = ValueRef::new(Kind::TimeTz, &raw);
        assert_eq!(v.read_zone().unwrap(), ZoneId::UTC);
        assert_eq!(v.read_time().unwrap(), decode_midnight());
    }

    fn decode_midnight() -> NaiveTime {
        NaiveTime::from_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_write_reads_back() {
        let mut buf = [0u8; 8];
        let mut target = ValueMut::new(Kind::Int64, &mut buf).with_scale(-2);
        target.write_i64(-12345).unwrap();
        assert_eq!(target.as_ref().read_i64().unwrap(), -12345);
    }
}
