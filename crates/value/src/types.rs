//! Scalar kinds and the tags that qualify them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar kinds understood by the engine.
///
/// Every value a record buffer can hold is one of these. Exact numeric
/// kinds carry a decimal scale next to the raw integer; text kinds carry a
/// charset tag. The enum is closed: converters match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    // Boolean
    Boolean,
    // Signed integers (scaled)
    Int16,
    Int32,
    Int64,
    Int128,
    // Unsigned integers (scaled)
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    // Binary floats
    Float32,
    Float64,
    // Decimal floats
    Dec64,
    Dec128,
    // Text
    Text,
    VarText,
    CText,
    // Date/time
    Date,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
    // Blob reference
    Blob,
}

impl Kind {
    /// Exact numerics: raw integer plus decimal scale.
    pub fn is_exact_numeric(&self) -> bool {
        matches!(
            self,
            Kind::Int16
                | Kind::Int32
                | Kind::Int64
                | Kind::Int128
                | Kind::UInt16
                | Kind::UInt32
                | Kind::UInt64
                | Kind::UInt128
        )
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            Kind::UInt16 | Kind::UInt32 | Kind::UInt64 | Kind::UInt128
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_exact_numeric()
            || matches!(
                self,
                Kind::Float32 | Kind::Float64 | Kind::Dec64 | Kind::Dec128
            )
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Kind::Text | Kind::VarText | Kind::CText)
    }

    pub fn is_datetime(&self) -> bool {
        matches!(
            self,
            Kind::Date | Kind::Time | Kind::TimeTz | Kind::Timestamp | Kind::TimestampTz
        )
    }

    /// Kinds whose raw value carries a time-zone handle.
    pub fn has_zone(&self) -> bool {
        matches!(self, Kind::TimeTz | Kind::TimestampTz)
    }

    /// Raw byte length for fixed-width kinds. Text kinds are sized by the
    /// descriptor, not the kind.
    pub fn fixed_len(&self) -> Option<usize> {
        match self {
            Kind::Boolean => Some(1),
            Kind::Int16 | Kind::UInt16 => Some(2),
            Kind::Int32 | Kind::UInt32 | Kind::Float32 => Some(4),
            Kind::Int64 | Kind::UInt64 | Kind::Float64 => Some(8),
            Kind::Int128 | Kind::UInt128 => Some(16),
            Kind::Dec64 | Kind::Dec128 => Some(16),
            Kind::Date => Some(4),
            Kind::Time => Some(4),
            Kind::TimeTz => Some(6),
            Kind::Timestamp => Some(8),
            Kind::TimestampTz => Some(10),
            Kind::Blob => Some(8),
            Kind::Text | Kind::VarText | Kind::CText => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Boolean => write!(f, "BOOLEAN"),
            Kind::Int16 => write!(f, "SMALLINT"),
            Kind::Int32 => write!(f, "INTEGER"),
            Kind::Int64 => write!(f, "BIGINT"),
            Kind::Int128 => write!(f, "INT128"),
            Kind::UInt16 => write!(f, "SMALLINT UNSIGNED"),
            Kind::UInt32 => write!(f, "INTEGER UNSIGNED"),
            Kind::UInt64 => write!(f, "BIGINT UNSIGNED"),
            Kind::UInt128 => write!(f, "INT128 UNSIGNED"),
            Kind::Float32 => write!(f, "FLOAT"),
            Kind::Float64 => write!(f, "DOUBLE PRECISION"),
            Kind::Dec64 => write!(f, "DECFLOAT(16)"),
            Kind::Dec128 => write!(f, "DECFLOAT(34)"),
            Kind::Text => write!(f, "CHAR"),
            Kind::VarText => write!(f, "VARCHAR"),
            Kind::CText => write!(f, "CSTRING"),
            Kind::Date => write!(f, "DATE"),
            Kind::Time => write!(f, "TIME"),
            Kind::TimeTz => write!(f, "TIME WITH TIME ZONE"),
            Kind::Timestamp => write!(f, "TIMESTAMP"),
            Kind::TimestampTz => write!(f, "TIMESTAMP WITH TIME ZONE"),
            Kind::Blob => write!(f, "BLOB"),
        }
    }
}

/// Character-set tag carried by text kinds.
///
/// The well-known ids below are the ones the engine itself cares about;
/// everything else is opaque to conversion and only meaningful to the
/// charset collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharsetId(pub u16);

impl CharsetId {
    pub const NONE: CharsetId = CharsetId(0);
    pub const BINARY: CharsetId = CharsetId(1);
    pub const ASCII: CharsetId = CharsetId(2);
    pub const UTF8: CharsetId = CharsetId(4);

    /// Pad byte for fixed text of this charset. Binary pads with NUL,
    /// everything else with space.
    pub fn pad_byte(&self) -> u8 {
        if *self == CharsetId::BINARY { 0 } else { b' ' }
    }
}

impl fmt::Display for CharsetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CharsetId::NONE => write!(f, "NONE"),
            CharsetId::BINARY => write!(f, "OCTETS"),
            CharsetId::ASCII => write!(f, "ASCII"),
            CharsetId::UTF8 => write!(f, "UTF8"),
            CharsetId(other) => write!(f, "CHARSET_{}", other),
        }
    }
}

/// Time-zone handle stored inside zone-aware date/time values.
///
/// Fixed-offset zones are encoded directly in the id as minutes displaced
/// by [`ZoneId::OFFSET_BIAS`]; region zones hold ids assigned by the
/// time-zone collaborator and are opaque here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u16);

impl ZoneId {
    /// Bias added to offset minutes so the whole ±23:59 range is positive.
    pub const OFFSET_BIAS: i32 = 1440;
    /// Highest id still denoting a fixed offset; anything above is a region.
    pub const MAX_OFFSET_ID: u16 = 2879;

    pub const UTC: ZoneId = ZoneId(Self::OFFSET_BIAS as u16);

    /// Encode a fixed offset in minutes east of UTC.
    pub fn from_offset(minutes: i32) -> Option<ZoneId> {
        if (-(Self::OFFSET_BIAS - 1)..Self::OFFSET_BIAS).contains(&minutes) {
            Some(ZoneId((minutes + Self::OFFSET_BIAS) as u16))
        } else {
            None
        }
    }

    /// Offset minutes east of UTC, if this id encodes a fixed offset.
    pub fn offset_minutes(&self) -> Option<i32> {
        if self.0 <= Self::MAX_OFFSET_ID && self.0 > 0 {
            Some(self.0 as i32 - Self::OFFSET_BIAS)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_lengths() {
        assert_eq!(Kind::Int16.fixed_len(), Some(2));
        assert_eq!(Kind::Int128.fixed_len(), Some(16));
        assert_eq!(Kind::TimestampTz.fixed_len(), Some(10));
        assert_eq!(Kind::VarText.fixed_len(), None);
    }

    #[test]
    fn test_kind_classes() {
        assert!(Kind::UInt64.is_exact_numeric());
        assert!(!Kind::Float64.is_exact_numeric());
        assert!(Kind::Dec128.is_numeric());
        assert!(Kind::CText.is_text());
        assert!(Kind::TimeTz.has_zone());
        assert!(!Kind::Timestamp.has_zone());
    }

    #[test]
    fn test_zone_offset_encoding() {
        let z = ZoneId::from_offset(330).unwrap();
        assert_eq!(z.offset_minutes(), Some(330));
        assert_eq!(ZoneId::UTC.offset_minutes(), Some(0));
        assert_eq!(ZoneId::from_offset(-90).unwrap().offset_minutes(), Some(-90));
        assert!(ZoneId::from_offset(2000).is_none());
    }

    #[test]
    fn test_pad_byte() {
        assert_eq!(CharsetId::BINARY.pad_byte(), 0);
        assert_eq!(CharsetId::UTF8.pad_byte(), b' ');
    }
}
