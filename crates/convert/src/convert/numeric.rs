//! Numeric "get" conversions
//!
//! One generic routine serves every integer width: read the source in its
//! native width, rescale, narrow with a range check. The width traits keep
//! the overflow thresholds out of this file entirely.

use crate::callbacks::Callbacks;
use crate::decompose::{decompose, decompose_f64, scan};
use crate::error::{Error, Result};
use kestrel_value::{Kind, ScaledInt, ValueRef, decimal_digits, set_scale};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Absorbs binary/decimal representation error when rounding a float.
const FLOAT_ROUND_EPS: f64 = 1e-9;

fn round_half_away(value: f64) -> f64 {
    if value >= 0.0 {
        (value + 0.5 + FLOAT_ROUND_EPS).floor()
    } else {
        (value - 0.5 - FLOAT_ROUND_EPS).ceil()
    }
}

fn rescaled_i128<T: ScaledInt>(value: i128, from_scale: i32, to_scale: i32) -> Result<T> {
    let adjusted =
        set_scale(value, from_scale, to_scale).map_err(|_| Error::NumericOverflow(T::NAME))?;
    T::from_i128(adjusted).ok_or(Error::NumericOverflow(T::NAME))
}

fn rescaled_u128<T: ScaledInt>(value: u128, from_scale: i32, to_scale: i32) -> Result<T> {
    let adjusted =
        set_scale(value, from_scale, to_scale).map_err(|_| Error::NumericOverflow(T::NAME))?;
    T::from_u128(adjusted).ok_or(Error::NumericOverflow(T::NAME))
}

fn rounded_f64<T: ScaledInt>(value: f64, to_scale: i32) -> Result<T> {
    let rounded = round_half_away(value * 10f64.powi(-to_scale));
    if !T::f64_in_range(rounded) {
        return Err(Error::NumericOverflow(T::NAME));
    }
    Ok(T::from_f64_unchecked(rounded))
}

// A decimal is its mantissa at the scale its exponent names; from there the
// shared rescale path applies.
fn rescaled_decimal<T: ScaledInt>(value: Decimal, to_scale: i32) -> Result<T> {
    rescaled_i128(value.mantissa(), -(value.scale() as i32), to_scale)
}

/// Read `source` as an integer of width `T` at `target_scale`.
pub(crate) fn get_int<T: ScaledInt>(
    source: &ValueRef,
    target_scale: i32,
    cb: &dyn Callbacks,
) -> Result<T> {
    let from = source.scale as i32;
    match source.kind {
        Kind::Int16 => rescaled_i128(source.read_i16()? as i128, from, target_scale),
        Kind::Int32 => rescaled_i128(source.read_i32()? as i128, from, target_scale),
        Kind::Int64 => rescaled_i128(source.read_i64()? as i128, from, target_scale),
        Kind::Int128 => rescaled_i128(source.read_i128()?, from, target_scale),
        Kind::UInt16 => rescaled_u128(source.read_u16()? as u128, from, target_scale),
        Kind::UInt32 => rescaled_u128(source.read_u32()? as u128, from, target_scale),
        Kind::UInt64 => rescaled_u128(source.read_u64()? as u128, from, target_scale),
        Kind::UInt128 => rescaled_u128(source.read_u128()?, from, target_scale),
        Kind::Float32 => rounded_f64(source.read_f32()? as f64, target_scale),
        Kind::Float64 => rounded_f64(source.read_f64()?, target_scale),
        Kind::Dec64 | Kind::Dec128 => rescaled_decimal(source.read_decimal()?, target_scale),
        Kind::Text | Kind::VarText | Kind::CText => {
            let text = super::string::source_text(source, cb)?;
            let (value, scale) = decompose::<T>(&text)?;
            set_scale(value, scale, target_scale).map_err(|_| Error::NumericOverflow(T::NAME))
        }
        other => Err(Error::UnsupportedConversion {
            from: other,
            to: T::KIND,
        }),
    }
}

pub fn get_i16(source: &ValueRef, target_scale: i32, cb: &dyn Callbacks) -> Result<i16> {
    get_int(source, target_scale, cb)
}

pub fn get_i32(source: &ValueRef, target_scale: i32, cb: &dyn Callbacks) -> Result<i32> {
    get_int(source, target_scale, cb)
}

pub fn get_i64(source: &ValueRef, target_scale: i32, cb: &dyn Callbacks) -> Result<i64> {
    get_int(source, target_scale, cb)
}

pub fn get_i128(source: &ValueRef, target_scale: i32, cb: &dyn Callbacks) -> Result<i128> {
    get_int(source, target_scale, cb)
}

pub fn get_u16(source: &ValueRef, target_scale: i32, cb: &dyn Callbacks) -> Result<u16> {
    get_int(source, target_scale, cb)
}

pub fn get_u32(source: &ValueRef, target_scale: i32, cb: &dyn Callbacks) -> Result<u32> {
    get_int(source, target_scale, cb)
}

pub fn get_u64(source: &ValueRef, target_scale: i32, cb: &dyn Callbacks) -> Result<u64> {
    get_int(source, target_scale, cb)
}

pub fn get_u128(source: &ValueRef, target_scale: i32, cb: &dyn Callbacks) -> Result<u128> {
    get_int(source, target_scale, cb)
}

/// Read `source` in the floating domain.
pub fn get_f64(source: &ValueRef, cb: &dyn Callbacks) -> Result<f64> {
    let scaled_int = |v: f64, scale: i8| v * 10f64.powi(scale as i32);
    match source.kind {
        Kind::Int16 => Ok(scaled_int(source.read_i16()? as f64, source.scale)),
        Kind::Int32 => Ok(scaled_int(source.read_i32()? as f64, source.scale)),
        Kind::Int64 => Ok(scaled_int(source.read_i64()? as f64, source.scale)),
        Kind::Int128 => Ok(scaled_int(source.read_i128()? as f64, source.scale)),
        Kind::UInt16 => Ok(scaled_int(source.read_u16()? as f64, source.scale)),
        Kind::UInt32 => Ok(scaled_int(source.read_u32()? as f64, source.scale)),
        Kind::UInt64 => Ok(scaled_int(source.read_u64()? as f64, source.scale)),
        Kind::UInt128 => Ok(scaled_int(source.read_u128()? as f64, source.scale)),
        Kind::Float32 => Ok(source.read_f32()? as f64),
        Kind::Float64 => source.read_f64().map_err(Into::into),
        Kind::Dec64 | Kind::Dec128 => source
            .read_decimal()?
            .to_f64()
            .ok_or(Error::NumericOverflow("DOUBLE PRECISION")),
        Kind::Text | Kind::VarText | Kind::CText => {
            decompose_f64(&super::string::source_text(source, cb)?)
        }
        other => Err(Error::UnsupportedConversion {
            from: other,
            to: Kind::Float64,
        }),
    }
}

fn pow10_decimal(exp: u32) -> Result<Decimal> {
    let mut d = Decimal::ONE;
    for _ in 0..exp {
        d = d
            .checked_mul(Decimal::TEN)
            .ok_or(Error::NumericOverflow("DECFLOAT(34)"))?;
    }
    Ok(d)
}

fn decimal_from_scaled(mantissa: i128, scale: i8) -> Result<Decimal> {
    let overflow = || Error::NumericOverflow("DECFLOAT(34)");
    if scale <= 0 {
        let frac = (-scale) as u32;
        if frac > 28 {
            return Err(overflow());
        }
        Decimal::try_from_i128_with_scale(mantissa, frac).map_err(|_| overflow())
    } else {
        let base = Decimal::try_from_i128_with_scale(mantissa, 0).map_err(|_| overflow())?;
        base.checked_mul(pow10_decimal(scale as u32)?)
            .ok_or_else(overflow)
    }
}

/// Read `source` as a decimal float.
pub fn get_decimal(source: &ValueRef, cb: &dyn Callbacks) -> Result<Decimal> {
    match source.kind {
        Kind::Int16 => decimal_from_scaled(source.read_i16()? as i128, source.scale),
        Kind::Int32 => decimal_from_scaled(source.read_i32()? as i128, source.scale),
        Kind::Int64 => decimal_from_scaled(source.read_i64()? as i128, source.scale),
        Kind::Int128 => decimal_from_scaled(source.read_i128()?, source.scale),
        Kind::UInt16 => decimal_from_scaled(source.read_u16()? as i128, source.scale),
        Kind::UInt32 => decimal_from_scaled(source.read_u32()? as i128, source.scale),
        Kind::UInt64 => decimal_from_scaled(source.read_u64()? as i128, source.scale),
        Kind::UInt128 => {
            let wide = source.read_u128()?;
            let narrowed =
                i128::try_from(wide).map_err(|_| Error::NumericOverflow("DECFLOAT(34)"))?;
            decimal_from_scaled(narrowed, source.scale)
        }
        Kind::Float32 => decimal_from_f64(source.read_f32()? as f64),
        Kind::Float64 => decimal_from_f64(source.read_f64()?),
        Kind::Dec64 | Kind::Dec128 => source.read_decimal().map_err(Into::into),
        Kind::Text | Kind::VarText | Kind::CText => {
            decimal_from_text(&super::string::source_text(source, cb)?)
        }
        other => Err(Error::UnsupportedConversion {
            from: other,
            to: Kind::Dec128,
        }),
    }
}

/// [`get_decimal`] squeezed to the 16-digit decimal width.
pub fn get_decimal64(source: &ValueRef, cb: &dyn Callbacks) -> Result<Decimal> {
    round_to_precision(get_decimal(source, cb)?, 16)
}

/// [`get_decimal`] at the full precision the decimal library carries.
pub fn get_decimal128(source: &ValueRef, cb: &dyn Callbacks) -> Result<Decimal> {
    get_decimal(source, cb)
}

fn decimal_from_f64(value: f64) -> Result<Decimal> {
    use rust_decimal::prelude::FromPrimitive;
    Decimal::from_f64(value).ok_or(Error::NumericOverflow("DECFLOAT(34)"))
}

// The grammar check runs first so magnitude failures inside the decimal
// library surface as overflow, not as a malformed literal.
fn decimal_from_text(text: &str) -> Result<Decimal> {
    use crate::decompose::Literal;
    use std::str::FromStr;
    match scan(text)? {
        Literal::Hex { .. } => {
            let (bits, _) = decompose::<i128>(text)?;
            decimal_from_scaled(bits, 0)
        }
        Literal::Dec { .. } => {
            let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace());
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|_| Error::NumericOverflow("DECFLOAT(34)"))
        }
    }
}

/// Round to `digits` significant decimal digits, half away from zero on
/// the first discarded digit.
pub(crate) fn round_to_precision(value: Decimal, digits: u32) -> Result<Decimal> {
    let mantissa = value.mantissa();
    let have = decimal_digits(mantissa.unsigned_abs());
    if have <= digits {
        return Ok(value);
    }
    let excess = (have - digits) as i32;
    let rounded = set_scale(mantissa, 0, excess)?;
    let new_scale = value.scale() as i32 - excess;
    if new_scale >= 0 {
        Decimal::try_from_i128_with_scale(rounded, new_scale as u32)
            .map_err(|_| Error::NumericOverflow("DECFLOAT(16)"))
    } else {
        // scale cannot go negative; pad the mantissa back with zeros
        let padded = set_scale(rounded, -new_scale, 0)?;
        Decimal::try_from_i128_with_scale(padded, 0)
            .map_err(|_| Error::NumericOverflow("DECFLOAT(16)"))
    }
}

/// Read `source` as a boolean. Only booleans and the textual forms
/// `true`/`false` qualify.
pub fn get_boolean(source: &ValueRef, cb: &dyn Callbacks) -> Result<bool> {
    match source.kind {
        Kind::Boolean => source.read_bool().map_err(Into::into),
        Kind::Text | Kind::VarText | Kind::CText => {
            let text = super::string::source_text(source, cb)?;
            let word = text.trim();
            if word.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if word.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err(Error::MalformedLiteral(crate::error::printable(word)))
            }
        }
        other => Err(Error::UnsupportedConversion {
            from: other,
            to: Kind::Boolean,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::SystemCallbacks;
    use kestrel_value::encoding;

    fn cb() -> SystemCallbacks {
        SystemCallbacks::default()
    }

    fn i32_source(value: i32, scale: i8, buf: &mut [u8; 4]) -> ValueRef<'_> {
        encoding::write_i32(buf, value).unwrap();
        ValueRef::new(Kind::Int32, buf).with_scale(scale)
    }

    #[test]
    fn test_scale_down_rounding() {
        let mut buf = [0u8; 4];
        // 1.25 -> one fraction digit: 1.3
        let src = i32_source(125, -2, &mut buf);
        assert_eq!(get_i32(&src, -1, &cb()).unwrap(), 13);
        let src = i32_source(124, -2, &mut buf);
        assert_eq!(get_i32(&src, -1, &cb()).unwrap(), 12);
    }

    #[test]
    fn test_narrowing_is_range_checked() {
        let mut buf = [0u8; 8];
        encoding::write_i64(&mut buf, 40_000).unwrap();
        let src = ValueRef::new(Kind::Int64, &buf);
        assert!(matches!(
            get_i16(&src, 0, &cb()),
            Err(Error::NumericOverflow("SMALLINT"))
        ));
        assert_eq!(get_i32(&src, 0, &cb()).unwrap(), 40_000);
    }

    #[test]
    fn test_signed_to_unsigned() {
        let mut buf = [0u8; 4];
        let src = i32_source(-5, 0, &mut buf);
        assert!(get_u32(&src, 0, &cb()).is_err());
        let src = i32_source(5, 0, &mut buf);
        assert_eq!(get_u32(&src, 0, &cb()).unwrap(), 5);
    }

    #[test]
    fn test_text_source_accumulates_in_target_width() {
        let src = ValueRef::new(Kind::Text, b"2147483648").with_charset(
            kestrel_value::CharsetId::ASCII,
        );
        assert!(get_i32(&src, 0, &cb()).is_err());
        assert_eq!(get_i64(&src, 0, &cb()).unwrap(), 2147483648);
    }

    #[test]
    fn test_float_rounds_half_away() {
        let mut buf = [0u8; 8];
        encoding::write_f64(&mut buf, 2.5).unwrap();
        let src = ValueRef::new(Kind::Float64, &buf);
        assert_eq!(get_i32(&src, 0, &cb()).unwrap(), 3);

        encoding::write_f64(&mut buf, -2.5).unwrap();
        let src = ValueRef::new(Kind::Float64, &buf);
        assert_eq!(get_i32(&src, 0, &cb()).unwrap(), -3);

        encoding::write_f64(&mut buf, 1.25).unwrap();
        let src = ValueRef::new(Kind::Float64, &buf);
        assert_eq!(get_i32(&src, -2, &cb()).unwrap(), 125);

        encoding::write_f64(&mut buf, 1e30).unwrap();
        let src = ValueRef::new(Kind::Float64, &buf);
        assert!(get_i64(&src, 0, &cb()).is_err());
    }

    #[test]
    fn test_decimal_source() {
        let mut buf = [0u8; 16];
        encoding::write_decimal(&mut buf, Decimal::new(1250, 3)).unwrap();
        let src = ValueRef::new(Kind::Dec128, &buf);
        // 1.250 at two fraction digits is 125
        assert_eq!(get_i32(&src, -2, &cb()).unwrap(), 125);
        // and 1.25 rounded to an integer is 1
        assert_eq!(get_i32(&src, 0, &cb()).unwrap(), 1);
    }

    #[test]
    fn test_get_f64_sources() {
        let mut buf = [0u8; 4];
        let src = i32_source(125, -2, &mut buf);
        assert!((get_f64(&src, &cb()).unwrap() - 1.25).abs() < 1e-12);

        let src = ValueRef::new(Kind::VarText, b"\x05\x002.5e1");
        assert_eq!(get_f64(&src, &cb()).unwrap(), 25.0);
    }

    #[test]
    fn test_get_decimal_from_scaled_int() {
        let mut buf = [0u8; 4];
        let src = i32_source(125, -2, &mut buf);
        assert_eq!(get_decimal(&src, &cb()).unwrap(), Decimal::new(125, 2));

        let src = i32_source(3, 2, &mut buf);
        assert_eq!(get_decimal(&src, &cb()).unwrap(), Decimal::from(300));
    }

    #[test]
    fn test_decimal_text_magnitude_vs_grammar() {
        let src = ValueRef::new(Kind::Text, b"not-a-number");
        assert!(matches!(
            get_decimal(&src, &cb()),
            Err(Error::MalformedLiteral(_))
        ));
        let big = "9".repeat(40);
        let src = ValueRef::new(Kind::Text, big.as_bytes());
        assert!(matches!(
            get_decimal(&src, &cb()),
            Err(Error::NumericOverflow(_))
        ));
    }

    #[test]
    fn test_round_to_precision() {
        // 19 significant digits squeeze to 16, rounding on the 17th
        let d = Decimal::from_str_exact("12345678901234567.89").unwrap();
        let r = round_to_precision(d, 16).unwrap();
        assert_eq!(r.to_string(), "12345678901234570");

        let d = Decimal::from_str_exact("1.5").unwrap();
        assert_eq!(round_to_precision(d, 16).unwrap(), d);
    }

    #[test]
    fn test_get_boolean() {
        let src = ValueRef::new(Kind::Text, b" TRUE ");
        assert!(get_boolean(&src, &cb()).unwrap());
        let src = ValueRef::new(Kind::Text, b"false");
        assert!(!get_boolean(&src, &cb()).unwrap());
        let src = ValueRef::new(Kind::Text, b"yes");
        assert!(get_boolean(&src, &cb()).is_err());

        let raw = [1u8];
        let src = ValueRef::new(Kind::Boolean, &raw);
        assert!(get_boolean(&src, &cb()).unwrap());
    }

    #[test]
    fn test_unsupported_sources() {
        let raw = [0u8; 8];
        let src = ValueRef::new(Kind::Blob, &raw);
        assert!(matches!(
            get_i32(&src, 0, &cb()),
            Err(Error::UnsupportedConversion { .. })
        ));
        let src = ValueRef::new(Kind::Boolean, &raw[..1]);
        assert!(matches!(
            get_f64(&src, &cb()),
            Err(Error::UnsupportedConversion { .. })
        ));
    }
}
