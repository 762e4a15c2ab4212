//! Text renderings and the text target path
//!
//! Everything becomes text here: scaled integers by digit accumulation,
//! floats through a precision-reduction loop bounded by the destination,
//! decimals and date/times via their canonical renderings. The writing
//! side owns padding and the trailing-pad-only truncation rule.

use crate::callbacks::Callbacks;
use crate::datetime::{format_date_text, format_time_text, format_timestamp_text};
use crate::error::{Error, Result, printable};
use kestrel_value::{CharsetId, Kind, ScaledInt, ValueMut, ValueRef, Wide};

/// Scratch capacity for renderings that are not destination-bounded.
const DIAG_RENDER_CAP: usize = 64;

/// Text payload of a textual source as UTF-8.
pub(crate) fn source_text(source: &ValueRef, cb: &dyn Callbacks) -> Result<String> {
    let bytes = source.text_bytes()?;
    cb.validate_bytes(source.charset, bytes)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| Error::MalformedLiteral(printable(&String::from_utf8_lossy(bytes))))
}

/// Render a scaled integer: digits first, then the decimal point slotted in
/// at the position the scale implies, zero-padded when the digit count
/// cannot reach that position.
pub(crate) fn render_wide(value: Wide, scale: i8) -> String {
    let digits = value.magnitude().to_string();
    let mut out = String::with_capacity(digits.len() + 4);
    if value.is_negative() {
        out.push('-');
    }
    if scale > 0 {
        out.push_str(&digits);
        for _ in 0..scale {
            out.push('0');
        }
    } else if scale < 0 {
        let frac = (-scale) as usize;
        if digits.len() <= frac {
            out.push_str("0.");
            for _ in 0..frac - digits.len() {
                out.push('0');
            }
            out.push_str(&digits);
        } else {
            let split = digits.len() - frac;
            out.push_str(&digits[..split]);
            out.push('.');
            out.push_str(&digits[split..]);
        }
    } else {
        out.push_str(&digits);
    }
    out
}

/// Render a float into at most `capacity` characters, giving up precision
/// one digit at a time and switching to scientific notation when the
/// exponent forces it. Below two significant digits there is nothing left
/// to shrink and the value simply does not fit.
pub(crate) fn render_f64(value: f64, natural: usize, capacity: usize) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::NumericOverflow("DOUBLE PRECISION"));
    }
    let mut precision = natural;
    while precision >= 2 {
        let s = format_general(value, precision);
        if s.len() <= capacity {
            return Ok(s);
        }
        precision -= 1;
    }
    Err(Error::NumericOverflow("DOUBLE PRECISION"))
}

fn format_general(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let exp = value.abs().log10().floor() as i32;
    if exp < -4 || exp >= precision as i32 {
        let s = format!("{:.*e}", precision.saturating_sub(1), value);
        match s.split_once('e') {
            Some((mantissa, exponent)) => {
                let mantissa = if mantissa.contains('.') {
                    mantissa.trim_end_matches('0').trim_end_matches('.')
                } else {
                    mantissa
                };
                format!("{}e{}", mantissa, exponent)
            }
            None => s,
        }
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        let s = format!("{:.*}", decimals, value);
        if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            s
        }
    }
}

/// Render any source kind to bytes plus the charset those bytes are in.
/// `capacity` bounds only the float path, whose precision is negotiable;
/// every other rendering is what it is and the caller truncates.
pub(crate) fn render_source(
    source: &ValueRef,
    cb: &dyn Callbacks,
    capacity: usize,
    to: Kind,
) -> Result<(Vec<u8>, CharsetId)> {
    let legacy = cb.legacy_datetime_format();
    let rendered = match source.kind {
        Kind::Text | Kind::VarText | Kind::CText => {
            return Ok((source.text_bytes()?.to_vec(), source.charset));
        }
        Kind::Int16 => render_wide(source.read_i16()?.widen(), source.scale),
        Kind::Int32 => render_wide(source.read_i32()?.widen(), source.scale),
        Kind::Int64 => render_wide(source.read_i64()?.widen(), source.scale),
        Kind::Int128 => render_wide(source.read_i128()?.widen(), source.scale),
        Kind::UInt16 => render_wide(source.read_u16()?.widen(), source.scale),
        Kind::UInt32 => render_wide(source.read_u32()?.widen(), source.scale),
        Kind::UInt64 => render_wide(source.read_u64()?.widen(), source.scale),
        Kind::UInt128 => render_wide(source.read_u128()?.widen(), source.scale),
        Kind::Float32 => render_f64(source.read_f32()? as f64, 8, capacity)?,
        Kind::Float64 => render_f64(source.read_f64()?, 16, capacity)?,
        Kind::Dec64 | Kind::Dec128 => source.read_decimal()?.to_string(),
        Kind::Boolean => {
            if source.read_bool()? {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        Kind::Date => format_date_text(source.read_date()?, legacy),
        Kind::Time => format_time_text(source.read_time()?, legacy),
        Kind::Timestamp => format_timestamp_text(source.read_timestamp()?, legacy),
        Kind::TimeTz => {
            let zone = cb.zone_name(source.read_zone()?)?;
            format!("{} {}", format_time_text(source.read_time()?, legacy), zone)
        }
        Kind::TimestampTz => {
            let zone = cb.zone_name(source.read_zone()?)?;
            format!(
                "{} {}",
                format_timestamp_text(source.read_timestamp()?, legacy),
                zone
            )
        }
        Kind::Blob => {
            return Err(Error::UnsupportedConversion {
                from: Kind::Blob,
                to,
            });
        }
    };
    Ok((rendered.into_bytes(), CharsetId::ASCII))
}

/// Fill a text target from any source.
pub(crate) fn to_text_target(
    source: &ValueRef,
    target: &mut ValueMut,
    cb: &dyn Callbacks,
) -> Result<()> {
    let payload_cap = match target.kind {
        Kind::Text => target.capacity(),
        Kind::VarText => target.capacity().checked_sub(2).ok_or_else(|| {
            Error::BadDescriptor("varying text window shorter than its count".into())
        })?,
        Kind::CText => target.capacity().checked_sub(1).ok_or_else(|| {
            Error::BadDescriptor("c-string window has no room for the terminator".into())
        })?,
        other => {
            return Err(Error::BadDescriptor(format!(
                "{} is not a text kind",
                other
            )));
        }
    };

    let (rendered, from_charset) = render_source(source, cb, payload_cap, target.kind)?;
    let data = if from_charset == target.charset {
        cb.validate_bytes(target.charset, &rendered)?;
        rendered
    } else {
        cb.transliterate(from_charset, target.charset, &rendered)?
    };

    let keep = cb.truncate_len(target.charset, &data, payload_cap)?;
    match target.kind {
        Kind::Text => {
            target.bytes[..keep].copy_from_slice(&data[..keep]);
            let pad = target.charset.pad_byte();
            for b in &mut target.bytes[keep..] {
                *b = pad;
            }
        }
        Kind::VarText => {
            target.bytes[..2].copy_from_slice(&(keep as u16).to_le_bytes());
            target.bytes[2..2 + keep].copy_from_slice(&data[..keep]);
        }
        Kind::CText => {
            target.bytes[..keep].copy_from_slice(&data[..keep]);
            target.bytes[keep] = 0;
        }
        _ => unreachable!("guarded above"),
    }
    Ok(())
}

/// Canonical textual rendering of any scalar, mainly for diagnostics.
pub fn get_text(source: &ValueRef, cb: &dyn Callbacks) -> Result<String> {
    let (bytes, _) = render_source(source, cb, DIAG_RENDER_CAP, Kind::VarText)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::SystemCallbacks;

    fn cb() -> SystemCallbacks {
        SystemCallbacks::default()
    }

    #[test]
    fn test_render_wide_scales() {
        assert_eq!(render_wide(Wide::Int(42), 0), "42");
        assert_eq!(render_wide(Wide::Int(-42), 0), "-42");
        assert_eq!(render_wide(Wide::Int(125), -2), "1.25");
        assert_eq!(render_wide(Wide::Int(25), -4), "0.0025");
        assert_eq!(render_wide(Wide::Int(-25), -4), "-0.0025");
        assert_eq!(render_wide(Wide::Int(7), 3), "7000");
        assert_eq!(render_wide(Wide::UInt(u128::MAX), 0), u128::MAX.to_string());
    }

    #[test]
    fn test_render_f64_precision_loop() {
        assert_eq!(render_f64(1.25, 16, 32).unwrap(), "1.25");
        assert_eq!(render_f64(0.0, 16, 32).unwrap(), "0");
        // capacity squeezes significant digits away
        assert_eq!(render_f64(123.456, 16, 5).unwrap(), "123.5");
        assert_eq!(render_f64(123.456, 16, 3).unwrap(), "123");
        // huge magnitudes go scientific
        let s = render_f64(1.5e300, 16, 32).unwrap();
        assert!(s.contains('e'), "{}", s);
        // two significant digits is the floor
        assert!(render_f64(1.5e300, 16, 1).is_err());
    }

    #[test]
    fn test_text_target_pads_fixed() {
        let src = ValueRef::new(Kind::VarText, b"\x02\x00AB").with_charset(CharsetId::ASCII);
        let mut buf = [0xAAu8; 4];
        let mut dst = ValueMut::new(Kind::Text, &mut buf).with_charset(CharsetId::ASCII);
        to_text_target(&src, &mut dst, &cb()).unwrap();
        assert_eq!(&buf, b"AB  ");
    }

    #[test]
    fn test_truncation_legality() {
        // trailing spaces may be dropped
        let src = ValueRef::new(Kind::Text, b"AB  ").with_charset(CharsetId::ASCII);
        let mut buf = [0u8; 2];
        let mut dst = ValueMut::new(Kind::Text, &mut buf).with_charset(CharsetId::ASCII);
        to_text_target(&src, &mut dst, &cb()).unwrap();
        assert_eq!(&buf, b"AB");

        // payload may not
        let src = ValueRef::new(Kind::Text, b"ABC").with_charset(CharsetId::ASCII);
        let mut buf = [0u8; 2];
        let mut dst = ValueMut::new(Kind::Text, &mut buf).with_charset(CharsetId::ASCII);
        assert_eq!(
            to_text_target(&src, &mut dst, &cb()).unwrap_err(),
            Error::StringTruncation {
                source_len: 3,
                dest_len: 2
            }
        );
    }

    #[test]
    fn test_var_text_target() {
        let src = ValueRef::new(Kind::Text, b"hello").with_charset(CharsetId::ASCII);
        let mut buf = [0u8; 10];
        let mut dst = ValueMut::new(Kind::VarText, &mut buf).with_charset(CharsetId::ASCII);
        to_text_target(&src, &mut dst, &cb()).unwrap();
        assert_eq!(&buf[..2], &5u16.to_le_bytes());
        assert_eq!(&buf[2..7], b"hello");
    }

    #[test]
    fn test_c_text_target_terminates() {
        let src = ValueRef::new(Kind::VarText, b"\x02\x00ok").with_charset(CharsetId::ASCII);
        let mut buf = [0xAAu8; 5];
        let mut dst = ValueMut::new(Kind::CText, &mut buf).with_charset(CharsetId::ASCII);
        to_text_target(&src, &mut dst, &cb()).unwrap();
        assert_eq!(&buf[..3], b"ok\0");
    }

    #[test]
    fn test_numeric_to_text() {
        let mut raw = [0u8; 4];
        kestrel_value::encoding::write_i32(&mut raw, 125).unwrap();
        let src = ValueRef::new(Kind::Int32, &raw).with_scale(-2);
        assert_eq!(get_text(&src, &cb()).unwrap(), "1.25");
    }

    #[test]
    fn test_boolean_and_decimal_to_text() {
        let raw = [1u8];
        let src = ValueRef::new(Kind::Boolean, &raw);
        assert_eq!(get_text(&src, &cb()).unwrap(), "TRUE");

        let mut raw = [0u8; 16];
        kestrel_value::encoding::write_decimal(&mut raw, rust_decimal::Decimal::new(-12345, 3))
            .unwrap();
        let src = ValueRef::new(Kind::Dec128, &raw);
        assert_eq!(get_text(&src, &cb()).unwrap(), "-12.345");
    }

    #[test]
    fn test_charset_validation_on_write() {
        let src = ValueRef::new(Kind::Text, &[0xFF, 0xFE][..]).with_charset(CharsetId::BINARY);
        let mut buf = [0u8; 2];
        let mut dst = ValueMut::new(Kind::Text, &mut buf).with_charset(CharsetId::UTF8);
        assert!(matches!(
            to_text_target(&src, &mut dst, &cb()),
            Err(Error::CharsetValidity(_))
        ));
    }

    #[test]
    fn test_widen_helper() {
        assert_eq!(5i16.widen(), Wide::Int(5));
        assert_eq!(5u64.widen(), Wide::UInt(5));
    }
}
