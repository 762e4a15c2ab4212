//! Numeric literal decomposition
//!
//! Parses the engine's numeric literal grammar into an integer in the
//! caller's width plus an inferred power-of-ten scale. Accumulation is
//! guarded digit by digit against the width's upper-limit-divided-by-ten
//! threshold, so overflow fires on exactly the digit that crosses it — the
//! last safe digit differs by one between positive and negative values.
//!
//! A `0x`/`0X` prefix switches to hex-literal mode: digits pack big-endian
//! into the target width's raw bits with no decimal scale, and literals
//! shorter than the width stay zero-extended rather than sign-extended.

use crate::error::{Error, Result, printable};
use kestrel_value::ScaledInt;

/// Exponents past this point cannot name a representable exact numeric.
const EXPONENT_LIMIT: i64 = 100_000;

pub(crate) enum Literal {
    Hex { bits: u128 },
    Dec {
        negative: bool,
        digits: Vec<u8>,
        scale: i32,
    },
}

/// Lex a numeric literal without committing to a width.
pub(crate) fn scan(raw: &str) -> Result<Literal> {
    let malformed = || Error::MalformedLiteral(printable(raw));
    let text = raw.trim_matches(|c: char| c.is_ascii_whitespace());
    let bytes = text.as_bytes();
    let mut i = 0;

    let mut negative = false;
    match bytes.first() {
        Some(b'+') => i += 1,
        Some(b'-') => {
            negative = true;
            i += 1;
        }
        _ => {}
    }

    if bytes[i..].starts_with(b"0x") || bytes[i..].starts_with(b"0X") {
        // the sign is not part of the hex grammar
        if i > 0 {
            return Err(malformed());
        }
        return scan_hex(&bytes[2..], malformed);
    }

    let mut digits = Vec::new();
    let mut fraction_digits = 0i32;
    let mut seen_point = false;
    let mut seen_digit = false;

    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => {
                digits.push(bytes[i] - b'0');
                if seen_point {
                    fraction_digits += 1;
                }
                seen_digit = true;
            }
            b'.' if !seen_point => seen_point = true,
            b'e' | b'E' if seen_digit => break,
            _ => return Err(malformed()),
        }
        i += 1;
    }
    if !seen_digit {
        return Err(malformed());
    }

    let mut exponent = 0i64;
    if i < bytes.len() {
        // at the exponent marker
        i += 1;
        let mut exp_negative = false;
        match bytes.get(i) {
            Some(b'+') => i += 1,
            Some(b'-') => {
                exp_negative = true;
                i += 1;
            }
            _ => {}
        }
        let mut exp_digits = 0;
        while let Some(&b) = bytes.get(i) {
            if !b.is_ascii_digit() {
                break;
            }
            exponent = (exponent * 10 + (b - b'0') as i64).min(EXPONENT_LIMIT);
            exp_digits += 1;
            i += 1;
        }
        if exp_digits == 0 || i != bytes.len() {
            return Err(malformed());
        }
        if exp_negative {
            exponent = -exponent;
        }
    }

    Ok(Literal::Dec {
        negative,
        digits,
        scale: exponent as i32 - fraction_digits,
    })
}

fn scan_hex(digits: &[u8], malformed: impl Fn() -> Error) -> Result<Literal> {
    if digits.is_empty() {
        return Err(malformed());
    }
    if digits.len() > 32 {
        return Err(Error::NumericOverflow("hex literal"));
    }
    let mut bits = 0u128;
    for &b in digits {
        let nibble = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => return Err(malformed()),
        };
        bits = (bits << 4) | nibble as u128;
    }
    Ok(Literal::Hex { bits })
}

/// Decompose a numeric literal into an integer of width `T` plus the scale
/// implied by its decimal point and exponent.
pub fn decompose<T: ScaledInt>(text: &str) -> Result<(T, i32)> {
    match scan(text)? {
        Literal::Hex { bits } => {
            if bits > T::HEX_LIMIT {
                return Err(Error::NumericOverflow(T::NAME));
            }
            Ok((T::from_hex_bits(bits), 0))
        }
        Literal::Dec {
            negative,
            digits,
            scale,
        } => {
            let limit = if negative { T::NEG_LIMIT } else { T::POS_LIMIT };
            let cap = limit / 10;
            let last_safe = (limit % 10) as u8;
            let mut magnitude = 0u128;
            for &d in &digits {
                if magnitude > cap || (magnitude == cap && d > last_safe) {
                    return Err(Error::NumericOverflow(T::NAME));
                }
                magnitude = magnitude * 10 + d as u128;
            }
            let value =
                T::from_magnitude(magnitude, negative).ok_or(Error::NumericOverflow(T::NAME))?;
            Ok((value, scale))
        }
    }
}

/// Decompose a numeric literal in the floating domain. Digits accumulate in
/// a double, so no fixed-width limit applies until the final magnitude
/// check; hex literals take their 64-bit integer reading.
pub fn decompose_f64(text: &str) -> Result<f64> {
    match scan(text)? {
        Literal::Hex { bits } => {
            if bits > u64::MAX as u128 {
                return Err(Error::NumericOverflow("DOUBLE PRECISION"));
            }
            Ok((bits as u64 as i64) as f64)
        }
        Literal::Dec {
            negative,
            digits,
            scale,
        } => {
            let mut acc = 0f64;
            for &d in &digits {
                acc = acc * 10.0 + d as f64;
            }
            let value = acc * 10f64.powi(scale);
            if !value.is_finite() {
                return Err(Error::NumericOverflow("DOUBLE PRECISION"));
            }
            Ok(if negative { -value } else { value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_integers() {
        assert_eq!(decompose::<i32>("42").unwrap(), (42, 0));
        assert_eq!(decompose::<i32>("  -17 ").unwrap(), (-17, 0));
        assert_eq!(decompose::<i32>("+0").unwrap(), (0, 0));
        assert_eq!(decompose::<u64>("18446744073709551615").unwrap(), (u64::MAX, 0));
    }

    #[test]
    fn test_fraction_and_exponent_scale() {
        assert_eq!(decompose::<i64>("1.25").unwrap(), (125, -2));
        assert_eq!(decompose::<i64>(".5").unwrap(), (5, -1));
        assert_eq!(decompose::<i64>("1e3").unwrap(), (1, 3));
        assert_eq!(decompose::<i64>("2.5E-3").unwrap(), (25, -4));
        assert_eq!(decompose::<i64>("12.").unwrap(), (12, 0));
    }

    #[test]
    fn test_signed_overflow_boundary() {
        assert_eq!(decompose::<i32>("2147483647").unwrap(), (i32::MAX, 0));
        assert!(matches!(
            decompose::<i32>("2147483648"),
            Err(Error::NumericOverflow("INTEGER"))
        ));
        assert_eq!(decompose::<i32>("-2147483648").unwrap(), (i32::MIN, 0));
        assert!(matches!(
            decompose::<i32>("-2147483649"),
            Err(Error::NumericOverflow("INTEGER"))
        ));
    }

    #[test]
    fn test_unsigned_rejects_negative() {
        assert!(decompose::<u32>("-1").is_err());
        assert_eq!(decompose::<u32>("-0").unwrap(), (0, 0));
        assert!(decompose::<u32>("4294967296").is_err());
    }

    #[test]
    fn test_leading_zeros_do_not_overflow() {
        let long = format!("{}{}", "0".repeat(60), "7");
        assert_eq!(decompose::<i16>(&long).unwrap(), (7, 0));
    }

    #[test]
    fn test_hex_truncation_policy() {
        // 8 hex digits: two's complement in a 32-bit width...
        assert_eq!(decompose::<i32>("0xFFFFFFFF").unwrap(), (-1, 0));
        // ...but zero-extended into a 64-bit width
        assert_eq!(decompose::<i64>("0xFFFFFFFF").unwrap(), (4294967295, 0));
        assert_eq!(decompose::<i64>("0xFFFFFFFFFFFFFFFF").unwrap(), (-1, 0));
        assert_eq!(decompose::<i16>("0x8000").unwrap(), (i16::MIN, 0));
        assert_eq!(decompose::<u32>("0xDEADBEEF").unwrap(), (0xDEADBEEF, 0));
        // literal wider than the target's raw bits
        assert!(decompose::<i32>("0x1FFFFFFFF").is_err());
        // value-based fit: leading zeros keep it inside the width
        assert_eq!(decompose::<i32>("0x000000001").unwrap(), (1, 0));
    }

    #[test]
    fn test_malformed_literals() {
        for bad in ["", "  ", "abc", "1.2.3", "--5", "1e", "0x", "0xZZ", "+", "5-2", "1 2"] {
            assert!(
                matches!(decompose::<i64>(bad), Err(Error::MalformedLiteral(_))),
                "expected malformed: {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_decompose_f64() {
        assert_eq!(decompose_f64("1.25").unwrap(), 1.25);
        assert_eq!(decompose_f64("-2e2").unwrap(), -200.0);
        assert_eq!(decompose_f64("0x10").unwrap(), 16.0);
        assert!(decompose_f64("1e999").is_err());
        assert!(decompose_f64("12,5").is_err());
    }
}
