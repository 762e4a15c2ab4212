//! The conversion dispatcher
//!
//! `convert` is the one place that sees both descriptors. It routes on the
//! target kind; every converter it calls sees one source descriptor plus
//! primitive parameters. Identical shapes take a raw byte copy instead.

use crate::callbacks::Callbacks;
use crate::error::{Error, Result};
use kestrel_value::{Kind, ValueMut, ValueRef};
use tracing::{debug, trace};

mod numeric;
mod string;
mod temporal;


pub use numeric::{
    get_boolean, get_decimal, get_decimal64, get_decimal128, get_f64, get_i16, get_i32, get_i64,
    get_i128, get_u16, get_u32, get_u64, get_u128,
};
pub use string::get_text;
pub use temporal::{get_date, get_time, get_timestamp};

/// Convert `source` into the shape `target` describes, writing the result
/// over `target`'s bytes.
///
/// `trusted` marks a source already known to respect its own invariants
/// (for example a value re-read from validated storage); it lets
/// identically-shaped text skip length validation and take the byte-copy
/// fast path.
pub fn convert(
    source: &ValueRef,
    target: &mut ValueMut,
    cb: &dyn Callbacks,
    trusted: bool,
) -> Result<()> {
    trace!(from = %source.kind, to = %target.kind, "convert");

    let same_shape = source.kind == target.kind
        && source.scale == target.scale
        && source.charset == target.charset
        && source.bytes.len() == target.bytes.len();
    if same_shape && (trusted || !source.kind.is_text()) {
        target.bytes.copy_from_slice(source.bytes);
        return Ok(());
    }

    match target.kind {
        Kind::Int16 => {
            let v = get_i16(source, target.scale as i32, cb)?;
            target.write_i16(v)?;
        }
        Kind::Int32 => {
            let v = get_i32(source, target.scale as i32, cb)?;
            target.write_i32(v)?;
        }
        Kind::Int64 => {
            let v = get_i64(source, target.scale as i32, cb)?;
            target.write_i64(v)?;
        }
        Kind::Int128 => {
            let v = get_i128(source, target.scale as i32, cb)?;
            target.write_i128(v)?;
        }
        Kind::UInt16 => {
            let v = get_u16(source, target.scale as i32, cb)?;
            target.write_u16(v)?;
        }
        Kind::UInt32 => {
            let v = get_u32(source, target.scale as i32, cb)?;
            target.write_u32(v)?;
        }
        Kind::UInt64 => {
            let v = get_u64(source, target.scale as i32, cb)?;
            target.write_u64(v)?;
        }
        Kind::UInt128 => {
            let v = get_u128(source, target.scale as i32, cb)?;
            target.write_u128(v)?;
        }
        Kind::Float32 => {
            let v = get_f64(source, cb)?;
            if v.abs() > f32::MAX as f64 {
                return Err(Error::NumericOverflow("FLOAT"));
            }
            target.write_f32(v as f32)?;
        }
        Kind::Float64 => {
            let v = get_f64(source, cb)?;
            target.write_f64(v)?;
        }
        Kind::Dec64 => {
            let d = get_decimal64(source, cb)?;
            target.write_decimal(d)?;
        }
        Kind::Dec128 => {
            let d = get_decimal128(source, cb)?;
            target.write_decimal(d)?;
        }
        Kind::Boolean => {
            let b = get_boolean(source, cb)?;
            target.write_bool(b)?;
        }
        Kind::Text | Kind::VarText | Kind::CText => {
            string::to_text_target(source, target, cb)?;
        }
        Kind::Date => {
            let d = get_date(source, cb)?;
            target.write_date(d)?;
        }
        Kind::Time => {
            let t = get_time(source, cb)?;
            target.write_time(t, None)?;
        }
        Kind::TimeTz => {
            let z = temporal::get_time_zoned(source, cb)?;
            let zone = z.zone.unwrap_or_else(|| cb.session_zone());
            target.write_time(z.time, Some(zone))?;
        }
        Kind::Timestamp => {
            let ts = get_timestamp(source, cb)?;
            target.write_timestamp(ts, None)?;
        }
        Kind::TimestampTz => {
            let z = temporal::get_timestamp_zoned(source, cb)?;
            let zone = z.zone.unwrap_or_else(|| cb.session_zone());
            target.write_timestamp(z.datetime, Some(zone))?;
        }
        Kind::Blob => {
            // blob ids move between blob slots; anything else is a caller
            // defect, not a data problem
            if source.kind == Kind::Blob && source.bytes.len() == target.bytes.len() {
                target.bytes.copy_from_slice(source.bytes);
            } else {
                debug!(from = %source.kind, "structurally impossible blob conversion");
                return Err(Error::UnsupportedConversion {
                    from: source.kind,
                    to: Kind::Blob,
                });
            }
        }
    }
    Ok(())
}
