//! Kestrel convert - the universal value conversion and coercion engine
//!
//! Converts any supported scalar value into any other supported kind,
//! enforcing the engine's numeric semantics (scale, overflow, rounding,
//! truncation) uniformly wherever it runs. The same code serves the
//! embedded engine and standalone tools; everything environment-sensitive
//! goes through the [`Callbacks`] capability trait.
//!
//! Entry points:
//! - [`convert`] fills a target descriptor from a source descriptor
//! - the `get_*` accessors return native values directly
//! - [`decompose`] exposes the numeric literal grammar to probing callers

mod callbacks;
mod convert;
mod datetime;
mod decompose;
mod error;

pub use callbacks::{Callbacks, SessionCallbacks, SystemCallbacks};
pub use convert::{
    convert, get_boolean, get_date, get_decimal, get_decimal64, get_decimal128, get_f64, get_i16,
    get_i32, get_i64, get_i128, get_text, get_time, get_timestamp, get_u16, get_u32, get_u64,
    get_u128,
};
pub use datetime::{Expect, Moment, parse_moment};
pub use decompose::{decompose, decompose_f64};
pub use error::{Error, Result};
