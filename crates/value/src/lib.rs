//! Kestrel value - scalar vocabulary shared across kestrel engine components
//!
//! This crate defines:
//! - The closed set of scalar kinds and their qualifying tags (charset,
//!   time zone, decimal scale)
//! - Borrowed descriptors over caller-owned record bytes
//! - The raw byte layout of every kind
//! - Checked scaled-integer arithmetic, including the 128-bit widths
//!
//! Nothing here touches session state; the conversion engine layers policy
//! on top of this vocabulary.

pub mod descriptor;
pub mod encoding;
pub mod error;
pub mod scaled;
pub mod types;

pub use descriptor::{ValueMut, ValueRef};
pub use error::{Error, Result};
pub use scaled::{ScaledInt, Wide, decimal_digits, set_scale};
pub use types::{CharsetId, Kind, ZoneId};
