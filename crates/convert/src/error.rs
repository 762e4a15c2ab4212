//! Error taxonomy for the conversion engine
//!
//! Every failure the engine can produce is one of these kinds; call sites
//! that probe a conversion speculatively match on the variant and retry
//! with a different target kind.

use kestrel_value::{CharsetId, Kind};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("numeric value out of range for {0}")]
    NumericOverflow(&'static str),

    #[error("division by zero")]
    ZeroDivide,

    #[error("string right truncation: {source_len} bytes do not fit in {dest_len}")]
    StringTruncation { source_len: usize, dest_len: usize },

    #[error("malformed literal '{0}'")]
    MalformedLiteral(String),

    /// A structurally impossible kind pair. This is a caller defect, not a
    /// data problem; it is never raised for values that merely fail to fit.
    #[error("conversion from {from} to {to} is not supported")]
    UnsupportedConversion { from: Kind, to: Kind },

    #[error("'{0}' is not a valid calendar value")]
    CalendarValidity(String),

    #[error("malformed {0} byte sequence")]
    CharsetValidity(CharsetId),

    /// Raw bytes do not match the shape their descriptor declares; like
    /// `UnsupportedConversion`, a defect of the call site.
    #[error("descriptor does not match its declared kind: {0}")]
    BadDescriptor(String),
}

impl From<kestrel_value::Error> for Error {
    fn from(e: kestrel_value::Error) -> Self {
        match e {
            kestrel_value::Error::Overflow => Error::NumericOverflow("numeric"),
            kestrel_value::Error::DivideByZero => Error::ZeroDivide,
            kestrel_value::Error::Storage(msg) => Error::BadDescriptor(msg),
        }
    }
}

const DIAG_TEXT_MAX: usize = 64;

/// Render offending input for a diagnostic: non-printable characters are
/// escaped and overlong input is cut short.
pub(crate) fn printable(text: &str) -> String {
    let mut out = String::new();
    for c in text.chars() {
        if out.len() >= DIAG_TEXT_MAX {
            out.push_str("...");
            break;
        }
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_escapes_controls() {
        assert_eq!(printable("abc"), "abc");
        assert_eq!(printable("a\x01b"), "a\\u{1}b");
        assert!(printable(&"x".repeat(100)).ends_with("..."));
    }

    #[test]
    fn test_value_error_mapping() {
        let e: Error = kestrel_value::Error::DivideByZero.into();
        assert_eq!(e, Error::ZeroDivide);
        let e: Error = kestrel_value::Error::Overflow.into();
        assert!(matches!(e, Error::NumericOverflow(_)));
    }
}
