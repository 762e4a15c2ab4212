//! Error type for the value crate

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("numeric value does not fit the target width")]
    Overflow,

    #[error("division by zero")]
    DivideByZero,

    #[error("malformed raw value: {0}")]
    Storage(String),
}
