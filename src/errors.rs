use std::fmt::Display;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by parsing and by container constructors.
///
/// Every fallible operation returns one of these instead of reporting
/// through a process-wide sink; diagnostics embed the offending input
/// fragment or the type names involved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed text input: bad token, unexpected end of input,
    /// mismatched delimiters, unknown prefix.
    #[error("{0}")]
    InvalidInputText(String),
    /// Mixing containers or operands of incompatible types.
    #[error("{0}")]
    InvalidArgType(String),
    /// A well-typed argument with an inadmissible value (empty span,
    /// reversed bounds, non-increasing elements, non-positive width, …).
    #[error("{0}")]
    InvalidArgValue(String),
    /// A catalog lookup failed; reachable only through tag misuse.
    #[error("{0}")]
    InternalTypeError(String),
}

impl Error {
    /// "Could not parse <type> value: <detail>"
    pub(crate) fn parse(type_name: &str, detail: impl Display) -> Self {
        Error::InvalidInputText(format!("Could not parse {type_name} value: {detail}"))
    }

    pub(crate) fn text(detail: impl Display) -> Self {
        Error::InvalidInputText(detail.to_string())
    }

    pub(crate) fn arg_type(detail: impl Display) -> Self {
        Error::InvalidArgType(detail.to_string())
    }

    pub(crate) fn arg_value(detail: impl Display) -> Self {
        Error::InvalidArgValue(detail.to_string())
    }

    pub(crate) fn internal(detail: impl Display) -> Self {
        Error::InternalTypeError(detail.to_string())
    }
}
