//! Interpreter Errors
//!
//! Error types shared by the trace renderer and its collaborators:
//! - QuoteError: a string cannot be quoted in the requested dialect
//! - ArithmeticError: arithmetic evaluation failed
//! - TraceSkip: why no trace line was produced for a command
//!
//! None of these abort command execution. A TraceSkip only means the
//! trace line for one command is dropped.

use thiserror::Error;

/// Message for strings containing a NUL character
pub const QUOTE_ERR_NULL: &str = "shell strings cannot contain null bytes";

/// Message for non-printable characters in the POSIX dialect
pub const QUOTE_ERR_NOT_PRINTABLE: &str =
    "POSIX shell lacks escape sequences for non-printable characters";

/// Error returned when a string cannot be safely quoted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot quote character at byte {byte_offset}: {message}")]
pub struct QuoteError {
    pub byte_offset: usize,
    pub message: &'static str,
}

impl QuoteError {
    pub fn new(byte_offset: usize, message: &'static str) -> Self {
        Self { byte_offset, message }
    }
}

/// Error raised while evaluating an arithmetic expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("division by 0")]
    DivisionByZero,

    #[error("exponent less than 0")]
    NegativeExponent,

    #[error("{token}: value too great for base")]
    InvalidNumber { token: String },

    #[error("{token}: attempted assignment to non-variable")]
    NotAssignable { token: String },
}

/// Reason a command produced no trace line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceSkip {
    #[error("xtrace is disabled")]
    Disabled,

    #[error("{0} commands are not traced")]
    UnsupportedCommand(&'static str),

    #[error("cannot trace assignment to {name}: {part} values are not supported")]
    UnsupportedWordPart { name: String, part: &'static str },

    #[error("c-style for loops are not traced")]
    CStyleLoop,

    #[error("for loop without an 'in' keyword")]
    MissingIn,

    #[error(transparent)]
    Quote(#[from] QuoteError),
}
