//! Interpreter helpers
//!
//! Quoting and xtrace rendering.

pub mod quoting;
pub mod xtrace;

pub use quoting::*;
pub use xtrace::*;
