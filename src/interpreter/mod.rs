//! Interpreter module
//!
//! This module contains the pieces of the bash interpreter that produce
//! xtrace output: the renderer and the collaborators it depends on.

pub mod arithmetic;
pub mod errors;
pub mod helpers;
pub mod printer;
pub mod runtime;
pub mod types;

pub use arithmetic::*;
pub use errors::*;
pub use helpers::*;
pub use printer::{print, to_source, Printable};
pub use runtime::*;
pub use types::*;
