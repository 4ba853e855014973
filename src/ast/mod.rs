//! Abstract Syntax Tree (AST) Types for Bash commands
//!
//! Command nodes are built by an external parser and handed to the
//! interpreter one at a time, right before they run.
//!
//! Architecture:
//!   Parser → AST → Interpreter → xtrace renderer → Trace sink

pub mod types;
