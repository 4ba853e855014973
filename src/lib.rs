//! bash-xtrace - execution traces for a simulated bash environment
//!
//! This library renders parsed command nodes the way bash prints them
//! under `set -x`, given the word evaluator and syntax services of the
//! running interpreter.

pub mod ast;
pub mod interpreter;

pub use ast::types::*;
pub use interpreter::{
    render_trace, trace_command, BashSyntax, LangVariant, ShellOptions, StaticRuntime,
    SyntaxFormatter, TraceSink, TraceSkip, WordEvaluator, XTrace,
};
