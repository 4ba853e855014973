//! Runtime collaborators of the trace renderer
//!
//! The renderer never evaluates words itself. It asks a `WordEvaluator`
//! for fields, literal text and arithmetic results, a `SyntaxFormatter`
//! for quoting and verbatim printing, and hands the finished line to a
//! `TraceSink`.
//!
//! `StaticRuntime` and `BashSyntax` are the default implementations, used
//! by the command-line tool. An execution engine plugs in its own
//! evaluator instead.

use std::collections::HashMap;
use std::io::Write;

use crate::ast::types::*;
use crate::interpreter::arithmetic::{evaluate_arithmetic, is_valid_name, parse_arith_number, ArithContext};
use crate::interpreter::errors::QuoteError;
use crate::interpreter::helpers::quoting::{quote, LangVariant};
use crate::interpreter::printer::{self, Printable};

/// Default IFS value
pub const DEFAULT_IFS: &str = " \t\n";

/// Word evaluation provided by the execution engine
pub trait WordEvaluator {
    /// Expand words into fields (splitting applied)
    fn fields(&mut self, words: &[WordNode]) -> Vec<String>;
    /// Best-effort plain text of a word, without splitting
    fn literal(&mut self, word: &WordNode) -> String;
    /// Numeric value of an arithmetic word
    fn arithm(&mut self, word: &WordNode) -> i64;
}

/// Quoting and verbatim printing
pub trait SyntaxFormatter {
    fn quote(&self, s: &str, lang: LangVariant) -> Result<String, QuoteError>;
    fn print(&self, out: &mut String, node: Printable<'_>);
}

/// Destination for finished trace lines
pub trait TraceSink {
    fn write(&mut self, text: &str);
}

impl TraceSink for String {
    fn write(&mut self, text: &str) {
        self.push_str(text);
    }
}

impl TraceSink for Vec<String> {
    fn write(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

impl TraceSink for std::io::Stdout {
    fn write(&mut self, text: &str) {
        // A failed trace write must not disturb the traced command
        let _ = self.lock().write_all(text.as_bytes());
    }
}

// ============================================================================
// BashSyntax
// ============================================================================

/// Quoting and printing following bash's own grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct BashSyntax;

impl SyntaxFormatter for BashSyntax {
    fn quote(&self, s: &str, lang: LangVariant) -> Result<String, QuoteError> {
        quote(s, lang)
    }

    fn print(&self, out: &mut String, node: Printable<'_>) {
        printer::print(out, node);
    }
}

// ============================================================================
// StaticRuntime
// ============================================================================

/// Expanded piece of a word, before field splitting
#[derive(Debug, Clone)]
struct Segment {
    value: String,
    /// Result of an unquoted expansion, subject to IFS splitting
    splittable: bool,
    /// Quoted text anchors a field even when empty
    quoted: bool,
}

/// Word evaluator over a fixed set of variables.
///
/// Parameter expansions read from the variable map, arithmetic is
/// evaluated (assignments update the map), and unquoted expansion results
/// are split on IFS. Command and process substitutions expand to nothing;
/// globs and brace expansions are left as written.
#[derive(Debug, Clone, Default)]
pub struct StaticRuntime {
    vars: HashMap<String, String>,
}

impl StaticRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get_var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    fn ifs(&self) -> String {
        self.vars
            .get("IFS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_IFS.to_string())
    }

    fn expand_parameter(&mut self, exp: &ParameterExpansionPart) -> String {
        let current = self.vars.get(&exp.parameter).cloned();
        if exp.length {
            return current.map(|v| v.chars().count()).unwrap_or(0).to_string();
        }
        let Some(op) = &exp.operation else {
            return current.unwrap_or_default();
        };
        let is_set = current.is_some();
        let is_null = current.as_deref().map_or(true, str::is_empty);
        match op.operator {
            ParameterOperator::DefaultValue if is_null => self.literal(&op.word),
            ParameterOperator::DefaultValueUnset if !is_set => self.literal(&op.word),
            ParameterOperator::AssignDefault if is_null => self.assign_default(exp, op),
            ParameterOperator::AssignDefaultUnset if !is_set => self.assign_default(exp, op),
            ParameterOperator::UseAlternative => {
                if is_null { String::new() } else { self.literal(&op.word) }
            }
            ParameterOperator::UseAlternativeUnset => {
                if is_set { self.literal(&op.word) } else { String::new() }
            }
            ParameterOperator::ErrorIfUnset | ParameterOperator::ErrorIfUnsetOnly => {
                if current.is_none() {
                    tracing::debug!(target: "xtrace", parameter = %exp.parameter, "parameter not set");
                }
                current.unwrap_or_default()
            }
            ParameterOperator::RemoveShortestPrefix | ParameterOperator::RemoveLongestPrefix => {
                let pattern = self.literal(&op.word);
                let value = current.unwrap_or_default();
                value.strip_prefix(pattern.as_str()).map(str::to_string).unwrap_or(value)
            }
            ParameterOperator::RemoveShortestSuffix | ParameterOperator::RemoveLongestSuffix => {
                let pattern = self.literal(&op.word);
                let value = current.unwrap_or_default();
                value.strip_suffix(pattern.as_str()).map(str::to_string).unwrap_or(value)
            }
            _ => current.unwrap_or_default(),
        }
    }

    fn assign_default(&mut self, exp: &ParameterExpansionPart, op: &ParameterOperation) -> String {
        let value = self.literal(&op.word);
        if is_valid_name(&exp.parameter) {
            self.vars.insert(exp.parameter.clone(), value.clone());
        }
        value
    }

    fn expand_parts(&mut self, parts: &[WordPart], in_quotes: bool, segments: &mut Vec<Segment>) {
        for part in parts {
            match part {
                WordPart::Literal(LiteralPart { value }) => segments.push(Segment {
                    value: value.clone(),
                    splittable: false,
                    quoted: in_quotes,
                }),
                WordPart::SingleQuoted(SingleQuotedPart { value, .. }) => segments.push(Segment {
                    value: value.clone(),
                    splittable: false,
                    quoted: true,
                }),
                WordPart::DoubleQuoted(DoubleQuotedPart { parts, .. }) => {
                    // "" still produces an empty field
                    segments.push(Segment { value: String::new(), splittable: false, quoted: true });
                    self.expand_parts(parts, true, segments);
                }
                WordPart::ParameterExpansion(exp) => {
                    let value = self.expand_parameter(exp);
                    segments.push(Segment { value, splittable: !in_quotes, quoted: in_quotes });
                }
                WordPart::ArithmeticExpansion(ArithmeticExpansionPart { expression }) => {
                    let value = self.eval(expression).to_string();
                    segments.push(Segment { value, splittable: !in_quotes, quoted: in_quotes });
                }
                WordPart::CommandSubstitution(_) | WordPart::ProcessSubstitution(_) => {
                    segments.push(Segment { value: String::new(), splittable: !in_quotes, quoted: in_quotes });
                }
                WordPart::ExtendedGlob(_) | WordPart::BraceExpansion(_) => {
                    let mut value = String::new();
                    printer::print_word(&mut value, &WordNode { parts: vec![part.clone()] });
                    segments.push(Segment { value, splittable: false, quoted: in_quotes });
                }
            }
        }
    }

    fn eval(&mut self, expr: &ArithExpr) -> i64 {
        match evaluate_arithmetic(self, expr) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(target: "xtrace", error = %err, "arithmetic evaluation failed");
                0
            }
        }
    }
}

/// Split expanded segments into fields. Only splittable segments break
/// fields; quoted and literal text joins the field it touches.
fn split_segments(segments: &[Segment], ifs: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut anchored = false;

    for segment in segments {
        if !segment.splittable {
            current.push_str(&segment.value);
            anchored |= segment.quoted || !segment.value.is_empty();
            continue;
        }
        for c in segment.value.chars() {
            if ifs.contains(c) {
                if anchored || !current.is_empty() {
                    fields.push(std::mem::take(&mut current));
                }
                anchored = false;
            } else {
                current.push(c);
                anchored = true;
            }
        }
    }
    if anchored || !current.is_empty() {
        fields.push(current);
    }
    fields
}

impl ArithContext for StaticRuntime {
    fn word_text(&mut self, word: &WordNode) -> String {
        self.literal(word)
    }

    fn get_var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn set_var(&mut self, name: &str, value: String) {
        self.vars.insert(name.to_string(), value);
    }
}

impl WordEvaluator for StaticRuntime {
    fn fields(&mut self, words: &[WordNode]) -> Vec<String> {
        let ifs = self.ifs();
        let mut fields = Vec::new();
        for word in words {
            let mut segments = Vec::new();
            self.expand_parts(&word.parts, false, &mut segments);
            fields.extend(split_segments(&segments, &ifs));
        }
        fields
    }

    fn literal(&mut self, word: &WordNode) -> String {
        let mut segments = Vec::new();
        self.expand_parts(&word.parts, false, &mut segments);
        segments.into_iter().map(|s| s.value).collect()
    }

    fn arithm(&mut self, word: &WordNode) -> i64 {
        if let [WordPart::ArithmeticExpansion(ArithmeticExpansionPart { expression })] = word.parts.as_slice() {
            return self.eval(expression);
        }
        let text = self.literal(word);
        parse_arith_number(text.trim()).unwrap_or(0)
    }
}
