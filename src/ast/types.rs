//! Abstract Syntax Tree (AST) Types for traced commands
//!
//! This module defines the command nodes an execution engine hands to the
//! xtrace renderer. Every node kind the shell grammar can produce at the
//! command level has its own variant, so callers must decide explicitly
//! whether a kind is traced.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// BASE TYPES
// =============================================================================

/// Position information of a keyword in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Union of all command types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CommandNode {
    Call(CallNode),
    For(ForNode),
    Case(CaseNode),
    Let(LetNode),
    If(IfNode),
    While(WhileNode),
    ArithmeticCommand(ArithmeticCommandNode),
    Test(TestNode),
    Declaration(DeclarationNode),
    Time(TimeNode),
    Subshell(SubshellNode),
    Group(GroupNode),
    FunctionDef(FunctionDefNode),
    Binary(BinaryCommandNode),
}

impl CommandNode {
    /// Short name of the node kind, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Call(_) => "call",
            Self::For(_) => "for",
            Self::Case(_) => "case",
            Self::Let(_) => "let",
            Self::If(_) => "if",
            Self::While(_) => "while",
            Self::ArithmeticCommand(_) => "arithmetic command",
            Self::Test(_) => "test",
            Self::Declaration(_) => "declaration",
            Self::Time(_) => "time",
            Self::Subshell(_) => "subshell",
            Self::Group(_) => "group",
            Self::FunctionDef(_) => "function definition",
            Self::Binary(_) => "binary command",
        }
    }
}

/// Simple command: VAR=value name args...
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallNode {
    /// Variable assignments before command: VAR=value cmd
    #[serde(default)]
    pub assignments: Vec<AssignmentNode>,
    /// Command name followed by its arguments (empty for assignment-only)
    #[serde(default)]
    pub args: Vec<WordNode>,
}

// =============================================================================
// CONTROL FLOW
// =============================================================================

/// for/select loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForNode {
    /// `select` instead of `for`
    #[serde(default)]
    pub select: bool,
    pub iteration: ForIteration,
    #[serde(default)]
    pub body: Vec<CommandNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ForIteration {
    /// for VAR in WORDS
    Words(WordIterationNode),
    /// for ((init; cond; step))
    CStyle(CStyleLoopNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordIterationNode {
    pub variable: String,
    /// Position of the `in` keyword (None when omitted, iterating "$@")
    #[serde(default)]
    pub in_pos: Option<Position>,
    #[serde(default)]
    pub items: Vec<WordNode>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CStyleLoopNode {
    #[serde(default)]
    pub init: Option<ArithExpr>,
    #[serde(default)]
    pub condition: Option<ArithExpr>,
    #[serde(default)]
    pub update: Option<ArithExpr>,
}

/// case statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseNode {
    pub word: WordNode,
    #[serde(default)]
    pub items: Vec<CaseItemNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseItemNode {
    pub patterns: Vec<WordNode>,
    #[serde(default)]
    pub body: Vec<CommandNode>,
    #[serde(default)]
    pub terminator: CaseTerminator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaseTerminator {
    #[default]
    DoubleSemi,     // ;;
    SemiAnd,        // ;&
    SemiSemiAnd,    // ;;&
}

impl fmt::Display for CaseTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DoubleSemi => write!(f, ";;"),
            Self::SemiAnd => write!(f, ";&"),
            Self::SemiSemiAnd => write!(f, ";;&"),
        }
    }
}

/// let EXPR...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetNode {
    pub expressions: Vec<ArithExpr>,
}

/// if statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfNode {
    pub clauses: Vec<IfClause>,
    #[serde(default)]
    pub else_body: Option<Vec<CommandNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfClause {
    pub condition: Vec<CommandNode>,
    pub body: Vec<CommandNode>,
}

/// while/until loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileNode {
    #[serde(default)]
    pub until: bool,
    pub condition: Vec<CommandNode>,
    pub body: Vec<CommandNode>,
}

/// Arithmetic command: ((expr))
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticCommandNode {
    pub expression: ArithExpr,
}

/// Test clause: [[ words ]]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestNode {
    pub words: Vec<WordNode>,
}

/// declare/local/export/readonly/typeset/nameref
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationNode {
    pub variant: String,
    #[serde(default)]
    pub args: Vec<AssignmentNode>,
}

/// time [-p] command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeNode {
    #[serde(default)]
    pub posix: bool,
    #[serde(default)]
    pub command: Option<Box<CommandNode>>,
}

/// Subshell: ( ... )
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubshellNode {
    pub body: Vec<CommandNode>,
}

/// Command group: { ...; }
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNode {
    pub body: Vec<CommandNode>,
}

/// Function definition: name() { ... }
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefNode {
    pub name: String,
    pub body: Box<CommandNode>,
}

/// Two commands joined by &&, ||, | or |&
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryCommandNode {
    pub operator: BinaryCommandOperator,
    pub left: Box<CommandNode>,
    pub right: Box<CommandNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryCommandOperator {
    And,        // &&
    Or,         // ||
    Pipe,       // |
    PipeAll,    // |&
}

impl fmt::Display for BinaryCommandOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
            Self::Pipe => write!(f, "|"),
            Self::PipeAll => write!(f, "|&"),
        }
    }
}

// =============================================================================
// ASSIGNMENTS
// =============================================================================

/// Variable assignment: VAR=value or VAR+=value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentNode {
    pub name: String,
    #[serde(default)]
    pub value: Option<WordNode>,
    /// Append mode: VAR+=value
    #[serde(default)]
    pub append: bool,
    /// Array assignment: VAR=(a b c)
    #[serde(default)]
    pub array: Option<Vec<WordNode>>,
    /// Name without `=`, as in `declare VAR`
    #[serde(default)]
    pub naked: bool,
}

// =============================================================================
// WORDS
// =============================================================================

/// A Word is a sequence of parts that form a single shell word.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WordNode {
    pub parts: Vec<WordPart>,
}

impl WordNode {
    /// The word's text when it is a single plain literal, otherwise "".
    pub fn lit(&self) -> &str {
        match self.parts.as_slice() {
            [WordPart::Literal(LiteralPart { value })] => value,
            _ => "",
        }
    }
}

/// Parts that can make up a word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WordPart {
    Literal(LiteralPart),
    SingleQuoted(SingleQuotedPart),
    DoubleQuoted(DoubleQuotedPart),
    ParameterExpansion(ParameterExpansionPart),
    CommandSubstitution(CommandSubstitutionPart),
    ArithmeticExpansion(ArithmeticExpansionPart),
    ProcessSubstitution(ProcessSubstitutionPart),
    ExtendedGlob(ExtendedGlobPart),
    BraceExpansion(BraceExpansionPart),
}

impl WordPart {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::SingleQuoted(_) => "single-quoted string",
            Self::DoubleQuoted(_) => "double-quoted string",
            Self::ParameterExpansion(_) => "parameter expansion",
            Self::CommandSubstitution(_) => "command substitution",
            Self::ArithmeticExpansion(_) => "arithmetic expansion",
            Self::ProcessSubstitution(_) => "process substitution",
            Self::ExtendedGlob(_) => "extended glob",
            Self::BraceExpansion(_) => "brace expansion",
        }
    }
}

/// Literal text (no special meaning)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralPart {
    pub value: String,
}

/// Single-quoted string: 'literal' or $'ansi-c'
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleQuotedPart {
    pub value: String,
    #[serde(default)]
    pub dollar: bool,
}

/// Double-quoted string: "with $expansion" or $"localized"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoubleQuotedPart {
    pub parts: Vec<WordPart>,
    #[serde(default)]
    pub dollar: bool,
}

/// Parameter/variable expansion: $VAR or ${VAR...}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterExpansionPart {
    pub parameter: String,
    /// $VAR rather than ${VAR}
    #[serde(default)]
    pub short: bool,
    /// ${#VAR}
    #[serde(default)]
    pub length: bool,
    #[serde(default)]
    pub operation: Option<ParameterOperation>,
}

/// ${VAR<op>word}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterOperation {
    pub operator: ParameterOperator,
    #[serde(default)]
    pub word: WordNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterOperator {
    DefaultValue,           // :-
    DefaultValueUnset,      // -
    AssignDefault,          // :=
    AssignDefaultUnset,     // =
    ErrorIfUnset,           // :?
    ErrorIfUnsetOnly,       // ?
    UseAlternative,         // :+
    UseAlternativeUnset,    // +
    RemoveShortestPrefix,   // #
    RemoveLongestPrefix,    // ##
    RemoveShortestSuffix,   // %
    RemoveLongestSuffix,    // %%
}

impl fmt::Display for ParameterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::DefaultValue => ":-",
            Self::DefaultValueUnset => "-",
            Self::AssignDefault => ":=",
            Self::AssignDefaultUnset => "=",
            Self::ErrorIfUnset => ":?",
            Self::ErrorIfUnsetOnly => "?",
            Self::UseAlternative => ":+",
            Self::UseAlternativeUnset => "+",
            Self::RemoveShortestPrefix => "#",
            Self::RemoveLongestPrefix => "##",
            Self::RemoveShortestSuffix => "%",
            Self::RemoveLongestSuffix => "%%",
        };
        f.write_str(op)
    }
}

/// Command substitution: $(cmd) or `cmd`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSubstitutionPart {
    pub body: Vec<CommandNode>,
    /// Legacy backtick syntax
    #[serde(default)]
    pub legacy: bool,
}

/// Arithmetic expansion: $((expr))
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticExpansionPart {
    pub expression: ArithExpr,
}

/// Process substitution: <(cmd) or >(cmd)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSubstitutionPart {
    pub direction: ProcessDirection,
    pub body: Vec<CommandNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessDirection {
    Input,  // <(...)
    Output, // >(...)
}

/// Extended glob: ?(pat) *(pat) +(pat) @(pat) !(pat)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedGlobPart {
    pub operator: GlobOperator,
    pub pattern: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobOperator {
    ZeroOrOne,  // ?(
    ZeroOrMore, // *(
    OneOrMore,  // +(
    ExactlyOne, // @(
    Not,        // !(
}

impl fmt::Display for GlobOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroOrOne => write!(f, "?("),
            Self::ZeroOrMore => write!(f, "*("),
            Self::OneOrMore => write!(f, "+("),
            Self::ExactlyOne => write!(f, "@("),
            Self::Not => write!(f, "!("),
        }
    }
}

/// Brace expansion: {a,b,c} or {1..10}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BraceExpansionPart {
    /// Range form {start..end[..step]}
    #[serde(default)]
    pub sequence: bool,
    pub elements: Vec<WordNode>,
}

// =============================================================================
// ARITHMETIC
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArithExpr {
    /// Number or variable name
    Word(WordNode),
    Binary(Box<ArithBinaryNode>),
    Unary(Box<ArithUnaryNode>),
    Group(Box<ArithGroupNode>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithBinaryNode {
    pub operator: ArithBinaryOperator,
    pub left: ArithExpr,
    pub right: ArithExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithBinaryOperator {
    Add, Sub, Mul, Div, Mod, Pow,
    LShift, RShift,
    Lt, Le, Gt, Ge, Eq, Ne,
    BitAnd, BitOr, BitXor,
    LogAnd, LogOr,
    Comma,
    Assign, AddAssign, SubAssign, MulAssign, DivAssign, ModAssign,
    LShiftAssign, RShiftAssign, AndAssign, OrAssign, XorAssign,
}

impl ArithBinaryOperator {
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::AddAssign
                | Self::SubAssign
                | Self::MulAssign
                | Self::DivAssign
                | Self::ModAssign
                | Self::LShiftAssign
                | Self::RShiftAssign
                | Self::AndAssign
                | Self::OrAssign
                | Self::XorAssign
        )
    }
}

impl fmt::Display for ArithBinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "**",
            Self::LShift => "<<",
            Self::RShift => ">>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::LogAnd => "&&",
            Self::LogOr => "||",
            Self::Comma => ",",
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::ModAssign => "%=",
            Self::LShiftAssign => "<<=",
            Self::RShiftAssign => ">>=",
            Self::AndAssign => "&=",
            Self::OrAssign => "|=",
            Self::XorAssign => "^=",
        };
        f.write_str(op)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithUnaryNode {
    pub operator: ArithUnaryOperator,
    pub operand: ArithExpr,
    /// x++ rather than ++x
    #[serde(default)]
    pub postfix: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithUnaryOperator {
    Neg, Pos, Not, BitNot, Inc, Dec,
}

impl fmt::Display for ArithUnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Neg => "-",
            Self::Pos => "+",
            Self::Not => "!",
            Self::BitNot => "~",
            Self::Inc => "++",
            Self::Dec => "--",
        };
        f.write_str(op)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithGroupNode {
    pub expression: ArithExpr,
}

// =============================================================================
// FACTORY FUNCTIONS (AST builders)
// =============================================================================

/// AST factory for building nodes
pub struct AST;

impl AST {
    pub fn word(parts: Vec<WordPart>) -> WordNode {
        WordNode { parts }
    }

    /// A word made of a single literal part
    pub fn lit_word(value: impl Into<String>) -> WordNode {
        WordNode { parts: vec![Self::literal(value)] }
    }

    pub fn literal(value: impl Into<String>) -> WordPart {
        WordPart::Literal(LiteralPart { value: value.into() })
    }

    pub fn single_quoted(value: impl Into<String>) -> WordPart {
        WordPart::SingleQuoted(SingleQuotedPart { value: value.into(), dollar: false })
    }

    pub fn double_quoted(parts: Vec<WordPart>) -> WordPart {
        WordPart::DoubleQuoted(DoubleQuotedPart { parts, dollar: false })
    }

    pub fn parameter_expansion(
        parameter: impl Into<String>,
        operation: Option<ParameterOperation>,
    ) -> WordPart {
        WordPart::ParameterExpansion(ParameterExpansionPart {
            parameter: parameter.into(),
            short: operation.is_none(),
            length: false,
            operation,
        })
    }

    pub fn command_substitution(body: Vec<CommandNode>, legacy: bool) -> WordPart {
        WordPart::CommandSubstitution(CommandSubstitutionPart { body, legacy })
    }

    pub fn arithmetic_expansion(expression: ArithExpr) -> WordPart {
        WordPart::ArithmeticExpansion(ArithmeticExpansionPart { expression })
    }

    pub fn call(assignments: Vec<AssignmentNode>, args: Vec<WordNode>) -> CommandNode {
        CommandNode::Call(CallNode { assignments, args })
    }

    pub fn assignment(name: impl Into<String>, value: Option<WordNode>) -> AssignmentNode {
        AssignmentNode {
            name: name.into(),
            value,
            append: false,
            array: None,
            naked: false,
        }
    }

    pub fn array_assignment(name: impl Into<String>, items: Vec<WordNode>) -> AssignmentNode {
        AssignmentNode {
            name: name.into(),
            value: None,
            append: false,
            array: Some(items),
            naked: false,
        }
    }

    pub fn for_words(
        variable: impl Into<String>,
        items: Vec<WordNode>,
        body: Vec<CommandNode>,
    ) -> CommandNode {
        CommandNode::For(ForNode {
            select: false,
            iteration: ForIteration::Words(WordIterationNode {
                variable: variable.into(),
                in_pos: Some(Position::default()),
                items,
            }),
            body,
        })
    }

    pub fn select_words(
        variable: impl Into<String>,
        items: Vec<WordNode>,
        body: Vec<CommandNode>,
    ) -> CommandNode {
        CommandNode::For(ForNode {
            select: true,
            iteration: ForIteration::Words(WordIterationNode {
                variable: variable.into(),
                in_pos: Some(Position::default()),
                items,
            }),
            body,
        })
    }

    pub fn case_node(word: WordNode, items: Vec<CaseItemNode>) -> CommandNode {
        CommandNode::Case(CaseNode { word, items })
    }

    pub fn case_item(patterns: Vec<WordNode>, body: Vec<CommandNode>) -> CaseItemNode {
        CaseItemNode {
            patterns,
            body,
            terminator: CaseTerminator::DoubleSemi,
        }
    }

    pub fn let_node(expressions: Vec<ArithExpr>) -> CommandNode {
        CommandNode::Let(LetNode { expressions })
    }

    pub fn arith_word(value: impl Into<String>) -> ArithExpr {
        ArithExpr::Word(Self::lit_word(value))
    }

    pub fn arith_binary(
        operator: ArithBinaryOperator,
        left: ArithExpr,
        right: ArithExpr,
    ) -> ArithExpr {
        ArithExpr::Binary(Box::new(ArithBinaryNode { operator, left, right }))
    }

    pub fn arith_unary(operator: ArithUnaryOperator, operand: ArithExpr, postfix: bool) -> ArithExpr {
        ArithExpr::Unary(Box::new(ArithUnaryNode { operator, operand, postfix }))
    }
}
