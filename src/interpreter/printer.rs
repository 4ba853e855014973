//! Verbatim printer
//!
//! Renders nodes back into canonical single-line shell syntax, the way they
//! would appear in a script. Unlike trace rendering nothing is evaluated:
//! `$x` prints as `$x`, `"a b"` keeps its double quotes.

use crate::ast::types::*;

/// Anything the printer can render
#[derive(Debug, Clone, Copy)]
pub enum Printable<'a> {
    Word(&'a WordNode),
    Call(&'a CallNode),
    Let(&'a LetNode),
    Command(&'a CommandNode),
}

pub fn print(out: &mut String, node: Printable<'_>) {
    match node {
        Printable::Word(word) => print_word(out, word),
        Printable::Call(call) => print_call(out, call),
        Printable::Let(let_node) => print_let(out, let_node),
        Printable::Command(command) => print_command(out, command),
    }
}

/// Print a node into a fresh string
pub fn to_source(node: Printable<'_>) -> String {
    let mut out = String::new();
    print(&mut out, node);
    out
}

// ============================================================================
// Words
// ============================================================================

pub fn print_word(out: &mut String, word: &WordNode) {
    for part in &word.parts {
        print_part(out, part);
    }
}

fn print_part(out: &mut String, part: &WordPart) {
    match part {
        WordPart::Literal(LiteralPart { value }) => out.push_str(value),
        WordPart::SingleQuoted(SingleQuotedPart { value, dollar }) => {
            if *dollar {
                out.push('$');
            }
            out.push('\'');
            out.push_str(value);
            out.push('\'');
        }
        WordPart::DoubleQuoted(DoubleQuotedPart { parts, dollar }) => {
            if *dollar {
                out.push('$');
            }
            out.push('"');
            for inner in parts {
                print_part(out, inner);
            }
            out.push('"');
        }
        WordPart::ParameterExpansion(exp) => print_parameter(out, exp),
        WordPart::CommandSubstitution(CommandSubstitutionPart { body, legacy }) => {
            if *legacy {
                out.push('`');
                print_list(out, body);
                out.push('`');
            } else {
                out.push_str("$(");
                print_list(out, body);
                out.push(')');
            }
        }
        WordPart::ArithmeticExpansion(ArithmeticExpansionPart { expression }) => {
            out.push_str("$((");
            print_arith(out, expression, false);
            out.push_str("))");
        }
        WordPart::ProcessSubstitution(ProcessSubstitutionPart { direction, body }) => {
            out.push_str(match direction {
                ProcessDirection::Input => "<(",
                ProcessDirection::Output => ">(",
            });
            print_list(out, body);
            out.push(')');
        }
        WordPart::ExtendedGlob(ExtendedGlobPart { operator, pattern }) => {
            out.push_str(&operator.to_string());
            out.push_str(pattern);
            out.push(')');
        }
        WordPart::BraceExpansion(BraceExpansionPart { sequence, elements }) => {
            let separator = if *sequence { ".." } else { "," };
            out.push('{');
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    out.push_str(separator);
                }
                print_word(out, element);
            }
            out.push('}');
        }
    }
}

fn print_parameter(out: &mut String, exp: &ParameterExpansionPart) {
    if exp.short && !exp.length && exp.operation.is_none() {
        out.push('$');
        out.push_str(&exp.parameter);
        return;
    }
    out.push_str("${");
    if exp.length {
        out.push('#');
    }
    out.push_str(&exp.parameter);
    if let Some(op) = &exp.operation {
        out.push_str(&op.operator.to_string());
        print_word(out, &op.word);
    }
    out.push('}');
}

// ============================================================================
// Arithmetic
// ============================================================================

/// Print an arithmetic expression. `compact` drops the spaces around
/// binary operators, as needed inside `let` arguments.
pub fn print_arith(out: &mut String, expr: &ArithExpr, compact: bool) {
    match expr {
        ArithExpr::Word(word) => print_word(out, word),
        ArithExpr::Binary(node) => {
            print_arith(out, &node.left, compact);
            if compact {
                out.push_str(&node.operator.to_string());
            } else if node.operator == ArithBinaryOperator::Comma {
                out.push_str(", ");
            } else {
                out.push(' ');
                out.push_str(&node.operator.to_string());
                out.push(' ');
            }
            print_arith(out, &node.right, compact);
        }
        ArithExpr::Unary(node) => {
            if node.postfix {
                print_arith(out, &node.operand, compact);
                out.push_str(&node.operator.to_string());
            } else {
                out.push_str(&node.operator.to_string());
                print_arith(out, &node.operand, compact);
            }
        }
        ArithExpr::Group(node) => {
            out.push('(');
            print_arith(out, &node.expression, compact);
            out.push(')');
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

pub fn print_assignment(out: &mut String, assignment: &AssignmentNode) {
    out.push_str(&assignment.name);
    if assignment.naked {
        return;
    }
    out.push_str(if assignment.append { "+=" } else { "=" });
    if let Some(items) = &assignment.array {
        out.push('(');
        print_words(out, items);
        out.push(')');
    } else if let Some(value) = &assignment.value {
        print_word(out, value);
    }
}

pub fn print_call(out: &mut String, call: &CallNode) {
    let mut first = true;
    for assignment in &call.assignments {
        if !first {
            out.push(' ');
        }
        print_assignment(out, assignment);
        first = false;
    }
    for arg in &call.args {
        if !first {
            out.push(' ');
        }
        print_word(out, arg);
        first = false;
    }
}

pub fn print_let(out: &mut String, let_node: &LetNode) {
    out.push_str("let");
    for expr in &let_node.expressions {
        out.push(' ');
        print_arith(out, expr, true);
    }
}

fn print_words(out: &mut String, words: &[WordNode]) {
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        print_word(out, word);
    }
}

/// Commands separated by "; "
fn print_list(out: &mut String, commands: &[CommandNode]) {
    for (i, command) in commands.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        print_command(out, command);
    }
}

/// Body of a compound command: " cmd1; cmd2;"
fn print_body(out: &mut String, commands: &[CommandNode]) {
    for command in commands {
        out.push(' ');
        print_command(out, command);
        out.push(';');
    }
}

pub fn print_command(out: &mut String, command: &CommandNode) {
    match command {
        CommandNode::Call(call) => print_call(out, call),
        CommandNode::For(node) => print_for(out, node),
        CommandNode::Case(node) => {
            out.push_str("case ");
            print_word(out, &node.word);
            out.push_str(" in");
            for item in &node.items {
                out.push(' ');
                for (i, pattern) in item.patterns.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    print_word(out, pattern);
                }
                out.push(')');
                if !item.body.is_empty() {
                    out.push(' ');
                    print_list(out, &item.body);
                }
                out.push(' ');
                out.push_str(&item.terminator.to_string());
            }
            out.push_str(" esac");
        }
        CommandNode::Let(node) => print_let(out, node),
        CommandNode::If(node) => {
            for (i, clause) in node.clauses.iter().enumerate() {
                out.push_str(if i == 0 { "if" } else { " elif" });
                print_body(out, &clause.condition);
                out.push_str(" then");
                print_body(out, &clause.body);
            }
            if let Some(else_body) = &node.else_body {
                out.push_str(" else");
                print_body(out, else_body);
            }
            out.push_str(" fi");
        }
        CommandNode::While(node) => {
            out.push_str(if node.until { "until" } else { "while" });
            print_body(out, &node.condition);
            out.push_str(" do");
            print_body(out, &node.body);
            out.push_str(" done");
        }
        CommandNode::ArithmeticCommand(node) => {
            out.push_str("((");
            print_arith(out, &node.expression, false);
            out.push_str("))");
        }
        CommandNode::Test(node) => {
            out.push_str("[[ ");
            print_words(out, &node.words);
            out.push_str(" ]]");
        }
        CommandNode::Declaration(node) => {
            out.push_str(&node.variant);
            for arg in &node.args {
                out.push(' ');
                print_assignment(out, arg);
            }
        }
        CommandNode::Time(node) => {
            out.push_str("time");
            if node.posix {
                out.push_str(" -p");
            }
            if let Some(inner) = &node.command {
                out.push(' ');
                print_command(out, inner);
            }
        }
        CommandNode::Subshell(node) => {
            out.push('(');
            print_list(out, &node.body);
            out.push(')');
        }
        CommandNode::Group(node) => {
            out.push('{');
            print_body(out, &node.body);
            out.push_str(" }");
        }
        CommandNode::FunctionDef(node) => {
            out.push_str(&node.name);
            out.push_str("() ");
            print_command(out, &node.body);
        }
        CommandNode::Binary(node) => {
            print_command(out, &node.left);
            out.push(' ');
            out.push_str(&node.operator.to_string());
            out.push(' ');
            print_command(out, &node.right);
        }
    }
}

fn print_for(out: &mut String, node: &ForNode) {
    out.push_str(if node.select { "select " } else { "for " });
    match &node.iteration {
        ForIteration::Words(iter) => {
            out.push_str(&iter.variable);
            if iter.in_pos.is_some() {
                out.push_str(" in");
                for item in &iter.items {
                    out.push(' ');
                    print_word(out, item);
                }
            }
        }
        ForIteration::CStyle(cstyle) => {
            out.push_str("((");
            let clauses = [&cstyle.init, &cstyle.condition, &cstyle.update];
            for (i, clause) in clauses.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                if let Some(expr) = clause {
                    print_arith(out, expr, false);
                }
            }
            out.push_str("))");
        }
    }
    out.push_str("; do");
    print_body(out, &node.body);
    out.push_str(" done");
}
