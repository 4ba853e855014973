//! Arithmetic Evaluation
//!
//! Evaluates the arithmetic expressions found in `$((...))` word parts:
//! - Basic operators (+, -, *, /, %, **)
//! - Comparison operators (<, <=, >, >=, ==, !=)
//! - Bitwise operators (&, |, ^, ~, <<, >>)
//! - Logical operators (&&, ||, !) with short-circuit evaluation
//! - Assignment operators (=, +=, -=, etc.)
//! - Pre/post increment/decrement (++, --)
//!
//! Integers are 64-bit signed and wrap on overflow, matching bash.

use crate::ast::types::*;
use crate::interpreter::errors::ArithmeticError;

/// Variable access needed while evaluating
pub trait ArithContext {
    /// Plain text of an operand word (number or variable name)
    fn word_text(&mut self, word: &WordNode) -> String;
    fn get_var(&self, name: &str) -> Option<String>;
    fn set_var(&mut self, name: &str, value: String);
}

pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// ============================================================================
// Numbers
// ============================================================================

fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'a'..='z' => Some(c as u32 - 'a' as u32 + 10),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 36),
        '@' => Some(62),
        '_' => Some(63),
        _ => None,
    }
}

fn parse_in_base(digits: &str, base: u32, token: &str) -> Result<i64, ArithmeticError> {
    let invalid = || ArithmeticError::InvalidNumber { token: token.to_string() };
    if digits.is_empty() {
        return Err(invalid());
    }
    let mut value: i64 = 0;
    for c in digits.chars() {
        // Bases up to 36 accept either letter case
        let d = if base <= 36 {
            c.to_digit(36)
        } else {
            digit_value(c)
        };
        match d {
            Some(d) if d < base => {
                value = value.wrapping_mul(base as i64).wrapping_add(d as i64);
            }
            _ => return Err(invalid()),
        }
    }
    Ok(value)
}

/// Parse an integer constant: decimal, 0x hex, 0 octal or base#digits.
pub fn parse_arith_number(text: &str) -> Result<i64, ArithmeticError> {
    if let Some((base, digits)) = text.split_once('#') {
        let base: u32 = base
            .parse()
            .ok()
            .filter(|b| (2..=64).contains(b))
            .ok_or_else(|| ArithmeticError::InvalidNumber { token: text.to_string() })?;
        return parse_in_base(digits, base, text);
    }
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return parse_in_base(hex, 16, text);
    }
    if text.len() > 1 && text.starts_with('0') {
        return parse_in_base(&text[1..], 8, text);
    }
    parse_in_base(text, 10, text)
}

/// Resolve an operand's text to a value
fn operand_value(ctx: &mut dyn ArithContext, text: &str) -> Result<i64, ArithmeticError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    if is_valid_name(text) {
        // Unset or non-numeric variables count as 0
        let value = ctx.get_var(text).unwrap_or_default();
        return Ok(parse_arith_number(value.trim()).unwrap_or(0));
    }
    parse_arith_number(text)
}

// ============================================================================
// Binary Operators
// ============================================================================

fn apply_binary_op(left: i64, right: i64, operator: ArithBinaryOperator) -> Result<i64, ArithmeticError> {
    use ArithBinaryOperator::*;
    match operator {
        Add | AddAssign => Ok(left.wrapping_add(right)),
        Sub | SubAssign => Ok(left.wrapping_sub(right)),
        Mul | MulAssign => Ok(left.wrapping_mul(right)),
        Div | DivAssign => {
            if right == 0 {
                Err(ArithmeticError::DivisionByZero)
            } else {
                Ok(left.wrapping_div(right))
            }
        }
        Mod | ModAssign => {
            if right == 0 {
                Err(ArithmeticError::DivisionByZero)
            } else {
                Ok(left.wrapping_rem(right))
            }
        }
        Pow => {
            if right < 0 {
                Err(ArithmeticError::NegativeExponent)
            } else {
                Ok(left.wrapping_pow(right.min(u32::MAX as i64) as u32))
            }
        }
        LShift | LShiftAssign => Ok(left.wrapping_shl((right & 63) as u32)),
        RShift | RShiftAssign => Ok(left.wrapping_shr((right & 63) as u32)),
        Lt => Ok((left < right) as i64),
        Le => Ok((left <= right) as i64),
        Gt => Ok((left > right) as i64),
        Ge => Ok((left >= right) as i64),
        Eq => Ok((left == right) as i64),
        Ne => Ok((left != right) as i64),
        BitAnd | AndAssign => Ok(left & right),
        BitOr | OrAssign => Ok(left | right),
        BitXor | XorAssign => Ok(left ^ right),
        Comma | Assign => Ok(right),
        // Short-circuit forms are handled by the caller
        LogAnd => Ok((left != 0 && right != 0) as i64),
        LogOr => Ok((left != 0 || right != 0) as i64),
    }
}

/// Name of the variable an assignment or increment targets
fn target_name(ctx: &mut dyn ArithContext, expr: &ArithExpr) -> Result<String, ArithmeticError> {
    if let ArithExpr::Word(word) = expr {
        let name = ctx.word_text(word);
        if is_valid_name(&name) {
            return Ok(name);
        }
        return Err(ArithmeticError::NotAssignable { token: name });
    }
    let mut token = String::new();
    crate::interpreter::printer::print_arith(&mut token, expr, true);
    Err(ArithmeticError::NotAssignable { token })
}

// ============================================================================
// Evaluation
// ============================================================================

pub fn evaluate_arithmetic(ctx: &mut dyn ArithContext, expr: &ArithExpr) -> Result<i64, ArithmeticError> {
    match expr {
        ArithExpr::Word(word) => {
            let text = ctx.word_text(word);
            operand_value(ctx, &text)
        }
        ArithExpr::Group(group) => evaluate_arithmetic(ctx, &group.expression),
        ArithExpr::Binary(node) => match node.operator {
            ArithBinaryOperator::LogAnd => {
                if evaluate_arithmetic(ctx, &node.left)? == 0 {
                    return Ok(0);
                }
                Ok((evaluate_arithmetic(ctx, &node.right)? != 0) as i64)
            }
            ArithBinaryOperator::LogOr => {
                if evaluate_arithmetic(ctx, &node.left)? != 0 {
                    return Ok(1);
                }
                Ok((evaluate_arithmetic(ctx, &node.right)? != 0) as i64)
            }
            op if op.is_assignment() => {
                let name = target_name(ctx, &node.left)?;
                let right = evaluate_arithmetic(ctx, &node.right)?;
                let current = if op == ArithBinaryOperator::Assign {
                    0
                } else {
                    operand_value(ctx, &name)?
                };
                let value = apply_binary_op(current, right, op)?;
                ctx.set_var(&name, value.to_string());
                Ok(value)
            }
            op => {
                let left = evaluate_arithmetic(ctx, &node.left)?;
                let right = evaluate_arithmetic(ctx, &node.right)?;
                apply_binary_op(left, right, op)
            }
        },
        ArithExpr::Unary(node) => match node.operator {
            ArithUnaryOperator::Inc | ArithUnaryOperator::Dec => {
                let name = target_name(ctx, &node.operand)?;
                let old = operand_value(ctx, &name)?;
                let new = if node.operator == ArithUnaryOperator::Inc {
                    old.wrapping_add(1)
                } else {
                    old.wrapping_sub(1)
                };
                ctx.set_var(&name, new.to_string());
                Ok(if node.postfix { old } else { new })
            }
            ArithUnaryOperator::Neg => Ok(evaluate_arithmetic(ctx, &node.operand)?.wrapping_neg()),
            ArithUnaryOperator::Pos => evaluate_arithmetic(ctx, &node.operand),
            ArithUnaryOperator::Not => Ok((evaluate_arithmetic(ctx, &node.operand)? == 0) as i64),
            ArithUnaryOperator::BitNot => Ok(!evaluate_arithmetic(ctx, &node.operand)?),
        },
    }
}
