//! Shell value quoting utilities
//!
//! Quotes a string so that the shell reads it back as exactly one field
//! with the same value. Used for trace output of command arguments,
//! double-quoted assignment values and `let` expressions.

use serde::{Deserialize, Serialize};
use crate::interpreter::errors::{QuoteError, QUOTE_ERR_NOT_PRINTABLE, QUOTE_ERR_NULL};

/// Shell dialect whose quoting rules apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LangVariant {
    #[default]
    Bash,
    Posix,
    Mksh,
}

/// Reserved words that must be quoted to be used as plain arguments
const RESERVED_WORDS: &[&str] = &[
    "!", "[[", "]]", "case", "coproc", "do", "done", "elif", "else", "esac", "fi", "for",
    "function", "if", "in", "select", "then", "time", "until", "while", "{", "}",
];

pub fn is_reserved_word(s: &str) -> bool {
    RESERVED_WORDS.contains(&s)
}

/// Characters that would change how the shell splits or expands a word
fn is_shell_char(c: char) -> bool {
    matches!(
        c,
        ';' | '"' | '\'' | '(' | ')' | '$' | '|' | '&' | '>' | '<' | '`'
            | ' ' | '\t' | '\r' | '\n'
            | '\\'
            | '#'
            | '*' | '?' | '[' | '{'
            | '='
            | '~'
    )
}

/// Whether a character can be written as-is inside single quotes.
/// Space is the only printable whitespace.
pub fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    // Zero-width and format characters
    !matches!(c, '\u{00ad}' | '\u{200b}'..='\u{200f}' | '\u{202a}'..='\u{202e}' | '\u{2060}'..='\u{2064}' | '\u{feff}')
}

/// Quote a string for the given shell dialect.
///
/// - Empty strings become `''`
/// - Strings without shell characters are returned unchanged
/// - Printable strings are single quoted, with `'` written as `'\''`
/// - Anything else uses `$'...'` in bash and mksh
///
/// Fails on NUL characters, and on non-printable characters in POSIX mode.
pub fn quote(s: &str, lang: LangVariant) -> Result<String, QuoteError> {
    // An unquoted empty string would expand to zero fields
    if s.is_empty() {
        return Ok("''".to_string());
    }

    let mut shell_chars = false;
    let mut non_printable = false;
    for (offset, c) in s.char_indices() {
        if c == '\0' {
            return Err(QuoteError::new(offset, QUOTE_ERR_NULL));
        }
        if is_shell_char(c) {
            // whitespace included, so newlines and tabs stay single quoted
            shell_chars = true;
        } else if !is_printable(c) {
            if lang == LangVariant::Posix {
                return Err(QuoteError::new(offset, QUOTE_ERR_NOT_PRINTABLE));
            }
            non_printable = true;
        }
    }

    if !shell_chars && !non_printable && !is_reserved_word(s) {
        return Ok(s.to_string());
    }

    if !non_printable {
        return Ok(format!("'{}'", s.replace('\'', "'\\''")));
    }

    Ok(dollar_quote(s))
}

/// Quote a value using $'...' quoting (bash ANSI-C quoting)
fn dollar_quote(value: &str) -> String {
    let mut result = String::from("$'");

    for c in value.chars() {
        match c {
            '\x07' => result.push_str("\\a"),
            '\x08' => result.push_str("\\b"),
            '\x0c' => result.push_str("\\f"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x0b' => result.push_str("\\v"),
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            _ if is_printable(c) => result.push(c),
            _ => {
                let code = c as u32;
                if code <= 0xff {
                    result.push_str(&format!("\\x{:02x}", code));
                } else if code <= 0xffff {
                    result.push_str(&format!("\\u{:04x}", code));
                } else {
                    result.push_str(&format!("\\U{:08x}", code));
                }
            }
        }
    }

    result.push('\'');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bash(s: &str) -> String {
        quote(s, LangVariant::Bash).unwrap()
    }

    #[test]
    fn test_quote_simple() {
        assert_eq!(bash("hello"), "hello");
        assert_eq!(bash("/usr/bin"), "/usr/bin");
        assert_eq!(bash("-e"), "-e");
        assert_eq!(bash("héllo"), "héllo");
    }

    #[test]
    fn test_quote_empty() {
        assert_eq!(bash(""), "''");
    }

    #[test]
    fn test_quote_with_spaces() {
        assert_eq!(bash("a b"), "'a b'");
        assert_eq!(bash("-e -x"), "'-e -x'");
    }

    #[test]
    fn test_quote_special_chars() {
        assert_eq!(bash("x=1"), "'x=1'");
        assert_eq!(bash("$HOME"), "'$HOME'");
        assert_eq!(bash("~"), "'~'");
        assert_eq!(bash("*.rs"), "'*.rs'");
        assert_eq!(bash("#comment"), "'#comment'");
        assert_eq!(bash("a{b,c}"), "'a{b,c}'");
        assert_eq!(bash("{1..3}"), "'{1..3}'");
    }

    #[test]
    fn test_quote_reserved_word() {
        assert_eq!(bash("if"), "'if'");
        assert_eq!(bash("done"), "'done'");
        assert_eq!(bash("coproc"), "'coproc'");
        assert_eq!(bash("iffy"), "iffy");
    }

    #[test]
    fn test_quote_with_single_quote() {
        assert_eq!(bash("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_quote_whitespace_is_single_quoted() {
        assert_eq!(bash("a\nb"), "'a\nb'");
        assert_eq!(bash("tab\there"), "'tab\there'");
        assert_eq!(bash("cr\r"), "'cr\r'");
        assert_eq!(bash("it's\n"), "'it'\\''s\n'");
    }

    #[test]
    fn test_quote_control_chars() {
        assert_eq!(bash("\x07bell"), "$'\\abell'");
        assert_eq!(bash("it's\x01"), "$'it\\'s\\x01'");
        assert_eq!(bash("a\n\x01"), "$'a\\n\\x01'");
        assert_eq!(bash("\x1b[0m"), "$'\\x1b[0m'");
        assert_eq!(bash("a\u{200b}b"), "$'a\\u200bb'");
    }

    #[test]
    fn test_quote_null_fails() {
        let err = quote("ab\0c", LangVariant::Bash).unwrap_err();
        assert_eq!(err.byte_offset, 2);
        assert_eq!(err.message, QUOTE_ERR_NULL);
    }

    #[test]
    fn test_quote_posix_non_printable_fails() {
        let err = quote("a\x01", LangVariant::Posix).unwrap_err();
        assert_eq!(err.byte_offset, 1);
        assert_eq!(err.message, QUOTE_ERR_NOT_PRINTABLE);
        assert_eq!(quote("a b", LangVariant::Posix).unwrap(), "'a b'");
        assert_eq!(quote("a\tb\n", LangVariant::Posix).unwrap(), "'a\tb\n'");
    }

    #[test]
    fn test_quote_mksh_uses_dollar_quotes() {
        assert_eq!(quote("a\x01b", LangVariant::Mksh).unwrap(), "$'a\\x01b'");
        assert_eq!(quote("a\tb", LangVariant::Mksh).unwrap(), "'a\tb'");
    }
}
