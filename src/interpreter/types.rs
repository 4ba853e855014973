//! Interpreter Types
//!
//! Shell options consulted by the trace renderer.

use serde::{Deserialize, Serialize};
use crate::interpreter::helpers::quoting::LangVariant;

/// Options controlling shell behavior (set -o ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellOptions {
    /// set -x: Print commands and their arguments as they are executed
    pub xtrace: bool,
    /// set -o posix: POSIX mode for stricter compliance
    pub posix: bool,
}

impl ShellOptions {
    /// Quoting dialect used for trace output
    pub fn lang(&self) -> LangVariant {
        if self.posix {
            LangVariant::Posix
        } else {
            LangVariant::Bash
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_disable_xtrace() {
        let options = ShellOptions::default();
        assert!(!options.xtrace);
        assert_eq!(options.lang(), LangVariant::Bash);
    }

    #[test]
    fn test_posix_selects_posix_quoting() {
        let options = ShellOptions { xtrace: true, posix: true };
        assert_eq!(options.lang(), LangVariant::Posix);
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: ShellOptions = serde_json::from_str(r#"{"xtrace": true}"#).unwrap();
        assert!(options.xtrace);
        assert!(!options.posix);
    }
}
