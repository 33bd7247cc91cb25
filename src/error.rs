// ABOUTME: Error types for parsing, evaluation, and module-loading failures

use thiserror::Error;

/// The closed set of error kinds the core can raise. Each variant carries
/// enough context for a caller (REPL, file entrypoint) to render a useful
/// message without re-deriving it from a string.
#[derive(Error, Debug, Clone)]
pub enum AsteriskError {
    /// Malformed input. `excerpt` is a pre-rendered, caret-annotated source
    /// excerpt; callers that just want the raw position can use `line`/`col`.
    #[error("syntax error at line {line}, column {col}: {message}\n{excerpt}")]
    SyntaxError {
        line: usize,
        col: usize,
        message: String,
        excerpt: String,
    },

    /// Unbound identifier, missing module member, or undefined module.
    #[error("name error: {0}")]
    NameError(String),

    /// Non-callable call, non-indexable index, wrong index type, unhashable
    /// dict key, non-iterable `for` target, or arity mismatch.
    #[error("type error: {0}")]
    TypeError(String),

    /// Out-of-range list/tuple index.
    #[error("index error: {0}")]
    IndexError(String),

    /// Missing mapping key.
    #[error("key error: {0}")]
    KeyError(String),

    /// Division by zero.
    #[error("zero division error: {0}")]
    ZeroDivisionError(String),

    /// `break`/`continue`/`return` used outside their valid context.
    #[error("control flow error: {0}")]
    ControlFlowError(String),

    /// File not found, circular import, or a wrapped error from a child
    /// module. `path` is the offending module path.
    #[error("module error ({path}): {message}")]
    ModuleError { path: String, message: String },
}

impl AsteriskError {
    pub fn name_error(message: impl Into<String>) -> Self {
        AsteriskError::NameError(message.into())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        AsteriskError::TypeError(message.into())
    }

    pub fn index_error(message: impl Into<String>) -> Self {
        AsteriskError::IndexError(message.into())
    }

    pub fn key_error(message: impl Into<String>) -> Self {
        AsteriskError::KeyError(message.into())
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        AsteriskError::ZeroDivisionError(message.into())
    }

    pub fn control_flow(message: impl Into<String>) -> Self {
        AsteriskError::ControlFlowError(message.into())
    }

    /// Wraps an error that originated while loading `path`, prefixing the
    /// path for locality the way a nested module failure should read.
    pub fn module_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        AsteriskError::ModuleError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Re-wraps any error as a `ModuleError` naming `path`. If `self` is
    /// already a `ModuleError` (raised by a deeper import), its path is
    /// folded into the message rather than discarded, so a multi-level
    /// import chain's error still names the file that actually failed.
    pub fn wrap_in_module(self, path: &str) -> Self {
        match self {
            AsteriskError::ModuleError {
                path: inner_path,
                message,
            } => AsteriskError::ModuleError {
                path: path.to_string(),
                message: format!("{inner_path}: {message}"),
            },
            other => AsteriskError::ModuleError {
                path: path.to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_in_module_prefixes_path() {
        let err = AsteriskError::name_error("undefined variable: x");
        let wrapped = err.wrap_in_module("util.sk");
        match wrapped {
            AsteriskError::ModuleError { path, message } => {
                assert_eq!(path, "util.sk");
                assert!(message.contains("undefined variable: x"));
            }
            _ => panic!("expected ModuleError"),
        }
    }

    #[test]
    fn wrap_in_module_folds_a_deeper_module_error_instead_of_discarding_its_path() {
        let leaf = AsteriskError::name_error("undefined variable: x");
        let from_b = leaf.wrap_in_module("b.sk");
        let from_a = from_b.wrap_in_module("a.sk");
        match from_a {
            AsteriskError::ModuleError { path, message } => {
                assert_eq!(path, "a.sk");
                assert!(message.contains("b.sk"), "message was: {message}");
                assert!(message.contains("undefined variable: x"), "message was: {message}");
            }
            other => panic!("expected ModuleError, got {other}"),
        }
    }

    #[test]
    fn arity_message_is_readable() {
        let err = AsteriskError::type_error("f: expected 1 argument(s), got 2");
        assert_eq!(
            err.to_string(),
            "type error: f: expected 1 argument(s), got 2"
        );
    }
}
