// ABOUTME: Library surface exposing Asterisk's parser, evaluator, and module loader

pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod module_loader;
pub mod parser;
pub mod tree;
pub mod value;

use std::path::{Path, PathBuf};

use error::AsteriskError;
use eval::Evaluator;
use module_loader::ModuleLoader;
use value::Value;

/// Parses and evaluates `source_text` as one complete program, returning the
/// value of its last top-level statement (or `None` if it has none).
/// `source_path`, if given, becomes the initial `current_dir` context for
/// any `import` the source performs (its parent directory is used; a bare
/// file name resolves against the process's current directory).
///
/// This is a one-shot convenience: each call builds a fresh `Evaluator`, so
/// two calls to `run` never see each other's bindings. The module
/// environment re-entrancy spec.md §4.2 describes — "subsequent `run` calls
/// see earlier bindings" — is a property of [`eval::Evaluator::run`] (and
/// its dir-updating sibling [`eval::Evaluator::run_with_dir`]) when the
/// *same* `Evaluator` instance is reused across calls, which is how a REPL
/// session (see `main.rs`) holds one evaluator open across many lines of
/// input.
pub fn run(
    source_text: &str,
    source_path: Option<&Path>,
) -> Result<Option<Value>, AsteriskError> {
    let current_dir = source_path
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let builtins = builtins::register_builtins();
    let loader = ModuleLoader::new(builtins.clone());
    let mut evaluator = Evaluator::with_module_loader(builtins, current_dir, loader);
    let tree = parser::parse(source_text)?;
    evaluator.run(&tree)
}

/// Reads `path` as UTF-8, then behaves as [`run`] with `source_path` set to
/// `path`.
pub fn run_file(path: &Path) -> Result<Option<Value>, AsteriskError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        AsteriskError::module_error(
            path.display().to_string(),
            format!("module not found: {e}"),
        )
    })?;
    run(&source, Some(path))
}

/// Reports whether `source_text` failed to parse solely because it ran out
/// of input, as opposed to a hard syntax error at an interior position. Used
/// by a REPL shell to decide whether to keep reading more lines before
/// reporting an error.
pub fn is_incomplete(source_text: &str) -> bool {
    parser::is_incomplete(source_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_returns_last_statement_value() {
        let v = run("x = 10; y = 32; x + y", None).unwrap().unwrap();
        assert!(matches!(v, Value::Int(42)));
    }

    #[test]
    fn run_with_no_statements_returns_none() {
        assert!(run("", None).unwrap().is_none());
    }

    #[test]
    fn is_incomplete_distinguishes_prefix_from_hard_error() {
        assert!(is_incomplete("fn f() {"));
        assert!(!is_incomplete("1 + * 2"));
    }

    #[test]
    fn run_file_executes_a_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.sk");
        std::fs::write(&path, "1 + 1").unwrap();
        let v = run_file(&path).unwrap().unwrap();
        assert!(matches!(v, Value::Int(2)));
    }

    #[test]
    fn run_file_reports_missing_file_as_module_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sk");
        let err = run_file(&path).unwrap_err();
        assert!(matches!(err, AsteriskError::ModuleError { .. }));
    }

    #[test]
    fn importing_a_sibling_module_resolves_relative_to_source_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("util.sk"),
            r#"fn greet(n) { return "hello, " + n }"#,
        )
        .unwrap();
        let main_path = dir.path().join("main.sk");
        std::fs::write(&main_path, r#"import "util.sk" as u; u.greet("world")"#).unwrap();

        let v = run_file(&main_path).unwrap().unwrap();
        assert_eq!(v.to_string(), "hello, world");
    }
}
