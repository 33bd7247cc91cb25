// ABOUTME: File-based module loader with caching and circular-import detection

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::AsteriskError;
use crate::eval::Evaluator;
use crate::parser::parse;
use crate::value::Value;

/// Loads and memoizes Asterisk module files. Shared by every `Evaluator`
/// instance created during a single run (the top-level script's evaluator,
/// and one fresh evaluator per imported file), so the cache and loading set
/// are visible across the whole import graph.
pub struct ModuleLoader {
    builtins: Rc<HashMap<String, Value>>,
    cache: HashMap<PathBuf, Rc<HashMap<String, Value>>>,
    loading: HashSet<PathBuf>,
}

impl ModuleLoader {
    pub fn new(builtins: Rc<HashMap<String, Value>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(ModuleLoader {
            builtins,
            cache: HashMap::new(),
            loading: HashSet::new(),
        }))
    }

    /// Resolves `path_string` against `current_dir`, loading and evaluating
    /// the file at most once per loader instance. Returns the module's
    /// exported bindings as a `Value::Module`.
    ///
    /// Resolution is lexical (joining with `current_dir` and normalizing
    /// `.`/`..` components) rather than `std::fs::canonicalize`, which
    /// requires the target to exist; a genuinely missing file is reported as
    /// a `ModuleError` from the subsequent read, not from path resolution.
    pub fn load(
        this: &Rc<RefCell<ModuleLoader>>,
        path_string: &str,
        current_dir: &Path,
    ) -> Result<Value, AsteriskError> {
        let resolved = resolve_path(path_string, current_dir);

        if let Some(exports) = this.borrow().cache.get(&resolved) {
            return Ok(Value::Module(exports.clone()));
        }

        {
            let mut loader = this.borrow_mut();
            if loader.loading.contains(&resolved) {
                return Err(AsteriskError::module_error(
                    resolved.display().to_string(),
                    format!("circular module import: {}", resolved.display()),
                ));
            }
            loader.loading.insert(resolved.clone());
        }

        let result = load_uncached(this, &resolved);

        this.borrow_mut().loading.remove(&resolved);

        let exports = result?;
        let exports = Rc::new(exports);
        this.borrow_mut()
            .cache
            .insert(resolved.clone(), exports.clone());
        Ok(Value::Module(exports))
    }
}

fn load_uncached(
    this: &Rc<RefCell<ModuleLoader>>,
    resolved: &Path,
) -> Result<HashMap<String, Value>, AsteriskError> {
    let path_name = resolved.display().to_string();
    let source = std::fs::read_to_string(resolved).map_err(|_| {
        AsteriskError::module_error(path_name.clone(), format!("module not found: {path_name}"))
    })?;

    let tree = parse(&source).map_err(|e| e.wrap_in_module(&path_name))?;

    let builtins = this.borrow().builtins.clone();
    let parent_dir = resolved
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut evaluator = Evaluator::with_module_loader(builtins, parent_dir, this.clone());
    evaluator
        .run(&tree)
        .map_err(|e| e.wrap_in_module(&path_name))?;

    Ok(evaluator.snapshot_module())
}

/// Joins `path_string` with `current_dir` (if relative) and lexically
/// normalizes `.`/`..` components, without requiring the target to exist.
fn resolve_path(path_string: &str, current_dir: &Path) -> PathBuf {
    let candidate = Path::new(path_string);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        current_dir.join(candidate)
    };
    normalize_lexically(&joined)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(out.components().next_back(), None | Some(Component::ParentDir)) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn loader() -> Rc<RefCell<ModuleLoader>> {
        ModuleLoader::new(Rc::new(HashMap::new()))
    }

    #[test]
    fn loads_a_module_and_exposes_its_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("util.sk");
        std::fs::File::create(&file)
            .unwrap()
            .write_all(b"fn greet(n) { return \"hello, \" + n }")
            .unwrap();

        let loader = loader();
        let module = ModuleLoader::load(&loader, "util.sk", dir.path()).unwrap();
        match module {
            Value::Module(exports) => assert!(exports.contains_key("greet")),
            other => panic!("expected a module value, got {other}"),
        }
    }

    #[test]
    fn caches_repeated_imports() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("counted.sk");
        std::fs::File::create(&file)
            .unwrap()
            .write_all(b"x = 1")
            .unwrap();

        let loader = loader();
        let first = ModuleLoader::load(&loader, "counted.sk", dir.path()).unwrap();
        let second = ModuleLoader::load(&loader, "counted.sk", dir.path()).unwrap();
        match (first, second) {
            (Value::Module(a), Value::Module(b)) => assert!(Rc::ptr_eq(&a, &b)),
            _ => panic!("expected module values"),
        }
    }

    #[test]
    fn missing_file_is_module_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = loader();
        let err = ModuleLoader::load(&loader, "nope.sk", dir.path()).unwrap_err();
        assert!(matches!(err, AsteriskError::ModuleError { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn circular_import_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::File::create(dir.path().join("a.sk"))
            .unwrap()
            .write_all(b"import \"b.sk\" as b")
            .unwrap();
        std::fs::File::create(dir.path().join("b.sk"))
            .unwrap()
            .write_all(b"import \"a.sk\" as a")
            .unwrap();

        let loader = loader();
        let err = ModuleLoader::load(&loader, "a.sk", dir.path()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("circular"), "message was: {msg}");
    }

    #[test]
    fn failed_circular_import_leaves_nothing_cached() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::File::create(dir.path().join("a.sk"))
            .unwrap()
            .write_all(b"import \"b.sk\" as b")
            .unwrap();
        std::fs::File::create(dir.path().join("b.sk"))
            .unwrap()
            .write_all(b"import \"a.sk\" as a")
            .unwrap();

        let loader = loader();
        let _ = ModuleLoader::load(&loader, "a.sk", dir.path());
        assert!(loader.borrow().cache.is_empty());
        assert!(loader.borrow().loading.is_empty());
    }
}
