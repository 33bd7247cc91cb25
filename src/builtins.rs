// ABOUTME: Host-provided builtin functions injected into the evaluator's builtins mapping

use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::error::AsteriskError;
use crate::value::{Callable, Value};

/// `putln(*args)`: prints its arguments separated by spaces, followed by a
/// newline. Returns the empty tuple, matching a statement-oriented print
/// builtin with no otherwise-useful result value.
fn builtin_putln(args: &[Value]) -> Result<Value, AsteriskError> {
    let rendered: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    println!("{}", rendered.join(" "));
    Ok(Value::tuple(vec![]))
}

/// `scan(prompt)`: writes `prompt` to stdout without a trailing newline,
/// then reads and returns one line from stdin with the trailing newline
/// stripped.
fn builtin_scan(args: &[Value]) -> Result<Value, AsteriskError> {
    if args.len() != 1 {
        return Err(AsteriskError::type_error(format!(
            "scan: expected 1 argument(s), got {}",
            args.len()
        )));
    }
    print!("{}", args[0]);
    std::io::stdout()
        .flush()
        .map_err(|e| AsteriskError::type_error(format!("scan: failed to flush stdout: {e}")))?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| AsteriskError::type_error(format!("scan: failed to read stdin: {e}")))?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::string(line))
}

/// `length(x)`: the number of elements in a string (code points), list,
/// tuple, or mapping.
fn builtin_length(args: &[Value]) -> Result<Value, AsteriskError> {
    if args.len() != 1 {
        return Err(AsteriskError::type_error(format!(
            "length: expected 1 argument(s), got {}",
            args.len()
        )));
    }
    let n = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.borrow().len(),
        Value::Tuple(items) => items.len(),
        Value::Map(entries) => entries.borrow().len(),
        other => {
            return Err(AsteriskError::type_error(format!(
                "length: unsupported type {}",
                other.type_name()
            )))
        }
    };
    Ok(Value::Int(n as i64))
}

/// Builds the read-only builtins mapping handed to every `Evaluator`
/// instance (the top-level evaluator, and one per imported module — the
/// module loader passes the same mapping down so a file's own `length = ...`
/// shadow never leaks into a file it imports).
pub fn register_builtins() -> Rc<HashMap<String, Value>> {
    let mut map = HashMap::new();
    let entries: &[(&'static str, crate::value::HostFn)] = &[
        ("putln", builtin_putln),
        ("scan", builtin_scan),
        ("length", builtin_length),
    ];
    for (name, func) in entries {
        map.insert(
            name.to_string(),
            Value::Callable(Callable::Host { name, func: *func }),
        );
    }
    Rc::new(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_reports_list_size() {
        let v = builtin_length(&[Value::list(vec![Value::Int(1), Value::Int(2)])]).unwrap();
        assert!(matches!(v, Value::Int(2)));
    }

    #[test]
    fn length_counts_code_points_not_bytes() {
        let v = builtin_length(&[Value::string("héllo")]).unwrap();
        assert!(matches!(v, Value::Int(5)));
    }

    #[test]
    fn length_rejects_wrong_arity() {
        let err = builtin_length(&[]).unwrap_err();
        assert!(matches!(err, AsteriskError::TypeError(_)));
    }

    #[test]
    fn length_rejects_unsupported_type() {
        let err = builtin_length(&[Value::Int(1)]).unwrap_err();
        assert!(matches!(err, AsteriskError::TypeError(_)));
    }

    #[test]
    fn register_builtins_exposes_the_minimum_set() {
        let builtins = register_builtins();
        assert!(builtins.contains_key("putln"));
        assert!(builtins.contains_key("scan"));
        assert!(builtins.contains_key("length"));
    }
}
