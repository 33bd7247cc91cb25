// ABOUTME: Scope-stack management implementing Asterisk's dynamic scoping across the call stack

use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// Holds the module environment, the stack of active local scopes, and the
/// read-only builtins mapping for one evaluator instance.
///
/// Lookup walks every active local scope innermost-first (not just the top
/// frame) before falling through to the module environment and then
/// builtins — a callee can observe a binding from any caller's frame on the
/// active call stack, even one it never received as a parameter. This is
/// still compatible with "no lexical closures": the scope stack is pure
/// call-stack state, never captured into a function value at definition
/// time. Writes always target only the innermost frame (or the module
/// environment, if no function call is active).
pub struct Scopes {
    module: HashMap<String, Value>,
    locals: Vec<HashMap<String, Value>>,
    builtins: Rc<HashMap<String, Value>>,
}

impl Scopes {
    pub fn new(builtins: Rc<HashMap<String, Value>>) -> Self {
        Scopes {
            module: HashMap::new(),
            locals: Vec::new(),
            builtins,
        }
    }

    /// Full lookup chain: locals (innermost-first) → module → builtins.
    /// Used for plain identifier reads and call-target resolution.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        for scope in self.locals.iter().rev() {
            if let Some(v) = scope.get(name) {
                return Some(v.clone());
            }
        }
        self.module
            .get(name)
            .or_else(|| self.builtins.get(name))
            .cloned()
    }

    /// Lookup chain without builtins: locals (innermost-first) → module.
    /// Used where the target must be a user binding (indexed assignment,
    /// indexed read, module member access) — builtins are never indexable
    /// or importable targets.
    pub fn lookup_user(&self, name: &str) -> Option<Value> {
        for scope in self.locals.iter().rev() {
            if let Some(v) = scope.get(name) {
                return Some(v.clone());
            }
        }
        self.module.get(name).cloned()
    }

    /// Binds `name` in the innermost active scope (a local frame if any,
    /// else the module environment).
    pub fn set(&mut self, name: String, value: Value) {
        if let Some(top) = self.locals.last_mut() {
            top.insert(name, value);
        } else {
            self.module.insert(name, value);
        }
    }

    /// Mutable access to the innermost active scope, used by `for` to save
    /// and restore the loop variable's prior binding.
    pub fn current_scope_mut(&mut self) -> &mut HashMap<String, Value> {
        if let Some(top) = self.locals.last_mut() {
            top
        } else {
            &mut self.module
        }
    }

    pub fn push_scope(&mut self, scope: HashMap<String, Value>) {
        self.locals.push(scope);
    }

    pub fn pop_scope(&mut self) -> Option<HashMap<String, Value>> {
        self.locals.pop()
    }

    /// The current user-function call depth; invariant: equal to the local
    /// scope stack's length.
    pub fn call_depth(&self) -> usize {
        self.locals.len()
    }

    /// A frozen snapshot of the module environment, used when a module
    /// finishes top-level evaluation and its exports are captured.
    pub fn snapshot_module(&self) -> HashMap<String, Value> {
        self.module.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes() -> Scopes {
        Scopes::new(Rc::new(HashMap::new()))
    }

    #[test]
    fn module_level_set_and_lookup() {
        let mut s = scopes();
        s.set("x".to_string(), Value::Int(1));
        assert!(matches!(s.lookup("x"), Some(Value::Int(1))));
    }

    #[test]
    fn writes_target_only_innermost_frame() {
        let mut s = scopes();
        s.set("y".to_string(), Value::Int(1));
        s.push_scope(HashMap::new());
        s.set("y".to_string(), Value::Int(2));
        assert!(matches!(s.lookup("y"), Some(Value::Int(2))));
        s.pop_scope();
        assert!(matches!(s.lookup("y"), Some(Value::Int(1))));
    }

    #[test]
    fn reads_walk_every_active_frame_not_just_the_top() {
        let mut s = scopes();
        s.push_scope(HashMap::from([("a".to_string(), Value::Int(1))]));
        s.push_scope(HashMap::new());
        // The top frame has no "a", but an outer active frame does.
        assert!(matches!(s.lookup("a"), Some(Value::Int(1))));
    }

    #[test]
    fn builtins_are_shadowable_but_not_mutated() {
        let builtins = Rc::new(HashMap::from([("length".to_string(), Value::Int(0))]));
        let mut s = Scopes::new(builtins.clone());
        assert!(matches!(s.lookup("length"), Some(Value::Int(0))));
        s.set("length".to_string(), Value::Int(99));
        assert!(matches!(s.lookup("length"), Some(Value::Int(99))));
        assert!(matches!(builtins.get("length"), Some(Value::Int(0))));
    }

    #[test]
    fn lookup_user_never_sees_builtins() {
        let builtins = Rc::new(HashMap::from([("length".to_string(), Value::Int(0))]));
        let s = Scopes::new(builtins);
        assert!(s.lookup_user("length").is_none());
    }
}
