// ABOUTME: Tree-walking evaluator: scoping, control flow, and expression semantics

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::env::Scopes;
use crate::error::AsteriskError;
use crate::module_loader::ModuleLoader;
use crate::tree::{Node, NodeKind};
use crate::value::{Callable, UserFunction, Value};

/// The three non-local exits threaded through statement evaluation instead
/// of host-exception abuse: a statement evaluates to a plain value, or it
/// signals one of `break`/`continue`/`return` bubbling up to the construct
/// that handles it.
pub enum Flow {
    Value(Value),
    Break,
    Continue,
    Return(Value),
}

impl Flow {
    fn into_value(self) -> Value {
        match self {
            Flow::Value(v) | Flow::Return(v) => v,
            Flow::Break | Flow::Continue => Value::tuple(vec![]),
        }
    }
}

/// Walks one parse tree, maintaining a module environment, a local-scope
/// stack, and a read-only builtins mapping. One `Evaluator` is created per
/// module (the top-level script, or each file a module import loads).
pub struct Evaluator {
    scopes: Scopes,
    loop_depth: usize,
    pub current_dir: PathBuf,
    module_loader: Option<Rc<RefCell<ModuleLoader>>>,
}

impl Evaluator {
    pub fn new(builtins: Rc<HashMap<String, Value>>, current_dir: PathBuf) -> Self {
        Evaluator {
            scopes: Scopes::new(builtins),
            loop_depth: 0,
            current_dir,
            module_loader: None,
        }
    }

    pub fn with_module_loader(
        builtins: Rc<HashMap<String, Value>>,
        current_dir: PathBuf,
        loader: Rc<RefCell<ModuleLoader>>,
    ) -> Self {
        Evaluator {
            scopes: Scopes::new(builtins),
            loop_depth: 0,
            current_dir,
            module_loader: Some(loader),
        }
    }

    /// Snapshot of this evaluator's module environment, used by the module
    /// loader to capture a file's exports after its top-level finishes.
    pub fn snapshot_module(&self) -> HashMap<String, Value> {
        self.scopes.snapshot_module()
    }

    /// Evaluates a `Start` tree against this evaluator's module environment.
    /// Re-entrant: a second call against the same evaluator sees bindings
    /// left by the first (REPL semantics). Returns the value of the last
    /// top-level statement, or `None` if the tree had no statements.
    pub fn run(&mut self, tree: &Node) -> Result<Option<Value>, AsteriskError> {
        if tree.children.is_empty() {
            return Ok(None);
        }
        match self.eval_block_children(&tree.children)? {
            Flow::Return(_) => Err(AsteriskError::control_flow("return used outside of function")),
            Flow::Break | Flow::Continue => {
                Err(AsteriskError::control_flow("break/continue used outside of loop"))
            }
            Flow::Value(v) => Ok(Some(v)),
        }
    }

    /// As [`run`](Self::run), but first lets the caller update `current_dir`
    /// — the context successive top-level invocations resolve `import`
    /// against. A REPL session holds one `Evaluator` across many calls and
    /// can redirect later ones (e.g. after a `:cd`) without losing the
    /// module environment the earlier calls built up.
    pub fn run_with_dir(
        &mut self,
        tree: &Node,
        current_dir: Option<PathBuf>,
    ) -> Result<Option<Value>, AsteriskError> {
        if let Some(dir) = current_dir {
            self.current_dir = dir;
        }
        self.run(tree)
    }

    fn eval_block_children(&mut self, stmts: &[Node]) -> Result<Flow, AsteriskError> {
        let mut last = Value::tuple(vec![]);
        for stmt in stmts {
            match self.eval_stmt(stmt)? {
                Flow::Value(v) => last = v,
                other => return Ok(other),
            }
        }
        Ok(Flow::Value(last))
    }

    fn eval_block(&mut self, block: &Node) -> Result<Flow, AsteriskError> {
        debug_assert_eq!(block.kind, NodeKind::Block);
        self.eval_block_children(&block.children)
    }

    fn eval_stmt(&mut self, node: &Node) -> Result<Flow, AsteriskError> {
        match node.kind {
            NodeKind::Start | NodeKind::Block => self.eval_block_children(&node.children),
            NodeKind::AssignVar => {
                let value = self.eval_expr(&node.children[0])?;
                self.scopes.set(node.token.clone().unwrap(), value.clone());
                Ok(Flow::Value(value))
            }
            NodeKind::AssignIndex => self.eval_assign_index(node),
            NodeKind::ImportStmt => self.eval_import(node),
            NodeKind::FuncDef => self.eval_func_def(node),
            NodeKind::IfStmt => self.eval_if(node),
            NodeKind::WhileStmt => self.eval_while(node),
            NodeKind::ForStmt => self.eval_for(node),
            NodeKind::BreakStmt => {
                if self.loop_depth == 0 {
                    return Err(AsteriskError::control_flow("break used outside of loop"));
                }
                Ok(Flow::Break)
            }
            NodeKind::ContinueStmt => {
                if self.loop_depth == 0 {
                    return Err(AsteriskError::control_flow("continue used outside of loop"));
                }
                Ok(Flow::Continue)
            }
            NodeKind::ReturnStmt => {
                if self.scopes.call_depth() == 0 {
                    return Err(AsteriskError::control_flow("return used outside of function"));
                }
                let value = match node.children.first() {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::tuple(vec![]),
                };
                Ok(Flow::Return(value))
            }
            _ => Ok(Flow::Value(self.eval_expr(node)?)),
        }
    }

    fn eval_assign_index(&mut self, node: &Node) -> Result<Flow, AsteriskError> {
        let name = node.token.as_ref().unwrap();
        let index = self.eval_expr(&node.children[0])?;
        let value = self.eval_expr(&node.children[1])?;
        let target = self
            .scopes
            .lookup_user(name)
            .ok_or_else(|| AsteriskError::name_error(format!("undefined variable: {name}")))?;
        match &target {
            Value::List(items) => {
                let idx = index_to_usize(&index, items.borrow().len())?;
                items.borrow_mut()[idx] = value.clone();
            }
            Value::Map(entries) => {
                let key = index.as_map_key()?;
                entries.borrow_mut().insert(key, value.clone());
            }
            other => {
                return Err(AsteriskError::type_error(format!(
                    "{} is not indexable: {name}",
                    other.type_name()
                )))
            }
        }
        Ok(Flow::Value(value))
    }

    fn eval_import(&mut self, node: &Node) -> Result<Flow, AsteriskError> {
        let loader = self
            .module_loader
            .clone()
            .ok_or_else(|| AsteriskError::module_error("", "module system is not configured"))?;
        let raw_path = node.children[0].token.clone().unwrap();
        let alias = node.children.get(1).and_then(|n| n.token.clone());
        let binding_name = alias.unwrap_or_else(|| stem_of(&raw_path));
        let module_value = ModuleLoader::load(&loader, &raw_path, &self.current_dir)?;
        self.scopes.set(binding_name, module_value.clone());
        Ok(Flow::Value(module_value))
    }

    fn eval_func_def(&mut self, node: &Node) -> Result<Flow, AsteriskError> {
        let name = node.token.clone().unwrap();
        let params: Vec<String> = node.children[0]
            .children
            .iter()
            .map(|p| p.token.clone().unwrap())
            .collect();
        let body = Rc::new(node.children[1].clone());
        let func = Value::Callable(Callable::User(Rc::new(UserFunction {
            name: name.clone(),
            params,
            body,
        })));
        self.scopes.set(name, func.clone());
        Ok(Flow::Value(func))
    }

    fn eval_if(&mut self, node: &Node) -> Result<Flow, AsteriskError> {
        let cond = self.eval_expr(&node.children[0])?;
        if cond.truthy() {
            return self.eval_block(&node.children[1]);
        }
        let mut i = 2;
        while i < node.children.len() {
            let clause = &node.children[i];
            if clause.kind == NodeKind::ElseifClause {
                let econd = self.eval_expr(&clause.children[0])?;
                if econd.truthy() {
                    return self.eval_block(&clause.children[1]);
                }
            } else {
                // A bare trailing Block is the `else` branch.
                return self.eval_block(clause);
            }
            i += 1;
        }
        Ok(Flow::Value(Value::tuple(vec![])))
    }

    fn eval_while(&mut self, node: &Node) -> Result<Flow, AsteriskError> {
        let mut last = Value::tuple(vec![]);
        self.loop_depth += 1;
        let result = (|| {
            while self.eval_expr(&node.children[0])?.truthy() {
                match self.eval_block(&node.children[1])? {
                    Flow::Value(v) => last = v,
                    Flow::Continue => continue,
                    Flow::Break => break,
                    ret @ Flow::Return(_) => return Ok(ret),
                }
            }
            Ok(Flow::Value(last))
        })();
        self.loop_depth -= 1;
        result
    }

    fn eval_for(&mut self, node: &Node) -> Result<Flow, AsteriskError> {
        let loop_var = node.token.clone().unwrap();
        let iterable = self.eval_expr(&node.children[0])?;
        let items = iterable.iter_items()?;

        let had_old = self.scopes.current_scope_mut().contains_key(&loop_var);
        let old_value = self.scopes.current_scope_mut().get(&loop_var).cloned();

        let mut last = Value::tuple(vec![]);
        self.loop_depth += 1;
        let result = (|| {
            for item in items {
                self.scopes.current_scope_mut().insert(loop_var.clone(), item);
                match self.eval_block(&node.children[1])? {
                    Flow::Value(v) => last = v,
                    Flow::Continue => continue,
                    Flow::Break => break,
                    ret @ Flow::Return(_) => return Ok(ret),
                }
            }
            Ok(Flow::Value(last))
        })();
        self.loop_depth -= 1;

        if had_old {
            self.scopes
                .current_scope_mut()
                .insert(loop_var, old_value.unwrap());
        } else {
            self.scopes.current_scope_mut().remove(&loop_var);
        }

        result
    }

    fn eval_expr(&mut self, node: &Node) -> Result<Value, AsteriskError> {
        match node.kind {
            NodeKind::Number => Ok(parse_number_literal(node.token.as_ref().unwrap())),
            NodeKind::String => Ok(Value::string(node.token.clone().unwrap())),
            NodeKind::True => Ok(Value::Bool(true)),
            NodeKind::False => Ok(Value::Bool(false)),
            NodeKind::Var => {
                let name = node.token.as_ref().unwrap();
                self.scopes
                    .lookup(name)
                    .ok_or_else(|| AsteriskError::name_error(format!("undefined variable: {name}")))
            }
            NodeKind::Add => self.binary(node, Value::add),
            NodeKind::Sub => self.binary(node, Value::sub),
            NodeKind::Mul => self.binary(node, Value::mul),
            NodeKind::Div => self.binary(node, Value::div),
            NodeKind::Eq => {
                let (l, r) = self.eval_pair(node)?;
                Ok(Value::Bool(l.values_equal(&r)))
            }
            NodeKind::Ne => {
                let (l, r) = self.eval_pair(node)?;
                Ok(Value::Bool(!l.values_equal(&r)))
            }
            NodeKind::Lt => self.compare(node, std::cmp::Ordering::is_lt),
            NodeKind::Le => self.compare(node, std::cmp::Ordering::is_le),
            NodeKind::Gt => self.compare(node, std::cmp::Ordering::is_gt),
            NodeKind::Ge => self.compare(node, std::cmp::Ordering::is_ge),
            NodeKind::And => {
                let lhs = self.eval_expr(&node.children[0])?;
                if !lhs.truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval_expr(&node.children[1])?.truthy()))
            }
            NodeKind::Or => {
                let lhs = self.eval_expr(&node.children[0])?;
                if lhs.truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval_expr(&node.children[1])?.truthy()))
            }
            NodeKind::Neg => self.eval_expr(&node.children[0])?.neg(),
            NodeKind::Not => Ok(Value::Bool(!self.eval_expr(&node.children[0])?.truthy())),
            NodeKind::Grouped => self.eval_expr(&node.children[0]),
            NodeKind::TupleEmpty => Ok(Value::tuple(vec![])),
            NodeKind::TupleLiteral => {
                let items = self.eval_each(&node.children)?;
                Ok(Value::tuple(items))
            }
            NodeKind::ListLiteral => {
                let items = self.eval_each(&node.children)?;
                Ok(Value::list(items))
            }
            NodeKind::DictLiteral => self.eval_dict_literal(node),
            NodeKind::VarIndex => self.eval_var_index(node),
            NodeKind::Args => unreachable!("Args is only ever consumed by its call parent"),
            NodeKind::ModuleVar => self.eval_module_var(node),
            NodeKind::ModuleFuncCall => self.eval_module_func_call(node),
            NodeKind::FuncCall => self.eval_func_call(node),
            other => unreachable!("{other} is not an expression node"),
        }
    }

    fn eval_each(&mut self, nodes: &[Node]) -> Result<Vec<Value>, AsteriskError> {
        nodes.iter().map(|n| self.eval_expr(n)).collect()
    }

    fn eval_pair(&mut self, node: &Node) -> Result<(Value, Value), AsteriskError> {
        let lhs = self.eval_expr(&node.children[0])?;
        let rhs = self.eval_expr(&node.children[1])?;
        Ok((lhs, rhs))
    }

    fn binary(
        &mut self,
        node: &Node,
        op: fn(&Value, &Value) -> Result<Value, AsteriskError>,
    ) -> Result<Value, AsteriskError> {
        let (lhs, rhs) = self.eval_pair(node)?;
        op(&lhs, &rhs)
    }

    fn compare(
        &mut self,
        node: &Node,
        matches_ordering: fn(std::cmp::Ordering) -> bool,
    ) -> Result<Value, AsteriskError> {
        let (lhs, rhs) = self.eval_pair(node)?;
        Ok(Value::Bool(matches_ordering(lhs.compare(&rhs)?)))
    }

    fn eval_dict_literal(&mut self, node: &Node) -> Result<Value, AsteriskError> {
        let mut entries = HashMap::new();
        if let Some(items) = node.children.first() {
            for item in &items.children {
                let key = self.eval_expr(&item.children[0])?;
                let value = self.eval_expr(&item.children[1])?;
                entries.insert(key.as_map_key()?, value);
            }
        }
        Ok(Value::map(entries))
    }

    fn eval_var_index(&mut self, node: &Node) -> Result<Value, AsteriskError> {
        let name = node.token.as_ref().unwrap();
        let index = self.eval_expr(&node.children[0])?;
        let target = self
            .scopes
            .lookup_user(name)
            .ok_or_else(|| AsteriskError::name_error(format!("undefined variable: {name}")))?;
        match &target {
            Value::List(items) => {
                let idx = index_to_usize(&index, items.borrow().len())?;
                Ok(items.borrow()[idx].clone())
            }
            Value::Tuple(items) => {
                let idx = index_to_usize(&index, items.len())?;
                Ok(items[idx].clone())
            }
            Value::Map(entries) => {
                let key = index.as_map_key()?;
                entries
                    .borrow()
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| AsteriskError::key_error(format!("dict key not found: {key}")))
            }
            other => Err(AsteriskError::type_error(format!(
                "{} is not indexable: {name}",
                other.type_name()
            ))),
        }
    }

    fn eval_module_var(&mut self, node: &Node) -> Result<Value, AsteriskError> {
        let (module, member) = self.resolve_module_member(node)?;
        module.get(&member).cloned().ok_or_else(|| {
            AsteriskError::name_error(format!(
                "undefined module member: {}.{member}",
                node.token.as_ref().unwrap()
            ))
        })
    }

    fn eval_module_func_call(&mut self, node: &Node) -> Result<Value, AsteriskError> {
        let module_name = node.token.clone().unwrap();
        let (module, member) = self.resolve_module_member(node)?;
        let callee = module.get(&member).cloned().ok_or_else(|| {
            AsteriskError::name_error(format!("undefined module member: {module_name}.{member}"))
        })?;
        let args_node = &node.children[1];
        let args = self.eval_each(&args_node.children)?;
        match callee {
            Value::Callable(callable) => {
                self.call_callable(&format!("{module_name}.{member}"), &callable, args)
            }
            other => Err(AsteriskError::type_error(format!(
                "{module_name}.{member} is not callable: {}",
                other.type_name()
            ))),
        }
    }

    fn resolve_module_member(
        &mut self,
        node: &Node,
    ) -> Result<(Rc<HashMap<String, Value>>, String), AsteriskError> {
        let module_name = node.token.as_ref().unwrap();
        let member = node.children[0].token.clone().unwrap();
        let target = self
            .scopes
            .lookup_user(module_name)
            .ok_or_else(|| AsteriskError::name_error(format!("undefined module: {module_name}")))?;
        match target {
            Value::Module(map) => Ok((map, member)),
            _ => Err(AsteriskError::name_error(format!(
                "undefined module: {module_name}"
            ))),
        }
    }

    fn eval_func_call(&mut self, node: &Node) -> Result<Value, AsteriskError> {
        let name = node.token.as_ref().unwrap();
        let callee = self
            .scopes
            .lookup(name)
            .ok_or_else(|| AsteriskError::name_error(format!("undefined function: {name}")))?;
        let args_node = &node.children[0];
        let args = self.eval_each(&args_node.children)?;
        match callee {
            Value::Callable(callable) => self.call_callable(name, &callable, args),
            other => Err(AsteriskError::type_error(format!(
                "{name} is not callable: {}",
                other.type_name()
            ))),
        }
    }

    fn call_callable(
        &mut self,
        display_name: &str,
        callable: &Callable,
        args: Vec<Value>,
    ) -> Result<Value, AsteriskError> {
        match callable {
            Callable::Host { func, .. } => func(&args),
            Callable::User(user_fn) => {
                if args.len() != user_fn.params.len() {
                    return Err(AsteriskError::type_error(format!(
                        "{display_name}: expected {} argument(s), got {}",
                        user_fn.params.len(),
                        args.len()
                    )));
                }
                let mut frame = HashMap::new();
                for (param, value) in user_fn.params.iter().zip(args.into_iter()) {
                    frame.insert(param.clone(), value);
                }
                self.scopes.push_scope(frame);
                let saved_loop_depth = self.loop_depth;
                self.loop_depth = 0;
                let result = self.eval_block(&user_fn.body);
                self.loop_depth = saved_loop_depth;
                self.scopes.pop_scope();
                Ok(result?.into_value())
            }
        }
    }
}

fn parse_number_literal(lexeme: &str) -> Value {
    if lexeme.contains(['.', 'e', 'E']) {
        Value::Float(lexeme.parse().expect("lexer only emits valid float lexemes"))
    } else {
        match lexeme.parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Float(lexeme.parse().expect("lexer only emits valid number lexemes")),
        }
    }
}

/// Converts a signed index to a container offset using Python-style
/// negative indexing (`-1` is the last element), matching the
/// `target[index]`/`target[index] = value` semantics of the ground-truth
/// original this core was distilled from.
fn index_to_usize(index: &Value, len: usize) -> Result<usize, AsteriskError> {
    match index {
        Value::Int(n) => {
            let normalized = if *n < 0 { *n + len as i64 } else { *n };
            if normalized >= 0 && (normalized as usize) < len {
                Ok(normalized as usize)
            } else {
                Err(AsteriskError::index_error("index out of range"))
            }
        }
        other => Err(AsteriskError::type_error(format!(
            "index must be int, got {}",
            other.type_name()
        ))),
    }
}

fn stem_of(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run_src(src: &str) -> Value {
        let tree = parse(src).unwrap();
        let mut ev = Evaluator::new(Rc::new(HashMap::new()), PathBuf::from("."));
        ev.run(&tree).unwrap().expect("expected a value")
    }

    #[test]
    fn arithmetic_and_variables() {
        assert!(matches!(run_src("x = 10; y = 32; x + y"), Value::Int(42)));
    }

    #[test]
    fn recursive_function_call() {
        let v = run_src(
            "fn fact(n) { if n <= 1 { return 1 } return n * fact(n - 1) } fact(5)",
        );
        assert!(matches!(v, Value::Int(120)));
    }

    #[test]
    fn string_concatenation_in_a_loop() {
        let v = run_src(r#"s = ""; for c in "abc" { s = s + c } s"#);
        assert_eq!(v.to_string(), "abc");
    }

    #[test]
    fn dict_indexing_and_mutation() {
        let v = run_src(r#"d = {"a": 1, "b": 2}; d["b"] = 20; d["a"] + d["b"]"#);
        assert!(matches!(v, Value::Int(21)));
    }

    #[test]
    fn list_sum_via_for_loop() {
        let v = run_src("xs = [1,2,3]; total = 0; for v in xs { total = total + v } total");
        assert!(matches!(v, Value::Int(6)));
    }

    #[test]
    fn scoping_function_argument_does_not_mutate_caller() {
        let v = run_src("fn f(x){ x = x + 1; return x } y = 1; f(y); y");
        assert!(matches!(v, Value::Int(1)));
        let v2 = run_src("fn f(x){ x = x + 1; return x } f(3)");
        assert!(matches!(v2, Value::Int(4)));
    }

    #[test]
    fn for_loop_restores_prior_binding() {
        let v = run_src("x = 9; for x in [1,2,3] { } x");
        assert!(matches!(v, Value::Int(9)));
    }

    #[test]
    fn for_loop_unbinds_when_previously_unbound() {
        let tree = parse("for x in [1] { } x").unwrap();
        let mut ev = Evaluator::new(Rc::new(HashMap::new()), PathBuf::from("."));
        let err = ev.run(&tree).unwrap_err();
        assert!(matches!(err, AsteriskError::NameError(_)));
    }

    #[test]
    fn break_and_continue_only_affect_innermost_loop() {
        let v = run_src(
            "total = 0; for i in [1,2,3] { for j in [1,2,3] { if j == 2 { break } total = total + 1 } } total",
        );
        assert!(matches!(v, Value::Int(3)));
    }

    #[test]
    fn break_outside_loop_is_control_flow_error() {
        let tree = parse("break").unwrap();
        let mut ev = Evaluator::new(Rc::new(HashMap::new()), PathBuf::from("."));
        assert!(matches!(
            ev.run(&tree).unwrap_err(),
            AsteriskError::ControlFlowError(_)
        ));
    }

    #[test]
    fn return_outside_function_is_control_flow_error() {
        let tree = parse("return 1").unwrap();
        let mut ev = Evaluator::new(Rc::new(HashMap::new()), PathBuf::from("."));
        assert!(matches!(
            ev.run(&tree).unwrap_err(),
            AsteriskError::ControlFlowError(_)
        ));
    }

    #[test]
    fn division_by_zero_is_zero_division_error() {
        let tree = parse("1 / 0").unwrap();
        let mut ev = Evaluator::new(Rc::new(HashMap::new()), PathBuf::from("."));
        assert!(matches!(
            ev.run(&tree).unwrap_err(),
            AsteriskError::ZeroDivisionError(_)
        ));
    }

    #[test]
    fn true_division_yields_float() {
        assert!(matches!(run_src("6 / 4"), Value::Float(f) if (f - 1.5).abs() < f64::EPSILON));
    }

    #[test]
    fn number_literal_rule() {
        assert!(matches!(run_src("1"), Value::Int(1)));
        assert!(matches!(run_src("1.0"), Value::Float(f) if f == 1.0));
        assert!(matches!(run_src("1e3"), Value::Float(f) if f == 1000.0));
    }

    #[test]
    fn builtin_shadowing_and_restoration() {
        let builtins = Rc::new(HashMap::from([(
            "length".to_string(),
            Value::Callable(Callable::Host {
                name: "length",
                func: |args| Ok(Value::Int(args.len() as i64)),
            }),
        )]));
        let tree = parse("length = 5; length").unwrap();
        let mut ev = Evaluator::new(builtins, PathBuf::from("."));
        let v = ev.run(&tree).unwrap().unwrap();
        assert!(matches!(v, Value::Int(5)));
    }

    #[test]
    fn indexed_mutation_on_list() {
        let v = run_src("xs = [1,2,3]; xs[1] = 9; xs[1]");
        assert!(matches!(v, Value::Int(9)));
    }

    #[test]
    fn negative_index_counts_from_the_end() {
        assert!(matches!(run_src("xs = [1,2,3]; xs[-1]"), Value::Int(3)));
        assert!(matches!(run_src("xs = [1,2,3]; xs[-3]"), Value::Int(1)));
        assert!(matches!(run_src("t = (1,2,3); t[-1]"), Value::Int(3)));
    }

    #[test]
    fn negative_index_assignment_counts_from_the_end() {
        let v = run_src("xs = [1,2,3]; xs[-1] = 9; xs[2]");
        assert!(matches!(v, Value::Int(9)));
    }

    #[test]
    fn negative_index_out_of_range_is_index_error() {
        let tree = parse("xs = [1,2,3]; xs[-4]").unwrap();
        let mut ev = Evaluator::new(Rc::new(HashMap::new()), PathBuf::from("."));
        assert!(matches!(
            ev.run(&tree).unwrap_err(),
            AsteriskError::IndexError(_)
        ));
    }

    #[test]
    fn run_with_dir_updates_current_dir_between_calls() {
        let mut ev = Evaluator::new(Rc::new(HashMap::new()), PathBuf::from("."));
        let tree = parse("x = 1").unwrap();
        ev.run_with_dir(&tree, Some(PathBuf::from("/tmp/somewhere")))
            .unwrap();
        assert_eq!(ev.current_dir, PathBuf::from("/tmp/somewhere"));
        // A later call without a new dir keeps the previous one, and still
        // sees the module-level binding from the first call.
        let tree2 = parse("x").unwrap();
        let v = ev.run_with_dir(&tree2, None).unwrap().unwrap();
        assert!(matches!(v, Value::Int(1)));
        assert_eq!(ev.current_dir, PathBuf::from("/tmp/somewhere"));
    }
}
