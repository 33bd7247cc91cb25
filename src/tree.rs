// ABOUTME: Parse tree node types produced by the parser and walked by the evaluator

use std::fmt;

/// The closed set of grammar production names a parse tree node can carry.
///
/// Children conventions (documented once here rather than per-variant, since
/// the evaluator is the authority on how each shape is consumed):
///
/// - `Start` / `Block`: children are statements, evaluated in order.
/// - `Number`: leaf; `token` is the raw source lexeme (the evaluator applies
///   the `.`/`e`/`E` rule to decide int vs float).
/// - `String`: leaf; `token` is the already-unescaped string value.
/// - `True` / `False`: leaves, no token.
/// - `Var`: leaf; `token` is the identifier name.
/// - `AssignVar`: `token` is the target name; one child, the value expression.
/// - `AssignIndex`: `token` is the target name; two children, index then value.
/// - `ImportStmt`: first child is a `String` leaf holding the raw path; an
///   optional second child is a `Var` leaf holding the `as` alias.
/// - `Params`: children are `Var` leaves, one per formal parameter.
/// - `FuncDef`: `token` is the function name; children are `[Params, Block]`.
/// - `IfStmt`: children are `[cond, then_block, ElseifClause*, else_block?]`;
///   the trailing `else_block` (if present) is a bare `Block`.
/// - `ElseifClause`: children are `[cond, block]`.
/// - `WhileStmt`: children are `[cond, block]`.
/// - `ForStmt`: `token` is the loop variable name; children are
///   `[iterable_expr, block]`.
/// - `BreakStmt` / `ContinueStmt`: leaves.
/// - `ReturnStmt`: zero or one child (the returned expression).
/// - `Add`/`Sub`/`Mul`/`Div`/`Eq`/`Ne`/`Lt`/`Le`/`Gt`/`Ge`/`And`/`Or`: two
///   children, `[lhs, rhs]`.
/// - `Neg`/`Not`: one child, the operand.
/// - `Grouped`: one child, the parenthesized expression.
/// - `TupleEmpty`: leaf.
/// - `TupleLiteral`: children are the tuple's elements, in order.
/// - `ListLiteral`: children are the list's elements, in order (may be empty).
/// - `DictItem`: children are `[key_expr, value_expr]`.
/// - `DictItems`: children are `DictItem` nodes.
/// - `DictLiteral`: zero children (empty map) or one `DictItems` child.
/// - `VarIndex`: `token` is the target name; one child, the index expression.
/// - `Args`: children are the call's argument expressions (may be empty).
/// - `ModuleVar`: `token` is the module name; one child, a `Var` leaf holding
///   the member name.
/// - `ModuleFuncCall`: `token` is the module name; children are
///   `[member_name_leaf, Args]`.
/// - `FuncCall`: `token` is the function name; one child, an `Args` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Start,
    Block,
    Number,
    String,
    True,
    False,
    Var,
    AssignVar,
    AssignIndex,
    ImportStmt,
    Params,
    FuncDef,
    IfStmt,
    ElseifClause,
    WhileStmt,
    ForStmt,
    BreakStmt,
    ContinueStmt,
    ReturnStmt,
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Neg,
    Not,
    Grouped,
    TupleEmpty,
    TupleLiteral,
    ListLiteral,
    DictItem,
    DictItems,
    DictLiteral,
    VarIndex,
    Args,
    ModuleVar,
    ModuleFuncCall,
    FuncCall,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A single parse tree node: a kind tag, an optional literal token, an
/// ordered list of children, and the source position of its first token.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub token: Option<String>,
    pub children: Vec<Node>,
    pub line: usize,
    pub col: usize,
}

impl Node {
    pub fn new(kind: NodeKind, line: usize, col: usize) -> Self {
        Node {
            kind,
            token: None,
            children: Vec::new(),
            line,
            col,
        }
    }

    pub fn with_token(kind: NodeKind, token: impl Into<String>, line: usize, col: usize) -> Self {
        Node {
            kind,
            token: Some(token.into()),
            children: Vec::new(),
            line,
            col,
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_node_has_no_children() {
        let n = Node::with_token(NodeKind::Number, "42", 1, 1);
        assert!(n.children.is_empty());
        assert_eq!(n.token.as_deref(), Some("42"));
    }

    #[test]
    fn with_children_attaches_in_order() {
        let lhs = Node::with_token(NodeKind::Number, "1", 1, 1);
        let rhs = Node::with_token(NodeKind::Number, "2", 1, 5);
        let add = Node::new(NodeKind::Add, 1, 3).with_children(vec![lhs, rhs]);
        assert_eq!(add.children.len(), 2);
        assert_eq!(add.children[0].token.as_deref(), Some("1"));
        assert_eq!(add.children[1].token.as_deref(), Some("2"));
    }
}
