// ABOUTME: Recursive-descent / precedence-climbing parser producing a Node tree

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::error::AsteriskError;
use crate::lexer::{render_excerpt, tokenize, Token, TokenKind};
use crate::tree::{Node, NodeKind};

/// Internal parse failure, distinguishing "ran out of input" (the source may
/// just be an incomplete prefix of a valid program) from a hard syntax error
/// at an interior position.
#[derive(Debug, Clone)]
struct ParseError {
    line: usize,
    col: usize,
    message: String,
    at_eof: bool,
}

type PResult<T> = Result<T, ParseError>;

struct TokStream<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokStream<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        TokStream { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn at_eof(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if !matches!(tok.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let tok = self.current();
        ParseError {
            line: tok.line,
            col: tok.col,
            message: message.into(),
            at_eof: matches!(tok.kind, TokenKind::Eof),
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<Token> {
        if self.kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {kind:?}, found {:?}", self.kind())))
        }
    }

    fn expect_ident(&mut self) -> PResult<(String, usize, usize)> {
        let tok = self.current().clone();
        match &tok.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok((name, tok.line, tok.col))
            }
            other => Err(self.error(format!("expected identifier, found {other:?}"))),
        }
    }
}

/// Parses `src` into a `Start` node. Returns a hard syntax error for
/// malformed input; use [`is_incomplete`] to check whether a failure means
/// the source is a valid-so-far prefix (useful for REPL multiline input).
pub fn parse(src: &str) -> Result<Node, AsteriskError> {
    match parse_inner(src) {
        Ok(node) => Ok(node),
        Err(pe) => Err(to_syntax_error(src, pe)),
    }
}

/// Reports whether `src` failed to parse because it ran out of input
/// (a possibly-valid prefix) as opposed to a hard error at an interior
/// position.
pub fn is_incomplete(src: &str) -> bool {
    match parse_inner(src) {
        Ok(_) => false,
        Err(pe) => pe.at_eof,
    }
}

fn to_syntax_error(src: &str, pe: ParseError) -> AsteriskError {
    AsteriskError::SyntaxError {
        line: pe.line,
        col: pe.col,
        message: pe.message.clone(),
        excerpt: render_excerpt(src, pe.line, pe.col),
    }
}

fn parse_inner(src: &str) -> PResult<Node> {
    let tokens = tokenize(src).map_err(|e| match e {
        AsteriskError::SyntaxError {
            line, col, message, ..
        } => ParseError {
            line,
            col,
            message,
            at_eof: false,
        },
        _ => unreachable!("tokenize only ever raises SyntaxError"),
    })?;
    let mut stream = TokStream::new(&tokens);
    let first = stream.current().clone();
    let stmts = parse_stmt_list(&mut stream, &|k| matches!(k, TokenKind::Eof))?;
    stream.expect(&TokenKind::Eof)?;
    Ok(Node::new(NodeKind::Start, first.line, first.col).with_children(stmts))
}

fn parse_stmt_list(s: &mut TokStream, stop: &dyn Fn(&TokenKind) -> bool) -> PResult<Vec<Node>> {
    let mut stmts = Vec::new();
    loop {
        while matches!(s.kind(), TokenKind::Semicolon) {
            s.advance();
        }
        if stop(s.kind()) {
            return Ok(stmts);
        }
        stmts.push(parse_statement(s)?);
    }
}

fn parse_block(s: &mut TokStream) -> PResult<Node> {
    let open = s.expect(&TokenKind::LBrace)?;
    let stmts = parse_stmt_list(s, &|k| matches!(k, TokenKind::RBrace))?;
    s.expect(&TokenKind::RBrace)?;
    Ok(Node::new(NodeKind::Block, open.line, open.col).with_children(stmts))
}

fn starts_expression(kind: &TokenKind) -> bool {
    !matches!(
        kind,
        TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
    )
}

fn parse_statement(s: &mut TokStream) -> PResult<Node> {
    let tok = s.current().clone();
    match &tok.kind {
        TokenKind::Fn => parse_func_def(s),
        TokenKind::If => parse_if(s),
        TokenKind::While => parse_while(s),
        TokenKind::For => parse_for(s),
        TokenKind::Break => {
            s.advance();
            Ok(Node::new(NodeKind::BreakStmt, tok.line, tok.col))
        }
        TokenKind::Continue => {
            s.advance();
            Ok(Node::new(NodeKind::ContinueStmt, tok.line, tok.col))
        }
        TokenKind::Return => {
            s.advance();
            let mut node = Node::new(NodeKind::ReturnStmt, tok.line, tok.col);
            if starts_expression(s.kind()) {
                node.children.push(parse_expr(s)?);
            }
            Ok(node)
        }
        TokenKind::Import => parse_import(s),
        _ => parse_assignment_or_expr(s),
    }
}

fn parse_func_def(s: &mut TokStream) -> PResult<Node> {
    let kw = s.expect(&TokenKind::Fn)?;
    let (name, line, col) = s.expect_ident()?;
    s.expect(&TokenKind::LParen)?;
    let mut params = Vec::new();
    if !matches!(s.kind(), TokenKind::RParen) {
        loop {
            let (pname, pline, pcol) = s.expect_ident()?;
            params.push(Node::with_token(NodeKind::Var, pname, pline, pcol));
            if matches!(s.kind(), TokenKind::Comma) {
                s.advance();
                continue;
            }
            break;
        }
    }
    s.expect(&TokenKind::RParen)?;
    let params_node = Node::new(NodeKind::Params, line, col).with_children(params);
    let body = parse_block(s)?;
    Ok(
        Node::with_token(NodeKind::FuncDef, name, kw.line, kw.col)
            .with_children(vec![params_node, body]),
    )
}

fn parse_if(s: &mut TokStream) -> PResult<Node> {
    let kw = s.expect(&TokenKind::If)?;
    let cond = parse_expr(s)?;
    let then_block = parse_block(s)?;
    let mut children = vec![cond, then_block];
    loop {
        match s.kind() {
            TokenKind::Elseif => {
                let ekw = s.advance();
                let econd = parse_expr(s)?;
                let eblock = parse_block(s)?;
                children.push(
                    Node::new(NodeKind::ElseifClause, ekw.line, ekw.col)
                        .with_children(vec![econd, eblock]),
                );
            }
            TokenKind::Else => {
                s.advance();
                children.push(parse_block(s)?);
                break;
            }
            _ => break,
        }
    }
    Ok(Node::new(NodeKind::IfStmt, kw.line, kw.col).with_children(children))
}

fn parse_while(s: &mut TokStream) -> PResult<Node> {
    let kw = s.expect(&TokenKind::While)?;
    let cond = parse_expr(s)?;
    let block = parse_block(s)?;
    Ok(Node::new(NodeKind::WhileStmt, kw.line, kw.col).with_children(vec![cond, block]))
}

fn parse_for(s: &mut TokStream) -> PResult<Node> {
    let kw = s.expect(&TokenKind::For)?;
    let (name, _, _) = s.expect_ident()?;
    s.expect(&TokenKind::In)?;
    let iterable = parse_expr(s)?;
    let block = parse_block(s)?;
    Ok(
        Node::with_token(NodeKind::ForStmt, name, kw.line, kw.col)
            .with_children(vec![iterable, block]),
    )
}

fn parse_import(s: &mut TokStream) -> PResult<Node> {
    let kw = s.expect(&TokenKind::Import)?;
    let path_tok = s.current().clone();
    let path = match &path_tok.kind {
        TokenKind::Str(p) => {
            s.advance();
            p.clone()
        }
        other => return Err(s.error(format!("expected string literal path, found {other:?}"))),
    };
    let mut children = vec![Node::with_token(
        NodeKind::String,
        path,
        path_tok.line,
        path_tok.col,
    )];
    if matches!(s.kind(), TokenKind::As) {
        s.advance();
        let (alias, aline, acol) = s.expect_ident()?;
        children.push(Node::with_token(NodeKind::Var, alias, aline, acol));
    }
    Ok(Node::new(NodeKind::ImportStmt, kw.line, kw.col).with_children(children))
}

fn parse_assignment_or_expr(s: &mut TokStream) -> PResult<Node> {
    let expr = parse_expr(s)?;
    if matches!(s.kind(), TokenKind::Assign) {
        match expr.kind {
            NodeKind::Var => {
                s.advance();
                let rhs = parse_expr(s)?;
                let name = expr.token.clone().unwrap();
                return Ok(
                    Node::with_token(NodeKind::AssignVar, name, expr.line, expr.col)
                        .with_children(vec![rhs]),
                );
            }
            NodeKind::VarIndex => {
                s.advance();
                let rhs = parse_expr(s)?;
                let name = expr.token.clone().unwrap();
                let mut children = expr.children;
                children.push(rhs);
                return Ok(
                    Node::with_token(NodeKind::AssignIndex, name, expr.line, expr.col)
                        .with_children(children),
                );
            }
            _ => return Err(s.error("invalid assignment target")),
        }
    }
    Ok(expr)
}

// ---- expression precedence chain, low to high ----

fn parse_expr(s: &mut TokStream) -> PResult<Node> {
    parse_or(s)
}

fn parse_or(s: &mut TokStream) -> PResult<Node> {
    let mut lhs = parse_and(s)?;
    while matches!(s.kind(), TokenKind::Or) {
        let tok = s.advance();
        let rhs = parse_and(s)?;
        lhs = Node::new(NodeKind::Or, tok.line, tok.col).with_children(vec![lhs, rhs]);
    }
    Ok(lhs)
}

fn parse_and(s: &mut TokStream) -> PResult<Node> {
    let mut lhs = parse_equality(s)?;
    while matches!(s.kind(), TokenKind::And) {
        let tok = s.advance();
        let rhs = parse_equality(s)?;
        lhs = Node::new(NodeKind::And, tok.line, tok.col).with_children(vec![lhs, rhs]);
    }
    Ok(lhs)
}

fn parse_equality(s: &mut TokStream) -> PResult<Node> {
    let mut lhs = parse_comparison(s)?;
    loop {
        let kind = match s.kind() {
            TokenKind::Eq => NodeKind::Eq,
            TokenKind::Ne => NodeKind::Ne,
            _ => break,
        };
        let tok = s.advance();
        let rhs = parse_comparison(s)?;
        lhs = Node::new(kind, tok.line, tok.col).with_children(vec![lhs, rhs]);
    }
    Ok(lhs)
}

fn parse_comparison(s: &mut TokStream) -> PResult<Node> {
    let mut lhs = parse_additive(s)?;
    loop {
        let kind = match s.kind() {
            TokenKind::Lt => NodeKind::Lt,
            TokenKind::Le => NodeKind::Le,
            TokenKind::Gt => NodeKind::Gt,
            TokenKind::Ge => NodeKind::Ge,
            _ => break,
        };
        let tok = s.advance();
        let rhs = parse_additive(s)?;
        lhs = Node::new(kind, tok.line, tok.col).with_children(vec![lhs, rhs]);
    }
    Ok(lhs)
}

fn parse_additive(s: &mut TokStream) -> PResult<Node> {
    let mut lhs = parse_multiplicative(s)?;
    loop {
        let kind = match s.kind() {
            TokenKind::Plus => NodeKind::Add,
            TokenKind::Minus => NodeKind::Sub,
            _ => break,
        };
        let tok = s.advance();
        let rhs = parse_multiplicative(s)?;
        lhs = Node::new(kind, tok.line, tok.col).with_children(vec![lhs, rhs]);
    }
    Ok(lhs)
}

fn parse_multiplicative(s: &mut TokStream) -> PResult<Node> {
    let mut lhs = parse_unary(s)?;
    loop {
        let kind = match s.kind() {
            TokenKind::Star => NodeKind::Mul,
            TokenKind::Slash => NodeKind::Div,
            _ => break,
        };
        let tok = s.advance();
        let rhs = parse_unary(s)?;
        lhs = Node::new(kind, tok.line, tok.col).with_children(vec![lhs, rhs]);
    }
    Ok(lhs)
}

fn parse_unary(s: &mut TokStream) -> PResult<Node> {
    match s.kind() {
        TokenKind::Minus => {
            let tok = s.advance();
            let operand = parse_unary(s)?;
            Ok(Node::new(NodeKind::Neg, tok.line, tok.col).with_children(vec![operand]))
        }
        TokenKind::Not => {
            let tok = s.advance();
            let operand = parse_unary(s)?;
            Ok(Node::new(NodeKind::Not, tok.line, tok.col).with_children(vec![operand]))
        }
        _ => parse_primary(s),
    }
}

fn parse_comma_separated(s: &mut TokStream, end: &TokenKind) -> PResult<Vec<Node>> {
    let mut items = Vec::new();
    if s.kind() == end {
        return Ok(items);
    }
    loop {
        items.push(parse_expr(s)?);
        if matches!(s.kind(), TokenKind::Comma) {
            s.advance();
            if s.kind() == end {
                break;
            }
            continue;
        }
        break;
    }
    Ok(items)
}

fn parse_primary(s: &mut TokStream) -> PResult<Node> {
    let tok = s.current().clone();
    match &tok.kind {
        TokenKind::Int(lexeme) => {
            s.advance();
            Ok(Node::with_token(NodeKind::Number, lexeme.clone(), tok.line, tok.col))
        }
        TokenKind::Float(lexeme) => {
            s.advance();
            Ok(Node::with_token(NodeKind::Number, lexeme.clone(), tok.line, tok.col))
        }
        TokenKind::Str(value) => {
            s.advance();
            Ok(Node::with_token(NodeKind::String, value.clone(), tok.line, tok.col))
        }
        TokenKind::True => {
            s.advance();
            Ok(Node::new(NodeKind::True, tok.line, tok.col))
        }
        TokenKind::False => {
            s.advance();
            Ok(Node::new(NodeKind::False, tok.line, tok.col))
        }
        TokenKind::LParen => parse_paren(s),
        TokenKind::LBracket => parse_list_literal(s),
        TokenKind::LBrace => parse_dict_literal(s),
        TokenKind::Ident(_) => parse_ident_expr(s),
        other => Err(s.error(format!("unexpected token {other:?}"))),
    }
}

fn parse_paren(s: &mut TokStream) -> PResult<Node> {
    let open = s.expect(&TokenKind::LParen)?;
    if matches!(s.kind(), TokenKind::RParen) {
        s.advance();
        return Ok(Node::new(NodeKind::TupleEmpty, open.line, open.col));
    }
    let head = parse_expr(s)?;
    if matches!(s.kind(), TokenKind::Comma) {
        s.advance();
        let mut elements = vec![head];
        if !matches!(s.kind(), TokenKind::RParen) {
            elements.extend(parse_comma_separated(s, &TokenKind::RParen)?);
        }
        s.expect(&TokenKind::RParen)?;
        return Ok(Node::new(NodeKind::TupleLiteral, open.line, open.col).with_children(elements));
    }
    s.expect(&TokenKind::RParen)?;
    Ok(Node::new(NodeKind::Grouped, open.line, open.col).with_children(vec![head]))
}

fn parse_list_literal(s: &mut TokStream) -> PResult<Node> {
    let open = s.expect(&TokenKind::LBracket)?;
    let elements = parse_comma_separated(s, &TokenKind::RBracket)?;
    s.expect(&TokenKind::RBracket)?;
    Ok(Node::new(NodeKind::ListLiteral, open.line, open.col).with_children(elements))
}

fn parse_dict_literal(s: &mut TokStream) -> PResult<Node> {
    let open = s.expect(&TokenKind::LBrace)?;
    if matches!(s.kind(), TokenKind::RBrace) {
        s.advance();
        return Ok(Node::new(NodeKind::DictLiteral, open.line, open.col));
    }
    let mut items = Vec::new();
    loop {
        let key = parse_expr(s)?;
        let kline = key.line;
        let kcol = key.col;
        s.expect(&TokenKind::Colon)?;
        let value = parse_expr(s)?;
        items.push(Node::new(NodeKind::DictItem, kline, kcol).with_children(vec![key, value]));
        if matches!(s.kind(), TokenKind::Comma) {
            s.advance();
            if matches!(s.kind(), TokenKind::RBrace) {
                break;
            }
            continue;
        }
        break;
    }
    s.expect(&TokenKind::RBrace)?;
    let dict_items = Node::new(NodeKind::DictItems, open.line, open.col).with_children(items);
    Ok(Node::new(NodeKind::DictLiteral, open.line, open.col).with_children(vec![dict_items]))
}

fn parse_ident_expr(s: &mut TokStream) -> PResult<Node> {
    let (name, line, col) = s.expect_ident()?;
    match s.kind() {
        TokenKind::LBracket => {
            s.advance();
            let index = parse_expr(s)?;
            s.expect(&TokenKind::RBracket)?;
            Ok(Node::with_token(NodeKind::VarIndex, name, line, col).with_children(vec![index]))
        }
        TokenKind::LParen => {
            s.advance();
            let args = parse_comma_separated(s, &TokenKind::RParen)?;
            s.expect(&TokenKind::RParen)?;
            let args_node = Node::new(NodeKind::Args, line, col).with_children(args);
            Ok(Node::with_token(NodeKind::FuncCall, name, line, col).with_children(vec![args_node]))
        }
        TokenKind::Dot => {
            s.advance();
            let (member, mline, mcol) = s.expect_ident()?;
            let member_leaf = Node::with_token(NodeKind::Var, member, mline, mcol);
            if matches!(s.kind(), TokenKind::LParen) {
                s.advance();
                let args = parse_comma_separated(s, &TokenKind::RParen)?;
                s.expect(&TokenKind::RParen)?;
                let args_node = Node::new(NodeKind::Args, line, col).with_children(args);
                Ok(
                    Node::with_token(NodeKind::ModuleFuncCall, name, line, col)
                        .with_children(vec![member_leaf, args_node]),
                )
            } else {
                Ok(
                    Node::with_token(NodeKind::ModuleVar, name, line, col)
                        .with_children(vec![member_leaf]),
                )
            }
        }
        _ => Ok(Node::with_token(NodeKind::Var, name, line, col)),
    }
}

// ---- parse-result cache ----

#[derive(Clone)]
enum CachedParse {
    Ok(Rc<Node>),
    Incomplete,
    Err(AsteriskError),
}

/// A small cache of parse results keyed by exact source text, mirroring an
/// `lru_cache(maxsize=256)` wrapper around the parser. Explicitly
/// invalidatable via [`ParseCache::clear`].
pub struct ParseCache {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, CachedParse>,
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        ParseCache {
            capacity,
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let k = self.order.remove(pos).unwrap();
            self.order.push_back(k);
        }
    }

    fn insert(&mut self, key: String, value: CachedParse) {
        if !self.entries.contains_key(&key) {
            if self.order.len() >= self.capacity {
                if let Some(evicted) = self.order.pop_front() {
                    self.entries.remove(&evicted);
                }
            }
            self.order.push_back(key.clone());
        }
        self.entries.insert(key, value);
    }

    /// Parses `src`, serving a cached result when available.
    pub fn parse(&mut self, src: &str) -> Result<Rc<Node>, AsteriskError> {
        if let Some(cached) = self.entries.get(src).cloned() {
            self.touch(src);
            return match cached {
                CachedParse::Ok(node) => Ok(node),
                CachedParse::Incomplete => Err(AsteriskError::SyntaxError {
                    line: 0,
                    col: 0,
                    message: "incomplete input".to_string(),
                    excerpt: String::new(),
                }),
                CachedParse::Err(e) => Err(e),
            };
        }

        match parse_inner(src) {
            Ok(node) => {
                let rc = Rc::new(node);
                self.insert(src.to_string(), CachedParse::Ok(rc.clone()));
                Ok(rc)
            }
            Err(pe) => {
                let cached = if pe.at_eof {
                    CachedParse::Incomplete
                } else {
                    CachedParse::Err(to_syntax_error(src, pe.clone()))
                };
                self.insert(src.to_string(), cached);
                Err(to_syntax_error(src, pe))
            }
        }
    }

    /// Discards every cached parse result.
    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Node {
        parse(src).unwrap_or_else(|e| panic!("expected {src:?} to parse, got {e}"))
    }

    #[test]
    fn parses_arithmetic_with_precedence() {
        let tree = parse_ok("1 + 2 * 3");
        let stmt = &tree.children[0];
        assert_eq!(stmt.kind, NodeKind::Add);
        assert_eq!(stmt.children[1].kind, NodeKind::Mul);
    }

    #[test]
    fn parses_assignment() {
        let tree = parse_ok("x = 10");
        assert_eq!(tree.children[0].kind, NodeKind::AssignVar);
        assert_eq!(tree.children[0].token.as_deref(), Some("x"));
    }

    #[test]
    fn parses_indexed_assignment() {
        let tree = parse_ok("xs[1] = 9");
        let stmt = &tree.children[0];
        assert_eq!(stmt.kind, NodeKind::AssignIndex);
        assert_eq!(stmt.children.len(), 2);
    }

    #[test]
    fn tuple_grouping_and_literal_disambiguation() {
        assert_eq!(parse_ok("()").children[0].kind, NodeKind::TupleEmpty);
        assert_eq!(parse_ok("(1)").children[0].kind, NodeKind::Grouped);
        let one_tuple = parse_ok("(1,)");
        assert_eq!(one_tuple.children[0].kind, NodeKind::TupleLiteral);
        assert_eq!(one_tuple.children[0].children.len(), 1);
        let multi = parse_ok("(1, 2, 3)");
        assert_eq!(multi.children[0].kind, NodeKind::TupleLiteral);
        assert_eq!(multi.children[0].children.len(), 3);
    }

    #[test]
    fn parses_function_definition_and_call() {
        let tree = parse_ok("fn add(a, b) { return a + b } add(1, 2)");
        assert_eq!(tree.children[0].kind, NodeKind::FuncDef);
        assert_eq!(tree.children[0].children[0].kind, NodeKind::Params);
        assert_eq!(tree.children[1].kind, NodeKind::FuncCall);
    }

    #[test]
    fn parses_if_elseif_else_chain() {
        let tree = parse_ok("if a { 1 } elseif b { 2 } else { 3 }");
        let if_stmt = &tree.children[0];
        assert_eq!(if_stmt.kind, NodeKind::IfStmt);
        assert_eq!(if_stmt.children[2].kind, NodeKind::ElseifClause);
        assert_eq!(if_stmt.children[3].kind, NodeKind::Block);
    }

    #[test]
    fn parses_module_access_and_call() {
        let tree = parse_ok("u.greet(\"world\")");
        assert_eq!(tree.children[0].kind, NodeKind::ModuleFuncCall);
        assert_eq!(tree.children[0].token.as_deref(), Some("u"));
    }

    #[test]
    fn detects_incomplete_vs_hard_error() {
        assert!(is_incomplete("fn f(a, b) {"));
        assert!(!is_incomplete("fn f(a, b) { } }"));
    }

    #[test]
    fn syntax_error_reports_line_and_column() {
        let err = parse("x = ").unwrap_err();
        match err {
            AsteriskError::SyntaxError { line, .. } => assert_eq!(line, 1),
            other => panic!("expected SyntaxError, got {other}"),
        }
    }

    #[test]
    fn cache_serves_repeated_parses() {
        let mut cache = ParseCache::new(4);
        let a = cache.parse("1 + 1").unwrap();
        let b = cache.parse("1 + 1").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
