// ABOUTME: Tokenizer turning source text into a position-tagged token stream

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, none_of, one_of},
    combinator::{opt, recognize},
    multi::many0,
    sequence::pair,
    IResult, Parser,
};

use crate::error::AsteriskError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Int(String),
    Float(String),
    Str(String),
    Ident(String),
    True,
    False,
    Fn,
    If,
    Elseif,
    Else,
    While,
    For,
    In,
    Break,
    Continue,
    Return,
    Import,
    As,
    And,
    Or,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Semicolon,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

fn keyword_or_ident(word: &str) -> TokenKind {
    match word {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "fn" => TokenKind::Fn,
        "if" => TokenKind::If,
        "elseif" => TokenKind::Elseif,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "return" => TokenKind::Return,
        "import" => TokenKind::Import,
        "as" => TokenKind::As,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        other => TokenKind::Ident(other.to_string()),
    }
}

fn lex_number(input: &str) -> IResult<&str, TokenKind> {
    let int_part = recognize(digit1);
    let frac_part = recognize(pair(char('.'), digit1));
    let exp_part = recognize((one_of("eE"), opt(one_of("+-")), digit1));
    recognize((int_part, opt(frac_part), opt(exp_part)))
        .map(|lexeme: &str| {
            if lexeme.contains(['.', 'e', 'E']) {
                TokenKind::Float(lexeme.to_string())
            } else {
                TokenKind::Int(lexeme.to_string())
            }
        })
        .parse(input)
}

fn lex_ident(input: &str) -> IResult<&str, TokenKind> {
    recognize(pair(
        one_of("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_"),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .map(keyword_or_ident)
    .parse(input)
}

/// Parses a double-quoted string literal body, processing the escape
/// sequences spec.md names: `\n \t \\ \" \xHH \u{HHHH}`.
fn lex_string(input: &str) -> IResult<&str, TokenKind> {
    let (input, _) = char('"')(input)?;
    let mut rest = input;
    let mut out = String::new();
    loop {
        if let Some(stripped) = rest.strip_prefix('"') {
            return Ok((stripped, TokenKind::Str(out)));
        }
        if rest.is_empty() {
            return Err(nom::Err::Error(nom::error::Error::new(
                rest,
                nom::error::ErrorKind::Eof,
            )));
        }
        if let Some(stripped) = rest.strip_prefix('\\') {
            let mut chars = stripped.chars();
            let escaped = chars.next().ok_or_else(|| {
                nom::Err::Error(nom::error::Error::new(rest, nom::error::ErrorKind::Eof))
            })?;
            match escaped {
                'n' => {
                    out.push('\n');
                    rest = chars.as_str();
                }
                't' => {
                    out.push('\t');
                    rest = chars.as_str();
                }
                'r' => {
                    out.push('\r');
                    rest = chars.as_str();
                }
                '\\' => {
                    out.push('\\');
                    rest = chars.as_str();
                }
                '"' => {
                    out.push('"');
                    rest = chars.as_str();
                }
                '0' => {
                    out.push('\0');
                    rest = chars.as_str();
                }
                'x' => {
                    let hex: String = chars.as_str().chars().take(2).collect();
                    let byte = u8::from_str_radix(&hex, 16).map_err(|_| {
                        nom::Err::Error(nom::error::Error::new(rest, nom::error::ErrorKind::HexDigit))
                    })?;
                    out.push(byte as char);
                    rest = &chars.as_str()[hex.len()..];
                }
                'u' => {
                    let after_u = chars.as_str();
                    let body = after_u.strip_prefix('{').ok_or_else(|| {
                        nom::Err::Error(nom::error::Error::new(rest, nom::error::ErrorKind::Char))
                    })?;
                    let end = body.find('}').ok_or_else(|| {
                        nom::Err::Error(nom::error::Error::new(rest, nom::error::ErrorKind::Char))
                    })?;
                    let hex = &body[..end];
                    let code = u32::from_str_radix(hex, 16).map_err(|_| {
                        nom::Err::Error(nom::error::Error::new(rest, nom::error::ErrorKind::HexDigit))
                    })?;
                    let ch = char::from_u32(code).ok_or_else(|| {
                        nom::Err::Error(nom::error::Error::new(rest, nom::error::ErrorKind::Char))
                    })?;
                    out.push(ch);
                    rest = &body[end + 1..];
                }
                other => {
                    out.push(other);
                    rest = chars.as_str();
                }
            }
            continue;
        }
        let mut chars = rest.chars();
        let c = chars.next().unwrap();
        out.push(c);
        rest = chars.as_str();
    }
}

fn lex_symbol(input: &str) -> IResult<&str, TokenKind> {
    alt((
        tag("==").map(|_| TokenKind::Eq),
        tag("!=").map(|_| TokenKind::Ne),
        tag("<=").map(|_| TokenKind::Le),
        tag(">=").map(|_| TokenKind::Ge),
        char('<').map(|_| TokenKind::Lt),
        char('>').map(|_| TokenKind::Gt),
        char('=').map(|_| TokenKind::Assign),
        char('+').map(|_| TokenKind::Plus),
        char('-').map(|_| TokenKind::Minus),
        char('*').map(|_| TokenKind::Star),
        char('/').map(|_| TokenKind::Slash),
        char('(').map(|_| TokenKind::LParen),
        char(')').map(|_| TokenKind::RParen),
        char('[').map(|_| TokenKind::LBracket),
        char(']').map(|_| TokenKind::RBracket),
        char('{').map(|_| TokenKind::LBrace),
        char('}').map(|_| TokenKind::RBrace),
        char(',').map(|_| TokenKind::Comma),
        char(':').map(|_| TokenKind::Colon),
        char('.').map(|_| TokenKind::Dot),
        char(';').map(|_| TokenKind::Semicolon),
    ))
    .parse(input)
}

fn lex_one(input: &str) -> IResult<&str, TokenKind> {
    alt((lex_number, lex_string, lex_ident, lex_symbol)).parse(input)
}

fn is_line_ws(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

/// Tokenizes `src` into a token stream terminated by `Eof`, tracking 1-based
/// line and column for every token (used by syntax-error reporting).
pub fn tokenize(src: &str) -> Result<Vec<Token>, AsteriskError> {
    let mut tokens = Vec::new();
    let mut line = 1usize;
    let mut col = 1usize;
    let mut rest = src;

    loop {
        // Skip whitespace and newlines, tracking position.
        loop {
            if let Ok((after, ws)) = take_while1::<_, _, nom::error::Error<&str>>(is_line_ws)(rest)
            {
                col += ws.chars().count();
                rest = after;
                continue;
            }
            if let Some(after) = rest.strip_prefix('\n') {
                line += 1;
                col = 1;
                rest = after;
                continue;
            }
            if let Some(after) = rest.strip_prefix('#') {
                let (after, comment) =
                    take_while::<_, _, nom::error::Error<&str>>(|c: char| c != '\n')(after)
                        .unwrap_or((after, ""));
                col += 1 + comment.chars().count();
                rest = after;
                continue;
            }
            break;
        }

        if rest.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Eof,
                line,
                col,
            });
            return Ok(tokens);
        }

        let start_line = line;
        let start_col = col;
        match lex_one(rest) {
            Ok((after, kind)) => {
                let consumed = &rest[..rest.len() - after.len()];
                if let TokenKind::Str(_) = &kind {
                    for c in consumed.chars() {
                        if c == '\n' {
                            line += 1;
                            col = 1;
                        } else {
                            col += 1;
                        }
                    }
                } else {
                    col += consumed.chars().count();
                }
                tokens.push(Token {
                    kind,
                    line: start_line,
                    col: start_col,
                });
                rest = after;
            }
            Err(_) => {
                let bad = rest.chars().next().unwrap_or('?');
                return Err(AsteriskError::SyntaxError {
                    line: start_line,
                    col: start_col,
                    message: format!("unexpected character '{bad}'"),
                    excerpt: render_excerpt(src, start_line, start_col),
                });
            }
        }
    }
}

/// Renders a caret-annotated excerpt of the offending source line.
pub fn render_excerpt(src: &str, line: usize, col: usize) -> String {
    let line_text = src.lines().nth(line.saturating_sub(1)).unwrap_or("");
    let caret_offset = col.saturating_sub(1);
    let caret_line = format!("{}{}", " ".repeat(caret_offset), "^");
    format!("{line_text}\n{caret_line}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenizes_integer_and_float() {
        assert_eq!(
            kinds("42 3.14 1e3"),
            vec![
                TokenKind::Int("42".into()),
                TokenKind::Float("3.14".into()),
                TokenKind::Float("1e3".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn tokenizes_string_escapes() {
        let tokens = kinds(r#""a\nb""#);
        assert_eq!(tokens[0], TokenKind::Str("a\nb".to_string()));
    }

    #[test]
    fn keywords_are_distinguished_from_identifiers() {
        assert_eq!(kinds("fn foo")[0], TokenKind::Fn);
        assert_eq!(kinds("fn foo")[1], TokenKind::Ident("foo".to_string()));
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("x = 1\ny = 2").unwrap();
        let y_token = tokens.iter().find(|t| matches!(&t.kind, TokenKind::Ident(n) if n == "y")).unwrap();
        assert_eq!(y_token.line, 2);
        assert_eq!(y_token.col, 1);
    }

    #[test]
    fn equals_and_equality_are_distinct() {
        assert_eq!(kinds("= =="), vec![TokenKind::Assign, TokenKind::Eq, TokenKind::Eof]);
    }

    #[test]
    fn rejects_unknown_character() {
        let err = tokenize("x = 1 $ 2").unwrap_err();
        assert!(matches!(err, AsteriskError::SyntaxError { .. }));
    }
}
