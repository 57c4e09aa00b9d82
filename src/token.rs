// ABOUTME: Token and position types produced by the lexer and consumed by the parser

use std::fmt;

/// A 1-based `{line, column}` pair attached to every token, AST node, and diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn start() -> Self {
        Position { line: 1, column: 1 }
    }

    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line: {}, column: {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Integer,
    Float,
    String,
    Boolean,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LSquare,
    RSquare,
    Comma,
    Comment,
    EndOfFile,
    Unrecognized,
    Assign,
    Plus,
    Minus,
    Asterisk,
    Slash,
    LogicalNot,
    Less,
    Greater,
    LogicalAnd,
    LogicalOr,
    Equal,
    LessEqual,
    GreaterEqual,
    NotEqual,
    PlusAssign,
    MinusAssign,
    AsteriskAssign,
    SlashAssign,
    AndAssign,
    OrAssign,
    Mut,
    Var,
    While,
    If,
    Else,
    Return,
    Func,
    FunctionBind,
    FunctionCompose,
}

/// The typed payload a token carries. Must agree with `TokenKind`: `Identifier`/`String`/
/// `Unrecognized` carry `Text`, `Integer`/`Float`/`Boolean` carry their typed literal, every
/// other kind carries `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenPayload {
    None,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
    pub payload: TokenPayload,
}

impl Token {
    /// Builds a token, enforcing the kind/payload agreement invariant from the data model.
    /// Panics on mismatch: this is a lexer-internal construction error, never a user-facing one.
    pub fn new(kind: TokenKind, position: Position, payload: TokenPayload) -> Self {
        let payload_ok = match (&kind, &payload) {
            (TokenKind::Identifier, TokenPayload::Text(_)) => true,
            (TokenKind::String, TokenPayload::Text(_)) => true,
            (TokenKind::Unrecognized, TokenPayload::Text(_)) => true,
            (TokenKind::Integer, TokenPayload::Integer(_)) => true,
            (TokenKind::Float, TokenPayload::Float(_)) => true,
            (TokenKind::Boolean, TokenPayload::Boolean(_)) => true,
            (_, TokenPayload::None) => true,
            _ => false,
        };
        assert!(
            payload_ok,
            "token payload {:?} does not match kind {:?}",
            payload, kind
        );
        Token {
            kind,
            position,
            payload,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            TokenPayload::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn simple(kind: TokenKind, position: Position) -> Self {
        Token::new(kind, position, TokenPayload::None)
    }
}

/// Maps lexed words to their keyword token kind; anything absent is a plain `Identifier`.
pub fn keyword_kind(word: &str) -> Option<TokenKind> {
    Some(match word {
        "mut" => TokenKind::Mut,
        "var" => TokenKind::Var,
        "while" => TokenKind::While,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "return" => TokenKind::Return,
        "func" => TokenKind::Func,
        "true" | "false" => TokenKind::Boolean,
        _ => return None,
    })
}
