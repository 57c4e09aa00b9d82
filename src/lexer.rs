// ABOUTME: Streaming lexer turning a character source into positioned tokens plus diagnostics

use crate::config::{
    MAX_COMMENT_LENGTH, MAX_IDENTIFIER_LENGTH, MAX_NUMBER_LENGTH, MAX_STRING_LITERAL_LENGTH,
};
use crate::error::LexicalError;
use crate::token::{keyword_kind, Position, Token, TokenKind, TokenPayload};

/// Indexes into a precomputed `{char, position}` table so peeking and the single-character
/// push-back the lexer needs are both O(1) without re-walking the source for line/column math.
struct Cursor {
    chars: Vec<char>,
    positions: Vec<Position>,
    idx: usize,
    eof_position: Position,
}

impl Cursor {
    fn new(source: &str) -> Self {
        let mut chars = Vec::new();
        let mut positions = Vec::new();
        let mut line = 1usize;
        let mut column = 1usize;
        for c in source.chars() {
            chars.push(c);
            positions.push(Position::new(line, column));
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Cursor {
            chars,
            positions,
            idx: 0,
            eof_position: Position::new(line, column),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn position(&self) -> Position {
        self.positions.get(self.idx).copied().unwrap_or(self.eof_position)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        Some(c)
    }

    /// Pushes the most recently consumed character back. The lexer never needs more than one.
    fn pushback(&mut self) {
        if self.idx > 0 {
            self.idx -= 1;
        }
    }
}

pub struct Lexer {
    cursor: Cursor,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            cursor: Cursor::new(source),
        }
    }

    pub fn current_position(&self) -> Position {
        self.cursor.position()
    }

    /// Snapshots the cursor so the parser can speculatively parse and roll back. Used only for
    /// the one genuinely ambiguous production (a function literal's parameter list vs. a
    /// parenthesised func_expression), not as a general backtracking facility.
    pub fn mark(&self) -> usize {
        self.cursor.idx
    }

    pub fn reset(&mut self, mark: usize) {
        self.cursor.idx = mark;
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.cursor.peek(), Some(c) if c.is_whitespace()) {
            self.cursor.advance();
        }
    }

    /// Consumes one whitespace-skipped token, returning it together with whatever diagnostics
    /// were raised while producing it. May return a `Comment` token; skipping comments
    /// transparently is the parser's job, not the lexer's.
    pub fn next_token(&mut self) -> (Token, Vec<LexicalError>) {
        self.skip_whitespace();
        let position = self.cursor.position();
        match self.cursor.peek() {
            None => (Token::simple(TokenKind::EndOfFile, position), Vec::new()),
            Some('#') => {
                self.cursor.advance();
                self.lex_comment(position)
            }
            Some(c) if c.is_ascii_digit() => self.lex_number(position),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.lex_word(position),
            Some('"') => {
                self.cursor.advance();
                self.lex_string(position)
            }
            Some(c) => {
                self.cursor.advance();
                self.lex_operator(c, position)
            }
        }
    }

    /// Drains the stream, producing the full token list followed by a terminating `EndOfFile`
    /// (unless a terminating diagnostic stopped token production first).
    pub fn tokenize_all(&mut self) -> (Vec<Token>, Vec<LexicalError>) {
        let mut tokens = Vec::new();
        let mut diagnostics = Vec::new();
        loop {
            let (token, diags) = self.next_token();
            let terminated = diags.iter().any(LexicalError::terminating);
            let is_eof = token.kind == TokenKind::EndOfFile;
            diagnostics.extend(diags);
            tokens.push(token);
            if terminated || is_eof {
                break;
            }
        }
        (tokens, diagnostics)
    }

    fn lex_comment(&mut self, position: Position) -> (Token, Vec<LexicalError>) {
        let mut len: usize = 0;
        let mut diagnostics = Vec::new();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => break,
                Some(_) => {
                    self.cursor.advance();
                    len += 1;
                    if len > MAX_COMMENT_LENGTH {
                        diagnostics.push(LexicalError::CommentTooLong { position });
                        break;
                    }
                }
            }
        }
        (Token::simple(TokenKind::Comment, position), diagnostics)
    }

    fn lex_number(&mut self, position: Position) -> (Token, Vec<LexicalError>) {
        let mut raw = String::new();
        let mut has_dot = false;
        let mut too_long = false;
        while let Some(c) = self.cursor.peek() {
            if c.is_ascii_digit() {
                self.cursor.advance();
                raw.push(c);
            } else if c == '.' && !has_dot {
                has_dot = true;
                self.cursor.advance();
                raw.push(c);
            } else {
                break;
            }
            if raw.len() > MAX_NUMBER_LENGTH {
                too_long = true;
                break;
            }
        }

        if too_long {
            return (
                Token::new(TokenKind::Unrecognized, position, TokenPayload::Text(raw)),
                vec![LexicalError::NumberTooLong { position }],
            );
        }

        let leading_zero_invalid =
            raw.len() > 1 && raw.starts_with('0') && raw.as_bytes().get(1) != Some(&b'.');
        if leading_zero_invalid {
            return (
                Token::new(TokenKind::Unrecognized, position, TokenPayload::Text(raw)),
                vec![LexicalError::InvalidNumber { position }],
            );
        }

        if has_dot {
            match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => (
                    Token::new(TokenKind::Float, position, TokenPayload::Float(value)),
                    Vec::new(),
                ),
                _ => (
                    Token::new(TokenKind::Unrecognized, position, TokenPayload::Text(raw)),
                    vec![LexicalError::FloatOverflow { position }],
                ),
            }
        } else {
            match raw.parse::<i64>() {
                Ok(value) => (
                    Token::new(TokenKind::Integer, position, TokenPayload::Integer(value)),
                    Vec::new(),
                ),
                Err(_) => (
                    Token::new(TokenKind::Unrecognized, position, TokenPayload::Text(raw)),
                    vec![LexicalError::IntegerOverflow { position }],
                ),
            }
        }
    }

    fn lex_word(&mut self, position: Position) -> (Token, Vec<LexicalError>) {
        let mut raw = String::new();
        while let Some(c) = self.cursor.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.cursor.advance();
                raw.push(c);
            } else {
                break;
            }
            if raw.len() > MAX_IDENTIFIER_LENGTH {
                return (
                    Token::new(TokenKind::Unrecognized, position, TokenPayload::Text(raw)),
                    vec![LexicalError::IdentifierTooLong { position }],
                );
            }
        }

        if let Some(kind) = keyword_kind(&raw) {
            let token = match kind {
                TokenKind::Boolean => Token::new(
                    TokenKind::Boolean,
                    position,
                    TokenPayload::Boolean(raw == "true"),
                ),
                other => Token::simple(other, position),
            };
            return (token, Vec::new());
        }

        (
            Token::new(TokenKind::Identifier, position, TokenPayload::Text(raw)),
            Vec::new(),
        )
    }

    fn lex_operator(&mut self, first: char, position: Position) -> (Token, Vec<LexicalError>) {
        if let Some(second) = self.cursor.advance() {
            if let Some(kind) = two_char_kind(first, second) {
                return (Token::simple(kind, position), Vec::new());
            }
            self.cursor.pushback();
        }
        match single_char_kind(first) {
            Some(kind) => (Token::simple(kind, position), Vec::new()),
            None => (
                Token::new(
                    TokenKind::Unrecognized,
                    position,
                    TokenPayload::Text(first.to_string()),
                ),
                vec![LexicalError::UnrecognizedSymbol { position }],
            ),
        }
    }

    fn lex_string(&mut self, position: Position) -> (Token, Vec<LexicalError>) {
        let mut content = String::new();
        let mut diagnostics = Vec::new();
        let mut raw_len: usize = 1; // opening quote

        loop {
            match self.cursor.advance() {
                None => {
                    diagnostics.push(LexicalError::IncompleteStringLiteral { position });
                    return (
                        Token::new(
                            TokenKind::Unrecognized,
                            position,
                            TokenPayload::Text(content),
                        ),
                        diagnostics,
                    );
                }
                Some('"') => {
                    return (
                        Token::new(TokenKind::String, position, TokenPayload::Text(content)),
                        diagnostics,
                    );
                }
                Some('\\') => {
                    raw_len += 1;
                    match self.cursor.advance() {
                        None => {
                            diagnostics.push(LexicalError::IncompleteStringLiteral { position });
                            return (
                                Token::new(
                                    TokenKind::Unrecognized,
                                    position,
                                    TokenPayload::Text(content),
                                ),
                                diagnostics,
                            );
                        }
                        Some(escaped) => {
                            raw_len += 1;
                            if !matches!(escaped, '"' | '\\' | 'n' | 't') {
                                diagnostics
                                    .push(LexicalError::InvalidEscapeSequence { position });
                            }
                            content.push('\\');
                            content.push(escaped);
                        }
                    }
                }
                Some(c) => {
                    raw_len += 1;
                    content.push(c);
                }
            }

            if raw_len > MAX_STRING_LITERAL_LENGTH {
                diagnostics.push(LexicalError::StringLiteralTooLong { position });
                return (
                    Token::new(
                        TokenKind::Unrecognized,
                        position,
                        TokenPayload::Text(content),
                    ),
                    diagnostics,
                );
            }
        }
    }
}

fn two_char_kind(first: char, second: char) -> Option<TokenKind> {
    Some(match (first, second) {
        ('&', '&') => TokenKind::LogicalAnd,
        ('|', '|') => TokenKind::LogicalOr,
        ('=', '=') => TokenKind::Equal,
        ('!', '=') => TokenKind::NotEqual,
        ('<', '=') => TokenKind::LessEqual,
        ('>', '=') => TokenKind::GreaterEqual,
        ('+', '=') => TokenKind::PlusAssign,
        ('-', '=') => TokenKind::MinusAssign,
        ('*', '=') => TokenKind::AsteriskAssign,
        ('/', '=') => TokenKind::SlashAssign,
        ('&', '=') => TokenKind::AndAssign,
        ('|', '=') => TokenKind::OrAssign,
        ('<', '<') => TokenKind::FunctionBind,
        ('>', '>') => TokenKind::FunctionCompose,
        _ => return None,
    })
}

fn single_char_kind(c: char) -> Option<TokenKind> {
    Some(match c {
        ';' => TokenKind::Semicolon,
        ',' => TokenKind::Comma,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '[' => TokenKind::LSquare,
        ']' => TokenKind::RSquare,
        '=' => TokenKind::Assign,
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Asterisk,
        '/' => TokenKind::Slash,
        '!' => TokenKind::LogicalNot,
        '<' => TokenKind::Less,
        '>' => TokenKind::Greater,
        _ => return None,
    })
}
