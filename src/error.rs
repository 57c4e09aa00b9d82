// ABOUTME: Diagnostic types for the lexer, parser, and interpreter

use crate::token::Position;
use thiserror::Error;

/// One of the ten lexical diagnostic kinds, each carrying the position it was raised at.
/// `terminating()` reports whether it stops further token production.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexicalError {
    #[error("integer literal overflowed the host integer type")]
    IntegerOverflow { position: Position },

    #[error("float literal overflowed the host float type")]
    FloatOverflow { position: Position },

    #[error("number literal exceeds the maximum length")]
    NumberTooLong { position: Position },

    #[error("identifier exceeds the maximum length")]
    IdentifierTooLong { position: Position },

    #[error("comment exceeds the maximum length")]
    CommentTooLong { position: Position },

    #[error("string literal exceeds the maximum length")]
    StringLiteralTooLong { position: Position },

    #[error("numeric literal has a leading zero")]
    InvalidNumber { position: Position },

    #[error("unrecognized escape sequence in string literal")]
    InvalidEscapeSequence { position: Position },

    #[error("string literal was not closed before end of input")]
    IncompleteStringLiteral { position: Position },

    #[error("unrecognized symbol")]
    UnrecognizedSymbol { position: Position },
}

impl LexicalError {
    pub fn position(&self) -> Position {
        use LexicalError::*;
        match self {
            IntegerOverflow { position }
            | FloatOverflow { position }
            | NumberTooLong { position }
            | IdentifierTooLong { position }
            | CommentTooLong { position }
            | StringLiteralTooLong { position }
            | InvalidNumber { position }
            | InvalidEscapeSequence { position }
            | IncompleteStringLiteral { position }
            | UnrecognizedSymbol { position } => *position,
        }
    }

    /// Whether this diagnostic stops further tokenization, per the lexer's diagnostic taxonomy.
    pub fn terminating(&self) -> bool {
        matches!(
            self,
            LexicalError::NumberTooLong { .. }
                | LexicalError::IdentifierTooLong { .. }
                | LexicalError::CommentTooLong { .. }
                | LexicalError::StringLiteralTooLong { .. }
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            LexicalError::IntegerOverflow { .. } => "IntegerOverflow",
            LexicalError::FloatOverflow { .. } => "FloatOverflow",
            LexicalError::NumberTooLong { .. } => "NumberTooLong",
            LexicalError::IdentifierTooLong { .. } => "IdentifierTooLong",
            LexicalError::CommentTooLong { .. } => "CommentTooLong",
            LexicalError::StringLiteralTooLong { .. } => "StringLiteralTooLong",
            LexicalError::InvalidNumber { .. } => "InvalidNumber",
            LexicalError::InvalidEscapeSequence { .. } => "InvalidEscapeSequence",
            LexicalError::IncompleteStringLiteral { .. } => "IncompleteStringLiteral",
            LexicalError::UnrecognizedSymbol { .. } => "UnrecognizedSymbol",
        }
    }
}

/// Syntactic diagnostics: raised by parser productions that have already committed
/// (a keyword or structural token was consumed before the failure was discovered).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntacticError {
    #[error("expected {expected}")]
    Expected {
        expected: String,
        position: Position,
    },

    #[error("{0}")]
    Lexical(#[from] LexicalError),
}

impl SyntacticError {
    pub fn position(&self) -> Position {
        match self {
            SyntacticError::Expected { position, .. } => *position,
            SyntacticError::Lexical(inner) => inner.position(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SyntacticError::Lexical(inner) => inner.kind_name(),
            _ => "Syntax",
        }
    }
}

/// Fatal interpreter diagnostics. All of these unwind the interpreter; there is no recovery.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("entry function \"Main\" was not found")]
    MainNotFound,

    #[error("function \"{name}\" expected {expected} argument(s), got {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
        position: Position,
    },

    #[error("unknown identifier \"{name}\"")]
    UnknownIdentifier { name: String, position: Position },

    #[error("variable \"{name}\" is used before it is initialized")]
    UninitializedVariable { name: String, position: Position },

    #[error("variable \"{name}\" is already declared in this scope chain")]
    RedeclaredVariable { name: String, position: Position },

    #[error("\"{name}\" clashes with an existing function name")]
    NameClashWithFunction { name: String, position: Position },

    #[error("cannot assign to immutable variable \"{name}\"")]
    AssignmentToImmutable { name: String, position: Position },

    #[error("value could not be coerced for operator \"{operator}\"")]
    TypeNotCoercible { operator: String, position: Position },

    #[error("division by zero")]
    DivisionByZero { position: Position },

    #[error("right-hand side of \">>\" must have exactly one parameter")]
    FunctionComposeArity { position: Position },

    #[error("\"<<\" can only bind arguments onto a function value")]
    FunctionBindOnNonFunction { position: Position },

    #[error("function must return a value")]
    ReturnValueRequired { position: Position },

    #[error("function returned no value where one was expected")]
    ReturnedNoValueWhereExpected { position: Position },

    #[error("unknown operator \"{operator}\"")]
    UnknownOperator { operator: String, position: Position },
}

impl SemanticError {
    pub fn position(&self) -> Position {
        use SemanticError::*;
        match self {
            MainNotFound => Position::start(),
            ArityMismatch { position, .. }
            | UnknownIdentifier { position, .. }
            | UninitializedVariable { position, .. }
            | RedeclaredVariable { position, .. }
            | NameClashWithFunction { position, .. }
            | AssignmentToImmutable { position, .. }
            | TypeNotCoercible { position, .. }
            | DivisionByZero { position }
            | FunctionComposeArity { position }
            | FunctionBindOnNonFunction { position }
            | ReturnValueRequired { position }
            | ReturnedNoValueWhereExpected { position }
            | UnknownOperator { position, .. } => *position,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SemanticError::MainNotFound => "MainNotFound",
            SemanticError::ArityMismatch { .. } => "ArityMismatch",
            SemanticError::UnknownIdentifier { .. } => "UnknownIdentifier",
            SemanticError::UninitializedVariable { .. } => "UninitializedVariable",
            SemanticError::RedeclaredVariable { .. } => "RedeclaredVariable",
            SemanticError::NameClashWithFunction { .. } => "NameClashWithFunction",
            SemanticError::AssignmentToImmutable { .. } => "AssignmentToImmutable",
            SemanticError::TypeNotCoercible { .. } => "TypeNotCoercible",
            SemanticError::DivisionByZero { .. } => "DivisionByZero",
            SemanticError::FunctionComposeArity { .. } => "FunctionComposeArity",
            SemanticError::FunctionBindOnNonFunction { .. } => "FunctionBindOnNonFunction",
            SemanticError::ReturnValueRequired { .. } => "ReturnValueRequired",
            SemanticError::ReturnedNoValueWhereExpected { .. } => "ReturnedNoValueWhereExpected",
            SemanticError::UnknownOperator { .. } => "UnknownOperator",
        }
    }
}

/// Renders any of the three taxonomies as `"<kind> Error [line: L, column: C] <message>"`.
pub trait Diagnostic {
    fn kind_name(&self) -> &'static str;
    fn position(&self) -> Position;
    fn message(&self) -> String;

    fn render(&self) -> String {
        format!(
            "{} Error [{}] {}",
            self.kind_name(),
            self.position(),
            self.message()
        )
    }
}

impl Diagnostic for LexicalError {
    fn kind_name(&self) -> &'static str {
        LexicalError::kind_name(self)
    }
    fn position(&self) -> Position {
        LexicalError::position(self)
    }
    fn message(&self) -> String {
        self.to_string()
    }
}

impl Diagnostic for SyntacticError {
    fn kind_name(&self) -> &'static str {
        SyntacticError::kind_name(self)
    }
    fn position(&self) -> Position {
        SyntacticError::position(self)
    }
    fn message(&self) -> String {
        self.to_string()
    }
}

impl Diagnostic for SemanticError {
    fn kind_name(&self) -> &'static str {
        SemanticError::kind_name(self)
    }
    fn position(&self) -> Position {
        SemanticError::position(self)
    }
    fn message(&self) -> String {
        self.to_string()
    }
}

/// Top-level error the CLI matches on to decide the process exit code.
#[derive(Error, Debug)]
pub enum InterpreterError {
    #[error("could not open source file: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Lexical(#[from] LexicalError),

    #[error("{0}")]
    Syntactic(#[from] SyntacticError),

    #[error("{0}")]
    Semantic(#[from] SemanticError),
}
