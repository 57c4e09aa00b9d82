// ABOUTME: Configuration and constants for the interpreter

pub const VERSION: &str = "1.0.0";

/// Identifiers longer than this are rejected with a terminating `IdentifierTooLong`.
pub const MAX_IDENTIFIER_LENGTH: usize = 45;

/// Comment bodies longer than this are rejected with a terminating `CommentTooLong`.
pub const MAX_COMMENT_LENGTH: usize = 500;

/// String literals longer than this (including the opening quote) are rejected with a
/// terminating `StringLiteralTooLong`.
pub const MAX_STRING_LITERAL_LENGTH: usize = 300;

/// Number literals longer than this are rejected with a terminating `NumberTooLong`.
pub const MAX_NUMBER_LENGTH: usize = 45;

/// The reserved name of the program's entry-point function.
pub const ENTRY_FUNCTION_NAME: &str = "Main";
