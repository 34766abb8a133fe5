//! Parser error types

use super::span::Span;
use crate::error::{CompileError, SourceExcerpt};
use nom::error::{ErrorKind, ParseError as NomParseError};
use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with the byte offset it occurred at
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A token that does not fit the grammar
    #[error("Expected {expected} but found '{token}'")]
    UnexpectedToken {
        /// The token that was found
        token: String,
        /// What the grammar allows here
        expected: String,
        /// Offset of the token
        position: usize,
        /// Length of the token in bytes
        width: usize,
    },

    /// Input ended early
    #[error("Expected {expected} but reached the end of input")]
    UnexpectedEndOfInput {
        /// What the grammar allows here
        expected: String,
        /// Offset of the end of input
        position: usize,
    },

    /// A character no token starts with
    #[error("Unexpected character '{character}'")]
    UnexpectedCharacter {
        /// The character
        character: char,
        /// Offset of the character
        position: usize,
    },

    /// A number that does not fit its type
    #[error("Invalid {literal_type} literal: {value}")]
    InvalidLiteral {
        /// Literal kind
        literal_type: String,
        /// Text as written
        value: String,
        /// Offset of the literal
        position: usize,
    },

    /// Unknown escape sequence in a string
    #[error("Invalid escape sequence: {sequence}")]
    InvalidEscape {
        /// The escape sequence
        sequence: String,
        /// Offset of the backslash
        position: usize,
    },

    /// String literal with no closing quote
    #[error("Unclosed string literal")]
    UnclosedString {
        /// Offset of the opening quote
        position: usize,
    },

    /// Operations nested past the configured limit
    #[error("Operation nested deeper than {max_depth} levels")]
    NestingTooDeep {
        /// Configured limit
        max_depth: usize,
        /// Offset where the limit was exceeded
        position: usize,
    },

    /// Generic nom error
    #[error("Parse error: {kind:?}")]
    NomError {
        /// Offset of the failure
        position: usize,
        /// The nom error kind
        kind: ErrorKind,
    },
}

impl ParseError {
    /// Byte offset of the error
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEndOfInput { position, .. }
            | ParseError::UnexpectedCharacter { position, .. }
            | ParseError::InvalidLiteral { position, .. }
            | ParseError::InvalidEscape { position, .. }
            | ParseError::UnclosedString { position }
            | ParseError::NestingTooDeep { position, .. }
            | ParseError::NomError { position, .. } => *position,
        }
    }

    /// Width in bytes of the offending text
    pub fn width(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { width, .. } => *width,
            ParseError::UnexpectedCharacter { character, .. } => character.len_utf8(),
            ParseError::InvalidLiteral { value, .. } => value.len(),
            ParseError::InvalidEscape { sequence, .. } => sequence.len(),
            _ => 1,
        }
    }

    /// Convert to a syntax error pointing into `source`
    pub fn to_compile_error(&self, source: &str) -> CompileError {
        CompileError::syntax(
            self.to_string(),
            SourceExcerpt::at(source, self.position(), self.width()),
        )
    }
}

impl<'a> NomParseError<Span<'a>> for ParseError {
    fn from_error_kind(input: Span<'a>, kind: ErrorKind) -> Self {
        let position = input.location_offset();
        match input.fragment().chars().next() {
            Some(character) => ParseError::UnexpectedCharacter {
                character,
                position,
            },
            None => ParseError::NomError { position, kind },
        }
    }

    fn append(_input: Span<'a>, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}
