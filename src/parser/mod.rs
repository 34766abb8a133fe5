//! Operation-language parser
//!
//! Source text is tokenized with nom and then parsed by recursive descent
//! into the spanned parse tree of [`crate::ast`].

#![warn(missing_docs)]

pub mod error;
pub mod parser;
pub mod span;
pub mod tokenizer;

pub use error::{ParseError, ParseResult};
pub use parser::parse_operation;
pub use span::{Span, Spanned};
pub use tokenizer::{Token, tokenize};

use crate::ast::CompositeOperation;
use crate::config::CompilerConfig;

/// Parse operation-language source with the default nesting limit
pub fn parse(input: &str) -> ParseResult<Spanned<CompositeOperation>> {
    parse_operation(input, CompilerConfig::default().max_depth)
}
