//! Grammar-based compiler for the operation language
//!
//! [`OperationCompiler`] turns operation-language source into a predicate
//! tree, resolving names against a [`crate::model::SchemaProvider`].

pub mod compiler;

pub use compiler::OperationCompiler;
