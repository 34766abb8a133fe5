//! Schema model consumed by the compilers
//!
//! Entity types, their typed attributes and relationships, the
//! [`SchemaProvider`] trait compilers read through, and JSON schema documents.

pub mod provider;
pub mod schema;
pub mod types;

pub use provider::{InMemorySchema, InMemorySchemaBuilder, SchemaProvider};
pub use schema::{SchemaDocument, SchemaError};
pub use types::{Attribute, Cardinality, EntityType, Relationship, ValueType, simple_name};
