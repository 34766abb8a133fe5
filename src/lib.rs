//! Predicate compiler for entity schemas
//!
//! Compiles two kinds of criteria into typed predicate trees
//! ([`Operation`]) over a schema described by a [`SchemaProvider`]:
//!
//! - structural criteria: nested JSON maps of fields and operators
//!   ([`StructuralConverter`], plus [`OrderByConverter`] for sort keys)
//! - the textual operation language, e.g.
//!   `this.age > 18 & this.orders.exists(this.total >= 100.0)`
//!   ([`OperationCompiler`])
//!
//! ```
//! use octofhir_predicate_compiler::{OperationCompiler, InMemorySchema};
//! use octofhir_predicate_compiler::model::{Attribute, EntityType, ValueType};
//!
//! let schema = InMemorySchema::builder()
//!     .entity(EntityType::new("Person").with_attribute(Attribute::new("age", ValueType::Integer)))
//!     .build()
//!     .unwrap();
//! let operation = OperationCompiler::new(&schema)
//!     .compile("Person", "this.age >= 18")
//!     .unwrap();
//! assert_eq!(operation.to_string(), "this.age >= 18");
//! ```

pub mod ast;
pub mod compiler;
pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod operation;
pub mod parser;
pub mod registry;
pub mod resolver;

// Re-export main types
pub use compiler::OperationCompiler;
pub use config::{CompilerConfig, ConfigError};
pub use convert::{Direction, OrderBy, OrderByConverter, StructuralConverter};
pub use error::{CompileError, CompileResult, ErrorKind, ErrorLocation, SourceExcerpt};
pub use model::{InMemorySchema, SchemaDocument, SchemaError, SchemaProvider};
pub use operation::{ComparisonOperator, Operation};
pub use parser::{ParseError, parse};
