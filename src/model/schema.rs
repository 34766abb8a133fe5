//! JSON schema documents

use super::provider::InMemorySchema;
use super::types::{Attribute, Cardinality, EntityType, Relationship, ValueType};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a schema
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document is not valid JSON or does not match the document shape
    #[error("Invalid schema document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document could not be read
    #[error("Could not read schema '{path}': {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// An attribute declares a value type that does not exist
    #[error("Unknown value type '{tag}' for attribute '{attribute}' on type '{type_name}'")]
    UnknownValueType {
        /// Declaring type
        type_name: String,
        /// Attribute name
        attribute: String,
        /// Offending tag
        tag: String,
    },

    /// A relationship points at a type that is not declared
    #[error("Relationship '{relationship}' on type '{type_name}' targets unknown type '{target}'")]
    UnknownTarget {
        /// Declaring type
        type_name: String,
        /// Relationship name
        relationship: String,
        /// Missing target type
        target: String,
    },

    /// Two types share a name
    #[error("Duplicate entity type '{name}'")]
    DuplicateType {
        /// Type name
        name: String,
    },

    /// A member name is declared more than once on a type
    #[error("Duplicate member '{name}' on type '{type_name}'")]
    DuplicateMember {
        /// Declaring type
        type_name: String,
        /// Member name
        name: String,
    },
}

/// Serialized form of a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Entity types
    pub types: Vec<TypeDocument>,
}

/// Serialized entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDocument {
    /// Fully qualified type name
    pub name: String,
    /// Attributes
    #[serde(default)]
    pub attributes: Vec<AttributeDocument>,
    /// Relationships
    #[serde(default)]
    pub relationships: Vec<RelationshipDocument>,
}

/// Serialized attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDocument {
    /// Attribute name
    pub name: String,
    /// Value-type tag, see [`ValueType::tag`]
    #[serde(rename = "type")]
    pub value_type: String,
    /// Nullability
    #[serde(default)]
    pub nullable: bool,
}

/// Serialized relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDocument {
    /// Relationship name
    pub name: String,
    /// Target type name
    pub target: String,
    /// To-one or to-many
    #[serde(default)]
    pub cardinality: Cardinality,
}

impl SchemaDocument {
    /// Parse a document from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a document from a file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Convert into a validated in-memory schema
    pub fn into_schema(self) -> Result<InMemorySchema, SchemaError> {
        let mut builder = InMemorySchema::builder();
        for type_document in self.types {
            let mut entity = EntityType::new(type_document.name.as_str());
            for attribute in type_document.attributes {
                let value_type = ValueType::from_tag(&attribute.value_type).ok_or_else(|| {
                    SchemaError::UnknownValueType {
                        type_name: type_document.name.clone(),
                        attribute: attribute.name.clone(),
                        tag: attribute.value_type.clone(),
                    }
                })?;
                entity = entity.with_attribute(Attribute {
                    name: attribute.name,
                    value_type,
                    nullable: attribute.nullable,
                });
            }
            for relationship in type_document.relationships {
                entity = entity.with_relationship(Relationship::new(
                    relationship.name,
                    relationship.target,
                    relationship.cardinality,
                ));
            }
            builder = builder.entity(entity);
        }
        builder.build()
    }
}

impl InMemorySchema {
    /// Load a schema from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        SchemaDocument::from_json_str(json)?.into_schema()
    }

    /// Load a schema from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        SchemaDocument::from_path(path)?.into_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SchemaProvider;
    use rstest::rstest;

    const DOCUMENT: &str = r#"{
        "types": [
            {
                "name": "com.example.Person",
                "attributes": [
                    {"name": "name", "type": "string"},
                    {"name": "born", "type": "date", "nullable": true}
                ],
                "relationships": [
                    {"name": "orders", "target": "com.example.Order", "cardinality": "many"}
                ]
            },
            {"name": "com.example.Order"}
        ]
    }"#;

    #[test]
    fn test_load_document() {
        let schema = InMemorySchema::from_json_str(DOCUMENT).unwrap();
        let born = schema.attribute_by_name("com.example.Person", "born").unwrap();
        assert_eq!(born.value_type, ValueType::Date);
        assert!(born.nullable);

        let orders = schema
            .relationship_by_name("com.example.Person", "orders")
            .unwrap();
        assert_eq!(orders.cardinality, Cardinality::Many);
    }

    #[test]
    fn test_unknown_value_type_is_rejected_at_load() {
        let json = r#"{"types": [{"name": "A", "attributes": [{"name": "x", "type": "decimal"}]}]}"#;
        let error = InMemorySchema::from_json_str(json).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Unknown value type 'decimal' for attribute 'x' on type 'A'"
        );
    }

    #[test]
    fn test_malformed_document() {
        let error = InMemorySchema::from_json_str(r#"{"types": 3}"#).unwrap_err();
        assert!(matches!(error, SchemaError::Json(_)));
    }

    #[rstest]
    #[case(
        r#"{"types": [{"name": "Person", "attributes": [
            {"name": "age", "type": "integer"},
            {"name": "age", "type": "string"}
        ]}]}"#
    )]
    #[case(
        r#"{"types": [{"name": "Person", "relationships": [
            {"name": "age", "target": "Person"},
            {"name": "age", "target": "Person", "cardinality": "many"}
        ]}]}"#
    )]
    #[case(
        r#"{"types": [{"name": "Person",
            "attributes": [{"name": "age", "type": "integer"}],
            "relationships": [{"name": "age", "target": "Person"}]
        }]}"#
    )]
    fn test_duplicate_member_is_rejected_at_load(#[case] json: &str) {
        let error = InMemorySchema::from_json_str(json).unwrap_err();
        assert_eq!(error.to_string(), "Duplicate member 'age' on type 'Person'");
    }
}
