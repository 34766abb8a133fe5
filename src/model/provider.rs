//! Schema provider trait and the in-memory implementation

use super::schema::SchemaError;
use super::types::{Attribute, EntityType, Relationship, simple_name};
use indexmap::IndexMap;

/// Read-only access to entity-type metadata
///
/// Compilers only ever read through this trait, so one provider can be shared
/// by any number of compiler instances, across threads.
pub trait SchemaProvider: Send + Sync {
    /// Look up an entity type by its fully qualified name
    fn entity_type(&self, type_name: &str) -> Option<&EntityType>;

    /// Look up an attribute on a type
    fn attribute_by_name(&self, type_name: &str, name: &str) -> Option<&Attribute> {
        self.entity_type(type_name)?.attribute(name)
    }

    /// Look up a relationship on a type
    fn relationship_by_name(&self, type_name: &str, name: &str) -> Option<&Relationship> {
        self.entity_type(type_name)?.relationship(name)
    }

    /// Attribute names of a type, in declaration order
    fn attribute_names(&self, type_name: &str) -> Vec<String> {
        self.entity_type(type_name)
            .map(|entity| entity.attributes().map(|a| a.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Relationship names of a type, in declaration order
    fn relationship_names(&self, type_name: &str) -> Vec<String> {
        self.entity_type(type_name)
            .map(|entity| entity.relationships().map(|r| r.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Simple name of a type
    fn simple_type_name<'a>(&self, type_name: &'a str) -> &'a str {
        simple_name(type_name)
    }
}

/// Schema held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySchema {
    types: IndexMap<String, EntityType>,
}

impl InMemorySchema {
    /// Start building a schema
    pub fn builder() -> InMemorySchemaBuilder {
        InMemorySchemaBuilder::default()
    }

    /// Entity types in declaration order
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.types.values()
    }
}

impl SchemaProvider for InMemorySchema {
    fn entity_type(&self, type_name: &str) -> Option<&EntityType> {
        self.types.get(type_name)
    }
}

/// Builder that validates the schema when finished
#[derive(Debug, Default)]
pub struct InMemorySchemaBuilder {
    types: Vec<EntityType>,
}

impl InMemorySchemaBuilder {
    /// Add an entity type
    pub fn entity(mut self, entity: EntityType) -> Self {
        self.types.push(entity);
        self
    }

    /// Validate and build
    ///
    /// Fails on duplicate type names, on a type declaring the same member
    /// name twice, and on relationships pointing at unknown types.
    pub fn build(self) -> Result<InMemorySchema, SchemaError> {
        let mut types = IndexMap::with_capacity(self.types.len());
        for entity in self.types {
            if types.contains_key(entity.name()) {
                return Err(SchemaError::DuplicateType {
                    name: entity.name().to_string(),
                });
            }
            types.insert(entity.name().to_string(), entity);
        }

        for entity in types.values() {
            if let Some(name) = entity.duplicate_members().first() {
                return Err(SchemaError::DuplicateMember {
                    type_name: entity.name().to_string(),
                    name: name.clone(),
                });
            }
            for relationship in entity.relationships() {
                if !types.contains_key(&relationship.target) {
                    return Err(SchemaError::UnknownTarget {
                        type_name: entity.name().to_string(),
                        relationship: relationship.name.clone(),
                        target: relationship.target.clone(),
                    });
                }
            }
        }

        log::debug!("Built schema with {} entity types", types.len());
        Ok(InMemorySchema { types })
    }
}
