// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Schema metadata: value types, attributes, relationships and entity types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value-type tag carried by every attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    /// Text
    String,
    /// True/false
    Boolean,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Calendar date without time zone
    Date,
    /// Instant in UTC
    Timestamp,
    /// Bitemporal validity range queried at a point in time
    AsOf,
}

impl ValueType {
    /// All value types, in declaration order
    pub const ALL: [ValueType; 9] = [
        ValueType::String,
        ValueType::Boolean,
        ValueType::Integer,
        ValueType::Long,
        ValueType::Float,
        ValueType::Double,
        ValueType::Date,
        ValueType::Timestamp,
        ValueType::AsOf,
    ];

    /// Tag used in schema documents
    pub fn tag(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Long => "long",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Date => "date",
            ValueType::Timestamp => "timestamp",
            ValueType::AsOf => "asOf",
        }
    }

    /// Parse a schema document tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|value_type| value_type.tag() == tag)
    }

    /// Attribute kind name used in diagnostics, e.g. `IntegerAttribute`
    pub fn kind_name(self) -> &'static str {
        match self {
            ValueType::String => "StringAttribute",
            ValueType::Boolean => "BooleanAttribute",
            ValueType::Integer => "IntegerAttribute",
            ValueType::Long => "LongAttribute",
            ValueType::Float => "FloatAttribute",
            ValueType::Double => "DoubleAttribute",
            ValueType::Date => "DateAttribute",
            ValueType::Timestamp => "TimestampAttribute",
            ValueType::AsOf => "AsOfAttribute",
        }
    }

    /// Name of the literal type a parameter must parse into
    pub fn literal_name(self) -> &'static str {
        match self {
            ValueType::String => "String",
            ValueType::Boolean => "Boolean",
            ValueType::Integer => "Integer",
            ValueType::Long => "Long",
            ValueType::Float => "Float",
            ValueType::Double => "Double",
            ValueType::Date => "Date",
            ValueType::Timestamp | ValueType::AsOf => "Timestamp",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Cardinality of a relationship or of an operator's parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    /// A single value / a to-one relationship
    #[default]
    One,
    /// An ordered list / a to-many relationship
    Many,
}

/// A typed, named scalar field on an entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Value-type tag
    pub value_type: ValueType,
    /// Whether the attribute may hold null
    pub nullable: bool,
}

impl Attribute {
    /// Create a non-nullable attribute
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            nullable: false,
        }
    }

    /// Create a nullable attribute
    pub fn nullable(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            nullable: true,
            ..Self::new(name, value_type)
        }
    }
}

/// A named navigation edge from one entity type to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship name
    pub name: String,
    /// Fully qualified name of the target entity type
    pub target: String,
    /// To-one or to-many
    pub cardinality: Cardinality,
}

impl Relationship {
    /// Create a relationship
    pub fn new(name: impl Into<String>, target: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality,
        }
    }
}

/// An entity type with its attributes and relationships in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    name: String,
    attributes: IndexMap<String, Attribute>,
    relationships: IndexMap<String, Relationship>,
    duplicates: Vec<String>,
}

impl EntityType {
    /// Create an empty entity type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            relationships: IndexMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Add an attribute
    ///
    /// A name already taken by another member is recorded and rejected when
    /// the schema is built; the first declaration stays in effect.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        if self.declares(&attribute.name) {
            self.duplicates.push(attribute.name);
        } else {
            self.attributes.insert(attribute.name.clone(), attribute);
        }
        self
    }

    /// Add a relationship
    ///
    /// Duplicate names are handled as in [`EntityType::with_attribute`].
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        if self.declares(&relationship.name) {
            self.duplicates.push(relationship.name);
        } else {
            self.relationships
                .insert(relationship.name.clone(), relationship);
        }
        self
    }

    fn declares(&self, name: &str) -> bool {
        self.attributes.contains_key(name) || self.relationships.contains_key(name)
    }

    /// Member names that were declared more than once
    pub fn duplicate_members(&self) -> &[String] {
        &self.duplicates
    }

    /// Fully qualified name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name after the last `.`
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Look up an attribute
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Look up a relationship
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.get(name)
    }

    /// Attributes in declaration order
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Relationships in declaration order
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }
}

/// Segment of a dotted type name after the last `.`
pub fn simple_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_tags_round_trip() {
        for value_type in ValueType::ALL {
            assert_eq!(ValueType::from_tag(value_type.tag()), Some(value_type));
        }
        assert_eq!(ValueType::from_tag("decimal"), None);
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("com.example.Person"), "Person");
        assert_eq!(simple_name("Person"), "Person");
        assert_eq!(EntityType::new("a.b.Order").simple_name(), "Order");
    }

    #[test]
    fn test_entity_type_keeps_declaration_order() {
        let entity = EntityType::new("Person")
            .with_attribute(Attribute::new("name", ValueType::String))
            .with_attribute(Attribute::nullable("age", ValueType::Integer));

        let names: Vec<_> = entity.attributes().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["name", "age"]);
        assert!(entity.attribute("age").is_some_and(|a| a.nullable));
        assert!(entity.relationship("age").is_none());
        assert!(entity.duplicate_members().is_empty());
    }

    #[test]
    fn test_redeclared_member_keeps_first_declaration() {
        let entity = EntityType::new("Person")
            .with_attribute(Attribute::new("age", ValueType::Integer))
            .with_attribute(Attribute::new("age", ValueType::String))
            .with_relationship(Relationship::new("age", "Person", Cardinality::One));

        assert_eq!(entity.duplicate_members(), ["age", "age"]);
        assert_eq!(
            entity.attribute("age").map(|a| a.value_type),
            Some(ValueType::Integer)
        );
        assert!(entity.relationship("age").is_none());
    }
}
