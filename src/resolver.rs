//! Attribute and relationship resolution against a schema provider

use crate::error::Rejection;
use crate::model::{Attribute, EntityType, SchemaProvider};
use crate::operation::{AttributePath, AttributeRef, RelationshipPath};
use log::trace;

/// Position reached while walking relationships from a root type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    root_type: String,
    navigation: Vec<String>,
    current_type: String,
}

impl Scope {
    /// Scope at a root type, before any navigation
    pub fn root(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            root_type: type_name.clone(),
            navigation: Vec::new(),
            current_type: type_name,
        }
    }

    /// Type the walk started at
    pub fn root_type(&self) -> &str {
        &self.root_type
    }

    /// Type reached so far
    pub fn current_type(&self) -> &str {
        &self.current_type
    }

    /// Relationship names navigated so far
    pub fn navigation(&self) -> &[String] {
        &self.navigation
    }

    /// Whether any relationship has been navigated
    pub fn is_root(&self) -> bool {
        self.navigation.is_empty()
    }

    /// Fresh scope rooted at the current type
    pub fn rebase(&self) -> Self {
        Self::root(self.current_type.clone())
    }

    /// Relationship chain navigated so far, `None` at the root
    pub fn relationship_path(&self) -> Option<RelationshipPath> {
        (!self.is_root()).then(|| RelationshipPath {
            root_type: self.root_type.clone(),
            segments: self.navigation.clone(),
            target_type: self.current_type.clone(),
        })
    }

    fn enter(&self, relationship: &str, target: &str) -> Self {
        let mut navigation = self.navigation.clone();
        navigation.push(relationship.to_string());
        Self {
            root_type: self.root_type.clone(),
            navigation,
            current_type: target.to_string(),
        }
    }

    fn attribute_path(&self, attribute: &Attribute) -> AttributePath {
        AttributePath {
            root_type: self.root_type.clone(),
            navigation: self.navigation.clone(),
            name: attribute.name.clone(),
            value_type: attribute.value_type,
            nullable: attribute.nullable,
        }
    }
}

/// What a name resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// An attribute of the current type
    Attribute(AttributeRef),
    /// A relationship; the scope is positioned at its target type
    Relationship(Scope),
}

/// Walks names through a schema provider
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    schema: &'a dyn SchemaProvider,
}

impl<'a> Resolver<'a> {
    /// Create a resolver
    pub fn new(schema: &'a dyn SchemaProvider) -> Self {
        Self { schema }
    }

    /// Scope at a root type, which must exist
    pub fn root(&self, type_name: &str) -> Result<Scope, Rejection> {
        self.entity(type_name)?;
        Ok(Scope::root(type_name))
    }

    /// Check an explicit root-type assertion against the scope's type
    pub fn check_root(&self, scope: &Scope, assertion: &str) -> Result<(), Rejection> {
        let expected = self.schema.simple_type_name(scope.current_type());
        if assertion == expected || assertion == scope.current_type() {
            Ok(())
        } else {
            Err(Rejection::schema(format!(
                "Expected 'this' or <{expected}> but found: <{assertion}>"
            )))
        }
    }

    /// Follow one relationship
    pub fn navigate(&self, scope: &Scope, name: &str) -> Result<Scope, Rejection> {
        let type_name = self.entity(scope.current_type())?.name();
        match self.schema.relationship_by_name(type_name, name) {
            Some(relationship) => {
                trace!("{}.{} -> {}", type_name, name, relationship.target);
                Ok(scope.enter(name, &relationship.target))
            }
            None => Err(Rejection::schema(format!(
                "Could not find relationship '{}' on type '{}'. Valid relationships: [{}]",
                name,
                self.schema.simple_type_name(type_name),
                self.schema.relationship_names(type_name).join(", ")
            ))),
        }
    }

    /// Look up an attribute of the scope's type
    pub fn attribute(&self, scope: &Scope, name: &str) -> Result<AttributeRef, Rejection> {
        let type_name = self.entity(scope.current_type())?.name();
        match self.schema.attribute_by_name(type_name, name) {
            Some(attribute) => Ok(AttributeRef::Simple(scope.attribute_path(attribute))),
            None => Err(Rejection::schema(format!(
                "Could not find attribute '{}' on type '{}'. Valid attributes: [{}]",
                name,
                self.schema.simple_type_name(type_name),
                self.schema.attribute_names(type_name).join(", ")
            ))),
        }
    }

    /// Look up a name that may be either an attribute or a relationship
    pub fn field(&self, scope: &Scope, name: &str) -> Result<Resolved, Rejection> {
        let type_name = self.entity(scope.current_type())?.name();
        if let Some(attribute) = self.schema.attribute_by_name(type_name, name) {
            return Ok(Resolved::Attribute(AttributeRef::Simple(
                scope.attribute_path(attribute),
            )));
        }
        if let Some(relationship) = self.schema.relationship_by_name(type_name, name) {
            return Ok(Resolved::Relationship(
                scope.enter(name, &relationship.target),
            ));
        }
        Err(Rejection::schema(format!(
            "Could not find field '{}' on type '{}'",
            name,
            self.schema.simple_type_name(type_name)
        )))
    }

    fn entity(&self, type_name: &str) -> Result<&'a EntityType, Rejection> {
        self.schema
            .entity_type(type_name)
            .ok_or_else(|| Rejection::schema(format!("Could not find type '{type_name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cardinality, InMemorySchema, Relationship, ValueType};
    use pretty_assertions::assert_eq;

    fn schema() -> InMemorySchema {
        InMemorySchema::builder()
            .entity(
                EntityType::new("shop.Person")
                    .with_attribute(Attribute::new("name", ValueType::String))
                    .with_relationship(Relationship::new(
                        "orders",
                        "shop.Order",
                        Cardinality::Many,
                    )),
            )
            .entity(
                EntityType::new("shop.Order")
                    .with_attribute(Attribute::nullable("total", ValueType::Double))
                    .with_attribute(Attribute::new("placed", ValueType::Timestamp)),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_navigated_attribute() {
        let schema = schema();
        let resolver = Resolver::new(&schema);
        let root = resolver.root("shop.Person").unwrap();

        let orders = resolver.navigate(&root, "orders").unwrap();
        let Resolved::Attribute(attribute) = resolver.field(&orders, "total").unwrap() else {
            panic!("expected attribute");
        };
        assert_eq!(attribute.to_string(), "this.orders.total");
        assert_eq!(attribute.path().root_type, "shop.Person");
        assert!(attribute.nullable());
    }

    #[test]
    fn test_resolve_relationship() {
        let schema = schema();
        let resolver = Resolver::new(&schema);
        let root = resolver.root("shop.Person").unwrap();

        let Resolved::Relationship(scope) = resolver.field(&root, "orders").unwrap() else {
            panic!("expected relationship");
        };
        let path = scope.relationship_path().unwrap();
        assert_eq!(path.target_type, "shop.Order");
        assert_eq!(path.to_string(), "this.orders");
        assert!(root.relationship_path().is_none());
    }

    #[test]
    fn test_unknown_names_list_alternatives() {
        let schema = schema();
        let resolver = Resolver::new(&schema);
        let root = resolver.root("shop.Person").unwrap();

        assert_eq!(
            resolver.navigate(&root, "friends").unwrap_err().message,
            "Could not find relationship 'friends' on type 'Person'. Valid relationships: [orders]"
        );
        assert_eq!(
            resolver.attribute(&root, "age").unwrap_err().message,
            "Could not find attribute 'age' on type 'Person'. Valid attributes: [name]"
        );
        assert_eq!(
            resolver.field(&root, "age").unwrap_err().message,
            "Could not find field 'age' on type 'Person'"
        );
        assert_eq!(
            resolver.root("shop.Nope").unwrap_err().message,
            "Could not find type 'shop.Nope'"
        );
    }

    /// Provider that hides members whose name starts with `_`
    struct Redacting(InMemorySchema);

    impl SchemaProvider for Redacting {
        fn entity_type(&self, type_name: &str) -> Option<&EntityType> {
            self.0.entity_type(type_name)
        }

        fn attribute_by_name(&self, type_name: &str, name: &str) -> Option<&Attribute> {
            if name.starts_with('_') {
                return None;
            }
            self.0.attribute_by_name(type_name, name)
        }

        fn relationship_by_name(&self, type_name: &str, name: &str) -> Option<&Relationship> {
            if name.starts_with('_') {
                return None;
            }
            self.0.relationship_by_name(type_name, name)
        }
    }

    #[test]
    fn test_lookups_go_through_the_provider() {
        let schema = Redacting(
            InMemorySchema::builder()
                .entity(
                    EntityType::new("shop.Person")
                        .with_attribute(Attribute::new("_secret", ValueType::String))
                        .with_attribute(Attribute::new("name", ValueType::String))
                        .with_relationship(Relationship::new(
                            "_self",
                            "shop.Person",
                            Cardinality::One,
                        )),
                )
                .build()
                .unwrap(),
        );
        let resolver = Resolver::new(&schema);
        let root = resolver.root("shop.Person").unwrap();

        assert!(resolver.attribute(&root, "name").is_ok());
        assert!(resolver.attribute(&root, "_secret").is_err());
        assert!(resolver.navigate(&root, "_self").is_err());
        assert_eq!(
            resolver.field(&root, "_secret").unwrap_err().message,
            "Could not find field '_secret' on type 'Person'"
        );
    }

    #[test]
    fn test_root_assertion() {
        let schema = schema();
        let resolver = Resolver::new(&schema);
        let root = resolver.root("shop.Person").unwrap();

        assert!(resolver.check_root(&root, "Person").is_ok());
        assert!(resolver.check_root(&root, "shop.Person").is_ok());
        assert_eq!(
            resolver.check_root(&root, "Order").unwrap_err().message,
            "Expected 'this' or <Person> but found: <Order>"
        );
    }
}
