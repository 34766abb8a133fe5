//! Order-by criteria: nested field maps to sort keys

use crate::diagnostics::ErrorContext;
use crate::error::{CompileError, CompileResult};
use crate::model::SchemaProvider;
use crate::operation::AttributePath;
use crate::resolver::{Resolved, Resolver, Scope};
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value as Json};
use std::fmt;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

impl Direction {
    /// Parse `ASCENDING` or `DESCENDING`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ASCENDING" => Some(Direction::Ascending),
            "DESCENDING" => Some(Direction::Descending),
            _ => None,
        }
    }

    /// Name as written in order-by input
    pub fn name(self) -> &'static str {
        match self {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One attribute to sort by
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKey {
    /// Attribute sorted on, possibly behind relationships
    pub attribute: AttributePath,
    /// Sort direction
    pub direction: Direction,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.attribute, self.direction)
    }
}

/// Ordered list of sort keys; earlier keys take precedence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBy {
    keys: Vec<SortKey>,
}

impl OrderBy {
    /// Single-key ordering
    pub fn new(attribute: AttributePath, direction: Direction) -> Self {
        Self {
            keys: vec![SortKey {
                attribute,
                direction,
            }],
        }
    }

    /// Append `other` as lower-precedence keys
    pub fn and(mut self, other: OrderBy) -> Self {
        self.keys.extend(other.keys);
        self
    }

    /// Keys in precedence order
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, key) in self.keys.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

/// Converts order-by criteria against a schema
///
/// Attributes map to an empty object; relationships map to nested criteria
/// on the related type. Keys are emitted in input order.
pub struct OrderByConverter<'a> {
    resolver: Resolver<'a>,
}

impl<'a> OrderByConverter<'a> {
    /// Create a converter over `schema`
    pub fn new(schema: &'a dyn SchemaProvider) -> Self {
        Self {
            resolver: Resolver::new(schema),
        }
    }

    /// Convert `criteria` into an ordering over `root_type`
    ///
    /// Returns `None` when the criteria name no attributes.
    pub fn convert(
        &self,
        root_type: &str,
        criteria: &Map<String, Json>,
        direction: &str,
    ) -> CompileResult<Option<OrderBy>> {
        debug!("Converting order-by on {root_type} ({direction})");
        let context = ErrorContext::new();
        let scope = self
            .resolver
            .root(root_type)
            .map_err(|rejection| rejection.in_context(&context))?;
        self.convert_map(&scope, criteria, direction, &context)
    }

    fn convert_map(
        &self,
        scope: &Scope,
        criteria: &Map<String, Json>,
        direction: &str,
        context: &ErrorContext,
    ) -> CompileResult<Option<OrderBy>> {
        let mut result: Option<OrderBy> = None;
        for (key, value) in criteria {
            let context = context.push(key);
            let next = self.convert_field(scope, key, value, direction, &context)?;
            result = match (result, next) {
                (Some(order), Some(next)) => Some(order.and(next)),
                (order, next) => order.or(next),
            };
        }
        Ok(result)
    }

    fn convert_field(
        &self,
        scope: &Scope,
        key: &str,
        value: &Json,
        direction: &str,
        context: &ErrorContext,
    ) -> CompileResult<Option<OrderBy>> {
        let Some(criteria) = value.as_object() else {
            return Err(CompileError::structural(
                format!("Expected an object for '{key}' but found: {value}"),
                context,
            ));
        };

        match self
            .resolver
            .field(scope, key)
            .map_err(|rejection| rejection.in_context(context))?
        {
            Resolved::Attribute(attribute) => {
                if !criteria.is_empty() {
                    return Err(CompileError::structural(
                        format!(
                            "Attribute '{key}' takes an empty object but found: {value}"
                        ),
                        context,
                    ));
                }
                let Some(direction) = Direction::parse(direction) else {
                    return Err(CompileError::structural(
                        format!("Invalid direction: {direction}"),
                        context,
                    ));
                };
                Ok(Some(OrderBy::new(attribute.path().clone(), direction)))
            }
            Resolved::Relationship(target) => {
                self.convert_map(&target, criteria, direction, context)
            }
        }
    }
}
