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

//! Structural converter: nested criteria maps to predicate trees
//!
//! Keys of a criteria map are either combinators (`AND`, `OR`), existence
//! operators (`exists`, `notExists`, `recursiveNotExists`) or field names.
//! Attribute fields map operator names to parameters; relationship fields
//! hold a nested criteria map evaluated against the related type.

use crate::config::CompilerConfig;
use crate::diagnostics::ErrorContext;
use crate::error::{CompileError, CompileResult, Rejection};
use crate::model::SchemaProvider;
use crate::operation::{AttributeFunction, AttributeRef, FunctionName, Operation};
use crate::registry::{Argument, Literal, Operator, OperatorRegistry};
use crate::resolver::{Resolved, Resolver, Scope};
use log::{debug, trace};
use serde_json::{Map, Value as Json};

/// Combinator keys
const AND: &str = "AND";
const OR: &str = "OR";

/// Keys of the substring argument map that are not operators
const SUBSTRING_START: &str = "start";
const SUBSTRING_END: &str = "end";

/// Converts structural criteria against a schema
pub struct StructuralConverter<'a> {
    resolver: Resolver<'a>,
    registry: OperatorRegistry,
    config: CompilerConfig,
}

impl<'a> StructuralConverter<'a> {
    /// Create a converter with the default configuration
    pub fn new(schema: &'a dyn SchemaProvider) -> Self {
        Self::with_config(schema, CompilerConfig::default())
    }

    /// Create a converter with a custom configuration
    pub fn with_config(schema: &'a dyn SchemaProvider, config: CompilerConfig) -> Self {
        Self {
            resolver: Resolver::new(schema),
            registry: OperatorRegistry::new(&config),
            config,
        }
    }

    /// Convert a criteria map into a predicate over `root_type`
    pub fn convert(&self, root_type: &str, criteria: &Map<String, Json>) -> CompileResult<Operation> {
        debug!(
            "Converting criteria on {root_type} ({} top-level keys)",
            criteria.len()
        );
        let context = ErrorContext::new();
        let result = self
            .resolver
            .root(root_type)
            .map_err(|rejection| rejection.in_context(&context))
            .and_then(|scope| self.convert_map(&scope, criteria, &context, 0));
        match &result {
            Ok(operation) => debug!("Converted {root_type}: {operation}"),
            Err(error) => debug!("Conversion failed: {error}"),
        }
        result
    }

    fn check_depth(&self, depth: usize, context: &ErrorContext) -> CompileResult<()> {
        if depth > self.config.max_depth {
            return Err(CompileError::structural(
                format!(
                    "Criteria nested deeper than {} levels",
                    self.config.max_depth
                ),
                context,
            ));
        }
        Ok(())
    }

    fn convert_map(
        &self,
        scope: &Scope,
        criteria: &Map<String, Json>,
        context: &ErrorContext,
        depth: usize,
    ) -> CompileResult<Operation> {
        self.check_depth(depth, context)?;
        if criteria.len() > 1 && (criteria.contains_key(AND) || criteria.contains_key(OR)) {
            return Err(CompileError::structural(
                "AND and OR cannot be combined with other criteria. Did you mean to nest the other criteria inside?",
                context,
            ));
        }

        criteria
            .iter()
            .try_fold(Operation::All, |operation, (key, value)| {
                Ok(operation.and(self.convert_entry(scope, key, value, context, depth)?))
            })
    }

    fn convert_entry(
        &self,
        scope: &Scope,
        key: &str,
        value: &Json,
        context: &ErrorContext,
        depth: usize,
    ) -> CompileResult<Operation> {
        match key {
            AND => self.convert_conjunction(scope, value, AND, Operation::and, context, depth),
            OR => self.convert_conjunction(scope, value, OR, Operation::or, context, depth),
            "exists" | "notExists" | "recursiveNotExists" => {
                self.convert_existence(scope, key, value, context, depth)
            }
            _ => self.convert_field(scope, key, value, context, depth),
        }
    }

    fn convert_conjunction(
        &self,
        scope: &Scope,
        value: &Json,
        name: &str,
        combine: fn(Operation, Operation) -> Operation,
        context: &ErrorContext,
        depth: usize,
    ) -> CompileResult<Operation> {
        let Some(items) = value.as_array() else {
            return Err(CompileError::structural(
                format!("{name} takes a list of criteria but found: {value}"),
                &context.push(name),
            ));
        };
        if items.is_empty() {
            return Err(CompileError::structural(
                "Empty criteria node.",
                &context.push(name),
            ));
        }

        let mut operations = items.iter().enumerate().map(|(index, item)| {
            let context = context.push(format!("{name}[{index}]"));
            match item.as_object() {
                Some(criteria) => self.convert_map(scope, criteria, &context, depth + 1),
                None => Err(CompileError::structural(
                    format!("Expected a criteria object but found: {item}"),
                    &context,
                )),
            }
        });
        let first = operations.next().transpose()?.unwrap_or(Operation::All);
        operations.try_fold(first, |operation, next| Ok(combine(operation, next?)))
    }

    fn convert_existence(
        &self,
        scope: &Scope,
        key: &str,
        value: &Json,
        context: &ErrorContext,
        depth: usize,
    ) -> CompileResult<Operation> {
        let Some(relationship) = scope.relationship_path() else {
            return Err(CompileError::structural(
                format!("{key} must be nested inside a relationship"),
                context,
            ));
        };
        let Some(criteria) = value.as_object() else {
            return Err(CompileError::structural(
                format!("{key} takes an object as its argument but found: {value}"),
                context,
            ));
        };

        // Nested filters start over with an empty context
        let filter = if criteria.is_empty() {
            None
        } else {
            let nested = self.convert_map(&scope.rebase(), criteria, &ErrorContext::new(), depth + 1)?;
            Some(Box::new(nested))
        };

        Ok(match key {
            "exists" => Operation::Exists {
                relationship,
                filter,
            },
            "notExists" => Operation::NotExists {
                relationship,
                filter,
            },
            _ => Operation::RecursiveNotExists {
                relationship,
                filter,
            },
        })
    }

    fn convert_field(
        &self,
        scope: &Scope,
        key: &str,
        value: &Json,
        context: &ErrorContext,
        depth: usize,
    ) -> CompileResult<Operation> {
        let context = context.push(key);
        if is_empty_node(value) {
            return Err(CompileError::structural("Empty criteria node.", &context));
        }
        let Some(criteria) = value.as_object() else {
            return Err(CompileError::structural(
                format!("Expected a criteria object for '{key}' but found: {value}"),
                &context,
            ));
        };

        match self
            .resolver
            .field(scope, key)
            .map_err(|rejection| rejection.in_context(&context))?
        {
            Resolved::Attribute(attribute) => {
                self.convert_attribute(&attribute, criteria, &context, depth + 1)
            }
            Resolved::Relationship(target) => {
                self.convert_map(&target, criteria, &context, depth + 1)
            }
        }
    }

    fn convert_attribute(
        &self,
        attribute: &AttributeRef,
        criteria: &Map<String, Json>,
        context: &ErrorContext,
        depth: usize,
    ) -> CompileResult<Operation> {
        self.check_depth(depth, context)?;
        let in_context = |rejection: Rejection| rejection.in_context(context);

        criteria
            .iter()
            .try_fold(Operation::All, |operation, (name, parameter)| {
                let (operator, _) = self
                    .registry
                    .resolve_operator(attribute.value_type(), name)
                    .map_err(in_context)?;
                trace!("{attribute} {name} {parameter}");

                let next = match operator {
                    Operator::Compare(comparison) => self
                        .registry
                        .compare(attribute, comparison, argument(parameter))
                        .map_err(in_context)?,
                    Operator::Function(function) => {
                        self.convert_function(attribute, function, parameter, context, depth)?
                    }
                };
                Ok(operation.and(next))
            })
    }

    fn convert_function(
        &self,
        attribute: &AttributeRef,
        name: FunctionName,
        parameter: &Json,
        context: &ErrorContext,
        depth: usize,
    ) -> CompileResult<Operation> {
        let in_context = |rejection: Rejection| rejection.in_context(context);
        if is_empty_node(parameter) {
            return Err(CompileError::structural("Empty criteria node.", context));
        }
        let Some(criteria) = parameter.as_object() else {
            return Err(CompileError::structural(
                format!(
                    "{} takes an object as its argument but found: {parameter}",
                    name.name()
                ),
                context,
            ));
        };

        let (function, nested) = match name {
            FunctionName::Substring => {
                let range = substring_bound(criteria, SUBSTRING_START)
                    .zip(substring_bound(criteria, SUBSTRING_END));
                let Some((start, end)) = range else {
                    return Err(CompileError::structural(
                        format!(
                            "substring requires integer '{SUBSTRING_START}' and '{SUBSTRING_END}' but found: {parameter}"
                        ),
                        context,
                    ));
                };
                let nested: Map<String, Json> = criteria
                    .iter()
                    .filter(|(key, _)| *key != SUBSTRING_START && *key != SUBSTRING_END)
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                if nested.is_empty() {
                    return Err(CompileError::structural("Empty criteria node.", context));
                }
                (AttributeFunction::Substring { start, end }, nested)
            }
            FunctionName::ToLowerCase => (AttributeFunction::ToLowerCase, criteria.clone()),
            FunctionName::AbsoluteValue => (AttributeFunction::AbsoluteValue, criteria.clone()),
            FunctionName::Year => (AttributeFunction::Year, criteria.clone()),
            FunctionName::Month => (AttributeFunction::Month, criteria.clone()),
            FunctionName::DayOfMonth => (AttributeFunction::DayOfMonth, criteria.clone()),
        };

        let derived = self
            .registry
            .apply_function(attribute.clone(), function)
            .map_err(in_context)?;
        self.convert_attribute(&derived, &nested, context, depth + 1)
    }
}

fn is_empty_node(value: &Json) -> bool {
    match value {
        Json::Array(items) => items.is_empty(),
        Json::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn substring_bound(criteria: &Map<String, Json>, key: &str) -> Option<i32> {
    criteria
        .get(key)?
        .as_i64()
        .and_then(|bound| i32::try_from(bound).ok())
}

/// Classify a structural parameter
fn argument(parameter: &Json) -> Argument {
    match parameter {
        Json::Object(map) if map.is_empty() => Argument::Empty,
        _ => match Literal::from_json(parameter) {
            Some(literal) => Argument::Value(literal),
            None => Argument::Unsupported(parameter.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{Attribute, Cardinality, EntityType, InMemorySchema, Relationship, ValueType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> InMemorySchema {
        InMemorySchema::builder()
            .entity(
                EntityType::new("Person")
                    .with_attribute(Attribute::new("name", ValueType::String))
                    .with_relationship(Relationship::new("orders", "Order", Cardinality::Many)),
            )
            .entity(
                EntityType::new("Order")
                    .with_attribute(Attribute::nullable("total", ValueType::Double))
                    .with_relationship(Relationship::new("buyer", "Person", Cardinality::One)),
            )
            .build()
            .unwrap()
    }

    fn criteria(value: Json) -> Map<String, Json> {
        match value {
            Json::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_argument_classification() {
        assert_eq!(argument(&json!({})), Argument::Empty);
        assert_eq!(
            argument(&json!([1, 2])),
            Argument::Value(Literal::List(vec![Literal::Integer(1), Literal::Integer(2)]))
        );
        assert_eq!(
            argument(&json!({"a": 1})),
            Argument::Unsupported("{\"a\":1}".to_string())
        );
    }

    #[test]
    fn test_nested_existence_filter_gets_fresh_context() {
        let schema = schema();
        let converter = StructuralConverter::new(&schema);
        let error = converter
            .convert(
                "Person",
                &criteria(json!({"orders": {"notExists": {"AND": []}}})),
            )
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Structural);
        assert_eq!(error.context_path(), ["AND".to_string()]);
    }

    #[test]
    fn test_existence_at_root_is_rejected() {
        let schema = schema();
        let converter = StructuralConverter::new(&schema);
        let error = converter
            .convert("Person", &criteria(json!({"exists": {}})))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Structural);
        assert_eq!(error.message(), "exists must be nested inside a relationship");
    }

    #[test]
    fn test_depth_limit() {
        let schema = schema();
        let config = CompilerConfig {
            max_depth: 2,
            ..CompilerConfig::default()
        };
        let converter = StructuralConverter::with_config(&schema, config);
        let error = converter
            .convert(
                "Person",
                &criteria(json!({"orders": {"buyer": {"orders": {"total": {"isNull": {}}}}}})),
            )
            .unwrap_err();
        assert_eq!(error.message(), "Criteria nested deeper than 2 levels");
        assert_eq!(
            error.context_path(),
            ["orders".to_string(), "buyer".to_string(), "orders".to_string()]
        );
    }
}
