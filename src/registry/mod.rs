//! Per-type operator dispatch
//!
//! The registry turns an attribute, an operator and an untyped argument into
//! a predicate node. Operator acceptance and parameter shape come from the
//! static tables in [`signature`]; parameter values are parsed against the
//! attribute's value type by [`literal`].

#![warn(missing_docs)]

pub mod literal;
pub mod operator;
pub mod signature;

pub use literal::{Literal, parse_value};
pub use operator::Operator;
pub use signature::{Arity, OperatorSignature, arity_of, signatures};

use crate::config::CompilerConfig;
use crate::error::Rejection;
use crate::model::ValueType;
use crate::operation::{
    AttributeFunction, AttributeRef, ComparisonOperator, Operation, Parameter, Value, dedup_values,
};
use log::trace;
use std::fmt;

/// Argument handed to an operator, before it is checked against the operator's arity
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// No value: `{}` in structural criteria, nothing after a unary operator in source
    Empty,
    /// A literal or list of literals
    Value(Literal),
    /// A value with no literal form, rendered for diagnostics
    Unsupported(String),
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Empty => f.write_str("{}"),
            Argument::Value(literal) => write!(f, "{literal}"),
            Argument::Unsupported(text) => f.write_str(text),
        }
    }
}

/// Dispatches operators on resolved attributes
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    max_list_size: usize,
    deduplicate_lists: bool,
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new(&CompilerConfig::default())
    }
}

fn unknown_operation(value_type: ValueType, name: &str) -> Rejection {
    Rejection::operator(format!(
        "Unknown operation on {}: {}",
        value_type.kind_name(),
        name
    ))
}

impl OperatorRegistry {
    /// Create a registry honouring the list limits of `config`
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            max_list_size: config.max_list_size,
            deduplicate_lists: config.deduplicate_lists,
        }
    }

    /// Look up an operator name in the table of `value_type`
    pub fn resolve_operator(
        &self,
        value_type: ValueType,
        name: &str,
    ) -> Result<(Operator, Arity), Rejection> {
        Operator::from_name(name)
            .and_then(|operator| arity_of(value_type, operator).map(|arity| (operator, arity)))
            .ok_or_else(|| unknown_operation(value_type, name))
    }

    /// Wrap an attribute in a function, producing the derived attribute
    pub fn apply_function(
        &self,
        attribute: AttributeRef,
        function: AttributeFunction,
    ) -> Result<AttributeRef, Rejection> {
        let name = function.name();
        let value_type = attribute.value_type();
        if arity_of(value_type, Operator::Function(name)) != Some(Arity::Derive) {
            return Err(Rejection::operator(format!(
                "Function '{}' applies to {} but attribute '{}' is a {}",
                name.name(),
                name.applies_to(),
                attribute.name(),
                value_type.kind_name()
            )));
        }
        if let AttributeFunction::Substring { start, end } = function {
            if start < 0 || end < start {
                return Err(Rejection::operator(format!(
                    "Invalid substring range [{start}, {end}]"
                )));
            }
        }
        trace!("{}({})", name.name(), attribute);
        Ok(attribute.derive(function))
    }

    /// Build a comparison node, checking the argument against the operator's arity
    pub fn compare(
        &self,
        attribute: &AttributeRef,
        operator: ComparisonOperator,
        argument: Argument,
    ) -> Result<Operation, Rejection> {
        let value_type = attribute.value_type();
        let arity = arity_of(value_type, Operator::Compare(operator))
            .ok_or_else(|| unknown_operation(value_type, operator.name()))?;
        trace!("{attribute} {operator} {argument} ({arity:?})");

        if value_type == ValueType::AsOf && operator == ComparisonOperator::NotEq {
            return match argument {
                Argument::Value(Literal::Null) => {
                    Ok(null_check(attribute, ComparisonOperator::IsNotNull))
                }
                other => Err(Rejection::operator(format!(
                    "notEq operation on {} only supported with null but found: {}",
                    value_type.kind_name(),
                    other
                ))),
            };
        }

        match arity {
            Arity::Unary => match argument {
                Argument::Empty => Ok(match operator {
                    ComparisonOperator::IsNull | ComparisonOperator::IsNotNull => {
                        null_check(attribute, operator)
                    }
                    _ => Operation::compare(attribute.clone(), operator, Parameter::None),
                }),
                other => Err(Rejection::operator(format!(
                    "{operator} takes an empty object as its argument but found: {other}"
                ))),
            },
            Arity::One => self.compare_one(attribute, operator, argument),
            Arity::Many => self.compare_many(attribute, operator, argument),
            Arity::Derive => Err(unknown_operation(value_type, operator.name())),
        }
    }

    fn compare_one(
        &self,
        attribute: &AttributeRef,
        operator: ComparisonOperator,
        argument: Argument,
    ) -> Result<Operation, Rejection> {
        let value_type = attribute.value_type();
        match argument {
            Argument::Empty => Err(Rejection::structural("Empty criteria node.")),
            Argument::Value(Literal::Null) => match operator {
                ComparisonOperator::Eq => Ok(null_check(attribute, ComparisonOperator::IsNull)),
                ComparisonOperator::NotEq => {
                    Ok(null_check(attribute, ComparisonOperator::IsNotNull))
                }
                _ => Err(rejects_null(value_type, operator)),
            },
            Argument::Value(literal @ Literal::List(_)) => {
                Err(requires_single(value_type, operator, &literal))
            }
            Argument::Value(literal) => {
                let value = parse_value(value_type, &literal)?;
                Ok(Operation::compare(
                    attribute.clone(),
                    operator,
                    Parameter::One(value),
                ))
            }
            Argument::Unsupported(text) => Err(requires_single(value_type, operator, &text)),
        }
    }

    fn compare_many(
        &self,
        attribute: &AttributeRef,
        operator: ComparisonOperator,
        argument: Argument,
    ) -> Result<Operation, Rejection> {
        let value_type = attribute.value_type();
        let items = match argument {
            Argument::Empty => return Err(Rejection::structural("Empty criteria node.")),
            Argument::Value(Literal::List(items)) => items,
            Argument::Value(literal) => return Err(requires_list(value_type, operator, &literal)),
            Argument::Unsupported(text) => return Err(requires_list(value_type, operator, &text)),
        };

        if items.is_empty() {
            return Err(Rejection::structural("Empty criteria node."));
        }
        if items.len() > self.max_list_size {
            return Err(Rejection::operator(format!(
                "Operator '{}' on {} accepts at most {} values but found {}",
                operator,
                value_type.kind_name(),
                self.max_list_size,
                items.len()
            )));
        }

        let mut values = items
            .iter()
            .map(|item| match item {
                Literal::Null => Err(rejects_null(value_type, operator)),
                Literal::List(_) => Err(requires_single(value_type, operator, item)),
                _ => parse_value(value_type, item),
            })
            .collect::<Result<Vec<Value>, _>>()?;
        if self.deduplicate_lists {
            values = dedup_values(values);
        }

        Ok(Operation::compare(
            attribute.clone(),
            operator,
            Parameter::Many(values),
        ))
    }
}

/// `isNull`/`isNotNull`, folded to a constant on non-nullable attributes
fn null_check(attribute: &AttributeRef, operator: ComparisonOperator) -> Operation {
    match (attribute.nullable(), operator) {
        (true, _) => Operation::compare(attribute.clone(), operator, Parameter::None),
        (false, ComparisonOperator::IsNull) => Operation::None,
        (false, _) => Operation::All,
    }
}

fn rejects_null(value_type: ValueType, operator: ComparisonOperator) -> Rejection {
    Rejection::operator(format!(
        "Operator '{}' on {} does not accept null",
        operator,
        value_type.kind_name()
    ))
}

fn requires_single(
    value_type: ValueType,
    operator: ComparisonOperator,
    found: &dyn fmt::Display,
) -> Rejection {
    Rejection::operator(format!(
        "Operator '{}' on {} requires a single value but found: {}",
        operator,
        value_type.kind_name(),
        found
    ))
}

fn requires_list(
    value_type: ValueType,
    operator: ComparisonOperator,
    found: &dyn fmt::Display,
) -> Rejection {
    Rejection::operator(format!(
        "Operator '{}' on {} requires a list of values but found: {}",
        operator,
        value_type.kind_name(),
        found
    ))
}
