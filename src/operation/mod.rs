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

//! Compiled predicate trees
//!
//! An [`Operation`] is the output of both compilers: an immutable boolean
//! filter over an entity type. Every comparison value in the tree has
//! already been parsed and checked against its attribute's value type.

pub mod attribute;
pub mod value;

pub use attribute::{AttributeFunction, AttributePath, AttributeRef, FunctionName, RelationshipPath};
pub use value::{Value, dedup_values};

use crate::model::Cardinality;
use serde::Serialize;
use std::fmt;

/// Comparison operators as they appear in compiled trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOperator {
    /// Equal
    Eq,
    /// Not equal
    NotEq,
    /// Member of a list
    In,
    /// Not a member of a list
    NotIn,
    /// Greater than
    GreaterThan,
    /// Greater than or equal
    GreaterThanEquals,
    /// Less than
    LessThan,
    /// Less than or equal
    LessThanEquals,
    /// String prefix
    StartsWith,
    /// Negated string prefix
    NotStartsWith,
    /// String suffix
    EndsWith,
    /// Negated string suffix
    NotEndsWith,
    /// Substring match
    Contains,
    /// Negated substring match
    NotContains,
    /// `*`/`?` pattern match
    WildCardEquals,
    /// Negated pattern match
    WildCardNotEquals,
    /// Match against any pattern in a list
    WildCardIn,
    /// Attribute is null
    IsNull,
    /// Attribute is not null
    IsNotNull,
    /// As-of attribute sits on the edge of its validity range
    EqualsEdgePoint,
}

impl ComparisonOperator {
    /// Every operator
    pub const ALL: [ComparisonOperator; 20] = [
        ComparisonOperator::Eq,
        ComparisonOperator::NotEq,
        ComparisonOperator::In,
        ComparisonOperator::NotIn,
        ComparisonOperator::GreaterThan,
        ComparisonOperator::GreaterThanEquals,
        ComparisonOperator::LessThan,
        ComparisonOperator::LessThanEquals,
        ComparisonOperator::StartsWith,
        ComparisonOperator::NotStartsWith,
        ComparisonOperator::EndsWith,
        ComparisonOperator::NotEndsWith,
        ComparisonOperator::Contains,
        ComparisonOperator::NotContains,
        ComparisonOperator::WildCardEquals,
        ComparisonOperator::WildCardNotEquals,
        ComparisonOperator::WildCardIn,
        ComparisonOperator::IsNull,
        ComparisonOperator::IsNotNull,
        ComparisonOperator::EqualsEdgePoint,
    ];

    /// Canonical name, as used in structural criteria
    pub fn name(self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "eq",
            ComparisonOperator::NotEq => "notEq",
            ComparisonOperator::In => "in",
            ComparisonOperator::NotIn => "notIn",
            ComparisonOperator::GreaterThan => "greaterThan",
            ComparisonOperator::GreaterThanEquals => "greaterThanEquals",
            ComparisonOperator::LessThan => "lessThan",
            ComparisonOperator::LessThanEquals => "lessThanEquals",
            ComparisonOperator::StartsWith => "startsWith",
            ComparisonOperator::NotStartsWith => "notStartsWith",
            ComparisonOperator::EndsWith => "endsWith",
            ComparisonOperator::NotEndsWith => "notEndsWith",
            ComparisonOperator::Contains => "contains",
            ComparisonOperator::NotContains => "notContains",
            ComparisonOperator::WildCardEquals => "wildCardEquals",
            ComparisonOperator::WildCardNotEquals => "wildCardNotEquals",
            ComparisonOperator::WildCardIn => "wildCardIn",
            ComparisonOperator::IsNull => "isNull",
            ComparisonOperator::IsNotNull => "isNotNull",
            ComparisonOperator::EqualsEdgePoint => "equalsEdgePoint",
        }
    }

    /// Spelling in the operation language
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "==",
            ComparisonOperator::NotEq => "!=",
            ComparisonOperator::In => "in",
            ComparisonOperator::NotIn => "not in",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanEquals => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanEquals => "<=",
            ComparisonOperator::StartsWith => "startsWith",
            ComparisonOperator::NotStartsWith => "not startsWith",
            ComparisonOperator::EndsWith => "endsWith",
            ComparisonOperator::NotEndsWith => "not endsWith",
            ComparisonOperator::Contains => "contains",
            ComparisonOperator::NotContains => "not contains",
            ComparisonOperator::WildCardEquals => "wildCardEquals",
            ComparisonOperator::WildCardNotEquals => "not wildCardEquals",
            ComparisonOperator::WildCardIn => "wildCardIn",
            ComparisonOperator::IsNull => "is null",
            ComparisonOperator::IsNotNull => "is not null",
            ComparisonOperator::EqualsEdgePoint => "equalsEdgePoint",
        }
    }

    /// Parameter cardinality, `None` for unary operators
    pub fn cardinality(self) -> Option<Cardinality> {
        match self {
            ComparisonOperator::In | ComparisonOperator::NotIn | ComparisonOperator::WildCardIn => {
                Some(Cardinality::Many)
            }
            ComparisonOperator::IsNull
            | ComparisonOperator::IsNotNull
            | ComparisonOperator::EqualsEdgePoint => None,
            _ => Some(Cardinality::One),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Parameter {
    /// Unary operators take no value
    None,
    /// Single value
    One(Value),
    /// Ordered list of values
    Many(Vec<Value>),
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::None => Ok(()),
            Parameter::One(value) => write!(f, "{value}"),
            Parameter::Many(values) => {
                f.write_str("(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A leaf predicate: attribute, operator, value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    /// Compared attribute
    pub attribute: AttributeRef,
    /// Operator
    pub operator: ComparisonOperator,
    /// Parsed parameter
    pub parameter: Parameter,
}

impl Comparison {
    /// Create a comparison
    pub fn new(attribute: AttributeRef, operator: ComparisonOperator, parameter: Parameter) -> Self {
        Self {
            attribute,
            operator,
            parameter,
        }
    }
}

/// A node of the compiled predicate tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Matches everything
    All,
    /// Matches nothing
    None,
    /// Every child matches
    And(Vec<Operation>),
    /// Any child matches
    Or(Vec<Operation>),
    /// A related entity exists, optionally matching a filter
    Exists {
        /// Navigated relationship
        relationship: RelationshipPath,
        /// Filter on the target type
        filter: Option<Box<Operation>>,
    },
    /// No related entity exists (matching the filter, if any)
    NotExists {
        /// Navigated relationship
        relationship: RelationshipPath,
        /// Filter on the target type
        filter: Option<Box<Operation>>,
    },
    /// No entity along the relationship closure exists
    RecursiveNotExists {
        /// Navigated relationship
        relationship: RelationshipPath,
        /// Filter on the target type
        filter: Option<Box<Operation>>,
    },
    /// Attribute comparison
    Comparison(Comparison),
}

impl Operation {
    /// Conjunction; flattens nested conjunctions and drops `All`
    pub fn and(self, other: Operation) -> Operation {
        match (self, other) {
            (Operation::All, other) => other,
            (this, Operation::All) => this,
            (Operation::And(mut left), Operation::And(right)) => {
                left.extend(right);
                Operation::And(left)
            }
            (Operation::And(mut left), other) => {
                left.push(other);
                Operation::And(left)
            }
            (this, Operation::And(mut right)) => {
                right.insert(0, this);
                Operation::And(right)
            }
            (this, other) => Operation::And(vec![this, other]),
        }
    }

    /// Disjunction; flattens nested disjunctions
    pub fn or(self, other: Operation) -> Operation {
        match (self, other) {
            (Operation::Or(mut left), Operation::Or(right)) => {
                left.extend(right);
                Operation::Or(left)
            }
            (Operation::Or(mut left), other) => {
                left.push(other);
                Operation::Or(left)
            }
            (this, Operation::Or(mut right)) => {
                right.insert(0, this);
                Operation::Or(right)
            }
            (this, other) => Operation::Or(vec![this, other]),
        }
    }

    /// Shorthand for a comparison node
    pub fn compare(attribute: AttributeRef, operator: ComparisonOperator, parameter: Parameter) -> Operation {
        Operation::Comparison(Comparison::new(attribute, operator, parameter))
    }
}

fn write_existence(
    f: &mut fmt::Formatter<'_>,
    method: &str,
    relationship: &RelationshipPath,
    filter: &Option<Box<Operation>>,
) -> fmt::Result {
    match filter {
        Some(filter) => write!(f, "{relationship}.{method}({filter})"),
        None => write!(f, "{relationship}.{method}()"),
    }
}

/// Renders the operation language
impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::All => f.write_str("all"),
            Operation::None => f.write_str("none"),
            Operation::And(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" & ")?;
                    }
                    match child {
                        Operation::Or(_) => write!(f, "({child})")?,
                        _ => write!(f, "{child}")?,
                    }
                }
                Ok(())
            }
            Operation::Or(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
            Operation::Exists {
                relationship,
                filter,
            } => write_existence(f, "exists", relationship, filter),
            Operation::NotExists {
                relationship,
                filter,
            } => write_existence(f, "notExists", relationship, filter),
            Operation::RecursiveNotExists {
                relationship,
                filter,
            } => write_existence(f, "recursiveNotExists", relationship, filter),
            Operation::Comparison(comparison) => match comparison.parameter {
                Parameter::None => write!(f, "{} {}", comparison.attribute, comparison.operator.symbol()),
                _ => write!(
                    f,
                    "{} {} {}",
                    comparison.attribute,
                    comparison.operator.symbol(),
                    comparison.parameter
                ),
            },
        }
    }
}
