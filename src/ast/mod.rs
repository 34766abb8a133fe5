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

//! Parse tree of the operation language
//!
//! Every node carries the byte range of the source it was parsed from, so
//! semantic errors found while compiling can point back at the exact text.

#![warn(missing_docs)]

use crate::operation::ComparisonOperator;
use crate::parser::span::Spanned;
use crate::registry::Literal;

/// A composite operation: the unit the grammar compiles
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeOperation {
    /// `all`
    All,
    /// `none`
    None,
    /// `a & b & ...`
    And(Vec<Spanned<CompositeOperation>>),
    /// `a | b | ...`
    Or(Vec<Spanned<CompositeOperation>>),
    /// `( composite )`
    Group(Box<Spanned<CompositeOperation>>),
    /// `attribute is null`, `attribute equalsEdgePoint`, ...
    Unary {
        /// Tested attribute
        attribute: Spanned<AttributeExpr>,
        /// Unary operator
        operator: ComparisonOperator,
    },
    /// `attribute op parameter`
    Binary {
        /// Compared attribute
        attribute: Spanned<AttributeExpr>,
        /// Binary operator
        operator: ComparisonOperator,
        /// Literal or list of literals
        parameter: Spanned<Literal>,
    },
    /// `navigation.exists()`, `navigation not exists { ... }`, ...
    Existence {
        /// Navigated relationship chain
        navigation: Spanned<PathExpr>,
        /// Existence operator
        operator: ExistenceOperator,
        /// Filter compiled against the relationship's target type
        filter: Option<Box<Spanned<CompositeOperation>>>,
    },
}

/// Existence operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceOperator {
    /// Some related entity exists
    Exists,
    /// No related entity exists
    NotExists,
    /// No entity along the relationship closure exists
    RecursiveNotExists,
}

impl ExistenceOperator {
    /// Method name as written after a navigation
    pub fn from_method(name: &str) -> Option<Self> {
        match name {
            "exists" => Some(ExistenceOperator::Exists),
            "notExists" => Some(ExistenceOperator::NotExists),
            "recursiveNotExists" => Some(ExistenceOperator::RecursiveNotExists),
            _ => None,
        }
    }
}

/// Start of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRoot {
    /// `this`
    This,
    /// An explicit type name, asserted against the current type
    Class(String),
}

/// `this.a.b.c` or `Person.a.b.c`
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpr {
    /// Root of the path
    pub root: Spanned<PathRoot>,
    /// Names after the root; never empty
    pub segments: Vec<Spanned<String>>,
}

impl PathExpr {
    /// All segments but the last: the relationships to navigate
    pub fn navigation(&self) -> &[Spanned<String>] {
        self.segments.split_last().map_or(&[], |(_, init)| init)
    }

    /// Last segment
    pub fn terminal(&self) -> Option<&Spanned<String>> {
        self.segments.last()
    }
}

/// The attribute side of a leaf
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeExpr {
    /// Plain attribute path
    Path(PathExpr),
    /// `function(attribute, args...)`
    Function {
        /// Function name as written
        name: Spanned<String>,
        /// Wrapped attribute
        argument: Box<Spanned<AttributeExpr>>,
        /// Trailing integer arguments
        args: Vec<Spanned<i64>>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_navigation_and_terminal() {
        let path = PathExpr {
            root: Spanned::new(PathRoot::This, 0, 4),
            segments: vec![
                Spanned::new("orders".to_string(), 5, 11),
                Spanned::new("total".to_string(), 12, 17),
            ],
        };
        assert_eq!(path.navigation().len(), 1);
        assert_eq!(path.navigation()[0].value, "orders");
        assert_eq!(path.terminal().map(|s| s.value.as_str()), Some("total"));
    }

    #[test]
    fn test_existence_methods() {
        assert_eq!(
            ExistenceOperator::from_method("recursiveNotExists"),
            Some(ExistenceOperator::RecursiveNotExists)
        );
        assert_eq!(ExistenceOperator::from_method("exist"), None);
    }
}
