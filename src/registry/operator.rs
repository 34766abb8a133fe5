//! Operator vocabulary and name lookup

use crate::operation::{ComparisonOperator, FunctionName};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::fmt;

/// Anything that can follow an attribute: a comparison or a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Comparison producing a predicate
    Compare(ComparisonOperator),
    /// Function producing a derived attribute
    Function(FunctionName),
}

/// Alternative spellings accepted on input
const ALIASES: [(&str, Operator); 5] = [
    ("wildCardEq", Operator::Compare(ComparisonOperator::WildCardEquals)),
    ("wildCardNotEq", Operator::Compare(ComparisonOperator::WildCardNotEquals)),
    ("lower", Operator::Function(FunctionName::ToLowerCase)),
    ("subString", Operator::Function(FunctionName::Substring)),
    ("abs", Operator::Function(FunctionName::AbsoluteValue)),
];

static OPERATOR_NAMES: Lazy<FxHashMap<&'static str, Operator>> = Lazy::new(|| {
    let mut names = FxHashMap::default();
    for operator in ComparisonOperator::ALL {
        names.insert(operator.name(), Operator::Compare(operator));
    }
    for function in FunctionName::ALL {
        names.insert(function.name(), Operator::Function(function));
    }
    names.extend(ALIASES);
    names
});

impl Operator {
    /// Look up an operator by canonical name or alias
    pub fn from_name(name: &str) -> Option<Operator> {
        OPERATOR_NAMES.get(name).copied()
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Operator::Compare(operator) => operator.name(),
            Operator::Function(function) => function.name(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
