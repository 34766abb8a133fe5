//! Attribute and relationship references carried by predicate nodes

use crate::model::ValueType;
use serde::Serialize;
use std::fmt;

/// An attribute reached from a root type through relationship navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributePath {
    /// Type the predicate is rooted at
    pub root_type: String,
    /// Relationship names navigated from the root, in order
    pub navigation: Vec<String>,
    /// Attribute name on the final type
    pub name: String,
    /// Value-type tag
    pub value_type: ValueType,
    /// Nullability
    pub nullable: bool,
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("this")?;
        for segment in &self.navigation {
            write!(f, ".{segment}")?;
        }
        write!(f, ".{}", self.name)
    }
}

/// Function names accepted on attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FunctionName {
    /// Lower-case a string
    ToLowerCase,
    /// Slice a string
    Substring,
    /// Absolute value of a number
    AbsoluteValue,
    /// Year of a date or timestamp
    Year,
    /// Month of a date or timestamp
    Month,
    /// Day of month of a date or timestamp
    DayOfMonth,
}

impl FunctionName {
    /// Every function
    pub const ALL: [FunctionName; 6] = [
        FunctionName::ToLowerCase,
        FunctionName::Substring,
        FunctionName::AbsoluteValue,
        FunctionName::Year,
        FunctionName::Month,
        FunctionName::DayOfMonth,
    ];

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            FunctionName::ToLowerCase => "toLowerCase",
            FunctionName::Substring => "substring",
            FunctionName::AbsoluteValue => "absoluteValue",
            FunctionName::Year => "year",
            FunctionName::Month => "month",
            FunctionName::DayOfMonth => "dayOfMonth",
        }
    }

    /// Attribute kinds the function applies to, for diagnostics
    pub fn applies_to(self) -> &'static str {
        match self {
            FunctionName::ToLowerCase | FunctionName::Substring => "StringAttributes",
            FunctionName::AbsoluteValue => "NumericAttributes",
            FunctionName::Year | FunctionName::Month | FunctionName::DayOfMonth => {
                "TimestampAttributes and DateAttributes"
            }
        }
    }
}

/// A function applied to an attribute, with its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeFunction {
    /// `toLowerCase(attr)`
    ToLowerCase,
    /// `substring(attr, start, end)`
    Substring {
        /// Start index, inclusive
        start: i32,
        /// End index, exclusive
        end: i32,
    },
    /// `abs(attr)`
    AbsoluteValue,
    /// `year(attr)`
    Year,
    /// `month(attr)`
    Month,
    /// `dayOfMonth(attr)`
    DayOfMonth,
}

impl AttributeFunction {
    /// Name without arguments
    pub fn name(self) -> FunctionName {
        match self {
            AttributeFunction::ToLowerCase => FunctionName::ToLowerCase,
            AttributeFunction::Substring { .. } => FunctionName::Substring,
            AttributeFunction::AbsoluteValue => FunctionName::AbsoluteValue,
            AttributeFunction::Year => FunctionName::Year,
            AttributeFunction::Month => FunctionName::Month,
            AttributeFunction::DayOfMonth => FunctionName::DayOfMonth,
        }
    }

    /// Value type of the derived attribute
    pub fn result_type(self, source: ValueType) -> ValueType {
        match self {
            AttributeFunction::ToLowerCase | AttributeFunction::Substring { .. } => {
                ValueType::String
            }
            AttributeFunction::AbsoluteValue => source,
            AttributeFunction::Year | AttributeFunction::Month | AttributeFunction::DayOfMonth => {
                ValueType::Integer
            }
        }
    }
}

/// The attribute side of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeRef {
    /// A schema attribute
    Simple(AttributePath),
    /// A function applied to another attribute
    Derived {
        /// Applied function
        function: AttributeFunction,
        /// Attribute the function reads
        source: Box<AttributeRef>,
    },
}

impl AttributeRef {
    /// Value type seen by operators
    pub fn value_type(&self) -> ValueType {
        match self {
            AttributeRef::Simple(path) => path.value_type,
            AttributeRef::Derived { function, source } => function.result_type(source.value_type()),
        }
    }

    /// Nullability, inherited through functions
    pub fn nullable(&self) -> bool {
        self.path().nullable
    }

    /// Name of the underlying schema attribute
    pub fn name(&self) -> &str {
        &self.path().name
    }

    /// Underlying schema attribute
    pub fn path(&self) -> &AttributePath {
        match self {
            AttributeRef::Simple(path) => path,
            AttributeRef::Derived { source, .. } => source.path(),
        }
    }

    /// Wrap in a function
    pub fn derive(self, function: AttributeFunction) -> Self {
        AttributeRef::Derived {
            function,
            source: Box::new(self),
        }
    }
}

impl From<AttributePath> for AttributeRef {
    fn from(path: AttributePath) -> Self {
        AttributeRef::Simple(path)
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeRef::Simple(path) => write!(f, "{path}"),
            AttributeRef::Derived {
                function: AttributeFunction::Substring { start, end },
                source,
            } => write!(f, "substring({source}, {start}, {end})"),
            AttributeRef::Derived { function, source } => {
                write!(f, "{}({source})", function.name().name())
            }
        }
    }
}

/// A chain of relationships navigated from a root type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipPath {
    /// Type the navigation starts at
    pub root_type: String,
    /// Relationship names, in order; never empty
    pub segments: Vec<String>,
    /// Type reached at the end
    pub target_type: String,
}

impl fmt::Display for RelationshipPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("this")?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}
