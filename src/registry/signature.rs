//! Per-value-type operator tables
//!
//! Each value type has one table listing the operators it accepts and the
//! shape of parameter each operator takes. Anything absent from the table is
//! rejected for that type.

use super::operator::Operator;
use crate::model::{Cardinality, ValueType};
use crate::operation::{ComparisonOperator, FunctionName};

/// Parameter shape an operator takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// No parameter; an empty object in structural criteria
    Unary,
    /// A single value
    One,
    /// An ordered list of values
    Many,
    /// A function producing a derived attribute, followed by nested operators
    Derive,
}

impl Arity {
    /// Parameter cardinality, if the operator takes values
    pub fn cardinality(self) -> Option<Cardinality> {
        match self {
            Arity::One => Some(Cardinality::One),
            Arity::Many => Some(Cardinality::Many),
            Arity::Unary | Arity::Derive => None,
        }
    }
}

/// One table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperatorSignature {
    /// Operator
    pub operator: Operator,
    /// Parameter shape
    pub arity: Arity,
}

const fn compare(operator: ComparisonOperator, arity: Arity) -> OperatorSignature {
    OperatorSignature {
        operator: Operator::Compare(operator),
        arity,
    }
}

const fn derive(function: FunctionName) -> OperatorSignature {
    OperatorSignature {
        operator: Operator::Function(function),
        arity: Arity::Derive,
    }
}

use ComparisonOperator as Op;

static STRING_OPERATORS: [OperatorSignature; 21] = [
    compare(Op::Eq, Arity::One),
    compare(Op::NotEq, Arity::One),
    compare(Op::In, Arity::Many),
    compare(Op::NotIn, Arity::Many),
    compare(Op::GreaterThan, Arity::One),
    compare(Op::GreaterThanEquals, Arity::One),
    compare(Op::LessThan, Arity::One),
    compare(Op::LessThanEquals, Arity::One),
    compare(Op::StartsWith, Arity::One),
    compare(Op::NotStartsWith, Arity::One),
    compare(Op::EndsWith, Arity::One),
    compare(Op::NotEndsWith, Arity::One),
    compare(Op::Contains, Arity::One),
    compare(Op::NotContains, Arity::One),
    compare(Op::WildCardEquals, Arity::One),
    compare(Op::WildCardNotEquals, Arity::One),
    compare(Op::WildCardIn, Arity::Many),
    compare(Op::IsNull, Arity::Unary),
    compare(Op::IsNotNull, Arity::Unary),
    derive(FunctionName::ToLowerCase),
    derive(FunctionName::Substring),
];

static BOOLEAN_OPERATORS: [OperatorSignature; 6] = [
    compare(Op::Eq, Arity::One),
    compare(Op::NotEq, Arity::One),
    compare(Op::In, Arity::Many),
    compare(Op::NotIn, Arity::Many),
    compare(Op::IsNull, Arity::Unary),
    compare(Op::IsNotNull, Arity::Unary),
];

static NUMERIC_OPERATORS: [OperatorSignature; 11] = [
    compare(Op::Eq, Arity::One),
    compare(Op::NotEq, Arity::One),
    compare(Op::In, Arity::Many),
    compare(Op::NotIn, Arity::Many),
    compare(Op::GreaterThan, Arity::One),
    compare(Op::GreaterThanEquals, Arity::One),
    compare(Op::LessThan, Arity::One),
    compare(Op::LessThanEquals, Arity::One),
    compare(Op::IsNull, Arity::Unary),
    compare(Op::IsNotNull, Arity::Unary),
    derive(FunctionName::AbsoluteValue),
];

static TEMPORAL_OPERATORS: [OperatorSignature; 13] = [
    compare(Op::Eq, Arity::One),
    compare(Op::NotEq, Arity::One),
    compare(Op::In, Arity::Many),
    compare(Op::NotIn, Arity::Many),
    compare(Op::GreaterThan, Arity::One),
    compare(Op::GreaterThanEquals, Arity::One),
    compare(Op::LessThan, Arity::One),
    compare(Op::LessThanEquals, Arity::One),
    compare(Op::IsNull, Arity::Unary),
    compare(Op::IsNotNull, Arity::Unary),
    derive(FunctionName::Year),
    derive(FunctionName::Month),
    derive(FunctionName::DayOfMonth),
];

// notEq is listed but only accepts null
static AS_OF_OPERATORS: [OperatorSignature; 5] = [
    compare(Op::Eq, Arity::One),
    compare(Op::NotEq, Arity::One),
    compare(Op::IsNull, Arity::Unary),
    compare(Op::IsNotNull, Arity::Unary),
    compare(Op::EqualsEdgePoint, Arity::Unary),
];

/// Operator table of a value type
pub fn signatures(value_type: ValueType) -> &'static [OperatorSignature] {
    match value_type {
        ValueType::String => &STRING_OPERATORS,
        ValueType::Boolean => &BOOLEAN_OPERATORS,
        ValueType::Integer | ValueType::Long | ValueType::Float | ValueType::Double => {
            &NUMERIC_OPERATORS
        }
        ValueType::Date | ValueType::Timestamp => &TEMPORAL_OPERATORS,
        ValueType::AsOf => &AS_OF_OPERATORS,
    }
}

/// Arity of an operator on a value type, `None` if the type does not accept it
pub fn arity_of(value_type: ValueType, operator: Operator) -> Option<Arity> {
    signatures(value_type)
        .iter()
        .find(|signature| signature.operator == operator)
        .map(|signature| signature.arity)
}
