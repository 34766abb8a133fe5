//! Operator acceptance per value type

mod common;

use common::{PERSON, criteria, schema};
use octofhir_predicate_compiler::model::ValueType;
use octofhir_predicate_compiler::registry::{Arity, OperatorRegistry};
use octofhir_predicate_compiler::{ErrorKind, StructuralConverter};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

const STRING_ONLY: [&str; 10] = [
    "startsWith",
    "notStartsWith",
    "endsWith",
    "notEndsWith",
    "contains",
    "notContains",
    "wildCardEquals",
    "wildCardNotEquals",
    "wildCardIn",
    "toLowerCase",
];

const ORDERING: [&str; 4] = [
    "greaterThan",
    "greaterThanEquals",
    "lessThan",
    "lessThanEquals",
];

#[rstest]
fn test_every_type_accepts_null_checks(
    #[values(
        ValueType::String,
        ValueType::Boolean,
        ValueType::Integer,
        ValueType::Long,
        ValueType::Float,
        ValueType::Double,
        ValueType::Date,
        ValueType::Timestamp,
        ValueType::AsOf
    )]
    value_type: ValueType,
    #[values("isNull", "isNotNull", "eq", "notEq")] name: &str,
) {
    let registry = OperatorRegistry::default();
    assert!(registry.resolve_operator(value_type, name).is_ok());
}

#[rstest]
#[case(ValueType::String, true, true)]
#[case(ValueType::Boolean, false, false)]
#[case(ValueType::Integer, false, true)]
#[case(ValueType::Long, false, true)]
#[case(ValueType::Float, false, true)]
#[case(ValueType::Double, false, true)]
#[case(ValueType::Date, false, true)]
#[case(ValueType::Timestamp, false, true)]
#[case(ValueType::AsOf, false, false)]
fn test_string_and_ordering_operators(
    #[case] value_type: ValueType,
    #[case] string_ops: bool,
    #[case] ordering: bool,
) {
    let registry = OperatorRegistry::default();
    for name in STRING_ONLY {
        assert_eq!(
            registry.resolve_operator(value_type, name).is_ok(),
            string_ops,
            "{name} on {value_type}"
        );
    }
    for name in ORDERING {
        assert_eq!(
            registry.resolve_operator(value_type, name).is_ok(),
            ordering,
            "{name} on {value_type}"
        );
    }
}

#[rstest]
#[case(ValueType::String, "in", true)]
#[case(ValueType::Boolean, "notIn", true)]
#[case(ValueType::Double, "in", true)]
#[case(ValueType::AsOf, "in", false)]
#[case(ValueType::AsOf, "equalsEdgePoint", true)]
#[case(ValueType::Timestamp, "equalsEdgePoint", false)]
#[case(ValueType::Integer, "abs", true)]
#[case(ValueType::Float, "absoluteValue", true)]
#[case(ValueType::String, "abs", false)]
#[case(ValueType::Date, "year", true)]
#[case(ValueType::Timestamp, "dayOfMonth", true)]
#[case(ValueType::AsOf, "month", false)]
#[case(ValueType::String, "subString", true)]
#[case(ValueType::String, "lower", true)]
#[case(ValueType::String, "wildCardEq", true)]
#[case(ValueType::String, "like", false)]
fn test_individual_operators(
    #[case] value_type: ValueType,
    #[case] name: &str,
    #[case] accepted: bool,
) {
    let registry = OperatorRegistry::default();
    assert_eq!(registry.resolve_operator(value_type, name).is_ok(), accepted);
}

#[rstest]
#[case("eq", Arity::One)]
#[case("in", Arity::Many)]
#[case("wildCardIn", Arity::Many)]
#[case("isNull", Arity::Unary)]
#[case("toLowerCase", Arity::Derive)]
fn test_arity(#[case] name: &str, #[case] arity: Arity) {
    let registry = OperatorRegistry::default();
    let (_, found) = registry.resolve_operator(ValueType::String, name).unwrap();
    assert_eq!(found, arity);
}

#[rstest]
#[case("name", "StringAttribute")]
#[case("active", "BooleanAttribute")]
#[case("ssn", "LongAttribute")]
#[case("height", "FloatAttribute")]
#[case("birthDate", "DateAttribute")]
#[case("createdAt", "TimestampAttribute")]
#[case("businessDate", "AsOfAttribute")]
fn test_unknown_operator_names_the_attribute_kind(#[case] field: &str, #[case] kind: &str) {
    let schema = schema();
    let error = StructuralConverter::new(&schema)
        .convert(PERSON, &criteria(json!({ field: {"between": [1, 2]} })))
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Operator);
    assert_eq!(error.message(), format!("Unknown operation on {kind}: between"));
}
