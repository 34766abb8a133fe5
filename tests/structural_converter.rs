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

//! Integration tests for the structural converter

mod common;

use common::{PERSON, criteria, schema};
use octofhir_predicate_compiler::{
    CompilerConfig, ErrorKind, Operation, OperationCompiler, StructuralConverter,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn convert(value: Value) -> Operation {
    let schema = schema();
    StructuralConverter::new(&schema)
        .convert(PERSON, &criteria(value))
        .unwrap()
}

#[rstest]
#[case(json!({"name": {"eq": "Bob"}}), "this.name == \"Bob\"")]
#[case(
    json!({"name": {"eq": "Bob"}, "age": {"greaterThan": 18}}),
    "this.name == \"Bob\" & this.age > 18"
)]
#[case(json!({"active": {"eq": true}}), "this.active == true")]
#[case(json!({"ssn": {"notIn": [1, 2]}}), "this.ssn not in (1, 2)")]
#[case(json!({"height": {"lessThanEquals": 1.5}}), "this.height <= 1.5")]
#[case(json!({"age": {"in": [3, 1, 3, 2]}}), "this.age in (3, 1, 2)")]
#[case(json!({"nickname": {"wildCardEq": "B?b*"}}), "this.nickname wildCardEquals \"B?b*\"")]
#[case(json!({"nickname": {"wildCardIn": ["A*", "B*"]}}), "this.nickname wildCardIn (\"A*\", \"B*\")")]
#[case(json!({"birthDate": {"greaterThan": "2000-01-01"}}), "this.birthDate > \"2000-01-01\"")]
#[case(
    json!({"createdAt": {"lessThan": "2024-01-31T10:00:00+02:00"}}),
    "this.createdAt < \"2024-01-31T08:00:00Z\""
)]
#[case(json!({"processingDate": {"equalsEdgePoint": {}}}), "this.processingDate equalsEdgePoint")]
#[case(json!({"orders": {"total": {"greaterThanEquals": 100}}}), "this.orders.total >= 100.0")]
#[case(
    json!({"orders": {"lineItems": {"sku": {"startsWith": "A"}}}}),
    "this.orders.lineItems.sku startsWith \"A\""
)]
#[case(
    json!({"OR": [{"age": {"lessThan": 18}}, {"age": {"greaterThan": 65}}]}),
    "this.age < 18 | this.age > 65"
)]
#[case(
    json!({"AND": [{"name": {"endsWith": "son"}}, {"OR": [{"age": {"eq": 1}}, {"age": {"eq": 2}}]}]}),
    "this.name endsWith \"son\" & (this.age == 1 | this.age == 2)"
)]
fn test_converts(#[case] input: Value, #[case] expected: &str) {
    assert_eq!(convert(input).to_string(), expected);
}

#[test]
fn test_empty_criteria_match_everything() {
    assert_eq!(convert(json!({})), Operation::All);
}

#[rstest]
#[case(json!({"age": {"eq": null}}), "this.age is null")]
#[case(json!({"age": {"notEq": null}}), "this.age is not null")]
#[case(json!({"age": {"isNull": {}}}), "this.age is null")]
#[case(json!({"processingDate": {"notEq": null}}), "this.processingDate is not null")]
fn test_null_checks_on_nullable_attributes(#[case] input: Value, #[case] expected: &str) {
    assert_eq!(convert(input).to_string(), expected);
}

#[test]
fn test_null_checks_fold_on_required_attributes() {
    assert_eq!(convert(json!({"name": {"eq": null}})), Operation::None);
    assert_eq!(convert(json!({"name": {"isNotNull": {}}})), Operation::All);
    assert_eq!(convert(json!({"businessDate": {"notEq": null}})), Operation::All);
}

#[rstest]
#[case(json!({"orders": {"exists": {}}}), "this.orders.exists()")]
#[case(
    json!({"orders": {"notExists": {"total": {"greaterThan": 100}}}}),
    "this.orders.notExists(this.total > 100.0)"
)]
#[case(json!({"manager": {"recursiveNotExists": {}}}), "this.manager.recursiveNotExists()")]
#[case(
    json!({"orders": {"lineItems": {"exists": {"price": {"lessThan": 5}}}}}),
    "this.orders.lineItems.exists(this.price < 5.0)"
)]
fn test_existence(#[case] input: Value, #[case] expected: &str) {
    assert_eq!(convert(input).to_string(), expected);
}

#[rstest]
#[case(json!({"name": {"toLowerCase": {"eq": "bob"}}}), "toLowerCase(this.name) == \"bob\"")]
#[case(json!({"name": {"lower": {"contains": "ob"}}}), "toLowerCase(this.name) contains \"ob\"")]
#[case(
    json!({"name": {"substring": {"start": 0, "end": 3, "eq": "Bob"}}}),
    "substring(this.name, 0, 3) == \"Bob\""
)]
#[case(json!({"weight": {"abs": {"greaterThan": 10}}}), "absoluteValue(this.weight) > 10.0")]
#[case(json!({"birthDate": {"year": {"in": [1990, 1991]}}}), "year(this.birthDate) in (1990, 1991)")]
#[case(json!({"orders": {"placedOn": {"month": {"eq": 12}}}}), "month(this.orders.placedOn) == 12")]
#[case(
    json!({"name": {"toLowerCase": {"substring": {"start": 1, "end": 2, "eq": "o"}}}}),
    "substring(toLowerCase(this.name), 1, 2) == \"o\""
)]
fn test_functions(#[case] input: Value, #[case] expected: &str) {
    assert_eq!(convert(input).to_string(), expected);
}

#[test]
fn test_matches_grammar_compiler() {
    let schema = schema();
    let structural = StructuralConverter::new(&schema)
        .convert(
            PERSON,
            &criteria(json!({
                "age": {"greaterThan": 18},
                "orders": {"notExists": {"total": {"lessThan": 10}}}
            })),
        )
        .unwrap();
    let grammar = OperationCompiler::new(&schema)
        .compile(
            PERSON,
            "this.age > 18 & this.orders.notExists(this.total < 10)",
        )
        .unwrap();
    assert_eq!(structural, grammar);
}

#[rstest]
#[case(
    json!({"AND": []}),
    ErrorKind::Structural,
    "Empty criteria node.",
    vec!["AND"]
)]
#[case(
    json!({"age": {}}),
    ErrorKind::Structural,
    "Empty criteria node.",
    vec!["age"]
)]
#[case(
    json!({"age": []}),
    ErrorKind::Structural,
    "Empty criteria node.",
    vec!["age"]
)]
#[case(
    json!({"orders": {"lineItems": []}}),
    ErrorKind::Structural,
    "Empty criteria node.",
    vec!["orders", "lineItems"]
)]
#[case(
    json!({"age": {"in": []}}),
    ErrorKind::Structural,
    "Empty criteria node.",
    vec!["age"]
)]
#[case(
    json!({"age": {"eq": {}}}),
    ErrorKind::Structural,
    "Empty criteria node.",
    vec!["age"]
)]
#[case(
    json!({"AND": [{"name": {"eq": "a"}}], "age": {"eq": 1}}),
    ErrorKind::Structural,
    "AND and OR cannot be combined with other criteria. Did you mean to nest the other criteria inside?",
    vec![]
)]
#[case(
    json!({"OR": [{"name": {"eq": "a"}}, 7]}),
    ErrorKind::Structural,
    "Expected a criteria object but found: 7",
    vec!["OR[1]"]
)]
#[case(
    json!({"AND": [{"orders": {"totl": {"eq": 1}}}]}),
    ErrorKind::SchemaResolution,
    "Could not find field 'totl' on type 'Order'",
    vec!["AND[0]", "orders", "totl"]
)]
#[case(
    json!({"age": {"startsWith": "1"}}),
    ErrorKind::Operator,
    "Unknown operation on IntegerAttribute: startsWith",
    vec!["age"]
)]
#[case(
    json!({"age": {"eq": "abc"}}),
    ErrorKind::Operator,
    "Expected <Integer> but found: <\"abc\">",
    vec!["age"]
)]
#[case(
    json!({"age": {"eq": [1, 2]}}),
    ErrorKind::Operator,
    "Operator 'eq' on IntegerAttribute requires a single value but found: (1, 2)",
    vec!["age"]
)]
#[case(
    json!({"age": {"in": 1}}),
    ErrorKind::Operator,
    "Operator 'in' on IntegerAttribute requires a list of values but found: 1",
    vec!["age"]
)]
#[case(
    json!({"age": {"in": [1, null]}}),
    ErrorKind::Operator,
    "Operator 'in' on IntegerAttribute does not accept null",
    vec!["age"]
)]
#[case(
    json!({"age": {"greaterThan": null}}),
    ErrorKind::Operator,
    "Operator 'greaterThan' on IntegerAttribute does not accept null",
    vec!["age"]
)]
#[case(
    json!({"processingDate": {"notEq": "2024-01-01T00:00:00Z"}}),
    ErrorKind::Operator,
    "notEq operation on AsOfAttribute only supported with null but found: \"2024-01-01T00:00:00Z\"",
    vec!["processingDate"]
)]
#[case(
    json!({"age": {"isNull": 1}}),
    ErrorKind::Operator,
    "isNull takes an empty object as its argument but found: 1",
    vec!["age"]
)]
#[case(
    json!({"name": {"substring": {"start": 0, "eq": "B"}}}),
    ErrorKind::Structural,
    "substring requires integer 'start' and 'end' but found: {\"start\":0,\"eq\":\"B\"}",
    vec!["name"]
)]
#[case(
    json!({"name": {"substring": {"start": 3, "end": 1, "eq": "B"}}}),
    ErrorKind::Operator,
    "Invalid substring range [3, 1]",
    vec!["name"]
)]
#[case(
    json!({"exists": {}}),
    ErrorKind::Structural,
    "exists must be nested inside a relationship",
    vec![]
)]
#[case(
    json!({"orders": {"notExists": {"price": {"eq": 1}}}}),
    ErrorKind::SchemaResolution,
    "Could not find field 'price' on type 'Order'",
    vec!["price"]
)]
fn test_errors(
    #[case] input: Value,
    #[case] kind: ErrorKind,
    #[case] message: &str,
    #[case] context: Vec<&str>,
) {
    let schema = schema();
    let error = StructuralConverter::new(&schema)
        .convert(PERSON, &criteria(input))
        .unwrap_err();
    assert_eq!(error.kind(), kind);
    assert_eq!(error.message(), message);
    assert_eq!(error.context_path(), context.as_slice());
}

#[test]
fn test_unknown_root_type() {
    let schema = schema();
    let error = StructuralConverter::new(&schema)
        .convert("com.example.Invoice", &criteria(json!({})))
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::SchemaResolution);
    assert_eq!(error.message(), "Could not find type 'com.example.Invoice'");
}

#[rstest]
#[case(json!({"age": {"in": [1, 2, 3]}}), "Operator 'in' on IntegerAttribute accepts at most 2 values but found 3")]
#[case(
    json!({"nickname": {"wildCardIn": ["a*", "b*", "c*", "d*"]}}),
    "Operator 'wildCardIn' on StringAttribute accepts at most 2 values but found 4"
)]
#[case(
    json!({"orders": {"quantity": {"notIn": [1, 1, 1]}}}),
    "Operator 'notIn' on IntegerAttribute accepts at most 2 values but found 3"
)]
fn test_list_size_limit_from_config(#[case] input: Value, #[case] message: &str) {
    let schema = schema();
    let config = CompilerConfig {
        max_list_size: 2,
        ..CompilerConfig::default()
    };
    let error = StructuralConverter::with_config(&schema, config)
        .convert(PERSON, &criteria(input))
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Operator);
    assert_eq!(error.message(), message);
}

#[rstest]
#[case(true, "this.age in (3, 1, 2)")]
#[case(false, "this.age in (3, 1, 3, 2)")]
fn test_list_deduplication_from_config(#[case] deduplicate_lists: bool, #[case] expected: &str) {
    let schema = schema();
    let config = CompilerConfig {
        deduplicate_lists,
        ..CompilerConfig::default()
    };
    let operation = StructuralConverter::with_config(&schema, config)
        .convert(PERSON, &criteria(json!({"age": {"in": [3, 1, 3, 2]}})))
        .unwrap();
    assert_eq!(operation.to_string(), expected);
}

#[test]
fn test_error_display_includes_context() {
    let schema = schema();
    let error = StructuralConverter::new(&schema)
        .convert(PERSON, &criteria(json!({"address": {"town": {"eq": "x"}}})))
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Could not find field 'town' on type 'Address' in [address, town]"
    );
}
