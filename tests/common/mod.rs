//! Shared schema fixture for integration tests

#![allow(dead_code)]

use octofhir_predicate_compiler::InMemorySchema;
use serde_json::{Map, Value};

pub const PERSON: &str = "com.example.Person";
pub const ORDER: &str = "com.example.Order";

const SCHEMA: &str = r#"{
    "types": [
        {
            "name": "com.example.Person",
            "attributes": [
                {"name": "name", "type": "string"},
                {"name": "nickname", "type": "string", "nullable": true},
                {"name": "active", "type": "boolean"},
                {"name": "age", "type": "integer", "nullable": true},
                {"name": "ssn", "type": "long"},
                {"name": "height", "type": "float"},
                {"name": "weight", "type": "double", "nullable": true},
                {"name": "birthDate", "type": "date", "nullable": true},
                {"name": "createdAt", "type": "timestamp"},
                {"name": "processingDate", "type": "asOf", "nullable": true},
                {"name": "businessDate", "type": "asOf"}
            ],
            "relationships": [
                {"name": "orders", "target": "com.example.Order", "cardinality": "many"},
                {"name": "address", "target": "com.example.Address", "cardinality": "one"},
                {"name": "manager", "target": "com.example.Person", "cardinality": "one"}
            ]
        },
        {
            "name": "com.example.Order",
            "attributes": [
                {"name": "total", "type": "double"},
                {"name": "quantity", "type": "integer"},
                {"name": "placedOn", "type": "date"},
                {"name": "note", "type": "string", "nullable": true}
            ],
            "relationships": [
                {"name": "lineItems", "target": "com.example.LineItem", "cardinality": "many"},
                {"name": "buyer", "target": "com.example.Person", "cardinality": "one"}
            ]
        },
        {
            "name": "com.example.LineItem",
            "attributes": [
                {"name": "sku", "type": "string"},
                {"name": "price", "type": "double"}
            ]
        },
        {
            "name": "com.example.Address",
            "attributes": [
                {"name": "city", "type": "string"},
                {"name": "zip", "type": "string", "nullable": true}
            ]
        }
    ]
}"#;

/// Person/Order/LineItem/Address schema covering every value type
pub fn schema() -> InMemorySchema {
    InMemorySchema::from_json_str(SCHEMA).expect("fixture schema is valid")
}

/// Unwrap a `json!` object literal
pub fn criteria(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("criteria must be an object, got {other}"),
    }
}
