//! Decomposed query intake.

use groundwork::query::{DecomposedQuery, Entity, QueryContext, QueryValue, TemporalFilter};

#[test]
fn test_parse_flat_shape() {
    let json = r#"{
        "intent": {"goal": "retrieve_orders"},
        "entities": [
            {"entity_type": "status", "entity_value": "open"},
            {"entity_type": "amount", "entity_value": 100, "mapped_column": "amount"}
        ],
        "temporal_filter": {"value": [], "conditional_statement": "last month"},
        "context": {"description": "open orders", "expected_output": "order list"}
    }"#;

    let query = DecomposedQuery::from_json(json).unwrap();

    assert_eq!(query.intent.goal, "retrieve_orders");
    assert_eq!(
        query.entities,
        vec![
            Entity::new("status", "open"),
            Entity::new("amount", 100i64).mapped_to("amount"),
        ]
    );
    assert_eq!(query.temporal_filter, Some(TemporalFilter::relative("last month")));
    assert_eq!(query.context.expected_output, "order list");
}

#[test]
fn test_parse_envelope_shape() {
    let json = r#"{
        "query_decomposition": {
            "intent": {"goal": "count_tickets"},
            "entity_extraction": [
                {"entity_type": "priority", "entity_value": "high"}
            ],
            "temporal_filtering": {"value": ["2024-01-01", "2024-01-31"]},
            "context": {"description": "high priority tickets in January"}
        }
    }"#;

    let query = DecomposedQuery::from_json(json).unwrap();

    assert_eq!(query.intent.goal, "count_tickets");
    assert_eq!(query.entities, vec![Entity::new("priority", "high")]);
    assert_eq!(
        query.temporal_filter,
        Some(TemporalFilter::dates(["2024-01-01", "2024-01-31"]))
    );
    assert_eq!(query.context.expected_output, "");
}

#[test]
fn test_missing_optional_sections() {
    let query = DecomposedQuery::from_json(r#"{"intent": {"goal": "list_regions"}}"#).unwrap();

    assert!(query.entities.is_empty());
    assert!(query.temporal_filter.is_none());
    assert_eq!(query.context, QueryContext::default());
}

#[test]
fn test_entity_value_shapes() {
    let json = r#"{
        "intent": {"goal": "g"},
        "entities": [
            {"entity_type": "a", "entity_value": 2.5},
            {"entity_type": "b", "entity_value": ["red", "blue"]},
            {"entity_type": "c"}
        ]
    }"#;

    let query = DecomposedQuery::from_json(json).unwrap();
    let values: Vec<_> = query.entities.iter().map(|e| e.entity_value.clone()).collect();

    assert_eq!(
        values,
        vec![
            QueryValue::Float(2.5),
            QueryValue::text_list(["red", "blue"]),
            QueryValue::text(""),
        ]
    );
    assert!(values[2].is_empty());
}

#[test]
fn test_null_and_boolean_entity_values() {
    let json = r#"{
        "intent": {"goal": "g"},
        "entities": [
            {"entity_type": "region", "entity_value": null},
            {"entity_type": "is_active", "entity_value": true},
            {"entity_type": "is_paid", "entity_value": false}
        ]
    }"#;

    let query = DecomposedQuery::from_json(json).unwrap();
    let values: Vec<_> = query.entities.iter().map(|e| e.entity_value.clone()).collect();

    assert_eq!(
        values,
        vec![QueryValue::text(""), QueryValue::text("true"), QueryValue::text("false")]
    );
}

#[test]
fn test_malformed_json_is_an_error() {
    assert!(DecomposedQuery::from_json(r#"{"intent": "#).is_err());
    assert!(DecomposedQuery::from_json(r#"{"entities": []}"#).is_err());
}

#[test]
fn test_serializes_back_to_flat_shape() {
    let query = DecomposedQuery::new("retrieve_orders")
        .with_entity(Entity::new("status", "open"))
        .with_context("open orders", "");

    let value = serde_json::to_value(&query).unwrap();

    assert_eq!(value["entities"][0]["entity_value"], "open");
    assert!(value["entities"][0].get("mapped_column").is_none());
    assert_eq!(value["temporal_filter"], serde_json::Value::Null);
}
