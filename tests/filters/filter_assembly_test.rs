//! Filter assembly over entities and temporal filters.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{date, orders_table, ScriptedProvider};
use groundwork::filters::{FilterAssembler, FilterSpec, FixedClock, Operator, TemporalResolver};
use groundwork::query::{Entity, QueryValue, TemporalFilter};
use groundwork::resolver::EntityColumnResolver;
use groundwork::ContextError;

fn assembler(provider: ScriptedProvider) -> FilterAssembler<ScriptedProvider> {
    FilterAssembler::new(
        EntityColumnResolver::new(Arc::new(provider)),
        TemporalResolver::new(Arc::new(FixedClock(date(2024, 3, 10)))),
    )
}

#[tokio::test]
async fn test_entity_then_temporal_order() {
    let provider = ScriptedProvider::new()
        .with_table(orders_table())
        .with_column_hit("orders", "status", 0.9);

    let filters = assembler(provider)
        .build_filters(
            &[Entity::new("status", "open")],
            Some(&TemporalFilter::relative("last month")),
            &orders_table(),
        )
        .await
        .unwrap();

    assert_eq!(
        filters,
        vec![
            FilterSpec::new("status", "status", Operator::Eq, "open"),
            FilterSpec::new(
                "date_range",
                "created_at",
                Operator::Between,
                QueryValue::text_list(["2024-02-09", "2024-03-10"]),
            ),
        ]
    );
}

#[tokio::test]
async fn test_negated_value_is_stripped() {
    let provider = ScriptedProvider::new()
        .with_table(orders_table())
        .with_column_hit("orders", "status", 0.9);

    let filters = assembler(provider)
        .build_filters(&[Entity::new("status", "not closed")], None, &orders_table())
        .await
        .unwrap();

    assert_eq!(
        filters,
        vec![FilterSpec::new("status", "status", Operator::NotEq, "closed")]
    );
}

#[tokio::test]
async fn test_cascade_failure_drops_only_that_entity() {
    // no scripted hits: "region" exhausts the cascade, "status" falls to the heuristic
    let provider = ScriptedProvider::new().with_table(orders_table());

    let filters = assembler(provider)
        .build_filters(
            &[Entity::new("region", "emea"), Entity::new("status", "open")],
            None,
            &orders_table(),
        )
        .await
        .unwrap();

    assert_eq!(filters, vec![FilterSpec::new("status", "status", Operator::Eq, "open")]);
}

#[tokio::test]
async fn test_null_entity_value_is_skipped() {
    let entities: Vec<Entity> = serde_json::from_str(
        r#"[{"entity_type": "status", "entity_value": null},
            {"entity_type": "status", "entity_value": "open"}]"#,
    )
    .unwrap();
    let provider = ScriptedProvider::new()
        .with_table(orders_table())
        .with_column_hit("orders", "status", 0.9);

    let filters = assembler(provider)
        .build_filters(&entities, None, &orders_table())
        .await
        .unwrap();

    assert_eq!(filters, vec![FilterSpec::new("status", "status", Operator::Eq, "open")]);
}

#[tokio::test]
async fn test_resolved_column_missing_from_table_is_dropped() {
    let provider = ScriptedProvider::new()
        .with_table(orders_table())
        .with_column_hit("orders", "order_state", 0.95);

    let filters = assembler(provider)
        .build_filters(&[Entity::new("status", "open")], None, &orders_table())
        .await
        .unwrap();

    assert!(filters.is_empty());
}

#[tokio::test]
async fn test_premapped_column_skips_resolution() {
    let provider = Arc::new(ScriptedProvider::new().with_table(orders_table()));
    let assembler = FilterAssembler::new(
        EntityColumnResolver::new(provider.clone()),
        TemporalResolver::new(Arc::new(FixedClock(date(2024, 3, 10)))),
    );

    let filters = assembler
        .build_filters(
            &[Entity::new("total", "greater than 100").mapped_to("amount")],
            None,
            &orders_table(),
        )
        .await
        .unwrap();

    assert_eq!(
        filters,
        vec![FilterSpec::new("total", "amount", Operator::Gt, 100i64)]
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_list_value_becomes_in() {
    let provider = ScriptedProvider::new().with_table(orders_table());
    let entity =
        Entity::new("status", QueryValue::text_list(["open", "pending"])).mapped_to("status");

    let filters = assembler(provider)
        .build_filters(&[entity], None, &orders_table())
        .await
        .unwrap();

    assert_eq!(filters[0].operator, Operator::In);
    assert_eq!(filters[0].value, QueryValue::text_list(["open", "pending"]));
}

#[tokio::test]
async fn test_provider_failure_aborts() {
    let provider = ScriptedProvider::new().with_table(orders_table()).failing();

    let err = assembler(provider)
        .build_filters(&[Entity::new("status", "open")], None, &orders_table())
        .await
        .unwrap_err();

    assert!(matches!(err, ContextError::Provider(_)));
}
