//! InMemoryMetadataProvider over a JSON catalog.

use std::sync::Arc;

use chrono::NaiveDate;
use groundwork::filters::FixedClock;
use groundwork::metadata::{InMemoryMetadataProvider, MetadataError, MetadataProvider, SchemaFilter};
use groundwork::query::{DecomposedQuery, Entity, QueryValue, TemporalFilter};
use groundwork::resolver::EntityColumnResolver;
use groundwork::ContextAssembler;

const CATALOG: &str = r#"{
    "tables": [
        {
            "name": "orders",
            "description": "Customer orders with fulfilment status",
            "columns": [
                {"name": "order_id", "data_type": "INTEGER", "is_primary_key": true, "nullable": false},
                {"name": "status", "data_type": "VARCHAR", "description": "Fulfilment status of the order"},
                {"name": "created_at", "data_type": "TIMESTAMP", "description": "When it was placed"},
                {"name": "amount", "data_type": "DECIMAL", "description": "Order total", "display_name": "Order Total"}
            ]
        },
        {
            "name": "tickets",
            "description": "Support tickets raised by customers",
            "columns": [
                {"name": "ticket_id", "data_type": "INTEGER", "is_primary_key": true},
                {"name": "urgency", "data_type": "VARCHAR", "description": "How urgent the ticket is"},
                {"name": "queue", "data_type": "VARCHAR", "description": "Team queue"}
            ]
        }
    ],
    "samples": {
        "tickets": {
            "queue": ["billing", "shipping", "returns"],
            "urgency": ["low", "medium", "high"]
        }
    },
    "sql_pairs": [
        {
            "question": "open tickets in the billing queue",
            "sql": "SELECT * FROM tickets WHERE queue = 'billing'",
            "entity_mappings": [
                {"entity_type": "team", "table": "tickets", "column": "queue", "confidence": 0.85}
            ]
        }
    ]
}"#;

fn provider() -> InMemoryMetadataProvider {
    InMemoryMetadataProvider::from_json(CATALOG).unwrap()
}

#[tokio::test]
async fn test_table_search_ranks_by_overlap() {
    let hits = provider()
        .search_schema("support tickets urgency", None, 3)
        .await
        .unwrap();

    assert_eq!(hits[0].name, "tickets");
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_column_search_is_scoped_to_table() {
    let filter = SchemaFilter::table("orders");
    let hits = provider()
        .search_schema("status open", Some(&filter), 3)
        .await
        .unwrap();

    assert_eq!(hits[0].name, "status");
    assert!(hits.iter().all(|h| h.name != "urgency"));
    assert_eq!(hits[0].data_type.as_deref(), Some("VARCHAR"));
}

#[tokio::test]
async fn test_sample_search_exact_value() {
    let hits = provider()
        .search_table_heads("Billing", Some("tickets"), 3)
        .await
        .unwrap();

    assert_eq!(hits[0].column_name, "queue");
    assert_eq!(hits[0].score, 1.0);
    assert_eq!(hits[0].matched_value.as_deref(), Some("billing"));
}

#[tokio::test]
async fn test_sample_search_other_table_is_empty() {
    let hits = provider()
        .search_table_heads("billing", Some("orders"), 3)
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_structural_lookups() {
    let provider = provider();

    let tickets = provider.get_table_metadata("TICKETS").await.unwrap().unwrap();
    assert_eq!(tickets.name, "tickets");
    assert!(provider.get_table_metadata("invoices").await.unwrap().is_none());

    assert_eq!(
        provider.get_primary_keys("orders").await.unwrap(),
        vec!["order_id".to_string()]
    );
    let amount = provider
        .get_column_metadata("orders", "amount")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(amount.display_name.as_deref(), Some("Order Total"));
    assert_eq!(provider.list_tables().await.unwrap(), vec!["orders", "tickets"]);
}

#[tokio::test]
async fn test_relevant_columns() {
    let columns = provider()
        .get_relevant_columns("orders", "order total and status")
        .await
        .unwrap();
    let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();

    assert!(names.contains(&"amount"));
    assert!(names.contains(&"status"));
    assert!(!names.contains(&"created_at"));
}

#[tokio::test]
async fn test_cascade_stages_against_catalog() {
    let resolver = EntityColumnResolver::new(Arc::new(provider()));

    // sampled value
    let hit = resolver
        .resolve("department", &QueryValue::text("shipping"), "tickets")
        .await
        .unwrap();
    assert_eq!((hit.column_name.as_str(), hit.strategy), ("queue", "sample_value"));

    // recorded mapping
    let hit = resolver
        .resolve("team", &QueryValue::text("escalations"), "tickets")
        .await
        .unwrap();
    assert_eq!((hit.column_name.as_str(), hit.confidence), ("queue", 0.85));
}

#[tokio::test]
async fn test_enrich_against_catalog() {
    let assembler = ContextAssembler::new(Arc::new(provider())).with_clock(Arc::new(FixedClock(
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
    )));

    let query = DecomposedQuery::new("retrieve_orders")
        .with_entity(Entity::new("status", "open"))
        .with_temporal_filter(TemporalFilter::relative("yesterday"))
        .with_context("open orders from yesterday", "");

    let data = assembler.enrich(&query).await.unwrap();

    assert_eq!(data.table_metadata.primary_table, "orders");
    assert_eq!(data.filters.len(), 2);
    assert_eq!(data.filters[0].column_name, "status");
    assert_eq!(data.filters[1].value, QueryValue::text("2024-06-29"));
    assert_eq!(data.output_columns.len(), 4);
}

#[test]
fn test_bad_catalogs_are_rejected() {
    assert!(matches!(
        InMemoryMetadataProvider::from_json("{"),
        Err(MetadataError::Parse(_))
    ));
    assert!(matches!(
        InMemoryMetadataProvider::from_path("/nonexistent/catalog.json"),
        Err(MetadataError::Io(_))
    ));
}
