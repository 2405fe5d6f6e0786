//! Relative date resolution against a pinned clock.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{date, orders_table};
use groundwork::filters::{FixedClock, Operator, TemporalResolver, DATE_RANGE_FILTER};
use groundwork::metadata::{ColumnMetadata, TableMetadata};
use groundwork::query::{QueryValue, TemporalFilter};

fn resolver() -> TemporalResolver {
    TemporalResolver::new(Arc::new(FixedClock(date(2024, 3, 10))))
}

#[test]
fn test_expression_table() {
    let resolver = resolver();
    let cases: [(&str, &[&str]); 6] = [
        ("today", &["2024-03-10"]),
        ("yesterday", &["2024-03-09"]),
        ("last week", &["2024-03-03", "2024-03-10"]),
        ("last month", &["2024-02-09", "2024-03-10"]),
        ("this year", &["2024-01-01", "2024-03-10"]),
        ("last year", &["2023-01-01", "2023-12-31"]),
    ];

    for (expression, expected) in cases {
        assert_eq!(resolver.resolve_expression(expression), expected, "{expression}");
    }
}

#[test]
fn test_last_week_is_between() {
    let filter = resolver()
        .resolve_temporal(&TemporalFilter::relative("last week"), &orders_table())
        .unwrap();

    assert_eq!(filter.filter_name, DATE_RANGE_FILTER);
    assert_eq!(filter.column_name, "created_at");
    assert_eq!(filter.operator, Operator::Between);
    assert_eq!(filter.value, QueryValue::text_list(["2024-03-03", "2024-03-10"]));
}

#[test]
fn test_unknown_expression_uses_default_window() {
    let filter = resolver()
        .resolve_temporal(&TemporalFilter::relative("next sprint"), &orders_table())
        .unwrap();

    assert_eq!(filter.operator, Operator::Between);
    assert_eq!(filter.value, QueryValue::text_list(["2024-02-09", "2024-03-10"]));
}

#[test]
fn test_single_date_is_equality() {
    let filter = resolver()
        .resolve_temporal(&TemporalFilter::dates(["2024-01-15"]), &orders_table())
        .unwrap();

    assert_eq!(filter.operator, Operator::Eq);
    assert_eq!(filter.value, QueryValue::text("2024-01-15"));
}

#[test]
fn test_explicit_range_passes_through() {
    let filter = resolver()
        .resolve_temporal(
            &TemporalFilter::dates(["2024-01-01", "2024-01-31"]),
            &orders_table(),
        )
        .unwrap();

    assert_eq!(filter.operator, Operator::Between);
    assert_eq!(filter.value, QueryValue::text_list(["2024-01-01", "2024-01-31"]));
}

#[test]
fn test_unstructured_value_falls_back_to_greater_than() {
    let filter = resolver().build_filter(&TemporalFilter::default(), "created_at");

    assert_eq!(filter.operator, Operator::Gt);
    assert_eq!(filter.value, QueryValue::List(vec![]));

    let three = TemporalFilter::dates(["2024-01-01", "2024-02-01", "2024-03-01"]);
    assert_eq!(resolver().build_filter(&three, "created_at").operator, Operator::Gt);
}

#[test]
fn test_no_date_column_drops_filter() {
    let table = TableMetadata::new("regions")
        .with_column(ColumnMetadata::new("code", "CHAR(2)"))
        .with_column(ColumnMetadata::new("label", "VARCHAR"));

    assert!(resolver()
        .resolve_temporal(&TemporalFilter::relative("today"), &table)
        .is_none());
}

#[test]
fn test_date_column_by_name_when_types_are_opaque() {
    let table = TableMetadata::new("events")
        .with_column(ColumnMetadata::new("event_id", "BIGINT"))
        .with_column(ColumnMetadata::new("updated_on", "VARCHAR"));

    let filter = resolver()
        .resolve_temporal(&TemporalFilter::relative("yesterday"), &table)
        .unwrap();

    assert_eq!(filter.column_name, "updated_on");
    assert_eq!(filter.value, QueryValue::text("2024-03-09"));
}

#[test]
fn test_leap_year_last_month() {
    let resolver = TemporalResolver::new(Arc::new(FixedClock(date(2024, 3, 1))));
    assert_eq!(
        resolver.resolve_expression("last month"),
        vec!["2024-01-31", "2024-03-01"]
    );
}
