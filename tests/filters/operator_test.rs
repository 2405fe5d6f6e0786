//! Operator inference and value normalization.

use groundwork::filters::{infer_operator, normalize_value, Operator};
use groundwork::query::QueryValue;

fn text(s: &str) -> QueryValue {
    QueryValue::text(s)
}

#[test]
fn test_greater_than_amount() {
    let value = text("greater than 100");
    let op = infer_operator("amount", &value);

    assert_eq!(op, Operator::Gt);
    assert_eq!(normalize_value(&value, op), QueryValue::Integer(100));
}

#[test]
fn test_comparison_prefixes() {
    let cases = [
        ("more than 5", Operator::Gt),
        ("over 5", Operator::Gt),
        ("less than 5", Operator::Lt),
        ("under 5", Operator::Lt),
        ("below 5", Operator::Lt),
        ("at least 5", Operator::GtEq),
        ("minimum 5", Operator::GtEq),
        ("at most 5", Operator::LtEq),
        ("maximum 5", Operator::LtEq),
    ];

    for (raw, expected) in cases {
        assert_eq!(infer_operator("quantity", &text(raw)), expected, "{raw}");
    }
}

#[test]
fn test_negation_prefixes() {
    for raw in ["not closed", "isn't closed", "is not closed", "doesn't closed", "does not closed"] {
        let value = text(raw);
        let op = infer_operator("status", &value);
        assert_eq!(op, Operator::NotEq, "{raw}");
        assert_eq!(normalize_value(&value, op), text("closed"), "{raw}");
    }
}

#[test]
fn test_negation_is_case_insensitive() {
    let value = text("Not Shipped");
    let op = infer_operator("status", &value);

    assert_eq!(op, Operator::NotEq);
    assert_eq!(normalize_value(&value, op), text("Shipped"));
}

#[test]
fn test_type_table_defaults() {
    assert_eq!(infer_operator("status", &text("open")), Operator::Eq);
    assert_eq!(infer_operator("category", &text("books")), Operator::Eq);
    assert_eq!(infer_operator("count", &text("5")), Operator::Gt);
    assert_eq!(infer_operator("limit", &text("10")), Operator::LtEq);
    assert_eq!(infer_operator("threshold", &text("0.5")), Operator::GtEq);
    assert_eq!(infer_operator("region", &text("emea")), Operator::Eq);
}

#[test]
fn test_over_without_comparison_word_keeps_text() {
    // only than/least/most/minimum/maximum trigger numeric extraction
    let value = text("over 100");
    let op = infer_operator("amount", &value);

    assert_eq!(op, Operator::Gt);
    assert_eq!(normalize_value(&value, op), text("over 100"));
}

#[test]
fn test_decimal_extraction() {
    let value = text("at least 12.5");
    let op = infer_operator("price", &value);

    assert_eq!(normalize_value(&value, op), QueryValue::Float(12.5));
}

#[test]
fn test_hyphen_inside_a_word_is_not_a_sign() {
    let cases = [
        ("greater than item-100", Operator::Gt, QueryValue::Integer(100)),
        ("at least order-5", Operator::GtEq, QueryValue::Integer(5)),
        ("at least -5", Operator::GtEq, QueryValue::Integer(-5)),
        ("less than -2.5", Operator::Lt, QueryValue::Float(-2.5)),
    ];

    for (raw, expected_op, expected_value) in cases {
        let value = text(raw);
        let op = infer_operator("quantity", &value);
        assert_eq!(op, expected_op, "{raw}");
        assert_eq!(normalize_value(&value, op), expected_value, "{raw}");
    }
}

#[test]
fn test_in_splits_comma_list() {
    let value = text("red, blue, green");
    assert_eq!(
        normalize_value(&value, Operator::In),
        QueryValue::text_list(["red", "blue", "green"])
    );
}

#[test]
fn test_in_wraps_scalar_and_keeps_list() {
    assert_eq!(
        normalize_value(&text("red"), Operator::In),
        QueryValue::List(vec![text("red")])
    );

    let list = QueryValue::text_list(["a", "b"]);
    assert_eq!(infer_operator("color", &list), Operator::In);
    assert_eq!(normalize_value(&list, Operator::In), list);
}

#[test]
fn test_between_splits_bounds() {
    assert_eq!(
        normalize_value(&text("10 to 20"), Operator::Between),
        QueryValue::text_list(["10", "20"])
    );
    assert_eq!(
        normalize_value(&text("2024-01-01 - 2024-01-31"), Operator::Between),
        QueryValue::text_list(["2024-01-01", "2024-01-31"])
    );

    let pair = QueryValue::List(vec![QueryValue::Integer(1), QueryValue::Integer(9)]);
    assert_eq!(normalize_value(&pair, Operator::Between), pair);
}

#[test]
fn test_operator_display() {
    let rendered: Vec<_> = [
        Operator::Eq,
        Operator::NotEq,
        Operator::Lt,
        Operator::Gt,
        Operator::LtEq,
        Operator::GtEq,
        Operator::Between,
        Operator::In,
    ]
    .iter()
    .map(ToString::to_string)
    .collect();

    assert_eq!(rendered, vec!["=", "!=", "<", ">", "<=", ">=", "BETWEEN", "IN"]);
}
