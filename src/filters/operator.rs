//! Comparison operator inference and value normalization.
//!
//! Operators are chosen from lexical cues in the value first (negations,
//! comparison phrases), then from the entity type, defaulting to equality.
//! Values are then reshaped into what the operator expects: a scalar, a
//! two-element range, or a list.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::query::QueryValue;

/// A SQL comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "BETWEEN")]
    Between,
    #[serde(rename = "IN")]
    In,
}

impl Operator {
    /// SQL spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Between => "BETWEEN",
            Self::In => "IN",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leading phrases that negate the value.
pub const NEGATION_PREFIXES: &[&str] = &["not ", "isn't ", "is not ", "doesn't ", "does not "];

/// Leading phrases that imply an ordering comparison.
const COMPARISON_PREFIXES: &[(&str, Operator)] = &[
    ("greater than", Operator::Gt),
    ("more than", Operator::Gt),
    ("over", Operator::Gt),
    ("less than", Operator::Lt),
    ("under", Operator::Lt),
    ("below", Operator::Lt),
    ("at least", Operator::GtEq),
    ("minimum", Operator::GtEq),
    ("at most", Operator::LtEq),
    ("maximum", Operator::LtEq),
];

/// Default operator per entity type.
const TYPE_OPERATORS: &[(&str, Operator)] = &[
    ("status", Operator::Eq),
    ("priority", Operator::Eq),
    ("category", Operator::Eq),
    ("type", Operator::Eq),
    ("count", Operator::Gt),
    ("amount", Operator::Gt),
    ("limit", Operator::LtEq),
    ("threshold", Operator::GtEq),
];

/// Words whose presence means the value embeds a number to extract.
const COMPARISON_WORDS: &[&str] = &["than", "least", "most", "minimum", "maximum"];

// A minus sign only counts at the start or after whitespace, so
// identifiers like `item-100` yield `100`.
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)-\d+(?:\.\d+)?|\d+(?:\.\d+)?").unwrap());

/// Choose the operator for an entity.
///
/// Negation prefixes win over comparison prefixes, which win over the
/// entity-type table. List values always compare with `IN`.
pub fn infer_operator(entity_type: &str, entity_value: &QueryValue) -> Operator {
    match entity_value {
        QueryValue::Text(text) => {
            if NEGATION_PREFIXES
                .iter()
                .any(|p| strip_prefix_ignore_case(text, p).is_some())
            {
                return Operator::NotEq;
            }

            if let Some((_, op)) = COMPARISON_PREFIXES.iter().find(|(p, _)| {
                strip_prefix_ignore_case(text, p)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
            }) {
                return *op;
            }
        }
        QueryValue::List(_) => return Operator::In,
        QueryValue::Integer(_) | QueryValue::Float(_) => {}
    }

    operator_for_type(entity_type)
}

/// The entity-type default, or `=`.
pub fn operator_for_type(entity_type: &str) -> Operator {
    let key = entity_type.trim().to_lowercase();
    TYPE_OPERATORS
        .iter()
        .find(|(t, _)| *t == key)
        .map(|(_, op)| *op)
        .unwrap_or(Operator::Eq)
}

/// Reshape a raw value into what `operator` expects.
pub fn normalize_value(value: &QueryValue, operator: Operator) -> QueryValue {
    match operator {
        Operator::Between => normalize_range(value),
        Operator::In => normalize_list(value),
        _ => normalize_scalar(value),
    }
}

fn normalize_scalar(value: &QueryValue) -> QueryValue {
    let QueryValue::Text(text) = value else {
        return value.clone();
    };

    let lower = text.to_lowercase();
    if COMPARISON_WORDS.iter().any(|w| lower.contains(w)) {
        if let Some(number) = first_number(text) {
            return number;
        }
    }

    for prefix in NEGATION_PREFIXES {
        if let Some(rest) = strip_prefix_ignore_case(text, prefix) {
            return QueryValue::text(rest.trim());
        }
    }

    value.clone()
}

fn normalize_range(value: &QueryValue) -> QueryValue {
    match value {
        QueryValue::List(items) if items.len() == 2 => value.clone(),
        QueryValue::Text(text) => text
            .split_once(" to ")
            .or_else(|| text.split_once(" - "))
            .map(|(low, high)| QueryValue::text_list([low.trim(), high.trim()]))
            .unwrap_or_else(|| value.clone()),
        _ => value.clone(),
    }
}

fn normalize_list(value: &QueryValue) -> QueryValue {
    match value {
        QueryValue::List(_) => value.clone(),
        QueryValue::Text(text) if text.contains(',') => {
            QueryValue::text_list(text.split(',').map(str::trim))
        }
        _ => QueryValue::List(vec![value.clone()]),
    }
}

/// First signed integer or decimal literal in `text`.
fn first_number(text: &str) -> Option<QueryValue> {
    let literal = NUMBER_PATTERN.find(text)?.as_str().trim_start();
    if !literal.contains('.') {
        if let Ok(i) = literal.parse::<i64>() {
            return Some(QueryValue::Integer(i));
        }
    }
    literal.parse::<f64>().ok().map(QueryValue::Float)
}

/// `text` minus `prefix`, matching ASCII case-insensitively.
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}
