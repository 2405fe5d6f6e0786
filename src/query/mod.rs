//! Decomposed natural-language queries.
//!
//! A [`DecomposedQuery`] is produced upstream (intent classification, entity
//! extraction, temporal tagging) and is the immutable input to context
//! assembly. Two JSON shapes are accepted:
//!
//! ```text
//! flat:      { "intent": {...}, "entities": [...], "temporal_filter": {...}, "context": {...} }
//! envelope:  { "query_decomposition": { "intent": {...}, "entity_extraction": [...],
//!                                       "temporal_filtering": {...}, "context": {...} } }
//! ```

mod value;

pub use value::QueryValue;

use serde::{Deserialize, Deserializer, Serialize};

/// Key wrapping the decomposition in upstream payloads.
const ENVELOPE_KEY: &str = "query_decomposition";

/// A structured, partially-understood natural-language query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecomposedQuery {
    pub intent: Intent,

    #[serde(default, alias = "entity_extraction")]
    pub entities: Vec<Entity>,

    #[serde(default, alias = "temporal_filtering")]
    pub temporal_filter: Option<TemporalFilter>,

    #[serde(default)]
    pub context: QueryContext,
}

impl DecomposedQuery {
    /// Create a query with the given intent goal and nothing else.
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            intent: Intent { goal: goal.into() },
            ..Default::default()
        }
    }

    /// Add an extracted entity.
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    /// Set the temporal filter.
    pub fn with_temporal_filter(mut self, filter: TemporalFilter) -> Self {
        self.temporal_filter = Some(filter);
        self
    }

    /// Set the descriptive context.
    pub fn with_context(
        mut self,
        description: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        self.context = QueryContext {
            description: description.into(),
            expected_output: expected_output.into(),
        };
        self
    }

    /// Parse either the flat or the enveloped JSON shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut raw: serde_json::Value = serde_json::from_str(json)?;
        let inner = match raw.get_mut(ENVELOPE_KEY) {
            Some(decomposition) => decomposition.take(),
            None => raw,
        };
        serde_json::from_value(inner)
    }

    /// Text used for the primary-table semantic search: the goal followed by
    /// every entity type and value.
    pub fn table_search_text(&self) -> String {
        let mut parts = vec![self.intent.goal.clone()];
        for entity in &self.entities {
            parts.push(entity.entity_type.clone());
            parts.push(entity.entity_value.to_string());
        }
        parts.join(" ")
    }
}

/// What the user wants to do, e.g. `retrieve_orders` or `count_tickets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(default)]
    pub goal: String,
}

/// A typed natural-language fragment, e.g. type `status`, value `"open"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub entity_type: String,

    /// `null` reads as an empty value and booleans as `"true"`/`"false"`.
    #[serde(default, deserialize_with = "lenient_value")]
    pub entity_value: QueryValue,

    /// A column chosen upstream; skips resolution when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_column: Option<String>,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, entity_value: impl Into<QueryValue>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_value: entity_value.into(),
            mapped_column: None,
        }
    }

    /// Pin the entity to a known column.
    pub fn mapped_to(mut self, column: impl Into<String>) -> Self {
        self.mapped_column = Some(column.into());
        self
    }

    /// The upstream column, ignoring blanks.
    pub fn premapped_column(&self) -> Option<&str> {
        self.mapped_column
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Explicit date bounds, or a relative expression still to be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalFilter {
    #[serde(default, deserialize_with = "one_or_many")]
    pub value: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_statement: Option<String>,
}

impl TemporalFilter {
    /// A filter with explicit date bounds.
    pub fn dates<I, S>(dates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value: dates.into_iter().map(Into::into).collect(),
            conditional_statement: None,
        }
    }

    /// A filter holding a relative expression such as `"last week"`.
    pub fn relative(expression: impl Into<String>) -> Self {
        Self {
            value: Vec::new(),
            conditional_statement: Some(expression.into()),
        }
    }

    /// The relative expression, ignoring blanks.
    pub fn expression(&self) -> Option<&str> {
        self.conditional_statement
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// No bounds and no expression.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.expression().is_none()
    }
}

/// Free-text description of the question and of the expected answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub expected_output: String,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Missing(Option<()>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Missing(_) => Vec::new(),
    })
}

fn lenient_value<'de, D>(deserializer: D) -> Result<QueryValue, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Value(QueryValue),
        Flag(bool),
        Missing(Option<()>),
    }

    Ok(match Lenient::deserialize(deserializer)? {
        Lenient::Value(v) => v,
        Lenient::Flag(b) => QueryValue::text(b.to_string()),
        Lenient::Missing(_) => QueryValue::default(),
    })
}
