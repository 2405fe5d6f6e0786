//! Metadata types exchanged with a provider.
//!
//! Structural metadata (`TableMetadata`, `ColumnMetadata`) plus the ranked
//! hit types returned by the three search capabilities.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Structural metadata for a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name.
    pub name: String,
    /// Human description.
    #[serde(default)]
    pub description: String,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
    /// Primary key column names.
    #[serde(default)]
    pub primary_keys: BTreeSet<String>,
}

impl TableMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a column. Key columns are also recorded in `primary_keys`.
    pub fn with_column(mut self, column: ColumnMetadata) -> Self {
        if column.is_primary_key {
            self.primary_keys.insert(column.name.clone());
        }
        self.columns.push(column);
        self
    }

    /// Look up a column by name, case-insensitively.
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .or_else(|| self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
    }

    /// Whether the column is flagged as, or listed among, the primary keys.
    pub fn is_key_column(&self, column: &ColumnMetadata) -> bool {
        column.is_primary_key || self.primary_keys.contains(&column.name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Structural metadata for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    /// Database type name, e.g. `VARCHAR`, `TIMESTAMP`.
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            description: String::new(),
            is_primary_key: false,
            display_name: None,
        }
    }

    /// Mark as a non-nullable primary key.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// Restricts a schema search to one table's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFilter {
    pub table: String,
}

impl SchemaFilter {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

/// A ranked table or column from a schema search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaHit {
    /// Table name (unfiltered search) or column name (filtered search).
    pub name: String,
    /// Similarity in [0, 1].
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaHit {
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
            data_type: None,
            description: None,
        }
    }
}

/// A column whose sampled values resemble the searched value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleHit {
    pub column_name: String,
    #[serde(default)]
    pub score: f64,
    /// The sampled value that produced the score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_value: Option<String>,
}

impl SampleHit {
    pub fn new(column_name: impl Into<String>, score: f64) -> Self {
        Self {
            column_name: column_name.into(),
            score,
            matched_value: None,
        }
    }
}

/// A recorded entity-to-column decision attached to a prior query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMapping {
    pub entity_type: String,
    pub table: String,
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A previously resolved natural-language -> SQL example.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlPairExample {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub sql: String,
    /// Similarity to the search text; set by the provider.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub entity_mappings: Vec<EntityMapping>,
}
