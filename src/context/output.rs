//! Output-column selection.

use inflector::Inflector;
use serde::{Deserialize, Serialize};

use crate::metadata::{ColumnMetadata, TableMetadata};

/// Intent goal prefixes that restrict output to key columns.
pub const AGGREGATE_PREFIXES: &[&str] = &["count_", "aggregate_"];

/// A column to project in the generated query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumnSpec {
    pub column_name: String,
    /// Human-readable label.
    pub alias: String,
    pub description: String,
    pub data_type: String,
    pub nullable: bool,
}

impl From<&ColumnMetadata> for OutputColumnSpec {
    fn from(column: &ColumnMetadata) -> Self {
        Self {
            column_name: column.name.clone(),
            alias: display_name(column),
            description: column.description.clone(),
            data_type: column.data_type.clone(),
            nullable: column.nullable,
        }
    }
}

/// The metadata display name, else the column name with underscores as
/// word breaks and each word title-cased (`created_at` -> `Created At`).
///
/// Case changes inside a word are not word breaks: `userID` -> `Userid`.
pub fn display_name(column: &ColumnMetadata) -> String {
    match column.display_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => column
            .name
            .split('_')
            .map(|word| word.to_lowercase().to_title_case())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Whether the goal asks for counts or aggregates.
pub fn is_aggregate_goal(goal: &str) -> bool {
    let goal = goal.trim().to_lowercase();
    AGGREGATE_PREFIXES.iter().any(|p| goal.starts_with(p))
}

/// Primary-key columns plus any column whose name contains `id`.
pub fn key_columns(table: &TableMetadata) -> Vec<&ColumnMetadata> {
    table
        .columns
        .iter()
        .filter(|c| table.is_key_column(c) || c.name.to_lowercase().contains("id"))
        .collect()
}
