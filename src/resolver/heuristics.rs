//! Name-pattern heuristics over table columns.
//!
//! Deterministic fallbacks that need nothing but the column list: the last
//! stage of the resolution cascade and date-column detection for temporal
//! filters.

use crate::metadata::{ColumnMetadata, TableMetadata};

/// Entity type -> substrings likely to appear in a matching column name.
const NAME_PATTERNS: &[(&str, &[&str])] = &[
    ("status", &["status", "state"]),
    ("priority", &["priority", "importance", "urgency"]),
    ("category", &["category", "type", "class"]),
    ("date", &["date", "time", "created", "updated"]),
    ("id", &["id", "identifier", "key"]),
    ("name", &["name", "title"]),
    ("description", &["description", "details", "text"]),
];

/// Type-name fragments (uppercase) that mark a temporal column.
pub const DATE_TYPE_MARKERS: &[&str] = &["DATE", "TIME", "TIMESTAMP"];

/// Column-name fragments that suggest a temporal column.
pub const DATE_NAME_PATTERNS: &[&str] = &["date", "time", "created", "updated", "timestamp"];

/// Candidate column-name substrings for an entity type.
///
/// Unknown types fall back to the lowercased type itself.
pub fn name_patterns(entity_type: &str) -> Vec<String> {
    let key = entity_type.trim().to_lowercase();
    match NAME_PATTERNS.iter().find(|(t, _)| *t == key) {
        Some((_, patterns)) => patterns.iter().map(|p| p.to_string()).collect(),
        None => vec![key],
    }
}

/// First column (in table order) whose lowercased name contains any pattern
/// for `entity_type`.
pub fn match_column_name<'a>(
    table: &'a TableMetadata,
    entity_type: &str,
) -> Option<&'a ColumnMetadata> {
    let patterns = name_patterns(entity_type);
    if patterns.iter().all(|p| p.is_empty()) {
        return None;
    }

    table.columns.iter().find(|column| {
        let name = column.name.to_lowercase();
        patterns
            .iter()
            .any(|p| !p.is_empty() && name.contains(p.as_str()))
    })
}

/// Locate the column temporal filters apply to.
///
/// A declared date/time type wins; otherwise the first column with a
/// date-like name.
pub fn find_date_column(table: &TableMetadata) -> Option<&ColumnMetadata> {
    let by_type = table.columns.iter().find(|column| {
        let data_type = column.data_type.to_uppercase();
        DATE_TYPE_MARKERS.iter().any(|m| data_type.contains(m))
    });

    by_type.or_else(|| {
        table.columns.iter().find(|column| {
            let name = column.name.to_lowercase();
            DATE_NAME_PATTERNS.iter().any(|p| name.contains(p))
        })
    })
}
