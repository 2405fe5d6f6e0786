//! Error types for context assembly.
//!
//! Table-level and validation failures abort the request. Entity-level
//! failures (`UnresolvableEntity`) are caught by the filter assembler and the
//! offending filter is dropped.

use thiserror::Error;

use crate::metadata::MetadataError;
use crate::validation::ValidationError;

/// Result type for context assembly operations.
pub type ContextResult<T> = Result<T, ContextError>;

/// Errors raised while grounding a decomposed query.
#[derive(Error, Debug)]
pub enum ContextError {
    /// The primary-table search returned nothing.
    #[error("no relevant table found for query '{query}'")]
    NoRelevantTable {
        /// The semantic search text that was used.
        query: String,
    },

    /// A named table has no structural metadata.
    #[error("no metadata found for table '{table}'")]
    NoTableMetadata { table: String },

    /// Every resolution strategy was exhausted without a column match.
    #[error("could not map entity {entity_type}:{entity_value} to a column in '{table}'")]
    UnresolvableEntity {
        entity_type: String,
        entity_value: String,
        table: String,
    },

    /// The assembled record failed completeness validation.
    #[error("incomplete context: {0}")]
    IncompleteContext(ValidationError),

    /// The metadata provider failed.
    #[error("metadata provider error: {0}")]
    Provider(#[from] MetadataError),
}

impl ContextError {
    /// Build an `UnresolvableEntity` error.
    pub fn unresolvable(
        entity_type: impl Into<String>,
        entity_value: impl ToString,
        table: impl Into<String>,
    ) -> Self {
        Self::UnresolvableEntity {
            entity_type: entity_type.into(),
            entity_value: entity_value.to_string(),
            table: table.into(),
        }
    }

    /// Whether this failure is scoped to a single entity.
    pub fn is_entity_level(&self) -> bool {
        matches!(self, Self::UnresolvableEntity { .. })
    }
}
