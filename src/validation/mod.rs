//! Completeness validation of assembled context.
//!
//! A [`ContextualData`] record is only handed downstream when every
//! required part is present: an intent, at least one filter, a primary
//! table with its fields, and at least one output column. Every filter must
//! also reference a field of the primary table.
//!
//! The descriptive context is carried through as given. Its fields are
//! free text and may both be blank.

use crate::context::ContextualData;

/// Validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The intent goal is blank.
    MissingIntent,
    /// No filters survived assembly.
    NoFilters,
    /// No primary table was recorded.
    MissingPrimaryTable,
    /// The primary table has no fields.
    NoTableFields { table: String },
    /// No output columns were selected.
    NoOutputColumns,
    /// A filter references a column outside the primary table.
    UnknownFilterColumn {
        filter_name: String,
        column_name: String,
        table: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingIntent => write!(f, "missing required field 'intent'"),
            ValidationError::NoFilters => write!(f, "missing required field 'filters'"),
            ValidationError::MissingPrimaryTable => {
                write!(f, "missing required field 'table_metadata.primary_table'")
            }
            ValidationError::NoTableFields { table } => {
                write!(f, "table '{}' has no fields", table)
            }
            ValidationError::NoOutputColumns => {
                write!(f, "missing required field 'output_columns'")
            }
            ValidationError::UnknownFilterColumn {
                filter_name,
                column_name,
                table,
            } => {
                write!(
                    f,
                    "filter '{}' references column '{}' not in table '{}'",
                    filter_name, column_name, table
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate an assembled context record.
pub fn validate(data: &ContextualData) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if data.intent.goal.trim().is_empty() {
        errors.push(ValidationError::MissingIntent);
    }
    validate_table(data, &mut errors);
    validate_filters(data, &mut errors);

    if data.output_columns.is_empty() {
        errors.push(ValidationError::NoOutputColumns);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Like [`validate`], but reports only the first problem.
pub fn ensure_complete(data: &ContextualData) -> Result<(), ValidationError> {
    match validate(data) {
        Ok(()) => Ok(()),
        Err(errors) => match errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        },
    }
}

fn validate_table(data: &ContextualData, errors: &mut Vec<ValidationError>) {
    let table = &data.table_metadata;
    if table.primary_table.trim().is_empty() {
        errors.push(ValidationError::MissingPrimaryTable);
        return;
    }
    if table.table_fields.is_empty() {
        errors.push(ValidationError::NoTableFields {
            table: table.primary_table.clone(),
        });
    }
}

fn validate_filters(data: &ContextualData, errors: &mut Vec<ValidationError>) {
    if data.filters.is_empty() {
        errors.push(ValidationError::NoFilters);
        return;
    }

    let table = &data.table_metadata;
    for filter in &data.filters {
        if !table.table_fields.contains_key(&filter.column_name) {
            errors.push(ValidationError::UnknownFilterColumn {
                filter_name: filter.filter_name.clone(),
                column_name: filter.column_name.clone(),
                table: table.primary_table.clone(),
            });
        }
    }
}
