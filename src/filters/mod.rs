//! Filter assembly.
//!
//! Turns the extracted entities and the optional temporal filter into an
//! ordered list of [`FilterSpec`]s bound to real columns of the primary
//! table. Entity filters come first, in entity order; the temporal filter,
//! if any, is appended last.
//!
//! Filter building is best-effort per entity: an entity that cannot be
//! mapped to a column is dropped with a warning, while provider failures
//! abort the whole request.

pub mod operator;
pub mod temporal;

pub use operator::{infer_operator, normalize_value, operator_for_type, Operator};
pub use temporal::{
    Clock, FixedClock, RelativeDate, SystemClock, TemporalResolver, DATE_RANGE_FILTER,
};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ContextError, ContextResult};
use crate::metadata::{MetadataProvider, TableMetadata};
use crate::query::{Entity, QueryValue, TemporalFilter};
use crate::resolver::EntityColumnResolver;

/// A predicate bound to a column of the primary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Entity type, or `date_range` for the temporal filter.
    pub filter_name: String,
    pub column_name: String,
    pub operator: Operator,
    pub value: QueryValue,
}

impl FilterSpec {
    pub fn new(
        filter_name: impl Into<String>,
        column_name: impl Into<String>,
        operator: Operator,
        value: impl Into<QueryValue>,
    ) -> Self {
        Self {
            filter_name: filter_name.into(),
            column_name: column_name.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Builds filters from entities and temporal expressions.
pub struct FilterAssembler<P: MetadataProvider> {
    resolver: EntityColumnResolver<P>,
    temporal: TemporalResolver,
}

impl<P: MetadataProvider> FilterAssembler<P> {
    pub fn new(resolver: EntityColumnResolver<P>, temporal: TemporalResolver) -> Self {
        Self { resolver, temporal }
    }

    /// Pin "today" for temporal filters.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.temporal = self.temporal.with_clock(clock);
        self
    }

    pub fn resolver(&self) -> &EntityColumnResolver<P> {
        &self.resolver
    }

    pub fn temporal(&self) -> &TemporalResolver {
        &self.temporal
    }

    /// Build every filter for `table`.
    pub async fn build_filters(
        &self,
        entities: &[Entity],
        temporal: Option<&TemporalFilter>,
        table: &TableMetadata,
    ) -> ContextResult<Vec<FilterSpec>> {
        let mut filters = Vec::with_capacity(entities.len() + 1);

        for entity in entities {
            if let Some(filter) = self.build_entity_filter(entity, table).await? {
                filters.push(filter);
            }
        }

        if let Some(temporal) = temporal.filter(|t| !t.is_empty()) {
            if let Some(filter) = self.temporal.resolve_temporal(temporal, table) {
                filters.push(filter);
            }
        }

        tracing::debug!(
            table = %table.name,
            entities = entities.len(),
            filters = filters.len(),
            "built filters"
        );

        Ok(filters)
    }

    /// Build the filter for one entity.
    ///
    /// Returns `Ok(None)` when the entity is blank, unresolvable, or resolves
    /// to a column the table does not have.
    pub async fn build_entity_filter(
        &self,
        entity: &Entity,
        table: &TableMetadata,
    ) -> ContextResult<Option<FilterSpec>> {
        let entity_type = entity.entity_type.trim();
        if entity_type.is_empty() || is_blank(&entity.entity_value) {
            tracing::debug!(entity_type, "skipping entity with empty type or value");
            return Ok(None);
        }

        let column = match entity.premapped_column() {
            Some(column) => column.to_string(),
            None => match self
                .resolver
                .resolve(entity_type, &entity.entity_value, &table.name)
                .await
            {
                Ok(hit) => hit.column_name,
                Err(err) if err.is_entity_level() => {
                    tracing::warn!(error = %err, "dropping filter for unresolvable entity");
                    return Ok(None);
                }
                Err(err) => return Err(err),
            },
        };

        let Some(column) = table.column(&column) else {
            tracing::warn!(
                entity_type,
                column = %column,
                table = %table.name,
                "dropping filter on column missing from primary table"
            );
            return Ok(None);
        };

        let operator = infer_operator(entity_type, &entity.entity_value);
        let value = normalize_value(&entity.entity_value, operator);

        Ok(Some(FilterSpec::new(
            entity_type,
            column.name.clone(),
            operator,
            value,
        )))
    }

    /// Build the temporal filter against a table looked up by name.
    ///
    /// `Ok(None)` when the table has no date-bearing column.
    pub async fn resolve_temporal(
        &self,
        filter: &TemporalFilter,
        table_name: &str,
    ) -> ContextResult<Option<FilterSpec>> {
        let table = self
            .resolver
            .provider()
            .get_table_metadata(table_name)
            .await?
            .ok_or_else(|| ContextError::NoTableMetadata {
                table: table_name.to_string(),
            })?;

        Ok(self.temporal.resolve_temporal(filter, &table))
    }
}

fn is_blank(value: &QueryValue) -> bool {
    match value.as_text() {
        Some(text) => text.trim().is_empty(),
        None => value.is_empty(),
    }
}
