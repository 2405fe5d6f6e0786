//! Context assembly.
//!
//! [`ContextAssembler::enrich`] is the crate's entry point. It grounds one
//! [`DecomposedQuery`] in the schema:
//!
//! ```text
//! DecomposedQuery
//!     │
//!     ├─ 1. primary table   search_schema(goal + entities, no filter, top 3)
//!     ├─ 2. table metadata  get_table_metadata(primary)
//!     ├─ 3. filters         FilterAssembler (resolver cascade, operators, temporal)
//!     ├─ 4. output columns  key columns for count_/aggregate_ goals,
//!     │                     else get_relevant_columns(expected output) or all columns
//!     └─ 5. validation      IncompleteContext on the first missing part
//!     │
//!     ▼
//! ContextualData
//! ```
//!
//! The assembler holds no per-request state, so one instance (and one
//! provider) can serve concurrent `enrich` calls.

mod output;

pub use output::{
    display_name, is_aggregate_goal, key_columns, OutputColumnSpec, AGGREGATE_PREFIXES,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{ContextError, ContextResult};
use crate::filters::{Clock, FilterAssembler, FilterSpec, SystemClock, TemporalResolver};
use crate::metadata::{MetadataProvider, TableMetadata};
use crate::query::{DecomposedQuery, Intent, QueryContext};
use crate::resolver::EntityColumnResolver;
use crate::validation;

/// The grounded, SQL-ready context for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualData {
    pub intent: Intent,
    pub context: QueryContext,
    pub table_metadata: TableSummary,
    pub filters: Vec<FilterSpec>,
    pub output_columns: Vec<OutputColumnSpec>,
}

/// The primary table as seen by the SQL generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub primary_table: String,
    pub table_description: String,
    /// Column name -> data type.
    pub table_fields: BTreeMap<String, String>,
}

impl From<&TableMetadata> for TableSummary {
    fn from(table: &TableMetadata) -> Self {
        Self {
            primary_table: table.name.clone(),
            table_description: table.description.clone(),
            table_fields: table
                .columns
                .iter()
                .map(|c| (c.name.clone(), c.data_type.clone()))
                .collect(),
        }
    }
}

/// Orchestrates table selection, filter building and output selection.
pub struct ContextAssembler<P: MetadataProvider> {
    provider: Arc<P>,
    filters: FilterAssembler<P>,
    table_top_k: usize,
}

impl<P: MetadataProvider> ContextAssembler<P> {
    /// Create an assembler with default thresholds and the system clock.
    pub fn new(provider: Arc<P>) -> Self {
        Self::from_settings(provider, &Settings::default())
    }

    /// Create an assembler tuned by `settings`.
    pub fn from_settings(provider: Arc<P>, settings: &Settings) -> Self {
        let resolver =
            EntityColumnResolver::with_config(provider.clone(), settings.resolver_config());
        let temporal = TemporalResolver::new(Arc::new(SystemClock))
            .with_default_window(settings.temporal.default_window_days);

        Self {
            provider,
            filters: FilterAssembler::new(resolver, temporal),
            table_top_k: settings.context.table_top_k,
        }
    }

    /// Pin "today" for relative date expressions.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.filters = self.filters.with_clock(clock);
        self
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn filter_assembler(&self) -> &FilterAssembler<P> {
        &self.filters
    }

    /// Ground a decomposed query.
    pub async fn enrich(&self, query: &DecomposedQuery) -> ContextResult<ContextualData> {
        let search_text = query.table_search_text();
        let table_name = self.select_primary_table(&search_text).await?;

        let table = self
            .provider
            .get_table_metadata(&table_name)
            .await?
            .ok_or_else(|| ContextError::NoTableMetadata {
                table: table_name.clone(),
            })?;

        let filters = self
            .filters
            .build_filters(&query.entities, query.temporal_filter.as_ref(), &table)
            .await?;

        let output_columns = self.select_output_columns(query, &table).await?;

        let data = ContextualData {
            intent: query.intent.clone(),
            context: query.context.clone(),
            table_metadata: TableSummary::from(&table),
            filters,
            output_columns,
        };

        validation::ensure_complete(&data).map_err(ContextError::IncompleteContext)?;

        tracing::info!(
            goal = %data.intent.goal,
            table = %data.table_metadata.primary_table,
            filters = data.filters.len(),
            output_columns = data.output_columns.len(),
            "enriched query"
        );

        Ok(data)
    }

    /// Highest-ranked table for the search text.
    pub async fn select_primary_table(&self, search_text: &str) -> ContextResult<String> {
        let hits = self
            .provider
            .search_schema(search_text, None, self.table_top_k)
            .await?;

        let primary = hits
            .into_iter()
            .map(|hit| hit.name)
            .find(|name| !name.trim().is_empty())
            .ok_or_else(|| ContextError::NoRelevantTable {
                query: search_text.to_string(),
            })?;

        tracing::debug!(query = search_text, table = %primary, "selected primary table");
        Ok(primary)
    }

    /// Columns to project.
    ///
    /// Count and aggregate goals get key columns only. Otherwise the
    /// provider ranks columns against the expected output, falling back to
    /// every column when it finds none.
    pub async fn select_output_columns(
        &self,
        query: &DecomposedQuery,
        table: &TableMetadata,
    ) -> ContextResult<Vec<OutputColumnSpec>> {
        if is_aggregate_goal(&query.intent.goal) {
            return Ok(key_columns(table)
                .into_iter()
                .map(OutputColumnSpec::from)
                .collect());
        }

        let relevant = self
            .provider
            .get_relevant_columns(&table.name, &query.context.expected_output)
            .await?;

        let columns = if relevant.is_empty() {
            tracing::debug!(table = %table.name, "no relevant columns found, using all columns");
            &table.columns
        } else {
            &relevant
        };

        Ok(columns.iter().map(OutputColumnSpec::from).collect())
    }
}

impl<P: MetadataProvider> std::fmt::Debug for ContextAssembler<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextAssembler")
            .field("table_top_k", &self.table_top_k)
            .field("stages", &self.filters.resolver().stages())
            .finish()
    }
}
