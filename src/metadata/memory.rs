//! In-memory MetadataProvider backed by a JSON catalog.
//!
//! The catalog is loaded once and shared behind an `Arc`; nothing mutates it
//! afterwards, so clones of the provider can be queried from any number of
//! tasks without locking.
//!
//! Similarity is lexical rather than embedding-based: texts are split into
//! lowercase alphanumeric tokens, and each query token is credited with its
//! best Jaro-Winkler match among the document tokens (if it clears
//! [`TOKEN_MATCH_FLOOR`]). The document score is the mean credit per query
//! token.
//!
//! # Catalog format
//!
//! ```json
//! {
//!   "tables": [{ "name": "orders", "description": "...", "columns": [...] }],
//!   "samples": { "orders": { "status": ["open", "closed"] } },
//!   "sql_pairs": [{ "question": "...", "sql": "...", "entity_mappings": [...] }]
//! }
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strsim::{jaro_winkler, normalized_levenshtein};

use super::error::{MetadataError, MetadataResult};
use super::provider::MetadataProvider;
use super::types::*;
use crate::query::QueryValue;

/// Minimum Jaro-Winkler similarity for two tokens to count as a match.
pub const TOKEN_MATCH_FLOOR: f64 = 0.85;

/// Number of columns returned by `get_relevant_columns`.
const RELEVANT_COLUMNS_TOP_K: usize = 10;

/// Everything the in-memory provider knows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub tables: Vec<TableMetadata>,
    /// Sampled values: table -> column -> values.
    #[serde(default)]
    pub samples: BTreeMap<String, BTreeMap<String, Vec<QueryValue>>>,
    #[serde(default)]
    pub sql_pairs: Vec<SqlPairExample>,
}

impl Catalog {
    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.tables.push(table);
        self
    }

    /// Record sampled values for a column.
    pub fn with_samples<I, V>(mut self, table: &str, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.samples
            .entry(table.to_string())
            .or_default()
            .entry(column.to_string())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_sql_pair(mut self, pair: SqlPairExample) -> Self {
        self.sql_pairs.push(pair);
        self
    }
}

/// MetadataProvider over an immutable [`Catalog`].
#[derive(Debug, Clone)]
pub struct InMemoryMetadataProvider {
    catalog: Arc<Catalog>,
    /// Lowercase table name -> index into `catalog.tables`.
    table_index: Arc<HashMap<String, usize>>,
}

impl InMemoryMetadataProvider {
    /// Build a provider, indexing tables by lowercase name.
    ///
    /// Columns flagged `is_primary_key` are folded into `primary_keys`.
    pub fn new(mut catalog: Catalog) -> MetadataResult<Self> {
        let mut table_index = HashMap::with_capacity(catalog.tables.len());
        for (idx, table) in catalog.tables.iter_mut().enumerate() {
            if table_index.insert(table.name.to_lowercase(), idx).is_some() {
                return Err(MetadataError::DuplicateTable(table.name.clone()));
            }
            let flagged: Vec<String> = table
                .columns
                .iter()
                .filter(|c| c.is_primary_key)
                .map(|c| c.name.clone())
                .collect();
            table.primary_keys.extend(flagged);
        }

        tracing::debug!(
            tables = catalog.tables.len(),
            sql_pairs = catalog.sql_pairs.len(),
            "built in-memory metadata catalog"
        );

        Ok(Self {
            catalog: Arc::new(catalog),
            table_index: Arc::new(table_index),
        })
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(json: &str) -> MetadataResult<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Load a catalog from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.table_index
            .get(&name.to_lowercase())
            .map(|&idx| &self.catalog.tables[idx])
    }

    fn rank_columns(&self, table: &TableMetadata, query: &[String]) -> Vec<SchemaHit> {
        table
            .columns
            .iter()
            .map(|column| {
                let mut doc = tokenize(&column.name);
                if let Some(display) = &column.display_name {
                    doc.extend(tokenize(display));
                }
                doc.extend(tokenize(&column.description));

                SchemaHit {
                    name: column.name.clone(),
                    score: token_similarity(query, &doc),
                    data_type: Some(column.data_type.clone()),
                    description: Some(column.description.clone()),
                }
            })
            .collect()
    }

    fn rank_tables(&self, query: &[String]) -> Vec<SchemaHit> {
        self.catalog
            .tables
            .iter()
            .map(|table| {
                let mut doc = tokenize(&table.name);
                doc.extend(tokenize(&table.description));
                for column in table.column_names() {
                    doc.extend(tokenize(column));
                }

                SchemaHit {
                    name: table.name.clone(),
                    score: token_similarity(query, &doc),
                    data_type: None,
                    description: Some(table.description.clone()),
                }
            })
            .collect()
    }
}

#[async_trait]
impl MetadataProvider for InMemoryMetadataProvider {
    async fn search_schema(
        &self,
        query: &str,
        filter: Option<&SchemaFilter>,
        top_k: usize,
    ) -> MetadataResult<Vec<SchemaHit>> {
        let tokens = tokenize(query);

        let hits = match filter {
            Some(filter) => match self.table(&filter.table) {
                Some(table) => self.rank_columns(table, &tokens),
                None => Vec::new(),
            },
            None => self.rank_tables(&tokens),
        };

        Ok(top_ranked(hits, top_k, |h| h.score, |h| h.name.as_str()))
    }

    async fn search_table_heads(
        &self,
        query: &str,
        table_name: Option<&str>,
        top_k: usize,
    ) -> MetadataResult<Vec<SampleHit>> {
        let wanted = table_name.map(str::to_lowercase);
        let mut hits = Vec::new();

        for (table, columns) in &self.catalog.samples {
            if wanted.as_deref().is_some_and(|w| w != table.to_lowercase()) {
                continue;
            }

            for (column, values) in columns {
                let best = values
                    .iter()
                    .map(|v| {
                        let text = v.to_string();
                        (value_similarity(query, &text), text)
                    })
                    .max_by(|a, b| a.0.total_cmp(&b.0));

                if let Some((score, value)) = best {
                    hits.push(SampleHit {
                        column_name: column.clone(),
                        score,
                        matched_value: Some(value),
                    });
                }
            }
        }

        Ok(top_ranked(hits, top_k, |h| h.score, |h| h.column_name.as_str()))
    }

    async fn find_similar_sql_pairs(
        &self,
        query: &str,
        top_k: usize,
    ) -> MetadataResult<Vec<SqlPairExample>> {
        let tokens = tokenize(query);

        let pairs = self
            .catalog
            .sql_pairs
            .iter()
            .map(|pair| SqlPairExample {
                score: token_similarity(&tokens, &tokenize(&pair.question)),
                ..pair.clone()
            })
            .collect();

        Ok(top_ranked(pairs, top_k, |p| p.score, |p| p.question.as_str()))
    }

    async fn get_table_metadata(&self, table_name: &str) -> MetadataResult<Option<TableMetadata>> {
        Ok(self.table(table_name).cloned())
    }

    async fn get_relevant_columns(
        &self,
        table_name: &str,
        description: &str,
    ) -> MetadataResult<Vec<ColumnMetadata>> {
        let Some(table) = self.table(table_name) else {
            return Ok(Vec::new());
        };

        let hits = top_ranked(
            self.rank_columns(table, &tokenize(description)),
            RELEVANT_COLUMNS_TOP_K,
            |h| h.score,
            |h| h.name.as_str(),
        );

        Ok(hits
            .iter()
            .filter_map(|hit| table.column(&hit.name).cloned())
            .collect())
    }

    async fn list_tables(&self) -> MetadataResult<Vec<String>> {
        Ok(self.catalog.tables.iter().map(|t| t.name.clone()).collect())
    }
}

/// Drop zero scores, order by descending score then name, keep `top_k`.
fn top_ranked<T>(
    mut items: Vec<T>,
    top_k: usize,
    score: impl Fn(&T) -> f64,
    name: impl Fn(&T) -> &str,
) -> Vec<T> {
    items.retain(|item| score(item) > 0.0);
    items.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| name(a).cmp(name(b)))
    });
    items.truncate(top_k);
    items
}

/// Split on anything that is not alphanumeric (including `_`) and lowercase.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Mean best-match credit of the query tokens against the document tokens.
fn token_similarity(query: &[String], doc: &[String]) -> f64 {
    if query.is_empty() || doc.is_empty() {
        return 0.0;
    }

    let credit: f64 = query
        .iter()
        .map(|q| {
            let best = doc
                .iter()
                .map(|d| jaro_winkler(q, d))
                .fold(0.0_f64, f64::max);
            if best >= TOKEN_MATCH_FLOOR {
                best
            } else {
                0.0
            }
        })
        .sum();

    credit / query.len() as f64
}

/// Exact (case-insensitive) equality scores 1.0, otherwise edit similarity.
fn value_similarity(query: &str, value: &str) -> f64 {
    let query = query.trim().to_lowercase();
    let value = value.trim().to_lowercase();
    if query.is_empty() || value.is_empty() {
        return 0.0;
    }
    if query == value {
        return 1.0;
    }
    normalized_levenshtein(&query, &value)
}
