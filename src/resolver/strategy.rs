//! Resolution strategies for the entity -> column cascade.
//!
//! Each stage implements [`ResolutionStrategy`] and either accepts a match or
//! passes. The resolver runs them in order and stops at the first acceptance.
//!
//! | # | Strategy               | Source                      | Accepts when            |
//! |---|------------------------|-----------------------------|-------------------------|
//! | 1 | `ColumnMetadataSearch` | column descriptions         | score > 0.7             |
//! | 2 | `SampleValueSearch`    | sampled row values          | score > 0.8             |
//! | 3 | `PriorQueryMatch`      | prior NL -> SQL mappings    | type and table match    |
//! | 4 | `DegradedAcceptance`   | stage 1's best hit          | stage 1 had any hit     |
//! | 5 | `HeuristicNameMatch`   | column-name patterns        | a pattern matches (0.6) |

use async_trait::async_trait;

use super::heuristics::match_column_name;
use super::{MatchResult, ResolverConfig};
use crate::metadata::{MetadataProvider, MetadataResult, SchemaFilter};
use crate::query::QueryValue;

/// The entity being resolved.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionRequest<'a> {
    pub entity_type: &'a str,
    pub entity_value: &'a QueryValue,
    pub table: &'a str,
}

/// State shared between stages of one cascade run.
#[derive(Debug, Clone, Default)]
pub struct CascadeState {
    /// Stage 1's best hit, kept even when below threshold.
    pub semantic_candidate: Option<MatchResult>,
}

/// One stage of the cascade.
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    /// Stage name used in logs and on accepted matches.
    fn name(&self) -> &'static str;

    /// Try to resolve the request. `Ok(None)` passes to the next stage.
    async fn attempt(
        &self,
        request: &ResolutionRequest<'_>,
        provider: &dyn MetadataProvider,
        config: &ResolverConfig,
        state: &mut CascadeState,
    ) -> MetadataResult<Option<MatchResult>>;
}

/// The five stages in their fixed order.
pub fn default_cascade() -> Vec<Box<dyn ResolutionStrategy>> {
    vec![
        Box::new(ColumnMetadataSearch),
        Box::new(SampleValueSearch),
        Box::new(PriorQueryMatch),
        Box::new(DegradedAcceptance),
        Box::new(HeuristicNameMatch),
    ]
}

/// Stage 1: semantic search over the table's column metadata for
/// `"{type} {value}"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMetadataSearch;

#[async_trait]
impl ResolutionStrategy for ColumnMetadataSearch {
    fn name(&self) -> &'static str {
        "column_metadata"
    }

    async fn attempt(
        &self,
        request: &ResolutionRequest<'_>,
        provider: &dyn MetadataProvider,
        config: &ResolverConfig,
        state: &mut CascadeState,
    ) -> MetadataResult<Option<MatchResult>> {
        let query = format!("{} {}", request.entity_type, request.entity_value);
        let filter = SchemaFilter::table(request.table);
        let hits = provider
            .search_schema(&query, Some(&filter), config.column_top_k)
            .await?;

        let Some(best) = hits.into_iter().find(|h| !h.name.is_empty()) else {
            return Ok(None);
        };

        let candidate = MatchResult::new(best.name, best.score, self.name());
        state.semantic_candidate = Some(candidate.clone());

        if candidate.confidence > config.column_threshold {
            Ok(Some(candidate))
        } else {
            tracing::debug!(
                column = %candidate.column_name,
                score = candidate.confidence,
                "column metadata hit below threshold"
            );
            Ok(None)
        }
    }
}

/// Stage 2: search sampled row values for the raw entity value.
///
/// Held to a higher bar than stage 1: a value can recur incidentally in
/// several columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleValueSearch;

#[async_trait]
impl ResolutionStrategy for SampleValueSearch {
    fn name(&self) -> &'static str {
        "sample_value"
    }

    async fn attempt(
        &self,
        request: &ResolutionRequest<'_>,
        provider: &dyn MetadataProvider,
        config: &ResolverConfig,
        _state: &mut CascadeState,
    ) -> MetadataResult<Option<MatchResult>> {
        let value = request.entity_value.to_string();
        let hits = provider
            .search_table_heads(&value, Some(request.table), config.sample_top_k)
            .await?;

        let Some(best) = hits.into_iter().find(|h| !h.column_name.is_empty()) else {
            return Ok(None);
        };

        if best.score > config.sample_threshold {
            Ok(Some(MatchResult::new(best.column_name, best.score, self.name())))
        } else {
            tracing::debug!(
                column = %best.column_name,
                score = best.score,
                "sample value hit below threshold"
            );
            Ok(None)
        }
    }
}

/// Stage 3: reuse a mapping recorded on a similar prior query.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorQueryMatch;

#[async_trait]
impl ResolutionStrategy for PriorQueryMatch {
    fn name(&self) -> &'static str {
        "prior_query"
    }

    async fn attempt(
        &self,
        request: &ResolutionRequest<'_>,
        provider: &dyn MetadataProvider,
        config: &ResolverConfig,
        _state: &mut CascadeState,
    ) -> MetadataResult<Option<MatchResult>> {
        let query = format!(
            "{} {} in {}",
            request.entity_type, request.entity_value, request.table
        );
        let pairs = provider
            .find_similar_sql_pairs(&query, config.sql_pair_top_k)
            .await?;

        let mapping = pairs
            .iter()
            .flat_map(|pair| pair.entity_mappings.iter())
            .find(|m| {
                m.entity_type == request.entity_type
                    && m.table == request.table
                    && !m.column.is_empty()
            });

        Ok(mapping.map(|m| {
            MatchResult::new(
                m.column.clone(),
                m.confidence.unwrap_or(config.sql_pair_default_confidence),
                self.name(),
            )
        }))
    }
}

/// Stage 4: accept stage 1's best hit even though it missed the threshold.
///
/// Prefers any semantic hit over a name heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct DegradedAcceptance;

#[async_trait]
impl ResolutionStrategy for DegradedAcceptance {
    fn name(&self) -> &'static str {
        "degraded_column_metadata"
    }

    async fn attempt(
        &self,
        _request: &ResolutionRequest<'_>,
        _provider: &dyn MetadataProvider,
        _config: &ResolverConfig,
        state: &mut CascadeState,
    ) -> MetadataResult<Option<MatchResult>> {
        Ok(state.semantic_candidate.take().map(|candidate| MatchResult {
            strategy: self.name(),
            ..candidate
        }))
    }
}

/// Stage 5: scan column names for substrings associated with the entity type.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicNameMatch;

#[async_trait]
impl ResolutionStrategy for HeuristicNameMatch {
    fn name(&self) -> &'static str {
        "heuristic_name"
    }

    async fn attempt(
        &self,
        request: &ResolutionRequest<'_>,
        provider: &dyn MetadataProvider,
        config: &ResolverConfig,
        _state: &mut CascadeState,
    ) -> MetadataResult<Option<MatchResult>> {
        let Some(table) = provider.get_table_metadata(request.table).await? else {
            return Ok(None);
        };

        Ok(match_column_name(&table, request.entity_type).map(|column| {
            MatchResult::new(column.name.clone(), config.heuristic_confidence, self.name())
        }))
    }
}
