//! Entity -> column resolution.
//!
//! Maps one `(entity type, entity value, table)` triple to a column of that
//! table by running a fixed cascade of strategies against the metadata
//! provider (see [`strategy`] for the stages).
//!
//! # Example
//!
//! ```ignore
//! use groundwork::resolver::EntityColumnResolver;
//!
//! let resolver = EntityColumnResolver::new(Arc::new(provider));
//! let hit = resolver.resolve("status", &"open".into(), "orders").await?;
//! assert_eq!(hit.column_name, "status");
//! ```

mod heuristics;
pub mod strategy;

use std::sync::Arc;

pub use heuristics::{
    find_date_column, match_column_name, name_patterns, DATE_NAME_PATTERNS, DATE_TYPE_MARKERS,
};
pub use strategy::{default_cascade, CascadeState, ResolutionRequest, ResolutionStrategy};

use crate::error::{ContextError, ContextResult};
use crate::metadata::MetadataProvider;
use crate::query::QueryValue;

/// Acceptance thresholds and search depths for the cascade.
pub mod thresholds {
    /// Stage 1 accepts strictly above this score.
    pub const COLUMN_METADATA: f64 = 0.7;
    /// Stage 2 accepts strictly above this score.
    pub const SAMPLE_VALUE: f64 = 0.8;
    /// Stage 3 confidence when the stored mapping carries none.
    pub const SQL_PAIR_DEFAULT: f64 = 0.7;
    /// Fixed stage 5 confidence.
    pub const HEURISTIC: f64 = 0.6;
    /// Candidates requested from each search.
    pub const TOP_K: usize = 3;
}

/// A column chosen for an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub column_name: String,
    /// Similarity or assigned confidence in [0, 1].
    pub confidence: f64,
    /// Name of the strategy that accepted the match.
    pub strategy: &'static str,
}

impl MatchResult {
    pub fn new(column_name: impl Into<String>, confidence: f64, strategy: &'static str) -> Self {
        Self {
            column_name: column_name.into(),
            confidence,
            strategy,
        }
    }
}

/// Tunables for the cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    pub column_threshold: f64,
    pub sample_threshold: f64,
    pub sql_pair_default_confidence: f64,
    pub heuristic_confidence: f64,
    pub column_top_k: usize,
    pub sample_top_k: usize,
    pub sql_pair_top_k: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            column_threshold: thresholds::COLUMN_METADATA,
            sample_threshold: thresholds::SAMPLE_VALUE,
            sql_pair_default_confidence: thresholds::SQL_PAIR_DEFAULT,
            heuristic_confidence: thresholds::HEURISTIC,
            column_top_k: thresholds::TOP_K,
            sample_top_k: thresholds::TOP_K,
            sql_pair_top_k: thresholds::TOP_K,
        }
    }
}

/// Resolves entities to columns through the strategy cascade.
pub struct EntityColumnResolver<P: MetadataProvider> {
    provider: Arc<P>,
    config: ResolverConfig,
    cascade: Vec<Box<dyn ResolutionStrategy>>,
}

impl<P: MetadataProvider> EntityColumnResolver<P> {
    /// Create a resolver with the default cascade and thresholds.
    pub fn new(provider: Arc<P>) -> Self {
        Self::with_config(provider, ResolverConfig::default())
    }

    pub fn with_config(provider: Arc<P>, config: ResolverConfig) -> Self {
        Self {
            provider,
            config,
            cascade: default_cascade(),
        }
    }

    /// Replace the cascade, e.g. to test a single stage in isolation.
    pub fn with_strategies(mut self, cascade: Vec<Box<dyn ResolutionStrategy>>) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Names of the cascade stages, in evaluation order.
    pub fn stages(&self) -> Vec<&'static str> {
        self.cascade.iter().map(|s| s.name()).collect()
    }

    /// Map an entity to a column of `table_name`.
    ///
    /// Fails with [`ContextError::UnresolvableEntity`] when every stage
    /// passes. Provider failures propagate immediately.
    pub async fn resolve(
        &self,
        entity_type: &str,
        entity_value: &QueryValue,
        table_name: &str,
    ) -> ContextResult<MatchResult> {
        let request = ResolutionRequest {
            entity_type,
            entity_value,
            table: table_name,
        };
        let provider: &dyn MetadataProvider = self.provider.as_ref();
        let mut state = CascadeState::default();

        for strategy in &self.cascade {
            let attempt = strategy
                .attempt(&request, provider, &self.config, &mut state)
                .await?;

            match attempt {
                Some(hit) => {
                    tracing::debug!(
                        entity_type,
                        entity_value = %entity_value,
                        table = table_name,
                        column = %hit.column_name,
                        confidence = hit.confidence,
                        strategy = hit.strategy,
                        "resolved entity"
                    );
                    return Ok(hit);
                }
                None => {
                    tracing::debug!(stage = strategy.name(), entity_type, "stage passed");
                }
            }
        }

        Err(ContextError::unresolvable(
            entity_type,
            entity_value,
            table_name,
        ))
    }
}
