//! # Groundwork
//!
//! Grounds decomposed natural-language queries in a database schema.
//!
//! ## Architecture
//!
//! A query arrives already decomposed into an intent, typed entities and an
//! optional temporal expression. Groundwork binds those fragments to real
//! tables and columns and returns a context record ready for SQL generation:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  DecomposedQuery                         │
//! │  (intent, entities, temporal filter, context)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [context]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Primary table + table metadata                    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [filters]
//! ┌─────────────────────────────────────────────────────────┐
//! │  Entity -> column cascade [resolver]                     │
//! │  Operator / value inference, temporal resolution         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [context, validation]
//! ┌─────────────────────────────────────────────────────────┐
//! │  Output columns, completeness check -> ContextualData    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every lookup goes through a [`metadata::MetadataProvider`]; the core
//! performs no I/O of its own.

pub mod config;
pub mod context;
pub mod error;
pub mod filters;
pub mod metadata;
pub mod query;
pub mod resolver;
pub mod validation;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::context::{ContextAssembler, ContextualData, OutputColumnSpec, TableSummary};
    pub use crate::error::{ContextError, ContextResult};
    pub use crate::filters::{
        Clock, FilterAssembler, FilterSpec, FixedClock, Operator, SystemClock, TemporalResolver,
    };
    pub use crate::metadata::{
        Catalog, ColumnMetadata, InMemoryMetadataProvider, MetadataError, MetadataProvider,
        MetadataResult, TableMetadata,
    };
    pub use crate::query::{DecomposedQuery, Entity, QueryValue, TemporalFilter};
    pub use crate::resolver::{EntityColumnResolver, MatchResult, ResolverConfig};
}

// Also export at crate root for convenience
pub use context::{ContextAssembler, ContextualData};
pub use error::{ContextError, ContextResult};
pub use metadata::MetadataProvider;
pub use query::DecomposedQuery;
