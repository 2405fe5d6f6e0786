//! Metadata provider module.
//!
//! The provider is the pipeline's only window onto the database: semantic
//! search over schema descriptions, sampled values and prior queries, plus
//! structural lookups for a named table.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MetadataProvider                           │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │  Search (ranked)              │  Structure                │  │
//! │  │  - search_schema()            │  - get_table_metadata()   │  │
//! │  │  - search_table_heads()       │  - get_relevant_columns() │  │
//! │  │  - find_similar_sql_pairs()   │  - list_tables()          │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │         InMemoryMetadataProvider (JSON catalog, lexical)        │
//! │         or any vector-store backed implementation               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use groundwork::metadata::{InMemoryMetadataProvider, MetadataProvider};
//!
//! let provider = InMemoryMetadataProvider::from_path("catalog.json")?;
//! let tables = provider.search_schema("open orders", None, 3).await?;
//! let orders = provider.get_table_metadata("orders").await?;
//! ```

mod error;
mod memory;
mod provider;
mod types;

pub use error::{MetadataError, MetadataResult};
pub use memory::{Catalog, InMemoryMetadataProvider, TOKEN_MATCH_FLOOR};
pub use provider::MetadataProvider;
pub use types::*;
