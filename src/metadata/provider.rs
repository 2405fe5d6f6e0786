//! MetadataProvider trait definition.
//!
//! The provider is the only component that touches an index, a store or the
//! network. Context assembly consumes it through this capability trait and
//! never mutates it, so one instance can serve concurrent requests.

use async_trait::async_trait;

use super::error::MetadataResult;
use super::types::*;

/// Semantic search and structural lookup over database metadata.
///
/// Implementations must tolerate concurrent calls through `&self`. If the
/// backing index is not safe for concurrent reads, the implementation
/// synchronizes internally.
///
/// # Example
///
/// ```ignore
/// use groundwork::metadata::{MetadataProvider, SchemaFilter};
///
/// async fn example(provider: &impl MetadataProvider) -> MetadataResult<()> {
///     let tables = provider.search_schema("open orders", None, 3).await?;
///     let columns = provider
///         .search_schema("status open", Some(&SchemaFilter::table("orders")), 3)
///         .await?;
///     let orders = provider.get_table_metadata("orders").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    // =========================================================================
    // Search capabilities
    // =========================================================================

    /// Semantic search over table and column descriptions.
    ///
    /// Without a filter the hits are tables; with a table filter they are
    /// that table's columns. Ordered by descending relevance.
    async fn search_schema(
        &self,
        query: &str,
        filter: Option<&SchemaFilter>,
        top_k: usize,
    ) -> MetadataResult<Vec<SchemaHit>>;

    /// Search over sampled row values, optionally restricted to one table.
    async fn search_table_heads(
        &self,
        query: &str,
        table_name: Option<&str>,
        top_k: usize,
    ) -> MetadataResult<Vec<SampleHit>>;

    /// Find prior natural-language -> SQL examples similar to `query`.
    async fn find_similar_sql_pairs(
        &self,
        query: &str,
        top_k: usize,
    ) -> MetadataResult<Vec<SqlPairExample>>;

    // =========================================================================
    // Structural lookups
    // =========================================================================

    /// Structural metadata for a table, or `None` if unknown.
    async fn get_table_metadata(&self, table_name: &str) -> MetadataResult<Option<TableMetadata>>;

    /// Columns relevant to a free-text description, most relevant first.
    async fn get_relevant_columns(
        &self,
        table_name: &str,
        description: &str,
    ) -> MetadataResult<Vec<ColumnMetadata>>;

    /// Names of every known table.
    async fn list_tables(&self) -> MetadataResult<Vec<String>>;

    /// Metadata for a single column.
    async fn get_column_metadata(
        &self,
        table_name: &str,
        column_name: &str,
    ) -> MetadataResult<Option<ColumnMetadata>> {
        Ok(self
            .get_table_metadata(table_name)
            .await?
            .and_then(|t| t.column(column_name).cloned()))
    }

    /// Primary key column names, in column order.
    async fn get_primary_keys(&self, table_name: &str) -> MetadataResult<Vec<String>> {
        let Some(table) = self.get_table_metadata(table_name).await? else {
            return Ok(Vec::new());
        };
        Ok(table
            .columns
            .iter()
            .filter(|c| table.is_key_column(c))
            .map(|c| c.name.clone())
            .collect())
    }
}
