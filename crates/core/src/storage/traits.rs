use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use super::{Item, Projection, Result, ScanPage, TableDefinition, TableDescriptor};

/// The durable table store.
///
/// Every method is a single call against the store. Implementations own
/// concurrency control; callers never lock around them.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Describes a table. Returns [`StorageError::NotFound`](super::StorageError::NotFound)
    /// when the table does not exist.
    async fn describe_table(&self, table_name: &str) -> Result<TableDescriptor>;

    /// Issues a create request. The returned descriptor is usually still `Creating`.
    async fn create_table(&self, definition: &TableDefinition) -> Result<TableDescriptor>;

    /// Point lookup by a key-only item. `None` when no item is stored under the key.
    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>>;

    /// Insert-or-replace of a full item.
    async fn put_item(&self, table_name: &str, item: Item) -> Result<()>;

    /// Single-page scan, no filter, projected to `projection`.
    async fn scan(&self, table_name: &str, projection: &Projection) -> Result<ScanPage>;

    /// Single-page query for every item under one partition key value.
    async fn query_partition(
        &self,
        table_name: &str,
        key_name: &str,
        key_value: AttributeValue,
        projection: &Projection,
    ) -> Result<ScanPage>;
}
