//! In-memory table store implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use keebdb_core::codec::canonical_number;
use keebdb_core::storage::{
    AttributeValue, Item, KeySchema, Projection, Result, ScanPage, StorageError, TableDefinition,
    TableDescriptor, TableStatus, TableStore,
};

/// Key attribute values in schema order, tagged with their type.
type ItemKey = Vec<String>;

#[derive(Debug)]
struct Table {
    definition: TableDefinition,
    status: TableStatus,
    /// Describe calls left before a `Creating` table turns `Active`.
    pending_describes: usize,
    items: BTreeMap<ItemKey, Item>,
}

impl Table {
    fn descriptor(&self) -> TableDescriptor {
        TableDescriptor {
            table_name: self.definition.table_name.clone(),
            status: self.status.clone(),
            key_schema: self.definition.key_schema.clone(),
            throughput: Some(self.definition.throughput),
            item_count: Some(self.items.len() as i64),
        }
    }
}

/// In-memory store for tests and local runs.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
    activation_delay: usize,
    page_size: Option<usize>,
    unavailable: Arc<AtomicBool>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates an empty store. Created tables turn active on the first describe.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            activation_delay: 0,
            page_size: None,
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of describe calls a new table stays `Creating` for.
    pub fn with_activation_delay(mut self, describes: usize) -> Self {
        self.activation_delay = describes;
        self
    }

    /// Caps scan and query pages, like the 1 MB page limit of the real store.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// While set, every call fails with a transport error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Transport(
                "in-memory store is unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn page(&self, items: Vec<Item>) -> ScanPage {
        match self.page_size {
            Some(limit) if items.len() > limit => ScanPage {
                items: items.into_iter().take(limit).collect(),
                has_more: true,
            },
            _ => ScanPage {
                items,
                has_more: false,
            },
        }
    }
}

/// Builds the storage key of an item, validating it against the schema.
fn item_key(schema: &KeySchema, item: &Item) -> std::result::Result<ItemKey, String> {
    schema
        .attributes()
        .map(|attribute| {
            let value = item
                .get(&attribute.name)
                .ok_or_else(|| format!("Missing the key {} in the item", attribute.name))?;

            if !attribute.attribute_type.matches(value) {
                return Err(format!(
                    "Type mismatch for key {} expected: {}",
                    attribute.name,
                    attribute.attribute_type.as_str()
                ));
            }

            match value {
                AttributeValue::S(s) if s.is_empty() => Err(format!(
                    "The AttributeValue for key {} cannot contain an empty string value",
                    attribute.name
                )),
                AttributeValue::S(s) => Ok(format!("S:{s}")),
                AttributeValue::N(n) => canonical_number(n)
                    .map(|n| format!("N:{n}"))
                    .map_err(|e| format!("Key {} value '{n}' {e}", attribute.name)),
                other => Ok(format!("{other:?}")),
            }
        })
        .collect()
}

/// Rewrites number attributes the way the store keeps them.
fn normalize_numbers(item: Item) -> std::result::Result<Item, String> {
    item.into_iter()
        .map(|(name, value)| match value {
            AttributeValue::N(n) => canonical_number(&n)
                .map(|n| (name.clone(), AttributeValue::N(n)))
                .map_err(|e| format!("Attribute {name} value '{n}' {e}")),
            other => Ok((name, other)),
        })
        .collect()
}

fn project(item: &Item, projection: &Projection) -> Item {
    projection
        .attributes()
        .filter_map(|name| item.get(name).map(|value| (name.to_string(), value.clone())))
        .collect()
}

#[async_trait]
impl TableStore for InMemoryStore {
    async fn describe_table(&self, table_name: &str) -> Result<TableDescriptor> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| StorageError::table_not_found(table_name))?;

        if table.status == TableStatus::Creating {
            if table.pending_describes == 0 {
                table.status = TableStatus::Active;
            } else {
                table.pending_describes -= 1;
            }
        }

        Ok(table.descriptor())
    }

    async fn create_table(&self, definition: &TableDefinition) -> Result<TableDescriptor> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.contains_key(&definition.table_name) {
            return Err(StorageError::Provisioning(format!(
                "Table already exists: {}",
                definition.table_name
            )));
        }

        let table = Table {
            definition: definition.clone(),
            status: TableStatus::Creating,
            pending_describes: self.activation_delay,
            items: BTreeMap::new(),
        };
        let descriptor = table.descriptor();
        tables.insert(definition.table_name.clone(), table);

        Ok(descriptor)
    }

    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let table = tables
            .get(table_name)
            .ok_or_else(|| StorageError::table_not_found(table_name))?;

        let schema = &table.definition.key_schema;
        if key.len() != schema.attributes().count() {
            return Err(StorageError::StoreRead(
                "The provided key element does not match the schema".to_string(),
            ));
        }
        let key = item_key(schema, &key).map_err(StorageError::StoreRead)?;

        Ok(table.items.get(&key).cloned())
    }

    async fn put_item(&self, table_name: &str, item: Item) -> Result<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| StorageError::table_not_found(table_name))?;

        let item = normalize_numbers(item).map_err(StorageError::StoreWrite)?;
        let key =
            item_key(&table.definition.key_schema, &item).map_err(StorageError::StoreWrite)?;
        table.items.insert(key, item);

        Ok(())
    }

    async fn scan(&self, table_name: &str, projection: &Projection) -> Result<ScanPage> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let table = tables
            .get(table_name)
            .ok_or_else(|| StorageError::table_not_found(table_name))?;

        let items = table
            .items
            .values()
            .map(|item| project(item, projection))
            .collect();

        Ok(self.page(items))
    }

    async fn query_partition(
        &self,
        table_name: &str,
        key_name: &str,
        key_value: AttributeValue,
        projection: &Projection,
    ) -> Result<ScanPage> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let table = tables
            .get(table_name)
            .ok_or_else(|| StorageError::table_not_found(table_name))?;

        if table.definition.key_schema.partition_key.name != key_name {
            return Err(StorageError::StoreRead(format!(
                "Query condition missed key schema element: {}",
                table.definition.key_schema.partition_key.name
            )));
        }

        let key_value = match key_value {
            AttributeValue::N(n) => {
                let canonical = canonical_number(&n).map_err(|e| {
                    StorageError::StoreRead(format!("Key {key_name} value '{n}' {e}"))
                })?;
                AttributeValue::N(canonical)
            }
            other => other,
        };

        let items = table
            .items
            .values()
            .filter(|item| item.get(key_name) == Some(&key_value))
            .map(|item| project(item, projection))
            .collect();

        Ok(self.page(items))
    }
}
