//! Table-bound gateway over a [`TableStore`].
//!
//! The gateway is built once per process with a fixed [`TableDefinition`]
//! and shared behind an `Arc`. It holds no mutable state: every method is
//! one call (or, for provisioning, one bounded poll) against the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use keebdb_core::codec::{number_value, string_value};
use keebdb_core::storage::{
    AttributeType, Projection, Result, StorageError, TableDefinition, TableDescriptor,
    TableStatus, TableStore,
};
use keebdb_core::Record;

/// How long `create` waits for a new table to turn active.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Delay between two describe calls while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Outcome of [`TableGateway::ensure_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned {
    AlreadyPresent(TableDescriptor),
    Created(TableDescriptor),
}

impl Provisioned {
    pub fn descriptor(&self) -> &TableDescriptor {
        match self {
            Provisioned::AlreadyPresent(descriptor) | Provisioned::Created(descriptor) => {
                descriptor
            }
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Provisioned::Created(_))
    }
}

/// Reads and writes typed records in a single table.
pub struct TableGateway {
    store: Arc<dyn TableStore>,
    definition: TableDefinition,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl TableGateway {
    pub fn new(store: Arc<dyn TableStore>, definition: TableDefinition) -> Self {
        Self {
            store,
            definition,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the provisioning wait policy.
    pub fn with_wait(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.wait_timeout = timeout;
        self.poll_interval = poll_interval;
        self
    }

    pub fn table_name(&self) -> &str {
        &self.definition.table_name
    }

    pub fn definition(&self) -> &TableDefinition {
        &self.definition
    }

    pub async fn describe(&self) -> Result<TableDescriptor> {
        self.store.describe_table(self.table_name()).await
    }

    /// Whether the table exists and is active.
    ///
    /// `Ok(false)` means the store answered that the table is missing (or not
    /// active yet). Any other failure is an `Err`, so "absent" and "could not
    /// tell" never collapse into the same value.
    pub async fn exists(&self) -> Result<bool> {
        match self.describe().await {
            Ok(descriptor) if descriptor.status.is_active() => Ok(true),
            Ok(descriptor) => {
                tracing::info!(
                    table = %self.table_name(),
                    status = ?descriptor.status,
                    "Table found but not active"
                );
                Ok(false)
            }
            Err(e) if e.is_not_found() => Ok(false),
            Err(StorageError::Transport(message)) => Err(StorageError::Transport(message)),
            Err(e) => Err(StorageError::Transport(e.to_string())),
        }
    }

    /// Creates the table and blocks until it is active.
    ///
    /// There is no guard against creating a table that already exists; the
    /// store rejects it and the rejection comes back as `Provisioning`.
    pub async fn create(&self) -> Result<TableDescriptor> {
        tracing::info!(
            table = %self.table_name(),
            read_capacity = self.definition.throughput.read_capacity_units,
            write_capacity = self.definition.throughput.write_capacity_units,
            "Creating table"
        );

        let descriptor = self
            .store
            .create_table(&self.definition)
            .await
            .map_err(|e| match e {
                StorageError::Provisioning(_) | StorageError::Transport(_) => e,
                other => StorageError::Provisioning(other.to_string()),
            })?;

        if descriptor.status.is_active() {
            return Ok(descriptor);
        }

        self.wait_until_active().await
    }

    /// Makes sure the table exists, creating it when the store reports it missing.
    pub async fn ensure_table(&self) -> Result<Provisioned> {
        match self.describe().await {
            Ok(descriptor) => {
                if descriptor.key_schema != self.definition.key_schema {
                    tracing::warn!(
                        table = %self.table_name(),
                        expected = ?self.definition.key_schema,
                        actual = ?descriptor.key_schema,
                        "Existing table has a different key schema"
                    );
                }

                match descriptor.status {
                    TableStatus::Active => Ok(Provisioned::AlreadyPresent(descriptor)),
                    TableStatus::Deleting => Err(StorageError::Provisioning(format!(
                        "Table '{}' is being deleted",
                        self.table_name()
                    ))),
                    _ => self.wait_until_active().await.map(Provisioned::AlreadyPresent),
                }
            }
            Err(e) if e.is_not_found() => self.create().await.map(Provisioned::Created),
            Err(e) => Err(e),
        }
    }

    async fn wait_until_active(&self) -> Result<TableDescriptor> {
        let started = Instant::now();

        loop {
            match self.describe().await {
                Ok(descriptor) if descriptor.status.is_active() => {
                    tracing::info!(
                        table = %self.table_name(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Table is active"
                    );
                    return Ok(descriptor);
                }
                Ok(descriptor) if descriptor.status == TableStatus::Deleting => {
                    return Err(StorageError::Provisioning(format!(
                        "Table '{}' is being deleted",
                        self.table_name()
                    )));
                }
                Ok(descriptor) => {
                    tracing::debug!(
                        table = %self.table_name(),
                        status = ?descriptor.status,
                        "Waiting for table"
                    );
                }
                // Freshly created tables can briefly be invisible to describe.
                Err(e) if e.is_not_found() => {
                    tracing::debug!(table = %self.table_name(), "Table not visible yet");
                }
                Err(e) => return Err(e),
            }

            if started.elapsed() >= self.wait_timeout {
                return Err(StorageError::Timeout {
                    table_name: self.table_name().to_string(),
                    waited_secs: self.wait_timeout.as_secs(),
                });
            }

            let remaining = self.wait_timeout.saturating_sub(started.elapsed());
            sleep(self.poll_interval.min(remaining)).await;
        }
    }

    /// Point lookup by the probe's full key. `Ok(None)` when nothing is stored under it.
    pub async fn get<R: Record>(&self, probe: &R) -> Result<Option<R>> {
        let key = probe.encode_key()?;
        let item = self.store.get_item(self.table_name(), key).await?;

        tracing::debug!(
            entity = R::ENTITY_TYPE,
            key = %probe.key_display(),
            found = item.is_some(),
            "Get"
        );

        item.as_ref().map(R::decode_item).transpose()
    }

    /// Insert-or-replace by key.
    ///
    /// Encoding failures come back as `Encoding` and unreachable stores as
    /// `Transport`. Any other store failure is a `StoreWrite`.
    pub async fn put<R: Record>(&self, record: &R) -> Result<()> {
        let item = record.encode_full()?;
        self.store
            .put_item(self.table_name(), item)
            .await
            .map_err(|e| match e {
                StorageError::Transport(_) | StorageError::StoreWrite(_) => e,
                other => StorageError::StoreWrite(other.to_string()),
            })?;

        tracing::debug!(entity = R::ENTITY_TYPE, key = %record.key_display(), "Put");
        Ok(())
    }

    /// Every record in the first page of a full-table scan.
    pub async fn scan<R: Record>(&self) -> Result<Vec<R>> {
        let projection = Projection::new(R::attribute_names())?;
        let page = self.store.scan(self.table_name(), &projection).await?;

        if page.has_more {
            tracing::warn!(
                table = %self.table_name(),
                returned = page.items.len(),
                "Scan result truncated to a single page"
            );
        }

        page.items.iter().map(R::decode_item).collect()
    }

    /// Every record sharing the partition key `id`, first page only.
    pub async fn find_by_id<R: Record>(&self, id: &str) -> Result<Vec<R>> {
        let partition_key = &self.definition.key_schema.partition_key;
        let key_value = match partition_key.attribute_type {
            AttributeType::Number => number_value(&partition_key.name, id)?,
            AttributeType::String => string_value(id),
        };
        let projection = Projection::new(R::attribute_names())?;

        let page = self
            .store
            .query_partition(
                self.table_name(),
                &partition_key.name,
                key_value,
                &projection,
            )
            .await?;

        if page.has_more {
            tracing::warn!(
                table = %self.table_name(),
                id,
                returned = page.items.len(),
                "Query result truncated to a single page"
            );
        }

        page.items.iter().map(R::decode_item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::inmemory::InMemoryStore;
    use keebdb_core::codec::get_string;
    use keebdb_core::storage::{AttributeValue, Item, KeySchema};
    use keebdb_core::Keyboard;

    const TABLE: &str = "keyboards";

    fn gateway(store: &InMemoryStore) -> TableGateway {
        let definition = TableDefinition::new(TABLE, Keyboard::key_schema());
        TableGateway::new(Arc::new(store.clone()), definition)
            .with_wait(Duration::from_millis(200), Duration::from_millis(1))
    }

    async fn ready_gateway() -> (InMemoryStore, TableGateway) {
        let store = InMemoryStore::new();
        let gateway = gateway(&store);
        gateway.create().await.unwrap();
        (store, gateway)
    }

    /// A record with an attribute outside the key.
    #[derive(Debug, Clone, PartialEq)]
    struct ColoredBoard {
        id: String,
        name: String,
        color: String,
    }

    impl Record for ColoredBoard {
        const ENTITY_TYPE: &'static str = "ColoredBoard";

        fn key_schema() -> KeySchema {
            Keyboard::key_schema()
        }

        fn attribute_names() -> Vec<&'static str> {
            vec!["id", "name", "color"]
        }

        fn encode_key(&self) -> Result<Item> {
            Keyboard::new(&self.id, &self.name).encode_key()
        }

        fn encode_full(&self) -> Result<Item> {
            let mut item = self.encode_key()?;
            item.insert("color".to_string(), string_value(&self.color));
            Ok(item)
        }

        fn decode_item(item: &Item) -> Result<Self> {
            let keyboard = Keyboard::decode_item(item)?;
            Ok(Self {
                id: keyboard.id,
                name: keyboard.name,
                color: get_string(item, "color")?,
            })
        }

        fn key_display(&self) -> String {
            format!("{}#{}", self.id, self.name)
        }
    }

    #[tokio::test]
    async fn test_absent_table_is_created_and_then_exists() {
        let store = InMemoryStore::new().with_activation_delay(3);
        let gateway = gateway(&store);

        assert!(!gateway.exists().await.unwrap());

        let descriptor = gateway.create().await.unwrap();
        assert_eq!(descriptor.status, TableStatus::Active);
        assert_eq!(descriptor.table_name, TABLE);
        assert_eq!(descriptor.key_schema, Keyboard::key_schema());

        assert!(gateway.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_is_stable() {
        let store = InMemoryStore::new();
        let gateway = gateway(&store);

        assert_eq!(gateway.exists().await.unwrap(), gateway.exists().await.unwrap());

        gateway.create().await.unwrap();
        assert!(gateway.exists().await.unwrap());
        assert!(gateway.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_reports_transport_failure() {
        let (store, gateway) = ready_gateway().await;
        store.set_unavailable(true);

        let err = gateway.exists().await.unwrap_err();
        assert!(matches!(err, StorageError::Transport(_)));
    }

    #[tokio::test]
    async fn test_create_uses_definition_throughput() {
        let store = InMemoryStore::new();
        let definition = TableDefinition::new(TABLE, Keyboard::key_schema()).with_throughput(
            keebdb_core::storage::Throughput {
                read_capacity_units: 10,
                write_capacity_units: 2,
            },
        );
        let gateway = TableGateway::new(Arc::new(store), definition);

        let descriptor = gateway.create().await.unwrap();
        let throughput = descriptor.throughput.unwrap();
        assert_eq!(throughput.read_capacity_units, 10);
        assert_eq!(throughput.write_capacity_units, 2);
    }

    #[tokio::test]
    async fn test_create_twice_is_provisioning_error() {
        let (_store, gateway) = ready_gateway().await;

        let err = gateway.create().await.unwrap_err();
        assert!(matches!(err, StorageError::Provisioning(_)));
    }

    #[tokio::test]
    async fn test_create_times_out() {
        let store = InMemoryStore::new().with_activation_delay(usize::MAX);
        let definition = TableDefinition::new(TABLE, Keyboard::key_schema());
        let gateway = TableGateway::new(Arc::new(store), definition)
            .with_wait(Duration::from_millis(20), Duration::from_millis(5));

        let err = gateway.create().await.unwrap_err();
        assert_eq!(
            err,
            StorageError::Timeout {
                table_name: TABLE.to_string(),
                waited_secs: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_create_wait_stays_within_timeout() {
        let store = InMemoryStore::new().with_activation_delay(usize::MAX);
        let definition = TableDefinition::new(TABLE, Keyboard::key_schema());
        let gateway = TableGateway::new(Arc::new(store), definition)
            .with_wait(Duration::from_millis(20), Duration::from_secs(60));

        let started = Instant::now();
        let result = tokio::time::timeout(Duration::from_secs(5), gateway.create())
            .await
            .expect("wait should end at the timeout, not after a full poll interval");

        assert!(matches!(result, Err(StorageError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_ensure_table_creates_once() {
        let store = InMemoryStore::new().with_activation_delay(1);
        let gateway = gateway(&store);

        let first = gateway.ensure_table().await.unwrap();
        assert!(first.was_created());
        assert!(first.descriptor().status.is_active());

        let second = gateway.ensure_table().await.unwrap();
        assert!(!second.was_created());
    }

    #[tokio::test]
    async fn test_ensure_table_waits_for_creating_table() {
        let store = InMemoryStore::new().with_activation_delay(2);
        let first = gateway(&store);
        store.create_table(first.definition()).await.unwrap();

        let provisioned = gateway(&store).ensure_table().await.unwrap();
        assert_eq!(
            provisioned,
            Provisioned::AlreadyPresent(provisioned.descriptor().clone())
        );
        assert!(provisioned.descriptor().status.is_active());
    }

    #[tokio::test]
    async fn test_put_then_scan() {
        let (_store, gateway) = ready_gateway().await;

        gateway.put(&Keyboard::new("1", "Model M")).await.unwrap();

        let keyboards: Vec<Keyboard> = gateway.scan().await.unwrap();
        assert_eq!(keyboards, vec![Keyboard::new("1", "Model M")]);
    }

    #[tokio::test]
    async fn test_put_same_key_twice_keeps_one_item() {
        let (_store, gateway) = ready_gateway().await;

        gateway.put(&Keyboard::new("1", "Model M")).await.unwrap();
        gateway.put(&Keyboard::new("1", "Model M")).await.unwrap();

        let keyboards: Vec<Keyboard> = gateway.scan().await.unwrap();
        assert_eq!(keyboards.len(), 1);
    }

    #[tokio::test]
    async fn test_put_overwrites_non_key_attributes() {
        let (_store, gateway) = ready_gateway().await;
        let beige = ColoredBoard {
            id: "1".to_string(),
            name: "Model M".to_string(),
            color: "beige".to_string(),
        };
        let black = ColoredBoard {
            color: "black".to_string(),
            ..beige.clone()
        };

        gateway.put(&beige).await.unwrap();
        gateway.put(&black).await.unwrap();

        assert_eq!(gateway.get(&beige).await.unwrap(), Some(black.clone()));
        let boards: Vec<ColoredBoard> = gateway.scan().await.unwrap();
        assert_eq!(boards, vec![black]);
    }

    #[tokio::test]
    async fn test_scan_returns_every_item() {
        let (_store, gateway) = ready_gateway().await;
        for id in 0..25 {
            gateway
                .put(&Keyboard::new(id.to_string(), format!("Board {id}")))
                .await
                .unwrap();
        }

        let keyboards: Vec<Keyboard> = gateway.scan().await.unwrap();
        assert_eq!(keyboards.len(), 25);
        assert!(keyboards.contains(&Keyboard::new("7", "Board 7")));
    }

    #[tokio::test]
    async fn test_scan_single_page_when_truncated() {
        let store = InMemoryStore::new().with_page_size(2);
        let gateway = gateway(&store);
        gateway.create().await.unwrap();
        for id in ["1", "2", "3"] {
            gateway.put(&Keyboard::new(id, "Board")).await.unwrap();
        }

        let keyboards: Vec<Keyboard> = gateway.scan().await.unwrap();
        assert_eq!(keyboards.len(), 2);
    }

    #[tokio::test]
    async fn test_scan_empty_table() {
        let (_store, gateway) = ready_gateway().await;
        let keyboards: Vec<Keyboard> = gateway.scan().await.unwrap();
        assert!(keyboards.is_empty());
    }

    #[tokio::test]
    async fn test_get_found_and_missing() {
        let (_store, gateway) = ready_gateway().await;
        gateway.put(&Keyboard::new("1", "Model M")).await.unwrap();

        let found = gateway.get(&Keyboard::new("1", "Model M")).await.unwrap();
        assert_eq!(found, Some(Keyboard::new("1", "Model M")));

        let missing = gateway.get(&Keyboard::new("1", "Model F")).await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_put_rejects_non_numeric_id_before_store_call() {
        let (store, gateway) = ready_gateway().await;
        store.set_unavailable(true);

        let err = gateway
            .put(&Keyboard::new("model-m", "Model M"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Encoding(_)));
    }

    #[tokio::test]
    async fn test_put_against_missing_table_is_write_failure() {
        let store = InMemoryStore::new();
        let gateway = gateway(&store);

        let err = gateway.put(&Keyboard::new("1", "Model M")).await.unwrap_err();
        assert_eq!(
            err,
            StorageError::StoreWrite("Table not found: keyboards".to_string())
        );
    }

    #[tokio::test]
    async fn test_put_keeps_transport_failure() {
        let (store, gateway) = ready_gateway().await;
        store.set_unavailable(true);

        let err = gateway.put(&Keyboard::new("1", "Model M")).await.unwrap_err();
        assert!(matches!(err, StorageError::Transport(_)));
    }

    #[tokio::test]
    async fn test_equal_ids_address_one_record() {
        let (_store, gateway) = ready_gateway().await;

        gateway.put(&Keyboard::new("1", "Model M")).await.unwrap();
        gateway.put(&Keyboard::new("1.0", "Model M")).await.unwrap();
        gateway.put(&Keyboard::new("01", "Model M")).await.unwrap();

        let keyboards: Vec<Keyboard> = gateway.scan().await.unwrap();
        assert_eq!(keyboards, vec![Keyboard::new("1", "Model M")]);

        let found = gateway.get(&Keyboard::new("1e0", "Model M")).await.unwrap();
        assert_eq!(found, Some(Keyboard::new("1", "Model M")));

        let by_id: Vec<Keyboard> = gateway.find_by_id("1.00").await.unwrap();
        assert_eq!(by_id, vec![Keyboard::new("1", "Model M")]);
    }

    #[tokio::test]
    async fn test_put_rejects_id_outside_number_range() {
        let (store, gateway) = ready_gateway().await;
        store.set_unavailable(true);

        for id in ["1e200", "1234567890123456789012345678901234567890"] {
            let err = gateway.put(&Keyboard::new(id, "Model M")).await.unwrap_err();
            assert!(matches!(err, StorageError::Encoding(_)), "{id}");
        }
    }

    #[tokio::test]
    async fn test_scan_fails_on_undecodable_item() {
        let (store, gateway) = ready_gateway().await;
        let mut item = Item::new();
        item.insert("id".to_string(), AttributeValue::N("1".to_string()));
        item.insert("name".to_string(), AttributeValue::S("Model M".to_string()));
        store.put_item(TABLE, item).await.unwrap();

        let err = gateway.scan::<ColoredBoard>().await.unwrap_err();
        assert!(matches!(err, StorageError::Decoding(_)));
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let (_store, gateway) = ready_gateway().await;
        gateway.put(&Keyboard::new("1", "Model M")).await.unwrap();
        gateway.put(&Keyboard::new("1", "Model F")).await.unwrap();
        gateway.put(&Keyboard::new("2", "HHKB")).await.unwrap();

        let mut keyboards: Vec<Keyboard> = gateway.find_by_id("1").await.unwrap();
        keyboards.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(
            keyboards,
            vec![Keyboard::new("1", "Model F"), Keyboard::new("1", "Model M")]
        );

        let none: Vec<Keyboard> = gateway.find_by_id("3").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id_rejects_non_numeric_id() {
        let (_store, gateway) = ready_gateway().await;
        let err = gateway.find_by_id::<Keyboard>("abc").await.unwrap_err();
        assert!(matches!(err, StorageError::Encoding(_)));
    }
}
