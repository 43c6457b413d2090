//! DynamoDB table store implementation.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use keebdb_core::storage::{
    Item, Projection, Result, ScanPage, StorageError, TableDefinition, TableDescriptor,
    TableStore,
};

use super::conversions::{to_descriptor, to_key_schema_elements, to_provisioned_throughput};
use super::error::{
    map_create_table_error, map_describe_table_error, map_get_item_error, map_put_item_error,
    map_query_error, map_scan_error,
};

/// Placeholders used by partition queries when the key is not projected.
const PARTITION_NAME_PLACEHOLDER: &str = "#pk";
const PARTITION_VALUE_PLACEHOLDER: &str = ":pk";

/// DynamoDB-based table store.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
}

impl DynamoDbStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TableStore for DynamoDbStore {
    async fn describe_table(&self, table_name: &str) -> Result<TableDescriptor> {
        let response = self
            .client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| map_describe_table_error(e, table_name))?;

        let table = response.table.ok_or_else(|| {
            StorageError::Decoding(format!("DescribeTable returned no table for {table_name}"))
        })?;

        to_descriptor(&table)
    }

    async fn create_table(&self, definition: &TableDefinition) -> Result<TableDescriptor> {
        let (key_schema, attribute_definitions) =
            to_key_schema_elements(&definition.key_schema)?;
        let throughput = to_provisioned_throughput(&definition.throughput)?;

        let response = self
            .client
            .create_table()
            .table_name(&definition.table_name)
            .set_key_schema(Some(key_schema))
            .set_attribute_definitions(Some(attribute_definitions))
            .provisioned_throughput(throughput)
            .send()
            .await
            .map_err(|e| map_create_table_error(e, &definition.table_name))?;

        let table = response.table_description.ok_or_else(|| {
            StorageError::Provisioning(format!(
                "CreateTable returned no description for {}",
                definition.table_name
            ))
        })?;

        to_descriptor(&table)
    }

    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>> {
        let result = self
            .client
            .get_item()
            .table_name(table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| map_get_item_error(e, table_name))?;

        Ok(result.item)
    }

    async fn put_item(&self, table_name: &str, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, table_name))?;

        Ok(())
    }

    async fn scan(&self, table_name: &str, projection: &Projection) -> Result<ScanPage> {
        let result = self
            .client
            .scan()
            .table_name(table_name)
            .projection_expression(projection.expression())
            .set_expression_attribute_names(Some(projection.names().clone()))
            .send()
            .await
            .map_err(|e| map_scan_error(e, table_name))?;

        Ok(ScanPage {
            items: result.items.unwrap_or_default(),
            has_more: result.last_evaluated_key.is_some(),
        })
    }

    async fn query_partition(
        &self,
        table_name: &str,
        key_name: &str,
        key_value: AttributeValue,
        projection: &Projection,
    ) -> Result<ScanPage> {
        let mut names = projection.names().clone();
        let name_placeholder = match projection.placeholder_for(key_name) {
            Some(placeholder) => placeholder.to_string(),
            None => {
                names.insert(
                    PARTITION_NAME_PLACEHOLDER.to_string(),
                    key_name.to_string(),
                );
                PARTITION_NAME_PLACEHOLDER.to_string()
            }
        };

        let result = self
            .client
            .query()
            .table_name(table_name)
            .key_condition_expression(format!(
                "{name_placeholder} = {PARTITION_VALUE_PLACEHOLDER}"
            ))
            .expression_attribute_values(PARTITION_VALUE_PLACEHOLDER, key_value)
            .projection_expression(projection.expression())
            .set_expression_attribute_names(Some(names))
            .send()
            .await
            .map_err(|e| map_query_error(e, table_name))?;

        Ok(ScanPage {
            items: result.items.unwrap_or_default(),
            has_more: result.last_evaluated_key.is_some(),
        })
    }
}
