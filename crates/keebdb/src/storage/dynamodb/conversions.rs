//! Conversions between SDK table types and `keebdb_core::storage` types.
//!
//! Pure functions, testable without DynamoDB access.

use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput, ScalarAttributeType,
    TableDescription, TableStatus as SdkTableStatus,
};
use keebdb_core::storage::{
    AttributeType, KeyAttribute, KeySchema, Result, StorageError, TableDescriptor, TableStatus,
    Throughput,
};

pub fn to_scalar_type(attribute_type: AttributeType) -> ScalarAttributeType {
    match attribute_type {
        AttributeType::String => ScalarAttributeType::S,
        AttributeType::Number => ScalarAttributeType::N,
    }
}

fn from_scalar_type(scalar: &ScalarAttributeType) -> Result<AttributeType> {
    match scalar {
        ScalarAttributeType::S => Ok(AttributeType::String),
        ScalarAttributeType::N => Ok(AttributeType::Number),
        other => Err(StorageError::Decoding(format!(
            "Unsupported key attribute type: {}",
            other.as_str()
        ))),
    }
}

fn to_table_status(status: Option<&SdkTableStatus>) -> TableStatus {
    match status {
        Some(SdkTableStatus::Active) => TableStatus::Active,
        Some(SdkTableStatus::Creating) => TableStatus::Creating,
        Some(SdkTableStatus::Updating) => TableStatus::Updating,
        Some(SdkTableStatus::Deleting) => TableStatus::Deleting,
        Some(other) => TableStatus::Other(other.as_str().to_string()),
        None => TableStatus::Other("UNKNOWN".to_string()),
    }
}

/// Key schema elements and attribute definitions for a CreateTable request.
pub fn to_key_schema_elements(
    key_schema: &KeySchema,
) -> Result<(Vec<KeySchemaElement>, Vec<AttributeDefinition>)> {
    let mut elements = Vec::with_capacity(2);
    let mut definitions = Vec::with_capacity(2);

    let key_types = std::iter::once(KeyType::Hash).chain(std::iter::once(KeyType::Range));
    for (attribute, key_type) in key_schema.attributes().zip(key_types) {
        elements.push(
            KeySchemaElement::builder()
                .attribute_name(&attribute.name)
                .key_type(key_type)
                .build()
                .map_err(|e| StorageError::Provisioning(e.to_string()))?,
        );
        definitions.push(
            AttributeDefinition::builder()
                .attribute_name(&attribute.name)
                .attribute_type(to_scalar_type(attribute.attribute_type))
                .build()
                .map_err(|e| StorageError::Provisioning(e.to_string()))?,
        );
    }

    Ok((elements, definitions))
}

pub fn to_provisioned_throughput(throughput: &Throughput) -> Result<ProvisionedThroughput> {
    ProvisionedThroughput::builder()
        .read_capacity_units(throughput.read_capacity_units)
        .write_capacity_units(throughput.write_capacity_units)
        .build()
        .map_err(|e| StorageError::Provisioning(e.to_string()))
}

/// Convert a table description into a descriptor.
pub fn to_descriptor(table: &TableDescription) -> Result<TableDescriptor> {
    let table_name = table
        .table_name()
        .ok_or_else(|| StorageError::Decoding("Table description has no name".to_string()))?
        .to_string();

    let key_attribute = |element: &KeySchemaElement| -> Result<KeyAttribute> {
        let name = element.attribute_name();
        let definition = table
            .attribute_definitions()
            .iter()
            .find(|definition| definition.attribute_name() == name)
            .ok_or_else(|| {
                StorageError::Decoding(format!("No attribute definition for key {name}"))
            })?;
        Ok(KeyAttribute::new(
            name,
            from_scalar_type(definition.attribute_type())?,
        ))
    };

    let mut partition_key = None;
    let mut sort_key = None;
    for element in table.key_schema() {
        match element.key_type() {
            KeyType::Hash => partition_key = Some(key_attribute(element)?),
            KeyType::Range => sort_key = Some(key_attribute(element)?),
            other => {
                return Err(StorageError::Decoding(format!(
                    "Unknown key type: {}",
                    other.as_str()
                )))
            }
        }
    }
    let partition_key = partition_key.ok_or_else(|| {
        StorageError::Decoding(format!("Table {table_name} has no partition key"))
    })?;

    let throughput = table.provisioned_throughput().and_then(|provisioned| {
        Some(Throughput {
            read_capacity_units: provisioned.read_capacity_units()?,
            write_capacity_units: provisioned.write_capacity_units()?,
        })
    });

    Ok(TableDescriptor {
        table_name,
        status: to_table_status(table.table_status()),
        key_schema: KeySchema {
            partition_key,
            sort_key,
        },
        throughput,
        item_count: table.item_count(),
    })
}
