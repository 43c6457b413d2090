mod error;
mod expression;
mod http_mapping;
mod traits;
mod types;

pub use aws_sdk_dynamodb::types::AttributeValue;
pub use error::{Result, StorageError};
pub use expression::Projection;
pub use http_mapping::storage_error_to_status_code;
pub use traits::TableStore;
pub use types::{
    AttributeType, Item, KeyAttribute, KeySchema, ScanPage, TableDefinition, TableDescriptor,
    TableStatus, Throughput,
};
