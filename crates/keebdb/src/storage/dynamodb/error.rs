//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StorageError` from `keebdb_core::storage`.
//! Network failures and throttling become `Transport`, so callers can tell
//! "the store said no" apart from "the store could not be reached".

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use keebdb_core::storage::StorageError;

/// Failures that happen before the service answered.
fn transport_failure<E, R>(err: &SdkError<E, R>) -> Option<StorageError> {
    match err {
        SdkError::TimeoutError(_) => Some(StorageError::Transport(
            "DynamoDB request timed out".to_string(),
        )),
        SdkError::DispatchFailure(failure) => Some(StorageError::Transport(format!(
            "DynamoDB request could not be sent: {failure:?}"
        ))),
        SdkError::ResponseError(_) => Some(StorageError::Transport(
            "DynamoDB response could not be read".to_string(),
        )),
        _ => None,
    }
}

/// Map a DescribeTable SDK error to StorageError.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
    table_name: &str,
) -> StorageError {
    if let Some(transport) = transport_failure(&err) {
        return transport;
    }

    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => {
            StorageError::table_not_found(table_name)
        }
        DescribeTableError::InternalServerError(_) => {
            StorageError::Transport("DynamoDB internal server error".to_string())
        }
        err => StorageError::Transport(format!("DescribeTable failed: {:?}", err)),
    }
}

/// Map a CreateTable SDK error to StorageError.
pub fn map_create_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<CreateTableError, R>,
    table_name: &str,
) -> StorageError {
    if let Some(transport) = transport_failure(&err) {
        return transport;
    }

    match err.into_service_error() {
        CreateTableError::ResourceInUseException(_) => {
            StorageError::Provisioning(format!("Table already exists: {table_name}"))
        }
        CreateTableError::LimitExceededException(_) => {
            StorageError::Provisioning("Table limit exceeded".to_string())
        }
        CreateTableError::InternalServerError(_) => {
            StorageError::Provisioning("DynamoDB internal server error".to_string())
        }
        err => StorageError::Provisioning(format!("CreateTable failed: {:?}", err)),
    }
}

/// Map a GetItem SDK error to StorageError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
    table_name: &str,
) -> StorageError {
    if let Some(transport) = transport_failure(&err) {
        return transport;
    }

    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => StorageError::table_not_found(table_name),
        GetItemError::ProvisionedThroughputExceededException(_) => {
            StorageError::Transport("Throughput exceeded, please retry".to_string())
        }
        GetItemError::RequestLimitExceeded(_) => {
            StorageError::Transport("Request limit exceeded, please retry".to_string())
        }
        GetItemError::InternalServerError(_) => {
            StorageError::StoreRead("DynamoDB internal server error".to_string())
        }
        err => StorageError::StoreRead(format!("GetItem failed: {:?}", err)),
    }
}

/// Map a PutItem SDK error to StorageError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    table_name: &str,
) -> StorageError {
    if let Some(transport) = transport_failure(&err) {
        return transport;
    }

    match err.into_service_error() {
        PutItemError::ResourceNotFoundException(_) => StorageError::table_not_found(table_name),
        PutItemError::ProvisionedThroughputExceededException(_) => {
            StorageError::Transport("Throughput exceeded, please retry".to_string())
        }
        PutItemError::RequestLimitExceeded(_) => {
            StorageError::Transport("Request limit exceeded, please retry".to_string())
        }
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            StorageError::StoreWrite("Item collection size limit exceeded".to_string())
        }
        PutItemError::TransactionConflictException(_) => {
            StorageError::StoreWrite("Transaction conflict, please retry".to_string())
        }
        PutItemError::InternalServerError(_) => {
            StorageError::StoreWrite("DynamoDB internal server error".to_string())
        }
        err => StorageError::StoreWrite(format!("PutItem failed: {:?}", err)),
    }
}

/// Map a Scan SDK error to StorageError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
    table_name: &str,
) -> StorageError {
    if let Some(transport) = transport_failure(&err) {
        return transport;
    }

    match err.into_service_error() {
        ScanError::ResourceNotFoundException(_) => StorageError::table_not_found(table_name),
        ScanError::ProvisionedThroughputExceededException(_) => {
            StorageError::Transport("Throughput exceeded, please retry".to_string())
        }
        ScanError::RequestLimitExceeded(_) => {
            StorageError::Transport("Request limit exceeded, please retry".to_string())
        }
        ScanError::InternalServerError(_) => {
            StorageError::StoreRead("DynamoDB internal server error".to_string())
        }
        err => StorageError::StoreRead(format!("Scan failed: {:?}", err)),
    }
}

/// Map a Query SDK error to StorageError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
    table_name: &str,
) -> StorageError {
    if let Some(transport) = transport_failure(&err) {
        return transport;
    }

    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => StorageError::table_not_found(table_name),
        QueryError::ProvisionedThroughputExceededException(_) => {
            StorageError::Transport("Throughput exceeded, please retry".to_string())
        }
        QueryError::RequestLimitExceeded(_) => {
            StorageError::Transport("Request limit exceeded, please retry".to_string())
        }
        QueryError::InternalServerError(_) => {
            StorageError::StoreRead("DynamoDB internal server error".to_string())
        }
        err => StorageError::StoreRead(format!("Query failed: {:?}", err)),
    }
}
