//! DynamoDB table store.
//!
//! Implements [`TableStore`](keebdb_core::storage::TableStore) on top of
//! `aws-sdk-dynamodb`. Set `AWS_ENDPOINT_URL` to talk to DynamoDB Local.

mod client;
mod conversions;
mod error;
mod store;

pub use client::{create_client, AwsConfig};
pub use store::DynamoDbStore;
