//! Table store backends and the gateway that binds one of them to a table.
//!
//! - `dynamodb`: AWS DynamoDB through `aws-sdk-dynamodb`
//! - `inmemory`: process-local tables for tests and local runs
//!
//! The backend is picked at startup (`--storage`), and handlers only ever
//! see the [`TableGateway`].

pub mod dynamodb;
pub mod gateway;
pub mod inmemory;

pub use dynamodb::DynamoDbStore;
pub use gateway::{Provisioned, TableGateway};
pub use inmemory::InMemoryStore;
