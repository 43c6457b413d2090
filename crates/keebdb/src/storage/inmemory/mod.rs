//! In-memory table store.
//!
//! Keeps every table in a `HashMap` wrapped in `Arc<RwLock<_>>`. It enforces
//! the key schema the same way DynamoDB does, which makes it a faithful
//! stand-in for tests and local runs. Data is lost when the store is dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use keebdb::storage::inmemory::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! // Hand the store to a TableGateway...
//! ```

mod store;

pub use store::InMemoryStore;
