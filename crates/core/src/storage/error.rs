use thiserror::Error;

/// Errors that can occur during table and item operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Decoding error: {0}")]
    Decoding(String),
    #[error("Provisioning failed: {0}")]
    Provisioning(String),
    #[error("Table '{table_name}' did not become active within {waited_secs}s")]
    Timeout { table_name: String, waited_secs: u64 },
    #[error("Could not build expression: {0}")]
    QueryBuild(String),
    #[error("Read failed: {0}")]
    StoreRead(String),
    #[error("Write failed: {0}")]
    StoreWrite(String),
}

impl StorageError {
    /// The error a store reports when a table does not exist.
    pub fn table_not_found(table_name: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Table",
            id: table_name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
