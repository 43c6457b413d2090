//! Shared application state.

use std::sync::Arc;

use crate::storage::TableGateway;

/// Cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Gateway bound to the keyboards table.
    pub gateway: Arc<TableGateway>,
}

impl AppState {
    pub fn new(gateway: TableGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}
