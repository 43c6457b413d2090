//! Pure functions for mapping storage errors to HTTP status codes.

use super::StorageError;

/// Maps a [`StorageError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `Encoding` -> 400 (Bad Request), the caller sent a value the table cannot hold
/// - `Transport` -> 503 (Service Unavailable)
/// - `Timeout` -> 503 (Service Unavailable)
/// - everything else -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use keebdb_core::storage::{storage_error_to_status_code, StorageError};
///
/// let error = StorageError::table_not_found("keebdb-keyboards");
/// assert_eq!(storage_error_to_status_code(&error), 404);
/// ```
pub fn storage_error_to_status_code(error: &StorageError) -> u16 {
    match error {
        StorageError::NotFound { .. } => 404,
        StorageError::Encoding(_) => 400,
        StorageError::Transport(_) => 503,
        StorageError::Timeout { .. } => 503,
        StorageError::Decoding(_) => 500,
        StorageError::Provisioning(_) => 500,
        StorageError::QueryBuild(_) => 500,
        StorageError::StoreRead(_) => 500,
        StorageError::StoreWrite(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let error = StorageError::NotFound {
            entity_type: "Keyboard",
            id: "42".to_string(),
        };
        assert_eq!(storage_error_to_status_code(&error), 404);
    }

    #[test]
    fn test_encoding_maps_to_400() {
        let error = StorageError::Encoding("id 'abc' is not a number".to_string());
        assert_eq!(storage_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_transport_maps_to_503() {
        let error = StorageError::Transport("dispatch failure".to_string());
        assert_eq!(storage_error_to_status_code(&error), 503);
    }

    #[test]
    fn test_timeout_maps_to_503() {
        let error = StorageError::Timeout {
            table_name: "t".to_string(),
            waited_secs: 1,
        };
        assert_eq!(storage_error_to_status_code(&error), 503);
    }

    #[test]
    fn test_operation_failures_map_to_500() {
        for error in [
            StorageError::Decoding("bad".to_string()),
            StorageError::Provisioning("bad".to_string()),
            StorageError::QueryBuild("bad".to_string()),
            StorageError::StoreRead("bad".to_string()),
            StorageError::StoreWrite("bad".to_string()),
        ] {
            assert_eq!(storage_error_to_status_code(&error), 500, "{error}");
        }
    }
}
