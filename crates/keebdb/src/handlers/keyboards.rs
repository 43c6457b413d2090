use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use keebdb_core::codec::stored_form;
use keebdb_core::storage::StorageError;
use keebdb_core::{Keyboard, Record};

use crate::{handlers::AppError, state::AppState};

/// List all keyboards (GET /api/keyboards).
pub async fn list_keyboards(
    State(state): State<AppState>,
) -> Result<Json<Vec<Keyboard>>, AppError> {
    let keyboards = state.gateway.scan::<Keyboard>().await?;
    Ok(Json(keyboards))
}

/// List the keyboards sharing an id (GET /api/keyboards/{id}).
pub async fn list_keyboards_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Keyboard>>, AppError> {
    let keyboards = state.gateway.find_by_id::<Keyboard>(&id).await?;

    if keyboards.is_empty() {
        return Err(StorageError::NotFound {
            entity_type: Keyboard::ENTITY_TYPE,
            id,
        }
        .into());
    }

    Ok(Json(keyboards))
}

/// Get a single keyboard by its full key (GET /api/keyboards/{id}/{name}).
pub async fn get_keyboard(
    State(state): State<AppState>,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<Keyboard>, AppError> {
    let probe = Keyboard::new(id, name);

    let keyboard = state
        .gateway
        .get(&probe)
        .await?
        .ok_or_else(|| StorageError::NotFound {
            entity_type: Keyboard::ENTITY_TYPE,
            id: probe.key_display(),
        })?;

    Ok(Json(keyboard))
}

/// Store a keyboard, replacing any keyboard with the same key (POST /api/keyboards).
///
/// Responds with the keyboard as reads will return it, e.g. id `01` comes back as `1`.
pub async fn create_keyboard(
    State(state): State<AppState>,
    Json(keyboard): Json<Keyboard>,
) -> Result<impl IntoResponse, AppError> {
    let keyboard = stored_form(&keyboard)?;
    state.gateway.put(&keyboard).await?;

    tracing::info!(id = %keyboard.id, name = %keyboard.name, "Stored keyboard");

    Ok((StatusCode::CREATED, Json(keyboard)))
}
