//! Settings API endpoints

use api_types::setting::{SettingUpdate, SettingView, SettingsResponse};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, require_admin, server::ServerState};

/// List all settings (admin only).
pub async fn list(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SettingsResponse>, ServerError> {
    require_admin(&caller)?;

    let settings = state.engine.list_settings().await?;
    Ok(Json(SettingsResponse {
        settings: settings
            .into_iter()
            .map(|(key, value)| SettingView { key, value })
            .collect(),
    }))
}

/// Upsert one setting (admin only).
pub async fn update(
    Extension(caller): Extension<engine::members::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SettingUpdate>,
) -> Result<StatusCode, ServerError> {
    require_admin(&caller)?;

    if payload.key.trim().is_empty() {
        return Err(ServerError::Generic("key must not be empty".to_string()));
    }
    state.engine.set_setting(&payload.key, &payload.value).await?;
    Ok(StatusCode::OK)
}
