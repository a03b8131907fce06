//! Widget-facing routes: configuration, stylesheet, chat relay.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Json};
use wire::{BotConfig, ChatReply, ChatRequest};

use crate::services::relay::{self, RelayError};
use crate::services::settings::{self, SettingsError};
use crate::state::AppState;

/// `GET /api/chat-bot-config`: public widget configuration.
pub async fn config(State(state): State<AppState>) -> Result<Json<BotConfig>, StatusCode> {
    let config = settings::load_bot_config(state.settings.as_ref(), &state.assets)
        .await
        .map_err(settings_error_to_status)?;
    Ok(Json(config))
}

/// `GET /api/chat-bot-style.css`: position and theme CSS variables.
pub async fn stylesheet(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let config = settings::load_bot_config(state.settings.as_ref(), &state.assets)
        .await
        .map_err(settings_error_to_status)?;
    Ok((
        [(CONTENT_TYPE, "text/css; charset=utf-8"), (CACHE_CONTROL, "no-cache")],
        settings::widget_css(&config),
    ))
}

/// `POST /api/chat-bot`: relay one visitor message.
///
/// Always answers with a [`ChatReply`], including for unparseable bodies.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatReply>) {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "chat body rejected");
            let err = RelayError::InvalidRequest("body");
            return (StatusCode::BAD_REQUEST, Json(err.reply()));
        }
    };

    match relay::handle_chat(&state, &req).await {
        Ok(result) => (StatusCode::OK, Json(ChatReply::ok(result))),
        Err(err) => (relay_error_to_status(&err), Json(err.reply())),
    }
}

pub(crate) fn relay_error_to_status(err: &RelayError) -> StatusCode {
    StatusCode::from_u16(err.status())
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

pub(crate) fn settings_error_to_status(err: SettingsError) -> StatusCode {
    match err {
        SettingsError::UnknownKey(_) | SettingsError::InvalidValue { .. } => StatusCode::BAD_REQUEST,
        SettingsError::Store(e) => {
            tracing::error!(error = %e, "settings store failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
