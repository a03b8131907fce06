//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Public widget endpoints (config, stylesheet, chat relay, lead capture)
//! and the token-guarded admin API share one Axum router. CORS is open
//! because the widget is embedded on third-party pages.

pub mod admin;
pub mod chat;
pub mod leads;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat-bot-config", get(chat::config))
        .route("/api/chat-bot-style.css", get(chat::stylesheet))
        .route("/api/chat-bot", post(chat::chat))
        .route("/api/leads", post(leads::create_lead))
        .route("/api/admin/settings", get(admin::get_settings).put(admin::put_settings))
        .route("/api/admin/leads", get(admin::list_leads))
        .route("/api/admin/leads/{id}", get(admin::get_lead).delete(admin::delete_lead))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
