mod db;
mod llm;
mod rate_limit;
mod routes;
mod services;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::llm::LlmChat;
use crate::services::geo::GeoLocator;
use crate::services::settings::AssetDefaults;
use crate::state::{AdminToken, AppState};
use crate::store::{MemoryStore, PgStore};

const DEFAULT_PORT: u16 = 3000;

/// Parse an env var, falling back to `default` when unset or invalid.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port: u16 = env_parse("PORT", DEFAULT_PORT);

    // Missing LLM config is non-fatal: the relay answers 503 until fixed.
    let llm: Option<Arc<dyn LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured, chat relay disabled");
            None
        }
    };

    let state = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => {
            let pool = db::init_pool(&url).await?;
            tracing::info!("using postgres store");
            AppState::new(Arc::new(PgStore::new(pool)), llm)
        }
        _ => {
            tracing::warn!("DATABASE_URL not set, leads and settings are kept in memory only");
            AppState::new(Arc::new(MemoryStore::new()), llm)
        }
    };

    let admin_token = std::env::var("ADMIN_TOKEN").ok().and_then(|raw| AdminToken::new(&raw));
    if admin_token.is_none() {
        tracing::info!("ADMIN_TOKEN not set, admin API disabled");
    }

    let state = state
        .with_geo(GeoLocator::from_env())
        .with_assets(AssetDefaults::from_env())
        .with_admin_token(admin_token)
        .with_fallback_api_key(std::env::var("GEMINI_API_KEY").ok());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "chatbot listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
