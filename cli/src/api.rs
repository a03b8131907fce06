//! Native `WidgetApi` over reqwest. Response interpretation is shared with
//! the browser client through `widget::net`.
//!
//! Only the connection attempt is bounded. A slow model reply is waited
//! out, as it is in the browser.

use std::time::Duration;

use widget::error::WidgetError;
use widget::net::{CHAT_PATH, CONFIG_PATH, LEADS_PATH, WidgetApi, interpret_chat, interpret_config, interpret_lead};
use wire::{BotConfig, ChatRequest, CreateLeadRequest};

use crate::CliError;

pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self, CliError> {
        let client = reqwest::Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn read(response: reqwest::Response) -> Result<(u16, String), WidgetError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;
        Ok((status, body))
    }
}

/// A request that reached the server and then stalled is a server failure,
/// not a connectivity one.
fn transport_error(e: reqwest::Error) -> WidgetError {
    if e.is_timeout() && !e.is_connect() {
        WidgetError::Server { status: 504, result: None, message: None }
    } else {
        WidgetError::Network(e.to_string())
    }
}

#[async_trait::async_trait(?Send)]
impl WidgetApi for HttpApi {
    async fn fetch_config(&self) -> Result<BotConfig, WidgetError> {
        let response = self
            .client
            .get(self.url(CONFIG_PATH))
            .send()
            .await
            .map_err(transport_error)?;
        let (status, body) = Self::read(response).await?;
        interpret_config(status, &body)
    }

    async fn create_lead(&self, req: &CreateLeadRequest) -> Result<i64, WidgetError> {
        let response = self
            .client
            .post(self.url(LEADS_PATH))
            .json(req)
            .send()
            .await
            .map_err(transport_error)?;
        let (status, body) = Self::read(response).await?;
        interpret_lead(status, &body)
    }

    async fn send_chat(&self, req: &ChatRequest) -> Result<String, WidgetError> {
        let response = self
            .client
            .post(self.url(CHAT_PATH))
            .json(req)
            .send()
            .await
            .map_err(transport_error)?;
        let (status, body) = Self::read(response).await?;
        interpret_chat(status, &body)
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
