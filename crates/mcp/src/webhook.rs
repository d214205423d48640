//! HTTP delivery to the n8n workflow webhook.

use std::time::Duration;

use ordena_core::config::WebhookConfig;
use ordena_core::orders::QueryPayload;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Failures while talking to the webhook. The request variant covers
/// connection, timeout, non-2xx status, and body decoding failures; its
/// message is the Spanish text relayed to the agent.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Error al conectar con n8n: {0}")]
    Request(#[from] reqwest::Error),
}

/// Thin client that POSTs query payloads to the configured n8n endpoint
/// and hands back the workflow's JSON response.
#[derive(Clone, Debug)]
pub struct WebhookClient {
    http: reqwest::Client,
    endpoint: String,
}

impl WebhookClient {
    pub fn new(config: &WebhookConfig) -> Result<Self, WebhookError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(WebhookError::Client)?;
        Ok(Self {
            http,
            endpoint: config.endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a query payload and return the workflow's JSON response.
    pub async fn post(&self, payload: &QueryPayload) -> Result<Value, WebhookError> {
        debug!(endpoint = %self.endpoint, tool = payload.tool, resource = payload.resource, "posting query to n8n");
        let response = self
            .http
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use ordena_core::config::WebhookConfig;

    use super::WebhookClient;

    #[test]
    fn client_uses_the_joined_endpoint() {
        let client = WebhookClient::new(&WebhookConfig {
            base_url: "https://n8n.example.com/".to_string(),
            webhook_path: "/webhook/odoo".to_string(),
            timeout_secs: 30,
        })
        .unwrap();
        assert_eq!(client.endpoint(), "https://n8n.example.com/webhook/odoo");
    }
}
