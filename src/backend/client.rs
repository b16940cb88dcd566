//! Gateway backend HTTP client
//!
//! Thin, fail-fast transport for the three backend endpoints. One attempt
//! per call, no retries; the caller decides whether to try again. The
//! client performs no request validation; preconditions (complete sftp
//! details, non-blank schema name) belong to the caller.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::schema::{SftpCredentials, WireSchema};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Transport-level failure talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Non-2xx status; message taken from the response body or a generic
    /// per-endpoint fallback.
    #[error("{message}")]
    Api { status: u16, message: String },
    /// Network failure, no response received.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct GetSchemaRequest<'a> {
    #[serde(rename = "schemaName")]
    schema_name: &'a str,
    sftp: &'a SftpCredentials,
}

#[derive(Debug, Serialize)]
struct ChatQueryRequest<'a> {
    query: &'a str,
    schema: &'a WireSchema,
}

/// Pull the `{message}` field out of a response body, or fall back.
fn body_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| fallback.to_string())
}

pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new()); // Fallback if config fails

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Persist a wire schema under its name. Returns the backend's
    /// confirmation message.
    pub async fn save_schema(&self, schema: &WireSchema) -> Result<String, BackendError> {
        let url = format!("{}/save-schema", self.base_url);
        debug!("Saving schema '{}' to {}", schema.name, url);

        let response = self.client.post(&url).json(schema).send().await.map_err(|e| {
            error!("Backend unreachable: {}", e);
            BackendError::Transport(e)
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status,
                message: body_message(&body, "Failed to submit schema."),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = body_message(&body, "Schema submitted successfully!");
        info!("Saved schema '{}'", schema.name);
        Ok(message)
    }

    /// Fetch a schema by name. Returns the parsed wire document as-is; no
    /// shape validation beyond parseability.
    pub async fn get_schema(
        &self,
        name: &str,
        sftp: &SftpCredentials,
    ) -> Result<WireSchema, BackendError> {
        let url = format!("{}/get-schema", self.base_url);
        debug!("Retrieving schema '{}' from {}", name, url);

        let request = GetSchemaRequest {
            schema_name: name,
            sftp,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status,
                message: body_message(&body, "Failed to retrieve schema."),
            });
        }

        let schema: WireSchema = response.json().await?;
        info!("Retrieved schema '{}'", name);
        Ok(schema)
    }

    /// Send a free-text query plus the loaded schema. The reply shape is
    /// decided by the backend; classification happens in the chat layer.
    pub async fn chat_query(
        &self,
        query: &str,
        schema: &WireSchema,
    ) -> Result<serde_json::Value, BackendError> {
        let url = format!("{}/chat-query", self.base_url);
        debug!("Sending chat query to {}", url);

        let request = ChatQueryRequest { query, schema };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status,
                message: body_message(&body, "Failed to get a response from the backend."),
            });
        }

        let reply: serde_json::Value = response.json().await?;
        Ok(reply)
    }
}

impl Default for BackendClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
