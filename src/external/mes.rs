use crate::common::errors::BusinessError;
use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

const SERVICE_NAME: &str = "mes";

/// Destination for finished process plan documents
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Deliver one document, returning the receiver's response text
    async fn submit(&self, document: &Value) -> Result<String, BusinessError>;
}

/// HTTP client for the MES operations route endpoint
#[derive(Debug, Clone)]
pub struct MesClient {
    client: Client,
    url: String,
    username: String,
    password: String,
    timeout: Duration,
}

impl MesClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.mes_timeout_seconds);
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: config.mes_api_url.clone(),
            username: config.mes_username.clone(),
            password: config.mes_password.clone(),
            timeout,
        })
    }

    fn error(message: String) -> BusinessError {
        BusinessError::ExternalServiceError {
            service: SERVICE_NAME.to_string(),
            message,
        }
    }
}

#[async_trait]
impl DocumentSink for MesClient {
    async fn submit(&self, document: &Value) -> Result<String, BusinessError> {
        tracing::info!("Submitting document to MES at {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .json(document)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Self::error(format!(
                        "request timed out after {} seconds",
                        self.timeout.as_secs()
                    ))
                } else {
                    Self::error(format!("connection failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::OK {
            tracing::info!("MES accepted document");
            Ok(body)
        } else {
            tracing::warn!("MES rejected document with status {status}");
            Err(Self::error(format!("MES returned status {status}: {body}")))
        }
    }
}
