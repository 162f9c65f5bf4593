use crate::error::{FingerprintError, Result};
use crate::model::{ErrorBody, SerialNumber};
use reqwest::Client as HttpClient;
use std::time::Duration;

/// Client for a remote serial-number service
#[derive(Clone, Debug)]
pub struct SerialClient {
    client: HttpClient,
    base_url: String,
}

impl SerialClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(
            HttpClient::builder()
                .danger_accept_invalid_certs(true)
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            base_url,
        )
    }

    /// Client whose requests give up after `timeout`
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(
            HttpClient::builder()
                .danger_accept_invalid_certs(true)
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            base_url,
        )
    }

    fn with_client(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/uuid`
    pub async fn fetch(&self) -> Result<SerialNumber> {
        let url = format!("{}/api/uuid", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<SerialNumber>().await?);
        }

        let bytes = response.bytes().await?;
        let message = match serde_json::from_slice::<ErrorBody>(&bytes) {
            Ok(body) => body.error,
            Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
        };
        tracing::debug!("Serial request to {} failed: {} {}", url, status, message);

        Err(FingerprintError::http_failed(status.as_u16(), message))
    }
}
