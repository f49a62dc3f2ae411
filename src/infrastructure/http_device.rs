// HTTP device implementation
use crate::application::device_api::{DeviceApi, DeviceError};
use crate::domain::command::{DeviceCommand, Method};
use crate::domain::device_status::DeviceStatus;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpDevice {
    client: reqwest::Client,
    base_url: String,
    status_timeout: Duration,
    command_timeout: Duration,
}

impl HttpDevice {
    pub fn new(base_url: &str, status_timeout: Duration, command_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build device HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            status_timeout,
            command_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, DeviceError> {
        let response = request.send().await.map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DeviceError::Status { status, body });
        }

        Ok(response)
    }
}

fn transport_error(e: reqwest::Error) -> DeviceError {
    if e.is_timeout() {
        DeviceError::Timeout
    } else if e.is_decode() {
        DeviceError::Decode(e.to_string())
    } else {
        DeviceError::Transport(e.to_string())
    }
}

#[async_trait]
impl DeviceApi for HttpDevice {
    async fn fetch_status(&self) -> Result<DeviceStatus, DeviceError> {
        let request = self
            .client
            .get(self.url("/allstats"))
            .header("Accept", "application/json")
            .timeout(self.status_timeout);

        let response = self.execute(request).await?;
        let body = response.bytes().await.map_err(transport_error)?;

        serde_json::from_slice(&body).map_err(|e| DeviceError::Decode(e.to_string()))
    }

    async fn send_command(&self, command: &DeviceCommand) -> Result<String, DeviceError> {
        let wire = command.request();
        let url = self.url(wire.path);

        let mut request = match wire.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if let Some((key, value)) = &wire.form {
            request = request.form(&[(*key, value.as_str())]);
        }

        tracing::debug!(command = %command, "Sending device command");
        let response = self.execute(request.timeout(self.command_timeout)).await?;

        response.text().await.map_err(transport_error)
    }

    async fn health_check(&self) -> Result<(), DeviceError> {
        let request = self
            .client
            .get(self.url("/healthcheck"))
            .timeout(self.status_timeout);

        self.execute(request).await.map(|_| ())
    }
}
