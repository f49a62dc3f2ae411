// Device API trait - the status endpoint and the command endpoints
use crate::domain::command::DeviceCommand;
use crate::domain::device_status::DeviceStatus;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeviceError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("device answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed device response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Fetch the current status snapshot (`/allstats`)
    async fn fetch_status(&self) -> Result<DeviceStatus, DeviceError>;

    /// Send one command; returns the device's plain-text acknowledgement
    async fn send_command(&self, command: &DeviceCommand) -> Result<String, DeviceError>;

    /// Liveness probe (`/healthcheck`)
    async fn health_check(&self) -> Result<(), DeviceError>;
}
