use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ClientConfig {
    pub device: DeviceConfig,
    pub poll: PollConfig,
    pub idle: IdleConfig,
    pub store: StoreConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DeviceConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub command_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub band_offset: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IdleConfig {
    pub delay_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub retention_secs: u64,
    pub max_samples: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub refresh_ms: u64,
    pub listen: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_ms: 500,
            command_timeout_ms: 2_000,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 333,
            band_offset: 4.0,
        }
    }
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self { delay_secs: 30 }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retention_secs: 60,
            max_samples: 1_024,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_ms: 500,
            listen: "127.0.0.1:8090".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("poll.band_offset must be a non-negative number, got {0}")]
    BandOffset(f64),

    #[error("display.listen is not a socket address: {0}")]
    Listen(String),

    #[error("device.base_url must start with http:// or https://, got {0}")]
    BaseUrl(String),
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("device.request_timeout_ms", self.device.request_timeout_ms),
            ("device.command_timeout_ms", self.device.command_timeout_ms),
            ("poll.interval_ms", self.poll.interval_ms),
            ("idle.delay_secs", self.idle.delay_secs),
            ("store.retention_secs", self.store.retention_secs),
            ("store.max_samples", self.store.max_samples as u64),
            ("display.refresh_ms", self.display.refresh_ms),
        ];
        if let Some((key, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Zero(*key));
        }

        if !(self.poll.band_offset.is_finite() && self.poll.band_offset >= 0.0) {
            return Err(ConfigError::BandOffset(self.poll.band_offset));
        }
        if !(self.device.base_url.starts_with("http://") || self.device.base_url.starts_with("https://")) {
            return Err(ConfigError::BaseUrl(self.device.base_url.clone()));
        }
        self.listen_addr()?;

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.display
            .listen
            .parse()
            .map_err(|_| ConfigError::Listen(self.display.listen.clone()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.device.request_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.device.command_timeout_ms)
    }

    pub fn idle_delay(&self) -> Duration {
        Duration::from_secs(self.idle.delay_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.store.retention_secs)
    }

    pub fn display_refresh(&self) -> Duration {
        Duration::from_millis(self.display.refresh_ms)
    }
}

/// Load `config/client.toml` (optional) with `BREW__SECTION__KEY`
/// environment overrides on top.
pub fn load_client_config() -> anyhow::Result<ClientConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/client").required(false))
        .add_source(
            config::Environment::with_prefix("BREW")
                .separator("__")
                .try_parsing(true),
        );

    build_client_config(builder)
}

fn build_client_config(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<ClientConfig> {
    let settings = builder.build()?;
    let config: ClientConfig = settings.try_deserialize()?;
    config.validate()?;

    Ok(config)
}
