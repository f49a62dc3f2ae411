// Telemetry data domain models
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub time_ms: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// Wall-clock milliseconds since the Unix epoch, the timestamp unit of every channel
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
