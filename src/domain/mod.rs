// Domain layer - channels, device snapshots, commands and the dashboard view model
pub mod channel;
pub mod command;
pub mod dashboard;
pub mod device_status;
pub mod telemetry;
