// Application layer - polling, idle refresh, commands and the display feed
pub mod command_dispatcher;
pub mod device_api;
pub mod display;
pub mod idle_refresher;
pub mod poller;
pub mod sample_store;
pub mod session;
