// Main entry point - Dependency injection and client startup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::future::IntoFuture;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::command_dispatcher::CommandDispatcher;
use crate::application::device_api::DeviceApi;
use crate::application::display::FrameDisplay;
use crate::application::idle_refresher::IdleRefresher;
use crate::application::poller::{PollSettings, Poller};
use crate::application::sample_store::SampleStore;
use crate::application::session::Session;
use crate::infrastructure::config::load_client_config;
use crate::infrastructure::http_device::HttpDevice;
use crate::presentation::app_state::AppState;
use crate::presentation::router;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_client_config()?;
    let listen = config.listen_addr()?;

    // Device client (infrastructure layer)
    let device: Arc<dyn DeviceApi> = Arc::new(HttpDevice::new(
        &config.device.base_url,
        config.request_timeout(),
        config.command_timeout(),
    )?);

    match device.health_check().await {
        Ok(()) => tracing::info!(device = %config.device.base_url, "Device reachable"),
        Err(e) => tracing::warn!(device = %config.device.base_url, error = %e, "Device health check failed"),
    }

    // Session and tasks (application layer)
    let session = Arc::new(Session::new(SampleStore::new(
        config.retention(),
        config.store.max_samples,
    )));

    let poller = Poller::new(
        device.clone(),
        session.clone(),
        PollSettings {
            interval: config.poll_interval(),
            request_timeout: config.request_timeout(),
            band_offset: config.poll.band_offset,
        },
    );
    let refresher = IdleRefresher::new(
        device.clone(),
        session.clone(),
        config.idle_delay(),
        config.request_timeout(),
    );
    let idle = refresher.handle();
    let dispatcher = CommandDispatcher::new(device.clone(), session.clone());

    // Populate the editable fields once, then arm the idle timer
    refresher.refresh_once().await;
    let poll_task = tokio::spawn(poller.run());
    let idle_task = tokio::spawn(refresher.run());

    let state = Arc::new(AppState {
        session,
        dispatcher,
        idle,
        display: Arc::new(FrameDisplay::with_default_channels()),
        display_refresh: config.display_refresh(),
    });

    // Operator surface (presentation layer)
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!(%listen, device = %config.device.base_url, "Starting brew-monitor");

    // Stop on Ctrl-C without draining open display streams
    tokio::select! {
        result = axum::serve(listener, router(state)).into_future() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
    }

    poll_task.abort();
    idle_task.abort();

    Ok(())
}
