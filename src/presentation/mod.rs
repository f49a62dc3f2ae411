// Presentation layer - the local operator surface
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/channels", get(list_channels))
        .route("/channels/:name", get(channel_series))
        .route("/stream", get(stream_display))
        .route("/input/keypress", post(keypress))
        .route("/input/setpoint", post(change_setpoint))
        .route("/input/sleep", post(change_sleep_time))
        .route("/input/wake", post(change_wake_time))
        .route("/input/power", post(toggle_power))
        .route("/input/scheduler", post(set_scheduler))
        .route("/input/advanced", post(toggle_advanced))
        .route("/device/restart", post(restart_device))
        .route("/device/shutdown", post(shutdown_device))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
