// HTTP request handlers
use crate::application::command_dispatcher::{CommandDispatcher, CommandError};
use crate::application::display::{ChannelInfo, DisplayAdapter};
use crate::application::session::Field;
use crate::domain::channel::Channel;
use crate::domain::command::DeviceCommand;
use crate::domain::telemetry::Sample;
use crate::infrastructure::chunked_json::stream_response;
use crate::presentation::app_state::AppState;
use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ValueForm {
    pub value: String,
}

#[derive(Serialize)]
pub struct ChannelSummary {
    #[serde(flatten)]
    pub info: ChannelInfo,
    pub samples: usize,
}

type CommandReply = Result<(StatusCode, String), (StatusCode, String)>;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Registered channels with their styles
pub async fn list_channels(State(state): State<Arc<AppState>>) -> Json<Vec<ChannelSummary>> {
    let channels = state
        .display
        .channels()
        .iter()
        .map(|info| ChannelSummary {
            info: info.clone(),
            samples: state.session.sample_count(info.channel),
        })
        .collect();

    Json(channels)
}

/// Full retained series of one channel
pub async fn channel_series(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Sample>>, StatusCode> {
    let channel = Channel::from_name(&name).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(state.session.snapshot(channel)))
}

/// Live display feed
pub async fn stream_display(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let frames = state
        .display
        .stream_from(state.session.clone(), state.display_refresh);
    stream_response(frames)
}

/// Any keystroke in the interface pushes the idle refresh back
pub async fn keypress(State(state): State<Arc<AppState>>) -> StatusCode {
    state.idle.rearm();
    StatusCode::NO_CONTENT
}

pub async fn change_setpoint(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ValueForm>,
) -> CommandReply {
    field_change(&state, Field::Setpoint, &form.value, CommandDispatcher::set_target_temp)
}

pub async fn change_sleep_time(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ValueForm>,
) -> CommandReply {
    field_change(&state, Field::SleepTime, &form.value, CommandDispatcher::set_sleep_time)
}

pub async fn change_wake_time(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ValueForm>,
) -> CommandReply {
    field_change(&state, Field::WakeTime, &form.value, CommandDispatcher::set_wake_time)
}

pub async fn toggle_power(State(state): State<Arc<AppState>>) -> CommandReply {
    accepted(state.dispatcher.toggle_power())
}

pub async fn set_scheduler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ValueForm>,
) -> CommandReply {
    let enabled = match form.value.as_str() {
        "on" => true,
        "off" => false,
        other => {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("scheduler must be \"on\" or \"off\", got {:?}", other),
            ));
        }
    };
    accepted(state.dispatcher.set_scheduler(enabled))
}

pub async fn toggle_advanced(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let visible = state.session.toggle_advanced();
    Json(serde_json::json!({ "advanced_visible": visible }))
}

pub async fn restart_device(State(state): State<Arc<AppState>>) -> CommandReply {
    accepted(state.dispatcher.restart())
}

pub async fn shutdown_device(State(state): State<Arc<AppState>>) -> CommandReply {
    accepted(state.dispatcher.shutdown())
}

fn field_change(
    state: &AppState,
    field: Field,
    value: &str,
    send: fn(&CommandDispatcher, &str) -> Result<DeviceCommand, CommandError>,
) -> CommandReply {
    let previous = state.session.field(field);
    state.session.edit_field(field, value);
    state.idle.rearm();
    tracing::debug!(?field, ?previous, value, "Field edited");

    match send(&state.dispatcher, value) {
        Ok(command) => accepted(command),
        Err(e) => {
            tracing::warn!(error = %e, "Rejected field change");
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

fn accepted(command: DeviceCommand) -> CommandReply {
    Ok((StatusCode::ACCEPTED, command.to_string()))
}
