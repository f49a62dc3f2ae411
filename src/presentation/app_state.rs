// Application state for HTTP handlers
use crate::application::command_dispatcher::CommandDispatcher;
use crate::application::display::FrameDisplay;
use crate::application::idle_refresher::IdleHandle;
use crate::application::session::Session;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub dispatcher: CommandDispatcher,
    pub idle: IdleHandle,
    pub display: Arc<FrameDisplay>,
    pub display_refresh: Duration,
}
