// Session - the client's single owner of samples and dashboard state
use crate::application::sample_store::SampleStore;
use crate::domain::channel::Channel;
use crate::domain::dashboard::{EditableFields, Indicators, Readouts, SchedulerView};
use crate::domain::device_status::DeviceStatus;
use crate::domain::telemetry::Sample;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

/// An editable input field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Setpoint,
    SleepTime,
    WakeTime,
}

/// Everything the status widgets show, copied out for rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub indicators: Indicators,
    pub fields: EditableFields,
    pub readouts: Readouts,
    pub advanced_visible: bool,
}

#[derive(Debug, Default)]
struct DashboardState {
    view: DashboardView,
    last_status: Option<DeviceStatus>,
}

/// Created once at start-up and shared by the poller, the idle refresher,
/// the command dispatcher and the display.
///
/// The poller writes samples, indicators, readouts and the last-known
/// status; the idle refresher writes editable fields only.
#[derive(Debug)]
pub struct Session {
    store: Mutex<SampleStore>,
    state: Mutex<DashboardState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Session {
    pub fn new(store: SampleStore) -> Self {
        Self {
            store: Mutex::new(store),
            state: Mutex::new(DashboardState::default()),
        }
    }

    /// Distribute one successful poll: chart samples, indicators, readouts
    /// and the last-known status, all under one critical section.
    /// Returns how many samples were appended.
    pub fn apply_poll(&self, status: &DeviceStatus, time_ms: i64, band_offset: f64) -> usize {
        let mut store = lock(&self.store);
        let mut state = lock(&self.state);

        let appended = status
            .channel_values(band_offset)
            .into_iter()
            .filter(|(channel, value)| store.append(*channel, time_ms, *value))
            .count();

        state.view.indicators.apply(status);
        state.view.readouts.apply(status);
        state
            .last_status
            .get_or_insert_with(DeviceStatus::default)
            .merge(status);

        appended
    }

    /// Overwrite the editable fields from a refresh snapshot
    pub fn apply_refresh(&self, status: &DeviceStatus) {
        lock(&self.state).view.fields.apply(status);
    }

    /// Record what the operator typed into a field
    pub fn edit_field(&self, field: Field, value: &str) {
        let mut state = lock(&self.state);
        let slot = match field {
            Field::Setpoint => &mut state.view.fields.setpoint,
            Field::SleepTime => &mut state.view.fields.sleep_time,
            Field::WakeTime => &mut state.view.fields.wake_time,
        };
        *slot = Some(value.to_string());
    }

    pub fn field(&self, field: Field) -> Option<String> {
        let state = lock(&self.state);
        match field {
            Field::Setpoint => state.view.fields.setpoint.clone(),
            Field::SleepTime => state.view.fields.sleep_time.clone(),
            Field::WakeTime => state.view.fields.wake_time.clone(),
        }
    }

    /// Flip scheduler control visibility ahead of any device acknowledgement
    pub fn show_scheduler(&self, enabled: bool) {
        lock(&self.state).view.indicators.scheduler = SchedulerView::for_enabled(enabled);
    }

    pub fn toggle_advanced(&self) -> bool {
        let mut state = lock(&self.state);
        state.view.advanced_visible = !state.view.advanced_visible;
        state.view.advanced_visible
    }

    /// Power state according to the last successful poll, `None` before the first
    pub fn last_known_awake(&self) -> Option<bool> {
        lock(&self.state).last_status.as_ref().and_then(|s| s.is_awake)
    }

    pub fn view(&self) -> DashboardView {
        lock(&self.state).view.clone()
    }

    pub fn samples_after(&self, channel: Channel, after_ms: i64) -> Vec<Sample> {
        lock(&self.store).samples_after(channel, after_ms)
    }

    pub fn snapshot(&self, channel: Channel) -> Vec<Sample> {
        lock(&self.store).snapshot(channel)
    }

    pub fn sample_count(&self, channel: Channel) -> usize {
        lock(&self.store).len(channel)
    }
}
