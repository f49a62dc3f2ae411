// Command dispatcher - fire-and-forget operator commands
use crate::application::device_api::DeviceApi;
use crate::application::session::Session;
use crate::domain::command::{DeviceCommand, TIME_OF_DAY_FORMAT};
use chrono::NaiveTime;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("invalid setpoint {0:?}")]
    InvalidSetpoint(String),
}

#[derive(Clone)]
pub struct CommandDispatcher {
    api: Arc<dyn DeviceApi>,
    session: Arc<Session>,
}

impl CommandDispatcher {
    pub fn new(api: Arc<dyn DeviceApi>, session: Arc<Session>) -> Self {
        Self { api, session }
    }

    /// Turn the device off if the last poll saw it awake, otherwise on.
    pub fn toggle_power(&self) -> DeviceCommand {
        let command = match self.session.last_known_awake() {
            Some(true) => DeviceCommand::PowerOff,
            _ => DeviceCommand::PowerOn,
        };
        self.dispatch(command.clone());
        command
    }

    pub fn set_target_temp(&self, raw: &str) -> Result<DeviceCommand, CommandError> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| CommandError::InvalidSetpoint(raw.to_string()))?;
        if !value.is_finite() {
            return Err(CommandError::InvalidSetpoint(raw.to_string()));
        }
        Ok(self.dispatch(DeviceCommand::SetTargetTemp(value)))
    }

    pub fn set_sleep_time(&self, raw: &str) -> Result<DeviceCommand, CommandError> {
        let time = parse_time_of_day(raw)?;
        Ok(self.dispatch(DeviceCommand::SetSleepTime(time)))
    }

    pub fn set_wake_time(&self, raw: &str) -> Result<DeviceCommand, CommandError> {
        let time = parse_time_of_day(raw)?;
        Ok(self.dispatch(DeviceCommand::SetWakeTime(time)))
    }

    /// Send the scheduler state and flip control visibility right away.
    /// There is no rollback; the next successful poll reconciles visibility.
    pub fn set_scheduler(&self, enabled: bool) -> DeviceCommand {
        self.session.show_scheduler(enabled);
        self.dispatch(DeviceCommand::SetScheduler(enabled))
    }

    pub fn restart(&self) -> DeviceCommand {
        self.dispatch(DeviceCommand::Restart)
    }

    pub fn shutdown(&self) -> DeviceCommand {
        self.dispatch(DeviceCommand::Shutdown)
    }

    fn dispatch(&self, command: DeviceCommand) -> DeviceCommand {
        let api = self.api.clone();
        let sent = command.clone();

        tokio::spawn(async move {
            match api.send_command(&sent).await {
                Ok(ack) => tracing::debug!(command = %sent, response = %ack, "Command acknowledged"),
                Err(e) => tracing::warn!(command = %sent, error = %e, "Command failed"),
            }
        });

        command
    }
}

fn parse_time_of_day(raw: &str) -> Result<NaiveTime, CommandError> {
    NaiveTime::parse_from_str(raw.trim(), TIME_OF_DAY_FORMAT)
        .map_err(|_| CommandError::InvalidTime(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::device_api::testing::{FakeDevice, settle};
    use crate::application::sample_store::SampleStore;
    use crate::domain::device_status::DeviceStatus;
    use std::time::Duration;

    fn setup() -> (Arc<FakeDevice>, Arc<Session>, CommandDispatcher) {
        let device = Arc::new(FakeDevice::with_json("{}"));
        let session = Arc::new(Session::new(SampleStore::new(Duration::from_secs(60), 64)));
        let dispatcher = CommandDispatcher::new(device.clone(), session.clone());
        (device, session, dispatcher)
    }

    #[tokio::test]
    async fn test_toggle_power_reads_last_known_status() {
        let (device, session, dispatcher) = setup();
        assert_eq!(dispatcher.toggle_power(), DeviceCommand::PowerOn);

        let awake: DeviceStatus = serde_json::from_str(r#"{"is_awake": true}"#).unwrap();
        session.apply_poll(&awake, 1_000, 4.0);
        assert_eq!(dispatcher.toggle_power(), DeviceCommand::PowerOff);

        settle().await;
        assert_eq!(device.commands(), vec![DeviceCommand::PowerOn, DeviceCommand::PowerOff]);
    }

    #[tokio::test]
    async fn test_field_commands_validate_input() {
        let (device, _session, dispatcher) = setup();

        assert_eq!(
            dispatcher.set_target_temp(" 93.5 ").unwrap(),
            DeviceCommand::SetTargetTemp(93.5)
        );
        assert!(matches!(
            dispatcher.set_target_temp("hot"),
            Err(CommandError::InvalidSetpoint(_))
        ));
        assert!(matches!(
            dispatcher.set_target_temp("NaN"),
            Err(CommandError::InvalidSetpoint(_))
        ));
        assert!(matches!(
            dispatcher.set_sleep_time("25:00"),
            Err(CommandError::InvalidTime(_))
        ));
        let wake = dispatcher.set_wake_time("06:50").unwrap();

        settle().await;
        assert_eq!(device.commands(), vec![DeviceCommand::SetTargetTemp(93.5), wake]);
    }

    #[tokio::test]
    async fn test_scheduler_toggle_is_optimistic() {
        let (device, session, dispatcher) = setup();
        session.show_scheduler(true);
        let original = session.view().indicators.scheduler;

        dispatcher.set_scheduler(false);
        let view = session.view().indicators.scheduler;
        assert!(!view.schedule_fields_visible);
        assert!(view.enable_button_visible);
        assert!(!view.disable_button_visible);

        dispatcher.set_scheduler(true);
        assert_eq!(session.view().indicators.scheduler, original);

        settle().await;
        assert_eq!(
            device.commands(),
            vec![DeviceCommand::SetScheduler(false), DeviceCommand::SetScheduler(true)]
        );
    }
}
