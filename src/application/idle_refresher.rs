// Idle refresher - resyncs editable fields once the operator stops typing
use crate::application::device_api::DeviceApi;
use crate::application::session::Session;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{sleep, timeout};

/// Cheap clonable handle used by input handlers to push the refresh back.
#[derive(Clone)]
pub struct IdleHandle {
    rearm: Arc<Notify>,
    generation: Arc<AtomicU64>,
}

impl IdleHandle {
    /// Cancel the pending refresh and schedule it again at the full delay.
    /// A refresh already waiting on the device keeps running but its
    /// result is discarded.
    pub fn rearm(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.rearm.notify_one();
    }
}

pub struct IdleRefresher {
    api: Arc<dyn DeviceApi>,
    session: Arc<Session>,
    delay: Duration,
    request_timeout: Duration,
    rearm: Arc<Notify>,
    generation: Arc<AtomicU64>,
}

impl IdleRefresher {
    pub fn new(
        api: Arc<dyn DeviceApi>,
        session: Arc<Session>,
        delay: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            api,
            session,
            delay,
            request_timeout,
            rearm: Arc::new(Notify::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn handle(&self) -> IdleHandle {
        IdleHandle {
            rearm: self.rearm.clone(),
            generation: self.generation.clone(),
        }
    }

    /// Fetch once and overwrite the editable fields. A failed fetch, or one
    /// overtaken by a rearm while it was outstanding, leaves the fields as
    /// they were.
    pub async fn refresh_once(&self) -> bool {
        let started = self.generation.load(Ordering::Acquire);

        match timeout(self.request_timeout, self.api.fetch_status()).await {
            Ok(Ok(_)) if self.generation.load(Ordering::Acquire) != started => {
                tracing::debug!("Discarding field refresh overtaken by an edit");
                false
            }
            Ok(Ok(status)) => {
                self.session.apply_refresh(&status);
                tracing::debug!("Refreshed editable fields");
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Field refresh failed");
                false
            }
            Err(_) => {
                tracing::warn!("Field refresh timed out");
                false
            }
        }
    }

    /// Wait out the delay, refresh, repeat. Every rearm restarts the wait.
    pub async fn run(self) {
        tracing::info!(delay_secs = self.delay.as_secs(), "Starting idle field refresher");

        loop {
            tokio::select! {
                _ = sleep(self.delay) => {
                    self.refresh_once().await;
                }
                _ = self.rearm.notified() => {
                    tracing::trace!("Idle refresh rearmed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::device_api::testing::{FakeDevice, Reply, settle};
    use crate::application::poller::{PollSettings, Poller};
    use crate::application::sample_store::SampleStore;
    use crate::application::session::Field;
    use crate::domain::channel::Channel;

    const STATUS: &str = r#"{"temp": 91.0, "brewtemp": 93.0, "sleep_time": "22:00",
        "wake_time": "06:50", "is_awake": true}"#;

    fn setup(device: FakeDevice) -> (Arc<FakeDevice>, Arc<Session>, IdleRefresher) {
        let device = Arc::new(device);
        let session = Arc::new(Session::new(SampleStore::new(Duration::from_secs(60), 64)));
        let refresher = IdleRefresher::new(
            device.clone(),
            session.clone(),
            Duration::from_secs(30),
            Duration::from_millis(500),
        );
        (device, session, refresher)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_full_delay_and_writes_fields_only() {
        let (device, session, refresher) = setup(FakeDevice::with_json(STATUS));
        let task = tokio::spawn(refresher.run());

        tokio::time::sleep(Duration::from_secs(29)).await;
        settle().await;
        assert_eq!(device.status_calls(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(device.status_calls(), 1);
        assert_eq!(session.field(Field::Setpoint).as_deref(), Some("93"));
        assert_eq!(session.field(Field::WakeTime).as_deref(), Some("06:50"));
        assert_eq!(session.sample_count(Channel::CurrentTemp), 0);
        assert_eq!(session.last_known_awake(), None);

        // Rescheduled on the same delay
        tokio::time::sleep(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(device.status_calls(), 2);
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_frequent_keystrokes_prevent_refresh() {
        let (device, _session, refresher) = setup(FakeDevice::with_json(STATUS));
        let handle = refresher.handle();
        let task = tokio::spawn(refresher.run());
        settle().await;

        for _ in 0..20 {
            tokio::time::sleep(Duration::from_secs(20)).await;
            handle.rearm();
            settle().await;
        }
        assert_eq!(device.status_calls(), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        settle().await;
        assert_eq!(device.status_calls(), 1);
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_shortly_before_refresh_is_not_clobbered() {
        let (device, session, refresher) = setup(FakeDevice::with_json(STATUS));
        let handle = refresher.handle();
        let task = tokio::spawn(refresher.run());
        settle().await;

        tokio::time::sleep(Duration::from_secs(26)).await;
        session.edit_field(Field::Setpoint, "95");
        handle.rearm();
        settle().await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(device.status_calls(), 0);
        assert_eq!(session.field(Field::Setpoint).as_deref(), Some("95"));
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_fields_and_reschedules() {
        let (device, session, refresher) = setup(FakeDevice::new(Reply::Fail));
        session.edit_field(Field::SleepTime, "21:30");
        let task = tokio::spawn(refresher.run());

        tokio::time::sleep(Duration::from_secs(61)).await;
        settle().await;
        assert_eq!(device.status_calls(), 2);
        assert_eq!(session.field(Field::SleepTime).as_deref(), Some("21:30"));
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_in_flight_refresh_wins() {
        let status = serde_json::from_str(STATUS).unwrap();
        let (device, session, refresher) =
            setup(FakeDevice::new(Reply::Delay(Duration::from_millis(300), status)));
        let handle = refresher.handle();
        let task = tokio::spawn(refresher.run());
        settle().await;

        tokio::time::sleep(Duration::from_millis(30_100)).await;
        settle().await;
        assert_eq!(device.status_calls(), 1);
        session.edit_field(Field::Setpoint, "95");
        handle.rearm();

        tokio::time::sleep(Duration::from_millis(400)).await;
        settle().await;
        assert_eq!(session.field(Field::Setpoint).as_deref(), Some("95"));

        // The rearm restarted the full wait, and the next refresh applies
        tokio::time::sleep(Duration::from_secs(31)).await;
        settle().await;
        assert_eq!(device.status_calls(), 2);
        assert_eq!(session.field(Field::Setpoint).as_deref(), Some("93"));
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_overlaps_in_flight_poll_with_disjoint_writes() {
        let status = serde_json::from_str(STATUS).unwrap();
        let (device, session, refresher) =
            setup(FakeDevice::new(Reply::Delay(Duration::from_millis(300), status)));
        let poller = Poller::new(
            device.clone(),
            session.clone(),
            PollSettings {
                interval: Duration::from_millis(333),
                request_timeout: Duration::from_millis(500),
                band_offset: 4.0,
            },
        );
        session.edit_field(Field::SleepTime, "21:30");

        assert!(poller.tick());
        settle().await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(device.status_calls(), 1);

        let refresh = tokio::spawn(async move { refresher.refresh_once().await });
        settle().await;
        assert_eq!(device.status_calls(), 2);
        assert_eq!(device.max_concurrent(), 2);

        // Poll lands at 300 ms while the refresh is still outstanding
        tokio::time::sleep(Duration::from_millis(250)).await;
        settle().await;
        assert_eq!(session.sample_count(Channel::CurrentTemp), 1);
        assert_eq!(session.field(Field::SleepTime).as_deref(), Some("21:30"));
        assert_eq!(session.last_known_awake(), Some(true));

        assert!(refresh.await.unwrap());
        assert_eq!(session.sample_count(Channel::CurrentTemp), 1);
        assert_eq!(session.sample_count(Channel::TargetTemp), 1);
        assert_eq!(session.field(Field::SleepTime).as_deref(), Some("22:00"));
        assert_eq!(session.field(Field::Setpoint).as_deref(), Some("93"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_refresh_times_out() {
        let (device, _session, refresher) = setup(FakeDevice::new(Reply::Hang));
        assert!(!refresher.refresh_once().await);
        assert_eq!(device.status_calls(), 1);
    }
}
