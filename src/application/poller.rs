// Poller - single-flight periodic status fetch feeding the charts
use crate::application::device_api::DeviceApi;
use crate::application::session::Session;
use crate::domain::telemetry::now_ms;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval, timeout};

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub request_timeout: Duration,
    pub band_offset: f64,
}

/// Fetches `/allstats` on every tick unless the previous fetch is still
/// outstanding, in which case the tick is dropped rather than queued.
pub struct Poller {
    api: Arc<dyn DeviceApi>,
    session: Arc<Session>,
    settings: PollSettings,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the fetch task ends, however it ends.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Poller {
    pub fn new(api: Arc<dyn DeviceApi>, session: Arc<Session>, settings: PollSettings) -> Self {
        Self {
            api,
            session,
            settings,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start one fetch if none is outstanding. Returns whether a request
    /// was dispatched.
    pub fn tick(&self) -> bool {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!("Status request still in flight, skipping tick");
            return false;
        }

        let guard = InFlight(self.in_flight.clone());
        let api = self.api.clone();
        let session = self.session.clone();
        let settings = self.settings;

        tokio::spawn(async move {
            let _guard = guard;
            match timeout(settings.request_timeout, api.fetch_status()).await {
                Ok(Ok(status)) => {
                    let appended = session.apply_poll(&status, now_ms(), settings.band_offset);
                    tracing::trace!(appended, "Applied status poll");
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Status poll failed");
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_ms = settings.request_timeout.as_millis() as u64,
                        "Status poll timed out"
                    );
                }
            }
        });

        true
    }

    /// Tick forever at the configured interval
    pub async fn run(self) {
        tracing::info!(
            interval_ms = self.settings.interval.as_millis() as u64,
            timeout_ms = self.settings.request_timeout.as_millis() as u64,
            "Starting status poller"
        );

        let mut ticker = interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.tick();
        }
    }
}
