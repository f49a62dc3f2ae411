// Sample store - bounded per-channel time series feeding the charts
use crate::domain::channel::Channel;
use crate::domain::telemetry::Sample;
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

/// Append-only, size-bounded series for every [`Channel`].
///
/// Each channel keeps only the samples inside a trailing retention window
/// measured back from its newest timestamp, and never more than
/// `max_samples` of them. A sample older than the channel's last one is
/// ignored and `append` reports `false`; equal timestamps are accepted.
#[derive(Debug)]
pub struct SampleStore {
    channels: BTreeMap<Channel, VecDeque<Sample>>,
    retention_ms: i64,
    max_samples: usize,
}

impl SampleStore {
    pub fn new(retention: Duration, max_samples: usize) -> Self {
        let channels = Channel::ALL
            .into_iter()
            .map(|c| (c, VecDeque::with_capacity(max_samples.min(1024))))
            .collect();

        Self {
            channels,
            retention_ms: i64::try_from(retention.as_millis()).unwrap_or(i64::MAX),
            max_samples: max_samples.max(1),
        }
    }

    pub fn append(&mut self, channel: Channel, time_ms: i64, value: f64) -> bool {
        let series = self.channels.entry(channel).or_default();

        if let Some(last) = series.back() {
            if time_ms < last.time_ms {
                tracing::debug!(
                    channel = %channel,
                    time_ms,
                    last_ms = last.time_ms,
                    "Ignoring out-of-order sample"
                );
                return false;
            }
        }

        series.push_back(Sample::new(time_ms, value));

        let horizon = time_ms.saturating_sub(self.retention_ms);
        while series.front().is_some_and(|s| s.time_ms < horizon) {
            series.pop_front();
        }
        while series.len() > self.max_samples {
            series.pop_front();
        }

        true
    }

    /// All retained samples of a channel, oldest first
    pub fn snapshot(&self, channel: Channel) -> Vec<Sample> {
        self.samples_after(channel, i64::MIN)
    }

    /// Retained samples strictly newer than `after_ms`, oldest first
    pub fn samples_after(&self, channel: Channel, after_ms: i64) -> Vec<Sample> {
        match self.channels.get(&channel) {
            Some(series) => {
                let start = series.partition_point(|s| s.time_ms <= after_ms);
                series.range(start..).copied().collect()
            }
            None => Vec::new(),
        }
    }

    pub fn len(&self, channel: Channel) -> usize {
        self.channels.get(&channel).map(VecDeque::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_snapshot() {
        let mut store = SampleStore::new(Duration::from_secs(60), 100);
        assert!(store.append(Channel::CurrentTemp, 1_000, 20.5));
        assert!(store.append(Channel::CurrentTemp, 1_333, 20.7));

        let samples = store.snapshot(Channel::CurrentTemp);
        assert_eq!(samples, vec![Sample::new(1_000, 20.5), Sample::new(1_333, 20.7)]);
        assert_eq!(store.len(Channel::PTerm), 0);
    }

    #[test]
    fn test_out_of_order_is_ignored() {
        let mut store = SampleStore::new(Duration::from_secs(60), 100);
        store.append(Channel::PTerm, 5_000, 1.0);

        assert!(!store.append(Channel::PTerm, 4_999, 2.0));
        assert!(store.append(Channel::PTerm, 5_000, 3.0));
        assert_eq!(store.len(Channel::PTerm), 2);
        assert_eq!(store.snapshot(Channel::PTerm).last(), Some(&Sample::new(5_000, 3.0)));
    }

    #[test]
    fn test_retention_window_evicts() {
        let mut store = SampleStore::new(Duration::from_secs(10), 10_000);
        for i in 0..100 {
            store.append(Channel::TargetTemp, i * 1_000, 93.0);
        }

        let samples = store.snapshot(Channel::TargetTemp);
        assert_eq!(samples.first().unwrap().time_ms, 89_000);
        assert_eq!(samples.len(), 11);
    }

    #[test]
    fn test_capacity_bounds_long_sessions() {
        let mut store = SampleStore::new(Duration::from_secs(3_600), 50);
        // Three hours of 333 ms ticks
        for i in 0..32_400i64 {
            store.append(Channel::CurrentTemp, i * 333, 90.0);
            assert!(store.len(Channel::CurrentTemp) <= 50);
        }
        assert_eq!(store.len(Channel::CurrentTemp), 50);
    }

    #[test]
    fn test_unbounded_retention_keeps_samples() {
        let mut store = SampleStore::new(Duration::from_secs(u64::MAX), 100);
        assert!(store.append(Channel::CurrentTemp, 1_000, 20.5));
        assert_eq!(store.len(Channel::CurrentTemp), 1);
        assert!(store.append(Channel::CurrentTemp, 90_000_000_000, 20.6));
        assert_eq!(store.len(Channel::CurrentTemp), 2);

        let mut early = SampleStore::new(Duration::from_secs(60), 100);
        assert!(early.append(Channel::PTerm, i64::MIN, 1.0));
        assert_eq!(early.len(Channel::PTerm), 1);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut store = SampleStore::new(Duration::from_secs(60), 100);
        store.append(Channel::DTerm, 10_000, 0.1);

        assert!(store.append(Channel::ITerm, 1_000, 0.2));
        assert_eq!(store.len(Channel::DTerm), 1);
        assert_eq!(store.len(Channel::ITerm), 1);
    }

    #[test]
    fn test_samples_after() {
        let mut store = SampleStore::new(Duration::from_secs(60), 100);
        for t in [100, 200, 300] {
            store.append(Channel::PidValue, t, t as f64);
        }

        let newer = store.samples_after(Channel::PidValue, 200);
        assert_eq!(newer, vec![Sample::new(300, 300.0)]);
        assert!(store.samples_after(Channel::PidValue, 300).is_empty());
    }
}
