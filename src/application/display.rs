// Display adapter - turns session state into a stream of chart frames
use crate::application::session::{DashboardView, Session};
use crate::domain::channel::{Channel, ChannelStyle, ChartGroup};
use crate::domain::telemetry::{Sample, now_ms};
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tokio_stream::wrappers::IntervalStream;

/// What a renderer needs from the core: registered channels with a style,
/// and a periodic feed of new samples plus widget state.
pub trait DisplayAdapter {
    fn add_channel(&mut self, channel: Channel, style: ChannelStyle);

    fn stream_from(&self, source: Arc<Session>, refresh: Duration) -> BoxStream<'static, DisplayFrame>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelInfo {
    pub channel: Channel,
    pub group: ChartGroup,
    pub style: ChannelStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesUpdate {
    pub channel: Channel,
    pub samples: Vec<Sample>,
}

/// One refresh worth of display input
#[derive(Debug, Clone, Serialize)]
pub struct DisplayFrame {
    pub time_ms: i64,
    pub series: Vec<SeriesUpdate>,
    pub dashboard: DashboardView,
}

/// Renderer-agnostic adapter producing [`DisplayFrame`]s. Each frame carries
/// only the samples appended since the previous frame of the same stream.
#[derive(Debug, Clone, Default)]
pub struct FrameDisplay {
    channels: Vec<ChannelInfo>,
}

impl FrameDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both stock charts: temperature band plus current, and the PID terms
    pub fn with_default_channels() -> Self {
        let mut display = Self::new();
        for channel in Channel::ALL {
            display.add_channel(channel, channel.default_style());
        }
        display
    }

    pub fn channels(&self) -> &[ChannelInfo] {
        &self.channels
    }
}

impl DisplayAdapter for FrameDisplay {
    fn add_channel(&mut self, channel: Channel, style: ChannelStyle) {
        let info = ChannelInfo {
            channel,
            group: channel.group(),
            style,
        };
        match self.channels.iter_mut().find(|c| c.channel == channel) {
            Some(existing) => *existing = info,
            None => self.channels.push(info),
        }
    }

    fn stream_from(&self, source: Arc<Session>, refresh: Duration) -> BoxStream<'static, DisplayFrame> {
        let channels: Vec<Channel> = self.channels.iter().map(|c| c.channel).collect();

        let frames = async_stream::stream! {
            let mut ticker = interval(refresh);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut ticks = IntervalStream::new(ticker);
            let mut cursors: HashMap<Channel, i64> = HashMap::new();

            while ticks.next().await.is_some() {
                let series = channels
                    .iter()
                    .map(|&channel| {
                        let after = cursors.get(&channel).copied().unwrap_or(i64::MIN);
                        let samples = source.samples_after(channel, after);
                        if let Some(last) = samples.last() {
                            cursors.insert(channel, last.time_ms);
                        }
                        SeriesUpdate { channel, samples }
                    })
                    .collect();

                yield DisplayFrame {
                    time_ms: now_ms(),
                    series,
                    dashboard: source.view(),
                };
            }
        };

        frames.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sample_store::SampleStore;
    use crate::domain::device_status::DeviceStatus;

    #[test]
    fn test_add_channel_replaces_style() {
        let mut display = FrameDisplay::new();
        display.add_channel(Channel::CurrentTemp, ChannelStyle::new(3, "#ff0000"));
        display.add_channel(Channel::CurrentTemp, ChannelStyle::new(1, "#00ff00"));

        assert_eq!(display.channels().len(), 1);
        assert_eq!(display.channels()[0].style.stroke, "#00ff00");
        assert_eq!(FrameDisplay::with_default_channels().channels().len(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_carry_only_new_samples() {
        let session = Arc::new(Session::new(SampleStore::new(Duration::from_secs(60), 64)));
        let mut display = FrameDisplay::new();
        display.add_channel(Channel::CurrentTemp, Channel::CurrentTemp.default_style());
        display.add_channel(Channel::PTerm, Channel::PTerm.default_style());

        let status: DeviceStatus =
            serde_json::from_str(r#"{"temp": 90.0, "pterm": 2.0, "heating": true}"#).unwrap();
        session.apply_poll(&status, 1_000, 4.0);

        let mut frames = display.stream_from(session.clone(), Duration::from_millis(500));
        let first = frames.next().await.unwrap();
        assert_eq!(first.series.len(), 2);
        assert_eq!(first.series[0].samples, vec![Sample::new(1_000, 90.0)]);

        let newer: DeviceStatus = serde_json::from_str(r#"{"temp": 90.5}"#).unwrap();
        session.apply_poll(&newer, 1_333, 4.0);

        let second = frames.next().await.unwrap();
        assert_eq!(second.series[0].samples, vec![Sample::new(1_333, 90.5)]);
        assert!(second.series[1].samples.is_empty());
        assert_eq!(
            second.dashboard.indicators.heating,
            crate::domain::dashboard::HeatIndicator::Heating
        );
    }
}
