// Channel domain model - the named series the charts draw
use serde::Serialize;
use std::fmt;

/// Every series the client records, one per measured or derived quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    CurrentTemp,
    TargetTemp,
    TargetTempLow,
    TargetTempHigh,
    PTerm,
    ITerm,
    DTerm,
    PidValue,
    PidAverage,
}

/// Which chart a channel is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartGroup {
    Temperature,
    Pid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelStyle {
    pub line_width: u8,
    pub stroke: String,
}

impl ChannelStyle {
    pub fn new(line_width: u8, stroke: &str) -> Self {
        Self {
            line_width,
            stroke: stroke.to_string(),
        }
    }
}

impl Channel {
    pub const ALL: [Channel; 9] = [
        Channel::CurrentTemp,
        Channel::TargetTemp,
        Channel::TargetTempLow,
        Channel::TargetTempHigh,
        Channel::PTerm,
        Channel::ITerm,
        Channel::DTerm,
        Channel::PidValue,
        Channel::PidAverage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::CurrentTemp => "current_temp",
            Channel::TargetTemp => "target_temp",
            Channel::TargetTempLow => "target_temp_low",
            Channel::TargetTempHigh => "target_temp_high",
            Channel::PTerm => "p_term",
            Channel::ITerm => "i_term",
            Channel::DTerm => "d_term",
            Channel::PidValue => "pid_value",
            Channel::PidAverage => "pid_average",
        }
    }

    pub fn group(&self) -> ChartGroup {
        match self {
            Channel::CurrentTemp
            | Channel::TargetTemp
            | Channel::TargetTempLow
            | Channel::TargetTempHigh => ChartGroup::Temperature,
            _ => ChartGroup::Pid,
        }
    }

    /// Default line style, matching the stock brew and PID charts
    pub fn default_style(&self) -> ChannelStyle {
        match self {
            Channel::TargetTemp => ChannelStyle::new(1, "#ffff00"),
            Channel::TargetTempLow | Channel::TargetTempHigh => ChannelStyle::new(1, "#ffffff"),
            Channel::CurrentTemp => ChannelStyle::new(3, "#ff0000"),
            Channel::PTerm => ChannelStyle::new(2, "#ff0000"),
            Channel::ITerm => ChannelStyle::new(2, "#00ff00"),
            Channel::DTerm => ChannelStyle::new(2, "#0000ff"),
            Channel::PidValue => ChannelStyle::new(2, "#ffff00"),
            Channel::PidAverage => ChannelStyle::new(2, "#ff00ff"),
        }
    }

    pub fn from_name(name: &str) -> Option<Channel> {
        Channel::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
