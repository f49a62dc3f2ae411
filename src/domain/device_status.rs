// Device status snapshot decoded from the polling endpoint
use super::channel::Channel;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One decoded `/allstats` response.
///
/// Every field is optional: a key missing from the payload, or carrying a
/// value of the wrong type, means "no update for that channel or flag this
/// tick", never a decode failure. Unknown keys sent by the device (`cpu`,
/// `avgtemp`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeviceStatus {
    #[serde(default, rename = "temp", deserialize_with = "number")]
    pub current_temp: Option<f64>,
    #[serde(default, rename = "brewtemp", deserialize_with = "number")]
    pub target_temp: Option<f64>,
    #[serde(default, rename = "pterm", deserialize_with = "number")]
    pub p_term: Option<f64>,
    #[serde(default, rename = "iterm", deserialize_with = "number")]
    pub i_term: Option<f64>,
    #[serde(default, rename = "dterm", deserialize_with = "number")]
    pub d_term: Option<f64>,
    #[serde(default, rename = "pidval", deserialize_with = "number")]
    pub pid_value: Option<f64>,
    #[serde(default, rename = "avgpid", deserialize_with = "number")]
    pub pid_average: Option<f64>,
    #[serde(default, deserialize_with = "flag")]
    pub is_awake: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub heating: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub sched_enabled: Option<bool>,
    #[serde(default, deserialize_with = "text")]
    pub sleep_time: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub wake_time: Option<String>,
}

fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| v.as_f64()))
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| v.as_bool()))
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| v.as_str().map(str::to_owned)))
}

impl DeviceStatus {
    /// Values to append for this snapshot, one per channel present.
    /// The band channels are derived from the target temperature.
    pub fn channel_values(&self, band_offset: f64) -> Vec<(Channel, f64)> {
        let band = self
            .target_temp
            .map(|t| (t - band_offset, t + band_offset));

        [
            (Channel::CurrentTemp, self.current_temp),
            (Channel::TargetTemp, self.target_temp),
            (Channel::TargetTempLow, band.map(|b| b.0)),
            (Channel::TargetTempHigh, band.map(|b| b.1)),
            (Channel::PTerm, self.p_term),
            (Channel::ITerm, self.i_term),
            (Channel::DTerm, self.d_term),
            (Channel::PidValue, self.pid_value),
            (Channel::PidAverage, self.pid_average),
        ]
        .into_iter()
        .filter_map(|(channel, value)| value.filter(|v| v.is_finite()).map(|v| (channel, v)))
        .collect()
    }

    /// Fold a newer snapshot into this one, keeping old values for keys the
    /// newer payload omitted.
    pub fn merge(&mut self, newer: &DeviceStatus) {
        fn take<T: Clone>(slot: &mut Option<T>, newer: &Option<T>) {
            if newer.is_some() {
                *slot = newer.clone();
            }
        }
        take(&mut self.current_temp, &newer.current_temp);
        take(&mut self.target_temp, &newer.target_temp);
        take(&mut self.p_term, &newer.p_term);
        take(&mut self.i_term, &newer.i_term);
        take(&mut self.d_term, &newer.d_term);
        take(&mut self.pid_value, &newer.pid_value);
        take(&mut self.pid_average, &newer.pid_average);
        take(&mut self.is_awake, &newer.is_awake);
        take(&mut self.heating, &newer.heating);
        take(&mut self.sched_enabled, &newer.sched_enabled);
        take(&mut self.sleep_time, &newer.sleep_time);
        take(&mut self.wake_time, &newer.wake_time);
    }
}
