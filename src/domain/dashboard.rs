// Dashboard view model - indicator, visibility and form state shown beside the charts
use super::device_status::DeviceStatus;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerIndicator {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatIndicator {
    Heating,
    Idle,
}

/// Which scheduler controls are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchedulerView {
    pub schedule_fields_visible: bool,
    pub enable_button_visible: bool,
    pub disable_button_visible: bool,
}

impl SchedulerView {
    pub fn for_enabled(enabled: bool) -> Self {
        Self {
            schedule_fields_visible: enabled,
            enable_button_visible: !enabled,
            disable_button_visible: enabled,
        }
    }
}

impl Default for SchedulerView {
    fn default() -> Self {
        Self::for_enabled(false)
    }
}

/// Read-only widgets, written by the poller only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicators {
    pub power: PowerIndicator,
    pub heating: HeatIndicator,
    pub scheduler: SchedulerView,
}

impl Default for Indicators {
    fn default() -> Self {
        Self {
            power: PowerIndicator::Off,
            heating: HeatIndicator::Idle,
            scheduler: SchedulerView::default(),
        }
    }
}

impl Indicators {
    /// Apply the flags present in a status snapshot. Missing flags leave the
    /// current widget state alone.
    pub fn apply(&mut self, status: &DeviceStatus) {
        if let Some(enabled) = status.sched_enabled {
            self.scheduler = SchedulerView::for_enabled(enabled);
        }
        if let Some(awake) = status.is_awake {
            self.power = if awake { PowerIndicator::On } else { PowerIndicator::Off };
        }
        if let Some(heating) = status.heating {
            self.heating = if heating { HeatIndicator::Heating } else { HeatIndicator::Idle };
        }
    }
}

/// Operator-editable inputs, written by the idle refresher and by the operator
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditableFields {
    pub setpoint: Option<String>,
    pub sleep_time: Option<String>,
    pub wake_time: Option<String>,
}

impl EditableFields {
    pub fn apply(&mut self, status: &DeviceStatus) {
        if let Some(target) = status.target_temp {
            self.setpoint = Some(format_setpoint(target));
        }
        if let Some(sleep) = &status.sleep_time {
            self.sleep_time = Some(sleep.clone());
        }
        if let Some(wake) = &status.wake_time {
            self.wake_time = Some(wake.clone());
        }
    }
}

/// Two-decimal text readouts for the status widgets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Readouts {
    pub current_temp: Option<String>,
    pub p_term: Option<String>,
    pub i_term: Option<String>,
    pub d_term: Option<String>,
    pub pid_value: Option<String>,
    pub pid_average: Option<String>,
}

impl Readouts {
    pub fn apply(&mut self, status: &DeviceStatus) {
        let fixed = |slot: &mut Option<String>, value: Option<f64>| {
            if let Some(v) = value {
                *slot = Some(format!("{:.2}", v));
            }
        };
        fixed(&mut self.current_temp, status.current_temp);
        fixed(&mut self.p_term, status.p_term);
        fixed(&mut self.i_term, status.i_term);
        fixed(&mut self.d_term, status.d_term);
        fixed(&mut self.pid_value, status.pid_value);
        fixed(&mut self.pid_average, status.pid_average);
    }
}

fn format_setpoint(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(body: &str) -> DeviceStatus {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_indicators_follow_flags() {
        let mut indicators = Indicators::default();
        indicators.apply(&status(
            r#"{"is_awake": true, "heating": false, "sched_enabled": true}"#,
        ));

        assert_eq!(indicators.power, PowerIndicator::On);
        assert_eq!(indicators.heating, HeatIndicator::Idle);
        assert!(indicators.scheduler.schedule_fields_visible);
        assert!(!indicators.scheduler.enable_button_visible);
        assert!(indicators.scheduler.disable_button_visible);
    }

    #[test]
    fn test_missing_flags_leave_widgets() {
        let mut indicators = Indicators::default();
        indicators.apply(&status(r#"{"heating": true}"#));
        indicators.apply(&status(r#"{"temp": 90.0}"#));

        assert_eq!(indicators.heating, HeatIndicator::Heating);
        assert_eq!(indicators.power, PowerIndicator::Off);
    }

    #[test]
    fn test_fields_and_readouts() {
        let snapshot = status(
            r#"{"temp": 20.5, "brewtemp": 93.0, "pterm": 1, "sleep_time": "22:00"}"#,
        );
        let mut fields = EditableFields::default();
        fields.apply(&snapshot);
        let mut readouts = Readouts::default();
        readouts.apply(&snapshot);

        assert_eq!(fields.setpoint.as_deref(), Some("93"));
        assert_eq!(fields.sleep_time.as_deref(), Some("22:00"));
        assert_eq!(fields.wake_time, None);
        assert_eq!(readouts.current_temp.as_deref(), Some("20.50"));
        assert_eq!(readouts.p_term.as_deref(), Some("1.00"));
    }
}
