// Device commands and their wire endpoints
use chrono::NaiveTime;
use std::fmt;

pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    PowerOn,
    PowerOff,
    SetTargetTemp(f64),
    SetSleepTime(NaiveTime),
    SetWakeTime(NaiveTime),
    SetScheduler(bool),
    Restart,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// How a command travels: method, path and at most one form field
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub method: Method,
    pub path: &'static str,
    pub form: Option<(&'static str, String)>,
}

impl DeviceCommand {
    pub fn request(&self) -> CommandRequest {
        let (method, path, form) = match self {
            DeviceCommand::PowerOn => (Method::Get, "/turnon", None),
            DeviceCommand::PowerOff => (Method::Get, "/turnoff", None),
            DeviceCommand::SetTargetTemp(t) => (Method::Post, "/brewtemp", Some(("settemp", t.to_string()))),
            DeviceCommand::SetSleepTime(t) => (
                Method::Post,
                "/setsleep",
                Some(("sleep", t.format(TIME_OF_DAY_FORMAT).to_string())),
            ),
            DeviceCommand::SetWakeTime(t) => (
                Method::Post,
                "/setwake",
                Some(("wake", t.format(TIME_OF_DAY_FORMAT).to_string())),
            ),
            DeviceCommand::SetScheduler(on) => (
                Method::Post,
                "/scheduler",
                Some(("scheduler", if *on { "on" } else { "off" }.to_string())),
            ),
            DeviceCommand::Restart => (Method::Get, "/restart", None),
            DeviceCommand::Shutdown => (Method::Get, "/shutdown", None),
        };
        CommandRequest { method, path, form }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request = self.request();
        match request.form {
            Some((key, value)) => write!(f, "{} {}={}", request.path, key, value),
            None => f.write_str(request.path),
        }
    }
}
