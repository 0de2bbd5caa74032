#![no_std]

extern crate alloc;

mod config;
mod monitor;
mod sensor;
mod throttle;

pub use config::BootConfig;
pub use monitor::{AirQualitySensor, DisplaySink, Monitor, Notifier, SensorEvent};
pub use sensor::{ErrorFlags, ErrorRegister};
pub use throttle::{SensorSample, ThrottleState, CO2_ALERT_THRESHOLD_PPM, NOTIFY_COOLDOWN_SECS};
