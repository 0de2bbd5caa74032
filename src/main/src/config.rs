use std::{fmt, fs, io};

use log::*;

use control::BootConfig;

/// Failure to obtain the boot configuration. Both variants are fatal for
/// the caller: without credentials the device has no course of action.
#[derive(Debug)]
pub enum ConfigError {
    NotFound(String),
    Read(String, io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(f, "Failed to open {path}"),
            ConfigError::Read(path, err) => write!(f, "Failed to read {path}: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Reads the boot configuration from the SD card. The file holds the SSID,
/// passphrase and notification endpoint on its first three lines.
pub fn load(path: &str) -> Result<BootConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(path.into()),
        _ => ConfigError::Read(path.into(), err),
    })?;

    info!("Read Wifi info from SD Card.");
    let config = BootConfig::parse(&raw);
    info!("SSID: {}", config.ssid);
    if config.notify_host.is_empty() {
        warn!("Config file has no notification endpoint on line 3");
    }

    Ok(config)
}
