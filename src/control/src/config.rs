use alloc::string::{String, ToString};

// Credentials and notification endpoint, read once at boot from the first
// three lines of the config file on the SD card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootConfig {
    pub ssid: String,
    pub passphrase: String,
    pub notify_host: String,
}

impl BootConfig {
    /// Splits the raw file content into its three newline-delimited fields:
    /// SSID, passphrase, notification endpoint. Lines past the third are
    /// ignored. A short file yields empty strings for the missing fields;
    /// the caller decides whether that is acceptable.
    pub fn parse(raw: &str) -> BootConfig {
        let mut lines = raw.lines();
        let mut next = || lines.next().unwrap_or("").to_string();
        BootConfig {
            ssid: next(),
            passphrase: next(),
            notify_host: next(),
        }
    }
}
