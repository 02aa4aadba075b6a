use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Longest SSID allowed by 802.11.
pub const MAX_SSID_LEN: usize = 32;
/// WPA2-PSK passphrase bounds.
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 63;
pub const MAX_HOSTNAME_LEN: usize = 32;

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct Config<'a> {
    pub internet: InternetConfig<'a>,
    #[serde(default)]
    pub station: StationConfig,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct InternetConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
    pub hostname: &'a str,
}

/// Timing and retry knobs for the station loop.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationConfig {
    /// Seconds between sensor acquisitions
    pub sample_interval_secs: u32,
    /// Half-period of the status LED (on for this long, then off)
    pub blink_period_ms: u32,
    /// Reconnect attempts after the first disconnect before giving up
    pub max_wifi_retries: u8,
    pub wifi_connect_timeout_secs: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: 5,
            blink_period_ms: 1000,
            max_wifi_retries: 5,
            wifi_connect_timeout_secs: 10,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SSID must be 1 to 32 bytes, got {0}")]
    Ssid(usize),
    #[error("WPA2 password must be 8 to 63 bytes, got {0}")]
    Password(usize),
    #[error("hostname must be at most 32 bytes, got {0}")]
    Hostname(usize),
    #[error("{0} must be non-zero")]
    Zero(&'static str),
}

impl<'a> Config<'a> {
    pub fn new(ssid: &'a str, password: &'a str, hostname: &'a str) -> Self {
        Self {
            internet: InternetConfig {
                ssid,
                password,
                hostname,
            },
            station: StationConfig::default(),
        }
    }

    /// Checks credential lengths and timing values before they reach the radio.
    ///
    /// An empty password selects an open network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let InternetConfig {
            ssid,
            password,
            hostname,
        } = self.internet;

        if ssid.is_empty() || ssid.len() > MAX_SSID_LEN {
            return Err(ConfigError::Ssid(ssid.len()));
        }
        if !password.is_empty() && !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password.len())
        {
            return Err(ConfigError::Password(password.len()));
        }
        if hostname.len() > MAX_HOSTNAME_LEN {
            return Err(ConfigError::Hostname(hostname.len()));
        }
        if self.station.sample_interval_secs == 0 {
            return Err(ConfigError::Zero("sample interval"));
        }
        if self.station.blink_period_ms == 0 {
            return Err(ConfigError::Zero("blink period"));
        }
        if self.station.wifi_connect_timeout_secs == 0 {
            return Err(ConfigError::Zero("wifi connect timeout"));
        }
        Ok(())
    }
}
