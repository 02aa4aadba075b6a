//! Wi-Fi credentials baked in by `build.rs` from `.env`.

use weatherlight_core::config::Config;

pub const SSID: &str = env!("WIFI_SSID");
pub const PASSWORD: &str = env!("WIFI_PASSWORD");
pub const HOSTNAME: &str = env!("WIFI_HOSTNAME");

/// Station configuration with the baked-in credentials and default timings.
pub fn station_config() -> Config<'static> {
    Config::new(SSID, PASSWORD, HOSTNAME)
}
