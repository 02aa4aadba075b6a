//! Hardware-independent core library for the WeatherLight station.
//!
//! Holds the BME280 driver and the platform-agnostic pieces of the station
//! firmware: configuration, the Wi-Fi link policy, the status LED and the
//! status report. Nothing here touches a HAL directly, so the whole crate
//! builds and tests on the host.

#![cfg_attr(not(test), no_std)]

pub mod bme280;
pub mod config;
pub mod led;
pub mod network;
pub mod status;
