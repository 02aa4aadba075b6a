//! ESP32-C6 firmware-specific modules for WeatherLight
//!
//! This crate contains the code that cannot compile on desktop targets:
//! ESP32 peripheral initialization, the radio connection task and the
//! build-time Wi-Fi credentials. Everything it drives lives in
//! `weatherlight_core`.

#![no_std]

extern crate alloc;

pub mod hardware;
pub mod wifi;
pub mod wifi_secrets;
