//! Bosch BME280 temperature, pressure and humidity sensor driver.
//!
//! Blocking, forced-mode only. The driver is split the way the data flows:
//!
//! - [`transport`]: register reads/writes over I²C (or anything else)
//! - [`calibration`]: factory trimming coefficients, loaded once per session
//! - [`compensation`]: datasheet fixed-point formulas, raw ADC -> physical units
//! - [`device`]: the initialize/configure/measure sequencer
//! - [`shared`]: async mutex wrapper for sharing one sensor between tasks

pub mod calibration;
pub mod compensation;
pub mod device;
pub mod registers;
pub mod settings;
pub mod shared;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use calibration::CalibrationData;
pub use compensation::{RawSample, Reading, TFine};
pub use device::{Bme280, Bme280Error, DeviceState};
pub use settings::{IirFilter, Oversampling, Settings, StandbyTime};
pub use shared::{SharedSensor, measure_shared};
pub use transport::{DeviceAddress, I2cTransport, RegisterTransport};
