//! BME280 acquisition sequencer.
//!
//! Owns the transport, a delay provider and the per-session calibration.
//! Lifecycle:
//!
//! ```text
//! Uninitialized --initialize()--> CalibrationLoaded --configure()--> Ready
//!       ^                                                             |
//!       +------------------------- reset() ---------------------------+
//! ```
//!
//! `measure()` is only valid in `Ready` and never changes the state, so a
//! failed measurement can simply be retried.

use core::fmt::{self, Debug};

use embedded_hal::delay::DelayNs;
use log::{debug, error, info};
use thiserror_no_std::Error;

use super::calibration::CalibrationData;
use super::compensation::{RawSample, Reading, compensate};
use super::registers::{
    BME280_CHIP_ID, DATA_BURST_LEN, Register, SOFT_RESET_COMMAND, SOFT_RESET_DELAY_MS,
};
use super::settings::{PowerMode, Settings};
use super::transport::RegisterTransport;

/// Observable driver state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceState {
    Uninitialized,
    CalibrationLoaded,
    Ready,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::CalibrationLoaded => "calibration loaded",
            Self::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by [`Bme280`]. `E` is the transport's own error type.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Bme280Error<E: Debug> {
    #[error("bus transaction failed: {0:?}")]
    Bus(E),
    #[error("unexpected chip id {chip_id:#04x} (expected 0x60)")]
    UnexpectedDevice { chip_id: u8 },
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: DeviceState,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Calibration and settings, present only in the states that own them.
#[derive(Clone, Copy)]
enum Session {
    Uninitialized,
    CalibrationLoaded(CalibrationData),
    Ready(CalibrationData, Settings),
}

/// BME280 driver over a [`RegisterTransport`].
pub struct Bme280<T, D> {
    transport: T,
    delay: D,
    session: Session,
}

impl<T, D> Bme280<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    pub fn new(transport: T, delay: D) -> Self {
        Self {
            transport,
            delay,
            session: Session::Uninitialized,
        }
    }

    pub fn state(&self) -> DeviceState {
        match self.session {
            Session::Uninitialized => DeviceState::Uninitialized,
            Session::CalibrationLoaded(_) => DeviceState::CalibrationLoaded,
            Session::Ready(..) => DeviceState::Ready,
        }
    }

    pub fn calibration(&self) -> Option<&CalibrationData> {
        match &self.session {
            Session::Uninitialized => None,
            Session::CalibrationLoaded(calib) | Session::Ready(calib, _) => Some(calib),
        }
    }

    pub fn settings(&self) -> Option<&Settings> {
        match &self.session {
            Session::Ready(_, settings) => Some(settings),
            _ => None,
        }
    }

    /// Verifies the chip id and loads the factory calibration.
    ///
    /// On success any previous calibration and settings are discarded and the
    /// device is `CalibrationLoaded`. On failure the state is untouched.
    pub fn initialize(&mut self) -> Result<(), Bme280Error<T::Error>> {
        let mut chip_id = [0u8; 1];
        self.transport
            .read_registers(Register::Id.addr(), &mut chip_id)
            .map_err(|e| {
                error!("BME280 chip id read failed: {:?}", e);
                Bme280Error::Bus(e)
            })?;

        if chip_id[0] != BME280_CHIP_ID {
            error!("BME280 chip id mismatch: {:#04x}", chip_id[0]);
            return Err(Bme280Error::UnexpectedDevice {
                chip_id: chip_id[0],
            });
        }
        info!("BME280 found (chip id {:#04x})", chip_id[0]);

        let calib = CalibrationData::load(&mut self.transport).map_err(|e| {
            error!("BME280 calibration read failed: {:?}", e);
            Bme280Error::Bus(e)
        })?;
        debug!("BME280 calibration: {:?}", calib);

        self.session = Session::CalibrationLoaded(calib);
        Ok(())
    }

    /// Writes `ctrl_hum`, `ctrl_meas` and `config`, in that order.
    ///
    /// The device is left sleeping; each [`measure`](Self::measure) triggers
    /// its own forced conversion.
    pub fn configure(&mut self, settings: Settings) -> Result<(), Bme280Error<T::Error>> {
        let calib = match self.session {
            Session::Uninitialized => {
                return Err(Bme280Error::InvalidState {
                    operation: "configure",
                    state: DeviceState::Uninitialized,
                });
            }
            Session::CalibrationLoaded(calib) | Session::Ready(calib, _) => calib,
        };
        settings.validate().map_err(Bme280Error::InvalidArgument)?;

        // ctrl_hum only takes effect after the following ctrl_meas write
        let writes = [
            (Register::CtrlHum, settings.ctrl_hum()),
            (Register::CtrlMeas, settings.ctrl_meas(PowerMode::Sleep)),
            (Register::Config, settings.config()),
        ];
        for (register, value) in writes {
            self.transport
                .write_register(register.addr(), value)
                .map_err(|e| {
                    error!("BME280 write of {:?} failed: {:?}", register, e);
                    Bme280Error::Bus(e)
                })?;
        }

        info!(
            "BME280 configured (osrs_t {:?}, osrs_p {:?}, osrs_h {:?}, filter {:?})",
            settings.temperature, settings.pressure, settings.humidity, settings.filter
        );
        self.session = Session::Ready(calib, settings);
        Ok(())
    }

    /// Triggers one forced-mode conversion, waits it out and compensates the
    /// result.
    pub fn measure(&mut self) -> Result<Reading, Bme280Error<T::Error>> {
        let Session::Ready(calib, settings) = self.session else {
            return Err(Bme280Error::InvalidState {
                operation: "measure",
                state: self.state(),
            });
        };

        let raw = self.read_raw(&settings)?;
        let reading = compensate(&calib, &raw);
        debug!("BME280 raw {:?} -> {}", raw, reading);
        Ok(reading)
    }

    fn read_raw(&mut self, settings: &Settings) -> Result<RawSample, Bme280Error<T::Error>> {
        // A configure that failed part way may have left a different ctrl_hum
        // on the device, and the trigger below would latch it
        self.transport
            .write_register(Register::CtrlHum.addr(), settings.ctrl_hum())
            .map_err(|e| {
                error!("BME280 write of {:?} failed: {:?}", Register::CtrlHum, e);
                Bme280Error::Bus(e)
            })?;
        self.transport
            .write_register(
                Register::CtrlMeas.addr(),
                settings.ctrl_meas(PowerMode::Forced),
            )
            .map_err(|e| {
                error!("BME280 forced-mode trigger failed: {:?}", e);
                Bme280Error::Bus(e)
            })?;

        // Reading before the conversion finishes returns the previous sample
        self.delay.delay_us(settings.max_measurement_time_us());

        let mut burst = [0u8; DATA_BURST_LEN];
        self.transport
            .read_registers(Register::PressMsb.addr(), &mut burst)
            .map_err(|e| {
                error!("BME280 data read failed: {:?}", e);
                Bme280Error::Bus(e)
            })?;

        Ok(RawSample::from_burst(&burst))
    }

    /// Soft-resets the sensor and forgets the session.
    pub fn reset(&mut self) -> Result<(), Bme280Error<T::Error>> {
        self.transport
            .write_register(Register::Reset.addr(), SOFT_RESET_COMMAND)
            .map_err(|e| {
                error!("BME280 soft reset failed: {:?}", e);
                Bme280Error::Bus(e)
            })?;
        self.delay.delay_ms(SOFT_RESET_DELAY_MS);

        info!("BME280 reset");
        self.session = Session::Uninitialized;
        Ok(())
    }

    /// Tears the driver down and hands back the transport and delay.
    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }
}
