//! Hardware initialization for the WeatherLight board
//!
//! Pin assignment: BME280 on I2C0 (SDA GPIO14, SCL GPIO20, 100 kHz, SDO to
//! GND), status LED on GPIO15.

use embassy_sync::mutex::Mutex;
use esp_hal::delay::Delay;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::i2c::master::{Config as I2cConfig, ConfigError, I2c};
use esp_hal::peripherals::{GPIO14, GPIO15, GPIO20, I2C0};
use esp_hal::time::Rate;
use esp_hal::Blocking;
use log::{error, info};
use static_cell::StaticCell;
use weatherlight_core::bme280::{Bme280, DeviceAddress, I2cTransport, Settings, SharedSensor};
use weatherlight_core::led::StatusLed;

pub type SensorBus = I2c<'static, Blocking>;
pub type SensorTransport = I2cTransport<SensorBus>;
pub type StationSensor = SharedSensor<SensorTransport, Delay>;
pub type SensorError = weatherlight_core::bme280::Bme280Error<esp_hal::i2c::master::Error>;

/// BME280 bus speed, standard mode.
const I2C_FREQUENCY_KHZ: u32 = 100;

/// Creates the blocking I2C master the BME280 sits on
pub fn create_i2c_bus(
    i2c0: I2C0<'static>,
    sda: GPIO14<'static>,
    scl: GPIO20<'static>,
) -> Result<SensorBus, ConfigError> {
    let bus = I2c::new(
        i2c0,
        I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQUENCY_KHZ)),
    )
    .inspect_err(|e| error!("Failed to configure I2C0: {:?}", e))?
    .with_sda(sda)
    .with_scl(scl);
    info!("I2C0 ready at {} kHz", I2C_FREQUENCY_KHZ);
    Ok(bus)
}

/// Moves the driver into a static so the sampling task can borrow it forever.
pub fn init_sensor(bus: SensorBus) -> &'static StationSensor {
    static SENSOR: StaticCell<StationSensor> = StaticCell::new();

    let transport = I2cTransport::new(bus, DeviceAddress::Primary);
    SENSOR.init(Mutex::new(Bme280::new(transport, Delay::new())))
}

/// Brings the sensor to `Ready`, starting from whatever state it is in.
///
/// A sensor that is already calibrated is only reconfigured.
pub async fn bring_up_sensor(
    sensor: &StationSensor,
    settings: Settings,
) -> Result<(), SensorError> {
    let mut bme = sensor.lock().await;
    if bme.calibration().is_none() {
        bme.initialize()?;
    }
    bme.configure(settings)
}

/// The heartbeat LED, initially off
pub fn create_status_led(pin: GPIO15<'static>) -> StatusLed<Output<'static>> {
    let output = Output::new(pin, Level::Low, OutputConfig::default());
    match StatusLed::new(output) {
        Ok(led) => led,
        Err(never) => match never {},
    }
}
