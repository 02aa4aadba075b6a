//! Sharing one sensor between tasks.
//!
//! The BME280 has a single conversion pipeline and its control and data
//! registers are device-global, so two interleaved acquisitions corrupt each
//! other. Callers go through an Embassy async [`Mutex`] held for the whole
//! trigger/wait/read sequence, the same way the I²C bus itself is shared.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal::delay::DelayNs;

use super::compensation::Reading;
use super::device::{Bme280, Bme280Error};
use super::transport::RegisterTransport;

/// A driver that several tasks may measure through.
///
/// ```ignore
/// use static_cell::StaticCell;
///
/// static SENSOR: StaticCell<SharedSensor<Transport, Delay>> = StaticCell::new();
/// let sensor = SENSOR.init(Mutex::new(bme280));
/// let reading = measure_shared(sensor).await?;
/// ```
pub type SharedSensor<T, D> = Mutex<CriticalSectionRawMutex, Bme280<T, D>>;

/// Runs one acquisition while holding the sensor lock.
pub async fn measure_shared<T, D>(
    sensor: &SharedSensor<T, D>,
) -> Result<Reading, Bme280Error<T::Error>>
where
    T: RegisterTransport,
    D: DelayNs,
{
    let mut bme = sensor.lock().await;
    bme.measure()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bme280::settings::Settings;
    use crate::bme280::test_support::{RecordingDelay, StubTransport};
    use crate::bme280::DeviceState;
    use embassy_futures::block_on;

    #[test]
    fn test_measure_through_lock() {
        let mut bme = Bme280::new(StubTransport::bme280(), RecordingDelay::default());
        bme.initialize().unwrap();
        bme.configure(Settings::default()).unwrap();
        let sensor: SharedSensor<_, _> = Mutex::new(bme);

        let first = block_on(measure_shared(&sensor)).unwrap();
        let second = block_on(measure_shared(&sensor)).unwrap();
        assert_eq!(first, second);

        let bme = sensor.into_inner();
        assert_eq!(bme.state(), DeviceState::Ready);
    }

    #[test]
    fn test_shared_errors_propagate() {
        let bme = Bme280::new(StubTransport::bme280(), RecordingDelay::default());
        let sensor: SharedSensor<_, _> = Mutex::new(bme);

        assert!(matches!(
            block_on(measure_shared(&sensor)),
            Err(Bme280Error::InvalidState { .. })
        ));
    }
}
