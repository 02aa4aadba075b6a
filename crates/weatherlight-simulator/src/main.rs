//! Desktop simulator for the WeatherLight station.
//!
//! Runs the firmware's sampling loop on the host against an in-memory BME280,
//! logging a status line per acquisition the way the board does over RTT.
//!
//! # Arguments
//!
//! | Flag          | Meaning                                        |
//! |---------------|------------------------------------------------|
//! | `--samples N` | Stop after N acquisitions (default: run forever) |
//! | `--faults N`  | NACK every N-th bus transaction                |
//! | `--fast`      | Skip the sample interval sleep                 |
//!
//! Set `RUST_LOG=debug` to see raw ADC values and encoded frames.

mod virtual_bme280;

use std::thread;
use std::time::{Duration, Instant};

use embassy_futures::block_on;
use embassy_sync::mutex::Mutex;
use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};

use weatherlight_core::bme280::{
    Bme280, DeviceAddress, I2cTransport, Settings, SharedSensor, measure_shared,
};
use weatherlight_core::config::StationConfig;
use weatherlight_core::status::{MAX_FRAME_LEN, StatusReport};

use virtual_bme280::VirtualBme280;

/// Failed acquisitions in a row before the sensor is reconfigured.
const REBRING_UP_AFTER: u32 = 3;

/// Blocking delay backed by the OS scheduler.
struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns.into()));
    }
}

type SimSensor = SharedSensor<I2cTransport<VirtualBme280>, StdDelay>;

#[derive(Default)]
struct Options {
    samples: Option<u32>,
    fault_every: u32,
    fast: bool,
}

fn parse_options() -> Options {
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--samples" => options.samples = args.next().and_then(|v| v.parse().ok()),
            "--faults" => {
                options.fault_every = args.next().and_then(|v| v.parse().ok()).unwrap_or(0)
            }
            "--fast" => options.fast = true,
            other => warn!("Ignoring unknown argument '{}'", other),
        }
    }
    options
}

fn bring_up(sensor: &SimSensor, settings: Settings) -> bool {
    let mut bme = block_on(sensor.lock());
    let result = match bme.calibration() {
        Some(_) => bme.configure(settings),
        None => bme.initialize().and_then(|()| bme.configure(settings)),
    };
    match result {
        Ok(()) => {
            info!("Virtual BME280 ready ({})", bme.state());
            true
        }
        Err(e) => {
            error!("BME280 bring-up failed: {}", e);
            false
        }
    }
}

fn main() {
    env_logger::init();
    let options = parse_options();
    let timing = StationConfig::default();
    let interval = Duration::from_secs(timing.sample_interval_secs.into());
    let settings = Settings::default();

    info!("Starting WeatherLight simulator");
    info!(
        "Sampling every {} s, measurement time {} us",
        timing.sample_interval_secs,
        settings.max_measurement_time_us()
    );

    let device =
        VirtualBme280::new(DeviceAddress::Primary.addr()).with_fault_every(options.fault_every);
    let sensor: SimSensor = Mutex::new(Bme280::new(
        I2cTransport::new(device, DeviceAddress::Primary),
        StdDelay,
    ));

    let started = Instant::now();
    let mut report = StatusReport::default();
    let mut ready = false;
    let mut taken = 0u32;

    while options.samples.is_none_or(|limit| taken < limit) {
        if !ready {
            ready = bring_up(&sensor, settings);
        }

        if ready {
            let outcome = block_on(measure_shared(&sensor));
            if let Err(e) = &outcome {
                error!("BME280 measurement failed: {}", e);
            }
            report.record(&outcome);
            if report.consecutive_failures >= REBRING_UP_AFTER {
                ready = false;
            }
        }
        taken += 1;

        report.uptime_secs = started.elapsed().as_secs();
        info!("{}", report);

        let mut frame = [0u8; MAX_FRAME_LEN];
        match report.encode(&mut frame) {
            Ok(bytes) => debug!("status frame ({} bytes): {:02x?}", bytes.len(), bytes),
            Err(e) => error!("Failed to encode status frame: {}", e),
        }

        if !options.fast {
            thread::sleep(interval);
        }
    }

    let (transport, _) = sensor.into_inner().release();
    info!(
        "Simulator finished after {} samples, {} conversions",
        taken,
        transport.release().conversions()
    );
}
