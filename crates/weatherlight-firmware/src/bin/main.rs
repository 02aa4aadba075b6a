#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_net::{DhcpConfig, StackResources};
use embassy_time::{Duration, Instant, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::Output;
use esp_hal::timer::timg::TimerGroup;
use log::{LevelFilter, debug, error, info};
use static_cell::StaticCell;
use weatherlight_core::bme280::{Settings, measure_shared};
use weatherlight_core::config::StationConfig;
use weatherlight_core::led::StatusLed;
use weatherlight_core::status::StatusReport;
use weatherlight_firmware::hardware::{self, StationSensor};
use weatherlight_firmware::{wifi, wifi_secrets};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!(LevelFilter::Info);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    info!("Embassy initialized!");

    let station = wifi_secrets::station_config();
    let station_timing = station.station;

    // Status LED
    let led = hardware::create_status_led(peripherals.GPIO15);
    spawner.must_spawn(blink(
        led,
        Duration::from_millis(station_timing.blink_period_ms.into()),
    ));

    // Sensor
    match hardware::create_i2c_bus(peripherals.I2C0, peripherals.GPIO14, peripherals.GPIO20) {
        Ok(bus) => {
            let sensor = hardware::init_sensor(bus);
            spawner.must_spawn(sample_sensor(sensor, station_timing));
        }
        Err(_) => error!("Sensor sampling disabled, I2C bus unavailable"),
    }

    // Wi-Fi
    match station.validate() {
        Ok(()) => {
            static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
            static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

            match esp_radio::init() {
                Ok(radio) => {
                    let radio = RADIO.init(radio);
                    match esp_radio::wifi::new(radio, peripherals.WIFI, Default::default()) {
                        Ok((controller, interfaces)) => {
                            let mut dhcp = DhcpConfig::default();
                            dhcp.hostname = wifi_secrets::HOSTNAME.try_into().ok();

                            let rng = esp_hal::rng::Rng::new();
                            let seed = u64::from(rng.random()) | (u64::from(rng.random()) << 32);
                            let (stack, runner) = embassy_net::new(
                                interfaces.sta,
                                embassy_net::Config::dhcpv4(dhcp),
                                RESOURCES.init(StackResources::new()),
                                seed,
                            );

                            spawner.must_spawn(wifi::wifi_connection(controller, stack, station));
                            spawner.must_spawn(wifi::net_runner(runner));
                        }
                        Err(e) => error!("Failed to initialize Wi-Fi controller: {:?}", e),
                    }
                }
                Err(e) => error!("Failed to initialize radio: {:?}", e),
            }
        }
        Err(e) => error!("Wi-Fi disabled: {}", e),
    }

    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}

#[embassy_executor::task]
async fn blink(mut led: StatusLed<Output<'static>>, period: Duration) {
    info!("'blink' task has been started");
    loop {
        let Ok(on) = led.toggle();
        debug!("LED {}", if on { "on" } else { "off" });
        Timer::after(period).await;
    }
}

/// Failed acquisitions in a row before the sensor is reconfigured.
const REBRING_UP_AFTER: u32 = 3;

#[embassy_executor::task]
async fn sample_sensor(sensor: &'static StationSensor, timing: StationConfig) {
    info!("'sample_sensor' task has been started");
    let interval = Duration::from_secs(timing.sample_interval_secs.into());
    let settings = Settings::default();
    let mut report = StatusReport::default();
    let mut ready = false;

    loop {
        if !ready {
            match hardware::bring_up_sensor(sensor, settings).await {
                Ok(()) => {
                    info!("BME280 ready");
                    ready = true;
                }
                Err(e) => error!("BME280 bring-up failed: {}", e),
            }
        }

        if ready {
            let outcome = measure_shared(sensor).await;
            if let Err(e) = &outcome {
                error!("BME280 measurement failed: {}", e);
            }
            report.record(&outcome);
            if report.consecutive_failures >= REBRING_UP_AFTER {
                ready = false;
            }
        }

        report.uptime_secs = Instant::now().as_secs();
        report.link_up = wifi::link_up();
        info!("{}", report);

        Timer::after(interval).await;
    }
}
