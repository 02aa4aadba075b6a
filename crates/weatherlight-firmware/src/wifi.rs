//! Station-mode Wi-Fi: association with retries, DHCP and the network runner.

use alloc::string::String;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer, with_timeout};
use esp_radio::wifi::{AuthMethod, ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent};
use log::{error, info, warn};
use weatherlight_core::config::Config;
use weatherlight_core::network::{LinkAction, LinkError, LinkEvent, LinkState, WifiLink};

/// Pause before each reconnect attempt.
const RECONNECT_DELAY_MS: u64 = 5000;

/// Whether the station currently holds a DHCP lease.
pub static LINK_UP: AtomicBool = AtomicBool::new(false);

pub fn link_up() -> bool {
    LINK_UP.load(Ordering::Relaxed)
}

fn client_config(config: &Config<'_>) -> ModeConfig {
    let auth = if config.internet.password.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::Wpa2Personal
    };
    ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(String::from(config.internet.ssid))
            .with_password(String::from(config.internet.password))
            .with_auth_method(auth),
    )
}

/// Establish the Wi-Fi connection and reconnect on loss
///
/// Gives up, and leaves the radio idle, once `max_wifi_retries` reconnects in
/// a row have failed.
#[embassy_executor::task]
pub async fn wifi_connection(
    mut controller: WifiController<'static>,
    stack: Stack<'static>,
    config: Config<'static>,
) {
    info!("'wifi_connection' task has been started");
    let timeout = Duration::from_secs(config.station.wifi_connect_timeout_secs.into());
    let mut link = WifiLink::new(config.station.max_wifi_retries);

    if let Err(e) = controller.set_config(&client_config(&config)) {
        error!("Failed to apply Wi-Fi client config: {:?}", e);
        return;
    }
    if let Err(e) = controller.start_async().await {
        error!("Failed to start Wi-Fi station: {:?}", e);
        return;
    }
    info!("Wi-Fi station started, joining '{}'", config.internet.ssid);
    let mut action = link.handle(LinkEvent::Started);

    loop {
        match action {
            LinkAction::Connect => {
                if let LinkState::Connecting { attempt } = link.state()
                    && attempt > 1
                {
                    Timer::after_millis(RECONNECT_DELAY_MS).await;
                }
                action = match with_timeout(timeout, controller.connect_async()).await {
                    Ok(Ok(())) => match with_timeout(timeout, stack.wait_config_up()).await {
                        Ok(()) => match stack.config_v4() {
                            Some(v4) => link.handle(LinkEvent::GotIp(v4.address.address())),
                            None => link.handle(LinkEvent::Disconnected),
                        },
                        Err(_) => {
                            warn!("{} waiting for DHCP", LinkError::Timeout);
                            link.handle(LinkEvent::Disconnected)
                        }
                    },
                    Ok(Err(e)) => {
                        warn!("Failed to connect to Wi-Fi: {:?}", e);
                        link.handle(LinkEvent::Disconnected)
                    }
                    Err(_) => {
                        warn!("{}", LinkError::Timeout);
                        link.handle(LinkEvent::Disconnected)
                    }
                };
            }
            LinkAction::Wait => {
                LINK_UP.store(true, Ordering::Relaxed);
                controller.wait_for_event(WifiEvent::StaDisconnected).await;
                LINK_UP.store(false, Ordering::Relaxed);
                action = link.handle(LinkEvent::Disconnected);
            }
            LinkAction::GiveUp => {
                if let Err(e) = link.check() {
                    error!("{}, Wi-Fi disabled until reboot", e);
                }
                return;
            }
        }
    }
}

/// Run the networking device
#[embassy_executor::task]
pub async fn net_runner(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
