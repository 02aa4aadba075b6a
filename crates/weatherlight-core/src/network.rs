//! Wi-Fi station association state machine.
//!
//! Pure bookkeeping: the firmware feeds it radio/DHCP events and carries out
//! the returned [`LinkAction`]. Keeping it free of radio types lets the retry
//! policy be tested on the host.

use core::net::Ipv4Addr;

use log::{error, info, warn};
use thiserror_no_std::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    /// Waiting on connection attempt number `attempt` (1-based)
    Connecting { attempt: u16 },
    Connected { ip: Ipv4Addr },
    Failed { attempts: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// The station interface came up
    Started,
    /// Association lost or a connection attempt failed
    Disconnected,
    /// DHCP handed out an address
    GotIp(Ipv4Addr),
}

/// What the caller should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Connect,
    Wait,
    GiveUp,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    #[error("Wi-Fi connection failed after {0} attempts")]
    RetriesExhausted(u16),
    #[error("Wi-Fi connection timed out")]
    Timeout,
}

pub struct WifiLink {
    state: LinkState,
    max_retries: u8,
    retries: u8,
}

impl WifiLink {
    pub const fn new(max_retries: u8) -> Self {
        Self {
            state: LinkState::Idle,
            max_retries,
            retries: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, LinkState::Connected { .. })
    }

    pub fn ip(&self) -> Option<Ipv4Addr> {
        match self.state {
            LinkState::Connected { ip } => Some(ip),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: LinkEvent) -> LinkAction {
        match event {
            LinkEvent::Started => {
                self.retries = 0;
                self.state = LinkState::Connecting { attempt: 1 };
                LinkAction::Connect
            }
            LinkEvent::Disconnected => {
                if matches!(self.state, LinkState::Failed { .. }) {
                    return LinkAction::GiveUp;
                }
                if self.retries < self.max_retries {
                    self.retries += 1;
                    self.state = LinkState::Connecting {
                        attempt: self.attempts(),
                    };
                    warn!(
                        "Wi-Fi connection lost, retry {}/{}",
                        self.retries, self.max_retries
                    );
                    LinkAction::Connect
                } else {
                    let attempts = self.attempts();
                    self.state = LinkState::Failed { attempts };
                    error!("Wi-Fi connection failed after {} attempts", attempts);
                    LinkAction::GiveUp
                }
            }
            LinkEvent::GotIp(ip) => {
                self.retries = 0;
                self.state = LinkState::Connected { ip };
                info!("Wi-Fi connected, IP address {}", ip);
                LinkAction::Wait
            }
        }
    }

    /// The first connect plus every retry so far.
    fn attempts(&self) -> u16 {
        u16::from(self.retries) + 1
    }

    /// Outcome of a connect attempt as an error, for callers waiting on it.
    pub fn check(&self) -> Result<(), LinkError> {
        match self.state {
            LinkState::Failed { attempts } => Err(LinkError::RetriesExhausted(attempts)),
            _ => Ok(()),
        }
    }
}
