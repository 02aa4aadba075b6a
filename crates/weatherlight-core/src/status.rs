//! Periodic station status, as logged and as sent over the wire.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::bme280::Reading;

/// Upper bound on an encoded [`StatusReport`] frame.
pub const MAX_FRAME_LEN: usize = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub uptime_secs: u64,
    pub link_up: bool,
    /// Latest acquisition, `None` until the first one succeeds
    pub reading: Option<Reading>,
    /// Acquisitions failed in a row since the last good one
    pub consecutive_failures: u32,
}

impl StatusReport {
    /// Folds the outcome of one acquisition into the report.
    ///
    /// A failure keeps the previous reading around so the station still has
    /// something to show.
    pub fn record<E>(&mut self, outcome: &Result<Reading, E>) {
        match outcome {
            Ok(reading) => {
                self.reading = Some(*reading);
                self.consecutive_failures = 0;
            }
            Err(_) => self.consecutive_failures = self.consecutive_failures.saturating_add(1),
        }
    }

    pub fn encode<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], postcard::Error> {
        postcard::to_slice(self, buf)
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "up {}s, wifi {}, ",
            self.uptime_secs,
            if self.link_up { "up" } else { "down" }
        )?;
        match &self.reading {
            Some(reading) => write!(f, "{}", reading)?,
            None => f.write_str("no reading")?,
        }
        if self.consecutive_failures > 0 {
            write!(f, " ({} failed)", self.consecutive_failures)?;
        }
        Ok(())
    }
}
