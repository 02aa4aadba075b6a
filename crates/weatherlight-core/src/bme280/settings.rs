//! Oversampling, filter and standby configuration (datasheet sections 3.4–3.6, 5.4).

/// Oversampling setting shared by `osrs_h`, `osrs_t` and `osrs_p`.
///
/// | Variant   | Code | Samples averaged |
/// |-----------|------|------------------|
/// | `Skipped` | 000  | 0 (output 0x8000 / 0x80000) |
/// | `X1`      | 001  | 1                |
/// | `X2`      | 010  | 2                |
/// | `X4`      | 011  | 4                |
/// | `X8`      | 100  | 8                |
/// | `X16`     | 101  | 16               |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Oversampling {
    Skipped = 0b000,
    #[default]
    X1 = 0b001,
    X2 = 0b010,
    X4 = 0b011,
    X8 = 0b100,
    X16 = 0b101,
}

impl Oversampling {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Number of conversions averaged for one output sample.
    pub const fn factor(self) -> u32 {
        match self {
            Self::Skipped => 0,
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X4 => 4,
            Self::X8 => 8,
            Self::X16 => 16,
        }
    }
}

/// IIR filter coefficient (filter[2:0] in `config`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum IirFilter {
    #[default]
    Off = 0b000,
    X2 = 0b001,
    X4 = 0b010,
    X8 = 0b011,
    X16 = 0b100,
}

/// Inactive duration between normal-mode conversions (t_sb[2:0] in `config`).
///
/// Has no effect in forced mode but is written so the register holds a known
/// value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum StandbyTime {
    #[default]
    Ms0_5 = 0b000,
    Ms62_5 = 0b001,
    Ms125 = 0b010,
    Ms250 = 0b011,
    Ms500 = 0b100,
    Ms1000 = 0b101,
    Ms10 = 0b110,
    Ms20 = 0b111,
}

/// Sensor power mode (mode[1:0] in `ctrl_meas`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PowerMode {
    Sleep = 0b00,
    Forced = 0b01,
}

/// Everything written by [`Bme280::configure`](super::Bme280::configure).
///
/// The default is temperature ×1, pressure ×16, humidity ×1, filter off,
/// 0.5 ms standby: `ctrl_hum = 0x01`, `ctrl_meas = 0x35` when triggering,
/// `config = 0x00`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    pub humidity: Oversampling,
    pub temperature: Oversampling,
    pub pressure: Oversampling,
    pub filter: IirFilter,
    pub standby: StandbyTime,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            humidity: Oversampling::X1,
            temperature: Oversampling::X1,
            pressure: Oversampling::X16,
            filter: IirFilter::Off,
            standby: StandbyTime::Ms0_5,
        }
    }
}

impl Settings {
    pub fn with_humidity(mut self, osrs: Oversampling) -> Self {
        self.humidity = osrs;
        self
    }

    pub fn with_temperature(mut self, osrs: Oversampling) -> Self {
        self.temperature = osrs;
        self
    }

    pub fn with_pressure(mut self, osrs: Oversampling) -> Self {
        self.pressure = osrs;
        self
    }

    pub fn with_filter(mut self, filter: IirFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_standby(mut self, standby: StandbyTime) -> Self {
        self.standby = standby;
        self
    }

    /// Value for `ctrl_hum` (0xF2).
    pub const fn ctrl_hum(&self) -> u8 {
        self.humidity.bits()
    }

    /// Value for `ctrl_meas` (0xF4) in the given power mode.
    pub const fn ctrl_meas(&self, mode: PowerMode) -> u8 {
        (self.temperature.bits() << 5) | (self.pressure.bits() << 2) | mode as u8
    }

    /// Value for `config` (0xF5), 3-wire SPI disabled.
    pub const fn config(&self) -> u8 {
        ((self.standby as u8) << 5) | ((self.filter as u8) << 2)
    }

    /// Worst-case duration of one forced-mode conversion in microseconds
    /// (datasheet appendix B, t_measure,max).
    pub const fn max_measurement_time_us(&self) -> u32 {
        let mut t = 1250 + 2300 * self.temperature.factor();
        if self.pressure.factor() > 0 {
            t += 2300 * self.pressure.factor() + 575;
        }
        if self.humidity.factor() > 0 {
            t += 2300 * self.humidity.factor() + 575;
        }
        t
    }

    /// Temperature feeds `t_fine`; without it nothing can be compensated.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.temperature == Oversampling::Skipped {
            return Err("temperature oversampling cannot be skipped");
        }
        Ok(())
    }
}
