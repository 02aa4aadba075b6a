//! Register-level access to the sensor.
//!
//! The driver only ever needs "read N registers from here" and "write one
//! register". Anything that can do that (a real I²C peripheral, a mux channel,
//! a simulated device, a test stub) plugs in through [`RegisterTransport`].

use core::fmt::Debug;

use embedded_hal::i2c::{I2c, SevenBitAddress};

/// Byte-level register access over an addressed serial bus.
///
/// Implementations own addressing, bus speed and timeouts. Errors are passed
/// through the driver unchanged.
pub trait RegisterTransport {
    type Error: Debug;

    /// Burst-reads `buf.len()` consecutive registers starting at `start`.
    fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes a single register.
    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error>;
}

/// BME280 I²C slave address, selected by the SDO pin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceAddress {
    /// SDO tied to GND (0x76)
    #[default]
    Primary,
    /// SDO tied to VDDIO (0x77)
    Secondary,
}

impl DeviceAddress {
    pub const fn addr(self) -> SevenBitAddress {
        match self {
            Self::Primary => 0x76,
            Self::Secondary => 0x77,
        }
    }
}

/// [`RegisterTransport`] over any blocking `embedded-hal` I²C bus.
pub struct I2cTransport<I> {
    i2c: I,
    address: SevenBitAddress,
}

impl<I: I2c> I2cTransport<I> {
    pub fn new(i2c: I, address: DeviceAddress) -> Self {
        Self {
            i2c,
            address: address.addr(),
        }
    }

    /// Gives the bus back.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterTransport for I2cTransport<I> {
    type Error = I::Error;

    fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[start], buf)
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[address, value])
    }
}
