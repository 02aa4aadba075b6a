//! Shared fixtures for the driver tests.

use embedded_hal::delay::DelayNs;

use super::calibration::CalibrationData;
use super::registers::CALIB_BLOCK1_LEN;
use super::transport::RegisterTransport;

/// BMP280 datasheet example coefficients (section 3.12) with a typical BME280
/// humidity set.
pub const DATASHEET_CALIBRATION: CalibrationData = CalibrationData {
    dig_t1: 27504,
    dig_t2: 26435,
    dig_t3: -1000,
    dig_p1: 36477,
    dig_p2: -10685,
    dig_p3: 3024,
    dig_p4: 2855,
    dig_p5: 140,
    dig_p6: -7,
    dig_p7: 15500,
    dig_p8: -14600,
    dig_p9: 6000,
    dig_h1: 75,
    dig_h2: 362,
    dig_h3: 0,
    dig_h4: 313,
    dig_h5: 50,
    dig_h6: 30,
};

/// 0xE1..=0xE7 for dig_H2 = 362, dig_H3 = 0, dig_H4 = 313, dig_H5 = 50, dig_H6 = 30.
pub const HUMIDITY_BLOCK2: [u8; 7] = [0x6A, 0x01, 0x00, 0x13, 0x29, 0x03, 0x1E];

/// 0xF7..=0xFE for adc_P = 415148, adc_T = 519888, adc_H = 30000.
pub const DATASHEET_BURST: [u8; 8] = [0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x75, 0x30];

/// 0x88..=0xA1 for the datasheet temperature/pressure words and dig_H1 = 75.
pub fn datasheet_block1() -> [u8; CALIB_BLOCK1_LEN] {
    let c = DATASHEET_CALIBRATION;
    let words = [
        c.dig_t1,
        c.dig_t2 as u16,
        c.dig_t3 as u16,
        c.dig_p1,
        c.dig_p2 as u16,
        c.dig_p3 as u16,
        c.dig_p4 as u16,
        c.dig_p5 as u16,
        c.dig_p6 as u16,
        c.dig_p7 as u16,
        c.dig_p8 as u16,
        c.dig_p9 as u16,
    ];
    let mut block = [0u8; CALIB_BLOCK1_LEN];
    for (i, word) in words.iter().enumerate() {
        block[i * 2..i * 2 + 2].copy_from_slice(&word.to_le_bytes());
    }
    block[25] = c.dig_h1;
    block
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusOp {
    Read(u8, usize),
    Write(u8, u8),
}

/// In-memory register file that records every transaction.
///
/// Errors carry the register address that failed.
pub struct StubTransport {
    pub registers: [u8; 256],
    pub ops: Vec<BusOp>,
    pub fail_on: Option<u8>,
}

impl StubTransport {
    /// A BME280 holding the datasheet calibration and sample.
    pub fn bme280() -> Self {
        let mut registers = [0u8; 256];
        registers[0x88..0x88 + CALIB_BLOCK1_LEN].copy_from_slice(&datasheet_block1());
        registers[0xE1..0xE8].copy_from_slice(&HUMIDITY_BLOCK2);
        registers[0xF7..0xFF].copy_from_slice(&DATASHEET_BURST);
        registers[0xD0] = 0x60;
        Self {
            registers,
            ops: Vec::new(),
            fail_on: None,
        }
    }

    pub fn set_register(&mut self, address: u8, value: u8) {
        self.registers[address as usize] = value;
    }

    pub fn call_count(&self) -> usize {
        self.ops.len()
    }
}

impl RegisterTransport for StubTransport {
    type Error = u8;

    fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> Result<(), u8> {
        self.ops.push(BusOp::Read(start, buf.len()));
        if self.fail_on == Some(start) {
            return Err(start);
        }
        let start = start as usize;
        buf.copy_from_slice(&self.registers[start..start + buf.len()]);
        Ok(())
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), u8> {
        self.ops.push(BusOp::Write(address, value));
        if self.fail_on == Some(address) {
            return Err(address);
        }
        // Data and reset registers are not backed by memory
        if !matches!(address, 0xE0 | 0xF7..=0xFE) {
            self.registers[address as usize] = value;
        }
        Ok(())
    }
}

/// Delay that only adds up how long it was asked to wait.
#[derive(Default)]
pub struct RecordingDelay {
    pub total_us: u64,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_us += u64::from(ns / 1000);
    }

    fn delay_us(&mut self, us: u32) {
        self.total_us += u64::from(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_us += u64::from(ms) * 1000;
    }
}
