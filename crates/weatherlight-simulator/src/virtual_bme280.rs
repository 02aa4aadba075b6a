//! A BME280 that lives in memory and answers on the I²C bus.
//!
//! Register pointer semantics follow the real part: a write sets the pointer
//! and stores any following bytes, a read auto-increments from the pointer.
//! Writing forced mode to ctrl_meas latches a fresh synthetic sample into the
//! data registers and drops back to sleep.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use log::debug;

use weatherlight_core::bme280::CalibrationData;
use weatherlight_core::bme280::registers::{BME280_CHIP_ID, Register};

/// Coefficients from the BMP280 datasheet example plus a typical humidity set.
pub const CALIBRATION: CalibrationData = CalibrationData {
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

const MODE_MASK: u8 = 0b11;
const MODE_FORCED: u8 = 0b01;

pub struct VirtualBme280 {
    address: u8,
    registers: [u8; 256],
    pointer: u8,
    conversions: u32,
    /// Every n-th transaction NACKs, 0 disables fault injection
    fail_every: u32,
    transactions: u32,
}

impl VirtualBme280 {
    pub fn new(address: u8) -> Self {
        let mut registers = [0u8; 256];
        registers[Register::Id.addr() as usize] = BME280_CHIP_ID;
        write_calibration(&mut registers, &CALIBRATION);
        Self {
            address,
            registers,
            pointer: 0,
            conversions: 0,
            fail_every: 0,
            transactions: 0,
        }
    }

    pub fn with_fault_every(mut self, n: u32) -> Self {
        self.fail_every = n;
        self
    }

    pub fn conversions(&self) -> u32 {
        self.conversions
    }

    pub fn register(&self, address: u8) -> u8 {
        self.registers[address as usize]
    }

    fn store(&mut self, value: u8) {
        let reg = self.pointer;
        self.registers[reg as usize] = value;
        self.pointer = self.pointer.wrapping_add(1);

        if reg == Register::CtrlMeas.addr() && value & MODE_MASK == MODE_FORCED {
            self.convert();
            self.registers[reg as usize] = value & !MODE_MASK;
        }
    }

    /// Synthesizes raw ADC values drifting slowly around a mild indoor climate.
    fn convert(&mut self) {
        let t = self.conversions as f32;
        let adc_t = (519_888.0 + 3000.0 * (t / 12.0).sin()) as u32;
        let adc_p = (415_148.0 + 2000.0 * (t / 30.0).cos()) as u32;
        let adc_h = (30_000.0 + 3000.0 * (t / 18.0).sin()) as u16;
        self.conversions += 1;
        debug!(
            "virtual conversion #{}: adc_T={} adc_P={} adc_H={}",
            self.conversions, adc_t, adc_p, adc_h
        );

        let base = Register::PressMsb.addr() as usize;
        let burst = &mut self.registers[base..base + 8];
        burst[0] = (adc_p >> 12) as u8;
        burst[1] = (adc_p >> 4) as u8;
        burst[2] = ((adc_p & 0x0F) << 4) as u8;
        burst[3] = (adc_t >> 12) as u8;
        burst[4] = (adc_t >> 4) as u8;
        burst[5] = ((adc_t & 0x0F) << 4) as u8;
        burst[6..8].copy_from_slice(&adc_h.to_be_bytes());
    }
}

/// Lays the coefficients out the way the factory trims them into NVM.
fn write_calibration(registers: &mut [u8; 256], c: &CalibrationData) {
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
    let block1 = Register::CalibT1.addr() as usize;
    for (i, word) in words.iter().enumerate() {
        let at = block1 + i * 2;
        registers[at..at + 2].copy_from_slice(&word.to_le_bytes());
    }
    registers[block1 + 25] = c.dig_h1;

    let block2 = Register::CalibH2.addr() as usize;
    let (h4, h5) = (c.dig_h4 as u16, c.dig_h5 as u16);
    registers[block2..block2 + 2].copy_from_slice(&c.dig_h2.to_le_bytes());
    registers[block2 + 2] = c.dig_h3;
    registers[block2 + 3] = (h4 >> 4) as u8;
    registers[block2 + 4] = ((h4 & 0x0F) | ((h5 & 0x0F) << 4)) as u8;
    registers[block2 + 5] = (h5 >> 4) as u8;
    registers[block2 + 6] = c.dig_h6 as u8;
}

impl ErrorType for VirtualBme280 {
    type Error = ErrorKind;
}

impl I2c for VirtualBme280 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        self.transactions += 1;
        if self.fail_every != 0 && self.transactions % self.fail_every == 0 {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
        }

        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if let Some((&reg, values)) = bytes.split_first() {
                        self.pointer = reg;
                        for &value in values {
                            self.store(value);
                        }
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.registers[self.pointer as usize];
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}
