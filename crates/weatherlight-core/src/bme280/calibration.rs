//! BME280 factory calibration coefficients.
//!
//! The trimming parameters live in two non-contiguous register blocks
//! (0x88–0xA1 and 0xE1–0xE7, datasheet section 4.2.2). They are read once per
//! device session and never change afterwards.


use super::registers::{CALIB_BLOCK1_LEN, CALIB_BLOCK2_LEN, Register};
use super::transport::RegisterTransport;

/// Factory-trimmed calibration coefficients (`dig_T*`, `dig_P*`, `dig_H*`).
///
/// Field widths follow the datasheet's compensation parameter table. `dig_h4`
/// and `dig_h5` are 12-bit two's complement values widened to `i16`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CalibrationData {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

impl CalibrationData {
    /// Reads both calibration blocks from the device and parses them.
    ///
    /// Either read failing aborts the load; no partially populated
    /// calibration is ever returned.
    pub fn load<T: RegisterTransport>(transport: &mut T) -> Result<Self, T::Error> {
        let mut block1 = [0u8; CALIB_BLOCK1_LEN];
        transport.read_registers(Register::CalibT1.addr(), &mut block1)?;

        let mut block2 = [0u8; CALIB_BLOCK2_LEN];
        transport.read_registers(Register::CalibH2.addr(), &mut block2)?;

        Ok(Self::from_blocks(&block1, &block2))
    }

    /// Parses the raw register blocks read from 0x88 and 0xE1.
    pub fn from_blocks(block1: &[u8; CALIB_BLOCK1_LEN], block2: &[u8; CALIB_BLOCK2_LEN]) -> Self {
        let le_u16 = |i: usize| u16::from_le_bytes([block1[i], block1[i + 1]]);
        let le_i16 = |i: usize| i16::from_le_bytes([block1[i], block1[i + 1]]);

        // 0xE4 holds dig_H4[11:4], 0xE5 is shared: [3:0] -> dig_H4, [7:4] -> dig_H5,
        // 0xE6 holds dig_H5[11:4].
        let h4 = ((block2[3] as u16) << 4) | (block2[4] & 0x0F) as u16;
        let h5 = ((block2[5] as u16) << 4) | (block2[4] >> 4) as u16;

        Self {
            dig_t1: le_u16(0),
            dig_t2: le_i16(2),
            dig_t3: le_i16(4),
            dig_p1: le_u16(6),
            dig_p2: le_i16(8),
            dig_p3: le_i16(10),
            dig_p4: le_i16(12),
            dig_p5: le_i16(14),
            dig_p6: le_i16(16),
            dig_p7: le_i16(18),
            dig_p8: le_i16(20),
            dig_p9: le_i16(22),
            // block1[24] (0xA0) is reserved
            dig_h1: block1[25],
            dig_h2: i16::from_le_bytes([block2[0], block2[1]]),
            dig_h3: block2[2],
            dig_h4: sign_extend_12(h4),
            dig_h5: sign_extend_12(h5),
            dig_h6: block2[6] as i8,
        }
    }
}

/// Widens a 12-bit two's complement value to `i16`.
fn sign_extend_12(value: u16) -> i16 {
    if value & 0x0800 != 0 {
        (value | 0xF000) as i16
    } else {
        value as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bme280::test_support::{HUMIDITY_BLOCK2, datasheet_block1};

    #[test]
    fn test_parse_temperature_and_pressure_words() {
        let calib = CalibrationData::from_blocks(&datasheet_block1(), &[0; CALIB_BLOCK2_LEN]);

        assert_eq!(calib.dig_t1, 27504);
        assert_eq!(calib.dig_t2, 26435);
        assert_eq!(calib.dig_t3, -1000);
        assert_eq!(calib.dig_p1, 36477);
        assert_eq!(calib.dig_p2, -10685);
        assert_eq!(calib.dig_p3, 3024);
        assert_eq!(calib.dig_p4, 2855);
        assert_eq!(calib.dig_p5, 140);
        assert_eq!(calib.dig_p6, -7);
        assert_eq!(calib.dig_p7, 15500);
        assert_eq!(calib.dig_p8, -14600);
        assert_eq!(calib.dig_p9, 6000);
        assert_eq!(calib.dig_h1, 75);
    }

    #[test]
    fn test_parse_humidity_positive_nibbles() {
        let calib = CalibrationData::from_blocks(&datasheet_block1(), &HUMIDITY_BLOCK2);

        assert_eq!(calib.dig_h2, 362);
        assert_eq!(calib.dig_h3, 0);
        assert_eq!(calib.dig_h4, 313);
        assert_eq!(calib.dig_h5, 50);
        assert_eq!(calib.dig_h6, 30);
    }

    #[test]
    fn test_parse_humidity_sign_extension() {
        // 0xE4 = 0x8F, 0xE5 = 0x1F, 0xE6 = 0x80
        // dig_H4 = 0x8F << 4 | 0xF = 0x8FF -> 0xF8FF
        // dig_H5 = 0x80 << 4 | 0x1 = 0x801 -> 0xF801
        let block2 = [0x00, 0x80, 0xFF, 0x8F, 0x1F, 0x80, 0xF6];
        let calib = CalibrationData::from_blocks(&datasheet_block1(), &block2);

        assert_eq!(calib.dig_h4, 0xF8FFu16 as i16);
        assert_eq!(calib.dig_h4, -1793);
        assert_eq!(calib.dig_h5, 0xF801u16 as i16);
        assert_eq!(calib.dig_h5, -2047);
        assert_eq!(calib.dig_h2, i16::MIN);
        assert_eq!(calib.dig_h3, 0xFF);
        assert_eq!(calib.dig_h6, -10);
    }

    #[test]
    fn test_sign_extend_boundaries() {
        assert_eq!(sign_extend_12(0x7FF), 2047);
        assert_eq!(sign_extend_12(0x800), -2048);
        assert_eq!(sign_extend_12(0xFFF), -1);
        assert_eq!(sign_extend_12(0x000), 0);
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let first = CalibrationData::from_blocks(&datasheet_block1(), &HUMIDITY_BLOCK2);
        let second = CalibrationData::from_blocks(&datasheet_block1(), &HUMIDITY_BLOCK2);
        assert_eq!(first, second);
    }
}
