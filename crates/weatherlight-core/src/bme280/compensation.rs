//! Fixed-point compensation formulas (BME280 datasheet, section 4.2.3).
//!
//! These are the reference integer algorithms reproduced operation for
//! operation. Temperature and humidity use 32-bit signed arithmetic, pressure
//! uses 64-bit. Reordering or widening intermediate terms changes rounding, so
//! the expressions below intentionally mirror the datasheet layout.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::calibration::CalibrationData;

/// Upper clamp of the humidity intermediate, 100 %RH in Q22.10 before `>> 12`.
pub const HUMIDITY_MAX_RAW: i32 = 419_430_400;

/// Fine temperature carried from temperature compensation into the pressure
/// and humidity formulas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TFine(pub i32);

/// Raw ADC values from one 8-byte burst read at 0xF7.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSample {
    /// 20-bit pressure ADC value (adc_P)
    pub pressure: u32,
    /// 20-bit temperature ADC value (adc_T)
    pub temperature: u32,
    /// 16-bit humidity ADC value (adc_H)
    pub humidity: u16,
}

impl RawSample {
    /// Assembles the ADC values from `press_msb..hum_lsb`.
    pub fn from_burst(data: &[u8; 8]) -> Self {
        let adc20 = |msb: u8, lsb: u8, xlsb: u8| {
            ((msb as u32) << 12) | ((lsb as u32) << 4) | ((xlsb as u32) >> 4)
        };
        Self {
            pressure: adc20(data[0], data[1], data[2]),
            temperature: adc20(data[3], data[4], data[5]),
            humidity: u16::from_be_bytes([data[6], data[7]]),
        }
    }
}

/// One compensated measurement in physical units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Degrees Celsius
    pub temperature: f32,
    /// Pascals
    pub pressure: f32,
    /// Percent relative humidity
    pub humidity: f32,
}

impl Reading {
    pub fn pressure_hpa(&self) -> f32 {
        self.pressure / 100.0
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} °C, {:.2} hPa, {:.2} %RH",
            self.temperature,
            self.pressure_hpa(),
            self.humidity
        )
    }
}

/// Returns `t_fine` and the temperature in hundredths of a degree Celsius
/// (5123 = 51.23 °C).
pub fn compensate_temperature(calib: &CalibrationData, adc_t: u32) -> (TFine, i32) {
    let adc_t = adc_t as i32;
    let t1 = calib.dig_t1 as i32;

    let var1 = (((adc_t >> 3) - (t1 << 1)) * (calib.dig_t2 as i32)) >> 11;
    let var2 = (((((adc_t >> 4) - t1) * ((adc_t >> 4) - t1)) >> 12) * (calib.dig_t3 as i32)) >> 14;

    let t_fine = var1 + var2;
    let centi_celsius = (t_fine * 5 + 128) >> 8;
    (TFine(t_fine), centi_celsius)
}

/// Returns pressure in Pa as unsigned Q24.8 (24674867 = 96386.2 Pa).
///
/// Yields 0 when the leading divisor term vanishes, which only happens with
/// invalid calibration.
pub fn compensate_pressure(calib: &CalibrationData, adc_p: u32, t_fine: TFine) -> u32 {
    let adc_p = adc_p as i64;

    let mut var1 = (t_fine.0 as i64) - 128000;
    let mut var2 = var1 * var1 * (calib.dig_p6 as i64);
    var2 += (var1 * (calib.dig_p5 as i64)) << 17;
    var2 += (calib.dig_p4 as i64) << 35;
    var1 = ((var1 * var1 * (calib.dig_p3 as i64)) >> 8) + ((var1 * (calib.dig_p2 as i64)) << 12);
    var1 = (((1i64 << 47) + var1) * (calib.dig_p1 as i64)) >> 33;

    if var1 == 0 {
        return 0;
    }

    let mut p = 1048576 - adc_p;
    p = (((p << 31) - var2) * 3125) / var1;
    var1 = ((calib.dig_p9 as i64) * (p >> 13) * (p >> 13)) >> 25;
    var2 = ((calib.dig_p8 as i64) * p) >> 19;
    p = ((p + var1 + var2) >> 8) + ((calib.dig_p7 as i64) << 4);

    p as u32
}

/// Returns relative humidity as unsigned Q22.10 (47445 = 46.333 %RH).
pub fn compensate_humidity(calib: &CalibrationData, adc_h: u16, t_fine: TFine) -> u32 {
    let adc_h = adc_h as i32;
    let h1 = calib.dig_h1 as i32;
    let h2 = calib.dig_h2 as i32;
    let h3 = calib.dig_h3 as i32;
    let h4 = calib.dig_h4 as i32;
    let h5 = calib.dig_h5 as i32;
    let h6 = calib.dig_h6 as i32;

    let mut v_x1 = t_fine.0 - 76800;
    v_x1 = ((((adc_h << 14) - (h4 << 20) - (h5 * v_x1)) + 16384) >> 15)
        * (((((((v_x1 * h6) >> 10) * (((v_x1 * h3) >> 11) + 32768)) >> 10) + 2097152) * h2
            + 8192)
            >> 14);
    v_x1 -= ((((v_x1 >> 15) * (v_x1 >> 15)) >> 7) * h1) >> 4;
    v_x1 = v_x1.clamp(0, HUMIDITY_MAX_RAW);

    (v_x1 >> 12) as u32
}

/// Runs all three formulas on one raw sample.
pub fn compensate(calib: &CalibrationData, raw: &RawSample) -> Reading {
    let (t_fine, centi_celsius) = compensate_temperature(calib, raw.temperature);
    let pressure = compensate_pressure(calib, raw.pressure, t_fine);
    let humidity = compensate_humidity(calib, raw.humidity, t_fine);

    Reading {
        temperature: centi_celsius as f32 / 100.0,
        pressure: pressure as f32 / 256.0,
        humidity: humidity as f32 / 1024.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bme280::test_support::{DATASHEET_BURST, DATASHEET_CALIBRATION};

    const ADC_T: u32 = 519888;
    const ADC_P: u32 = 415148;

    #[test]
    fn test_datasheet_temperature_example() {
        let (t_fine, centi) = compensate_temperature(&DATASHEET_CALIBRATION, ADC_T);
        assert_eq!(t_fine, TFine(128422));
        assert_eq!(centi, 2508);
    }

    #[test]
    fn test_datasheet_pressure_example() {
        let (t_fine, _) = compensate_temperature(&DATASHEET_CALIBRATION, ADC_T);
        let q24_8 = compensate_pressure(&DATASHEET_CALIBRATION, ADC_P, t_fine);
        assert_eq!(q24_8, 25767233);

        let pascals = q24_8 as f32 / 256.0;
        assert!((pascals - 100653.27).abs() < 0.1, "pressure was {pascals}");
    }

    #[test]
    fn test_humidity_mid_range() {
        let (t_fine, _) = compensate_temperature(&DATASHEET_CALIBRATION, ADC_T);

        assert_eq!(compensate_humidity(&DATASHEET_CALIBRATION, 30000, t_fine), 56317);
        assert_eq!(compensate_humidity(&DATASHEET_CALIBRATION, 27000, t_fine), 39190);
        assert_eq!(compensate_humidity(&DATASHEET_CALIBRATION, 35000, t_fine), 84675);
    }

    #[test]
    fn test_humidity_clamps_high() {
        let (t_fine, _) = compensate_temperature(&DATASHEET_CALIBRATION, ADC_T);

        // Pre-clamp intermediates are 913229963 and 1035415128
        for adc_h in [60000, u16::MAX] {
            let q22_10 = compensate_humidity(&DATASHEET_CALIBRATION, adc_h, t_fine);
            assert_eq!(q22_10, (HUMIDITY_MAX_RAW >> 12) as u32);
            assert_eq!(q22_10 as f32 / 1024.0, 100.0);
        }
    }

    #[test]
    fn test_humidity_clamps_low() {
        let (t_fine, _) = compensate_temperature(&DATASHEET_CALIBRATION, ADC_T);

        // Pre-clamp intermediate is -486364973
        let q22_10 = compensate_humidity(&DATASHEET_CALIBRATION, 0, t_fine);
        assert_eq!(q22_10, 0);
    }

    #[test]
    fn test_pressure_zero_divisor_returns_zero() {
        let calib = CalibrationData {
            dig_p1: 0,
            ..DATASHEET_CALIBRATION
        };
        let (t_fine, _) = compensate_temperature(&calib, ADC_T);

        assert_eq!(compensate_pressure(&calib, ADC_P, t_fine), 0);
        assert_eq!(compensate_pressure(&calib, 0, TFine(0)), 0);
    }

    #[test]
    fn test_compensate_full_reading() {
        let raw = RawSample {
            pressure: ADC_P,
            temperature: ADC_T,
            humidity: 30000,
        };
        let reading = compensate(&DATASHEET_CALIBRATION, &raw);

        assert!((reading.temperature - 25.08).abs() < 1e-4);
        assert!((reading.pressure - 100653.25).abs() < 0.01);
        assert!((reading.humidity - 54.997_07).abs() < 1e-4);
        assert_eq!(reading, compensate(&DATASHEET_CALIBRATION, &raw));
    }

    #[test]
    fn test_raw_sample_from_burst() {
        let raw = RawSample::from_burst(&DATASHEET_BURST);

        assert_eq!(raw.pressure, ADC_P);
        assert_eq!(raw.temperature, ADC_T);
        assert_eq!(raw.humidity, 30000);
    }

    #[test]
    fn test_raw_sample_ignores_xlsb_low_nibble() {
        let raw = RawSample::from_burst(&[0xFF, 0xFF, 0xFF, 0x80, 0x00, 0x0F, 0xFF, 0xFF]);

        assert_eq!(raw.pressure, 0xFFFFF);
        assert_eq!(raw.temperature, 0x80000);
        assert_eq!(raw.humidity, u16::MAX);
    }

    #[test]
    fn test_reading_display() {
        let reading = Reading {
            temperature: 25.08,
            pressure: 100653.25,
            humidity: 54.997,
        };
        assert_eq!(reading.to_string(), "25.08 °C, 1006.53 hPa, 55.00 %RH");
    }
}
