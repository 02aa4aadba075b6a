/// BME280 register map (Bosch Sensortec BME280 datasheet, section 5.3).
///
/// Only the registers the driver touches are listed. All addresses are 8-bit;
/// burst reads auto-increment the register pointer.
///
/// | Register   | Address | Width | Contents                                  |
/// |------------|---------|-------|-------------------------------------------|
/// | `Id`       | 0xD0    | 1     | Chip identification, `0x60` for a BME280  |
/// | `Reset`    | 0xE0    | 1     | Soft reset when written with `0xB6`       |
/// | `CtrlHum`  | 0xF2    | 1     | osrs_h[2:0]                               |
/// | `CtrlMeas` | 0xF4    | 1     | osrs_t[7:5], osrs_p[4:2], mode[1:0]       |
/// | `Config`   | 0xF5    | 1     | t_sb[7:5], filter[4:2], spi3w_en[0]       |
/// | `PressMsb` | 0xF7    | 8     | press[3], temp[3], hum[2] burst           |
/// | `CalibT1`  | 0x88    | 26    | dig_T1..dig_P9, reserved, dig_H1          |
/// | `CalibH2`  | 0xE1    | 7     | dig_H2..dig_H6                            |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    CalibT1 = 0x88,
    Id = 0xD0,
    Reset = 0xE0,
    CalibH2 = 0xE1,
    CtrlHum = 0xF2,
    CtrlMeas = 0xF4,
    Config = 0xF5,
    PressMsb = 0xF7,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Value of the `Id` register on a genuine BME280.
pub const BME280_CHIP_ID: u8 = 0x60;

/// Writing this to `Reset` runs the complete power-on-reset procedure.
pub const SOFT_RESET_COMMAND: u8 = 0xB6;

/// Start-up time after a soft reset (datasheet table 1, t_startup).
pub const SOFT_RESET_DELAY_MS: u32 = 2;

pub const CALIB_BLOCK1_LEN: usize = 26;
pub const CALIB_BLOCK2_LEN: usize = 7;
pub const DATA_BURST_LEN: usize = 8;
