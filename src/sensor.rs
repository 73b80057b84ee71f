use crate::constants::*;
use crate::error::{ConfigError, Result};
use enum_iterator::Sequence;
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

/// Inertial sensor parts the firmware can drive
#[derive(Display, FromStr, Sequence, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(style = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SensorPart {
    Mpu6050,
    Mpu9250,
}

impl SensorPart {
    /// Addresses selectable with the AD0 pin
    pub fn i2c_addresses(&self) -> &'static [u8] {
        match self {
            SensorPart::Mpu6050 | SensorPart::Mpu9250 => &[MPU_ADDR, MPU_ADDR_ALT],
        }
    }

    pub fn setup_register(&self) -> u8 {
        MPU_SETUP_REGISTER
    }

    pub fn data_register(&self) -> u8 {
        MPU_DATA_REGISTER
    }

    pub fn who_am_i_register(&self) -> u8 {
        MPU_WHO_AM_I_REGISTER
    }

    /// Value read back from WHO_AM_I on a genuine part
    pub fn who_am_i(&self) -> u8 {
        match self {
            SensorPart::Mpu6050 => 0x68,
            SensorPart::Mpu9250 => 0x71,
        }
    }

    /// Raw samples are signed 16-bit
    pub fn raw_range(&self) -> (i32, i32) {
        (i16::MIN as i32, i16::MAX as i32)
    }
}

/// Where the sensor sits on the bus and how its raw output maps to angles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorCalibration {
    pub part: SensorPart,
    pub i2c_address: u8,
    pub setup_register: u8,
    pub data_register: u8,
    pub raw_min: i32,
    pub raw_max: i32,
}

impl SensorCalibration {
    /// Factory wiring for a part, AD0 low
    pub fn for_part(part: SensorPart) -> Self {
        Self {
            part,
            i2c_address: part.i2c_addresses()[0],
            setup_register: part.setup_register(),
            data_register: part.data_register(),
            raw_min: RAW_MIN,
            raw_max: RAW_MAX,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let part = self.part;

        if !part.i2c_addresses().contains(&self.i2c_address) {
            return Err(ConfigError::invalid(
                "sensor.i2c_address",
                format!(
                    "{part} answers on {:02X?}, not {:#04X}",
                    part.i2c_addresses(),
                    self.i2c_address
                ),
            ));
        }
        if self.setup_register != part.setup_register() {
            return Err(ConfigError::invalid(
                "sensor.setup_register",
                format!(
                    "{part} is set up through {:#04X}, not {:#04X}",
                    part.setup_register(),
                    self.setup_register
                ),
            ));
        }
        if self.data_register != part.data_register() {
            return Err(ConfigError::invalid(
                "sensor.data_register",
                format!(
                    "{part} angle data starts at {:#04X}, not {:#04X}",
                    part.data_register(),
                    self.data_register
                ),
            ));
        }

        if self.raw_min >= self.raw_max {
            return Err(ConfigError::invalid(
                "sensor.raw_min",
                format!(
                    "raw_min ({}) must be below raw_max ({})",
                    self.raw_min, self.raw_max
                ),
            ));
        }
        let (lo, hi) = part.raw_range();
        for (field, value) in [("sensor.raw_min", self.raw_min), ("sensor.raw_max", self.raw_max)] {
            if !(lo..=hi).contains(&value) {
                return Err(ConfigError::invalid(
                    field,
                    format!("{value} is outside the {part} raw range {lo}..={hi}"),
                ));
            }
        }

        Ok(())
    }

    /// Linearly map a raw sample from `raw_min..=raw_max` onto -90..=90 degrees.
    ///
    /// Samples outside the bounds extrapolate rather than clamp.
    pub fn map_raw(&self, raw: i16) -> f64 {
        let (min, max) = (f64::from(self.raw_min), f64::from(self.raw_max));
        let t = (f64::from(raw) - min) / (max - min);
        MAPPED_MIN_DEG + t * (MAPPED_MAX_DEG - MAPPED_MIN_DEG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enum_iterator::all;

    #[test]
    fn test_factory_calibration_is_valid() {
        for part in all::<SensorPart>() {
            let cal = SensorCalibration::for_part(part);
            cal.validate().unwrap();
            assert_eq!(cal.i2c_address, 0x68);
            assert_eq!(cal.setup_register, 0x6B);
            assert_eq!(cal.data_register, 0x3B);
        }
    }

    #[test]
    fn test_raw_bounds_order() {
        let cal = SensorCalibration {
            raw_min: 265,
            raw_max: 402,
            ..SensorCalibration::for_part(SensorPart::Mpu6050)
        };
        cal.validate().unwrap();

        let cal = SensorCalibration {
            raw_min: 402,
            raw_max: 265,
            ..SensorCalibration::for_part(SensorPart::Mpu6050)
        };
        let err = cal.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "sensor.raw_min",
                ..
            }
        ));

        let cal = SensorCalibration {
            raw_min: 300,
            raw_max: 300,
            ..SensorCalibration::for_part(SensorPart::Mpu6050)
        };
        cal.validate().unwrap_err();
    }

    #[test]
    fn test_raw_bounds_inside_part_range() {
        let cal = SensorCalibration {
            raw_max: 40_000,
            ..SensorCalibration::for_part(SensorPart::Mpu9250)
        };
        let err = cal.validate().unwrap_err();
        assert!(err.to_string().starts_with("sensor.raw_max"));
    }

    #[test]
    fn test_registers_fixed_by_part() {
        let cal = SensorCalibration {
            i2c_address: 0x69,
            ..SensorCalibration::for_part(SensorPart::Mpu6050)
        };
        cal.validate().unwrap();

        let cal = SensorCalibration {
            i2c_address: 0x50,
            ..SensorCalibration::for_part(SensorPart::Mpu6050)
        };
        cal.validate().unwrap_err();

        let cal = SensorCalibration {
            setup_register: 0x6C,
            ..SensorCalibration::for_part(SensorPart::Mpu6050)
        };
        cal.validate().unwrap_err();

        let cal = SensorCalibration {
            data_register: 0x43,
            ..SensorCalibration::for_part(SensorPart::Mpu6050)
        };
        cal.validate().unwrap_err();
    }

    #[test]
    fn test_map_raw() {
        let cal = SensorCalibration::for_part(SensorPart::Mpu6050);
        assert_eq!(cal.map_raw(265), -90.0);
        assert_eq!(cal.map_raw(402), 90.0);
        assert!((cal.map_raw(333) - (-90.0 + 68.0 / 137.0 * 180.0)).abs() < 1e-9);
    }

    #[test]
    fn test_map_raw_extremes() {
        // widest bounds the part allows, sampled at both ends of the register
        let (lo, hi) = SensorPart::Mpu6050.raw_range();
        let cal = SensorCalibration {
            raw_min: lo,
            raw_max: hi,
            ..SensorCalibration::for_part(SensorPart::Mpu6050)
        };
        cal.validate().unwrap();
        assert_eq!(cal.map_raw(i16::MIN), -90.0);
        assert_eq!(cal.map_raw(i16::MAX), 90.0);

        let factory = SensorCalibration::for_part(SensorPart::Mpu6050);
        let below = factory.map_raw(i16::MIN);
        let above = factory.map_raw(i16::MAX);
        assert!(below.is_finite() && below < -90.0);
        assert!(above.is_finite() && above > 90.0);
        assert!((above - (-90.0 + (32767.0 - 265.0) / 137.0 * 180.0)).abs() < 1e-6);
    }

    #[test]
    fn test_part_names() {
        assert_eq!(SensorPart::Mpu6050.to_string(), "MPU6050");
        assert_eq!("MPU9250".parse::<SensorPart>().unwrap(), SensorPart::Mpu9250);
        assert_eq!(SensorPart::Mpu9250.who_am_i(), 0x71);
    }
}
