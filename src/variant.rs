use crate::config::ConfigDocument;
use crate::device::{ChannelRole, DeviceIndex, DeviceProfile, DeviceRegistry};
use crate::error::Result;
use crate::output::OutputConfig;
use crate::sensor::{SensorCalibration, SensorPart};
use crate::time_zone::TimeZoneConfig;
use crate::timing::TimingConfig;
use enum_iterator::Sequence;
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

/// The firmware builds that ship with a compiled-in fleet
#[derive(Display, FromStr, Sequence, Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(style = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    /// MPU6050 on two Electrons, cloud only
    #[default]
    Mpu6050,
    /// MPU9250 on two Electrons and a test Photon, serial and cloud
    Mpu9250,
}

impl BuildVariant {
    pub fn sensor_part(&self) -> SensorPart {
        match self {
            BuildVariant::Mpu6050 => SensorPart::Mpu6050,
            BuildVariant::Mpu9250 => SensorPart::Mpu9250,
        }
    }

    pub fn devices(&self) -> Result<DeviceRegistry> {
        match self {
            BuildVariant::Mpu6050 => DeviceRegistry::from_profiles([
                DeviceProfile::new(DeviceIndex::new(1)?, "380043000xxxx433343xxxxx")
                    .with_channel(ChannelRole::Angle(1), "l01")
                    .with_channel(ChannelRole::Voltage, "m01"),
                DeviceProfile::new(DeviceIndex::new(2)?, "300058001xxxx533383xxxxx")
                    .with_channel(ChannelRole::Angle(1), "l02")
                    .with_channel(ChannelRole::Voltage, "m02"),
            ]),
            BuildVariant::Mpu9250 => {
                let ids = [
                    (1, "3d001XXXX951343334363138", None),
                    (2, "38004XXXXb51343334363138", None),
                    (3, "30005XXXX951353338363036", Some("test photon")),
                ];

                let mut registry = DeviceRegistry::new();
                for (n, id, label) in ids {
                    let mut profile = DeviceProfile::new(DeviceIndex::new(n)?, id)
                        .with_channel(ChannelRole::Angle(1), format!("d{n}wh1"))
                        .with_channel(ChannelRole::Angle(2), format!("d{n}wh2"))
                        .with_channel(ChannelRole::Voltage, format!("d{n}whv"));
                    if let Some(label) = label {
                        profile = profile.with_label(label);
                    }
                    registry.register(profile)?;
                }
                Ok(registry)
            }
        }
    }

    /// The complete compiled-in document for this build
    pub fn document(&self) -> Result<ConfigDocument> {
        let output = OutputConfig {
            serial_enabled: *self == BuildVariant::Mpu9250,
            ..OutputConfig::default()
        };

        Ok(ConfigDocument {
            variant: *self,
            timing: TimingConfig::default(),
            sensor: SensorCalibration::for_part(self.sensor_part()),
            output,
            time_zone: TimeZoneConfig::default(),
            devices: self.devices()?,
        })
    }
}
