use crate::device::{ChannelRole, DeviceProfile, DeviceRegistry, DeviceSelector};
use crate::error::{ConfigError, Result};
use crate::output::OutputConfig;
use crate::overrides::Overrides;
use crate::sensor::SensorCalibration;
use crate::time_zone::TimeZoneConfig;
use crate::timing::TimingConfig;
use crate::variant::BuildVariant;
use serde::{Deserialize, Serialize};

/// Settings for a whole fleet: shared values plus every device profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub variant: BuildVariant,
    pub timing: TimingConfig,
    pub sensor: SensorCalibration,
    pub output: OutputConfig,
    pub time_zone: TimeZoneConfig,
    pub devices: DeviceRegistry,
}

impl ConfigDocument {
    /// Check the shared sections. Profiles were checked on registration.
    pub fn validate(&self) -> Result<()> {
        self.timing.validate()?;
        self.sensor.validate()?;
        self.output.validate()?;
        self.time_zone.validate()?;

        if self.devices.is_empty() {
            return Err(ConfigError::invalid("devices", "no device profiles"));
        }
        Ok(())
    }
}

/// The validated configuration of one running node.
///
/// Built once by [`ConfigLoader::load`] and only ever read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub variant: BuildVariant,
    pub timing: TimingConfig,
    pub sensor: SensorCalibration,
    pub output: OutputConfig,
    pub time_zone: TimeZoneConfig,
    pub device: DeviceProfile,
}

impl NodeConfig {
    pub fn validate(&self) -> Result<()> {
        self.timing.validate()?;
        self.sensor.validate()?;
        self.output.validate()?;
        self.time_zone.validate()?;
        self.device.validate()?;
        self.check_channels()
    }

    /// The selected profile must carry every channel the cloud output will use
    fn check_channels(&self) -> Result<()> {
        if !self.output.cloud_enabled {
            return Ok(());
        }

        if self.device.angle_channels().next().is_none() {
            return Err(ConfigError::MissingChannel {
                device: self.device.index,
                role: ChannelRole::Angle(1),
            });
        }
        if self.timing.voltage_report_interval().is_some() && self.device.voltage_channel().is_none()
        {
            return Err(ConfigError::MissingChannel {
                device: self.device.index,
                role: ChannelRole::Voltage,
            });
        }

        Ok(())
    }
}

/// Assembles a [`NodeConfig`] from a document and optional overrides
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    document: ConfigDocument,
    overrides: Overrides,
}

impl ConfigLoader {
    pub fn new(document: ConfigDocument) -> Self {
        Self {
            document,
            overrides: Overrides::default(),
        }
    }

    /// Start from the compiled-in document of a build
    pub fn for_variant(variant: BuildVariant) -> Result<Self> {
        Ok(Self::new(variant.document()?))
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Apply overrides, validate, and pick the profile for `selector`
    pub fn load(&self, selector: &DeviceSelector) -> Result<NodeConfig> {
        let mut document = self.document.clone();
        self.overrides.apply(&mut document);
        document.validate()?;

        let device = document.devices.select(selector)?.clone();
        let ConfigDocument {
            variant,
            timing,
            sensor,
            output,
            time_zone,
            ..
        } = document;

        let config = NodeConfig {
            variant,
            timing,
            sensor,
            output,
            time_zone,
            device,
        };
        config.check_channels()?;

        tracing::info!(
            "Loaded {} configuration for device {} ({}), sinks: {:?}",
            config.variant,
            config.device.index,
            config.device.device_id,
            config.output.sinks().collect::<Vec<_>>()
        );
        Ok(config)
    }
}
