use crate::constants::{BAUD_RATES, DEFAULT_BAUD_RATE};
use crate::error::{ConfigError, Result};
use enum_iterator::{all, Sequence};
use enum_primitive_derive::Primitive;
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

/// The three independent debug verbosity levels
#[derive(Display, Sequence, Primitive, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display(style = "snake_case")]
pub enum DebugLevel {
    /// setup information during initialisation
    Setup = 1,
    /// sensor readings, e.g. every angle
    SensorData = 2,
    /// timers and function entry/exit
    Trace = 3,
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugFlags {
    pub setup: bool,
    pub sensor_data: bool,
    pub trace: bool,
}

impl DebugFlags {
    pub fn all() -> Self {
        Self {
            setup: true,
            sensor_data: true,
            trace: true,
        }
    }

    pub fn is_enabled(&self, level: DebugLevel) -> bool {
        match level {
            DebugLevel::Setup => self.setup,
            DebugLevel::SensorData => self.sensor_data,
            DebugLevel::Trace => self.trace,
        }
    }

    pub fn set(&mut self, level: DebugLevel, enabled: bool) {
        match level {
            DebugLevel::Setup => self.setup = enabled,
            DebugLevel::SensorData => self.sensor_data = enabled,
            DebugLevel::Trace => self.trace = enabled,
        }
    }

    pub fn enabled_levels(&self) -> impl Iterator<Item = DebugLevel> + '_ {
        all::<DebugLevel>().filter(|l| self.is_enabled(*l))
    }

    pub fn any(&self) -> bool {
        self.enabled_levels().next().is_some()
    }
}

impl FromIterator<DebugLevel> for DebugFlags {
    fn from_iter<I: IntoIterator<Item = DebugLevel>>(iter: I) -> Self {
        let mut flags = Self::default();
        for level in iter {
            flags.set(level, true);
        }
        flags
    }
}

/// Where output can go
#[derive(Display, Sequence, Debug, Copy, Clone, PartialEq, Eq)]
#[display(style = "lowercase")]
pub enum Sink {
    Serial,
    Cloud,
}

/// Whether a node may run with every sink switched off
#[derive(Display, FromStr, Sequence, Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[display(style = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum OutputPolicy {
    #[default]
    RequireSink,
    AllowSilent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// print to the USB serial port
    pub serial_enabled: bool,
    /// publish to the cloud webhooks
    pub cloud_enabled: bool,
    pub serial_baud_rate: u32,
    pub debug: DebugFlags,
    #[serde(default)]
    pub policy: OutputPolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            serial_enabled: false,
            cloud_enabled: true,
            serial_baud_rate: DEFAULT_BAUD_RATE,
            debug: DebugFlags::all(),
            policy: OutputPolicy::default(),
        }
    }
}

impl OutputConfig {
    pub fn is_enabled(&self, sink: Sink) -> bool {
        match sink {
            Sink::Serial => self.serial_enabled,
            Sink::Cloud => self.cloud_enabled,
        }
    }

    pub fn sinks(&self) -> impl Iterator<Item = Sink> + '_ {
        all::<Sink>().filter(|s| self.is_enabled(*s))
    }

    pub fn validate(&self) -> Result<()> {
        if !BAUD_RATES.contains(&self.serial_baud_rate) {
            return Err(ConfigError::invalid(
                "output.serial_baud_rate",
                format!(
                    "{} is not one of {:?}",
                    self.serial_baud_rate, BAUD_RATES
                ),
            ));
        }

        if self.policy == OutputPolicy::RequireSink && self.sinks().next().is_none() {
            return Err(ConfigError::NoOutputSink);
        }

        if !self.serial_enabled && self.debug.any() {
            tracing::warn!(
                "Debug levels {:?} are on but serial output is off",
                self.debug.enabled_levels().collect::<Vec<_>>()
            );
        }

        Ok(())
    }
}
