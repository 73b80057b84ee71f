mod registry;

pub use registry::DeviceRegistry;

use crate::error::{ConfigError, Result};
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 1-based index of a physical unit within a fleet, up to 65535 units
#[derive(Display, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display("{0}")]
#[serde(into = "u16", try_from = "u16")]
pub struct DeviceIndex(u16);

impl DeviceIndex {
    pub fn new(index: u16) -> Result<Self> {
        if index == 0 {
            return Err(ConfigError::invalid("device.index", "indices start at 1"));
        }

        Ok(Self(index))
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for DeviceIndex {
    type Error = ConfigError;

    fn try_from(index: u16) -> Result<Self> {
        Self::new(index)
    }
}

impl From<DeviceIndex> for u16 {
    fn from(index: DeviceIndex) -> Self {
        index.0
    }
}

impl std::str::FromStr for DeviceIndex {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let index = s
            .trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::invalid("device.index", format!("{s:?} - {e}")))?;
        Self::new(index)
    }
}

/// What a webhook/channel carries for a device
#[derive(Display, FromStr, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ChannelRole {
    /// array of angle averages, numbered from 1
    #[display("angle{0}")]
    Angle(u8),
    /// periodic battery voltage
    #[display("voltage")]
    Voltage,
}

impl From<ChannelRole> for String {
    fn from(role: ChannelRole) -> Self {
        role.to_string()
    }
}

/// Only the exact display form is accepted, so `angle01` cannot alias `angle1`
impl TryFrom<String> for ChannelRole {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self> {
        let role: ChannelRole = s.parse().map_err(|_| {
            ConfigError::invalid("device.channels", format!("unknown channel role \"{s}\""))
        })?;
        if role.to_string() != s {
            return Err(ConfigError::invalid(
                "device.channels",
                format!("channel role \"{s}\" should be written \"{role}\""),
            ));
        }

        Ok(role)
    }
}

/// Identity of one deployed unit and where its reports go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub index: DeviceIndex,

    /// opaque id burned into the module, e.g. "380043000xxxx433343xxxxx"
    pub device_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub channels: BTreeMap<ChannelRole, String>,
}

impl DeviceProfile {
    pub fn new(index: DeviceIndex, device_id: impl Into<String>) -> Self {
        Self {
            index,
            device_id: device_id.into(),
            label: None,
            channels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_channel(mut self, role: ChannelRole, name: impl Into<String>) -> Self {
        self.channels.insert(role, name.into());
        self
    }

    pub fn channel(&self, role: ChannelRole) -> Option<&str> {
        self.channels.get(&role).map(String::as_str)
    }

    /// Angle channels in report order
    pub fn angle_channels(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels.iter().filter_map(|(role, name)| match role {
            ChannelRole::Angle(_) => Some(name.as_str()),
            ChannelRole::Voltage => None,
        })
    }

    pub fn voltage_channel(&self) -> Option<&str> {
        self.channel(ChannelRole::Voltage)
    }

    pub fn validate(&self) -> Result<()> {
        if self.device_id.trim().is_empty() {
            return Err(ConfigError::invalid(
                "device.device_id",
                format!("device {} has an empty id", self.index),
            ));
        }

        let mut seen: BTreeMap<&str, ChannelRole> = BTreeMap::new();
        for (&role, name) in &self.channels {
            if role == ChannelRole::Angle(0) {
                return Err(ConfigError::invalid(
                    "device.channels",
                    format!("device {}: angle channels are numbered from 1", self.index),
                ));
            }
            if name.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "device.channels",
                    format!("device {}: {role} channel name is empty", self.index),
                ));
            }
            if let Some(&first) = seen.get(name.as_str()) {
                return Err(ConfigError::DuplicateChannel {
                    device: self.index,
                    name: name.clone(),
                    first,
                    second: role,
                });
            }
            seen.insert(name.as_str(), role);
        }

        Ok(())
    }
}

/// How a node picks its own profile out of the fleet.
///
/// As text, a whole number from 1 to 65535 selects by index. Anything else,
/// including `0`, is a hardware id. Prefix `id:` to force a numeric hardware
/// id, e.g. `id:42`; hardware ids display with that prefix.
#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    #[display("{0}")]
    Index(DeviceIndex),
    #[display("id:{0}")]
    HardwareId(String),
}

impl std::str::FromStr for DeviceSelector {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(id) = s.strip_prefix("id:") {
            let id = id.trim();
            if id.is_empty() {
                return Err(ConfigError::invalid("device", "empty hardware id"));
            }
            return Ok(Self::HardwareId(id.to_string()));
        }
        if s.is_empty() {
            return Err(ConfigError::invalid("device", "empty device selector"));
        }

        match s.parse::<u16>().map(DeviceIndex::new) {
            Ok(Ok(index)) => Ok(Self::Index(index)),
            _ => Ok(Self::HardwareId(s.to_string())),
        }
    }
}

impl From<DeviceIndex> for DeviceSelector {
    fn from(index: DeviceIndex) -> Self {
        Self::Index(index)
    }
}
