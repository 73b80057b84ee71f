use crate::device::{ChannelRole, DeviceIndex};
use parse_display::Display;

/// Everything that can stop a configuration from being loaded.
///
/// None of these are recoverable at runtime: a node with a bad
/// configuration must not start sampling.
#[derive(Display, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// no profile is registered under the requested index
    #[display("unknown device {0}")]
    UnknownDevice(DeviceIndex),

    /// no profile carries the requested hardware id
    #[display("unknown device id \"{0}\"")]
    UnknownDeviceId(String),

    /// a second profile was registered under an existing index
    #[display("duplicate device {0}")]
    DuplicateDevice(DeviceIndex),

    /// two profiles claim the same hardware id
    #[display("duplicate device id \"{id}\" on devices {first} and {second}")]
    DuplicateDeviceId {
        id: String,
        first: DeviceIndex,
        second: DeviceIndex,
    },

    /// two roles of one profile route to the same channel name
    #[display("duplicate channel \"{name}\" on device {device} ({first} and {second})")]
    DuplicateChannel {
        device: DeviceIndex,
        name: String,
        first: ChannelRole,
        second: ChannelRole,
    },

    /// the selected profile lacks a channel that the output settings need
    #[display("device {device} has no {role} channel")]
    MissingChannel {
        device: DeviceIndex,
        role: ChannelRole,
    },

    /// both sinks are off while the policy requires one
    #[display("output: serial and cloud output are both disabled")]
    NoOutputSink,

    /// a live replacement tried to change which device this node is
    #[display("device identity cannot change at runtime ({current} -> {proposed})")]
    IdentityChanged {
        current: DeviceIndex,
        proposed: DeviceIndex,
    },

    /// a single field is out of range or malformed
    #[display("{field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// an override variable could not be used
    #[display("{var}: {reason}")]
    InvalidOverride { var: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_override(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOverride {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

impl std::error::Error for ConfigError {}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
