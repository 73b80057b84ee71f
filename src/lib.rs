//! Validated configuration for the angle-sensing node firmware.
//!
//! A fleet is described by one [`ConfigDocument`]; each node picks its own
//! [`DeviceProfile`] out of it through a [`ConfigLoader`] and gets back an
//! immutable [`NodeConfig`].

pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod logging;
pub mod output;
pub mod overrides;
pub mod persist;
pub mod sensor;
pub mod shared;
pub mod time_zone;
pub mod timing;
pub mod variant;

pub use config::{ConfigDocument, ConfigLoader, NodeConfig};
pub use device::{ChannelRole, DeviceIndex, DeviceProfile, DeviceRegistry, DeviceSelector};
pub use error::ConfigError;
pub use output::{DebugFlags, DebugLevel, OutputConfig, OutputPolicy, Sink};
pub use overrides::Overrides;
pub use sensor::{SensorCalibration, SensorPart};
pub use shared::SharedConfig;
pub use time_zone::TimeZoneConfig;
pub use timing::TimingConfig;
pub use variant::BuildVariant;
