use super::{DeviceIndex, DeviceProfile, DeviceSelector};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All device profiles of a fleet, keyed by index.
///
/// Persisted as a list ordered by index. Deserialising goes back through
/// [`DeviceRegistry::register`], so a file cannot smuggle in duplicates.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<DeviceProfile>", try_from = "Vec<DeviceProfile>")]
pub struct DeviceRegistry {
    profiles: BTreeMap<DeviceIndex, DeviceProfile>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profiles(profiles: impl IntoIterator<Item = DeviceProfile>) -> Result<Self> {
        let mut registry = Self::new();
        for profile in profiles {
            registry.register(profile)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, profile: DeviceProfile) -> Result<()> {
        profile.validate()?;

        if self.profiles.contains_key(&profile.index) {
            return Err(ConfigError::DuplicateDevice(profile.index));
        }
        if let Some(other) = self
            .profiles
            .values()
            .find(|p| p.device_id == profile.device_id)
        {
            return Err(ConfigError::DuplicateDeviceId {
                id: profile.device_id,
                first: other.index,
                second: profile.index,
            });
        }

        tracing::debug!(
            "Registered device {} ({}) with {} channel(s)",
            profile.index,
            profile.device_id,
            profile.channels.len()
        );
        self.profiles.insert(profile.index, profile);
        Ok(())
    }

    pub fn lookup(&self, index: DeviceIndex) -> Result<&DeviceProfile> {
        self.profiles
            .get(&index)
            .ok_or(ConfigError::UnknownDevice(index))
    }

    pub fn lookup_hardware_id(&self, device_id: &str) -> Result<&DeviceProfile> {
        self.profiles
            .values()
            .find(|p| p.device_id == device_id)
            .ok_or_else(|| ConfigError::UnknownDeviceId(device_id.to_string()))
    }

    pub fn select(&self, selector: &DeviceSelector) -> Result<&DeviceProfile> {
        match selector {
            DeviceSelector::Index(index) => self.lookup(*index),
            DeviceSelector::HardwareId(id) => self.lookup_hardware_id(id),
        }
    }

    /// Profiles in index order
    pub fn iter(&self) -> impl Iterator<Item = &DeviceProfile> + '_ {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl From<DeviceRegistry> for Vec<DeviceProfile> {
    fn from(registry: DeviceRegistry) -> Self {
        registry.profiles.into_values().collect()
    }
}

impl TryFrom<Vec<DeviceProfile>> for DeviceRegistry {
    type Error = ConfigError;

    fn try_from(profiles: Vec<DeviceProfile>) -> Result<Self> {
        Self::from_profiles(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ChannelRole;
    use rand::seq::SliceRandom;
    use rand::thread_rng;

    fn idx(i: u16) -> DeviceIndex {
        DeviceIndex::new(i).unwrap()
    }

    fn two_units() -> DeviceRegistry {
        DeviceRegistry::from_profiles([
            DeviceProfile::new(idx(1), "A")
                .with_channel(ChannelRole::Angle(1), "l01")
                .with_channel(ChannelRole::Voltage, "m01"),
            DeviceProfile::new(idx(2), "B")
                .with_channel(ChannelRole::Angle(1), "l02")
                .with_channel(ChannelRole::Voltage, "m02"),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_two_units() {
        let registry = two_units();

        let a = registry.lookup(idx(1)).unwrap();
        assert_eq!(a.device_id, "A");
        assert_eq!(
            a.channels,
            BTreeMap::from([
                (ChannelRole::Angle(1), "l01".to_string()),
                (ChannelRole::Voltage, "m01".to_string()),
            ])
        );

        let b = registry.lookup(idx(2)).unwrap();
        assert_eq!(b.channel(ChannelRole::Angle(1)), Some("l02"));
        assert_eq!(b.voltage_channel(), Some("m02"));

        assert_eq!(
            registry.lookup(idx(3)),
            Err(ConfigError::UnknownDevice(idx(3)))
        );
    }

    #[test]
    fn test_register_duplicate_index() {
        let mut registry = two_units();
        let err = registry
            .register(DeviceProfile::new(idx(2), "C"))
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateDevice(idx(2)));
        assert_eq!(err.to_string(), "duplicate device 2");

        // the existing entry is untouched
        assert_eq!(registry.lookup(idx(2)).unwrap().device_id, "B");
    }

    #[test]
    fn test_register_duplicate_hardware_id() {
        let mut registry = two_units();
        let err = registry
            .register(DeviceProfile::new(idx(3), "A"))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateDeviceId {
                id: "A".to_string(),
                first: idx(1),
                second: idx(3),
            }
        );
    }

    #[test]
    fn test_register_rejects_invalid_profile() {
        let mut registry = DeviceRegistry::new();
        registry
            .register(
                DeviceProfile::new(idx(1), "A")
                    .with_channel(ChannelRole::Angle(1), "x")
                    .with_channel(ChannelRole::Angle(2), "x"),
            )
            .unwrap_err();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_hardware_id() {
        let registry = two_units();
        assert_eq!(registry.lookup_hardware_id("B").unwrap().index, idx(2));
        assert_eq!(
            registry.lookup_hardware_id("Z"),
            Err(ConfigError::UnknownDeviceId("Z".to_string()))
        );
        assert_eq!(
            registry
                .select(&DeviceSelector::HardwareId("A".to_string()))
                .unwrap()
                .index,
            idx(1)
        );
    }

    #[test]
    fn test_lookup_returns_registered_profiles_in_any_order() {
        let mut rng = thread_rng();

        for _ in 0..50 {
            let mut indices: Vec<u16> = (1..=20).collect();
            indices.shuffle(&mut rng);

            let profiles: Vec<_> = indices
                .iter()
                .map(|&i| {
                    DeviceProfile::new(idx(i), format!("dev{i:02}"))
                        .with_channel(ChannelRole::Angle(1), format!("l{i:02}"))
                        .with_channel(ChannelRole::Voltage, format!("m{i:02}"))
                })
                .collect();
            let registry = DeviceRegistry::from_profiles(profiles.clone()).unwrap();

            assert_eq!(registry.len(), profiles.len());
            for profile in &profiles {
                assert_eq!(registry.lookup(profile.index).unwrap(), profile);
            }

            // iteration is always in index order
            let order: Vec<u16> = registry.iter().map(|p| p.index.get()).collect();
            assert_eq!(order, (1..=20).collect::<Vec<_>>());

            registry.lookup(idx(21)).unwrap_err();
        }
    }

    #[test]
    fn test_indices_past_255() {
        let registry = DeviceRegistry::from_profiles(
            [1, 255, 256, 300, u16::MAX].map(|i| {
                DeviceProfile::new(idx(i), format!("dev{i}"))
                    .with_channel(ChannelRole::Angle(1), format!("l{i}"))
            }),
        )
        .unwrap();

        assert_eq!(registry.len(), 5);
        assert_eq!(registry.lookup(idx(300)).unwrap().device_id, "dev300");
        assert_eq!(
            registry
                .select(&"65535".parse().unwrap())
                .unwrap()
                .device_id,
            "dev65535"
        );

        let json = serde_json::to_string(&registry).unwrap();
        assert!(json.contains(r#""index":300"#));
        assert_eq!(serde_json::from_str::<DeviceRegistry>(&json).unwrap(), registry);
    }

    #[test]
    fn test_deserialise_rejects_duplicates() {
        let json = r#"[
            {"index": 1, "device_id": "A", "channels": {"angle1": "l01"}},
            {"index": 1, "device_id": "B", "channels": {"angle1": "l02"}}
        ]"#;
        let err = serde_json::from_str::<DeviceRegistry>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate device 1"));
    }
}
