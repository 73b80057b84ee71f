use crate::config::NodeConfig;
use crate::error::{ConfigError, Result};
use parking_lot::RwLock;
use std::sync::Arc;

/// The active configuration, shared between the sampling and reporting threads.
///
/// Readers take an `Arc` snapshot and keep using it for as long as they like.
/// A change replaces the whole value in one step, so a snapshot is always a
/// configuration that passed validation as a unit.
#[derive(Debug)]
pub struct SharedConfig {
    current: RwLock<Arc<NodeConfig>>,
}

impl SharedConfig {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    pub fn current(&self) -> Arc<NodeConfig> {
        self.current.read().clone()
    }

    /// Swap in `next`, returning the configuration it replaced
    pub fn replace(&self, next: NodeConfig) -> Result<Arc<NodeConfig>> {
        next.validate()?;

        let mut current = self.current.write();
        if current.device.index != next.device.index {
            return Err(ConfigError::IdentityChanged {
                current: current.device.index,
                proposed: next.device.index,
            });
        }

        tracing::info!("Replacing configuration for device {}", next.device.index);
        Ok(std::mem::replace(&mut *current, Arc::new(next)))
    }

    /// Derive a new configuration from the current one and swap it in.
    ///
    /// `f` runs without the lock held, so it may read the shared value itself.
    /// If another writer got in first, `f` runs again on the newer value.
    pub fn update<F>(&self, mut f: F) -> Result<Arc<NodeConfig>>
    where
        F: FnMut(&NodeConfig) -> NodeConfig,
    {
        loop {
            let snapshot = self.current();
            let next = f(&snapshot);
            next.validate()?;

            if snapshot.device.index != next.device.index {
                return Err(ConfigError::IdentityChanged {
                    current: snapshot.device.index,
                    proposed: next.device.index,
                });
            }

            let mut current = self.current.write();
            if !Arc::ptr_eq(&current, &snapshot) {
                tracing::debug!("Configuration changed during update, retrying");
                continue;
            }

            tracing::info!("Updating configuration for device {}", next.device.index);
            return Ok(std::mem::replace(&mut *current, Arc::new(next)));
        }
    }
}
