// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

use share_contracts::{Result, ShareError};
use share_types::{DATA_PARTITION_INDEX, OS_RESERVED_PARTITION_INDEX};

/// Configuration for the driver core.
///
/// Deserialized from the embedding service's TOML configuration and
/// validated before any manager is constructed, so malformed values are
/// fatal at startup rather than at first use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Root directory on the remote host under which share mount points
    /// live.
    #[serde(default = "default_mount_root")]
    pub mount_root: String,

    /// Partition index backing share data.
    #[serde(default = "default_data_partition_index")]
    pub data_partition_index: u32,
}

fn default_mount_root() -> String {
    "C:/shares".to_string()
}

fn default_data_partition_index() -> u32 {
    DATA_PARTITION_INDEX
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            mount_root: default_mount_root(),
            data_partition_index: default_data_partition_index(),
        }
    }
}

impl DriverConfig {
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|error| ShareError::InvalidConfig(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mount_root.trim().is_empty() {
            return Err(ShareError::InvalidConfig(
                "mount_root must not be empty".to_string(),
            ));
        }
        if self.data_partition_index == 0 {
            return Err(ShareError::InvalidConfig(
                "partition indexes start at 1".to_string(),
            ));
        }
        if self.data_partition_index == OS_RESERVED_PARTITION_INDEX {
            return Err(ShareError::InvalidConfig(format!(
                "partition index {OS_RESERVED_PARTITION_INDEX} is reserved for the host OS"
            )));
        }
        Ok(())
    }
}
