// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// Descriptor of the block volume attached to a share server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSpec {
    /// Volume identifier; matches the remote disk's serial number.
    pub id: String,

    /// Device mount point as reported by the volume service, e.g.
    /// `/dev/sdb`. Only the trailing device letter is meaningful here, and
    /// only as a last-resort identification hint.
    pub mountpoint: String,
}

impl VolumeSpec {
    pub fn new(id: impl Into<String>, mountpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mountpoint: mountpoint.into(),
        }
    }
}
