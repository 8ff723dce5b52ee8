// SPDX-License-Identifier: GPL-3.0-only

//! Remote disk and partition models

use serde::{Deserialize, Serialize};

/// Partition index reserved by the host operating system on every disk.
pub const OS_RESERVED_PARTITION_INDEX: u32 = 1;

/// Fixed partition index backing a share's data.
pub const DATA_PARTITION_INDEX: u32 = 2;

/// Remote block device state.
///
/// A `Disk` is never persisted; it is reconstructed by query on every
/// operation. The online/readonly flags are remote, mutable state and can
/// change out-of-band between calls, so operations re-assert them instead of
/// trusting a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disk {
    /// Disk index on the remote host.
    pub number: u32,

    /// Serial number, the durable identity used to match a volume.
    pub serial_number: String,

    pub is_online: bool,
    pub is_readonly: bool,

    /// Partitions ordered by index.
    pub partitions: Vec<Partition>,
}

impl Disk {
    /// The partition backing share data, if it exists yet.
    pub fn data_partition(&self) -> Option<&Partition> {
        self.partitions
            .iter()
            .find(|p| p.index == DATA_PARTITION_INDEX)
    }
}

/// A partition slot on a remote disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Index within the disk. Index 1 is reserved for the host OS.
    pub index: u32,

    pub size_bytes: u64,

    /// Largest size this partition can currently grow to.
    pub max_size_bytes: u64,
}

/// Wire shape of the disk query answer (`Get-Disk … | ConvertTo-Json`).
#[derive(Debug, Clone, Deserialize)]
pub struct RawDiskRecord {
    #[serde(rename = "Number")]
    pub number: u32,

    #[serde(rename = "SerialNumber")]
    pub serial_number: String,

    #[serde(rename = "IsOffline")]
    pub is_offline: bool,

    #[serde(rename = "IsReadOnly")]
    pub is_readonly: bool,

    #[serde(rename = "Partitions", default)]
    pub partitions: Vec<RawPartitionRecord>,
}

/// Wire shape of one partition in the disk query answer.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPartitionRecord {
    #[serde(rename = "PartitionNumber")]
    pub index: u32,

    #[serde(rename = "Size")]
    pub size_bytes: u64,

    #[serde(rename = "SizeMax")]
    pub max_size_bytes: u64,
}

impl From<RawDiskRecord> for Disk {
    fn from(raw: RawDiskRecord) -> Self {
        let mut partitions: Vec<Partition> = raw
            .partitions
            .into_iter()
            .map(|p| Partition {
                index: p.index,
                size_bytes: p.size_bytes,
                max_size_bytes: p.max_size_bytes,
            })
            .collect();
        partitions.sort_by_key(|p| p.index);

        Self {
            number: raw.number,
            serial_number: raw.serial_number,
            is_online: !raw.is_offline,
            is_readonly: raw.is_readonly,
            partitions,
        }
    }
}
