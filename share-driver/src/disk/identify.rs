// SPDX-License-Identifier: GPL-3.0-only

//! Last-resort disk identification
//!
//! When the serial-number query cannot identify a disk, the volume's device
//! mount point is interpreted as a legacy device-letter suffix ('a' maps to
//! disk 0, 'b' to disk 1, …). The heuristic is environment specific, so it
//! lives behind this one function and can be swapped or disabled without
//! touching callers.

use share_contracts::{Result, ShareError};
use share_types::VolumeSpec;

/// Derive a zero-based disk index from the mountpoint's final character.
pub(crate) fn disk_number_from_mountpoint(volume: &VolumeSpec) -> Result<u32> {
    match volume.mountpoint.chars().next_back() {
        Some(suffix) if suffix.is_ascii_alphabetic() => {
            let letter = suffix.to_ascii_lowercase();
            Ok(letter as u32 - 'a' as u32)
        }
        _ => Err(ShareError::DiskNotFound(volume.id.clone())),
    }
}
