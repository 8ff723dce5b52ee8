// SPDX-License-Identifier: GPL-3.0-only

//! Remote disk lifecycle
//!
//! Brings a remote block device from raw to mounted and back: format,
//! mount, unmount, resize, with online/readonly re-assertion wherever the
//! sequence needs a writable disk. Disk state is re-queried on every
//! operation and never cached between calls; the flags can change
//! out-of-band.

mod identify;

use std::sync::Arc;

use tracing::debug;

use share_contracts::{RemoteCommand, RemoteExecutor, Result, ShareError};
use share_types::{Disk, RawDiskRecord, RemoteHost, VolumeSpec};

use crate::config::DriverConfig;
use crate::paths::MountPathResolver;

pub struct DiskLifecycleManager {
    remote: Arc<dyn RemoteExecutor>,
    paths: MountPathResolver,
    data_partition_index: u32,
}

impl DiskLifecycleManager {
    pub fn new(remote: Arc<dyn RemoteExecutor>, config: &DriverConfig) -> Self {
        Self {
            remote,
            paths: MountPathResolver::new(config),
            data_partition_index: config.data_partition_index,
        }
    }

    /// Mount path backing a share on the remote host.
    pub fn mount_path(&self, share_name: &str) -> String {
        self.paths.resolve(share_name)
    }

    /// Rebuild the disk record matching a serial number.
    pub async fn disk_by_serial(
        &self,
        host: &RemoteHost,
        serial_number: &str,
    ) -> Result<Option<Disk>> {
        let command = RemoteCommand::GetDiskBySerial {
            serial_number: serial_number.to_string(),
        };
        let output = self.remote.execute(host, &command).await?;
        Ok(output.json::<RawDiskRecord>()?.map(Disk::from))
    }

    async fn disk_number_by_mount_path(
        &self,
        host: &RemoteHost,
        mount_path: &str,
    ) -> Result<Option<u32>> {
        let command = RemoteCommand::GetDiskByMountPath {
            mount_path: mount_path.to_string(),
        };
        self.remote.execute(host, &command).await?.optional_scalar()
    }

    /// Disk number for a volume: serial-number match first, device-letter
    /// fallback second.
    pub async fn identify_disk(&self, host: &RemoteHost, volume: &VolumeSpec) -> Result<u32> {
        if let Some(disk) = self.disk_by_serial(host, &volume.id).await? {
            return Ok(disk.number);
        }
        debug!(
            volume = %volume.id,
            "no disk matched the serial number, trying the volume mount point"
        );
        identify::disk_number_from_mountpoint(volume)
    }

    /// Initialize the volume's disk, create the data partition, format it.
    ///
    /// Not idempotent: must not be invoked for an already formatted disk.
    pub async fn format(&self, host: &RemoteHost, volume: &VolumeSpec) -> Result<()> {
        let disk_number = self.identify_disk(host, volume).await?;
        self.remote
            .execute(host, &RemoteCommand::InitializeDisk { disk_number })
            .await?;
        self.remote
            .execute(host, &RemoteCommand::CreatePartition { disk_number })
            .await?;
        self.remote
            .execute(
                host,
                &RemoteCommand::FormatPartition {
                    disk_number,
                    partition_index: self.data_partition_index,
                },
            )
            .await?;
        Ok(())
    }

    /// Bind the share's mount path to the volume's data partition.
    pub async fn mount(
        &self,
        host: &RemoteHost,
        share_name: &str,
        volume: &VolumeSpec,
    ) -> Result<()> {
        let mount_path = self.paths.resolve(share_name);
        if !self.is_mounted(host, &mount_path, Some(volume)).await? {
            let disk_number = self.identify_disk(host, volume).await?;
            self.remote
                .execute(
                    host,
                    &RemoteCommand::EnsureDirectory {
                        path: mount_path.clone(),
                    },
                )
                .await?;
            self.remote
                .execute(
                    host,
                    &RemoteCommand::AddAccessPath {
                        mount_path,
                        disk_number,
                        partition_index: self.data_partition_index,
                    },
                )
                .await?;
            // A prior unmount leaves the disk offline; every mount reverses
            // that regardless of what the current flags look like.
            self.ensure_disk_online_and_writable(host, disk_number)
                .await?;
        }
        Ok(())
    }

    /// Detach the share's mount path and set the backing disk offline.
    ///
    /// A no-op beyond the lookup when nothing is mounted there.
    pub async fn unmount(&self, host: &RemoteHost, share_name: &str) -> Result<()> {
        let mount_path = self.paths.resolve(share_name);
        let Some(disk_number) = self.disk_number_by_mount_path(host, &mount_path).await? else {
            debug!(share_name, "nothing is mounted, skipping unmount");
            return Ok(());
        };
        self.remote
            .execute(host, &RemoteCommand::RemoveMountPoint { path: mount_path })
            .await?;
        self.remote
            .execute(
                host,
                &RemoteCommand::SetDiskOnline {
                    disk_number,
                    online: false,
                },
            )
            .await?;
        Ok(())
    }

    /// Grow the data partition to the maximum size the disk allows.
    pub async fn resize(&self, host: &RemoteHost, volume: &VolumeSpec) -> Result<()> {
        let disk_number = self.identify_disk(host, volume).await?;
        // Resizing needs a writable disk, and the supported maximum is only
        // trustworthy once the flags are in place.
        self.ensure_disk_online_and_writable(host, disk_number)
            .await?;
        let output = self
            .remote
            .execute(
                host,
                &RemoteCommand::GetPartitionMaxSize {
                    disk_number,
                    partition_index: self.data_partition_index,
                },
            )
            .await?;
        let size_bytes = output.required_scalar::<u64>()?;
        self.remote
            .execute(
                host,
                &RemoteCommand::ResizePartition {
                    disk_number,
                    partition_index: self.data_partition_index,
                    size_bytes,
                },
            )
            .await?;
        Ok(())
    }

    /// Shared primitive for mount and resize: refresh the remote host's
    /// cached disk view, then online before writable; the readonly flag
    /// cannot be cleared on an offline disk.
    pub async fn ensure_disk_online_and_writable(
        &self,
        host: &RemoteHost,
        disk_number: u32,
    ) -> Result<()> {
        self.remote
            .execute(host, &RemoteCommand::RefreshDisk { disk_number })
            .await?;
        self.remote
            .execute(
                host,
                &RemoteCommand::SetDiskOnline {
                    disk_number,
                    online: true,
                },
            )
            .await?;
        self.remote
            .execute(
                host,
                &RemoteCommand::SetDiskReadonly {
                    disk_number,
                    readonly: false,
                },
            )
            .await?;
        Ok(())
    }

    /// Whether anything is mounted at `mount_path`.
    ///
    /// With a volume given, the bound disk must be the one the volume's
    /// serial number identifies; a mismatch is fatal and never silently
    /// corrected.
    pub async fn is_mounted(
        &self,
        host: &RemoteHost,
        mount_path: &str,
        volume: Option<&VolumeSpec>,
    ) -> Result<bool> {
        let Some(actual) = self.disk_number_by_mount_path(host, mount_path).await? else {
            return Ok(false);
        };
        if let Some(volume) = volume {
            let expected = self
                .disk_by_serial(host, &volume.id)
                .await?
                .map(|disk| disk.number);
            if expected != Some(actual) {
                return Err(ShareError::MountedDiskMismatch {
                    mount_path: mount_path.to_string(),
                    expected,
                    actual,
                });
            }
        }
        Ok(true)
    }

    /// Total size in bytes of the volume mounted at `mount_path`.
    pub async fn mounted_size_bytes(&self, host: &RemoteHost, mount_path: &str) -> Result<u64> {
        let command = RemoteCommand::GetSizeByPath {
            path: mount_path.to_string(),
        };
        self.remote.execute(host, &command).await?.required_scalar()
    }
}
