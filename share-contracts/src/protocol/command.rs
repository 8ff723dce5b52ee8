// SPDX-License-Identifier: GPL-3.0-only

//! Typed remote command surface
//!
//! Every remote operation the driver performs is a variant here, carrying
//! named parameters. Serialization to the actual command line happens in
//! exactly one place, [`RemoteCommand::render`], so argument escaping is
//! centralized and callers never assemble command strings ad hoc.

use share_types::AclRight;

/// Projection the disk queries ask the remote shell for. Partition sizes are
/// folded in so one query rebuilds the whole disk record.
const DISK_PROJECTION: &str = "Number, SerialNumber, IsOffline, IsReadOnly, \
     @{Name='Partitions';Expression={@($_ | Get-Partition | \
     Select-Object PartitionNumber, Size, \
     @{Name='SizeMax';Expression={($_ | Get-PartitionSupportedSize).SizeMax}})}}";

/// One remote operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    // Disk surface.
    RefreshDisk {
        disk_number: u32,
    },
    InitializeDisk {
        disk_number: u32,
    },
    CreatePartition {
        disk_number: u32,
    },
    FormatPartition {
        disk_number: u32,
        partition_index: u32,
    },
    GetDiskBySerial {
        serial_number: String,
    },
    GetDiskByMountPath {
        mount_path: String,
    },
    SetDiskOnline {
        disk_number: u32,
        online: bool,
    },
    SetDiskReadonly {
        disk_number: u32,
        readonly: bool,
    },
    GetPartitionMaxSize {
        disk_number: u32,
        partition_index: u32,
    },
    ResizePartition {
        disk_number: u32,
        partition_index: u32,
        size_bytes: u64,
    },
    GetSizeByPath {
        path: String,
    },
    EnsureDirectory {
        path: String,
    },
    AddAccessPath {
        mount_path: String,
        disk_number: u32,
        partition_index: u32,
    },
    RemoveMountPoint {
        path: String,
    },

    // Export surface.
    ListShares,
    CreateShare {
        name: String,
        path: String,
    },
    RemoveShare {
        name: String,
    },
    GetSharePath {
        name: String,
        tolerate_missing: bool,
    },

    // Access surface.
    ListShareAccess {
        share_name: String,
    },
    GrantShareAccess {
        share_name: String,
        principal: String,
        right: AclRight,
    },
    RevokeShareAccess {
        share_name: String,
        principal: String,
    },
    RefreshShareAcl {
        share_name: String,
    },
}

impl RemoteCommand {
    /// Whether a nonzero exit is tolerated for this command.
    ///
    /// Existence probes opt in; executors yield empty output for them
    /// instead of a transport fault.
    pub fn tolerates_failure(&self) -> bool {
        matches!(
            self,
            Self::GetSharePath {
                tolerate_missing: true,
                ..
            }
        )
    }

    /// Serialize to the remote shell command line.
    pub fn render(&self) -> String {
        match self {
            Self::RefreshDisk { disk_number } => {
                format!("Update-Disk -Number {disk_number}")
            }
            Self::InitializeDisk { disk_number } => {
                format!("Initialize-Disk -Number {disk_number}")
            }
            Self::CreatePartition { disk_number } => {
                format!("New-Partition -DiskNumber {disk_number} -UseMaximumSize")
            }
            Self::FormatPartition {
                disk_number,
                partition_index,
            } => format!(
                "Get-Partition -DiskNumber {disk_number} -PartitionNumber {partition_index} \
                 | Format-Volume -FileSystem NTFS -Force -Confirm:$false"
            ),
            Self::GetDiskBySerial { serial_number } => format!(
                "Get-Disk | Where-Object {{ $_.SerialNumber -eq {} }} \
                 | Select-Object -First 1 -Property {DISK_PROJECTION} \
                 | ConvertTo-Json -Compress -Depth 4",
                quote(serial_number)
            ),
            Self::GetDiskByMountPath { mount_path } => format!(
                "Get-Partition | Where-Object {{ $_.AccessPaths -contains {} }} \
                 | Select-Object -ExpandProperty DiskNumber",
                quote(&access_path(mount_path))
            ),
            Self::SetDiskOnline {
                disk_number,
                online,
            } => format!(
                "Set-Disk -Number {disk_number} -IsOffline {}",
                ps_bool(!online)
            ),
            Self::SetDiskReadonly {
                disk_number,
                readonly,
            } => format!(
                "Set-Disk -Number {disk_number} -IsReadOnly {}",
                ps_bool(*readonly)
            ),
            Self::GetPartitionMaxSize {
                disk_number,
                partition_index,
            } => format!(
                "Get-PartitionSupportedSize -DiskNumber {disk_number} \
                 -PartitionNumber {partition_index} | Select-Object -ExpandProperty SizeMax"
            ),
            Self::ResizePartition {
                disk_number,
                partition_index,
                size_bytes,
            } => format!(
                "Resize-Partition -DiskNumber {disk_number} \
                 -PartitionNumber {partition_index} -Size {size_bytes}"
            ),
            Self::GetSizeByPath { path } => format!(
                "Get-Partition | Where-Object {{ $_.AccessPaths -contains {} }} \
                 | Get-Volume | Select-Object -ExpandProperty Size",
                quote(&access_path(path))
            ),
            Self::EnsureDirectory { path } => {
                format!("New-Item -ItemType Directory -Force -Path {}", quote(path))
            }
            Self::AddAccessPath {
                mount_path,
                disk_number,
                partition_index,
            } => format!(
                "Add-PartitionAccessPath -DiskNumber {disk_number} \
                 -PartitionNumber {partition_index} -AccessPath {}",
                quote(mount_path)
            ),
            // Junction removal goes through cmd.exe; rmdir on a junction
            // detaches it without recursing into the target.
            Self::RemoveMountPoint { path } => {
                format!("cmd /C rmdir /S /Q {}", cmd_quote(path))
            }
            Self::ListShares => "Get-SmbShare".to_string(),
            Self::CreateShare { name, path } => format!(
                "New-SmbShare -Name {} -Path {}",
                quote(name),
                quote(path)
            ),
            Self::RemoveShare { name } => {
                format!("Remove-SmbShare -Name {} -Force", quote(name))
            }
            Self::GetSharePath { name, .. } => format!(
                "Get-SmbShare -Name {} -ErrorAction SilentlyContinue \
                 | Select-Object -ExpandProperty Path",
                quote(name)
            ),
            Self::ListShareAccess { share_name } => format!(
                "Get-SmbShareAccess -Name {} \
                 | Select-Object AccountName, AccessControlType, AccessRight \
                 | ConvertTo-Json -Compress",
                quote(share_name)
            ),
            Self::GrantShareAccess {
                share_name,
                principal,
                right,
            } => format!(
                "Grant-SmbShareAccess -Name {} -AccessRight {} -AccountName {} -Force",
                quote(share_name),
                right.parameter(),
                quote(principal)
            ),
            Self::RevokeShareAccess {
                share_name,
                principal,
            } => format!(
                "Revoke-SmbShareAccess -Name {} -AccountName {} -Force",
                quote(share_name),
                quote(principal)
            ),
            Self::RefreshShareAcl { share_name } => {
                format!("Set-SmbPathAcl -ShareName {}", quote(share_name))
            }
        }
    }
}

/// Quote a value as a PowerShell argument. Plain identifiers pass through;
/// anything else is single-quoted with embedded quotes doubled.
fn quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// Quote a value for the single cmd.exe shell-out. cmd does not understand
/// single quotes, so double quotes are required here.
fn cmd_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', ""))
}

/// Partition access paths are recorded with a trailing separator.
fn access_path(mount_path: &str) -> String {
    format!("{}\\", mount_path.trim_end_matches('\\'))
}

fn ps_bool(value: bool) -> &'static str {
    if value { "$true" } else { "$false" }
}
