// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end provisioning flow against a scripted remote host: format the
//! disk, mount it, expose the export, synchronize access, then tear down.
//! The assertions pin the exact command transcript, since sequencing is what
//! the driver's correctness rests on.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use share_contracts::{RemoteCommand, RemoteExecutor};
use share_driver::{DiskLifecycleManager, DriverConfig, HelperRegistry, ShareProtocol};
use share_testing::{FakeRemoteExecutor, init_test_logging};
use share_types::{AccessLevel, AccessRule, AclRight, RemoteHost, VolumeSpec};

const SHARE: &str = "data01";
const MOUNT_PATH: &str = r"C:\shares\data01";
const DISK: u32 = 2;

fn scripted_host() -> Arc<FakeRemoteExecutor> {
    let mounted = Arc::new(Mutex::new(false));
    let created = Arc::new(Mutex::new(false));

    let mounted_probe = Arc::clone(&mounted);
    let created_probe = Arc::clone(&created);

    Arc::new(
        FakeRemoteExecutor::new()
            .respond(|command| match command {
                RemoteCommand::GetDiskBySerial { serial_number } if serial_number == "vol-7" => {
                    Some(format!(
                        r#"{{"Number":{DISK},"SerialNumber":"vol-7","IsOffline":true,"IsReadOnly":true}}"#
                    ))
                }
                _ => None,
            })
            .respond(move |command| match command {
                RemoteCommand::GetDiskByMountPath { .. } => mounted_probe
                    .lock()
                    .unwrap()
                    .then(|| DISK.to_string()),
                _ => None,
            })
            .respond(move |command| match command {
                RemoteCommand::AddAccessPath { .. } => {
                    *mounted.lock().unwrap() = true;
                    Some(String::new())
                }
                _ => None,
            })
            .respond(move |command| match command {
                RemoteCommand::GetSharePath { .. } => created_probe
                    .lock()
                    .unwrap()
                    .then(|| MOUNT_PATH.to_string()),
                _ => None,
            })
            .respond(move |command| match command {
                RemoteCommand::CreateShare { .. } => {
                    *created.lock().unwrap() = true;
                    Some(String::new())
                }
                _ => None,
            })
            .respond(|command| match command {
                // Fresh share: the sole world deny placeholder, collapsed to
                // a bare object by the remote JSON encoder.
                RemoteCommand::ListShareAccess { .. } => Some(
                    r#"{"AccountName":"Everyone","AccessControlType":1,"AccessRight":3}"#
                        .to_string(),
                ),
                _ => None,
            }),
    )
}

#[tokio::test]
async fn provisions_exports_and_tears_down_a_share() -> Result<()> {
    init_test_logging();

    let fake = scripted_host();
    let remote: Arc<dyn RemoteExecutor> = fake.clone();
    let config = DriverConfig::default();
    let host = RemoteHost::new("instance-1", "10.0.0.5");
    let volume = VolumeSpec::new("vol-7", "/dev/sdc");

    let disks = DiskLifecycleManager::new(Arc::clone(&remote), &config);
    let registry = HelperRegistry::build(remote, &config)?;
    let helper = registry.helper(ShareProtocol::Smb)?;

    disks.format(&host, &volume).await?;
    disks.mount(&host, SHARE, &volume).await?;

    let location = helper.exports.create_export(&host, SHARE).await?;
    assert_eq!(location, r"\\10.0.0.5\data01");

    let desired = vec![AccessRule::user("alice", AccessLevel::ReadWrite)];
    helper
        .access
        .update_access(&host, SHARE, &desired, &[], &[])
        .await?;

    helper.exports.remove_export(&host, SHARE).await?;
    disks.unmount(&host, SHARE).await?;

    let expected = vec![
        // format
        RemoteCommand::GetDiskBySerial {
            serial_number: "vol-7".to_string(),
        },
        RemoteCommand::InitializeDisk { disk_number: DISK },
        RemoteCommand::CreatePartition { disk_number: DISK },
        RemoteCommand::FormatPartition {
            disk_number: DISK,
            partition_index: 2,
        },
        // mount: nothing bound yet, so bind and re-assert the flags
        RemoteCommand::GetDiskByMountPath {
            mount_path: MOUNT_PATH.to_string(),
        },
        RemoteCommand::GetDiskBySerial {
            serial_number: "vol-7".to_string(),
        },
        RemoteCommand::EnsureDirectory {
            path: MOUNT_PATH.to_string(),
        },
        RemoteCommand::AddAccessPath {
            mount_path: MOUNT_PATH.to_string(),
            disk_number: DISK,
            partition_index: 2,
        },
        RemoteCommand::RefreshDisk { disk_number: DISK },
        RemoteCommand::SetDiskOnline {
            disk_number: DISK,
            online: true,
        },
        RemoteCommand::SetDiskReadonly {
            disk_number: DISK,
            readonly: false,
        },
        // create_export
        RemoteCommand::GetSharePath {
            name: SHARE.to_string(),
            tolerate_missing: true,
        },
        RemoteCommand::CreateShare {
            name: SHARE.to_string(),
            path: MOUNT_PATH.to_string(),
        },
        // update_access: delta derived from a live read
        RemoteCommand::ListShareAccess {
            share_name: SHARE.to_string(),
        },
        RemoteCommand::GrantShareAccess {
            share_name: SHARE.to_string(),
            principal: "alice".to_string(),
            right: AclRight::Change,
        },
        RemoteCommand::RefreshShareAcl {
            share_name: SHARE.to_string(),
        },
        // remove_export
        RemoteCommand::GetSharePath {
            name: SHARE.to_string(),
            tolerate_missing: true,
        },
        RemoteCommand::RemoveShare {
            name: SHARE.to_string(),
        },
        // unmount
        RemoteCommand::GetDiskByMountPath {
            mount_path: MOUNT_PATH.to_string(),
        },
        RemoteCommand::RemoveMountPoint {
            path: MOUNT_PATH.to_string(),
        },
        RemoteCommand::SetDiskOnline {
            disk_number: DISK,
            online: false,
        },
    ];

    assert_eq!(fake.issued(), expected);
    Ok(())
}
