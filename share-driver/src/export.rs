// SPDX-License-Identifier: GPL-3.0-only

//! Network export management
//!
//! Creation and removal are idempotent: both probe for the share first and
//! skip the remote mutation when there is nothing to do. Export locations
//! are always derived from the current host address, never read back from
//! the remote side, which is what makes host migration a pure re-derivation.

use std::sync::Arc;

use tracing::{debug, info};

use share_contracts::{RemoteCommand, RemoteExecutor, Result, ShareError};
use share_types::RemoteHost;

use crate::config::DriverConfig;
use crate::paths::{self, MountPathResolver};

pub struct ShareExportManager {
    remote: Arc<dyn RemoteExecutor>,
    paths: MountPathResolver,
}

impl ShareExportManager {
    pub fn new(remote: Arc<dyn RemoteExecutor>, config: &DriverConfig) -> Self {
        Self {
            remote,
            paths: MountPathResolver::new(config),
        }
    }

    /// Canonical export location of a share on a host.
    pub fn export_location(host: &RemoteHost, share_name: &str) -> String {
        format!(r"\\{}\{}", host.public_address, share_name)
    }

    /// Share name encoded in a previously recorded export location.
    pub fn share_name_from_export(export_location: &str) -> String {
        paths::normalize_separators(export_location)
            .split('\\')
            .next_back()
            .unwrap_or_default()
            .to_string()
    }

    /// Verify the remote share surface answers at all.
    pub async fn ensure_smb_available(&self, host: &RemoteHost) -> Result<()> {
        self.remote.execute(host, &RemoteCommand::ListShares).await?;
        Ok(())
    }

    /// Expose the share's mount path as a network export.
    ///
    /// Idempotent; always returns the canonical export location.
    pub async fn create_export(&self, host: &RemoteHost, share_name: &str) -> Result<String> {
        if self.exists(host, share_name).await? {
            info!(share_name, "skipping creating export, it already exists");
        } else {
            let path = self.paths.resolve(share_name);
            self.remote
                .execute(
                    host,
                    &RemoteCommand::CreateShare {
                        name: share_name.to_string(),
                        path,
                    },
                )
                .await?;
        }
        Ok(Self::export_location(host, share_name))
    }

    /// Remove the share's network export, if it exists.
    pub async fn remove_export(&self, host: &RemoteHost, share_name: &str) -> Result<()> {
        if self.exists(host, share_name).await? {
            self.remote
                .execute(
                    host,
                    &RemoteCommand::RemoveShare {
                        name: share_name.to_string(),
                    },
                )
                .await?;
        } else {
            debug!(share_name, "skipping removing export, it does not exist");
        }
        Ok(())
    }

    /// Export locations for a share after a possible host address change.
    pub fn exports_for_share(host: &RemoteHost, old_export_location: &str) -> Vec<String> {
        let share_name = Self::share_name_from_export(old_export_location);
        vec![Self::export_location(host, &share_name)]
    }

    /// Filesystem path backing a share. Strict: an absent share is a fault.
    pub async fn share_path_by_name(&self, host: &RemoteHost, share_name: &str) -> Result<String> {
        let command = RemoteCommand::GetSharePath {
            name: share_name.to_string(),
            tolerate_missing: false,
        };
        let output = self.remote.execute(host, &command).await?;
        match output.trimmed() {
            Some(path) => Ok(path.to_string()),
            None => Err(ShareError::ShareNotFound(share_name.to_string())),
        }
    }

    /// Filesystem path backing the share a recorded export location names.
    pub async fn share_path_by_export_location(
        &self,
        host: &RemoteHost,
        export_location: &str,
    ) -> Result<String> {
        let share_name = Self::share_name_from_export(export_location);
        self.share_path_by_name(host, &share_name).await
    }

    /// Existence probe; never raises not-found.
    pub async fn exists(&self, host: &RemoteHost, share_name: &str) -> Result<bool> {
        let command = RemoteCommand::GetSharePath {
            name: share_name.to_string(),
            tolerate_missing: true,
        };
        let output = self.remote.execute(host, &command).await?;
        Ok(output.trimmed().is_some())
    }
}
