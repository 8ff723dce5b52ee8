// SPDX-License-Identifier: GPL-3.0-only

//! Mount path derivation

use crate::config::DriverConfig;

/// Deterministic derivation of a local mount path from share identity.
#[derive(Debug, Clone)]
pub struct MountPathResolver {
    mount_root: String,
}

impl MountPathResolver {
    pub fn new(config: &DriverConfig) -> Self {
        Self {
            mount_root: config.mount_root.clone(),
        }
    }

    /// Join the mount root and the share name, in the remote host's
    /// separator convention.
    pub fn resolve(&self, share_name: &str) -> String {
        let root = self.mount_root.trim_end_matches(['/', '\\']);
        normalize_separators(&format!("{root}/{share_name}"))
    }
}

/// Normalize path separators to the remote host's backslash convention.
pub fn normalize_separators(path: &str) -> String {
    path.replace('/', "\\")
}
