// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Fault taxonomy for driver operations.
#[derive(Debug, Error)]
pub enum ShareError {
    /// A remote command or the transport itself failed. Propagated
    /// immediately; the core never retries.
    #[error("remote command failed on {host}: {detail}")]
    Transport { host: String, detail: String },

    #[error("share {0} was not found on the remote host")]
    ShareNotFound(String),

    #[error("no disk could be located for volume {0}")]
    DiskNotFound(String),

    /// Raised before any remote call when a caller-supplied rule is outside
    /// what the SMB helper manages.
    #[error("unsupported access rule for {principal}: {reason}")]
    InvalidAccessRule { principal: String, reason: String },

    #[error("no helper is registered for protocol {0}")]
    UnknownProtocol(String),

    /// The disk bound at a mount path is not the disk the volume's serial
    /// number identifies. Fatal; never auto-corrected.
    #[error(
        "unexpected disk mounted at {mount_path}: expected disk {expected:?}, found disk {actual}"
    )]
    MountedDiskMismatch {
        mount_path: String,
        expected: Option<u32>,
        actual: u32,
    },

    #[error("could not interpret remote output: {0}")]
    UnexpectedOutput(String),

    #[error("invalid driver configuration: {0}")]
    InvalidConfig(String),
}

impl ShareError {
    pub fn transport(host: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Transport {
            host: host.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShareError>;
