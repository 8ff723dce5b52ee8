// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use share_types::RemoteHost;

use crate::protocol::{CommandOutput, RemoteCommand, Result};

/// Synchronous request/response command execution against a remote host.
///
/// Implementations bridge to the actual transport; the driver core issues
/// one command at a time, awaits each result before the next, and never
/// retries. A nonzero exit is a [`crate::ShareError::Transport`] fault
/// unless [`RemoteCommand::tolerates_failure`] holds, in which case the
/// implementation yields empty output instead.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn execute(&self, host: &RemoteHost, command: &RemoteCommand) -> Result<CommandOutput>;
}
