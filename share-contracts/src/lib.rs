// SPDX-License-Identifier: GPL-3.0-only

pub mod protocol;
pub mod traits;

pub use protocol::{CommandOutput, RemoteCommand, Result, ShareError};
pub use traits::RemoteExecutor;
