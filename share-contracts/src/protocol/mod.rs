// SPDX-License-Identifier: GPL-3.0-only

mod command;
mod error;
mod output;

pub use command::RemoteCommand;
pub use error::{Result, ShareError};
pub use output::CommandOutput;
