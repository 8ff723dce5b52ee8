// SPDX-License-Identifier: GPL-3.0-only

mod executor;

pub use executor::RemoteExecutor;
