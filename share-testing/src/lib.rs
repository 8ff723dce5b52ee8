// SPDX-License-Identifier: GPL-3.0-only

//! Test doubles for the remote SMB share driver
//!
//! The driver core is exercised in tests purely through the transcript of
//! commands it issues, so the only double needed is a scripted
//! [`FakeRemoteExecutor`] standing in for the remote transport.

mod fake;
mod logging;

pub use fake::FakeRemoteExecutor;
pub use logging::init_test_logging;
