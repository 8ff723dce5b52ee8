// SPDX-License-Identifier: GPL-3.0-only

use tracing_subscriber::EnvFilter;

/// Install a tracing subscriber for test binaries.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("share_driver=debug,warn")),
        )
        .with_test_writer()
        .try_init();
}
