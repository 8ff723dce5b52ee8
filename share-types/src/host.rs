// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// Reference to the remote server commands are executed against.
///
/// The transport resolves the actual connection from this reference; the
/// driver core only reads the public address when deriving export locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteHost {
    /// Service instance identifier, used for log context.
    pub instance_id: String,

    /// Address clients use to reach exports on this host.
    pub public_address: String,
}

impl RemoteHost {
    pub fn new(instance_id: impl Into<String>, public_address: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            public_address: public_address.into(),
        }
    }
}
