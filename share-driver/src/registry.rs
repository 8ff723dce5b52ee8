// SPDX-License-Identifier: GPL-3.0-only

//! Protocol helper routing
//!
//! The routing table is built once at initialization and handed to
//! consumers by reference; there is no global lookup and no hidden shared
//! state. SMB and CIFS name the same protocol surface here and route to one
//! shared helper pair.

use std::collections::HashMap;
use std::sync::Arc;

use share_contracts::{RemoteExecutor, Result, ShareError};

use crate::access::AccessReconciler;
use crate::config::DriverConfig;
use crate::export::ShareExportManager;

/// Share protocols the driver can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShareProtocol {
    Smb,
    Cifs,
}

impl ShareProtocol {
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("smb") {
            Some(Self::Smb)
        } else if name.eq_ignore_ascii_case("cifs") {
            Some(Self::Cifs)
        } else {
            None
        }
    }
}

/// Export and access management for one protocol.
pub struct ProtocolHelper {
    pub exports: ShareExportManager,
    pub access: AccessReconciler,
}

pub struct HelperRegistry {
    routes: HashMap<ShareProtocol, Arc<ProtocolHelper>>,
}

impl HelperRegistry {
    /// Validate the configuration and build the fixed routing table.
    pub fn build(remote: Arc<dyn RemoteExecutor>, config: &DriverConfig) -> Result<Self> {
        config.validate()?;

        let helper = Arc::new(ProtocolHelper {
            exports: ShareExportManager::new(Arc::clone(&remote), config),
            access: AccessReconciler::new(remote),
        });

        let mut routes = HashMap::new();
        routes.insert(ShareProtocol::Smb, Arc::clone(&helper));
        routes.insert(ShareProtocol::Cifs, helper);
        Ok(Self { routes })
    }

    pub fn helper(&self, protocol: ShareProtocol) -> Result<Arc<ProtocolHelper>> {
        self.routes
            .get(&protocol)
            .cloned()
            .ok_or_else(|| ShareError::UnknownProtocol(format!("{protocol:?}")))
    }

    pub fn helper_by_name(&self, name: &str) -> Result<Arc<ProtocolHelper>> {
        let protocol = ShareProtocol::from_name(name)
            .ok_or_else(|| ShareError::UnknownProtocol(name.to_string()))?;
        self.helper(protocol)
    }
}
