// SPDX-License-Identifier: GPL-3.0-only

//! Access-control models
//!
//! `AccessRule` is the boundary type callers exchange with the driver. The
//! `Raw*` types mirror the JSON payload the remote access-list query answers
//! with; they are classified exactly once (in the driver's parse step) and
//! never surfaced beyond it.

use serde::{Deserialize, Serialize};

/// Permission level of an access rule, as exposed at the driver boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessLevel {
    ReadOnly,
    ReadWrite,
}

/// Kind of principal an access rule applies to.
///
/// The SMB helper only manages `User` rules. `Ip` exists so rules coming
/// from other protocol helpers remain representable and are rejected with a
/// proper fault instead of failing to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    User,
    Ip,
}

/// A share-level access rule: principal identity plus permission level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    /// Principal identity. Compared case-insensitively wherever rules are
    /// diffed; account names are case insensitive on the remote host.
    pub principal: String,

    /// Granted permission level.
    pub level: AccessLevel,

    /// Principal kind.
    #[serde(rename = "type")]
    pub kind: AccessKind,
}

impl AccessRule {
    /// Convenience constructor for the only kind the SMB helper manages.
    pub fn user(principal: impl Into<String>, level: AccessLevel) -> Self {
        Self {
            principal: principal.into(),
            level,
            kind: AccessKind::User,
        }
    }
}

/// Allow/deny flag of a raw ACL entry, encoded numerically on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AclControl {
    Allow,
    Deny,
}

impl TryFrom<u8> for AclControl {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Allow),
            1 => Ok(Self::Deny),
            other => Err(format!("unknown access control type code {other}")),
        }
    }
}

impl From<AclControl> for u8 {
    fn from(control: AclControl) -> Self {
        match control {
            AclControl::Allow => 0,
            AclControl::Deny => 1,
        }
    }
}

/// Right class of a raw ACL entry, encoded numerically on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AclRight {
    Full,
    Change,
    Read,
    Custom,
}

impl TryFrom<u8> for AclRight {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Full),
            1 => Ok(Self::Change),
            2 => Ok(Self::Read),
            3 => Ok(Self::Custom),
            other => Err(format!("unknown access right code {other}")),
        }
    }
}

impl From<AclRight> for u8 {
    fn from(right: AclRight) -> Self {
        match right {
            AclRight::Full => 0,
            AclRight::Change => 1,
            AclRight::Read => 2,
            AclRight::Custom => 3,
        }
    }
}

impl AclRight {
    /// Cmdlet argument spelling of this right.
    pub fn parameter(self) -> &'static str {
        match self {
            Self::Full => "Full",
            Self::Change => "Change",
            Self::Read => "Read",
            Self::Custom => "Custom",
        }
    }
}

/// One record of the remote access list, as returned by the list-access
/// query (`Get-SmbShareAccess … | ConvertTo-Json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAccessEntry {
    #[serde(rename = "AccountName")]
    pub principal: String,

    #[serde(rename = "AccessControlType")]
    pub control: AclControl,

    #[serde(rename = "AccessRight")]
    pub right: AclRight,
}
