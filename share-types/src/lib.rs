// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for the remote SMB share driver
//!
//! This crate defines the single source of truth for the driver's domain
//! types. These models are used throughout the stack:
//!
//! - **share-contracts**: Embeds them in the typed command surface
//! - **share-driver**: Consumes and produces them at every manager boundary
//!
//! Two families live here:
//!
//! - Domain types (`Disk`, `AccessRule`, …) — what the driver reasons about
//! - Wire records (`RawDiskRecord`, `RawAccessEntry`, …) — the JSON shapes
//!   remote queries answer with, converted into domain types at the edge
//!
//! None of these types are persisted locally. The remote server is the sole
//! authority for disk and access-list state, so every operation rebuilds
//! what it needs by query.

pub mod access;
pub mod disk;
pub mod host;
pub mod volume;

pub use access::{AccessKind, AccessLevel, AccessRule, AclControl, AclRight, RawAccessEntry};
pub use disk::{DATA_PARTITION_INDEX, Disk, OS_RESERVED_PARTITION_INDEX, Partition};
pub use disk::{RawDiskRecord, RawPartitionRecord};
pub use host::RemoteHost;
pub use volume::VolumeSpec;
