// SPDX-License-Identifier: GPL-3.0-only

//! Raw ACL entry classification
//!
//! Wire entries are interpreted exactly once, here. Downstream
//! reconciliation only sees the tagged result and never re-inspects raw
//! fields.

use share_types::{AccessKind, AccessLevel, AccessRule, AclControl, AclRight, RawAccessEntry};

/// Principal the remote host uses for world ACEs.
const EVERYONE: &str = "everyone";

/// Classification of one raw remote ACL entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEntry {
    /// A supported allow entry, surfaced as a rule.
    Allow(AccessRule),
    /// The synthetic deny entry meaning "no rules configured yet".
    DenyPlaceholder,
    /// A deny entry this driver did not create.
    ForeignDeny(RawAccessEntry),
    /// An allow entry whose right class the driver does not manage.
    Unsupported(RawAccessEntry),
}

/// Classify one entry. `sole_entry` is true when the access list holds
/// exactly this record; the placeholder only counts when it stands alone.
pub(crate) fn classify(entry: &RawAccessEntry, sole_entry: bool) -> ParsedEntry {
    match entry.control {
        AclControl::Deny if sole_entry && entry.principal.eq_ignore_ascii_case(EVERYONE) => {
            ParsedEntry::DenyPlaceholder
        }
        AclControl::Deny => ParsedEntry::ForeignDeny(entry.clone()),
        AclControl::Allow => match level_for_right(entry.right) {
            Some(level) => ParsedEntry::Allow(AccessRule {
                principal: entry.principal.clone(),
                level,
                kind: AccessKind::User,
            }),
            None => ParsedEntry::Unsupported(entry.clone()),
        },
    }
}

/// Remote right class → access level. `Custom` has no mapping; callers
/// discard those entries.
pub(crate) fn level_for_right(right: AclRight) -> Option<AccessLevel> {
    match right {
        AclRight::Full | AclRight::Change => Some(AccessLevel::ReadWrite),
        AclRight::Read => Some(AccessLevel::ReadOnly),
        AclRight::Custom => None,
    }
}

/// Access level → remote right class used when granting.
pub(crate) fn right_for_level(level: AccessLevel) -> AclRight {
    match level {
        AccessLevel::ReadWrite => AclRight::Change,
        AccessLevel::ReadOnly => AclRight::Read,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(principal: &str, control: AclControl, right: AclRight) -> RawAccessEntry {
        RawAccessEntry {
            principal: principal.to_string(),
            control,
            right,
        }
    }

    #[test]
    fn sole_everyone_deny_is_the_placeholder() {
        let everyone = entry("Everyone", AclControl::Deny, AclRight::Custom);
        assert_eq!(classify(&everyone, true), ParsedEntry::DenyPlaceholder);
    }

    #[test]
    fn everyone_deny_among_other_entries_is_foreign() {
        let everyone = entry("Everyone", AclControl::Deny, AclRight::Custom);
        assert!(matches!(
            classify(&everyone, false),
            ParsedEntry::ForeignDeny(_)
        ));
    }

    #[test]
    fn deny_for_a_named_principal_is_foreign_even_when_sole() {
        let deny = entry("mallory", AclControl::Deny, AclRight::Read);
        assert!(matches!(classify(&deny, true), ParsedEntry::ForeignDeny(_)));
    }

    #[test]
    fn full_and_change_both_map_to_read_write() {
        for right in [AclRight::Full, AclRight::Change] {
            let allowed = classify(&entry("alice", AclControl::Allow, right), false);
            assert_eq!(
                allowed,
                ParsedEntry::Allow(AccessRule::user("alice", AccessLevel::ReadWrite))
            );
        }
    }

    #[test]
    fn custom_right_is_unsupported() {
        let custom = entry("alice", AclControl::Allow, AclRight::Custom);
        assert!(matches!(
            classify(&custom, false),
            ParsedEntry::Unsupported(_)
        ));
    }

    #[test]
    fn grant_rights_mirror_the_level_map() {
        assert_eq!(right_for_level(AccessLevel::ReadWrite), AclRight::Change);
        assert_eq!(right_for_level(AccessLevel::ReadOnly), AclRight::Read);
    }
}
