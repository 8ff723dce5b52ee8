// SPDX-License-Identifier: GPL-3.0-only

//! Access-rule reconciliation
//!
//! The remote access list is the sole source of truth; deltas are computed
//! from a fresh read, never from a cached copy, because the list can change
//! out-of-band. Every grant or revoke is followed by an ACL refresh so
//! subsequent reads observe the mutation.

mod parse;

pub use parse::ParsedEntry;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use share_contracts::{RemoteCommand, RemoteExecutor, Result, ShareError};
use share_types::{AccessKind, AccessLevel, AccessRule, RawAccessEntry, RemoteHost};

/// Diff key for a rule. Account names are case insensitive on the remote
/// host, so principals are folded before comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct NormalizedRule {
    principal: String,
    level: AccessLevel,
    kind: AccessKind,
}

impl NormalizedRule {
    fn of(rule: &AccessRule) -> Self {
        Self {
            principal: rule.principal.to_lowercase(),
            level: rule.level,
            kind: rule.kind,
        }
    }
}

impl From<NormalizedRule> for AccessRule {
    fn from(rule: NormalizedRule) -> Self {
        Self {
            principal: rule.principal,
            level: rule.level,
            kind: rule.kind,
        }
    }
}

/// Fail-fast validation of rules reaching the SMB helper; runs before any
/// remote call. Levels are closed over read-only/read-write by
/// construction, so the principal kind is the only open dimension.
pub fn validate_rules<'a, I>(rules: I) -> Result<()>
where
    I: IntoIterator<Item = &'a AccessRule>,
{
    for rule in rules {
        if rule.kind != AccessKind::User {
            return Err(ShareError::InvalidAccessRule {
                principal: rule.principal.clone(),
                reason: format!("only user rules are supported, got {:?}", rule.kind),
            });
        }
    }
    Ok(())
}

pub struct AccessReconciler {
    remote: Arc<dyn RemoteExecutor>,
}

impl AccessReconciler {
    pub fn new(remote: Arc<dyn RemoteExecutor>) -> Self {
        Self { remote }
    }

    /// Read the raw access list of a share.
    pub async fn fetch_entries(
        &self,
        host: &RemoteHost,
        share_name: &str,
    ) -> Result<Vec<RawAccessEntry>> {
        let command = RemoteCommand::ListShareAccess {
            share_name: share_name.to_string(),
        };
        let output = self.remote.execute(host, &command).await?;
        let Some(raw) = output.trimmed() else {
            return Ok(Vec::new());
        };
        // The remote JSON encoder collapses a one-element list into a bare
        // object.
        if let Ok(entries) = serde_json::from_str::<Vec<RawAccessEntry>>(raw) {
            return Ok(entries);
        }
        serde_json::from_str::<RawAccessEntry>(raw)
            .map(|entry| vec![entry])
            .map_err(|error| {
                ShareError::UnexpectedOutput(format!("malformed access list payload: {error}"))
            })
    }

    /// Interpret raw entries, discarding everything that is not a rule.
    pub fn parse(&self, share_name: &str, entries: &[RawAccessEntry]) -> Vec<AccessRule> {
        let sole_entry = entries.len() == 1;
        entries
            .iter()
            .filter_map(|entry| match parse::classify(entry, sole_entry) {
                ParsedEntry::Allow(rule) => Some(rule),
                ParsedEntry::DenyPlaceholder => {
                    debug!(share_name, "no access rules are set yet");
                    None
                }
                ParsedEntry::ForeignDeny(entry) => {
                    warn!(
                        share_name,
                        ?entry,
                        "ignoring deny entry not created by this driver"
                    );
                    None
                }
                ParsedEntry::Unsupported(entry) => {
                    warn!(
                        share_name,
                        ?entry,
                        "ignoring entry with an unmanaged custom right"
                    );
                    None
                }
            })
            .collect()
    }

    /// Currently effective rules, from a live read.
    pub async fn access_rules(
        &self,
        host: &RemoteHost,
        share_name: &str,
    ) -> Result<Vec<AccessRule>> {
        let entries = self.fetch_entries(host, share_name).await?;
        Ok(self.parse(share_name, &entries))
    }

    /// Minimal delta turning `existing` into `desired`, as
    /// `(to_add, to_remove)` set differences with principals normalized.
    pub fn reconcile(
        &self,
        existing: &[AccessRule],
        desired: &[AccessRule],
    ) -> (Vec<AccessRule>, Vec<AccessRule>) {
        (subtract(desired, existing), subtract(existing, desired))
    }

    /// Grant one rule, then refresh the share ACL so later reads observe
    /// it.
    pub async fn grant(
        &self,
        host: &RemoteHost,
        share_name: &str,
        rule: &AccessRule,
    ) -> Result<()> {
        info!(
            share_name,
            principal = %rule.principal,
            level = ?rule.level,
            "granting share access"
        );
        self.remote
            .execute(
                host,
                &RemoteCommand::GrantShareAccess {
                    share_name: share_name.to_string(),
                    principal: rule.principal.clone(),
                    right: parse::right_for_level(rule.level),
                },
            )
            .await?;
        self.refresh_acl(host, share_name).await
    }

    /// Revoke a principal's access, then refresh the share ACL.
    pub async fn revoke(
        &self,
        host: &RemoteHost,
        share_name: &str,
        principal: &str,
    ) -> Result<()> {
        info!(share_name, principal, "revoking share access");
        self.remote
            .execute(
                host,
                &RemoteCommand::RevokeShareAccess {
                    share_name: share_name.to_string(),
                    principal: principal.to_string(),
                },
            )
            .await?;
        self.refresh_acl(host, share_name).await
    }

    async fn refresh_acl(&self, host: &RemoteHost, share_name: &str) -> Result<()> {
        self.remote
            .execute(
                host,
                &RemoteCommand::RefreshShareAcl {
                    share_name: share_name.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    /// Synchronize a share's access list with `desired`.
    ///
    /// Explicit add/remove lists are applied as given; otherwise the delta
    /// is derived against a fresh read of the remote list. All rules are
    /// validated before the first remote call.
    pub async fn update_access(
        &self,
        host: &RemoteHost,
        share_name: &str,
        desired: &[AccessRule],
        add: &[AccessRule],
        remove: &[AccessRule],
    ) -> Result<()> {
        validate_rules(desired.iter().chain(add).chain(remove))?;

        let (to_add, to_remove) = if add.is_empty() && remove.is_empty() {
            let existing = self.access_rules(host, share_name).await?;
            self.reconcile(&existing, desired)
        } else {
            (add.to_vec(), remove.to_vec())
        };

        for rule in &to_add {
            self.grant(host, share_name, rule).await?;
        }
        for rule in &to_remove {
            self.revoke(host, share_name, &rule.principal).await?;
        }
        Ok(())
    }
}

fn subtract(rules: &[AccessRule], subtracted: &[AccessRule]) -> Vec<AccessRule> {
    let keep: BTreeSet<NormalizedRule> = rules.iter().map(NormalizedRule::of).collect();
    let drop: BTreeSet<NormalizedRule> = subtracted.iter().map(NormalizedRule::of).collect();
    keep.difference(&drop)
        .cloned()
        .map(AccessRule::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use share_testing::FakeRemoteExecutor;
    use share_types::{AclControl, AclRight};

    fn host() -> RemoteHost {
        RemoteHost::new("instance-1", "10.0.0.5")
    }

    fn reconciler(fake: Arc<FakeRemoteExecutor>) -> AccessReconciler {
        AccessReconciler::new(fake)
    }

    fn rw(principal: &str) -> AccessRule {
        AccessRule::user(principal, AccessLevel::ReadWrite)
    }

    fn ro(principal: &str) -> AccessRule {
        AccessRule::user(principal, AccessLevel::ReadOnly)
    }

    const SENTINEL: &str = r#"[{"AccountName":"Everyone","AccessControlType":1,"AccessRight":3}]"#;

    #[test]
    fn reconcile_of_identical_sets_is_empty() {
        let rules = vec![rw("alice"), ro("bob")];
        let (to_add, to_remove) = reconciler(Arc::new(FakeRemoteExecutor::new()))
            .reconcile(&rules, &rules);
        assert!(to_add.is_empty());
        assert!(to_remove.is_empty());
    }

    #[test]
    fn reconcile_compares_principals_case_insensitively() {
        let existing = vec![rw("Alice")];
        let desired = vec![rw("alice")];
        let (to_add, to_remove) =
            reconciler(Arc::new(FakeRemoteExecutor::new())).reconcile(&existing, &desired);
        assert!(to_add.is_empty());
        assert!(to_remove.is_empty());
    }

    #[test]
    fn reconcile_computes_both_set_differences() {
        let existing = vec![rw("alice"), ro("bob")];
        let desired = vec![rw("alice"), ro("carol")];
        let (to_add, to_remove) =
            reconciler(Arc::new(FakeRemoteExecutor::new())).reconcile(&existing, &desired);
        assert_eq!(to_add, vec![ro("carol")]);
        assert_eq!(to_remove, vec![ro("bob")]);
    }

    #[test]
    fn a_level_change_is_an_add_plus_a_remove() {
        let existing = vec![ro("alice")];
        let desired = vec![rw("alice")];
        let (to_add, to_remove) =
            reconciler(Arc::new(FakeRemoteExecutor::new())).reconcile(&existing, &desired);
        assert_eq!(to_add, vec![rw("alice")]);
        assert_eq!(to_remove, vec![ro("alice")]);
    }

    #[test]
    fn surplus_existing_rules_are_removed_only() {
        let existing = vec![rw("alice"), ro("bob")];
        let desired = vec![rw("alice")];
        let (to_add, to_remove) =
            reconciler(Arc::new(FakeRemoteExecutor::new())).reconcile(&existing, &desired);
        assert!(to_add.is_empty());
        assert_eq!(to_remove, vec![ro("bob")]);
    }

    #[tokio::test]
    async fn fetch_accepts_a_collapsed_single_object_payload() {
        let fake = Arc::new(FakeRemoteExecutor::new().respond(|command| match command {
            RemoteCommand::ListShareAccess { .. } => Some(
                r#"{"AccountName":"alice","AccessControlType":0,"AccessRight":1}"#.to_string(),
            ),
            _ => None,
        }));

        let entries = reconciler(fake)
            .fetch_entries(&host(), "data01")
            .await
            .expect("fetch");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].principal, "alice");
        assert_eq!(entries[0].control, AclControl::Allow);
        assert_eq!(entries[0].right, AclRight::Change);
    }

    #[tokio::test]
    async fn malformed_access_payload_is_an_unexpected_output_fault() {
        let fake = Arc::new(FakeRemoteExecutor::new().respond(|command| match command {
            RemoteCommand::ListShareAccess { .. } => Some("not json".to_string()),
            _ => None,
        }));

        assert!(matches!(
            reconciler(fake).fetch_entries(&host(), "data01").await,
            Err(ShareError::UnexpectedOutput(_))
        ));
    }

    #[tokio::test]
    async fn granting_against_an_empty_share_issues_grant_then_refresh() {
        let fake = Arc::new(FakeRemoteExecutor::new().respond(|command| match command {
            RemoteCommand::ListShareAccess { .. } => Some(SENTINEL.to_string()),
            _ => None,
        }));

        reconciler(fake.clone())
            .update_access(&host(), "data01", &[rw("alice")], &[], &[])
            .await
            .expect("update");

        assert_eq!(
            fake.issued()[..],
            [
                RemoteCommand::ListShareAccess {
                    share_name: "data01".to_string()
                },
                RemoteCommand::GrantShareAccess {
                    share_name: "data01".to_string(),
                    principal: "alice".to_string(),
                    right: AclRight::Change,
                },
                RemoteCommand::RefreshShareAcl {
                    share_name: "data01".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn revoking_issues_revoke_then_refresh() {
        let fake = Arc::new(FakeRemoteExecutor::new().respond(|command| match command {
            RemoteCommand::ListShareAccess { .. } => Some(
                r#"[{"AccountName":"alice","AccessControlType":0,"AccessRight":1}]"#.to_string(),
            ),
            _ => None,
        }));

        reconciler(fake.clone())
            .update_access(&host(), "data01", &[], &[], &[])
            .await
            .expect("update");

        assert_eq!(
            fake.issued()[1..],
            [
                RemoteCommand::RevokeShareAccess {
                    share_name: "data01".to_string(),
                    principal: "alice".to_string(),
                },
                RemoteCommand::RefreshShareAcl {
                    share_name: "data01".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn foreign_and_custom_entries_never_reach_reconciliation() {
        // A foreign deny and a custom-right allow surround one real rule;
        // only the real rule must survive, so the desired state below is
        // already satisfied and nothing is granted or revoked.
        let fake = Arc::new(FakeRemoteExecutor::new().respond(|command| match command {
            RemoteCommand::ListShareAccess { .. } => Some(
                r#"[
                    {"AccountName":"mallory","AccessControlType":1,"AccessRight":0},
                    {"AccountName":"alice","AccessControlType":0,"AccessRight":2},
                    {"AccountName":"svc-backup","AccessControlType":0,"AccessRight":3}
                ]"#
                .to_string(),
            ),
            _ => None,
        }));

        reconciler(fake.clone())
            .update_access(&host(), "data01", &[ro("alice")], &[], &[])
            .await
            .expect("update");

        assert_eq!(fake.issued().len(), 1, "only the list query runs");
    }

    #[tokio::test]
    async fn explicit_lists_skip_the_live_read() {
        let fake = Arc::new(FakeRemoteExecutor::new());

        reconciler(fake.clone())
            .update_access(&host(), "data01", &[rw("alice")], &[ro("bob")], &[])
            .await
            .expect("update");

        let issued = fake.issued();
        assert!(
            !issued
                .iter()
                .any(|command| matches!(command, RemoteCommand::ListShareAccess { .. }))
        );
        assert_eq!(
            issued[..],
            [
                RemoteCommand::GrantShareAccess {
                    share_name: "data01".to_string(),
                    principal: "bob".to_string(),
                    right: AclRight::Read,
                },
                RemoteCommand::RefreshShareAcl {
                    share_name: "data01".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn unsupported_rule_kind_fails_before_any_remote_call() {
        let fake = Arc::new(FakeRemoteExecutor::new());
        let bad_rule = AccessRule {
            principal: "10.0.0.0/24".to_string(),
            level: AccessLevel::ReadWrite,
            kind: AccessKind::Ip,
        };

        let error = reconciler(fake.clone())
            .update_access(&host(), "data01", &[bad_rule], &[], &[])
            .await
            .expect_err("invalid rule");

        assert!(matches!(error, ShareError::InvalidAccessRule { .. }));
        assert!(fake.issued().is_empty());
    }
}
