//! One reconcile cycle.
//!
//! A cycle authenticates, resolves the managed subtree, snapshots every
//! identity, then compares each snapshot with the source and applies the
//! difference. Only the first three steps can abort the cycle.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::EngineSettings;
use crate::directory::{SourceDirectory, TargetDirectory};
use crate::index::ManagedGroups;
use crate::reconcile::{apply_plan, MembershipPlan};
use crate::report::{CycleAbort, CycleOutcome, CycleReport, CycleStage, EntityFailure, FailureKind};
use crate::snapshot::SnapshotSet;

/// Runs reconcile cycles between a target and a source directory.
#[derive(Debug)]
pub struct Reconciler<T, S> {
    target: T,
    source: S,
    settings: EngineSettings,
}

impl<T, S> Reconciler<T, S>
where
    T: TargetDirectory,
    S: SourceDirectory,
{
    /// Creates a reconciler.
    #[must_use]
    pub const fn new(target: T, source: S, settings: EngineSettings) -> Self {
        Self {
            target,
            source,
            settings,
        }
    }

    /// Returns the settings.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the target directory.
    #[must_use]
    pub const fn target(&self) -> &T {
        &self.target
    }

    /// Returns the source directory.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Runs one full collect, diff and apply pass.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let started_at = Utc::now();

        if let Err(e) = self.target.authenticate().await {
            error!(error = %e, "failed authenticating against the target directory");
            return CycleOutcome::Aborted(CycleAbort::new(CycleStage::Authenticate, &e, started_at));
        }

        let mut index = match ManagedGroups::load(
            &self.target,
            &self.settings.parent_group,
            self.settings.page_size,
        )
        .await
        {
            Ok(index) => index,
            Err(e) => {
                error!(error = %e, "failed getting groups from the target directory");
                return CycleOutcome::Aborted(CycleAbort::new(CycleStage::GroupIndex, &e, started_at));
            }
        };

        let snapshots = match SnapshotSet::build(&self.target, &index, self.settings.page_size).await {
            Ok(set) => set,
            Err(e) => {
                error!(error = %e, "failed getting users groups from the target directory");
                return CycleOutcome::Aborted(CycleAbort::new(
                    CycleStage::UserEnumeration,
                    &e,
                    started_at,
                ));
            }
        };

        let mut report = CycleReport::new(started_at);
        for failure in snapshots.skipped {
            report.record_failure(failure);
        }

        for snapshot in &snapshots.snapshots {
            let username = &snapshot.identity.username;
            info!(user = %username, "reconciling user groups");

            let source_groups = match self
                .source
                .groups_for_identity(&self.settings.source_domain, username)
                .await
            {
                Ok(groups) => groups.into_iter().collect::<BTreeSet<String>>(),
                Err(e) => {
                    warn!(
                        user = %username,
                        error = %e,
                        "failed getting groups from the source directory, ignoring user"
                    );
                    report.record_failure(
                        EntityFailure::new(FailureKind::SourceGroupsFetch, &e)
                            .with_identity(username.clone()),
                    );
                    continue;
                }
            };

            let plan = MembershipPlan::for_snapshot(snapshot, &source_groups);
            report.record_reconciled();
            if plan.is_noop() {
                debug!(user = %username, "user groups already in sync");
                continue;
            }

            apply_plan(&self.target, &mut index, snapshot, &plan, &mut report).await;
        }

        CycleOutcome::Completed(report.complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSource, FakeTarget};

    fn settings() -> EngineSettings {
        EngineSettings::builder()
            .parent_group("workspace")
            .source_domain("example.com")
            .build()
            .unwrap()
    }

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    /// Parent "workspace" with children {eng, sales}.
    fn workspace() -> FakeTarget {
        let target = FakeTarget::new();
        target.add_group("/workspace");
        target.add_group("/workspace/eng");
        target.add_group("/workspace/sales");
        target
    }

    fn report(outcome: &CycleOutcome) -> &CycleReport {
        outcome.report().expect("cycle should complete")
    }

    #[tokio::test]
    async fn alice_gains_existing_group() {
        let target = workspace();
        let alice = target.add_user("alice");
        target.join_path(&alice, "/workspace/eng");
        let source = FakeSource::new().with_groups("alice", &["eng", "sales"]);

        let reconciler = Reconciler::new(target.clone(), source, settings());
        let outcome = reconciler.run_cycle().await;

        assert_eq!(report(&outcome).memberships_added, 1);
        assert_eq!(target.added(), vec![("alice".to_string(), "sales".to_string())]);
        assert!(target.removed().is_empty());
        assert!(target.created_groups().is_empty());
    }

    #[tokio::test]
    async fn bob_loses_manual_group() {
        let target = workspace();
        target.add_group("/workspace/legacy");
        let bob = target.add_user("bob");
        target.join_path(&bob, "/workspace/eng");
        target.join_path(&bob, "/workspace/legacy");
        let source = FakeSource::new().with_groups("bob", &["eng"]);

        let reconciler = Reconciler::new(target.clone(), source, settings());
        let outcome = reconciler.run_cycle().await;

        assert_eq!(report(&outcome).memberships_removed, 1);
        assert_eq!(target.removed(), vec![("bob".to_string(), "legacy".to_string())]);
        assert!(target.added().is_empty());
    }

    #[tokio::test]
    async fn second_cycle_is_idempotent() {
        let target = workspace();
        let alice = target.add_user("alice");
        target.join_path(&alice, "/workspace/sales");
        target.add_user("bob");
        let source = FakeSource::new()
            .with_groups("alice", &["eng", "new-team"])
            .with_groups("bob", &["sales"]);

        let reconciler = Reconciler::new(target.clone(), source, settings());
        let first = reconciler.run_cycle().await;
        assert!(report(&first).total_changes() > 0);

        target.clear_calls();
        let second = reconciler.run_cycle().await;

        assert_eq!(report(&second).total_changes(), 0);
        assert!(target.added().is_empty());
        assert!(target.removed().is_empty());
        assert!(target.created_groups().is_empty());
        assert_eq!(target.member_names("alice"), names(&["eng", "new-team"]));
        assert_eq!(target.member_names("bob"), names(&["sales"]));
    }

    #[tokio::test]
    async fn creates_shared_group_once() {
        let target = workspace();
        for name in ["u1", "u2", "u3", "u4"] {
            target.add_user(name);
        }
        let source = ["u1", "u2", "u3", "u4"]
            .into_iter()
            .fold(FakeSource::new(), |source, user| source.with_groups(user, &["g"]));

        let reconciler = Reconciler::new(target.clone(), source, settings());
        let outcome = reconciler.run_cycle().await;

        assert_eq!(target.created_groups(), vec!["/workspace/g".to_string()]);
        assert_eq!(report(&outcome).groups_created, 1);
        assert_eq!(report(&outcome).memberships_added, 4);
    }

    #[tokio::test]
    async fn unmanaged_membership_is_never_touched() {
        let target = workspace();
        target.add_group("/eng");
        target.add_group("/workspace-archive");
        target.add_group("/workspace-archive/sales");
        let dave = target.add_user("dave");
        target.join_path(&dave, "/eng");
        target.join_path(&dave, "/workspace-archive/sales");
        let source = FakeSource::new().with_groups("dave", &["eng"]);

        let reconciler = Reconciler::new(target.clone(), source, settings());
        reconciler.run_cycle().await;

        // "eng" is added under the parent; "/eng" and the archive stay.
        assert!(target.removed().is_empty());
        assert_eq!(target.added(), vec![("dave".to_string(), "eng".to_string())]);
        assert!(target.is_member_of_path("dave", "/eng"));
        assert!(target.is_member_of_path("dave", "/workspace-archive/sales"));
    }

    #[tokio::test]
    async fn target_fetch_failure_isolates_identity() {
        let target = workspace();
        for name in ["a", "b", "c"] {
            let user = target.add_user(name);
            target.join_path(&user, "/workspace/eng");
        }
        target.fail_user_groups("b");
        let source = FakeSource::new()
            .with_groups("a", &["sales"])
            .with_groups("b", &["sales"])
            .with_groups("c", &["sales"]);

        let reconciler = Reconciler::new(target.clone(), source, settings());
        let outcome = reconciler.run_cycle().await;
        let report = report(&outcome);

        assert_eq!(report.identities_reconciled, 2);
        assert_eq!(report.identities_skipped, 1);
        assert_eq!(target.member_names("a"), names(&["sales"]));
        assert_eq!(target.member_names("b"), names(&["eng"]));
        assert_eq!(target.member_names("c"), names(&["sales"]));
    }

    #[tokio::test]
    async fn source_failure_isolates_identity() {
        let target = workspace();
        for name in ["a", "b"] {
            let user = target.add_user(name);
            target.join_path(&user, "/workspace/eng");
        }
        let source = FakeSource::new()
            .with_groups("a", &[])
            .failing_for("b");

        let reconciler = Reconciler::new(target.clone(), source, settings());
        let outcome = reconciler.run_cycle().await;
        let report = report(&outcome);

        assert_eq!(report.failures_for("b").count(), 1);
        assert_eq!(report.failures_of(FailureKind::SourceGroupsFetch).count(), 1);
        assert!(target.member_names("a").is_empty());
        assert_eq!(target.member_names("b"), names(&["eng"]));
    }

    #[tokio::test]
    async fn authentication_failure_aborts_cycle() {
        let target = workspace();
        target.add_user("alice");
        target.fail_authentication();
        let source = FakeSource::new().with_groups("alice", &["eng"]);

        let reconciler = Reconciler::new(target.clone(), source.clone(), settings());
        let outcome = reconciler.run_cycle().await;

        assert_eq!(outcome.abort().map(|a| a.stage), Some(CycleStage::Authenticate));
        assert_eq!(source.lookups(), 0);
        assert!(target.added().is_empty());
    }

    #[tokio::test]
    async fn user_enumeration_failure_aborts_cycle() {
        let target = workspace();
        target.fail_list_users();

        let reconciler = Reconciler::new(target.clone(), FakeSource::new(), settings());
        let outcome = reconciler.run_cycle().await;

        assert_eq!(outcome.abort().map(|a| a.stage), Some(CycleStage::UserEnumeration));
    }

    #[tokio::test]
    async fn parent_lookup_failure_aborts_cycle() {
        let target = workspace();
        target.fail_find_group();

        let reconciler = Reconciler::new(target.clone(), FakeSource::new(), settings());
        let outcome = reconciler.run_cycle().await;

        assert_eq!(outcome.abort().map(|a| a.stage), Some(CycleStage::GroupIndex));
    }

    #[tokio::test]
    async fn children_page_failure_aborts_cycle() {
        let target = workspace();
        target.add_user("alice");
        target.fail_children_from(2);
        let source = FakeSource::new().with_groups("alice", &["eng"]);
        let settings = EngineSettings::builder()
            .parent_group("workspace")
            .source_domain("example.com")
            .page_size(1)
            .build()
            .unwrap();

        let reconciler = Reconciler::new(target.clone(), source.clone(), settings);
        let outcome = reconciler.run_cycle().await;

        let abort = outcome.abort().expect("cycle should abort");
        assert_eq!(abort.stage, CycleStage::GroupIndex);
        assert!(abort.transient);
        assert_eq!(target.children_page_requests(), 2);
        assert_eq!(source.lookups(), 0);
        assert!(target.added().is_empty());
        assert!(target.created_groups().is_empty());
    }

    #[tokio::test]
    async fn nested_namesake_does_not_count_as_held() {
        let target = workspace();
        target.add_group("/workspace/platform");
        target.add_group("/workspace/platform/eng");
        let frank = target.add_user("frank");
        target.join_path(&frank, "/workspace/platform/eng");
        let source = FakeSource::new().with_groups("frank", &["eng"]);

        let reconciler = Reconciler::new(target.clone(), source, settings());
        let first = reconciler.run_cycle().await;

        assert_eq!(report(&first).memberships_added, 1);
        assert!(target.is_member_of_path("frank", "/workspace/eng"));
        assert!(target.is_member_of_path("frank", "/workspace/platform/eng"));
        assert!(target.removed().is_empty());

        target.clear_calls();
        let second = reconciler.run_cycle().await;
        assert_eq!(report(&second).total_changes(), 0);
    }

    #[tokio::test]
    async fn removal_covers_namesakes_at_every_depth() {
        let target = workspace();
        target.add_group("/workspace/platform/eng");
        let grace = target.add_user("grace");
        target.join_path(&grace, "/workspace/eng");
        target.join_path(&grace, "/workspace/platform/eng");
        let source = FakeSource::new().with_groups("grace", &[]);

        let reconciler = Reconciler::new(target.clone(), source, settings());
        let outcome = reconciler.run_cycle().await;

        assert_eq!(report(&outcome).memberships_removed, 2);
        assert!(target.member_names("grace").is_empty());
    }

    #[tokio::test]
    async fn first_run_creates_parent_and_children() {
        let target = FakeTarget::new();
        target.add_user("erin");
        let source = FakeSource::new().with_groups("erin", &["eng"]);

        let reconciler = Reconciler::new(target.clone(), source, settings());
        let outcome = reconciler.run_cycle().await;

        assert!(outcome.is_completed());
        assert_eq!(
            target.created_groups(),
            vec!["/workspace".to_string(), "/workspace/eng".to_string()]
        );
        assert_eq!(target.member_names("erin"), names(&["eng"]));
    }
}
