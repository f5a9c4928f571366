//! Membership reconciliation.
//!
//! The diff itself is a pure set computation ([`MembershipPlan::compute`]).
//! Applying it talks to the target and isolates every call: one failed
//! mutation never prevents the others.

use std::collections::BTreeSet;

use tracing::{debug, error};

use crate::directory::TargetDirectory;
use crate::index::ManagedGroups;
use crate::report::{CycleReport, EntityFailure, FailureKind};
use crate::snapshot::MembershipSnapshot;

/// Memberships to change for one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipPlan {
    /// Managed groups the identity holds but the source no longer asserts.
    pub to_remove: BTreeSet<String>,

    /// Groups the source asserts but the identity does not hold yet.
    pub to_add: BTreeSet<String>,
}

impl MembershipPlan {
    /// Computes the plan from the managed snapshot and the source set.
    ///
    /// `managed` must only contain managed-subtree memberships; anything
    /// else would become eligible for removal.
    #[must_use]
    pub fn compute(managed: &BTreeSet<String>, source: &BTreeSet<String>) -> Self {
        Self {
            to_remove: managed.difference(source).cloned().collect(),
            to_add: source.difference(managed).cloned().collect(),
        }
    }

    /// Computes the plan for one identity's snapshot.
    ///
    /// Every managed membership is eligible for removal, but only a direct
    /// child of the parent counts as held when deciding additions.
    #[must_use]
    pub fn for_snapshot(snapshot: &MembershipSnapshot, source: &BTreeSet<String>) -> Self {
        Self {
            to_remove: snapshot.managed_names().difference(source).cloned().collect(),
            to_add: source.difference(&snapshot.direct).cloned().collect(),
        }
    }

    /// Returns true if nothing needs to change.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// Returns the number of mutations in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_remove.len() + self.to_add.len()
    }

    /// Returns true if the plan is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_noop()
    }
}

/// Applies `plan` for the identity of `snapshot`.
///
/// Removals use the group handles from the snapshot. Additions resolve the
/// group through `index`, creating it if needed; when creation fails the
/// membership is skipped for this cycle. Every outcome is recorded in
/// `report`.
pub async fn apply_plan<T: TargetDirectory>(
    target: &T,
    index: &mut ManagedGroups,
    snapshot: &MembershipSnapshot,
    plan: &MembershipPlan,
    report: &mut CycleReport,
) {
    let identity = &snapshot.identity;

    for name in &plan.to_remove {
        for group in snapshot.managed_groups(name) {
            debug!(user = %identity.username, group = %group.path, "deleting user from group");
            match target.remove_membership(identity, group).await {
                Ok(()) => report.record_removed(),
                Err(e) => {
                    error!(
                        user = %identity.username,
                        group = %group.path,
                        error = %e,
                        "failed deleting user from group"
                    );
                    report.record_failure(
                        EntityFailure::new(FailureKind::MembershipRemove, &e)
                            .with_identity(identity.username.clone())
                            .with_group(name.clone()),
                    );
                }
            }
        }
    }

    for name in &plan.to_add {
        let group = match index.ensure_child(target, name).await {
            Ok((group, created)) => {
                if created {
                    report.record_group_created();
                }
                group.clone()
            }
            Err(e) => {
                error!(group = %name, error = %e, "failed creating group");
                report.record_failure(
                    EntityFailure::new(FailureKind::GroupCreate, &e)
                        .with_identity(identity.username.clone())
                        .with_group(name.clone()),
                );
                continue;
            }
        };

        debug!(user = %identity.username, group = %name, "adding user to group");
        match target.add_membership(identity, &group).await {
            Ok(()) => report.record_added(),
            Err(e) => {
                error!(
                    user = %identity.username,
                    group = %name,
                    error = %e,
                    "failed adding user to the group"
                );
                report.record_failure(
                    EntityFailure::new(FailureKind::MembershipAdd, &e)
                        .with_identity(identity.username.clone())
                        .with_group(name.clone()),
                );
            }
        }
    }
}
