//! Membership snapshots.
//!
//! A snapshot is rebuilt from scratch every cycle. Identities whose groups
//! cannot be fetched are left out entirely: treating them as having no
//! memberships would trigger removals based on data we never saw.

use std::collections::{BTreeMap, BTreeSet};

use kegos_model::{Group, Identity};
use tracing::{debug, warn};

use crate::directory::TargetDirectory;
use crate::error::SyncResult;
use crate::index::ManagedGroups;
use crate::pagination::collect_pages;
use crate::report::{EntityFailure, FailureKind};

/// One identity's current memberships.
#[derive(Debug, Clone)]
pub struct MembershipSnapshot {
    /// The identity.
    pub identity: Identity,

    /// Memberships inside the managed subtree, keyed by group name.
    ///
    /// Same-named groups at different depths share one entry.
    pub managed: BTreeMap<String, Vec<Group>>,

    /// Names of the held groups that are direct children of the parent.
    pub direct: BTreeSet<String>,

    /// Memberships outside the managed subtree. Never mutated.
    pub unmanaged: Vec<Group>,
}

impl MembershipSnapshot {
    /// Splits `groups` into managed and unmanaged memberships.
    #[must_use]
    pub fn partition(identity: Identity, groups: Vec<Group>, index: &ManagedGroups) -> Self {
        let mut snapshot = Self {
            identity,
            managed: BTreeMap::new(),
            direct: BTreeSet::new(),
            unmanaged: Vec::new(),
        };

        for group in groups {
            if !index.is_managed(&group) {
                snapshot.unmanaged.push(group);
                continue;
            }
            if index.is_direct_child(&group) {
                snapshot.direct.insert(group.name.clone());
            }
            snapshot
                .managed
                .entry(group.name.clone())
                .or_default()
                .push(group);
        }

        snapshot
    }

    /// Returns the names of the managed memberships.
    #[must_use]
    pub fn managed_names(&self) -> BTreeSet<String> {
        self.managed.keys().cloned().collect()
    }

    /// Returns every managed membership named `name`.
    #[must_use]
    pub fn managed_groups(&self, name: &str) -> &[Group] {
        self.managed.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Snapshots of every identity that could be read this cycle.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSet {
    /// Identities with a complete membership list.
    pub snapshots: Vec<MembershipSnapshot>,

    /// Identities left out, with the reason.
    pub skipped: Vec<EntityFailure>,
}

impl SnapshotSet {
    /// Enumerates every identity and its memberships.
    ///
    /// Failing to list the identities fails the whole call. Failing to list
    /// one identity's groups only skips that identity.
    pub async fn build<T: TargetDirectory>(
        target: &T,
        index: &ManagedGroups,
        page_size: usize,
    ) -> SyncResult<Self> {
        let identities = collect_pages(page_size, move |page| target.list_users(page)).await?;
        debug!(identities = identities.len(), "enumerated target identities");

        let mut set = Self::default();
        for identity in identities {
            let identity_ref = &identity;
            let groups = collect_pages(page_size, move |page| {
                target.list_user_groups(identity_ref, page)
            })
            .await;

            match groups {
                Ok(groups) => set
                    .snapshots
                    .push(MembershipSnapshot::partition(identity, groups, index)),
                Err(e) => {
                    warn!(
                        user = %identity.username,
                        error = %e,
                        "failed getting user groups, ignoring user"
                    );
                    set.skipped.push(
                        EntityFailure::new(FailureKind::TargetGroupsFetch, &e)
                            .with_identity(identity.username.clone()),
                    );
                }
            }
        }

        Ok(set)
    }

    /// Returns the snapshot of `username`, if it was read.
    #[must_use]
    pub fn get(&self, username: &str) -> Option<&MembershipSnapshot> {
        self.snapshots
            .iter()
            .find(|s| s.identity.username == username)
    }
}
