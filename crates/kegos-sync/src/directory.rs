//! Directory capabilities consumed by the engine.
//!
//! The engine never talks HTTP itself. It drives two collaborators:
//!
//! - a [`TargetDirectory`] holding identities, groups and memberships, which
//!   the engine reads and mutates (inside the managed subtree only), and
//! - a [`SourceDirectory`] asserting which groups each identity belongs to.
//!
//! Implementations should be thread-safe (Send + Sync) and own their
//! session state; the engine passes them around by reference.

use kegos_model::{Group, Identity};

use crate::error::SyncResult;
use crate::pagination::PageRequest;

// ============================================================================
// Target Directory
// ============================================================================

/// The system whose memberships are kept in line with the source.
#[allow(async_fn_in_trait)]
pub trait TargetDirectory: Send + Sync {
    /// Obtains or refreshes the session used by the other calls.
    ///
    /// Called once at the start of every cycle. A failure aborts the cycle.
    async fn authenticate(&self) -> SyncResult<()> {
        Ok(())
    }

    /// Returns one page of identities.
    async fn list_users(&self, page: PageRequest) -> SyncResult<Vec<Identity>>;

    /// Returns one page of the direct children of `parent`.
    async fn list_group_children(
        &self,
        parent: &Group,
        page: PageRequest,
    ) -> SyncResult<Vec<Group>>;

    /// Returns one page of the groups `identity` is a member of.
    async fn list_user_groups(
        &self,
        identity: &Identity,
        page: PageRequest,
    ) -> SyncResult<Vec<Group>>;

    /// Finds the top-level group named exactly `name`.
    async fn find_group_exact(&self, name: &str) -> SyncResult<Option<Group>>;

    /// Creates a group, as a child of `parent` when given.
    async fn create_group(&self, name: &str, parent: Option<&Group>) -> SyncResult<Group>;

    /// Makes `identity` a member of `group`.
    async fn add_membership(&self, identity: &Identity, group: &Group) -> SyncResult<()>;

    /// Removes `identity` from `group`.
    async fn remove_membership(&self, identity: &Identity, group: &Group) -> SyncResult<()>;
}

// ============================================================================
// Source Directory
// ============================================================================

/// The authoritative directory.
#[allow(async_fn_in_trait)]
pub trait SourceDirectory: Send + Sync {
    /// Returns the names of every group `username` belongs to in `domain`.
    ///
    /// Implementations handle their own pagination and return the complete
    /// list or an error.
    async fn groups_for_identity(&self, domain: &str, username: &str) -> SyncResult<Vec<String>>;
}
