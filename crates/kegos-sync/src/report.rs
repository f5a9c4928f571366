//! Cycle outcomes.
//!
//! Every cycle produces either a [`CycleReport`] listing what was changed and
//! which entities failed, or a [`CycleAbort`] when the cycle could not even
//! start its per-identity work.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

// ============================================================================
// Entity Failures
// ============================================================================

/// Which per-entity operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Fetching the identity's groups from the target failed.
    TargetGroupsFetch,

    /// Fetching the identity's groups from the source failed.
    SourceGroupsFetch,

    /// Creating a managed child group failed.
    GroupCreate,

    /// Adding a membership failed.
    MembershipAdd,

    /// Removing a membership failed.
    MembershipRemove,
}

impl FailureKind {
    /// Returns true if the failure excluded the whole identity from the cycle.
    #[must_use]
    pub const fn skips_identity(&self) -> bool {
        matches!(self, Self::TargetGroupsFetch | Self::SourceGroupsFetch)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TargetGroupsFetch => "target groups fetch",
            Self::SourceGroupsFetch => "source groups fetch",
            Self::GroupCreate => "group creation",
            Self::MembershipAdd => "membership addition",
            Self::MembershipRemove => "membership removal",
        };
        f.write_str(label)
    }
}

/// A failure scoped to one identity and/or one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityFailure {
    /// Failed operation.
    pub kind: FailureKind,

    /// Username (if the failure concerns an identity).
    pub identity: Option<String>,

    /// Group name (if the failure concerns a group).
    pub group: Option<String>,

    /// Error message.
    pub message: String,

    /// Whether the same call is likely to succeed next cycle.
    pub transient: bool,
}

impl EntityFailure {
    /// Creates a new failure from the underlying error.
    #[must_use]
    pub fn new(kind: FailureKind, error: &SyncError) -> Self {
        Self {
            kind,
            identity: None,
            group: None,
            message: error.to_string(),
            transient: error.is_transient(),
        }
    }

    /// Sets the identity.
    #[must_use]
    pub fn with_identity(mut self, username: impl Into<String>) -> Self {
        self.identity = Some(username.into());
        self
    }

    /// Sets the group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

// ============================================================================
// Cycle Report
// ============================================================================

/// Result of a cycle that ran to completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    /// Identities whose memberships were compared.
    pub identities_reconciled: usize,

    /// Identities excluded from this cycle.
    pub identities_skipped: usize,

    /// Managed child groups created.
    pub groups_created: usize,

    /// Memberships added.
    pub memberships_added: usize,

    /// Memberships removed.
    pub memberships_removed: usize,

    /// When the cycle started.
    pub started_at: DateTime<Utc>,

    /// When the cycle completed.
    pub completed_at: DateTime<Utc>,

    /// Per-entity failures, in the order they happened.
    pub failures: Vec<EntityFailure>,
}

impl CycleReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            identities_reconciled: 0,
            identities_skipped: 0,
            groups_created: 0,
            memberships_added: 0,
            memberships_removed: 0,
            started_at,
            completed_at: started_at,
            failures: Vec::new(),
        }
    }

    /// Marks the cycle as complete.
    #[must_use]
    pub fn complete(mut self) -> Self {
        self.completed_at = Utc::now();
        self
    }

    /// Records an identity whose plan was computed.
    pub fn record_reconciled(&mut self) {
        self.identities_reconciled += 1;
    }

    /// Records a created group.
    pub fn record_group_created(&mut self) {
        self.groups_created += 1;
    }

    /// Records an added membership.
    pub fn record_added(&mut self) {
        self.memberships_added += 1;
    }

    /// Records a removed membership.
    pub fn record_removed(&mut self) {
        self.memberships_removed += 1;
    }

    /// Records a failure.
    pub fn record_failure(&mut self, failure: EntityFailure) {
        if failure.kind.skips_identity() {
            self.identities_skipped += 1;
        }
        self.failures.push(failure);
    }

    /// Returns the number of mutations applied.
    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.groups_created + self.memberships_added + self.memberships_removed
    }

    /// Returns the number of failures expected to clear up on their own.
    #[must_use]
    pub fn transient_failures(&self) -> usize {
        self.failures.iter().filter(|f| f.transient).count()
    }

    /// Returns true if any entity failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Returns the failures of one kind.
    pub fn failures_of(&self, kind: FailureKind) -> impl Iterator<Item = &EntityFailure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }

    /// Returns the failures concerning one identity.
    pub fn failures_for<'a>(&'a self, username: &'a str) -> impl Iterator<Item = &'a EntityFailure> {
        self.failures
            .iter()
            .filter(move |f| f.identity.as_deref() == Some(username))
    }

    /// One-line summary for logs.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} reconciled, {} skipped, {} groups created, {} added, {} removed, {} failed",
            self.identities_reconciled,
            self.identities_skipped,
            self.groups_created,
            self.memberships_added,
            self.memberships_removed,
            self.failures.len()
        )
    }
}

// ============================================================================
// Cycle Abort
// ============================================================================

/// Stage at which a cycle was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStage {
    /// Obtaining a target session.
    Authenticate,

    /// Resolving the managed parent group and its children.
    GroupIndex,

    /// Enumerating target identities.
    UserEnumeration,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Authenticate => "authentication",
            Self::GroupIndex => "managed group lookup",
            Self::UserEnumeration => "user enumeration",
        };
        f.write_str(label)
    }
}

/// A cycle that stopped before processing any identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleAbort {
    /// Stage that failed.
    pub stage: CycleStage,

    /// Error message.
    pub message: String,

    /// Whether the next cycle is likely to get past this stage.
    pub transient: bool,

    /// When the cycle started.
    pub started_at: DateTime<Utc>,
}

impl CycleAbort {
    /// Creates a new abort record.
    #[must_use]
    pub fn new(stage: CycleStage, error: &SyncError, started_at: DateTime<Utc>) -> Self {
        Self {
            stage,
            message: error.to_string(),
            transient: error.is_transient(),
            started_at,
        }
    }
}

/// Outcome of one cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The cycle processed every identity it could.
    Completed(CycleReport),

    /// The cycle could not start.
    Aborted(CycleAbort),
}

impl CycleOutcome {
    /// Returns the report if the cycle completed.
    #[must_use]
    pub const fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Aborted(_) => None,
        }
    }

    /// Returns the abort record if the cycle stopped early.
    #[must_use]
    pub const fn abort(&self) -> Option<&CycleAbort> {
        match self {
            Self::Completed(_) => None,
            Self::Aborted(abort) => Some(abort),
        }
    }

    /// Returns true if the cycle completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}
