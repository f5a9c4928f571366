//! # kegos-sync
//!
//! Group membership reconciliation engine.
//!
//! The engine keeps the memberships of every identity in a target directory
//! aligned with the groups a source directory asserts, restricted to a
//! managed subtree rooted at a configured parent group.
//!
//! ## Cycle
//!
//! ```text
//! authenticate -> load managed groups -> snapshot identities
//!              -> for each identity: fetch source groups, diff, apply
//! ```
//!
//! [`Reconciler`] runs one cycle and returns a [`CycleOutcome`].
//! [`CycleDriver`] repeats cycles forever on a fixed interval.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod directory;
pub mod driver;
pub mod engine;
pub mod error;
pub mod index;
pub mod pagination;
pub mod reconcile;
pub mod report;
pub mod snapshot;

#[cfg(test)]
mod testing;

pub use config::{EngineSettings, EngineSettingsBuilder, DEFAULT_RECONCILE_INTERVAL};
pub use directory::{SourceDirectory, TargetDirectory};
pub use driver::{CycleDriver, DriverState};
pub use engine::Reconciler;
pub use error::{SyncError, SyncResult};
pub use index::ManagedGroups;
pub use pagination::{collect_pages, PageRequest, DEFAULT_PAGE_SIZE};
pub use reconcile::{apply_plan, MembershipPlan};
pub use report::{
    CycleAbort, CycleOutcome, CycleReport, CycleStage, EntityFailure, FailureKind,
};
pub use snapshot::{MembershipSnapshot, SnapshotSet};
