//! Engine settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::pagination::DEFAULT_PAGE_SIZE;

/// Default delay between two reconcile cycles.
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Settings shared by every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Name of the top-level group whose children mirror the source groups.
    pub parent_group: String,

    /// Source directory domain the identities are looked up in.
    pub source_domain: String,

    /// Page size used when enumerating the target system.
    pub page_size: usize,
}

impl EngineSettings {
    /// Creates a new settings builder.
    #[must_use]
    pub fn builder() -> EngineSettingsBuilder {
        EngineSettingsBuilder::new()
    }

    /// Checks the settings for values the engine cannot work with.
    pub fn validate(&self) -> SyncResult<()> {
        if self.parent_group.trim().is_empty() {
            return Err(SyncError::config("parent group name must not be empty"));
        }
        if self.parent_group.contains(kegos_model::PATH_SEPARATOR) {
            return Err(SyncError::config(format!(
                "parent group name must not contain '{}'",
                kegos_model::PATH_SEPARATOR
            )));
        }
        if self.source_domain.trim().is_empty() {
            return Err(SyncError::config("source domain must not be empty"));
        }
        if self.page_size == 0 {
            return Err(SyncError::config("page size must be positive"));
        }
        Ok(())
    }
}

/// Builder for [`EngineSettings`].
#[derive(Debug)]
pub struct EngineSettingsBuilder {
    parent_group: String,
    source_domain: String,
    page_size: usize,
}

impl Default for EngineSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineSettingsBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent_group: String::new(),
            source_domain: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the managed parent group name.
    #[must_use]
    pub fn parent_group(mut self, name: impl Into<String>) -> Self {
        self.parent_group = name.into();
        self
    }

    /// Sets the source domain.
    #[must_use]
    pub fn source_domain(mut self, domain: impl Into<String>) -> Self {
        self.source_domain = domain.into();
        self
    }

    /// Sets the target page size.
    #[must_use]
    pub const fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Builds and validates the settings.
    pub fn build(self) -> SyncResult<EngineSettings> {
        let settings = EngineSettings {
            parent_group: self.parent_group,
            source_domain: self.source_domain,
            page_size: self.page_size,
        };
        settings.validate()?;
        Ok(settings)
    }
}
