//! Managed group index.
//!
//! Holds the managed parent group and a name -> group map of its direct
//! children. The map doubles as a read-through-create cache: a child that
//! is missing is created once and remembered for the rest of the cycle.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use kegos_model::Group;
use tracing::{debug, info};

use crate::directory::TargetDirectory;
use crate::error::SyncResult;
use crate::pagination::collect_pages;

/// The managed subtree as seen at the start of a cycle.
#[derive(Debug, Clone)]
pub struct ManagedGroups {
    parent: Group,
    children: BTreeMap<String, Group>,
}

impl ManagedGroups {
    /// Creates an index from already known groups.
    #[must_use]
    pub fn new(parent: Group, children: impl IntoIterator<Item = Group>) -> Self {
        let children = children
            .into_iter()
            .map(|group| (group.name.clone(), group))
            .collect();
        Self { parent, children }
    }

    /// Resolves the parent group named `parent_name`, creating it when absent,
    /// and enumerates its direct children.
    pub async fn load<T: TargetDirectory>(
        target: &T,
        parent_name: &str,
        page_size: usize,
    ) -> SyncResult<Self> {
        let parent = match target.find_group_exact(parent_name).await? {
            Some(group) => group,
            None => {
                info!(group = %parent_name, "managed parent group missing, creating it");
                let group = target.create_group(parent_name, None).await?;
                // A fresh parent has no children to enumerate.
                return Ok(Self::new(group, Vec::new()));
            }
        };

        let parent_ref = &parent;
        let children =
            collect_pages(page_size, move |page| target.list_group_children(parent_ref, page))
                .await?;
        debug!(
            group = %parent.path,
            children = children.len(),
            "loaded managed groups"
        );

        Ok(Self::new(parent, children))
    }

    /// Returns the managed parent group.
    #[must_use]
    pub const fn parent(&self) -> &Group {
        &self.parent
    }

    /// Returns the child named `name`, if known.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Group> {
        self.children.get(name)
    }

    /// Checks whether a child named `name` is known.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Returns the number of known children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if no child is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Checks whether `group` lies inside the managed subtree.
    #[must_use]
    pub fn is_managed(&self, group: &Group) -> bool {
        group.is_descendant_of(&self.parent)
    }

    /// Checks whether `group` sits directly below the managed parent.
    #[must_use]
    pub fn is_direct_child(&self, group: &Group) -> bool {
        self.is_managed(group)
            && group.group_path().depth() == self.parent.group_path().depth() + 1
    }

    /// Returns the child named `name`, creating it under the parent first if
    /// needed.
    ///
    /// The boolean is true when this call created the group. On error nothing
    /// is cached, so a later identity will try again.
    pub async fn ensure_child<T: TargetDirectory>(
        &mut self,
        target: &T,
        name: &str,
    ) -> SyncResult<(&Group, bool)> {
        match self.children.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                let group: &Group = entry.into_mut();
                Ok((group, false))
            }
            Entry::Vacant(entry) => {
                debug!(group = %name, parent = %self.parent.path, "creating missing group");
                let created = target.create_group(name, Some(&self.parent)).await?;
                let group: &Group = entry.insert(created);
                Ok((group, true))
            }
        }
    }
}
