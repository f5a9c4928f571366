//! Group domain model.
//!
//! Groups in the target system are hierarchical. The engine only ever
//! mutates the managed parent group's subtree, so most of this module is
//! about deciding whether a path lies below another one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between path segments (`/parent/child`).
pub const PATH_SEPARATOR: char = '/';

/// A target-system group.
///
/// All fields are required: a group handle only exists once the target
/// system has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier assigned by the target system.
    pub id: String,
    /// Group name, unique among its siblings.
    pub name: String,
    /// Full path from the root (e.g. `/workspace/eng@example.com`).
    pub path: String,
}

impl Group {
    /// Creates a group handle from its parts.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
        }
    }

    /// Creates a top-level group handle (`/name`).
    #[must_use]
    pub fn top_level(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = GroupPath::root().child(&name).to_path_string();
        Self {
            id: id.into(),
            name,
            path,
        }
    }

    /// Creates a handle for a direct child of `parent`.
    #[must_use]
    pub fn child_of(parent: &Self, id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = GroupPath::parse(&parent.path)
            .child(&name)
            .to_path_string();
        Self {
            id: id.into(),
            name,
            path,
        }
    }

    /// Returns the parsed path.
    #[must_use]
    pub fn group_path(&self) -> GroupPath {
        GroupPath::parse(&self.path)
    }

    /// Checks if this group lies strictly below `ancestor` in the hierarchy.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &Self) -> bool {
        GroupPath::is_strictly_below(&self.path, &ancestor.path)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.id)
    }
}

/// Parsed group path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPath {
    /// Path segments from root to leaf.
    pub segments: Vec<String>,
}

impl GroupPath {
    /// The empty (root) path.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses a group path string (e.g., "/parent/child/grandchild").
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let segments: Vec<String> = path
            .trim_start_matches(PATH_SEPARATOR)
            .split(PATH_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self { segments }
    }

    /// Returns a new path with `name` appended.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Returns the path as a string.
    #[must_use]
    pub fn to_path_string(&self) -> String {
        if self.segments.is_empty() {
            PATH_SEPARATOR.to_string()
        } else {
            format!("/{}", self.segments.join("/"))
        }
    }

    /// Returns the depth (number of segments).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Checks whether `path` starts with `ancestor` followed by a separator.
    ///
    /// `/workspace-archive/x` is not below `/workspace`, and a path is never
    /// below itself.
    #[must_use]
    pub fn is_strictly_below(path: &str, ancestor: &str) -> bool {
        let ancestor = ancestor.trim_end_matches(PATH_SEPARATOR);
        path.strip_prefix(ancestor)
            .and_then(|rest| rest.strip_prefix(PATH_SEPARATOR))
            .is_some_and(|rest| !rest.is_empty())
    }
}

impl fmt::Display for GroupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path_string())
    }
}
