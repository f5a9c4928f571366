//! In-memory directories for engine tests.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use kegos_model::{Group, GroupPath, Identity};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::directory::{SourceDirectory, TargetDirectory};
use crate::error::{SyncError, SyncResult};
use crate::pagination::PageRequest;

#[derive(Debug, Default)]
struct TargetState {
    users: Vec<Identity>,
    groups: Vec<Group>,
    memberships: BTreeSet<(String, String)>,

    fail_authentication: bool,
    fail_find_group: bool,
    fail_children_from: Option<usize>,
    fail_list_users: bool,
    fail_user_groups: HashSet<String>,
    fail_create: HashSet<String>,
    fail_add: HashSet<(String, String)>,
    fail_add_once: HashSet<(String, String)>,
    fail_remove: HashSet<(String, String)>,

    authentication_attempts: usize,
    children_page_requests: usize,
    created: Vec<String>,
    added: Vec<(String, String)>,
    removed: Vec<(String, String)>,
}

impl TargetState {
    fn group(&self, id: &str) -> &Group {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .expect("unknown group")
    }

    fn user_id(&self, username: &str) -> String {
        self.users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.id.clone())
            .expect("unknown user")
    }
}

fn page_of<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    items.iter().skip(page.first).take(page.max).cloned().collect()
}

/// Target directory backed by vectors, with failure injection.
#[derive(Debug, Clone, Default)]
pub struct FakeTarget {
    state: Arc<Mutex<TargetState>>,
}

impl FakeTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, username: &str) -> Identity {
        let identity = Identity::new(Uuid::now_v7().to_string(), username);
        self.state.lock().users.push(identity.clone());
        identity
    }

    /// Adds a group at `path`; its name is the last segment.
    pub fn add_group(&self, path: &str) -> Group {
        let parsed = GroupPath::parse(path);
        let name = parsed.segments.last().expect("group path needs a name");
        let group = Group::new(Uuid::now_v7().to_string(), name, parsed.to_path_string());
        self.state.lock().groups.push(group.clone());
        group
    }

    pub fn join(&self, identity: &Identity, group: &Group) {
        self.state
            .lock()
            .memberships
            .insert((identity.id.clone(), group.id.clone()));
    }

    pub fn join_path(&self, identity: &Identity, path: &str) {
        let mut state = self.state.lock();
        let group = state
            .groups
            .iter()
            .find(|g| g.path == path)
            .map(|g| g.id.clone())
            .expect("unknown group path");
        state.memberships.insert((identity.id.clone(), group));
    }

    pub fn member_names(&self, username: &str) -> BTreeSet<String> {
        let state = self.state.lock();
        let user = state.user_id(username);
        state
            .memberships
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, g)| state.group(g).name.clone())
            .collect()
    }

    pub fn is_member_of_path(&self, username: &str, path: &str) -> bool {
        let state = self.state.lock();
        let user = state.user_id(username);
        state
            .memberships
            .iter()
            .any(|(u, g)| *u == user && state.group(g).path == path)
    }

    pub fn fail_authentication(&self) {
        self.state.lock().fail_authentication = true;
    }

    pub fn fail_find_group(&self) {
        self.state.lock().fail_find_group = true;
    }

    /// Fails every children page request from the `nth` one (1-based).
    pub fn fail_children_from(&self, nth: usize) {
        self.state.lock().fail_children_from = Some(nth);
    }

    pub fn fail_list_users(&self) {
        self.state.lock().fail_list_users = true;
    }

    pub fn fail_user_groups(&self, username: &str) {
        self.state.lock().fail_user_groups.insert(username.to_string());
    }

    pub fn fail_create(&self, name: &str) {
        self.state.lock().fail_create.insert(name.to_string());
    }

    pub fn fail_add(&self, username: &str, group: &str) {
        self.state
            .lock()
            .fail_add
            .insert((username.to_string(), group.to_string()));
    }

    pub fn fail_add_once(&self, username: &str, group: &str) {
        self.state
            .lock()
            .fail_add_once
            .insert((username.to_string(), group.to_string()));
    }

    pub fn fail_remove(&self, username: &str, group: &str) {
        self.state
            .lock()
            .fail_remove
            .insert((username.to_string(), group.to_string()));
    }

    pub fn authentication_attempts(&self) -> usize {
        self.state.lock().authentication_attempts
    }

    pub fn children_page_requests(&self) -> usize {
        self.state.lock().children_page_requests
    }

    /// Paths of the groups created through the trait.
    pub fn created_groups(&self) -> Vec<String> {
        self.state.lock().created.clone()
    }

    /// Successful additions as (username, group name).
    pub fn added(&self) -> Vec<(String, String)> {
        self.state.lock().added.clone()
    }

    /// Successful removals as (username, group name).
    pub fn removed(&self) -> Vec<(String, String)> {
        self.state.lock().removed.clone()
    }

    pub fn clear_calls(&self) {
        let mut state = self.state.lock();
        state.created.clear();
        state.added.clear();
        state.removed.clear();
    }
}

impl TargetDirectory for FakeTarget {
    async fn authenticate(&self) -> SyncResult<()> {
        let mut state = self.state.lock();
        state.authentication_attempts += 1;
        if state.fail_authentication {
            return Err(SyncError::auth_failed("invalid client credentials"));
        }
        Ok(())
    }

    async fn list_users(&self, page: PageRequest) -> SyncResult<Vec<Identity>> {
        let state = self.state.lock();
        if state.fail_list_users {
            return Err(SyncError::api(500, "users unavailable"));
        }
        Ok(page_of(&state.users, page))
    }

    async fn list_group_children(
        &self,
        parent: &Group,
        page: PageRequest,
    ) -> SyncResult<Vec<Group>> {
        let mut state = self.state.lock();
        state.children_page_requests += 1;
        if state
            .fail_children_from
            .is_some_and(|nth| state.children_page_requests >= nth)
        {
            return Err(SyncError::connection("connection reset"));
        }
        let depth = parent.group_path().depth() + 1;
        let children: Vec<Group> = state
            .groups
            .iter()
            .filter(|g| g.is_descendant_of(parent) && g.group_path().depth() == depth)
            .cloned()
            .collect();
        Ok(page_of(&children, page))
    }

    async fn list_user_groups(
        &self,
        identity: &Identity,
        page: PageRequest,
    ) -> SyncResult<Vec<Group>> {
        let state = self.state.lock();
        if state.fail_user_groups.contains(&identity.username) {
            return Err(SyncError::connection("connection reset"));
        }
        let groups: Vec<Group> = state
            .memberships
            .iter()
            .filter(|(u, _)| *u == identity.id)
            .map(|(_, g)| state.group(g).clone())
            .collect();
        Ok(page_of(&groups, page))
    }

    async fn find_group_exact(&self, name: &str) -> SyncResult<Option<Group>> {
        let state = self.state.lock();
        if state.fail_find_group {
            return Err(SyncError::api(503, "groups unavailable"));
        }
        let path = GroupPath::root().child(name).to_path_string();
        Ok(state.groups.iter().find(|g| g.path == path).cloned())
    }

    async fn create_group(&self, name: &str, parent: Option<&Group>) -> SyncResult<Group> {
        let mut state = self.state.lock();
        if state.fail_create.contains(name) {
            return Err(SyncError::api(409, "conflict"));
        }
        let group = match parent {
            Some(parent) => Group::child_of(parent, Uuid::now_v7().to_string(), name),
            None => Group::top_level(Uuid::now_v7().to_string(), name),
        };
        state.created.push(group.path.clone());
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn add_membership(&self, identity: &Identity, group: &Group) -> SyncResult<()> {
        let mut state = self.state.lock();
        let key = (identity.username.clone(), group.name.clone());
        if state.fail_add.contains(&key) || state.fail_add_once.remove(&key) {
            return Err(SyncError::api(500, "membership update failed"));
        }
        state
            .memberships
            .insert((identity.id.clone(), group.id.clone()));
        state.added.push(key);
        Ok(())
    }

    async fn remove_membership(&self, identity: &Identity, group: &Group) -> SyncResult<()> {
        let mut state = self.state.lock();
        let key = (identity.username.clone(), group.name.clone());
        if state.fail_remove.contains(&key) {
            return Err(SyncError::api(500, "membership update failed"));
        }
        state
            .memberships
            .remove(&(identity.id.clone(), group.id.clone()));
        state.removed.push(key);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SourceState {
    groups: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    lookups: usize,
}

/// Source directory backed by a map of username -> group names.
#[derive(Debug, Clone, Default)]
pub struct FakeSource {
    state: Arc<Mutex<SourceState>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(self, username: &str, groups: &[&str]) -> Self {
        self.state.lock().groups.insert(
            username.to_string(),
            groups.iter().map(|g| (*g).to_string()).collect(),
        );
        self
    }

    pub fn failing_for(self, username: &str) -> Self {
        self.state.lock().failing.insert(username.to_string());
        self
    }

    pub fn lookups(&self) -> usize {
        self.state.lock().lookups
    }
}

impl SourceDirectory for FakeSource {
    async fn groups_for_identity(&self, domain: &str, username: &str) -> SyncResult<Vec<String>> {
        let mut state = self.state.lock();
        state.lookups += 1;
        assert_eq!(domain, "example.com");
        if state.failing.contains(username) {
            return Err(SyncError::api(502, "bad gateway"));
        }
        Ok(state.groups.get(username).cloned().unwrap_or_default())
    }
}
