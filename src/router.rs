//! The backend router
//!
//! A longest-prefix registry mapping hierarchy prefixes to backend
//! instances, plus fan-out for commands that must address every backend
//! (`LIST`, `NEWGROUPS`, `NEWNEWS`, message-id lookup). Immutable after
//! startup: built once from configuration, never mutated by connection
//! handlers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::{ArticleLocation, Storage};

/// The reserved hierarchy prefix identifying the global/default backend
pub const GLOBAL_HIERARCHY: &str = "papercut";

/// Maps hierarchy prefixes to backend instances and resolves group names
/// via longest-prefix match.
pub struct Router {
    backends: HashMap<String, Arc<dyn Storage>>,
}

impl Router {
    /// Build a router from `(hierarchy_prefix, backend)` pairs
    pub fn new(backends: HashMap<String, Arc<dyn Storage>>) -> Self {
        Self { backends }
    }

    /// Resolve `group` to its backend via longest-prefix match. Ties are
    /// impossible: registered prefixes are distinct strings.
    pub fn resolve(&self, group: &str) -> Option<&Arc<dyn Storage>> {
        self.backends
            .iter()
            .filter(|(prefix, _)| group.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, backend)| backend)
    }

    /// All registered backends, for fan-out commands
    pub fn all_backends(&self) -> impl Iterator<Item = &Arc<dyn Storage>> {
        self.backends.values()
    }

    /// `LIST` fan-out: one line per group across every backend
    pub fn list_all(&self) -> Vec<String> {
        self.backends.values().flat_map(|b| b.list()).collect()
    }

    /// Fan out a group-name lookup for `NEWNEWS`/message-id resolution: the
    /// first backend whose directory actually contains `group` wins, which
    /// matches longest-prefix resolution as long as hierarchies don't
    /// overlap in their on-disk group names.
    pub fn newnews_all(&self, group: &str, since: i64) -> Vec<String> {
        if let Some(backend) = self.resolve(group)
            && backend.group_exists(group)
        {
            return backend.newnews(group, since);
        }
        Vec::new()
    }

    /// Resolve a message-id across every backend (the group it belongs to
    /// isn't known in advance): each backend that advertises a group
    /// containing that id is checked in turn, first match wins.
    pub fn find_by_message_id(&self, message_id: &str) -> Option<(String, u64, Arc<dyn Storage>)> {
        for backend in self.backends.values() {
            for group in backend.group_names() {
                if let Some(ArticleLocation { number }) = backend.article_number(&group, message_id) {
                    return Some((group, number, Arc::clone(backend)));
                }
            }
        }
        None
    }
}
