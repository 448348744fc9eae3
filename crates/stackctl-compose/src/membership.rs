//! Ordered, duplicate-free set of stack members.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use stackctl_common::types::{ServiceKey, StackServiceId};

/// One service included in a composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipEntry {
    /// Service type of this member.
    #[serde(rename = "service")]
    pub service_key: ServiceKey,
    /// Identifier assigned by the remote system once the stack is persisted.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub assigned_id: Option<StackServiceId>,
}

impl MembershipEntry {
    /// Creates an entry that has not been submitted yet.
    #[must_use]
    pub const fn new(service_key: ServiceKey) -> Self {
        Self {
            service_key,
            assigned_id: None,
        }
    }
}

/// Insertion-ordered sequence of members, unique by service key.
///
/// Membership is tracked in a hash set alongside the ordered entries, so
/// `contains` does not scan the sequence.
#[derive(Debug, Clone, Default)]
pub struct MembershipSet {
    entries: Vec<MembershipEntry>,
    keys: HashSet<ServiceKey>,
}

impl MembershipSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a member with `key` is present.
    #[must_use]
    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.keys.contains(key)
    }

    /// Appends a member.
    ///
    /// Callers must check [`contains`](Self::contains) first. Appending a key
    /// that is already present trips a debug assertion; in release builds the
    /// duplicate is dropped.
    pub fn append(&mut self, entry: MembershipEntry) {
        let inserted = self.keys.insert(entry.service_key.clone());
        debug_assert!(inserted, "duplicate member {}", entry.service_key);
        if inserted {
            tracing::debug!(service = %entry.service_key, "adding stack member");
            self.entries.push(entry);
        }
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over members in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, MembershipEntry> {
        self.entries.iter()
    }

    /// Consumes the set, returning members in insertion order.
    #[must_use]
    pub fn into_entries(self) -> Vec<MembershipEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a MembershipSet {
    type Item = &'a MembershipEntry;
    type IntoIter = std::slice::Iter<'a, MembershipEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
