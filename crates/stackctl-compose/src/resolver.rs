//! Stack composition resolver.
//!
//! Expands a requested service into every service its stack needs: the
//! service itself, its required dependencies (transitively), and any
//! dependencies the caller opted into together with their own required
//! closure.
//!
//! Members are ordered by first discovery under a depth-first walk:
//!
//! 1. the root,
//! 2. the root's required dependencies, each fully expanded before its next
//!    sibling,
//! 3. each opted-in dependency of the root, in the root's declaration order,
//!    followed by its own required expansion.
//!
//! A service is appended before it is expanded and is never expanded twice,
//! so cyclic catalogs terminate after at most one lookup per distinct key.

use serde::{Deserialize, Serialize};
use stackctl_common::error::{Result, StackctlError};
use stackctl_common::types::ServiceKey;

use crate::catalog::{CatalogLookup, ServiceDefinition};
use crate::membership::{MembershipEntry, MembershipSet};

/// The services the caller explicitly opted into.
///
/// Keeps the order in which keys were supplied, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionalSelection {
    keys: Vec<ServiceKey>,
}

impl OptionalSelection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-delimited list such as `"cache,metrics"`.
    ///
    /// Segments are trimmed and empty segments are dropped, so `""` yields an
    /// empty selection rather than one containing the empty key.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        list.split(stackctl_common::constants::OPTIONAL_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ServiceKey::new)
            .collect()
    }

    /// Returns `true` if `key` was selected.
    #[must_use]
    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns the selected keys in the order supplied.
    #[must_use]
    pub fn keys(&self) -> &[ServiceKey] {
        &self.keys
    }

    /// Returns `true` if nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the selected keys that `root` does not declare as dependencies.
    ///
    /// These are never included in a composition.
    #[must_use]
    pub fn undeclared(&self, root: &ServiceDefinition) -> Vec<&ServiceKey> {
        self.keys
            .iter()
            .filter(|key| !root.dependencies.iter().any(|edge| edge.target == **key))
            .collect()
    }
}

impl FromIterator<ServiceKey> for OptionalSelection {
    fn from_iter<I: IntoIterator<Item = ServiceKey>>(iter: I) -> Self {
        let mut keys = Vec::new();
        for key in iter {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Self { keys }
    }
}

/// The resolver's output: the full, ordered member list of a new stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackComposition {
    /// The service originally requested.
    #[serde(rename = "key")]
    pub root_key: ServiceKey,
    /// Caller-supplied label for the stack.
    pub name: String,
    /// Members in discovery order, unique by service key.
    #[serde(rename = "services")]
    pub members: Vec<MembershipEntry>,
}

impl StackComposition {
    /// Iterates over member keys in order.
    pub fn member_keys(&self) -> impl Iterator<Item = &ServiceKey> {
        self.members.iter().map(|m| &m.service_key)
    }
}

/// Resolves the composition of a new stack rooted at `root_key`.
///
/// Catalog lookups happen one at a time, one per distinct service visited.
///
/// # Errors
///
/// Returns `StackctlError::UnknownService` naming the first key (the root or
/// any edge target) that the catalog cannot resolve. Other lookup errors are
/// returned unchanged. No partial composition is produced on failure.
pub fn resolve<C>(
    root_key: &ServiceKey,
    optional: &OptionalSelection,
    name: &str,
    catalog: &C,
) -> Result<StackComposition>
where
    C: CatalogLookup + ?Sized,
{
    tracing::info!(root = %root_key, name, optional = ?optional.keys(), "resolving stack composition");

    if root_key.as_str().trim().is_empty() {
        return Err(StackctlError::UnknownService {
            key: root_key.to_string(),
        });
    }

    let mut walk = Walk {
        catalog,
        members: MembershipSet::new(),
    };

    let root = walk.lookup(root_key)?;
    for key in optional.undeclared(&root) {
        tracing::warn!(root = %root_key, service = %key, "ignoring optional service not declared by root");
    }
    let selected: Vec<ServiceKey> = root
        .dependencies
        .iter()
        .filter(|edge| optional.contains(&edge.target))
        .map(|edge| edge.target.clone())
        .collect();

    walk.members.append(MembershipEntry::new(root_key.clone()));
    walk.expand_required(root)?;

    for key in selected {
        if walk.members.contains(&key) {
            continue;
        }
        walk.members.append(MembershipEntry::new(key.clone()));
        let definition = walk.lookup(&key)?;
        walk.expand_required(definition)?;
    }

    let members = walk.members.into_entries();
    tracing::info!(root = %root_key, members = members.len(), "stack composition resolved");
    Ok(StackComposition {
        root_key: root_key.clone(),
        name: name.to_string(),
        members,
    })
}

struct Walk<'c, C: ?Sized> {
    catalog: &'c C,
    members: MembershipSet,
}

impl<C: CatalogLookup + ?Sized> Walk<'_, C> {
    fn lookup(&self, key: &ServiceKey) -> Result<ServiceDefinition> {
        tracing::debug!(service = %key, "catalog lookup");
        self.catalog.get_service(key)
    }

    /// Appends the required closure of `start`, depth-first in edge order.
    ///
    /// Each frame holds a definition and the index of its next unvisited
    /// edge, which reproduces recursive pre-order without recursion.
    fn expand_required(&mut self, start: ServiceDefinition) -> Result<()> {
        let mut frames = vec![(start, 0_usize)];

        while let Some((definition, cursor)) = frames.last_mut() {
            let Some(edge) = definition.dependencies.get(*cursor) else {
                let _ = frames.pop();
                continue;
            };
            *cursor += 1;

            if !edge.required || self.members.contains(&edge.target) {
                continue;
            }
            let target = edge.target.clone();
            self.members.append(MembershipEntry::new(target.clone()));
            let next = self.lookup(&target)?;
            frames.push((next, 0));
        }
        Ok(())
    }
}
