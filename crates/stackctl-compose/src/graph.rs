//! Dependency graph management using `petgraph`.
//!
//! Builds a directed graph over the members of a resolved stack from their
//! required edges and derives the order in which the services can be started.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use stackctl_common::error::{Result, StackctlError};
use stackctl_common::types::ServiceKey;

use crate::catalog::CatalogLookup;
use crate::resolver::StackComposition;

/// A dependency graph of stack members.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: petgraph::Graph<ServiceKey, ()>,
    nodes: HashMap<ServiceKey, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: petgraph::Graph::new(),
            nodes: HashMap::new(),
        }
    }

    /// Adds a service node, returning the existing node if already present.
    pub fn add_service(&mut self, key: &ServiceKey) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(key) {
            return idx;
        }
        let idx = self.graph.add_node(key.clone());
        let _ = self.nodes.insert(key.clone(), idx);
        idx
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    ///
    /// The graph edge points from `dependency` to `dependent`
    /// so that topological sort yields dependencies first.
    pub fn add_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.update_edge(dependency, dependent, ());
    }

    /// Builds the graph for a resolved composition.
    ///
    /// Only required edges between members are kept; edges leaving the stack
    /// cannot occur in a complete composition and are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a member's definition cannot be fetched.
    pub fn from_composition<C>(composition: &StackComposition, catalog: &C) -> Result<Self>
    where
        C: CatalogLookup + ?Sized,
    {
        let mut graph = Self::new();
        for key in composition.member_keys() {
            let _ = graph.add_service(key);
        }
        for key in composition.member_keys() {
            let definition = catalog.get_service(key)?;
            let dependent = graph.add_service(key);
            for target in definition.required_targets() {
                if let Some(&dependency) = graph.nodes.get(target) {
                    graph.add_dependency(dependent, dependency);
                }
            }
        }
        Ok(graph)
    }

    /// Returns a startup ordering of services.
    ///
    /// Dependencies appear before the services that depend on them.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn startup_order(&self) -> Result<Vec<ServiceKey>> {
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => {
                let at = self
                    .graph
                    .node_weight(cycle.node_id())
                    .map_or_else(String::new, ToString::to_string);
                Err(StackctlError::Config {
                    message: format!("cyclic dependency detected in stack at service \"{at}\""),
                })
            }
        }
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
