//! Asset dependency graph with cycle rejection.
//!
//! Dependencies between assets form a directed graph keyed by asset id.
//! The graph must stay acyclic: an asset may never list itself, directly or
//! transitively, as a dependency. Edges that would close a cycle are
//! rejected at write time with a [`EngineError::Conflict`].

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::error::EngineError;
use crate::models::asset::Asset;

/// Directed dependency edges between assets.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: HashMap<Uuid, Vec<Uuid>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from the dependency lists of existing assets.
    ///
    /// Assumes the assets were created through [`add_dependency`]-guarded
    /// writes; call [`validate`] when loading data wholesale from an
    /// external source.
    ///
    /// [`add_dependency`]: DependencyGraph::add_dependency
    /// [`validate`]: DependencyGraph::validate
    pub fn from_assets(assets: &[Asset]) -> Self {
        let mut edges: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for asset in assets {
            edges.insert(asset.id, asset.dependencies.clone());
        }
        Self { edges }
    }

    /// Direct dependencies of an asset, in insertion order.
    pub fn dependencies_of(&self, asset_id: Uuid) -> &[Uuid] {
        self.edges.get(&asset_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Adds a dependency edge `from -> to`, rejecting self-references and
    /// edges that would close a cycle.
    pub fn add_dependency(&mut self, from: Uuid, to: Uuid) -> Result<(), EngineError> {
        if from == to {
            return Err(EngineError::Conflict(format!(
                "asset {from} cannot depend on itself"
            )));
        }
        if self.is_reachable(from, to) {
            return Err(EngineError::Conflict(format!(
                "dependency {from} -> {to} would create a cycle"
            )));
        }
        let deps = self.edges.entry(from).or_default();
        if !deps.contains(&to) {
            deps.push(to);
        }
        Ok(())
    }

    /// Removes a dependency edge if present.
    pub fn remove_dependency(&mut self, from: Uuid, to: Uuid) {
        if let Some(deps) = self.edges.get_mut(&from) {
            deps.retain(|d| *d != to);
        }
    }

    /// Removes an asset and every edge pointing at it. Dependents keep
    /// existing: dependency references are weak, so deleting a dependency
    /// never cascades.
    pub fn remove_asset(&mut self, asset_id: Uuid) {
        self.edges.remove(&asset_id);
        for deps in self.edges.values_mut() {
            deps.retain(|d| *d != asset_id);
        }
    }

    /// Whether `target` is reachable from `start` by following dependency
    /// edges.
    fn is_reachable(&self, target: Uuid, start: Uuid) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if node == target {
                return true;
            }
            if visited.insert(node) {
                if let Some(deps) = self.edges.get(&node) {
                    stack.extend(deps.iter().copied());
                }
            }
        }
        false
    }

    /// Validates the whole graph, reporting the first cycle found.
    ///
    /// Iterative DFS with explicit recursion-stack tracking: a back edge to
    /// a node still on the current path is a cycle.
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut visited: HashSet<Uuid> = HashSet::new();
        let mut on_path: HashSet<Uuid> = HashSet::new();

        for &root in self.edges.keys() {
            if visited.contains(&root) {
                continue;
            }
            // (node, next child index) frames of the current DFS path.
            let mut stack: Vec<(Uuid, usize)> = vec![(root, 0)];
            on_path.insert(root);

            while let Some((node, child_idx)) = stack.pop() {
                let deps = self.dependencies_of(node);
                if child_idx < deps.len() {
                    let next = deps[child_idx];
                    stack.push((node, child_idx + 1));
                    if on_path.contains(&next) {
                        return Err(EngineError::Conflict(format!(
                            "dependency cycle detected through asset {next}"
                        )));
                    }
                    if !visited.contains(&next) {
                        on_path.insert(next);
                        stack.push((next, 0));
                    }
                } else {
                    visited.insert(node);
                    on_path.remove(&node);
                }
            }
        }
        Ok(())
    }

    /// All assets that `asset_id` depends on, directly or transitively.
    pub fn transitive_dependencies(&self, asset_id: Uuid) -> HashSet<Uuid> {
        let mut result = HashSet::new();
        let mut stack: Vec<Uuid> = self.dependencies_of(asset_id).to_vec();
        while let Some(node) = stack.pop() {
            if result.insert(node) {
                stack.extend(self.dependencies_of(node).iter().copied());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_query() {
        let mut graph = DependencyGraph::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        graph.add_dependency(a, b).unwrap();
        assert_eq!(graph.dependencies_of(a), &[b]);
        assert!(graph.dependencies_of(b).is_empty());
    }

    #[test]
    fn test_self_dependency_rejected() {
        let mut graph = DependencyGraph::new();
        let a = Uuid::new_v4();
        let result = graph.add_dependency(a, a);
        assert!(matches!(result, Err(EngineError::Conflict(_))));
    }

    #[test]
    fn test_direct_cycle_rejected() {
        let mut graph = DependencyGraph::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        graph.add_dependency(a, b).unwrap();
        let result = graph.add_dependency(b, a);
        assert!(matches!(result, Err(EngineError::Conflict(_))));
    }

    #[test]
    fn test_transitive_cycle_rejected() {
        let mut graph = DependencyGraph::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        graph.add_dependency(a, b).unwrap();
        graph.add_dependency(b, c).unwrap();
        let result = graph.add_dependency(c, a);
        assert!(matches!(result, Err(EngineError::Conflict(_))));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut graph = DependencyGraph::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let d = Uuid::new_v4();

        graph.add_dependency(a, b).unwrap();
        graph.add_dependency(a, c).unwrap();
        graph.add_dependency(b, d).unwrap();
        graph.add_dependency(c, d).unwrap();
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_duplicate_edge_is_idempotent() {
        let mut graph = DependencyGraph::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        graph.add_dependency(a, b).unwrap();
        graph.add_dependency(a, b).unwrap();
        assert_eq!(graph.dependencies_of(a).len(), 1);
    }

    #[test]
    fn test_remove_asset_keeps_dependents() {
        let mut graph = DependencyGraph::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        graph.add_dependency(a, b).unwrap();
        graph.add_dependency(c, b).unwrap();
        graph.remove_asset(b);

        assert!(graph.dependencies_of(a).is_empty());
        assert!(graph.dependencies_of(c).is_empty());
        // The dependents themselves survive.
        graph.add_dependency(a, c).unwrap();
        assert_eq!(graph.dependencies_of(a), &[c]);
    }

    #[test]
    fn test_validate_detects_preexisting_cycle() {
        // Bypass add_dependency guards by constructing from assets whose
        // dependency lists already contain a cycle.
        let mut asset_a = Asset::from_request(crate::models::asset::CreateAssetRequest {
            code: "A".to_string(),
            name: "A".to_string(),
            asset_type: String::new(),
            category: String::new(),
            owner: String::new(),
            custodian: String::new(),
            location: String::new(),
            valuation: crate::models::asset::SecurityValuation::uniform(5.0),
            economic_value: 0.0,
            dependencies: vec![],
        });
        let mut asset_b = asset_a.clone();
        asset_b.id = Uuid::new_v4();
        asset_b.code = "B".to_string();

        asset_a.dependencies = vec![asset_b.id];
        asset_b.dependencies = vec![asset_a.id];

        let graph = DependencyGraph::from_assets(&[asset_a, asset_b]);
        assert!(matches!(graph.validate(), Err(EngineError::Conflict(_))));
    }

    #[test]
    fn test_transitive_dependencies() {
        let mut graph = DependencyGraph::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        graph.add_dependency(a, b).unwrap();
        graph.add_dependency(b, c).unwrap();

        let deps = graph.transitive_dependencies(a);
        assert!(deps.contains(&b));
        assert!(deps.contains(&c));
        assert_eq!(deps.len(), 2);
    }
}
