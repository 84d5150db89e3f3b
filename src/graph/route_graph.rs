//! Route graph - dependency graph over state identifiers
//!
//! The graph is derived once from a built registry and is read-only after
//! construction. Vertices are the identifiers appearing as any route's
//! source or destination; each (source, route) pair contributes one edge
//! into the route's destination, carrying a back-reference to its owning
//! route.
//!
//! # Design
//!
//! The graph uses a bidirectional adjacency list representation:
//! - `successors`: edges leaving a vertex (outgoing)
//! - `predecessors`: edges entering a vertex (incoming)
//!
//! This gives O(1) access to both directions, which the ancestor restriction
//! (walks predecessors) and the topological peel (decrements along
//! successors) both need. Insertion order is kept for deterministic
//! iteration.

use super::error::{GraphError, GraphResult};
use crate::core::{RawStateId, Route, Routes};
use std::collections::{HashMap, HashSet, VecDeque};

/// A vertex with its incoming and outgoing edges.
#[derive(Debug, Clone)]
struct StateNode {
    /// Incoming edges: (source identifier, owning route)
    predecessors: Vec<(RawStateId, Route)>,
    /// Outgoing edges: (destination identifier, owning route)
    successors: Vec<(RawStateId, Route)>,
}

impl StateNode {
    fn new() -> Self {
        Self {
            predecessors: Vec::new(),
            successors: Vec::new(),
        }
    }
}

/// Directed graph whose vertices are state identifiers and whose edges are
/// routes.
///
/// # Example
///
/// ```
/// use initgraph::{Bridge, RouteGraph, Routes, Start, State, StateId};
///
/// let a = StateId::<String>::named("a");
/// let b = StateId::<u32>::named("b");
/// let routes = Routes::builder()
///     .add_start(Start::of(a.clone()), || Ok(State::of("1".to_string())))
///     .unwrap()
///     .add_bridge(Bridge::of(a, b), |s: &String| Ok(State::of(s.parse::<u32>()?)))
///     .unwrap()
///     .build();
///
/// let graph = RouteGraph::from_routes(&routes);
/// assert_eq!(graph.len(), 2);
/// assert!(graph.cycles().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct RouteGraph {
    nodes: HashMap<RawStateId, StateNode>,
    insertion_order: Vec<RawStateId>,
}

impl RouteGraph {
    /// Builds the graph from every registered route.
    ///
    /// Construction never fails; cycle discovery is a separate query so the
    /// caller can report every cycle at once.
    pub fn from_routes(routes: &Routes) -> Self {
        let mut graph = Self {
            nodes: HashMap::new(),
            insertion_order: Vec::new(),
        };

        for route in routes.all() {
            graph.ensure_vertex(route.destination());
            for source in route.sources() {
                graph.ensure_vertex(source);
                graph.add_edge(source.clone(), route.destination().clone(), route.clone());
            }
        }

        graph
    }

    /// Returns the number of vertices
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no vertices
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if the identifier is a vertex of this graph
    pub fn contains(&self, id: &RawStateId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns all vertices in insertion order
    pub fn vertices(&self) -> impl Iterator<Item = &RawStateId> {
        self.insertion_order.iter()
    }

    /// Returns all edges as (source, destination, owning route)
    pub fn edges(&self) -> impl Iterator<Item = (&RawStateId, &RawStateId, &Route)> {
        self.insertion_order.iter().flat_map(move |id| {
            self.nodes[id]
                .successors
                .iter()
                .map(move |(dest, route)| (id, dest, route))
        })
    }

    /// Discovers cycles using DFS that tracks the active traversal path.
    ///
    /// Every back edge yields one cycle, reported as the vertex path sliced
    /// from the path stack. An acyclic graph returns an empty vec.
    pub fn cycles(&self) -> Vec<Vec<RawStateId>> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();
        let mut found = Vec::new();

        for id in &self.insertion_order {
            if !visited.contains(id) {
                self.dfs_cycles(id, &mut visited, &mut stack, &mut found);
            }
        }

        found
    }

    fn dfs_cycles(
        &self,
        node: &RawStateId,
        visited: &mut HashSet<RawStateId>,
        stack: &mut Vec<RawStateId>,
        found: &mut Vec<Vec<RawStateId>>,
    ) {
        visited.insert(node.clone());
        stack.push(node.clone());

        for (successor, _) in &self.nodes[node].successors {
            if let Some(pos) = stack.iter().position(|v| v == successor) {
                // Back edge: the cycle is the stack from the successor down
                found.push(stack[pos..].to_vec());
            } else if !visited.contains(successor) {
                self.dfs_cycles(successor, visited, stack, found);
            }
        }

        stack.pop();
    }

    /// Computes the ordered dependency layers for a target.
    ///
    /// The graph is first restricted to the target plus every vertex with a
    /// directed path to it (ancestors, found by BFS over reverse edges).
    /// The restricted subgraph is then peeled: repeatedly extract the set of
    /// vertices with no remaining incoming edge from within the subgraph,
    /// producing layers where layer `i` depends only on layers `< i`.
    ///
    /// Assumes the graph is acyclic; [`Initializer`](crate::init::Initializer)
    /// guarantees that by rejecting cyclic graphs at construction.
    pub fn dependency_layers(&self, target: &RawStateId) -> GraphResult<Vec<Vec<RawStateId>>> {
        if !self.contains(target) {
            return Err(GraphError::unknown_state(target.clone()));
        }

        // Ancestor restriction: reverse BFS from the target
        let mut subset = HashSet::new();
        let mut queue = VecDeque::new();
        subset.insert(target.clone());
        queue.push_back(target.clone());
        while let Some(id) = queue.pop_front() {
            for (pred, _) in &self.nodes[&id].predecessors {
                if subset.insert(pred.clone()) {
                    queue.push_back(pred.clone());
                }
            }
        }

        // Kahn-style peel restricted to the subset; in-degrees count edges,
        // so parallel edges between the same pair stay balanced
        let mut remaining: HashMap<RawStateId, usize> = subset
            .iter()
            .map(|id| {
                let in_degree = self.nodes[id]
                    .predecessors
                    .iter()
                    .filter(|(pred, _)| subset.contains(pred))
                    .count();
                (id.clone(), in_degree)
            })
            .collect();

        let mut layers = Vec::new();
        let mut done: HashSet<RawStateId> = HashSet::new();

        while done.len() < subset.len() {
            // Insertion order keeps layer contents deterministic
            let layer: Vec<RawStateId> = self
                .insertion_order
                .iter()
                .filter(|id| subset.contains(*id) && !done.contains(*id))
                .filter(|id| remaining[*id] == 0)
                .cloned()
                .collect();

            // The full graph is acyclic, so every non-empty restriction has
            // at least one zero-in-degree vertex left.
            debug_assert!(!layer.is_empty(), "dependency layering stalled");
            if layer.is_empty() {
                break;
            }

            for id in &layer {
                done.insert(id.clone());
                for (succ, _) in &self.nodes[id].successors {
                    if let Some(count) = remaining.get_mut(succ) {
                        *count = count.saturating_sub(1);
                    }
                }
            }

            layers.push(layer);
        }

        Ok(layers)
    }

    fn ensure_vertex(&mut self, id: &RawStateId) {
        if !self.nodes.contains_key(id) {
            self.insertion_order.push(id.clone());
            self.nodes.insert(id.clone(), StateNode::new());
        }
    }

    fn add_edge(&mut self, source: RawStateId, destination: RawStateId, route: Route) {
        // SAFETY: both vertices were inserted by ensure_vertex just before.
        self.nodes
            .get_mut(&destination)
            .unwrap()
            .predecessors
            .push((source.clone(), route.clone()));
        self.nodes
            .get_mut(&source)
            .unwrap()
            .successors
            .push((destination, route));
    }
}
