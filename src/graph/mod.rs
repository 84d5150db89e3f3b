//! Dependency graph derived from a route registry
//!
//! This module hides the graph representation (adjacency lists with
//! bidirectional edge lists) and exposes only the operations the
//! orchestrator needs:
//!
//! - construction from a [`Routes`](crate::core::Routes) registry — one
//!   vertex per distinct identifier, one edge per (source, route) pair into
//!   the route's destination
//! - cycle discovery via DFS over the active traversal path
//! - dependency layering: ancestor restriction (reverse BFS) followed by a
//!   Kahn-style topological peel into ordered layers
//! - diagnostic DOT export for external tooling
//!
//! # Algorithm Reference
//!
//! Cycle detection is a DFS that tracks the active path and reports every
//! back edge; layering is Kahn's algorithm restricted to the ancestor
//! subgraph of the requested target.

mod dot;
mod error;
mod route_graph;

pub use error::{GraphError, GraphResult};
pub use route_graph::RouteGraph;
