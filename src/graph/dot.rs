//! Diagnostic DOT export
//!
//! Renders the route graph in Graphviz DOT format for external tooling.
//! The core never consumes this output; it exists purely so a graph can be
//! inspected when a registry does not behave as expected.

use super::route_graph::RouteGraph;
use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use std::collections::HashMap;

impl RouteGraph {
    /// Renders the graph as Graphviz DOT.
    ///
    /// Vertices are labeled with their identifier display form, edges with
    /// the shape of the owning route.
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
    /// let dot = RouteGraph::from_routes(&routes).to_dot();
    /// assert!(dot.contains("a:String"));
    /// assert!(dot.contains("Bridge"));
    /// ```
    pub fn to_dot(&self) -> String {
        let mut graph = DiGraph::<String, String>::new();
        let mut indices = HashMap::new();

        for id in self.vertices() {
            let index = graph.add_node(id.to_string());
            indices.insert(id.clone(), index);
        }
        for (source, destination, route) in self.edges() {
            graph.add_edge(
                indices[source],
                indices[destination],
                route.kind().to_string(),
            );
        }

        format!("{}", Dot::new(&graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Merge, Routes, Start, State, StateId};

    #[test]
    fn test_dot_lists_vertices_and_edges() {
        let left = StateId::<String>::named("left");
        let right = StateId::<String>::named("right");
        let both = StateId::<String>::named("both");

        let routes = Routes::builder()
            .add_start(Start::of(left.clone()), || Ok(State::of("l".to_string())))
            .unwrap()
            .add_start(Start::of(right.clone()), || Ok(State::of("r".to_string())))
            .unwrap()
            .add_merge(Merge::of(left, right, both), |l: &String, r: &String| {
                Ok(State::of(format!("{}{}", l, r)))
            })
            .unwrap()
            .build();

        let dot = RouteGraph::from_routes(&routes).to_dot();

        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("left:String"));
        assert!(dot.contains("right:String"));
        assert!(dot.contains("both:String"));
        assert!(dot.contains("Merge"));
    }
}
