//! Error types for graph operations.

use crate::core::RawStateId;
use thiserror::Error;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur during graph construction and queries.
///
/// Structural errors are fatal at setup time: an
/// [`Initializer`](crate::init::Initializer) refuses to exist over a cyclic
/// graph.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum GraphError {
    /// The route graph contains at least one cycle.
    ///
    /// The path names every vertex of every discovered cycle
    /// (arrow-joined within a cycle, newline-joined between cycles).
    #[error("cycles are not supported: {path}")]
    CycleDetected {
        /// Human-readable description of the cycle paths
        path: String,
    },

    /// A queried identifier is not a vertex of the graph.
    #[error("state {id} is not part of this graph")]
    UnknownState {
        /// The identifier that was not found
        id: RawStateId,
    },
}

impl GraphError {
    /// Creates a cycle detected error from discovered cycle paths
    pub fn cycles(cycles: &[Vec<RawStateId>]) -> Self {
        let path = cycles
            .iter()
            .map(|cycle| {
                cycle
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            })
            .collect::<Vec<_>>()
            .join("\n");
        Self::CycleDetected { path }
    }

    /// Creates an unknown state error
    pub fn unknown_state(id: RawStateId) -> Self {
        Self::UnknownState { id }
    }
}
