//! Error types for core operations.

use super::route::Route;
use super::state_id::RawStateId;
use thiserror::Error;

/// Boxed error type carried by user transitions and teardown callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while building a registry or invoking an erased
/// transition.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A route was registered twice via `add` (use `replace` to overwrite).
    #[error("route {route} already registered")]
    DuplicateRoute {
        /// The route that was already present
        route: Route,
    },

    /// A stored value did not have the type its identifier claims.
    ///
    /// This is the checked-downcast failure of the type-erased state map.
    #[error("state {id} does not hold a value of type {expected}")]
    StateTypeMismatch {
        /// The identifier that was looked up
        id: RawStateId,
        /// The type the caller expected
        expected: &'static str,
    },

    /// A user transition returned an error.
    #[error("transition failed")]
    Transition(#[source] BoxError),
}

impl CoreError {
    /// Creates a duplicate route error
    pub fn duplicate_route(route: Route) -> Self {
        Self::DuplicateRoute { route }
    }

    /// Creates a state type mismatch error
    pub fn type_mismatch(id: RawStateId, expected: &'static str) -> Self {
        Self::StateTypeMismatch { id, expected }
    }
}
