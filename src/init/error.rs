//! Error types for init orchestration.
//!
//! Call-time failures carry the identifier that was being resolved;
//! a failure mid-call additionally wraps the original error in
//! [`InitError::Rollback`] after the call's own partial progress has been
//! torn down. Teardown failures never short-circuit sibling teardowns; they
//! are collected into [`TearDownErrors`] and surfaced once all attempts for
//! the scope have completed.

use crate::core::{BoxError, CoreError, RawStateId, Route, RouteKind};
use crate::graph::GraphError;
use std::fmt;
use thiserror::Error;

/// Result type for init operations
pub type InitResult<T> = Result<T, InitError>;

/// Errors that can occur during an init call or a handle close.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InitError {
    /// The requested target is already present in the current state map.
    #[error("state {id} already initialized")]
    AlreadyInitialized {
        /// The requested target
        id: RawStateId,
    },

    /// The requested target is not a vertex of the route graph.
    #[error("state {id} is not part of this init process")]
    UnknownState {
        /// The requested target
        id: RawStateId,
    },

    /// No route has the requested identifier as destination.
    #[error("found no route to {id}")]
    NoRouteTo {
        /// The identifier that could not be resolved
        id: RawStateId,
    },

    /// More than one route claims the requested identifier as destination.
    ///
    /// Detected lazily, at the moment the identifier is resolved; a registry
    /// with a latent conflict builds fine as long as the conflicting
    /// destination is never requested.
    #[error("found more than one route to {id}: {candidates}")]
    AmbiguousRoute {
        /// The contested destination
        id: RawStateId,
        /// Every route claiming the destination
        candidates: RouteList,
    },

    /// A route was paired with a transition of a different shape.
    ///
    /// Unreachable through the typed registration API; kept because the
    /// erased registry internals cannot rule it out.
    #[error("route {route} does not match transition shape {transition}")]
    ShapeMismatch {
        /// The route being resolved
        route: Route,
        /// The shape of the transition found for it
        transition: RouteKind,
    },

    /// A source value required by a transition was not yet initialized.
    ///
    /// Indicates a layering bug, not user error.
    #[error("source state {id} was not initialized before use")]
    MissingSource {
        /// The missing source identifier
        id: RawStateId,
    },

    /// A stored value did not have the type its identifier claims.
    #[error("state {id} does not hold a value of type {expected}")]
    StateTypeMismatch {
        /// The identifier that was looked up
        id: RawStateId,
        /// The type the caller expected
        expected: &'static str,
    },

    /// A transition function failed.
    #[error("transition to {id} failed")]
    Transition {
        /// The destination being computed
        id: RawStateId,
        /// The user error
        #[source]
        source: BoxError,
    },

    /// An init call failed and its own partial progress was rolled back.
    ///
    /// The original failure is preserved as the cause chain.
    #[error("error on transition to {initializing}, rollback performed")]
    Rollback {
        /// The identifiers being initialized when the failure occurred
        initializing: String,
        /// The original failure
        #[source]
        cause: Box<InitError>,
    },

    /// One or more teardown callbacks failed while closing a handle.
    #[error(transparent)]
    TearDown(#[from] TearDownErrors),

    /// A graph query failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl InitError {
    pub(crate) fn ambiguous_route(id: RawStateId, candidates: Vec<Route>) -> Self {
        Self::AmbiguousRoute {
            id,
            candidates: RouteList(candidates),
        }
    }

    /// Attaches the destination being computed to a core-level failure.
    pub(crate) fn from_core(id: &RawStateId, err: CoreError) -> Self {
        match err {
            CoreError::Transition(source) => Self::Transition {
                id: id.clone(),
                source,
            },
            CoreError::StateTypeMismatch { id, expected } => {
                Self::StateTypeMismatch { id, expected }
            }
            other => Self::Transition {
                id: id.clone(),
                source: Box::new(other),
            },
        }
    }
}

/// Routes claiming one destination, displayed comma-joined.
#[derive(Debug, Clone)]
pub struct RouteList(Vec<Route>);

impl RouteList {
    /// Returns the candidate routes
    pub fn as_slice(&self) -> &[Route] {
        &self.0
    }
}

impl fmt::Display for RouteList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|route| route.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "[{}]", joined)
    }
}

/// One failed teardown callback.
#[derive(Debug)]
pub struct TearDownFailure {
    id: RawStateId,
    error: BoxError,
}

impl TearDownFailure {
    pub(crate) fn new(id: RawStateId, error: BoxError) -> Self {
        Self { id, error }
    }

    /// Returns the identifier whose teardown failed
    pub fn id(&self) -> &RawStateId {
        &self.id
    }

    /// Returns the teardown error
    pub fn error(&self) -> &(dyn std::error::Error + 'static) {
        self.error.as_ref()
    }
}

/// All teardown failures of one scope, collected after every teardown in
/// that scope was attempted.
///
/// A single failure displays directly; several display as an aggregate.
#[derive(Debug)]
pub struct TearDownErrors {
    failures: Vec<TearDownFailure>,
}

impl TearDownErrors {
    /// Returns `None` when no teardown failed.
    pub(crate) fn from_failures(failures: Vec<TearDownFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    /// Returns every collected failure in teardown order
    pub fn failures(&self) -> &[TearDownFailure] {
        &self.failures
    }
}

impl fmt::Display for TearDownErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.as_slice() {
            [single] => write!(f, "tear down of {} failed: {}", single.id, single.error),
            many => {
                let ids = many
                    .iter()
                    .map(|failure| failure.id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "tear down failed for {} states: {}", many.len(), ids)
            }
        }
    }
}

impl std::error::Error for TearDownErrors {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures.first().map(|failure| failure.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateId;

    fn id(name: &str) -> RawStateId {
        StateId::<String>::named(name).raw()
    }

    #[test]
    fn test_single_tear_down_failure_displays_directly() {
        let errors =
            TearDownErrors::from_failures(vec![TearDownFailure::new(id("a"), "oops".into())])
                .unwrap();

        assert_eq!(format!("{}", errors), "tear down of a:String failed: oops");
    }

    #[test]
    fn test_multiple_tear_down_failures_aggregate() {
        let errors = TearDownErrors::from_failures(vec![
            TearDownFailure::new(id("a"), "one".into()),
            TearDownFailure::new(id("b"), "two".into()),
        ])
        .unwrap();

        let message = format!("{}", errors);
        assert!(message.contains("2 states"));
        assert!(message.contains("a:String"));
        assert!(message.contains("b:String"));
    }

    #[test]
    fn test_no_failures_is_none() {
        assert!(TearDownErrors::from_failures(Vec::new()).is_none());
    }

    #[test]
    fn test_rollback_preserves_cause_chain() {
        let cause = InitError::Transition {
            id: id("x"),
            source: "broken".into(),
        };
        let wrapped = InitError::Rollback {
            initializing: "x:String".to_string(),
            cause: Box::new(cause),
        };

        let source = std::error::Error::source(&wrapped).unwrap();
        assert!(source.to_string().contains("transition to x:String"));
    }
}
