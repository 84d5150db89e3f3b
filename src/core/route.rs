//! Route descriptors
//!
//! A route is a typed edge descriptor: zero, one, two, or three source
//! identifiers and exactly one destination identifier. The four shapes are:
//!
//! - [`Start`]: no sources, produced out of nothing
//! - [`Bridge`]: one source
//! - [`Merge`]: two sources (left, right)
//! - [`Merge3`]: three sources (left, middle, right)
//!
//! The typed structs exist only at the registration boundary; the registry
//! and the graph work with the erased [`Route`] enum, which is hashable and
//! identified by its own fields.

use super::state_id::{RawStateId, StateId};
use std::any::Any;
use std::fmt;

/// Route with no sources: its transition produces the destination value
/// from nothing.
#[derive(Debug, Clone)]
pub struct Start<D: Any> {
    destination: StateId<D>,
}

impl<D: Any> Start<D> {
    pub fn of(destination: StateId<D>) -> Self {
        Self { destination }
    }

    pub fn destination(&self) -> &StateId<D> {
        &self.destination
    }
}

/// Route with one source.
#[derive(Debug, Clone)]
pub struct Bridge<S: Any, D: Any> {
    source: StateId<S>,
    destination: StateId<D>,
}

impl<S: Any, D: Any> Bridge<S, D> {
    pub fn of(source: StateId<S>, destination: StateId<D>) -> Self {
        Self {
            source,
            destination,
        }
    }

    pub fn source(&self) -> &StateId<S> {
        &self.source
    }

    pub fn destination(&self) -> &StateId<D> {
        &self.destination
    }
}

/// Route merging two sources into one destination.
#[derive(Debug, Clone)]
pub struct Merge<L: Any, R: Any, D: Any> {
    left: StateId<L>,
    right: StateId<R>,
    destination: StateId<D>,
}

impl<L: Any, R: Any, D: Any> Merge<L, R, D> {
    pub fn of(left: StateId<L>, right: StateId<R>, destination: StateId<D>) -> Self {
        Self {
            left,
            right,
            destination,
        }
    }

    pub fn left(&self) -> &StateId<L> {
        &self.left
    }

    pub fn right(&self) -> &StateId<R> {
        &self.right
    }

    pub fn destination(&self) -> &StateId<D> {
        &self.destination
    }
}

/// Route merging three sources into one destination.
#[derive(Debug, Clone)]
pub struct Merge3<L: Any, M: Any, R: Any, D: Any> {
    left: StateId<L>,
    middle: StateId<M>,
    right: StateId<R>,
    destination: StateId<D>,
}

impl<L: Any, M: Any, R: Any, D: Any> Merge3<L, M, R, D> {
    pub fn of(
        left: StateId<L>,
        middle: StateId<M>,
        right: StateId<R>,
        destination: StateId<D>,
    ) -> Self {
        Self {
            left,
            middle,
            right,
            destination,
        }
    }

    pub fn left(&self) -> &StateId<L> {
        &self.left
    }

    pub fn middle(&self) -> &StateId<M> {
        &self.middle
    }

    pub fn right(&self) -> &StateId<R> {
        &self.right
    }

    pub fn destination(&self) -> &StateId<D> {
        &self.destination
    }
}

/// The shape of a route, used in shape-mismatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Start,
    Bridge,
    Merge,
    Merge3,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouteKind::Start => "Start",
            RouteKind::Bridge => "Bridge",
            RouteKind::Merge => "Merge",
            RouteKind::Merge3 => "Merge3",
        };
        f.write_str(name)
    }
}

/// Type-erased route: the registry key and the graph edge payload.
///
/// A route is an immutable value identified by its own fields, so the enum
/// derives `Eq` and `Hash` over its identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Route {
    Start {
        destination: RawStateId,
    },
    Bridge {
        source: RawStateId,
        destination: RawStateId,
    },
    Merge {
        left: RawStateId,
        right: RawStateId,
        destination: RawStateId,
    },
    Merge3 {
        left: RawStateId,
        middle: RawStateId,
        right: RawStateId,
        destination: RawStateId,
    },
}

impl Route {
    /// Returns the destination identifier
    pub fn destination(&self) -> &RawStateId {
        match self {
            Route::Start { destination }
            | Route::Bridge { destination, .. }
            | Route::Merge { destination, .. }
            | Route::Merge3 { destination, .. } => destination,
        }
    }

    /// Returns the source identifiers in source-position order
    /// (left, middle, right).
    pub fn sources(&self) -> Vec<&RawStateId> {
        match self {
            Route::Start { .. } => Vec::new(),
            Route::Bridge { source, .. } => vec![source],
            Route::Merge { left, right, .. } => vec![left, right],
            Route::Merge3 {
                left,
                middle,
                right,
                ..
            } => vec![left, middle, right],
        }
    }

    /// Returns the shape of this route
    pub fn kind(&self) -> RouteKind {
        match self {
            Route::Start { .. } => RouteKind::Start,
            Route::Bridge { .. } => RouteKind::Bridge,
            Route::Merge { .. } => RouteKind::Merge,
            Route::Merge3 { .. } => RouteKind::Merge3,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Start { destination } => write!(f, "Start({})", destination),
            Route::Bridge {
                source,
                destination,
            } => write!(f, "Bridge({} -> {})", source, destination),
            Route::Merge {
                left,
                right,
                destination,
            } => write!(f, "Merge({}, {} -> {})", left, right, destination),
            Route::Merge3 {
                left,
                middle,
                right,
                destination,
            } => write!(
                f,
                "Merge3({}, {}, {} -> {})",
                left, middle, right, destination
            ),
        }
    }
}

impl<D: Any> From<&Start<D>> for Route {
    fn from(route: &Start<D>) -> Self {
        Route::Start {
            destination: route.destination.raw(),
        }
    }
}

impl<S: Any, D: Any> From<&Bridge<S, D>> for Route {
    fn from(route: &Bridge<S, D>) -> Self {
        Route::Bridge {
            source: route.source.raw(),
            destination: route.destination.raw(),
        }
    }
}

impl<L: Any, R: Any, D: Any> From<&Merge<L, R, D>> for Route {
    fn from(route: &Merge<L, R, D>) -> Self {
        Route::Merge {
            left: route.left.raw(),
            right: route.right.raw(),
            destination: route.destination.raw(),
        }
    }
}

impl<L: Any, M: Any, R: Any, D: Any> From<&Merge3<L, M, R, D>> for Route {
    fn from(route: &Merge3<L, M, R, D>) -> Self {
        Route::Merge3 {
            left: route.left.raw(),
            middle: route.middle.raw(),
            right: route.right.raw(),
            destination: route.destination.raw(),
        }
    }
}
