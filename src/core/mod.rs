//! Core types for staged initialization.
//!
//! This module provides the foundation the rest of the crate builds on:
//!
//! # Domain Model
//! - [`StateId`] / [`RawStateId`]: typed and type-erased identifiers for
//!   producible values (the graph vertices and map keys)
//! - [`State`]: a computed value together with an optional teardown callback
//! - [`Start`], [`Bridge`], [`Merge`], [`Merge3`]: typed route descriptors
//!   naming zero to three sources and exactly one destination
//! - [`Route`] and its erased transition counterpart stored in the registry —
//!   both are closed enums over the four route shapes, so dispatch is an
//!   exhaustive match rather than a chain of fallible matchers
//! - [`Routes`] / [`RoutesBuilder`]: the immutable route registry
//!
//! # Type Erasure
//!
//! Values of different types are keyed by one identifier type, so states are
//! stored as `Rc<dyn Any>` and recovered through checked downcasts that
//! produce a typed [`CoreError::StateTypeMismatch`] on mismatch — never a
//! panic. The typed registration API pairs each route shape with a matching
//! transition closure, which makes a route/transition shape mismatch
//! unrepresentable from the outside.

mod error;
mod route;
mod routes;
mod state;
mod state_id;
mod transition;

pub use error::{BoxError, CoreError, CoreResult};
pub use route::{Bridge, Merge, Merge3, Route, RouteKind, Start};
pub use routes::{Routes, RoutesBuilder};
pub use state::State;
pub use state_id::{RawStateId, StateId};

pub(crate) use state::{ErasedState, ErasedTearDown};
pub(crate) use transition::Transition;
