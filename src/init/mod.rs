//! Init orchestration - layered initialization with deterministic rollback
//!
//! This module ties the registry and the graph together:
//!
//! - [`Initializer`]: built from a [`Routes`](crate::core::Routes) registry;
//!   rejects cyclic graphs eagerly; entry point for init call chains
//! - [`Init`]: the handle returned by one init call — resolved target value,
//!   nested init, idempotent close with reverse-order teardown
//! - [`InitListener`] / [`SimpleListener`] / [`TypedListener`]: observation
//!   of reached and torn-down states
//! - [`InitError`] / [`TearDownErrors`]: call-time failures with the failing
//!   identifiers attached and the original cause preserved
//!
//! # Design
//!
//! This module hides the resolution strategy: how a destination finds its
//! unique route, how route and transition shapes are paired, and in which
//! order states are created and destroyed. Callers see only targets,
//! handles, and listeners.

mod error;
mod initializer;
mod listener;
mod resolver;

pub use error::{InitError, InitResult, RouteList, TearDownErrors, TearDownFailure};
pub use initializer::{Init, Initializer};
pub use listener::{InitListener, SimpleListener, TypedListener, TypedListenerBuilder};
