//! Initgraph: dependency-graph driven staged initialization
//!
//! `initgraph` orchestrates staged initialization: a set of typed production
//! rules ("routes" with attached "transitions") declares how values are
//! computed from other values. Asking for a target value computes exactly the
//! states the target depends on, in dependency order, and guarantees that
//! partially completed work is rolled back in reverse order when any step
//! fails.
//!
//! # Features
//!
//! - **Typed states**: every producible value is keyed by a [`StateId`]
//!   combining an optional name with the value's type
//! - **Dependency layering**: required states are computed layer by layer via
//!   topological peeling over the route graph
//! - **Deterministic rollback**: on failure, every state created by the
//!   failing call is torn down in exact reverse-of-creation order
//! - **Incremental extension**: a handle over initialized states can `init`
//!   further targets without recomputing anything it already holds
//! - **Cycle rejection**: building an [`Initializer`] fails eagerly if the
//!   route graph contains a cycle, naming every vertex involved
//!
//! # Quick Start
//!
//! ```
//! use initgraph::{Bridge, Initializer, Routes, Start, State, StateId};
//!
//! let text = StateId::<String>::unnamed();
//! let number = StateId::<u32>::unnamed();
//!
//! let routes = Routes::builder()
//!     .add_start(Start::of(text.clone()), || Ok(State::of("12".to_string())))
//!     .unwrap()
//!     .add_bridge(Bridge::of(text, number.clone()), |s: &String| {
//!         Ok(State::of(s.parse::<u32>()?))
//!     })
//!     .unwrap()
//!     .build();
//!
//! let init = Initializer::with(routes).unwrap();
//! let handle = init.init(&number).unwrap();
//! assert_eq!(*handle.current(), 12);
//! ```
//!
//! # Module Organization
//!
//! Each module hides one design decision that is likely to change:
//!
//! - [`core`]: foundation types — identifiers, states, routes, transitions,
//!   and the route registry (hides the type-erasure mechanism)
//! - [`graph`]: the derived dependency graph (hides the graph representation)
//! - [`init`]: the orchestrator — init, nested init, rollback, listeners
//!   (hides the resolution strategy)
//!
//! # Concurrency Model
//!
//! A built [`Routes`] registry and the [`Initializer`] constructed from it
//! are immutable and `Send + Sync`: independent init chains may run against
//! the same registry on separate threads with no coordination. The [`Init`]
//! handle returned by one chain is deliberately not `Send` — its state map is
//! private to that chain and must never be shared across threads.

pub mod core;
pub mod graph;
pub mod init;

// Re-export commonly used types for convenience
pub use crate::core::{
    BoxError, Bridge, CoreError, Merge, Merge3, RawStateId, Route, Routes, RoutesBuilder, Start,
    State, StateId,
};
pub use graph::{GraphError, RouteGraph};
pub use init::{
    Init, InitError, InitListener, Initializer, SimpleListener, TearDownErrors, TypedListener,
};
