//! Init orchestration
//!
//! [`Initializer`] owns the immutable pieces shared by every init chain:
//! the registry, the derived route graph (validated cycle-free at
//! construction), and the route-by-destination index. [`Init`] is the
//! handle returned by one init call: it owns the right to tear down exactly
//! the states that call created, supports nested init against its own state
//! map, and closes idempotently — including on drop.
//!
//! # Rollback
//!
//! A failure while resolving a state rolls back everything the failing call
//! created so far — the partially completed current layer and every
//! completed layer — in exact reverse-of-creation order. States inherited
//! from an enclosing handle are never touched; they remain the enclosing
//! handle's responsibility.

use super::error::{InitError, InitResult, TearDownErrors, TearDownFailure};
use super::listener::InitListener;
use super::resolver::{resolver_of, StateLookup};
use crate::core::{ErasedState, ErasedTearDown, RawStateId, Route, Routes, StateId};
use crate::graph::{GraphError, GraphResult, RouteGraph};
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Immutable context shared by every init chain of one [`Initializer`].
#[derive(Debug)]
struct Inner {
    routes: Routes,
    graph: RouteGraph,
    routes_by_destination: HashMap<RawStateId, Vec<Route>>,
}

/// Orchestrator over a route registry.
///
/// Construction performs the cycle check eagerly: an `Initializer` never
/// exists over a cyclic route graph. The orchestrator is cheap to clone and
/// `Send + Sync`; independent init chains may run on separate threads.
///
/// # Example
///
/// ```
/// use initgraph::{Bridge, Initializer, Routes, Start, State, StateId};
///
/// let text = StateId::<String>::unnamed();
/// let number = StateId::<u32>::unnamed();
/// let routes = Routes::builder()
///     .add_start(Start::of(text.clone()), || Ok(State::of("12".to_string())))
///     .unwrap()
///     .add_bridge(Bridge::of(text, number.clone()), |s: &String| {
///         Ok(State::of(s.parse::<u32>()?))
///     })
///     .unwrap()
///     .build();
///
/// let init = Initializer::with(routes).unwrap();
/// let handle = init.init(&number).unwrap();
/// assert_eq!(*handle.current(), 12);
/// ```
#[derive(Debug, Clone)]
pub struct Initializer {
    inner: Arc<Inner>,
}

impl Initializer {
    /// Builds an orchestrator over the registry.
    ///
    /// Fails with [`GraphError::CycleDetected`] naming every vertex of every
    /// discovered cycle if the route graph is not acyclic.
    pub fn with(routes: Routes) -> GraphResult<Self> {
        let graph = RouteGraph::from_routes(&routes);

        let cycles = graph.cycles();
        if !cycles.is_empty() {
            return Err(GraphError::cycles(&cycles));
        }

        let mut routes_by_destination: HashMap<RawStateId, Vec<Route>> = HashMap::new();
        for route in routes.all() {
            routes_by_destination
                .entry(route.destination().clone())
                .or_default()
                .push(route.clone());
        }

        Ok(Self {
            inner: Arc::new(Inner {
                routes,
                graph,
                routes_by_destination,
            }),
        })
    }

    /// Returns the route graph, e.g. for DOT export.
    pub fn graph(&self) -> &RouteGraph {
        &self.inner.graph
    }

    /// Initializes everything the destination depends on, then the
    /// destination itself.
    pub fn init<T: Any>(&self, destination: &StateId<T>) -> InitResult<Init<T>> {
        self.init_with(destination, Vec::new())
    }

    /// Like [`init`](Self::init), with listeners observing every state
    /// reached and torn down within this call chain.
    pub fn init_with<T: Any>(
        &self,
        destination: &StateId<T>,
        listeners: Vec<Box<dyn InitListener>>,
    ) -> InitResult<Init<T>> {
        run_init(&self.inner, HashMap::new(), destination, Rc::new(listeners))
    }
}

/// One state created by an init call, together with its teardown right.
struct InitializedState {
    id: RawStateId,
    value: Rc<dyn Any>,
    tear_down: Option<ErasedTearDown>,
}

/// Handle over one completed init call.
///
/// Holds the resolved target value, the full running state map (seed for
/// nested [`init`](Init::init)), and the layers this call created — stored
/// last-created-first, ready for teardown.
///
/// Dropping the handle closes it; [`close`](Init::close) reports teardown
/// failures explicitly and is a no-op when called again.
pub struct Init<T: Any> {
    inner: Arc<Inner>,
    listeners: Rc<Vec<Box<dyn InitListener>>>,
    state_map: HashMap<RawStateId, Rc<dyn Any>>,
    /// Own layers in teardown order (exact reverse of creation)
    layers: Vec<Vec<InitializedState>>,
    value: Rc<T>,
}

impl<T: Any> Init<T> {
    /// Returns the resolved target value.
    pub fn current(&self) -> &T {
        &self.value
    }

    /// Initializes a further destination on top of this handle's states.
    ///
    /// Nothing already initialized is recomputed. The returned handle owns
    /// only the states it newly created; closing it never disturbs the
    /// states it built upon.
    pub fn init<U: Any>(&self, destination: &StateId<U>) -> InitResult<Init<U>> {
        run_init(
            &self.inner,
            self.state_map.clone(),
            destination,
            Rc::clone(&self.listeners),
        )
    }

    /// Tears down the states this handle created, in reverse creation order.
    ///
    /// For each state, teardown listeners are notified before the teardown
    /// callback runs. Failures are collected, never short-circuiting sibling
    /// teardowns, and surfaced as [`TearDownErrors`] once every teardown was
    /// attempted. A second call is a no-op.
    pub fn close(&mut self) -> InitResult<()> {
        let layers = std::mem::take(&mut self.layers);
        if layers.is_empty() {
            return Ok(());
        }

        debug!(layers = layers.len(), "closing init handle");
        match tear_down_states(layers, self.listeners.as_slice()) {
            None => Ok(()),
            Some(errors) => Err(InitError::TearDown(errors)),
        }
    }
}

impl<T: Any> Drop for Init<T> {
    fn drop(&mut self) {
        if self.layers.is_empty() {
            return;
        }
        if let Err(error) = self.close() {
            warn!(%error, "teardown on drop failed");
        }
    }
}

impl<T: Any + std::fmt::Debug> std::fmt::Debug for Init<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Init")
            .field("current", &self.value)
            .field("states", &self.state_map.len())
            .field("own_layers", &self.layers.len())
            .finish()
    }
}

/// The init procedure shared by top-level and nested calls.
fn run_init<T: Any>(
    inner: &Arc<Inner>,
    current: HashMap<RawStateId, Rc<dyn Any>>,
    destination: &StateId<T>,
    listeners: Rc<Vec<Box<dyn InitListener>>>,
) -> InitResult<Init<T>> {
    let target = destination.raw();

    if current.contains_key(&target) {
        return Err(InitError::AlreadyInitialized { id: target });
    }
    if !inner.graph.contains(&target) {
        return Err(InitError::UnknownState { id: target });
    }

    let layers = inner.graph.dependency_layers(&target)?;
    debug!(target = %target, layers = layers.len(), "initializing");

    let mut state_map = current;
    // Completed layers in creation order; reversed on success and rollback
    let mut created: Vec<Vec<InitializedState>> = Vec::new();

    for layer in layers {
        let needed: Vec<RawStateId> = layer
            .iter()
            .filter(|id| !state_map.contains_key(*id))
            .cloned()
            .collect();
        if needed.is_empty() {
            continue;
        }

        let mut layer_states: Vec<InitializedState> = Vec::new();
        let mut failure: Option<InitError> = None;

        for id in &needed {
            match resolve_state(inner, id, &state_map) {
                Ok(state) => {
                    trace!(state = %id, "state reached");
                    for listener in listeners.iter() {
                        listener.on_state_reached(id, state.value.as_ref());
                    }
                    state_map.insert(id.clone(), Rc::clone(&state.value));
                    layer_states.push(InitializedState {
                        id: id.clone(),
                        value: state.value,
                        tear_down: state.tear_down,
                    });
                }
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }

        if let Some(cause) = failure {
            created.push(layer_states);
            roll_back(created, listeners.as_slice());
            return Err(InitError::Rollback {
                initializing: join_ids(&needed),
                cause: Box::new(cause),
            });
        }

        created.push(layer_states);
    }

    // Store last-created-first, each layer reversed: teardown order
    created.reverse();
    for layer in &mut created {
        layer.reverse();
    }

    // SAFETY: the target passed the membership check and was not already
    // present, so the peel created it.
    let value = state_map.get(&target).cloned().unwrap();
    let value: Rc<T> = match value.downcast() {
        Ok(typed) => typed,
        Err(_) => {
            // Unreachable through the typed API; roll back rather than leak
            roll_back_reversed(created, listeners.as_slice());
            return Err(InitError::StateTypeMismatch {
                id: target,
                expected: std::any::type_name::<T>(),
            });
        }
    };

    Ok(Init {
        inner: Arc::clone(inner),
        listeners,
        state_map,
        layers: created,
        value,
    })
}

/// Resolves one destination: unique route lookup, shape dispatch, invocation.
fn resolve_state(
    inner: &Arc<Inner>,
    id: &RawStateId,
    state_map: &HashMap<RawStateId, Rc<dyn Any>>,
) -> InitResult<ErasedState> {
    let candidates = inner
        .routes_by_destination
        .get(id)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let route = match candidates {
        [] => return Err(InitError::NoRouteTo { id: id.clone() }),
        [route] => route,
        many => {
            return Err(InitError::ambiguous_route(id.clone(), many.to_vec()));
        }
    };

    // SAFETY: routes_by_destination indexes the registry's own routes.
    let transition = inner.routes.transition_of(route).unwrap();

    let resolver = resolver_of(route, transition)?;
    resolver(&StateLookup::new(state_map))
}

/// Rollback of a failed call: layers arrive in creation order.
fn roll_back(mut created: Vec<Vec<InitializedState>>, listeners: &[Box<dyn InitListener>]) {
    created.reverse();
    for layer in &mut created {
        layer.reverse();
    }
    roll_back_reversed(created, listeners);
}

/// Rollback with layers already in teardown order. Teardown failures are
/// logged and swallowed so the original failure stays the surfaced error.
fn roll_back_reversed(created: Vec<Vec<InitializedState>>, listeners: &[Box<dyn InitListener>]) {
    if let Some(errors) = tear_down_states(created, listeners) {
        warn!(%errors, "teardown during rollback failed");
    }
}

/// Tears down layers already in teardown order, collecting failures.
fn tear_down_states(
    layers: Vec<Vec<InitializedState>>,
    listeners: &[Box<dyn InitListener>],
) -> Option<TearDownErrors> {
    let mut failures = Vec::new();

    for layer in layers {
        for state in layer {
            trace!(state = %state.id, "tearing down");
            for listener in listeners {
                listener.on_state_tear_down(&state.id, state.value.as_ref());
            }
            if let Some(tear_down) = state.tear_down {
                if let Err(error) = tear_down(state.value.as_ref()) {
                    failures.push(TearDownFailure::new(state.id.clone(), error));
                }
            }
        }
    }

    TearDownErrors::from_failures(failures)
}

fn join_ids(ids: &[RawStateId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Bridge, Start, State};

    fn text(name: &str) -> StateId<String> {
        StateId::named(name)
    }

    #[test]
    fn test_cycle_rejected_at_construction() {
        let routes = Routes::builder()
            .add_bridge(Bridge::of(text("a"), text("b")), |a: &String| {
                Ok(State::of(a.clone()))
            })
            .unwrap()
            .add_bridge(Bridge::of(text("b"), text("a")), |b: &String| {
                Ok(State::of(b.clone()))
            })
            .unwrap()
            .build();

        let err = Initializer::with(routes).unwrap_err();
        match err {
            GraphError::CycleDetected { path } => {
                assert!(path.contains("a:String"));
                assert!(path.contains("b:String"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_target_rejected() {
        let routes = Routes::builder()
            .add_start(Start::of(text("a")), || Ok(State::of("a".to_string())))
            .unwrap()
            .build();

        let init = Initializer::with(routes).unwrap();
        let err = init.init(&text("missing")).unwrap_err();
        assert!(matches!(err, InitError::UnknownState { .. }));
    }

    #[test]
    fn test_nested_init_rejects_already_initialized() {
        let routes = Routes::builder()
            .add_start(Start::of(text("a")), || Ok(State::of("a".to_string())))
            .unwrap()
            .build();

        let init = Initializer::with(routes).unwrap();
        let handle = init.init(&text("a")).unwrap();
        let err = handle.init(&text("a")).unwrap_err();
        assert!(matches!(err, InitError::AlreadyInitialized { .. }));
    }

    #[test]
    fn test_ambiguity_is_lazy() {
        // Both routes claim "dup"; building the orchestrator still works
        let routes = Routes::builder()
            .add_start(Start::of(text("ok")), || Ok(State::of("fine".to_string())))
            .unwrap()
            .add_start(Start::of(text("dup")), || Ok(State::of("one".to_string())))
            .unwrap()
            .add_bridge(Bridge::of(text("ok"), text("dup")), |s: &String| {
                Ok(State::of(s.clone()))
            })
            .unwrap()
            .build();

        let init = Initializer::with(routes).unwrap();

        // The unconflicted target resolves fine
        assert_eq!(init.init(&text("ok")).unwrap().current(), "fine");

        // The conflicted one fails, naming both candidates
        let err = init.init(&text("dup")).unwrap_err();
        match err {
            InitError::Rollback { cause, .. } => match *cause {
                InitError::AmbiguousRoute { id, candidates } => {
                    assert_eq!(id, text("dup").raw());
                    assert_eq!(candidates.as_slice().len(), 2);
                }
                other => panic!("unexpected cause: {other}"),
            },
            other => panic!("unexpected error: {other}"),
        }
    }
}
