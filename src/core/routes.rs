//! Route registry
//!
//! [`Routes`] owns the route-to-transition mapping and is immutable after
//! `build()`. The builder pairs each typed route shape with a transition
//! closure of the exact matching shape, so a mismatched registration does
//! not compile. `add_*` rejects duplicates, `replace_*` always overwrites,
//! and `add_all` merges an already-built registry into the builder.
//!
//! Insertion order is kept next to the map so iteration, layering, and
//! error messages stay deterministic across runs.

use super::error::{BoxError, CoreError, CoreResult};
use super::route::{Bridge, Merge, Merge3, Route, Start};
use super::transition::Transition;
use super::State;
use std::any::Any;
use std::collections::HashMap;

/// Immutable registry mapping routes to their transitions.
///
/// # Examples
///
/// ```
/// use initgraph::{Routes, Start, State, StateId};
///
/// let id = StateId::<String>::named("greeting");
/// let routes = Routes::builder()
///     .add_start(Start::of(id), || Ok(State::of("hello".to_string())))
///     .unwrap()
///     .build();
/// assert_eq!(routes.len(), 1);
/// ```
#[derive(Debug)]
pub struct Routes {
    map: HashMap<Route, Transition>,
    insertion_order: Vec<Route>,
}

impl Routes {
    /// Creates a new builder
    pub fn builder() -> RoutesBuilder {
        RoutesBuilder::new()
    }

    /// Returns the number of registered routes
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no route is registered
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns all routes in registration order
    pub fn all(&self) -> impl Iterator<Item = &Route> {
        self.insertion_order.iter()
    }

    /// Returns the transition registered for a route
    pub(crate) fn transition_of(&self, route: &Route) -> Option<&Transition> {
        self.map.get(route)
    }

    fn into_parts(self) -> (HashMap<Route, Transition>, Vec<Route>) {
        (self.map, self.insertion_order)
    }
}

/// Builder for [`Routes`].
#[derive(Debug, Default)]
pub struct RoutesBuilder {
    map: HashMap<Route, Transition>,
    insertion_order: Vec<Route>,
}

impl RoutesBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Registers a start route; fails if the route is already registered.
    pub fn add_start<D: Any>(
        self,
        route: Start<D>,
        transition: impl Fn() -> Result<State<D>, BoxError> + Send + Sync + 'static,
    ) -> CoreResult<Self> {
        self.add_route(Route::from(&route), Transition::start(transition))
    }

    /// Registers a bridge route; fails if the route is already registered.
    pub fn add_bridge<S: Any, D: Any>(
        self,
        route: Bridge<S, D>,
        transition: impl Fn(&S) -> Result<State<D>, BoxError> + Send + Sync + 'static,
    ) -> CoreResult<Self> {
        let erased = Transition::bridge(route.source(), transition);
        self.add_route(Route::from(&route), erased)
    }

    /// Registers a two-way merge route; fails if the route is already
    /// registered.
    pub fn add_merge<L: Any, R: Any, D: Any>(
        self,
        route: Merge<L, R, D>,
        transition: impl Fn(&L, &R) -> Result<State<D>, BoxError> + Send + Sync + 'static,
    ) -> CoreResult<Self> {
        let erased = Transition::merge(route.left(), route.right(), transition);
        self.add_route(Route::from(&route), erased)
    }

    /// Registers a three-way merge route; fails if the route is already
    /// registered.
    pub fn add_merge3<L: Any, M: Any, R: Any, D: Any>(
        self,
        route: Merge3<L, M, R, D>,
        transition: impl Fn(&L, &M, &R) -> Result<State<D>, BoxError> + Send + Sync + 'static,
    ) -> CoreResult<Self> {
        let erased = Transition::merge3(route.left(), route.middle(), route.right(), transition);
        self.add_route(Route::from(&route), erased)
    }

    /// Registers a start route, overwriting any previous registration.
    pub fn replace_start<D: Any>(
        self,
        route: Start<D>,
        transition: impl Fn() -> Result<State<D>, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.replace_route(Route::from(&route), Transition::start(transition))
    }

    /// Registers a bridge route, overwriting any previous registration.
    pub fn replace_bridge<S: Any, D: Any>(
        self,
        route: Bridge<S, D>,
        transition: impl Fn(&S) -> Result<State<D>, BoxError> + Send + Sync + 'static,
    ) -> Self {
        let erased = Transition::bridge(route.source(), transition);
        self.replace_route(Route::from(&route), erased)
    }

    /// Registers a two-way merge route, overwriting any previous
    /// registration.
    pub fn replace_merge<L: Any, R: Any, D: Any>(
        self,
        route: Merge<L, R, D>,
        transition: impl Fn(&L, &R) -> Result<State<D>, BoxError> + Send + Sync + 'static,
    ) -> Self {
        let erased = Transition::merge(route.left(), route.right(), transition);
        self.replace_route(Route::from(&route), erased)
    }

    /// Registers a three-way merge route, overwriting any previous
    /// registration.
    pub fn replace_merge3<L: Any, M: Any, R: Any, D: Any>(
        self,
        route: Merge3<L, M, R, D>,
        transition: impl Fn(&L, &M, &R) -> Result<State<D>, BoxError> + Send + Sync + 'static,
    ) -> Self {
        let erased = Transition::merge3(route.left(), route.middle(), route.right(), transition);
        self.replace_route(Route::from(&route), erased)
    }

    /// Merges every route of an already-built registry into this builder.
    ///
    /// Fails on the first route that is already present here.
    pub fn add_all(mut self, routes: Routes) -> CoreResult<Self> {
        let (mut map, order) = routes.into_parts();
        for route in order {
            // SAFETY: every route in insertion_order has a map entry; both
            // are only ever written together in add_route/replace_route.
            let transition = map.remove(&route).unwrap();
            self = self.add_route(route, transition)?;
        }
        Ok(self)
    }

    /// Builds the immutable registry
    pub fn build(self) -> Routes {
        Routes {
            map: self.map,
            insertion_order: self.insertion_order,
        }
    }

    fn add_route(mut self, route: Route, transition: Transition) -> CoreResult<Self> {
        if self.map.contains_key(&route) {
            return Err(CoreError::duplicate_route(route));
        }
        self.insertion_order.push(route.clone());
        self.map.insert(route, transition);
        Ok(self)
    }

    fn replace_route(mut self, route: Route, transition: Transition) -> Self {
        if self.map.insert(route.clone(), transition).is_none() {
            self.insertion_order.push(route);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateId;

    fn text(name: &str) -> StateId<String> {
        StateId::named(name)
    }

    #[test]
    fn test_build_routes() {
        let routes = Routes::builder()
            .add_start(Start::of(text("a")), || Ok(State::of("12".to_string())))
            .unwrap()
            .add_bridge(
                Bridge::of(text("a"), StateId::<u32>::named("b")),
                |a: &String| Ok(State::of(a.parse::<u32>()?)),
            )
            .unwrap()
            .build();

        assert_eq!(routes.len(), 2);
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let result = Routes::builder()
            .add_start(Start::of(text("a")), || Ok(State::of("one".to_string())))
            .unwrap()
            .add_start(Start::of(text("a")), || Ok(State::of("two".to_string())));

        assert!(matches!(result, Err(CoreError::DuplicateRoute { .. })));
    }

    #[test]
    fn test_replace_overwrites() {
        let routes = Routes::builder()
            .add_start(Start::of(text("a")), || Ok(State::of("one".to_string())))
            .unwrap()
            .replace_start(Start::of(text("a")), || Ok(State::of("two".to_string())))
            .build();

        assert_eq!(routes.len(), 1);

        let route = routes.all().next().unwrap().clone();
        let Transition::Start(f) = routes.transition_of(&route).unwrap() else {
            panic!("expected start transition");
        };
        let state = f().unwrap();
        assert_eq!(
            state.value.downcast_ref::<String>(),
            Some(&"two".to_string())
        );
    }

    #[test]
    fn test_add_all_merges() {
        let base = Routes::builder()
            .add_start(Start::of(text("a")), || Ok(State::of("a".to_string())))
            .unwrap()
            .build();

        let merged = Routes::builder()
            .add_start(Start::of(text("b")), || Ok(State::of("b".to_string())))
            .unwrap()
            .add_all(base)
            .unwrap()
            .build();

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_add_all_rejects_conflicts() {
        let base = Routes::builder()
            .add_start(Start::of(text("a")), || Ok(State::of("a".to_string())))
            .unwrap()
            .build();

        let result = Routes::builder()
            .add_start(Start::of(text("a")), || Ok(State::of("other".to_string())))
            .unwrap()
            .add_all(base);

        assert!(matches!(result, Err(CoreError::DuplicateRoute { .. })));
    }

    #[test]
    fn test_registration_order_preserved() {
        let routes = Routes::builder()
            .add_start(Start::of(text("z")), || Ok(State::of("z".to_string())))
            .unwrap()
            .add_start(Start::of(text("a")), || Ok(State::of("a".to_string())))
            .unwrap()
            .build();

        let order: Vec<String> = routes.all().map(|r| r.destination().to_string()).collect();
        assert_eq!(order, vec!["z:String", "a:String"]);
    }
}
