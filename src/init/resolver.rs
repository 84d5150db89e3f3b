//! Transition resolution
//!
//! Pairs a route with its registered transition and produces the function
//! that computes the destination from the already-known source values.
//!
//! Dispatch is an exhaustive match over the four well-formed
//! (route shape, transition shape) pairs; the mismatched combinations
//! collapse to a single [`InitError::ShapeMismatch`]. A mismatch is a
//! registration-time bug, not a runtime-data bug — the typed registration
//! API cannot produce one.

use super::error::InitError;
use crate::core::{ErasedState, RawStateId, Route, Transition};
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

/// Read-only view of the values known so far within one init call.
pub(crate) struct StateLookup<'a> {
    map: &'a HashMap<RawStateId, Rc<dyn Any>>,
}

impl<'a> StateLookup<'a> {
    pub(crate) fn new(map: &'a HashMap<RawStateId, Rc<dyn Any>>) -> Self {
        Self { map }
    }

    fn get(&self, id: &RawStateId) -> Result<&'a dyn Any, InitError> {
        self.map
            .get(id)
            .map(|value| value.as_ref())
            .ok_or_else(|| InitError::MissingSource { id: id.clone() })
    }
}

/// The function produced for one (route, transition) pair.
pub(crate) type Resolver<'t> = Box<dyn Fn(&StateLookup<'_>) -> Result<ErasedState, InitError> + 't>;

/// Builds the resolver for a route and its transition.
///
/// The returned closure pulls each source's value from the lookup in
/// source-position order (left, middle, right) and feeds the transition.
pub(crate) fn resolver_of<'t>(
    route: &'t Route,
    transition: &'t Transition,
) -> Result<Resolver<'t>, InitError> {
    match (route, transition) {
        (Route::Start { destination }, Transition::Start(f)) => Ok(Box::new(move |_lookup| {
            f().map_err(|e| InitError::from_core(destination, e))
        })),

        (
            Route::Bridge {
                source,
                destination,
            },
            Transition::Bridge(f),
        ) => Ok(Box::new(move |lookup| {
            let s = lookup.get(source)?;
            f(s).map_err(|e| InitError::from_core(destination, e))
        })),

        (
            Route::Merge {
                left,
                right,
                destination,
            },
            Transition::Merge(f),
        ) => Ok(Box::new(move |lookup| {
            let l = lookup.get(left)?;
            let r = lookup.get(right)?;
            f(l, r).map_err(|e| InitError::from_core(destination, e))
        })),

        (
            Route::Merge3 {
                left,
                middle,
                right,
                destination,
            },
            Transition::Merge3(f),
        ) => Ok(Box::new(move |lookup| {
            let l = lookup.get(left)?;
            let m = lookup.get(middle)?;
            let r = lookup.get(right)?;
            f(l, m, r).map_err(|e| InitError::from_core(destination, e))
        })),

        (route, transition) => Err(InitError::ShapeMismatch {
            route: route.clone(),
            transition: transition.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{State, StateId};

    fn lookup_with(id: &RawStateId, value: Rc<dyn Any>) -> HashMap<RawStateId, Rc<dyn Any>> {
        let mut map = HashMap::new();
        map.insert(id.clone(), value);
        map
    }

    #[test]
    fn test_start_resolves_without_lookup() {
        let dest = StateId::<u32>::named("n");
        let route = Route::Start {
            destination: dest.raw(),
        };
        let transition = Transition::start(|| Ok(State::of(5u32)));

        let resolver = resolver_of(&route, &transition).unwrap();
        let map = HashMap::new();
        let state = resolver(&StateLookup::new(&map)).unwrap();

        assert_eq!(state.value.downcast_ref::<u32>(), Some(&5));
    }

    #[test]
    fn test_bridge_pulls_source_from_lookup() {
        let source = StateId::<String>::named("s");
        let dest = StateId::<usize>::named("len");
        let route = Route::Bridge {
            source: source.raw(),
            destination: dest.raw(),
        };
        let transition = Transition::bridge(&source, |s: &String| Ok(State::of(s.len())));

        let map = lookup_with(&source.raw(), Rc::new("four".to_string()));
        let resolver = resolver_of(&route, &transition).unwrap();
        let state = resolver(&StateLookup::new(&map)).unwrap();

        assert_eq!(state.value.downcast_ref::<usize>(), Some(&4));
    }

    #[test]
    fn test_missing_source_is_typed_failure() {
        let source = StateId::<String>::named("s");
        let dest = StateId::<usize>::named("len");
        let route = Route::Bridge {
            source: source.raw(),
            destination: dest.raw(),
        };
        let transition = Transition::bridge(&source, |s: &String| Ok(State::of(s.len())));

        let map = HashMap::new();
        let resolver = resolver_of(&route, &transition).unwrap();
        let err = resolver(&StateLookup::new(&map)).unwrap_err();

        assert!(matches!(err, InitError::MissingSource { .. }));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let dest = StateId::<u32>::named("n");
        let route = Route::Start {
            destination: dest.raw(),
        };
        // A bridge transition behind a start route
        let source = StateId::<String>::named("s");
        let transition = Transition::bridge(&source, |s: &String| Ok(State::of(s.len() as u32)));

        let err = resolver_of(&route, &transition).err().unwrap();
        assert!(matches!(err, InitError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_transition_failure_carries_destination() {
        let dest = StateId::<u32>::named("n");
        let route = Route::Start {
            destination: dest.raw(),
        };
        let transition = Transition::start::<u32>(|| Err("nope".into()));

        let resolver = resolver_of(&route, &transition).unwrap();
        let map = HashMap::new();
        let err = resolver(&StateLookup::new(&map)).unwrap_err();

        match err {
            InitError::Transition { id, .. } => assert_eq!(id, dest.raw()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
