//! Erased transition closures
//!
//! A transition is the computation attached to a route. Users register plain
//! typed closures; registration erases them into one variant of the closed
//! [`Transition`] enum, whose shape mirrors the route shape exactly. Source
//! values arrive as `&dyn Any` and are recovered with a checked downcast
//! inside the wrapper, where the concrete source type is still known.
//!
//! Transitions are stored in the registry for its whole lifetime and may be
//! invoked from any number of init chains, so the erased closures are
//! `Fn + Send + Sync`.

use super::error::{BoxError, CoreError};
use super::route::RouteKind;
use super::state::ErasedState;
use super::state_id::{RawStateId, StateId};
use super::State;
use std::any::Any;

pub(crate) type TransitionResult = Result<ErasedState, CoreError>;

type StartFn = Box<dyn Fn() -> TransitionResult + Send + Sync>;
type BridgeFn = Box<dyn Fn(&dyn Any) -> TransitionResult + Send + Sync>;
type MergeFn = Box<dyn Fn(&dyn Any, &dyn Any) -> TransitionResult + Send + Sync>;
type Merge3Fn = Box<dyn Fn(&dyn Any, &dyn Any, &dyn Any) -> TransitionResult + Send + Sync>;

/// Type-erased transition, one variant per route shape.
pub(crate) enum Transition {
    Start(StartFn),
    Bridge(BridgeFn),
    Merge(MergeFn),
    Merge3(Merge3Fn),
}

impl Transition {
    /// Returns the shape of this transition
    pub(crate) fn kind(&self) -> RouteKind {
        match self {
            Transition::Start(_) => RouteKind::Start,
            Transition::Bridge(_) => RouteKind::Bridge,
            Transition::Merge(_) => RouteKind::Merge,
            Transition::Merge3(_) => RouteKind::Merge3,
        }
    }

    pub(crate) fn start<D: Any>(
        f: impl Fn() -> Result<State<D>, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Transition::Start(Box::new(move || {
            f().map(ErasedState::erase).map_err(CoreError::Transition)
        }))
    }

    pub(crate) fn bridge<S: Any, D: Any>(
        source: &StateId<S>,
        f: impl Fn(&S) -> Result<State<D>, BoxError> + Send + Sync + 'static,
    ) -> Self {
        let source = source.raw();
        Transition::Bridge(Box::new(move |s: &dyn Any| {
            let s = downcast::<S>(s, &source)?;
            f(s).map(ErasedState::erase).map_err(CoreError::Transition)
        }))
    }

    pub(crate) fn merge<L: Any, R: Any, D: Any>(
        left: &StateId<L>,
        right: &StateId<R>,
        f: impl Fn(&L, &R) -> Result<State<D>, BoxError> + Send + Sync + 'static,
    ) -> Self {
        let (left, right) = (left.raw(), right.raw());
        Transition::Merge(Box::new(move |l: &dyn Any, r: &dyn Any| {
            let l = downcast::<L>(l, &left)?;
            let r = downcast::<R>(r, &right)?;
            f(l, r)
                .map(ErasedState::erase)
                .map_err(CoreError::Transition)
        }))
    }

    pub(crate) fn merge3<L: Any, M: Any, R: Any, D: Any>(
        left: &StateId<L>,
        middle: &StateId<M>,
        right: &StateId<R>,
        f: impl Fn(&L, &M, &R) -> Result<State<D>, BoxError> + Send + Sync + 'static,
    ) -> Self {
        let (left, middle, right) = (left.raw(), middle.raw(), right.raw());
        Transition::Merge3(Box::new(move |l: &dyn Any, m: &dyn Any, r: &dyn Any| {
            let l = downcast::<L>(l, &left)?;
            let m = downcast::<M>(m, &middle)?;
            let r = downcast::<R>(r, &right)?;
            f(l, m, r)
                .map(ErasedState::erase)
                .map_err(CoreError::Transition)
        }))
    }
}

fn downcast<'a, T: Any>(value: &'a dyn Any, id: &RawStateId) -> Result<&'a T, CoreError> {
    value
        .downcast_ref::<T>()
        .ok_or_else(|| CoreError::type_mismatch(id.clone(), std::any::type_name::<T>()))
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Transition({})", self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_produces_value() {
        let transition = Transition::start(|| Ok(State::of(3u32)));
        let Transition::Start(f) = &transition else {
            panic!("expected start shape");
        };

        let state = f().unwrap();
        assert_eq!(state.value.downcast_ref::<u32>(), Some(&3));
    }

    #[test]
    fn test_bridge_downcast_mismatch_is_typed_error() {
        let source = StateId::<String>::named("in");
        let transition = Transition::bridge(&source, |s: &String| Ok(State::of(s.len())));
        let Transition::Bridge(f) = &transition else {
            panic!("expected bridge shape");
        };

        // Feed a value of the wrong type
        let wrong: &dyn Any = &5u32;
        let err = f(wrong).unwrap_err();
        assert!(matches!(err, CoreError::StateTypeMismatch { .. }));
    }

    #[test]
    fn test_merge_feeds_sources_in_order() {
        let left = StateId::<String>::named("l");
        let right = StateId::<u32>::named("r");
        let transition = Transition::merge(&left, &right, |l: &String, r: &u32| {
            Ok(State::of(format!("{}-{}", l, r)))
        });
        let Transition::Merge(f) = &transition else {
            panic!("expected merge shape");
        };

        let l: &dyn Any = &"a".to_string();
        let r: &dyn Any = &2u32;
        let state = f(l, r).unwrap();
        assert_eq!(
            state.value.downcast_ref::<String>(),
            Some(&"a-2".to_string())
        );
    }

    #[test]
    fn test_user_error_wrapped_as_transition_error() {
        let transition = Transition::start::<u32>(|| Err("no luck".into()));
        let Transition::Start(f) = &transition else {
            panic!("expected start shape");
        };

        let err = f().unwrap_err();
        assert!(matches!(err, CoreError::Transition(_)));
    }
}
