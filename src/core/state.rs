//! Computed state values
//!
//! A [`State`] is the result of one transition: the computed value plus an
//! optional teardown callback invoked exactly once when the owning handle
//! rolls back or closes. Teardown is fallible so that failures can be
//! collected and aggregated instead of aborting sibling teardowns.

use super::error::BoxError;
use std::any::Any;
use std::rc::Rc;

/// A computed value together with an optional teardown callback.
///
/// # Examples
///
/// ```
/// use initgraph::State;
///
/// let plain = State::of(42u32);
///
/// let with_cleanup = State::with_tear_down("temp-dir".to_string(), |path| {
///     // remove the directory here
///     let _ = path;
///     Ok(())
/// });
/// ```
pub struct State<T> {
    value: T,
    tear_down: Option<Box<dyn FnOnce(&T) -> Result<(), BoxError>>>,
}

impl<T> State<T> {
    /// Creates a state with no teardown.
    pub fn of(value: T) -> Self {
        Self {
            value,
            tear_down: None,
        }
    }

    /// Creates a state whose teardown runs when the owning handle closes.
    pub fn with_tear_down(
        value: T,
        tear_down: impl FnOnce(&T) -> Result<(), BoxError> + 'static,
    ) -> Self {
        Self {
            value,
            tear_down: Some(Box::new(tear_down)),
        }
    }

    /// Returns the computed value
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("value", &self.value)
            .field("tear_down", &self.tear_down.is_some())
            .finish()
    }
}

/// Erased teardown callback over the type-erased value.
pub(crate) type ErasedTearDown = Box<dyn FnOnce(&dyn Any) -> Result<(), BoxError>>;

/// Type-erased state as held by the orchestrator.
///
/// The value is reference-counted so the running map, the handle's layer
/// list, and nested handles can share it; the teardown right stays with the
/// layer entry of the call that created the state.
pub(crate) struct ErasedState {
    pub(crate) value: Rc<dyn Any>,
    pub(crate) tear_down: Option<ErasedTearDown>,
}

impl std::fmt::Debug for ErasedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErasedState")
            .field("tear_down", &self.tear_down.is_some())
            .finish_non_exhaustive()
    }
}

impl ErasedState {
    /// Erases a typed state. The teardown wrapper downcasts back to `T`;
    /// the downcast cannot fail because the value stored next to it is the
    /// very `T` captured here.
    pub(crate) fn erase<T: Any>(state: State<T>) -> Self {
        let State { value, tear_down } = state;
        let tear_down = tear_down.map(|f| -> ErasedTearDown {
            Box::new(move |value: &dyn Any| match value.downcast_ref::<T>() {
                Some(typed) => f(typed),
                None => Ok(()),
            })
        });
        Self {
            value: Rc::new(value),
            tear_down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_state_without_tear_down() {
        let state = State::of("hello".to_string());
        assert_eq!(state.value(), "hello");
        assert!(state.tear_down.is_none());
    }

    #[test]
    fn test_erased_tear_down_sees_typed_value() {
        let seen = Rc::new(Cell::new(0u32));
        let seen_in_callback = Rc::clone(&seen);

        let state = State::with_tear_down(7u32, move |v| {
            seen_in_callback.set(*v);
            Ok(())
        });
        let erased = ErasedState::erase(state);

        let tear_down = erased.tear_down.unwrap();
        tear_down(&*erased.value).unwrap();
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn test_erased_tear_down_propagates_error() {
        let state = State::with_tear_down(1u32, |_| Err("boom".into()));
        let erased = ErasedState::erase(state);

        let tear_down = erased.tear_down.unwrap();
        assert!(tear_down(&*erased.value).is_err());
    }
}
