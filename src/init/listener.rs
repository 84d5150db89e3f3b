//! Init listeners
//!
//! A listener observes the orchestrator's progress: it is notified right
//! after each state value is reached and right before each state is torn
//! down. Two implementations are provided:
//!
//! - [`SimpleListener`]: a pair of untyped callbacks receiving the
//!   identifier and the erased value
//! - [`TypedListener`]: a per-identifier table of typed callbacks, invoked
//!   through the same checked-downcast discipline as the state map
//!
//! Listeners run synchronously inside the init call chain; a listener that
//! panics aborts the call like any other panic.

use crate::core::{RawStateId, StateId};
use std::any::Any;
use std::collections::HashMap;

/// Observer of state lifecycle events within one init call chain.
pub trait InitListener {
    /// Called after a state value has been computed, before the next state
    /// in the layer is resolved.
    fn on_state_reached(&self, id: &RawStateId, value: &dyn Any) {
        let _ = (id, value);
    }

    /// Called before a state's teardown callback runs (during rollback or
    /// close).
    fn on_state_tear_down(&self, id: &RawStateId, value: &dyn Any) {
        let _ = (id, value);
    }
}

type Callback = Box<dyn Fn(&RawStateId, &dyn Any)>;

/// Listener built from a pair of untyped callbacks.
///
/// # Example
///
/// ```
/// use initgraph::SimpleListener;
///
/// let listener = SimpleListener::of(
///     |id, _value| println!("reached {id}"),
///     |id, _value| println!("tearing down {id}"),
/// );
/// # let _ = listener;
/// ```
pub struct SimpleListener {
    on_reached: Option<Callback>,
    on_tear_down: Option<Callback>,
}

impl SimpleListener {
    /// Creates a listener from both callbacks.
    pub fn of(
        on_reached: impl Fn(&RawStateId, &dyn Any) + 'static,
        on_tear_down: impl Fn(&RawStateId, &dyn Any) + 'static,
    ) -> Self {
        Self {
            on_reached: Some(Box::new(on_reached)),
            on_tear_down: Some(Box::new(on_tear_down)),
        }
    }

    /// Creates a listener observing only reached states.
    pub fn on_reached(on_reached: impl Fn(&RawStateId, &dyn Any) + 'static) -> Self {
        Self {
            on_reached: Some(Box::new(on_reached)),
            on_tear_down: None,
        }
    }

    /// Creates a listener observing only teardowns.
    pub fn on_tear_down(on_tear_down: impl Fn(&RawStateId, &dyn Any) + 'static) -> Self {
        Self {
            on_reached: None,
            on_tear_down: Some(Box::new(on_tear_down)),
        }
    }
}

impl InitListener for SimpleListener {
    fn on_state_reached(&self, id: &RawStateId, value: &dyn Any) {
        if let Some(callback) = &self.on_reached {
            callback(id, value);
        }
    }

    fn on_state_tear_down(&self, id: &RawStateId, value: &dyn Any) {
        if let Some(callback) = &self.on_tear_down {
            callback(id, value);
        }
    }
}

type TypedCallback = Box<dyn Fn(&dyn Any)>;

/// Listener with typed per-identifier callback tables.
///
/// Callbacks registered for an identifier fire only for that identifier,
/// with the value already downcast to its concrete type.
///
/// # Example
///
/// ```
/// use initgraph::{StateId, TypedListener};
///
/// let url = StateId::<String>::named("url");
/// let listener = TypedListener::builder()
///     .on_state_reached(&url, |value: &String| println!("url is {value}"))
///     .build();
/// # let _ = listener;
/// ```
pub struct TypedListener {
    reached: HashMap<RawStateId, Vec<TypedCallback>>,
    tear_down: HashMap<RawStateId, Vec<TypedCallback>>,
}

impl TypedListener {
    /// Creates a new builder
    pub fn builder() -> TypedListenerBuilder {
        TypedListenerBuilder {
            reached: HashMap::new(),
            tear_down: HashMap::new(),
        }
    }
}

impl InitListener for TypedListener {
    fn on_state_reached(&self, id: &RawStateId, value: &dyn Any) {
        if let Some(callbacks) = self.reached.get(id) {
            for callback in callbacks {
                callback(value);
            }
        }
    }

    fn on_state_tear_down(&self, id: &RawStateId, value: &dyn Any) {
        if let Some(callbacks) = self.tear_down.get(id) {
            for callback in callbacks {
                callback(value);
            }
        }
    }
}

/// Builder for [`TypedListener`].
pub struct TypedListenerBuilder {
    reached: HashMap<RawStateId, Vec<TypedCallback>>,
    tear_down: HashMap<RawStateId, Vec<TypedCallback>>,
}

impl TypedListenerBuilder {
    /// Registers a typed callback for when `id` is reached.
    pub fn on_state_reached<T: Any>(mut self, id: &StateId<T>, f: impl Fn(&T) + 'static) -> Self {
        self.reached
            .entry(id.raw())
            .or_default()
            .push(erase_callback(f));
        self
    }

    /// Registers a typed callback for when `id` is torn down.
    pub fn on_state_tear_down<T: Any>(mut self, id: &StateId<T>, f: impl Fn(&T) + 'static) -> Self {
        self.tear_down
            .entry(id.raw())
            .or_default()
            .push(erase_callback(f));
        self
    }

    /// Builds the listener
    pub fn build(self) -> TypedListener {
        TypedListener {
            reached: self.reached,
            tear_down: self.tear_down,
        }
    }
}

fn erase_callback<T: Any>(f: impl Fn(&T) + 'static) -> TypedCallback {
    // Checked downcast: a value of the wrong type is skipped rather than
    // panicking inside user observation code.
    Box::new(move |value: &dyn Any| {
        if let Some(typed) = value.downcast_ref::<T>() {
            f(typed);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_simple_listener_forwards_both_events() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let reached_log = Rc::clone(&events);
        let tear_down_log = Rc::clone(&events);

        let listener = SimpleListener::of(
            move |id, _| reached_log.borrow_mut().push(format!("up {id}")),
            move |id, _| tear_down_log.borrow_mut().push(format!("down {id}")),
        );

        let id = StateId::<u32>::named("n").raw();
        listener.on_state_reached(&id, &1u32);
        listener.on_state_tear_down(&id, &1u32);

        assert_eq!(*events.borrow(), vec!["up n:u32", "down n:u32"]);
    }

    #[test]
    fn test_typed_listener_fires_only_for_its_id() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let watched = StateId::<String>::named("watched");
        let listener = TypedListener::builder()
            .on_state_reached(&watched, move |value: &String| {
                sink.borrow_mut().push(value.clone())
            })
            .build();

        listener.on_state_reached(&watched.raw(), &"yes".to_string());
        listener.on_state_reached(&StateId::<String>::named("other").raw(), &"no".to_string());

        assert_eq!(*seen.borrow(), vec!["yes"]);
    }

    #[test]
    fn test_typed_listener_skips_wrong_type() {
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);

        let id = StateId::<String>::named("x");
        let listener = TypedListener::builder()
            .on_state_reached(&id, move |_: &String| *sink.borrow_mut() += 1)
            .build();

        // Same raw id, wrong payload type: callback must not fire
        listener.on_state_reached(&id.raw(), &7u32);
        assert_eq!(*count.borrow(), 0);
    }
}
