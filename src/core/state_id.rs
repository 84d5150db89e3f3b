//! State identifier types
//!
//! A state identifier names one producible value. It combines an optional
//! label with the value's type: two identifiers are equal iff both the label
//! and the type match, so `StateId::<String>::named("a")` and
//! `StateId::<u32>::named("a")` name different states.
//!
//! # Design Decision
//!
//! The public API works with the typed [`StateId<T>`], which lets routes and
//! transitions be checked at compile time. Graph vertices, map keys, and
//! error messages use the erased [`RawStateId`], which reifies the type as a
//! `TypeId` plus a type name kept purely for diagnostics.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed identifier for a producible state.
///
/// # Examples
///
/// ```
/// use initgraph::StateId;
///
/// let unnamed = StateId::<String>::unnamed();
/// let named = StateId::<String>::named("database.url");
/// assert_ne!(unnamed.raw(), named.raw());
/// ```
pub struct StateId<T: Any> {
    name: Option<String>,
    _type: PhantomData<fn() -> T>,
}

impl<T: Any> StateId<T> {
    /// Creates an identifier with no name; the type alone is the key.
    pub fn unnamed() -> Self {
        Self {
            name: None,
            _type: PhantomData,
        }
    }

    /// Creates an identifier with a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            _type: PhantomData,
        }
    }

    /// Returns the name if present
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the type-erased form of this identifier
    pub fn raw(&self) -> RawStateId {
        RawStateId {
            name: self.name.clone(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

impl<T: Any> Clone for StateId<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _type: PhantomData,
        }
    }
}

impl<T: Any> PartialEq for StateId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T: Any> Eq for StateId<T> {}

impl<T: Any> fmt::Debug for StateId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateId({})", self.raw())
    }
}

/// Type-erased state identifier.
///
/// Equality and hashing use the name and the `TypeId` only; the type name is
/// carried for display.
#[derive(Debug, Clone)]
pub struct RawStateId {
    name: Option<String>,
    type_id: TypeId,
    type_name: &'static str,
}

impl RawStateId {
    /// Returns the name if present
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the reified type of the value this identifier names
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the full type name (for diagnostics only)
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Short type name: the last path segment, `alloc::string::String`
    /// becomes `String`. Generic parameters are kept as-is.
    fn short_type_name(&self) -> &'static str {
        match self.type_name.rfind("::") {
            // Keep the segment only when no generics follow the split point
            Some(pos) if !self.type_name[..pos].contains('<') => &self.type_name[pos + 2..],
            _ => self.type_name,
        }
    }
}

impl PartialEq for RawStateId {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.type_id == other.type_id
    }
}

impl Eq for RawStateId {}

impl Hash for RawStateId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.type_id.hash(state);
    }
}

impl fmt::Display for RawStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{}", name, self.short_type_name()),
            None => write!(f, "{}", self.short_type_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_needs_name_and_type() {
        let a = StateId::<String>::named("a").raw();
        let b = StateId::<String>::named("a").raw();
        let c = StateId::<u32>::named("a").raw();
        let d = StateId::<String>::named("b").raw();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_unnamed_differs_from_named() {
        let unnamed = StateId::<String>::unnamed().raw();
        let named = StateId::<String>::named("x").raw();
        assert_ne!(unnamed, named);
    }

    #[test]
    fn test_hash_follows_equality() {
        let mut set = HashSet::new();
        set.insert(StateId::<String>::named("a").raw());
        set.insert(StateId::<String>::named("a").raw());
        set.insert(StateId::<u32>::named("a").raw());

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display_short_type_name() {
        let id = StateId::<String>::named("x").raw();
        assert_eq!(format!("{}", id), "x:String");

        let unnamed = StateId::<u32>::unnamed().raw();
        assert_eq!(format!("{}", unnamed), "u32");
    }
}
