//! Typed keys addressing values inside a [`DataContainer`].
//!
//! A [`Key<T>`] is an immutable `(type, name)` pair. Keys are declared once as
//! `static` items and shared by every container that understands them; the
//! type parameter makes every read type-checked at the call site while the
//! container itself stays heterogeneous.
//!
//! [`DataContainer`]: super::DataContainer

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;

/// Named, statically typed identifier for a value of type `T`.
pub struct Key<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    /// Create a key with the given stable name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }

    /// The key's stable name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: 'static> Key<T> {
    /// Runtime identity of this key: its value type plus its name.
    pub fn id(&self) -> KeyId {
        KeyId {
            type_id: TypeId::of::<T>(),
            name: self.name,
        }
    }
}

// Manual impls: derives would demand `T: Clone` etc.
impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Key<T> {}

impl<T> Hash for Key<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key<{}>({})", type_name::<T>(), self.name)
    }
}

/// Type-erased key identity used as the container's map key.
///
/// Two keys are the same entry only if both their value type and their name
/// match, so `Key<i64>("kills")` and `Key<usize>("kills")` never alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyId {
    type_id: TypeId,
    name: &'static str,
}

impl KeyId {
    /// Name of the key this id was derived from.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// A [`Key`] whose name doubles as a template-substitution identifier.
///
/// Dereferences to the underlying key, so it can be passed anywhere a
/// `&Key<T>` is expected.
pub struct PlaceholderKey<T> {
    key: Key<T>,
}

impl<T> PlaceholderKey<T> {
    /// Create a placeholder key; `name` is also the placeholder identifier.
    pub const fn new(name: &'static str) -> Self {
        Self {
            key: Key::new(name),
        }
    }

    /// The identifier used when substituting this value into templates.
    pub const fn placeholder(&self) -> &'static str {
        self.key.name
    }

    /// The underlying key.
    pub const fn key(&self) -> Key<T> {
        self.key
    }
}

impl<T> Clone for PlaceholderKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PlaceholderKey<T> {}

impl<T> Deref for PlaceholderKey<T> {
    type Target = Key<T>;

    fn deref(&self) -> &Key<T> {
        &self.key
    }
}

impl<T> fmt::Debug for PlaceholderKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlaceholderKey<{}>({})", type_name::<T>(), self.key.name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
