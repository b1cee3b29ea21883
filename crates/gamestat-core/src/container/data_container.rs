//! Heterogeneous per-request container of eager values and memoized suppliers.
//!
//! Suppliers receive the container itself, so a derived key can pull other
//! keys it depends on. The dependency graph is resolved on demand: the first
//! read of a key runs its supplier, which may in turn trigger its inputs'
//! suppliers. Every supplier is an [`FnOnce`], so it runs at most once per
//! container; its result (value, absence, or failure) is what every later
//! read observes.
//!
//! Containers are single-threaded by construction (`!Sync`). Build one per
//! request, hand it to the consumer, drop it.

use std::any::Any;
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;

use super::key::{Key, KeyId};
use crate::errors::{ContainerError, Result};

/// Boxed error returned by suppliers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type Thunk<'a> =
    Box<dyn FnOnce(&DataContainer<'a>) -> std::result::Result<Option<Box<dyn Any>>, BoxError> + 'a>;

enum State<'a> {
    Ready,
    Pending(Thunk<'a>),
    Evaluating,
    Failed(String),
}

struct Entry<'a> {
    value: OnceCell<Option<Box<dyn Any>>>,
    state: RefCell<State<'a>>,
}

impl<'a> Entry<'a> {
    fn ready(value: Box<dyn Any>) -> Self {
        Self {
            value: OnceCell::from(Some(value)),
            state: RefCell::new(State::Ready),
        }
    }

    fn pending(thunk: Thunk<'a>) -> Self {
        Self {
            value: OnceCell::new(),
            state: RefCell::new(State::Pending(thunk)),
        }
    }

    fn resolved(&self) -> Option<&(dyn Any + 'static)> {
        self.value.get().and_then(Option::as_deref)
    }
}

/// Mapping from [`Key<T>`] to either a concrete value or a lazy supplier.
///
/// The lifetime `'a` bounds what suppliers may borrow (typically the
/// database handle they query).
#[derive(Default)]
pub struct DataContainer<'a> {
    entries: HashMap<KeyId, Entry<'a>>,
}

impl<'a> DataContainer<'a> {
    /// Create an empty container.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Store an eager value, replacing any value or supplier for `key`.
    pub fn put_raw_data<T: 'static>(&mut self, key: &Key<T>, value: T) {
        let _ = self.entries.insert(key.id(), Entry::ready(Box::new(value)));
    }

    /// Store a lazy computation for `key`; it runs on the first read.
    pub fn put_supplier<T, F>(&mut self, key: &Key<T>, supplier: F)
    where
        T: 'static,
        F: FnOnce(&DataContainer<'a>) -> std::result::Result<T, BoxError> + 'a,
    {
        self.put_optional_supplier(key, move |container| supplier(container).map(Some));
    }

    /// Store a lazy computation that may legitimately produce no value.
    ///
    /// A supplier returning `Ok(None)` makes the key read as absent.
    pub fn put_optional_supplier<T, F>(&mut self, key: &Key<T>, supplier: F)
    where
        T: 'static,
        F: FnOnce(&DataContainer<'a>) -> std::result::Result<Option<T>, BoxError> + 'a,
    {
        let thunk: Thunk<'a> = Box::new(move |container| {
            supplier(container).map(|value| value.map(|v| Box::new(v) as Box<dyn Any>))
        });
        let _ = self.entries.insert(key.id(), Entry::pending(thunk));
    }

    /// Whether the container holds a value or supplier for `key`.
    pub fn supports<T: 'static>(&self, key: &Key<T>) -> bool {
        self.entries.contains_key(&key.id())
    }

    /// Number of keys registered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read `key`, running its supplier if this is the first read.
    ///
    /// Returns `Ok(None)` for keys this container does not support or whose
    /// supplier produced no value. Supplier failures are returned as errors,
    /// both on the first read and on every read after it.
    pub fn get_value<T: 'static>(&self, key: &Key<T>) -> Result<Option<&T>> {
        Ok(self
            .resolve(key.id())?
            .and_then(|value| value.downcast_ref::<T>()))
    }

    /// Read a key the caller knows is present.
    ///
    /// Absence is reported loudly as [`ContainerError::Missing`], which a
    /// supplier can propagate with `?`.
    pub fn get_required<T: 'static>(&self, key: &Key<T>) -> Result<&T> {
        self.get_value(key)?
            .ok_or(ContainerError::Missing { key: key.name() })
    }

    fn resolve(&self, id: KeyId) -> Result<Option<&(dyn Any + 'static)>> {
        let Some(entry) = self.entries.get(&id) else {
            return Ok(None);
        };
        if let Some(value) = entry.value.get() {
            return Ok(value.as_deref());
        }

        // The borrow must end before the supplier runs: it may read other keys.
        let thunk = {
            let mut state = entry.state.borrow_mut();
            match std::mem::replace(&mut *state, State::Evaluating) {
                State::Pending(thunk) => thunk,
                State::Evaluating => return Err(ContainerError::Cycle { key: id.name() }),
                State::Failed(message) => {
                    *state = State::Failed(message.clone());
                    return Err(ContainerError::SupplierFailed {
                        key: id.name(),
                        message,
                    });
                }
                State::Ready => {
                    *state = State::Ready;
                    return Ok(entry.resolved());
                }
            }
        };

        match thunk(self) {
            Ok(value) => {
                *entry.state.borrow_mut() = State::Ready;
                let _ = entry.value.set(value);
                Ok(entry.resolved())
            }
            Err(source) => {
                *entry.state.borrow_mut() = State::Failed(source.to_string());
                Err(ContainerError::Supplier {
                    key: id.name(),
                    source,
                })
            }
        }
    }
}

impl fmt::Debug for DataContainer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.entries.keys().map(KeyId::name).collect();
        keys.sort_unstable();
        f.debug_struct("DataContainer").field("keys", &keys).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use assert_matches::assert_matches;

    use super::*;
    use crate::container::PlaceholderKey;

    static SESSIONS: Key<Vec<i64>> = Key::new("sessions");
    static LAST_SEEN: Key<i64> = Key::new("last_seen");
    static SESSION_COUNT: Key<usize> = Key::new("session_count");
    static NAME: PlaceholderKey<String> = PlaceholderKey::new("player_name");
    static NICKNAME: Key<String> = Key::new("nickname");

    #[test]
    fn raw_data_round_trips() {
        let mut container = DataContainer::new();
        container.put_raw_data(&NAME, "Notch".to_string());
        assert_eq!(
            container.get_value(&NAME).unwrap().map(String::as_str),
            Some("Notch")
        );
    }

    #[test]
    fn unsupported_key_is_absent() {
        let container = DataContainer::new();
        assert!(container.get_value(&LAST_SEEN).unwrap().is_none());
        assert!(!container.supports(&LAST_SEEN));
    }

    #[test]
    fn get_required_reports_missing_key() {
        let container = DataContainer::new();
        assert_matches!(
            container.get_required(&LAST_SEEN),
            Err(ContainerError::Missing { key: "last_seen" })
        );
    }

    #[test]
    fn supplier_runs_once_across_reads() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut container = DataContainer::new();
        container.put_supplier(&SESSIONS, move |_| {
            counter.set(counter.get() + 1);
            Ok(vec![10, 30, 20])
        });

        for _ in 0..5 {
            assert_eq!(container.get_value(&SESSIONS).unwrap().unwrap().len(), 3);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn shared_upstream_is_computed_once() {
        let loads = Rc::new(Cell::new(0));
        let counter = loads.clone();
        let mut container = DataContainer::new();
        container.put_supplier(&SESSIONS, move |_| {
            counter.set(counter.get() + 1);
            Ok(vec![100, 400, 250])
        });
        container.put_optional_supplier(&LAST_SEEN, |c| {
            Ok(c.get_required(&SESSIONS)?.iter().copied().max())
        });
        container.put_supplier(&SESSION_COUNT, |c| Ok(c.get_required(&SESSIONS)?.len()));

        assert_eq!(container.get_value(&LAST_SEEN).unwrap(), Some(&400));
        assert_eq!(container.get_value(&LAST_SEEN).unwrap(), Some(&400));
        assert_eq!(container.get_value(&SESSION_COUNT).unwrap(), Some(&3));
        assert_eq!(loads.get(), 1);
    }

    #[test]
    fn optional_supplier_can_produce_absence() {
        let mut container = DataContainer::new();
        container.put_raw_data(&SESSIONS, Vec::new());
        container.put_optional_supplier(&LAST_SEEN, |c| {
            Ok(c.get_required(&SESSIONS)?.iter().copied().max())
        });
        assert!(container.supports(&LAST_SEEN));
        assert!(container.get_value(&LAST_SEEN).unwrap().is_none());
    }

    #[test]
    fn raw_data_replaces_supplier() {
        let mut container = DataContainer::new();
        container.put_supplier(&LAST_SEEN, |_| Err("must not run".into()));
        container.put_raw_data(&LAST_SEEN, 7);
        assert_eq!(container.get_value(&LAST_SEEN).unwrap(), Some(&7));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn failing_supplier_is_not_retried() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut container = DataContainer::new();
        container.put_supplier(&NICKNAME, move |_| {
            counter.set(counter.get() + 1);
            Err("nickname table missing".into())
        });

        assert_matches!(
            container.get_value(&NICKNAME),
            Err(ContainerError::Supplier { key: "nickname", .. })
        );
        assert_matches!(
            container.get_value(&NICKNAME),
            Err(ContainerError::SupplierFailed { key: "nickname", ref message })
                if message == "nickname table missing"
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn missing_upstream_propagates_through_derived_key() {
        let mut container = DataContainer::new();
        container.put_supplier(&SESSION_COUNT, |c| Ok(c.get_required(&SESSIONS)?.len()));
        let err = container.get_value(&SESSION_COUNT).unwrap_err();
        assert_eq!(err.key(), "session_count");
        assert!(err.to_string().contains("sessions"));
    }

    #[test]
    fn self_dependency_is_reported_as_cycle() {
        let mut container = DataContainer::new();
        container.put_supplier(&LAST_SEEN, |c| Ok(*c.get_required(&LAST_SEEN)? + 1));
        let err = container.get_value(&LAST_SEEN).unwrap_err();
        assert!(err.to_string().contains("depends on itself"));
    }

    #[test]
    fn keys_with_same_name_but_different_types_do_not_alias() {
        let as_string: Key<String> = Key::new("last_seen");
        let mut container = DataContainer::new();
        container.put_raw_data(&LAST_SEEN, 5);
        container.put_raw_data(&as_string, "yesterday".to_string());
        assert_eq!(container.get_value(&LAST_SEEN).unwrap(), Some(&5));
        assert_eq!(
            container.get_value(&as_string).unwrap().map(String::as_str),
            Some("yesterday")
        );
    }

    #[test]
    fn suppliers_may_borrow_from_enclosing_scope() {
        let source = vec![3_i64, 9, 4];
        let mut container = DataContainer::new();
        container.put_supplier(&SESSIONS, |_| Ok(source.clone()));
        container.put_optional_supplier(&LAST_SEEN, |_| Ok(source.iter().copied().max()));
        assert_eq!(container.get_value(&LAST_SEEN).unwrap(), Some(&9));
    }
}
