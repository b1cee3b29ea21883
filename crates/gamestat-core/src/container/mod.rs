//! Typed key/value model with lazily evaluated, memoized entries.

pub mod data_container;
pub mod key;

pub use data_container::{BoxError, DataContainer};
pub use key::{Key, KeyId, PlaceholderKey};
