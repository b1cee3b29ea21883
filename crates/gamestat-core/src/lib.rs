//! # gamestat-core
//!
//! Foundation types shared by every gamestat crate:
//!
//! - **Keys**: [`Key<T>`] and [`PlaceholderKey<T>`], process-wide typed identifiers
//! - **Containers**: [`DataContainer`], a per-request map from keys to eager
//!   values or memoized suppliers
//! - **Errors**: [`ContainerError`] for failed or missing container reads
//! - **Logging**: [`logging::init`] installs the `tracing` subscriber

#![deny(unsafe_code)]

pub mod container;
pub mod errors;
pub mod logging;

pub use container::{BoxError, DataContainer, Key, KeyId, PlaceholderKey};
pub use errors::{ContainerError, Result};
