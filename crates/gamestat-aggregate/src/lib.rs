//! # gamestat-aggregate
//!
//! Composite views over the store, built on [`DataContainer`]:
//!
//! - [`keys`]: one key registry per container kind
//! - [`analysis`]: pure functions over sessions, TPS and ping samples
//! - [`session_facts`]: derived session facts wired onto any container
//! - [`player_container`], [`per_server_container`], [`server_container`]
//!
//! Containers are lazy. Building one runs no query; each key's supplier
//! queries the [`Database`](gamestat_store::Database) on first read and keeps
//! the result for the container's lifetime.
//!
//! [`DataContainer`]: gamestat_core::DataContainer

#![deny(unsafe_code)]

pub mod analysis;
pub mod keys;
pub mod player;
pub mod server;
pub mod session_facts;

pub use player::{per_server_container, player_container};
pub use server::server_container;
pub use session_facts::SessionFacts;
