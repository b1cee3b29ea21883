//! `SQLite` connection plumbing.

pub mod connection;
