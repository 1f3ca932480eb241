//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods that
//! accept the [`ConnectionManager`](crate::ConnectionManager) as the first
//! argument. Every method acquires one connection, performs one round-trip,
//! and releases the connection on return.

pub mod project_repo;

pub use project_repo::{ProjectOrder, ProjectRepo};
