//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers check database availability, validate input, delegate to the
//! corresponding repository in `portfolio_db`, and map errors via
//! [`AppError`](crate::error::AppError).

pub mod project;
