//! Pure domain logic for the Vellum versioning engine.
//!
//! This crate has no database dependency so it can be used by the
//! repository/service layer and any future CLI or worker tooling alike.
//! It provides the shared id/timestamp types, the error taxonomy, content
//! hashing, document path and commit metadata validation, pagination
//! clamps, and the snapshot diff algorithm.

pub mod commits;
pub mod diff;
pub mod error;
pub mod hashing;
pub mod pagination;
pub mod paths;
pub mod types;
