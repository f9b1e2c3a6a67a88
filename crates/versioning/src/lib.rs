//! Service layer of the Vellum versioning engine.
//!
//! Composes the pure logic in `vellum-core` with the storage layer in
//! `vellum-db` to provide the engine's public operations:
//!
//! - [`materializer`] — the set of live documents visible at any commit
//! - [`documents`]    — create/update/rename/delete inside a draft
//! - [`diff`]         — changes between two points in history
//! - [`history`]      — change previews, revert, and reset
//! - [`merge`]        — atomically freeze a draft into ordered history
//!
//! Callers pass already-authenticated project/commit/document identifiers;
//! authorization is entirely the caller's responsibility.

pub mod diff;
pub mod documents;
pub mod error;
mod guards;
pub mod history;
pub mod materializer;
pub mod merge;

pub use error::{VersioningError, VersioningResult};
