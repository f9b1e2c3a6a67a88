//! Pagination defaults and clamps for list queries.
//!
//! Lives in `core` (zero internal deps) so the repository layer and any
//! future tooling share one set of limits.

/// Default number of commits per listing page.
pub const DEFAULT_LIST_LIMIT: i64 = 25;

/// Maximum number of commits per listing page.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Clamp an optional caller-supplied limit into `[1, max]`, falling back
/// to `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp an optional caller-supplied offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
