//! Domain error taxonomy shared by every layer above `vellum-core`.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity that the caller referenced does not exist (or is not
    /// visible at the commit the caller is looking at).
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input failed a validation rule (bad path shape, empty title,
    /// dangling main document reference).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation would collide with existing state (duplicate live
    /// path, concurrent-merge ordering collision).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A mutation was attempted against a commit in the wrong state,
    /// e.g. writing to or re-merging an already-merged commit.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An invariant the engine relies on was observed broken.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] with any displayable id.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
