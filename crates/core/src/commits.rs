//! Commit status and metadata validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum allowed length for a commit title.
pub const MAX_COMMIT_TITLE_LENGTH: usize = 200;

/// Maximum allowed length for a commit description.
pub const MAX_COMMIT_DESCRIPTION_LENGTH: usize = 1_000;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// The lifecycle state of a commit.
///
/// - `Draft`  -- mutable working version, `merged_at` unset.
/// - `Merged` -- permanently frozen point in project history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStatus {
    Draft,
    Merged,
}

impl CommitStatus {
    /// String representation for display, logging, and query filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Merged => "merged",
        }
    }
}

impl std::fmt::Display for CommitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a commit title: must be non-empty, trimmed, and within
/// [`MAX_COMMIT_TITLE_LENGTH`].
pub fn validate_commit_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Commit title must not be empty".to_string(),
        ));
    }
    if trimmed.len() != title.len() {
        return Err(CoreError::Validation(
            "Commit title must not have leading or trailing whitespace".to_string(),
        ));
    }
    if title.len() > MAX_COMMIT_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Commit title must not exceed {MAX_COMMIT_TITLE_LENGTH} characters, got {}",
            title.len()
        )));
    }
    Ok(())
}

/// Validate a commit description: length check only (can be empty).
pub fn validate_commit_description(description: &str) -> Result<(), CoreError> {
    if description.len() > MAX_COMMIT_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Commit description must not exceed {MAX_COMMIT_DESCRIPTION_LENGTH} characters, got {}",
            description.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- CommitStatus --------------------------------------------------------

    #[test]
    fn as_str_returns_correct_strings() {
        assert_eq!(CommitStatus::Draft.as_str(), "draft");
        assert_eq!(CommitStatus::Merged.as_str(), "merged");
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", CommitStatus::Draft), "draft");
        assert_eq!(format!("{}", CommitStatus::Merged), "merged");
    }

    #[test]
    fn serde_roundtrip() {
        let status = CommitStatus::Merged;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"merged\"");
        let parsed: CommitStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }

    // -- validate_commit_title -----------------------------------------------

    #[test]
    fn valid_short_title() {
        assert!(validate_commit_title("Initial version").is_ok());
    }

    #[test]
    fn valid_title_at_max_length() {
        let title = "a".repeat(MAX_COMMIT_TITLE_LENGTH);
        assert!(validate_commit_title(&title).is_ok());
    }

    #[test]
    fn rejects_empty_title() {
        assert!(validate_commit_title("").is_err());
    }

    #[test]
    fn rejects_whitespace_only_title() {
        assert!(validate_commit_title("   ").is_err());
    }

    #[test]
    fn rejects_leading_whitespace() {
        assert!(validate_commit_title(" draft").is_err());
    }

    #[test]
    fn rejects_title_exceeding_max() {
        let title = "a".repeat(MAX_COMMIT_TITLE_LENGTH + 1);
        assert!(validate_commit_title(&title).is_err());
    }

    // -- validate_commit_description -----------------------------------------

    #[test]
    fn empty_description_is_valid() {
        assert!(validate_commit_description("").is_ok());
    }

    #[test]
    fn rejects_description_exceeding_max() {
        let description = "a".repeat(MAX_COMMIT_DESCRIPTION_LENGTH + 1);
        assert!(validate_commit_description(&description).is_err());
    }
}
