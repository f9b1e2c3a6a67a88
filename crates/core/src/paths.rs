//! Document path validation.
//!
//! Documents are addressed by slash-separated paths, like files in a
//! repository: `marketing/onboarding/welcome`. A path identifies a
//! document only among the *live* documents at one commit; the stable
//! identity across renames is the document uuid.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length for a document path in characters.
pub const MAX_DOCUMENT_PATH_LENGTH: usize = 500;

/// Regex pattern a document path must match: one or more slash-separated
/// segments of letters, digits, `.`, `-`, and `_`. No leading or trailing
/// slash, no empty segments.
pub const DOCUMENT_PATH_PATTERN: &str = r"^[a-zA-Z0-9_.-]+(?:/[a-zA-Z0-9_.-]+)*$";

/// Compiled path regex. Compiled once, reused forever.
static DOCUMENT_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DOCUMENT_PATH_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a document path: non-empty, within [`MAX_DOCUMENT_PATH_LENGTH`],
/// and matching [`DOCUMENT_PATH_PATTERN`].
pub fn validate_document_path(path: &str) -> Result<(), CoreError> {
    if path.is_empty() {
        return Err(CoreError::Validation(
            "Document path must not be empty".to_string(),
        ));
    }
    if path.len() > MAX_DOCUMENT_PATH_LENGTH {
        return Err(CoreError::Validation(format!(
            "Document path must not exceed {MAX_DOCUMENT_PATH_LENGTH} characters, got {}",
            path.len()
        )));
    }
    if !DOCUMENT_PATH_RE.is_match(path) {
        return Err(CoreError::Validation(format!(
            "Document path '{path}' is invalid: use slash-separated segments \
             of letters, digits, '.', '-' and '_', with no leading or \
             trailing slash"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_single_segment() {
        assert!(validate_document_path("welcome").is_ok());
    }

    #[test]
    fn valid_nested_path() {
        assert!(validate_document_path("marketing/onboarding/welcome-v2").is_ok());
    }

    #[test]
    fn valid_path_with_dots_and_underscores() {
        assert!(validate_document_path("agents/v1.2/system_prompt").is_ok());
    }

    #[test]
    fn valid_path_at_max_length() {
        let path = "a".repeat(MAX_DOCUMENT_PATH_LENGTH);
        assert!(validate_document_path(&path).is_ok());
    }

    #[test]
    fn rejects_empty_path() {
        assert!(validate_document_path("").is_err());
    }

    #[test]
    fn rejects_leading_slash() {
        assert!(validate_document_path("/welcome").is_err());
    }

    #[test]
    fn rejects_trailing_slash() {
        assert!(validate_document_path("welcome/").is_err());
    }

    #[test]
    fn rejects_empty_segment() {
        assert!(validate_document_path("marketing//welcome").is_err());
    }

    #[test]
    fn rejects_whitespace() {
        assert!(validate_document_path("my prompt").is_err());
        assert!(validate_document_path(" welcome").is_err());
    }

    #[test]
    fn rejects_path_exceeding_max() {
        let path = "a".repeat(MAX_DOCUMENT_PATH_LENGTH + 1);
        assert!(validate_document_path(&path).is_err());
    }
}
