//! Shared precondition checks for service operations.

use vellum_core::error::CoreError;
use vellum_db::models::commit::Commit;
use vellum_db::models::project::Project;

/// A commit belonging to a different project does not exist from this
/// project's perspective.
pub(crate) fn ensure_in_project(project: &Project, commit: &Commit) -> Result<(), CoreError> {
    if commit.project_id == project.id {
        Ok(())
    } else {
        Err(CoreError::not_found("Commit", commit.id))
    }
}

/// Mutations are only valid against drafts.
pub(crate) fn ensure_draft(commit: &Commit) -> Result<(), CoreError> {
    if commit.is_draft() {
        Ok(())
    } else {
        Err(CoreError::InvalidState(format!(
            "commit {} is already merged and cannot be modified",
            commit.id
        )))
    }
}
