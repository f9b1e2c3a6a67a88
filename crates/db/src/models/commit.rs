//! Commit models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use vellum_core::commits::CommitStatus;
use vellum_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A commit row from the `commits` table.
///
/// `merged_at` unset means the commit is a mutable draft; once set it is
/// never changed or cleared, and the row (plus its document versions) is
/// permanently immutable. Merged commits within a project are strictly
/// ordered by `merged_at`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Commit {
    pub id: DbId,
    pub uuid: Uuid,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub main_document_uuid: Option<Uuid>,
    pub merged_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Commit {
    /// Whether this commit is still a mutable draft.
    pub fn is_draft(&self) -> bool {
        self.merged_at.is_none()
    }

    /// The commit's lifecycle status.
    pub fn status(&self) -> CommitStatus {
        if self.is_draft() {
            CommitStatus::Draft
        } else {
            CommitStatus::Merged
        }
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for creating a new draft commit.
#[derive(Debug, Deserialize)]
pub struct CreateCommit {
    pub title: String,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Input for updating a draft commit (all fields optional).
///
/// `main_document_uuid` is double-optional so a patch can distinguish
/// "leave as is" (`None`) from "clear it" (`Some(None)`).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCommit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub main_document_uuid: Option<Option<Uuid>>,
}
