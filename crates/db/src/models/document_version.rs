//! Document version models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use vellum_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `document_versions` table: one immutable revision of a
/// document, scoped to the commit that introduced it.
///
/// `document_uuid` is the document's stable identity across its lifetime;
/// `id`/`commit_id` identify this concrete revision. A row with
/// `deleted_at` set is a tombstone: the document counts as deleted from
/// that commit forward until a later non-tombstone row reintroduces it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DocumentVersion {
    pub id: DbId,
    pub commit_id: DbId,
    pub document_uuid: Uuid,
    pub path: String,
    pub content: String,
    pub content_hash: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DocumentVersion {
    /// Whether this row marks the document as deleted.
    pub fn is_tombstone(&self) -> bool {
        self.deleted_at.is_some()
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for inserting a new document version row.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentVersion {
    pub document_uuid: Uuid,
    pub path: String,
    pub content: String,
    pub content_hash: String,
}
