//! Project models and DTOs.
//!
//! A project owns an ordered set of commits. Only the identity fields the
//! versioning engine needs are modelled here; workspace membership exists
//! so the merge notification can carry it.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vellum_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A project row from the `projects` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Project {
    pub id: DbId,
    pub workspace_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for creating a new project.
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub workspace_id: DbId,
    pub name: String,
    pub description: Option<String>,
}
