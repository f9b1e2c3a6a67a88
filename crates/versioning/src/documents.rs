//! Draft document write operations.
//!
//! Every mutation inserts a fresh `document_versions` row into the draft;
//! nothing is updated in place. These operations are the write-side
//! guard for the engine's integrity rules: draft-only mutation, valid
//! path shape, and path uniqueness among the live documents of the draft.
//! Concurrent writes to the same document within one draft race on
//! last-insert-wins; callers that need stricter ordering serialize
//! themselves.

use sqlx::PgPool;
use uuid::Uuid;
use vellum_core::error::CoreError;
use vellum_core::hashing::content_hash;
use vellum_core::paths::validate_document_path;
use vellum_db::models::commit::Commit;
use vellum_db::models::document_version::{CreateDocumentVersion, DocumentVersion};
use vellum_db::models::project::Project;
use vellum_db::repositories::DocumentVersionRepo;

use crate::error::VersioningResult;
use crate::guards::{ensure_draft, ensure_in_project};
use crate::materializer;

/// Create a new document in the draft, assigning it a fresh uuid.
///
/// Fails with `Conflict` when another live document in the draft already
/// occupies `path`.
pub async fn create_document(
    pool: &PgPool,
    project: &Project,
    draft: &Commit,
    path: &str,
    content: &str,
) -> VersioningResult<DocumentVersion> {
    ensure_in_project(project, draft)?;
    ensure_draft(draft)?;
    validate_document_path(path)?;
    ensure_path_free(pool, project, draft, path, None).await?;

    let version = DocumentVersionRepo::insert(
        pool,
        draft.id,
        &CreateDocumentVersion {
            document_uuid: Uuid::new_v4(),
            path: path.to_string(),
            content: content.to_string(),
            content_hash: content_hash(content),
        },
    )
    .await?;

    tracing::info!(
        commit_id = draft.id,
        document_uuid = %version.document_uuid,
        path,
        "Document created in draft"
    );

    Ok(version)
}

/// Supersede a document's content in the draft, keeping its current path.
pub async fn update_document(
    pool: &PgPool,
    project: &Project,
    draft: &Commit,
    document_uuid: Uuid,
    content: &str,
) -> VersioningResult<DocumentVersion> {
    ensure_in_project(project, draft)?;
    ensure_draft(draft)?;

    let current = materializer::document_at_commit(pool, project, draft, document_uuid).await?;

    let version = DocumentVersionRepo::insert(
        pool,
        draft.id,
        &CreateDocumentVersion {
            document_uuid,
            path: current.path.clone(),
            content: content.to_string(),
            content_hash: content_hash(content),
        },
    )
    .await?;

    tracing::info!(
        commit_id = draft.id,
        document_uuid = %document_uuid,
        "Document updated in draft"
    );

    Ok(version)
}

/// Move a document to a new path, keeping its content.
///
/// Renaming to the current path is a no-op and returns the live version
/// unchanged.
pub async fn rename_document(
    pool: &PgPool,
    project: &Project,
    draft: &Commit,
    document_uuid: Uuid,
    new_path: &str,
) -> VersioningResult<DocumentVersion> {
    ensure_in_project(project, draft)?;
    ensure_draft(draft)?;
    validate_document_path(new_path)?;

    let current = materializer::document_at_commit(pool, project, draft, document_uuid).await?;
    if current.path == new_path {
        return Ok(current);
    }
    ensure_path_free(pool, project, draft, new_path, Some(document_uuid)).await?;

    let version = DocumentVersionRepo::insert(
        pool,
        draft.id,
        &CreateDocumentVersion {
            document_uuid,
            path: new_path.to_string(),
            content: current.content.clone(),
            content_hash: content_hash(&current.content),
        },
    )
    .await?;

    tracing::info!(
        commit_id = draft.id,
        document_uuid = %document_uuid,
        from = %current.path,
        to = new_path,
        "Document renamed in draft"
    );

    Ok(version)
}

/// Delete a document from the draft by inserting a tombstone row.
///
/// Fails with `NotFound` when the document is not live at the draft.
pub async fn delete_document(
    pool: &PgPool,
    project: &Project,
    draft: &Commit,
    document_uuid: Uuid,
) -> VersioningResult<DocumentVersion> {
    ensure_in_project(project, draft)?;
    ensure_draft(draft)?;

    let current = materializer::document_at_commit(pool, project, draft, document_uuid).await?;

    let tombstone =
        DocumentVersionRepo::insert_tombstone(pool, draft.id, document_uuid, &current.path)
            .await?;

    tracing::info!(
        commit_id = draft.id,
        document_uuid = %document_uuid,
        path = %current.path,
        "Document deleted in draft"
    );

    Ok(tombstone)
}

/// Reject a write that would give two live documents the same path.
async fn ensure_path_free(
    pool: &PgPool,
    project: &Project,
    draft: &Commit,
    path: &str,
    exclude: Option<Uuid>,
) -> VersioningResult<()> {
    let documents = materializer::documents_at_commit(pool, project, draft).await?;
    let taken = documents
        .values()
        .any(|version| version.path == path && Some(version.document_uuid) != exclude);
    if taken {
        return Err(CoreError::Conflict(format!(
            "a live document already exists at path '{path}'"
        ))
        .into());
    }
    Ok(())
}
