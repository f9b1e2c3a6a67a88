//! Materialization: the full set of live documents visible at a commit.
//!
//! For a merged commit the visible history is every commit merged at or
//! before it; for a draft it is the project's entire merged history plus
//! the draft's own rows, which take precedence. Scanning newest to
//! oldest, the first row per document wins; a winning tombstone means the
//! document is absent. Merged reads are pure functions of immutable data,
//! so their results never change between calls.

use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;
use vellum_core::error::CoreError;
use vellum_db::models::commit::Commit;
use vellum_db::models::document_version::DocumentVersion;
use vellum_db::models::project::Project;
use vellum_db::repositories::{CommitScope, DocumentVersionRepo};

use crate::error::VersioningResult;
use crate::guards::ensure_in_project;

/// The resolution scope for a commit, draft or merged.
pub(crate) fn scope_for(commit: &Commit) -> CommitScope {
    match commit.merged_at {
        Some(at) => CommitScope::merged(at),
        None => CommitScope::draft(commit.id),
    }
}

/// All live documents visible at `commit`, keyed by document uuid.
///
/// Tombstoned documents are omitted; a document with no row at or before
/// the commit simply does not appear.
pub async fn documents_at_commit(
    pool: &PgPool,
    project: &Project,
    commit: &Commit,
) -> VersioningResult<BTreeMap<Uuid, DocumentVersion>> {
    ensure_in_project(project, commit)?;

    let rows =
        DocumentVersionRepo::resolve_at_commit(pool, project.id, scope_for(commit)).await?;
    let documents: BTreeMap<Uuid, DocumentVersion> = rows
        .into_iter()
        .filter(|row| !row.is_tombstone())
        .map(|row| (row.document_uuid, row))
        .collect();

    tracing::debug!(
        project_id = project.id,
        commit_id = commit.id,
        count = documents.len(),
        "Materialized documents at commit"
    );

    Ok(documents)
}

/// The live version of one document at `commit`.
///
/// Returns `NotFound` when the document has no row at or before the
/// commit, or when its newest visible row is a tombstone.
pub async fn document_at_commit(
    pool: &PgPool,
    project: &Project,
    commit: &Commit,
    document_uuid: Uuid,
) -> VersioningResult<DocumentVersion> {
    ensure_in_project(project, commit)?;

    let row = DocumentVersionRepo::resolve_document_at_commit(
        pool,
        project.id,
        scope_for(commit),
        document_uuid,
    )
    .await?;

    match row {
        Some(version) if !version.is_tombstone() => Ok(version),
        _ => Err(CoreError::not_found("Document", document_uuid).into()),
    }
}

/// The live document at `path` at `commit`.
///
/// Paths are unique among live documents at any one commit, so at most
/// one document can match.
pub async fn document_at_commit_by_path(
    pool: &PgPool,
    project: &Project,
    commit: &Commit,
    path: &str,
) -> VersioningResult<DocumentVersion> {
    let documents = documents_at_commit(pool, project, commit).await?;
    documents
        .into_values()
        .find(|version| version.path == path)
        .ok_or_else(|| CoreError::not_found("Document", path).into())
}
