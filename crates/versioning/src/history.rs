//! History operations: change previews, revert, and reset.
//!
//! Revert replays a historical diff onto a draft; reset forces a draft to
//! exactly match a historical snapshot. Both apply row-by-row through the
//! document version store. They are not atomic at this layer: a failure
//! mid-apply leaves the draft with whatever the last successful row write
//! produced, and callers needing all-or-nothing wrap the call in their own
//! transaction. Merge re-validates path uniqueness regardless.

use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;
use vellum_core::diff::{diff_snapshots, ChangeType, DocumentChange, SnapshotEntry};
use vellum_core::error::CoreError;
use vellum_core::hashing::content_hash;
use vellum_db::models::commit::Commit;
use vellum_db::models::document_version::{CreateDocumentVersion, DocumentVersion};
use vellum_db::models::project::Project;
use vellum_db::repositories::{CommitRepo, DocumentVersionRepo};

use crate::diff::{diff, to_snapshot};
use crate::error::VersioningResult;
use crate::guards::{ensure_draft, ensure_in_project};
use crate::materializer::{self, scope_for};

// ---------------------------------------------------------------------------
// Previews
// ---------------------------------------------------------------------------

/// The changes `target` introduces relative to `baseline`, without
/// mutating anything.
pub async fn get_changes(
    pool: &PgPool,
    project: &Project,
    target: &Commit,
    baseline: &Commit,
) -> VersioningResult<Vec<DocumentChange>> {
    diff(pool, project, baseline, target).await
}

/// The changes `target` introduces relative to its implicit baseline: the
/// merged commit immediately preceding it (for a draft, the current head).
/// The first commit of a project diffs against an empty snapshot.
pub async fn get_commit_changes(
    pool: &PgPool,
    project: &Project,
    target: &Commit,
) -> VersioningResult<Vec<DocumentChange>> {
    ensure_in_project(project, target)?;

    let baseline = match target.merged_at {
        Some(merged_at) => CommitRepo::previous_merged(pool, project.id, merged_at).await?,
        None => CommitRepo::head(pool, project.id).await?,
    };

    match baseline {
        Some(baseline) => diff(pool, project, &baseline, target).await,
        None => {
            let target_documents =
                materializer::documents_at_commit(pool, project, target).await?;
            Ok(diff_snapshots(&BTreeMap::new(), &to_snapshot(&target_documents)))
        }
    }
}

// ---------------------------------------------------------------------------
// Revert
// ---------------------------------------------------------------------------

/// Replay `diff(baseline, target)` onto `draft`.
///
/// The draft's pre-existing state for each touched document is
/// unconditionally overwritten by the target side (last-writer-wins from
/// the target; this is deliberately not a three-way merge). Deleting a
/// document the draft no longer has is a no-op. Returns the replayed
/// changes; an empty diff leaves the draft untouched.
pub async fn revert(
    pool: &PgPool,
    project: &Project,
    draft: &Commit,
    target: &Commit,
    baseline: &Commit,
) -> VersioningResult<Vec<DocumentChange>> {
    ensure_in_project(project, draft)?;
    ensure_draft(draft)?;

    let baseline_documents = materializer::documents_at_commit(pool, project, baseline).await?;
    let target_documents = materializer::documents_at_commit(pool, project, target).await?;
    let target_snapshot = to_snapshot(&target_documents);

    let changes = diff_snapshots(&to_snapshot(&baseline_documents), &target_snapshot);
    if changes.is_empty() {
        return Ok(changes);
    }

    let draft_documents = materializer::documents_at_commit(pool, project, draft).await?;
    let applied =
        apply_changes(pool, draft, &draft_documents, &target_snapshot, &changes).await?;

    tracing::info!(
        project_id = project.id,
        draft_id = draft.id,
        target_id = target.id,
        baseline_id = baseline.id,
        applied,
        "Reverted draft to historical diff"
    );

    Ok(changes)
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

/// Force `draft`'s materialized state to exactly equal `target`'s.
///
/// Documents present only in the draft are deleted, differing documents
/// are overwritten, and documents missing from the draft are created.
/// Immediately afterwards `diff(target, draft)` is empty.
pub async fn reset_to_commit(
    pool: &PgPool,
    project: &Project,
    draft: &Commit,
    target: &Commit,
) -> VersioningResult<Vec<DocumentChange>> {
    ensure_in_project(project, draft)?;
    ensure_draft(draft)?;

    let draft_documents = materializer::documents_at_commit(pool, project, draft).await?;
    let target_documents = materializer::documents_at_commit(pool, project, target).await?;
    let target_snapshot = to_snapshot(&target_documents);

    let changes = diff_snapshots(&to_snapshot(&draft_documents), &target_snapshot);
    let applied =
        apply_changes(pool, draft, &draft_documents, &target_snapshot, &changes).await?;

    tracing::info!(
        project_id = project.id,
        draft_id = draft.id,
        target_id = target.id,
        applied,
        "Reset draft to historical snapshot"
    );

    Ok(changes)
}

/// Single-document reset: make one document's state in `draft` exactly
/// match its state at `target`.
///
/// A document live at neither end is `NotFound`. A document absent from
/// `target` is tombstoned in the draft; one absent from the draft is
/// recreated. Returns the resulting draft row (tombstone included), or
/// the current live row when nothing differed.
pub async fn reset_document_to_version(
    pool: &PgPool,
    project: &Project,
    draft: &Commit,
    document_uuid: Uuid,
    target: &Commit,
) -> VersioningResult<DocumentVersion> {
    ensure_in_project(project, draft)?;
    ensure_in_project(project, target)?;
    ensure_draft(draft)?;

    let draft_row = DocumentVersionRepo::resolve_document_at_commit(
        pool,
        project.id,
        scope_for(draft),
        document_uuid,
    )
    .await?
    .filter(|row| !row.is_tombstone());
    let target_row = DocumentVersionRepo::resolve_document_at_commit(
        pool,
        project.id,
        scope_for(target),
        document_uuid,
    )
    .await?
    .filter(|row| !row.is_tombstone());

    match (draft_row, target_row) {
        (None, None) => Err(CoreError::not_found("Document", document_uuid).into()),
        (Some(current), None) => {
            let tombstone = DocumentVersionRepo::insert_tombstone(
                pool,
                draft.id,
                document_uuid,
                &current.path,
            )
            .await?;
            tracing::info!(
                draft_id = draft.id,
                document_uuid = %document_uuid,
                target_id = target.id,
                "Reset document: deleted to match target"
            );
            Ok(tombstone)
        }
        (current, Some(wanted)) => {
            if let Some(ref current) = current {
                if current.path == wanted.path && current.content_hash == wanted.content_hash {
                    return Ok(current.clone());
                }
            }
            // Restoring an old path must not collide with another live
            // document in the draft.
            let live = materializer::documents_at_commit(pool, project, draft).await?;
            let taken = live.values().any(|version| {
                version.path == wanted.path && version.document_uuid != document_uuid
            });
            if taken {
                return Err(CoreError::Conflict(format!(
                    "a live document already exists at path '{}'",
                    wanted.path
                ))
                .into());
            }

            let version = DocumentVersionRepo::insert(
                pool,
                draft.id,
                &CreateDocumentVersion {
                    document_uuid,
                    path: wanted.path.clone(),
                    content: wanted.content.clone(),
                    content_hash: content_hash(&wanted.content),
                },
            )
            .await?;
            tracing::info!(
                draft_id = draft.id,
                document_uuid = %document_uuid,
                target_id = target.id,
                "Reset document to historical version"
            );
            Ok(version)
        }
    }
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Write a computed change set onto a draft, row by row.
///
/// Additions, modifications, and renames supersede with the target side's
/// path and content; deletions tombstone documents still live in the
/// draft and skip the rest. Returns the number of rows written.
async fn apply_changes(
    pool: &PgPool,
    draft: &Commit,
    draft_documents: &BTreeMap<Uuid, DocumentVersion>,
    target_snapshot: &BTreeMap<Uuid, SnapshotEntry>,
    changes: &[DocumentChange],
) -> VersioningResult<usize> {
    let mut applied = 0;
    for change in changes {
        match change.change_type {
            ChangeType::Added | ChangeType::Modified | ChangeType::Renamed => {
                let entry = target_snapshot.get(&change.document_uuid).ok_or_else(|| {
                    CoreError::Internal(format!(
                        "change for document {} has no target snapshot entry",
                        change.document_uuid
                    ))
                })?;
                DocumentVersionRepo::insert(
                    pool,
                    draft.id,
                    &CreateDocumentVersion {
                        document_uuid: change.document_uuid,
                        path: entry.path.clone(),
                        content: entry.content.clone(),
                        content_hash: content_hash(&entry.content),
                    },
                )
                .await?;
                applied += 1;
            }
            ChangeType::Deleted => {
                if let Some(current) = draft_documents.get(&change.document_uuid) {
                    DocumentVersionRepo::insert_tombstone(
                        pool,
                        draft.id,
                        change.document_uuid,
                        &current.path,
                    )
                    .await?;
                    applied += 1;
                }
            }
        }
    }
    Ok(applied)
}
