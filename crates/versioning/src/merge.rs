//! Merge coordination: atomically freeze a draft into ordered history.
//!
//! Merges for one project are serialized by a transaction-scoped advisory
//! lock, so re-validation, duplicate-path checking, and the monotonic
//! `merged_at` computation all observe the latest committed history and
//! cannot interleave with a competing merge. Everything runs in one
//! transaction: on any failure the rollback leaves the draft untouched,
//! and a partial merge is never observable. The `commit.merged` event is
//! published only after the transaction commits.

use std::collections::HashMap;

use sqlx::PgPool;
use vellum_core::error::CoreError;
use vellum_core::types::DbId;
use vellum_db::models::commit::Commit;
use vellum_db::models::project::Project;
use vellum_db::repositories::{CommitRepo, CommitScope, DocumentVersionRepo};
use vellum_events::{EventBus, PlatformEvent};

use crate::error::{VersioningError, VersioningResult};
use crate::guards::{ensure_draft, ensure_in_project};

/// Namespace xor-ed with the project id to form the advisory lock key,
/// so merge locks cannot collide with other advisory locks in the same
/// database.
const MERGE_LOCK_NAMESPACE: i64 = 764_532_891;

/// Merge a draft commit into the project's permanent history.
///
/// Inside one per-project serialized transaction: re-validates the draft
/// is still a draft, materializes it, rejects duplicate live paths and a
/// dangling main document, then freezes it with a strictly monotonic
/// `merged_at`. Returns the now-immutable commit.
pub async fn merge(
    pool: &PgPool,
    bus: &EventBus,
    project: &Project,
    draft: &Commit,
    actor_id: Option<DbId>,
) -> VersioningResult<Commit> {
    ensure_in_project(project, draft)?;
    ensure_draft(draft)?;

    let mut tx = pool.begin().await?;

    // Serialization point: one merge per project at a time. Statements
    // after this see the latest committed history.
    sqlx::query("SELECT pg_advisory_xact_lock($1 # $2)")
        .bind(MERGE_LOCK_NAMESPACE)
        .bind(project.id)
        .execute(&mut *tx)
        .await?;

    // Re-validate under the lock: a competing merge may have won the race
    // between the caller's read and now.
    let current = CommitRepo::find_by_id(&mut *tx, project.id, draft.id)
        .await?
        .ok_or_else(|| CoreError::not_found("Commit", draft.id))?;
    ensure_draft(&current)?;

    // Materialize the draft inside the transaction and validate it.
    let rows =
        DocumentVersionRepo::resolve_at_commit(&mut *tx, project.id, CommitScope::draft(draft.id))
            .await?;
    let live: Vec<_> = rows.iter().filter(|row| !row.is_tombstone()).collect();

    let mut paths: HashMap<&str, uuid::Uuid> = HashMap::with_capacity(live.len());
    for version in &live {
        if let Some(other) = paths.insert(&version.path, version.document_uuid) {
            return Err(CoreError::Conflict(format!(
                "cannot merge: documents {other} and {} both resolve to path '{}'",
                version.document_uuid, version.path
            ))
            .into());
        }
    }

    if let Some(main) = current.main_document_uuid {
        if !live.iter().any(|version| version.document_uuid == main) {
            return Err(CoreError::Validation(format!(
                "main document {main} is not live in the draft being merged"
            ))
            .into());
        }
    }

    let merged = CommitRepo::freeze(&mut *tx, draft.id, project.id)
        .await
        .map_err(classify_freeze_error)?
        .ok_or_else(|| {
            CoreError::InvalidState(format!("commit {} is already merged", draft.id))
        })?;

    tx.commit().await?;

    tracing::info!(
        commit_id = merged.id,
        project_id = project.id,
        documents = live.len(),
        merged_at = ?merged.merged_at,
        "Draft merged into history"
    );

    // Fire-and-forget: subscribers are external and delivery is never
    // awaited or allowed to fail the merge.
    bus.publish(PlatformEvent::commit_merged(
        merged.id,
        project.id,
        project.workspace_id,
        actor_id,
    ));

    Ok(merged)
}

/// The advisory lock makes a `merged_at` collision unreachable, but the
/// unique constraint backstops the ordering invariant; surface a breach
/// as a conflict rather than a bare database error.
fn classify_freeze_error(err: sqlx::Error) -> VersioningError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return CoreError::Conflict(
                "concurrent merge produced a colliding history position".to_string(),
            )
            .into();
        }
    }
    err.into()
}
