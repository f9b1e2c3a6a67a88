//! Diff between two points in history.
//!
//! Materializes both commits and delegates to the pure snapshot diff in
//! `vellum-core`. Diffing two merged commits is a pure function of
//! immutable data; diffing against a draft reflects the draft's rows at
//! call time.

use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;
use vellum_core::diff::{diff_snapshots, DocumentChange, SnapshotEntry};
use vellum_db::models::commit::Commit;
use vellum_db::models::document_version::DocumentVersion;
use vellum_db::models::project::Project;

use crate::error::VersioningResult;
use crate::materializer;

/// Convert a materialized document map into the core diff input.
pub(crate) fn to_snapshot(
    documents: &BTreeMap<Uuid, DocumentVersion>,
) -> BTreeMap<Uuid, SnapshotEntry> {
    documents
        .iter()
        .map(|(uuid, version)| {
            (
                *uuid,
                SnapshotEntry {
                    path: version.path.clone(),
                    content: version.content.clone(),
                    content_hash: version.content_hash.clone(),
                },
            )
        })
        .collect()
}

/// Changes between the documents visible at `from` and at `to`.
///
/// Unchanged documents are omitted; entries are ordered by path.
pub async fn diff(
    pool: &PgPool,
    project: &Project,
    from: &Commit,
    to: &Commit,
) -> VersioningResult<Vec<DocumentChange>> {
    let from_documents = materializer::documents_at_commit(pool, project, from).await?;
    let to_documents = materializer::documents_at_commit(pool, project, to).await?;

    let changes = diff_snapshots(&to_snapshot(&from_documents), &to_snapshot(&to_documents));

    tracing::debug!(
        project_id = project.id,
        from_commit_id = from.id,
        to_commit_id = to.id,
        count = changes.len(),
        "Computed diff between commits"
    );

    Ok(changes)
}
