//! Repository for the `document_versions` table.
//!
//! Rows are append-only: editing, renaming, or deleting a document inside
//! a draft inserts a new row with the same `document_uuid` that supersedes
//! the older ones. Materialization resolves, for each document, the newest
//! row visible from a given commit by walking merged history (plus the
//! draft's own rows when the target is a draft).

use sqlx::PgPool;
use uuid::Uuid;
use vellum_core::types::{DbId, Timestamp};

use crate::models::document_version::{CreateDocumentVersion, DocumentVersion};

/// Column list for unqualified queries.
const COLUMNS: &str = "id, commit_id, document_uuid, path, content, \
    content_hash, deleted_at, created_at, updated_at";

/// Column list qualified for the materialization join against `commits`.
const DV_COLUMNS: &str = "dv.id, dv.commit_id, dv.document_uuid, dv.path, \
    dv.content, dv.content_hash, dv.deleted_at, dv.created_at, dv.updated_at";

/// Ancestor-visibility predicate shared by the materialization queries:
/// merged commits up to the cutoff (all of them when the cutoff is NULL),
/// plus the explicitly named draft commit, if any.
const VISIBLE_PREDICATE: &str = "c.project_id = $1
    AND ((c.merged_at IS NOT NULL
          AND c.merged_at <= COALESCE($2, 'infinity'::timestamptz))
         OR c.id = $3)";

/// Newest-first resolution order: the draft's own rows beat merged history,
/// later merges beat earlier ones, and within one commit the latest insert
/// wins (`id` breaks same-microsecond ties deterministically).
const RESOLUTION_ORDER: &str = "(c.merged_at IS NULL) DESC, c.merged_at DESC, \
    dv.created_at DESC, dv.id DESC";

// ---------------------------------------------------------------------------
// CommitScope
// ---------------------------------------------------------------------------

/// The point in history a materialization query resolves against.
///
/// For a merged target, ancestors are every commit merged at or before it.
/// For a draft target, ancestors are the project's entire merged history
/// plus the draft's own rows, which take precedence.
#[derive(Debug, Clone, Copy)]
pub struct CommitScope {
    merged_cutoff: Option<Timestamp>,
    draft_commit_id: Option<DbId>,
}

impl CommitScope {
    /// Scope for a merged commit: history at or before `merged_at`.
    pub fn merged(merged_at: Timestamp) -> Self {
        Self {
            merged_cutoff: Some(merged_at),
            draft_commit_id: None,
        }
    }

    /// Scope for a draft commit: all merged history plus the draft's rows.
    pub fn draft(commit_id: DbId) -> Self {
        Self {
            merged_cutoff: None,
            draft_commit_id: Some(commit_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// Provides insert and history-resolution operations for document versions.
pub struct DocumentVersionRepo;

impl DocumentVersionRepo {
    /// Insert a new document version row.
    ///
    /// Draft-state enforcement and hash computation belong to the service
    /// layer; this is the raw insert.
    pub async fn insert<'e, E>(
        executor: E,
        commit_id: DbId,
        input: &CreateDocumentVersion,
    ) -> Result<DocumentVersion, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO document_versions
                (commit_id, document_uuid, path, content, content_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentVersion>(&query)
            .bind(commit_id)
            .bind(input.document_uuid)
            .bind(&input.path)
            .bind(&input.content)
            .bind(&input.content_hash)
            .fetch_one(executor)
            .await
    }

    /// Insert a tombstone row marking the document deleted from this commit
    /// forward. The last known path is carried for display purposes; the
    /// content columns are empty.
    pub async fn insert_tombstone<'e, E>(
        executor: E,
        commit_id: DbId,
        document_uuid: Uuid,
        path: &str,
    ) -> Result<DocumentVersion, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO document_versions
                (commit_id, document_uuid, path, content, content_hash, deleted_at)
             VALUES ($1, $2, $3, '', '', NOW())
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentVersion>(&query)
            .bind(commit_id)
            .bind(document_uuid)
            .bind(path)
            .fetch_one(executor)
            .await
    }

    /// List every row belonging to one commit, oldest insert first.
    ///
    /// A draft may contain several rows for the same `document_uuid`
    /// (supersessions); this returns all of them.
    pub async fn list_by_commit(
        pool: &PgPool,
        commit_id: DbId,
    ) -> Result<Vec<DocumentVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM document_versions
             WHERE commit_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, DocumentVersion>(&query)
            .bind(commit_id)
            .fetch_all(pool)
            .await
    }

    /// Resolve the newest visible row per document at the given scope.
    ///
    /// Returns one row per `document_uuid` ever seen across the scope's
    /// ancestor commits — tombstones included, so the caller decides
    /// whether a winning tombstone means "absent". Merged-scope results
    /// are pure functions of immutable data.
    pub async fn resolve_at_commit<'e, E>(
        executor: E,
        project_id: DbId,
        scope: CommitScope,
    ) -> Result<Vec<DocumentVersion>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "SELECT DISTINCT ON (dv.document_uuid) {DV_COLUMNS}
             FROM document_versions dv
             JOIN commits c ON c.id = dv.commit_id
             WHERE {VISIBLE_PREDICATE}
             ORDER BY dv.document_uuid, {RESOLUTION_ORDER}"
        );
        sqlx::query_as::<_, DocumentVersion>(&query)
            .bind(project_id)
            .bind(scope.merged_cutoff)
            .bind(scope.draft_commit_id)
            .fetch_all(executor)
            .await
    }

    /// Resolve the newest visible row for a single document at the given
    /// scope, tombstones included. `None` means the document has no row at
    /// or before that point.
    pub async fn resolve_document_at_commit<'e, E>(
        executor: E,
        project_id: DbId,
        scope: CommitScope,
        document_uuid: Uuid,
    ) -> Result<Option<DocumentVersion>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {DV_COLUMNS}
             FROM document_versions dv
             JOIN commits c ON c.id = dv.commit_id
             WHERE {VISIBLE_PREDICATE} AND dv.document_uuid = $4
             ORDER BY {RESOLUTION_ORDER}
             LIMIT 1"
        );
        sqlx::query_as::<_, DocumentVersion>(&query)
            .bind(project_id)
            .bind(scope.merged_cutoff)
            .bind(scope.draft_commit_id)
            .bind(document_uuid)
            .fetch_optional(executor)
            .await
    }
}
