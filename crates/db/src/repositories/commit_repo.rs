//! Repository for the `commits` table.
//!
//! Drafts (`merged_at IS NULL`) are the only mutable commits; every
//! mutating query here carries a `merged_at IS NULL` guard so that merged
//! history cannot be touched even by a buggy caller. `freeze` is the one
//! exception by design: it is the transition that sets `merged_at`, and it
//! only ever runs inside the merge coordinator's transaction.

use sqlx::PgPool;
use uuid::Uuid;
use vellum_core::commits::CommitStatus;
use vellum_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use vellum_core::types::{DbId, Timestamp};

use crate::models::commit::{Commit, CreateCommit, UpdateCommit};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, uuid, project_id, title, description, \
    main_document_uuid, merged_at, created_at, updated_at";

/// Provides CRUD and lookup operations for commits.
pub struct CommitRepo;

impl CommitRepo {
    /// Insert a new draft commit with a fresh uuid, returning the created row.
    pub async fn create_draft(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateCommit,
    ) -> Result<Commit, sqlx::Error> {
        let query = format!(
            "INSERT INTO commits (uuid, project_id, title, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Commit>(&query)
            .bind(Uuid::new_v4())
            .bind(project_id)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a commit by its primary key, scoped to a project.
    ///
    /// Generic over the executor so the merge coordinator can re-validate
    /// inside its own transaction.
    pub async fn find_by_id<'e, E>(
        executor: E,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Commit>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM commits WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Commit>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(executor)
            .await
    }

    /// Find a commit by its public uuid, scoped to a project.
    pub async fn find_by_uuid(
        pool: &PgPool,
        project_id: DbId,
        uuid: Uuid,
    ) -> Result<Option<Commit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM commits WHERE uuid = $1 AND project_id = $2");
        sqlx::query_as::<_, Commit>(&query)
            .bind(uuid)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's commits filtered by status.
    ///
    /// Drafts are ordered newest-created first; merged commits newest-merged
    /// first. `limit`/`offset` are clamped to the core pagination bounds.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        status: CommitStatus,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Commit>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(offset);
        let (filter, order) = match status {
            CommitStatus::Draft => ("merged_at IS NULL", "created_at DESC, id DESC"),
            CommitStatus::Merged => ("merged_at IS NOT NULL", "merged_at DESC"),
        };
        let query = format!(
            "SELECT {COLUMNS} FROM commits
             WHERE project_id = $1 AND {filter}
             ORDER BY {order}
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Commit>(&query)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// The project's head: its most recently merged commit, if any.
    pub async fn head(pool: &PgPool, project_id: DbId) -> Result<Option<Commit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM commits
             WHERE project_id = $1 AND merged_at IS NOT NULL
             ORDER BY merged_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Commit>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// The merged commit immediately preceding `before` in project history.
    pub async fn previous_merged(
        pool: &PgPool,
        project_id: DbId,
        before: Timestamp,
    ) -> Result<Option<Commit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM commits
             WHERE project_id = $1 AND merged_at IS NOT NULL AND merged_at < $2
             ORDER BY merged_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Commit>(&query)
            .bind(project_id)
            .bind(before)
            .fetch_optional(pool)
            .await
    }

    /// List merged commits at or before a point in history, oldest first.
    ///
    /// With `at = None`, lists the project's entire merged history.
    pub async fn list_merged_at_or_before(
        pool: &PgPool,
        project_id: DbId,
        at: Option<Timestamp>,
    ) -> Result<Vec<Commit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM commits
             WHERE project_id = $1
               AND merged_at IS NOT NULL
               AND merged_at <= COALESCE($2, 'infinity'::timestamptz)
             ORDER BY merged_at ASC"
        );
        sqlx::query_as::<_, Commit>(&query)
            .bind(project_id)
            .bind(at)
            .fetch_all(pool)
            .await
    }

    /// Update a draft commit's metadata. Returns `None` if the commit does
    /// not exist or is already merged.
    ///
    /// `main_document_uuid` uses an explicit set-flag so a patch can clear
    /// the field, which `COALESCE` alone cannot express.
    pub async fn update_draft(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCommit,
    ) -> Result<Option<Commit>, sqlx::Error> {
        let query = format!(
            "UPDATE commits SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                main_document_uuid = CASE WHEN $4 THEN $5 ELSE main_document_uuid END
             WHERE id = $1 AND merged_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Commit>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.main_document_uuid.is_some())
            .bind(input.main_document_uuid.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete an abandoned draft and (via FK cascade) its document
    /// version rows. Returns `true` if a row was deleted.
    ///
    /// Merged commits are never deletable; the `merged_at IS NULL` guard
    /// makes this a no-op for them.
    pub async fn delete_draft(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM commits WHERE id = $1 AND merged_at IS NULL")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Freeze a draft into merged history. Used only by the merge
    /// coordinator, inside its per-project transaction.
    ///
    /// `merged_at` is computed as the later of the transaction clock and
    /// one microsecond past the project's current maximum, so merges are
    /// strictly monotonic even under clock skew. Returns `None` when the
    /// commit is missing or already merged (the `merged_at IS NULL` guard
    /// fails), which the coordinator surfaces as an invalid-state error.
    pub async fn freeze<'e, E>(
        executor: E,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Commit>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE commits SET merged_at = GREATEST(
                clock_timestamp(),
                (SELECT COALESCE(MAX(merged_at), 'epoch'::timestamptz)
                     + interval '1 microsecond'
                 FROM commits
                 WHERE project_id = $2 AND merged_at IS NOT NULL)
             )
             WHERE id = $1 AND project_id = $2 AND merged_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Commit>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(executor)
            .await
    }
}
