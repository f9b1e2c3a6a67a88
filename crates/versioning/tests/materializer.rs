//! Integration tests for materialization.
//!
//! Verifies write visibility inside drafts, tombstone semantics, rename
//! resolution, and the immutability of merged reads.

use assert_matches::assert_matches;
use sqlx::PgPool;
use vellum_core::error::CoreError;
use vellum_db::models::commit::{Commit, CreateCommit};
use vellum_db::models::project::{CreateProject, Project};
use vellum_db::repositories::{CommitRepo, ProjectRepo};
use vellum_events::EventBus;
use vellum_versioning::{documents, materializer, merge, VersioningError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn project(pool: &PgPool, name: &str) -> Project {
    ProjectRepo::create(
        pool,
        &CreateProject {
            workspace_id: 1,
            name: name.to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
}

async fn draft(pool: &PgPool, project: &Project, title: &str) -> Commit {
    CommitRepo::create_draft(
        pool,
        project.id,
        &CreateCommit {
            title: title.to_string(),
            description: None,
        },
    )
    .await
    .unwrap()
}

async fn merged(pool: &PgPool, project: &Project, commit: &Commit) -> Commit {
    merge::merge(pool, &EventBus::default(), project, commit, None)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Test: writes inside a draft are immediately visible
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_draft_write_visibility(pool: PgPool) {
    let project = project(&pool, "Visibility").await;
    let commit = draft(&pool, &project, "draft").await;

    let created =
        documents::create_document(&pool, &project, &commit, "greeting", "Hello there")
            .await
            .unwrap();

    let resolved =
        materializer::document_at_commit(&pool, &project, &commit, created.document_uuid)
            .await
            .unwrap();
    assert_eq!(resolved.path, "greeting");
    assert_eq!(resolved.content, "Hello there");

    let all = materializer::documents_at_commit(&pool, &project, &commit)
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert!(all.contains_key(&created.document_uuid));
}

// ---------------------------------------------------------------------------
// Test: a deleted document materializes as absent
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_document_is_absent(pool: PgPool) {
    let project = project(&pool, "Tombstones").await;
    let commit = draft(&pool, &project, "draft").await;

    let created = documents::create_document(&pool, &project, &commit, "doomed", "bye")
        .await
        .unwrap();
    documents::delete_document(&pool, &project, &commit, created.document_uuid)
        .await
        .unwrap();

    let result =
        materializer::document_at_commit(&pool, &project, &commit, created.document_uuid).await;
    assert_matches!(
        result,
        Err(VersioningError::Core(CoreError::NotFound { entity: "Document", .. }))
    );

    let all = materializer::documents_at_commit(&pool, &project, &commit)
        .await
        .unwrap();
    assert!(all.is_empty(), "tombstoned documents must be omitted from the map");
}

// ---------------------------------------------------------------------------
// Test: a document that never existed is NotFound
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_document_not_found(pool: PgPool) {
    let project = project(&pool, "Nothing").await;
    let commit = draft(&pool, &project, "draft").await;

    let result =
        materializer::document_at_commit(&pool, &project, &commit, uuid::Uuid::new_v4()).await;
    assert_matches!(result, Err(VersioningError::Core(CoreError::NotFound { .. })));
}

// ---------------------------------------------------------------------------
// Test: merged reads never change
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_merged_read_is_immutable(pool: PgPool) {
    let project = project(&pool, "Immutable").await;

    let first = draft(&pool, &project, "first").await;
    let doc = documents::create_document(&pool, &project, &first, "stable", "v1")
        .await
        .unwrap();
    let first = merged(&pool, &project, &first).await;

    let before = materializer::documents_at_commit(&pool, &project, &first)
        .await
        .unwrap();

    // Later history: edit and merge a second commit.
    let second = draft(&pool, &project, "second").await;
    documents::update_document(&pool, &project, &second, doc.document_uuid, "v2")
        .await
        .unwrap();
    merged(&pool, &project, &second).await;

    let after = materializer::documents_at_commit(&pool, &project, &first)
        .await
        .unwrap();
    assert_eq!(before.len(), after.len());
    assert_eq!(
        before[&doc.document_uuid].content, "v1",
        "merged snapshot must not move"
    );
    assert_eq!(after[&doc.document_uuid].content, "v1");
    assert_eq!(
        before[&doc.document_uuid].id,
        after[&doc.document_uuid].id,
        "repeated merged reads must resolve the same row"
    );
}

// ---------------------------------------------------------------------------
// Test: renames resolve to the latest path only
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rename_resolves_latest_path(pool: PgPool) {
    let project = project(&pool, "Renames").await;
    let commit = draft(&pool, &project, "draft").await;

    let doc = documents::create_document(&pool, &project, &commit, "old-name", "same")
        .await
        .unwrap();
    documents::rename_document(&pool, &project, &commit, doc.document_uuid, "new-name")
        .await
        .unwrap();

    let by_new = materializer::document_at_commit_by_path(&pool, &project, &commit, "new-name")
        .await
        .unwrap();
    assert_eq!(by_new.document_uuid, doc.document_uuid);

    let by_old =
        materializer::document_at_commit_by_path(&pool, &project, &commit, "old-name").await;
    assert_matches!(by_old, Err(VersioningError::Core(CoreError::NotFound { .. })));

    let all = materializer::documents_at_commit(&pool, &project, &commit)
        .await
        .unwrap();
    assert_eq!(all.len(), 1, "a rename must not duplicate the document");
}

// ---------------------------------------------------------------------------
// Test: commits from another project do not exist here
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cross_project_commit_rejected(pool: PgPool) {
    let mine = project(&pool, "Mine").await;
    let theirs = project(&pool, "Theirs").await;
    let foreign = draft(&pool, &theirs, "foreign").await;

    let result = materializer::documents_at_commit(&pool, &mine, &foreign).await;
    assert_matches!(
        result,
        Err(VersioningError::Core(CoreError::NotFound { entity: "Commit", .. }))
    );
}
