//! Integration tests for draft document write operations.
//!
//! Verifies the write-side integrity rules: draft-only mutation, path
//! validation, live-path uniqueness, and supersession.

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

// ---------------------------------------------------------------------------
// Test: duplicate live paths are rejected
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_rejects_duplicate_live_path(pool: PgPool) {
    let project = project(&pool, "Duplicates").await;
    let commit = draft(&pool, &project, "draft").await;

    documents::create_document(&pool, &project, &commit, "taken", "first")
        .await
        .unwrap();
    let second = documents::create_document(&pool, &project, &commit, "taken", "second").await;
    assert_matches!(second, Err(VersioningError::Core(CoreError::Conflict(_))));
}

// ---------------------------------------------------------------------------
// Test: a deleted path can be reused
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_path_is_reusable(pool: PgPool) {
    let project = project(&pool, "Reuse").await;
    let commit = draft(&pool, &project, "draft").await;

    let original = documents::create_document(&pool, &project, &commit, "slot", "one")
        .await
        .unwrap();
    documents::delete_document(&pool, &project, &commit, original.document_uuid)
        .await
        .unwrap();

    // The path is free again; a new document (new uuid) may claim it.
    let replacement = documents::create_document(&pool, &project, &commit, "slot", "two")
        .await
        .unwrap();
    assert_ne!(replacement.document_uuid, original.document_uuid);

    let live = materializer::document_at_commit_by_path(&pool, &project, &commit, "slot")
        .await
        .unwrap();
    assert_eq!(live.content, "two");
}

// ---------------------------------------------------------------------------
// Test: malformed paths are rejected
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_paths_rejected(pool: PgPool) {
    let project = project(&pool, "Paths").await;
    let commit = draft(&pool, &project, "draft").await;

    for bad in ["", "/leading", "trailing/", "a//b", "has space"] {
        let result = documents::create_document(&pool, &project, &commit, bad, "x").await;
        assert_matches!(
            result,
            Err(VersioningError::Core(CoreError::Validation(_))),
            "path {bad:?} should be rejected"
        );
    }
}

// ---------------------------------------------------------------------------
// Test: merged commits reject writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_writes_to_merged_commit_rejected(pool: PgPool) {
    let project = project(&pool, "Sealed").await;
    let commit = draft(&pool, &project, "draft").await;
    let doc = documents::create_document(&pool, &project, &commit, "kept", "v1")
        .await
        .unwrap();
    let merged_commit = merge::merge(&pool, &EventBus::default(), &project, &commit, None)
        .await
        .unwrap();

    let create =
        documents::create_document(&pool, &project, &merged_commit, "another", "x").await;
    assert_matches!(create, Err(VersioningError::Core(CoreError::InvalidState(_))));

    let update =
        documents::update_document(&pool, &project, &merged_commit, doc.document_uuid, "v2")
            .await;
    assert_matches!(update, Err(VersioningError::Core(CoreError::InvalidState(_))));

    let rename = documents::rename_document(
        &pool,
        &project,
        &merged_commit,
        doc.document_uuid,
        "elsewhere",
    )
    .await;
    assert_matches!(rename, Err(VersioningError::Core(CoreError::InvalidState(_))));

    let delete =
        documents::delete_document(&pool, &project, &merged_commit, doc.document_uuid).await;
    assert_matches!(delete, Err(VersioningError::Core(CoreError::InvalidState(_))));
}

// ---------------------------------------------------------------------------
// Test: update supersedes, latest write wins
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_supersedes(pool: PgPool) {
    let project = project(&pool, "Supersede").await;
    let commit = draft(&pool, &project, "draft").await;

    let doc = documents::create_document(&pool, &project, &commit, "story", "draft one")
        .await
        .unwrap();
    documents::update_document(&pool, &project, &commit, doc.document_uuid, "draft two")
        .await
        .unwrap();
    documents::update_document(&pool, &project, &commit, doc.document_uuid, "draft three")
        .await
        .unwrap();

    let resolved = materializer::document_at_commit(&pool, &project, &commit, doc.document_uuid)
        .await
        .unwrap();
    assert_eq!(resolved.content, "draft three");
    assert_eq!(resolved.path, "story", "updates keep the current path");
}

// ---------------------------------------------------------------------------
// Test: identical rewrites produce identical hashes on distinct rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_identical_writes_share_hash_not_rows(pool: PgPool) {
    let project = project(&pool, "Hashes").await;
    let commit = draft(&pool, &project, "draft").await;

    let first = documents::create_document(&pool, &project, &commit, "same", "identical")
        .await
        .unwrap();
    let second =
        documents::update_document(&pool, &project, &commit, first.document_uuid, "identical")
            .await
            .unwrap();

    assert_eq!(first.content_hash, second.content_hash);
    assert_ne!(first.id, second.id, "no implicit de-duplication across writes");
}

// ---------------------------------------------------------------------------
// Test: rename collision and no-op rename
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rename_collision_and_noop(pool: PgPool) {
    let project = project(&pool, "RenameRules").await;
    let commit = draft(&pool, &project, "draft").await;

    let a = documents::create_document(&pool, &project, &commit, "a", "one")
        .await
        .unwrap();
    documents::create_document(&pool, &project, &commit, "b", "two")
        .await
        .unwrap();

    let collision =
        documents::rename_document(&pool, &project, &commit, a.document_uuid, "b").await;
    assert_matches!(collision, Err(VersioningError::Core(CoreError::Conflict(_))));

    // Renaming to the current path changes nothing.
    let noop = documents::rename_document(&pool, &project, &commit, a.document_uuid, "a")
        .await
        .unwrap();
    assert_eq!(noop.id, a.id, "no-op rename must not insert a row");
}

// ---------------------------------------------------------------------------
// Test: operations on missing documents are NotFound
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_document_not_found(pool: PgPool) {
    let project = project(&pool, "Missing").await;
    let commit = draft(&pool, &project, "draft").await;
    let ghost = uuid::Uuid::new_v4();

    let update = documents::update_document(&pool, &project, &commit, ghost, "x").await;
    assert_matches!(update, Err(VersioningError::Core(CoreError::NotFound { .. })));

    let delete = documents::delete_document(&pool, &project, &commit, ghost).await;
    assert_matches!(delete, Err(VersioningError::Core(CoreError::NotFound { .. })));
}
