//! Snapshot diff algorithm.
//!
//! Compares two materialized document snapshots (maps of document uuid to
//! the live version at some commit) and classifies every document in the
//! union as added, modified, deleted, or renamed. Unchanged documents are
//! omitted. The comparison is hash-based: content is never compared
//! byte-by-byte, only via the stored content hash.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The kind of change a document underwent between two snapshots.
///
/// `Modified` and a rename are not mutually exclusive: a document whose
/// content *and* path both changed is reported as `Modified` with
/// [`DocumentChange::renamed`] set. Callers must check the flag rather
/// than assume `Renamed` covers every path change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl ChangeType {
    /// String representation for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One document's live state within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub path: String,
    pub content: String,
    pub content_hash: String,
}

/// A single entry in a snapshot diff.
///
/// `path` is the document's path on the `to` side (for deletions, the last
/// known path on the `from` side). `old_*` fields carry the `from` side
/// where it exists and differs.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentChange {
    pub document_uuid: Uuid,
    pub change_type: ChangeType,
    pub path: String,
    pub old_path: Option<String>,
    pub content: Option<String>,
    pub old_content: Option<String>,
    pub content_hash: Option<String>,
    pub old_content_hash: Option<String>,
    /// Set whenever the path changed, including on `Modified` entries.
    pub renamed: bool,
}

// ---------------------------------------------------------------------------
// Algorithm
// ---------------------------------------------------------------------------

/// Diff two snapshots, returning one entry per changed document ordered by
/// path (then uuid, for documents sharing a path across the two sides).
pub fn diff_snapshots(
    from: &BTreeMap<Uuid, SnapshotEntry>,
    to: &BTreeMap<Uuid, SnapshotEntry>,
) -> Vec<DocumentChange> {
    let mut uuids: Vec<&Uuid> = from.keys().chain(to.keys()).collect();
    uuids.sort();
    uuids.dedup();

    let mut changes: Vec<DocumentChange> = uuids
        .into_iter()
        .filter_map(|uuid| match (from.get(uuid), to.get(uuid)) {
            (None, Some(new)) => Some(DocumentChange {
                document_uuid: *uuid,
                change_type: ChangeType::Added,
                path: new.path.clone(),
                old_path: None,
                content: Some(new.content.clone()),
                old_content: None,
                content_hash: Some(new.content_hash.clone()),
                old_content_hash: None,
                renamed: false,
            }),
            (Some(old), None) => Some(DocumentChange {
                document_uuid: *uuid,
                change_type: ChangeType::Deleted,
                path: old.path.clone(),
                old_path: Some(old.path.clone()),
                content: None,
                old_content: Some(old.content.clone()),
                content_hash: None,
                old_content_hash: Some(old.content_hash.clone()),
                renamed: false,
            }),
            (Some(old), Some(new)) => {
                let content_changed = old.content_hash != new.content_hash;
                let path_changed = old.path != new.path;
                match (content_changed, path_changed) {
                    (false, false) => None,
                    (false, true) => Some(DocumentChange {
                        document_uuid: *uuid,
                        change_type: ChangeType::Renamed,
                        path: new.path.clone(),
                        old_path: Some(old.path.clone()),
                        content: None,
                        old_content: None,
                        content_hash: Some(new.content_hash.clone()),
                        old_content_hash: Some(old.content_hash.clone()),
                        renamed: true,
                    }),
                    (true, _) => Some(DocumentChange {
                        document_uuid: *uuid,
                        change_type: ChangeType::Modified,
                        path: new.path.clone(),
                        old_path: path_changed.then(|| old.path.clone()),
                        content: Some(new.content.clone()),
                        old_content: Some(old.content.clone()),
                        content_hash: Some(new.content_hash.clone()),
                        old_content_hash: Some(old.content_hash.clone()),
                        renamed: path_changed,
                    }),
                }
            }
            (None, None) => unreachable!("uuid must exist in at least one snapshot"),
        })
        .collect();

    changes.sort_by(|a, b| a.path.cmp(&b.path).then(a.document_uuid.cmp(&b.document_uuid)));
    changes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
