//! Collaborator seams: directory listings, move execution and change
//! notifications.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::fs::path::normalize_dir_path;
use crate::fs::tree::Node;

/// Lists one level of a directory.
///
/// Returned folders carry `children: None`; the explorer decides what to
/// load next.
#[async_trait]
pub trait DirectoryListingProvider: Send + Sync {
    async fn list(&self, path: &str, include_hidden: bool) -> Result<Vec<Node>>;
}

/// Moves a single entry.
#[async_trait]
pub trait MoveExecutor: Send + Sync {
    async fn move_item(&self, source: &str, destination: &str) -> Result<()>;
}

/// Kind of an external change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Deleted,
    Moved,
    Copied,
    Modified,
    Unknown(String),
}

impl ChangeKind {
    /// Parse an event name such as `created`, `file_deleted` or
    /// `DIRECTORY_MOVED`. The last `_`-separated word decides.
    pub fn from_event_name(name: &str) -> Self {
        let lowered = name.trim().to_ascii_lowercase();
        let verb = lowered.rsplit(['_', '.', ':']).next().unwrap_or_default();
        match verb {
            "created" | "create" => ChangeKind::Created,
            "deleted" | "delete" | "removed" => ChangeKind::Deleted,
            "moved" | "move" | "renamed" => ChangeKind::Moved,
            "copied" | "copy" => ChangeKind::Copied,
            "modified" | "modify" | "changed" => ChangeKind::Modified,
            _ => ChangeKind::Unknown(name.to_string()),
        }
    }

    /// Whether the change alters which entries exist.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ChangeKind::Created | ChangeKind::Deleted | ChangeKind::Moved | ChangeKind::Copied
        )
    }
}

/// Free-form notification payload. Any of the path fields may be present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChangePayload {
    pub path: Option<String>,
    pub file_path: Option<String>,
    pub dir_path: Option<String>,
    pub src_path: Option<String>,
    pub dest_path: Option<String>,
}

impl ChangePayload {
    /// All path-like fields, normalized, in declaration order, deduplicated.
    pub fn affected_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for raw in [
            &self.path,
            &self.file_path,
            &self.dir_path,
            &self.src_path,
            &self.dest_path,
        ]
        .into_iter()
        .flatten()
        {
            let normalized = normalize_dir_path(raw);
            if !paths.contains(&normalized) {
                paths.push(normalized);
            }
        }
        paths
    }
}

/// One external change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    pub kind: ChangeKind,
    pub paths: Vec<String>,
}

impl ChangeNotification {
    pub fn new(kind: ChangeKind, paths: Vec<String>) -> Self {
        Self { kind, paths }
    }

    /// Build a notification from an event name and its JSON payload.
    pub fn from_json(event_name: &str, payload: &str) -> Result<Self> {
        let payload: ChangePayload = serde_json::from_str(payload)?;
        Ok(Self {
            kind: ChangeKind::from_event_name(event_name),
            paths: payload.affected_paths(),
        })
    }
}
