use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, trace};

use crate::backend::{DirectoryListingProvider, MoveExecutor};
use crate::error::{ExplorerError, Result};
use crate::fs::path::{join_path_segments, normalize_dir_path};
use crate::fs::tree::Node;

/// Local directory exposed through explorer paths, `/` being `root`.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
    dirs_first: bool,
}

impl LocalBackend {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            dirs_first: true,
        }
    }

    /// List directories before files (default) or interleave them.
    pub fn with_dirs_first(mut self, dirs_first: bool) -> Self {
        self.dirs_first = dirs_first;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an explorer path onto the local filesystem.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let normalized = normalize_dir_path(path);
        let mut resolved = self.root.clone();
        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            if segment == ".." || segment == "." {
                continue;
            }
            resolved.push(segment);
        }
        resolved
    }

    /// Map a local path back into an explorer path, if it lies under the root.
    pub fn to_explorer_path(&self, local: &Path) -> Option<String> {
        let relative = local.strip_prefix(&self.root).ok()?;
        let joined: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        Some(normalize_dir_path(&joined.join("/")))
    }

    fn sort(&self, nodes: &mut [Node]) {
        let dirs_first = self.dirs_first;
        nodes.sort_by(|a, b| {
            let mut cmp = std::cmp::Ordering::Equal;
            if dirs_first {
                cmp = b.is_folder().cmp(&a.is_folder());
            }
            cmp.then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
    }
}

#[async_trait]
impl DirectoryListingProvider for LocalBackend {
    async fn list(&self, path: &str, include_hidden: bool) -> Result<Vec<Node>> {
        let dir = normalize_dir_path(path);
        let local = self.resolve(&dir);
        trace!(path = %dir, local = %local.display(), "listing directory");

        let mut entries = fs::read_dir(&local).await?;
        let mut nodes = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if !include_hidden && name.starts_with('.') {
                continue;
            }
            // Broken symlinks and permission errors are skipped.
            let metadata = match fs::metadata(entry.path()).await {
                Ok(m) => m,
                Err(e) => {
                    debug!(entry = %entry.path().display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let child_path = join_path_segments(&dir, &name);
            nodes.push(if metadata.is_dir() {
                Node::folder(&child_path, &name)
            } else {
                Node::file(&child_path, &name)
            });
        }
        self.sort(&mut nodes);
        Ok(nodes)
    }
}

#[async_trait]
impl MoveExecutor for LocalBackend {
    async fn move_item(&self, source: &str, destination: &str) -> Result<()> {
        let from = self.resolve(source);
        let to = self.resolve(destination);
        if fs::symlink_metadata(&to).await.is_ok() {
            return Err(ExplorerError::Conflict(normalize_dir_path(destination)));
        }
        match fs::rename(&from, &to).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ExplorerError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", normalize_dir_path(source)),
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
