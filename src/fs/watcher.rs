use std::path::Path;

use notify::event::{EventKind, ModifyKind};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::backend::{ChangeKind, ChangeNotification};
use crate::error::Result;
use crate::fs::local::LocalBackend;

/// Default path components whose changes are never forwarded.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    "venv",
    ".venv",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    "target",
];

/// Watches a local root and forwards raw change notifications in explorer
/// paths. Coalescing is left to the debouncer.
pub struct FsWatcher {
    /// Dropped to stop watching.
    _watcher: RecommendedWatcher,
}

impl FsWatcher {
    /// Start watching `backend`'s root recursively.
    pub fn new(
        backend: &LocalBackend,
        ignore_patterns: Vec<String>,
        notify_tx: mpsc::UnboundedSender<ChangeNotification>,
    ) -> Result<Self> {
        let mapper = backend.clone();
        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                let event = match result {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(error = %e, "filesystem watcher error");
                        return;
                    }
                };
                let Some(kind) = change_kind(&event.kind) else {
                    return;
                };
                let paths: Vec<String> = event
                    .paths
                    .iter()
                    .filter(|p| !should_ignore(p, &ignore_patterns))
                    .filter_map(|p| mapper.to_explorer_path(p))
                    .collect();
                if paths.is_empty() {
                    return;
                }
                let _ = notify_tx.send(ChangeNotification::new(kind, paths));
            })?;

        watcher.watch(backend.root(), RecursiveMode::Recursive)?;
        debug!(root = %backend.root().display(), "filesystem watcher started");
        Ok(Self { _watcher: watcher })
    }
}

/// Translate a notify event kind; access events are dropped.
pub fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Moved),
        EventKind::Modify(_) => Some(ChangeKind::Modified),
        EventKind::Any | EventKind::Other => Some(ChangeKind::Unknown(format!("{:?}", kind))),
        EventKind::Access(_) => None,
    }
}

/// Check if a path should be ignored based on ignore patterns.
///
/// A path is ignored if any of its components match any ignore pattern exactly.
pub fn should_ignore(path: &Path, patterns: &[String]) -> bool {
    path.components().any(|component| match component {
        std::path::Component::Normal(name) => {
            let name = name.to_string_lossy();
            patterns.iter().any(|pattern| name == pattern.as_str())
        }
        _ => false,
    })
}
