use std::collections::HashMap;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::{DirectoryListingProvider, MoveExecutor};
use crate::error::{ExplorerError, Result};
use crate::fs::move_plan::{self, MoveDescriptor, MoveOperation, MovePlan};
use crate::fs::path::{base_name, is_descendant_path, normalize_dir_path, ROOT};
use crate::fs::tree::{ChildrenResult, FlatItem, Node, TreeState};
use crate::selection::{SelectionModel, SelectionOptions};

/// Upper bound on follow-up waves loading expanded but unloaded folders.
const MAX_FOLLOW_UP_WAVES: usize = 16;

/// Issued for every directory fetch; only the newest ticket per path applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub path: String,
    pub seq: u64,
}

/// Explorer behaviour switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplorerOptions {
    pub include_hidden: bool,
    pub selection: SelectionOptions,
}

/// Outcome of executing a move batch.
#[derive(Debug, Default, Serialize)]
pub struct MoveReport {
    pub plan: MovePlan,
    /// Operations that finished, in execution order.
    pub completed: Vec<MoveOperation>,
    /// The operation that failed and stopped the batch, with its error.
    pub failed: Option<(MoveOperation, String)>,
    /// Set when the destination could not be re-listed after the moves.
    pub refresh_error: Option<String>,
}

impl MoveReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

/// Explorer state: cached tree, expansion and selection.
///
/// Every tree change goes through [`TreeState`]; the selection is re-pointed
/// at the visible rows afterwards, never the other way round.
pub struct Explorer {
    tree: TreeState,
    selection: SelectionModel<FlatItem>,
    options: ExplorerOptions,
    latest_fetch: HashMap<String, u64>,
    next_seq: u64,
}

impl Explorer {
    pub fn new(options: ExplorerOptions) -> Self {
        Self {
            tree: TreeState::new(),
            selection: SelectionModel::new(options.selection),
            options,
            latest_fetch: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn tree(&self) -> &TreeState {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionModel<FlatItem> {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionModel<FlatItem> {
        &mut self.selection
    }

    // ── Fetch sequencing ────────────────────────────────────────────────

    /// Register a new fetch for `path`, superseding any earlier one.
    pub fn begin_fetch(&mut self, path: &str) -> FetchTicket {
        let path = normalize_dir_path(path);
        self.next_seq += 1;
        self.latest_fetch.insert(path.clone(), self.next_seq);
        FetchTicket {
            path,
            seq: self.next_seq,
        }
    }

    /// Whether no newer fetch has been issued for the ticket's path.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.latest_fetch.get(&ticket.path) == Some(&ticket.seq)
    }

    /// Apply one listing. Stale tickets are discarded.
    pub fn apply_listing(&mut self, ticket: &FetchTicket, nodes: Vec<Node>) -> bool {
        self.apply_batch(vec![(ticket.clone(), nodes)]) > 0
    }

    /// Apply several listings in one update. Returns how many were applied.
    pub fn apply_batch(&mut self, results: Vec<(FetchTicket, Vec<Node>)>) -> usize {
        let fresh: Vec<ChildrenResult> = results
            .into_iter()
            .filter_map(|(ticket, children)| {
                if self.is_current(&ticket) {
                    Some(ChildrenResult {
                        path: ticket.path,
                        children,
                    })
                } else {
                    debug!(path = %ticket.path, seq = ticket.seq, "discarding stale listing");
                    None
                }
            })
            .collect();
        let applied = fresh.len();
        if applied > 0 {
            self.tree.merge_children(fresh);
            self.sync_selection();
        }
        applied
    }

    fn sync_selection(&mut self) {
        self.selection.set_items(self.tree.flatten());
    }

    // ── Refresh ─────────────────────────────────────────────────────────

    /// Refresh `target`, then every other expanded folder.
    ///
    /// The target listing is merged first. The remaining folders are fetched
    /// concurrently and merged together in one update; a failing folder is
    /// logged and left as it was. `forced` also re-lists the root.
    pub async fn refresh<P>(&mut self, provider: &P, target: &str, forced: bool) -> Result<()>
    where
        P: DirectoryListingProvider + ?Sized,
    {
        let mut target = normalize_dir_path(target);
        if !self.tree.contains_folder(&target) {
            debug!(path = %target, "refresh target not in tree; refreshing root");
            target = ROOT.to_string();
        }
        if forced {
            info!(path = %target, "forced refresh");
        } else {
            debug!(path = %target, "refresh");
        }

        let ticket = self.begin_fetch(&target);
        match provider.list(&target, self.options.include_hidden).await {
            Ok(nodes) => {
                self.apply_listing(&ticket, nodes);
            }
            Err(e) if e.is_disconnected() => {
                debug!(path = %target, "not connected; refresh skipped");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let mut batch: Vec<String> = self
            .tree
            .topmost_expanded_paths()
            .into_iter()
            .filter(|p| *p != target)
            .collect();
        if forced && target != ROOT {
            batch.insert(0, ROOT.to_string());
        }
        self.fetch_batch(provider, batch).await;
        self.load_expanded_unloaded(provider).await;
        Ok(())
    }

    async fn fetch_batch<P>(&mut self, provider: &P, paths: Vec<String>) -> usize
    where
        P: DirectoryListingProvider + ?Sized,
    {
        if paths.is_empty() {
            return 0;
        }
        let tickets: Vec<FetchTicket> = paths.iter().map(|p| self.begin_fetch(p)).collect();
        let include_hidden = self.options.include_hidden;
        let listings = join_all(
            tickets
                .iter()
                .map(|ticket| provider.list(&ticket.path, include_hidden)),
        )
        .await;

        let mut results = Vec::with_capacity(tickets.len());
        for (ticket, listing) in tickets.into_iter().zip(listings) {
            match listing {
                Ok(nodes) => results.push((ticket, nodes)),
                Err(e) if e.is_disconnected() => {
                    debug!(path = %ticket.path, "not connected; folder refresh skipped");
                }
                Err(e) => warn!(path = %ticket.path, error = %e, "folder refresh failed"),
            }
        }
        self.apply_batch(results)
    }

    /// Load expanded folders that are still unloaded, wave by wave.
    async fn load_expanded_unloaded<P>(&mut self, provider: &P)
    where
        P: DirectoryListingProvider + ?Sized,
    {
        for _ in 0..MAX_FOLLOW_UP_WAVES {
            let pending = self.tree.expanded_unloaded_paths();
            if pending.is_empty() || self.fetch_batch(provider, pending).await == 0 {
                break;
            }
        }
    }

    // ── Expand / collapse ───────────────────────────────────────────────

    /// Expand `path`, fetching its children when not yet loaded.
    pub async fn expand<P>(&mut self, provider: &P, path: &str) -> Result<()>
    where
        P: DirectoryListingProvider + ?Sized,
    {
        let path = normalize_dir_path(path);
        let needs_fetch = self.tree.expand(&path);
        self.sync_selection();
        if !needs_fetch {
            return Ok(());
        }

        let ticket = self.begin_fetch(&path);
        match provider.list(&path, self.options.include_hidden).await {
            Ok(nodes) => {
                self.apply_listing(&ticket, nodes);
            }
            Err(e) if e.is_disconnected() => {
                debug!(path = %path, "not connected; expand deferred");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        self.load_expanded_unloaded(provider).await;
        Ok(())
    }

    pub fn collapse(&mut self, path: &str) {
        self.tree.collapse(path);
        self.sync_selection();
    }

    // ── Moves ───────────────────────────────────────────────────────────

    /// Current selection as move descriptors.
    pub fn selected_descriptors(&self) -> Vec<MoveDescriptor> {
        self.selection
            .selected_items()
            .into_iter()
            .map(|item| {
                MoveDescriptor::new(&item.path)
                    .with_name(&item.name)
                    .with_kind(item.kind)
            })
            .collect()
    }

    /// Plan and execute a move batch, then refresh the destination.
    ///
    /// Naming conflicts and entries already present at the destination
    /// reject the whole batch before anything moves. Execution is strictly
    /// sequential and stops at the first failure; finished moves are kept.
    pub async fn move_items<P, E>(
        &mut self,
        provider: &P,
        executor: &E,
        descriptors: &[MoveDescriptor],
        destination: &str,
    ) -> Result<MoveReport>
    where
        P: DirectoryListingProvider + ?Sized,
        E: MoveExecutor + ?Sized,
    {
        let destination = normalize_dir_path(destination);
        let plan = move_plan::plan(descriptors, &destination)?;
        if plan.is_empty() {
            debug!(destination = %destination, skipped = plan.skipped.len(), "nothing to move");
            return Ok(MoveReport {
                plan,
                ..Default::default()
            });
        }

        preflight(provider, &plan, &destination).await?;

        let mut report = MoveReport {
            plan,
            ..Default::default()
        };
        for op in report.plan.operations.clone() {
            match executor.move_item(&op.source, &op.destination).await {
                Ok(()) => {
                    info!(source = %op.source, destination = %op.destination, "moved");
                    report.completed.push(op);
                }
                Err(e) => {
                    warn!(source = %op.source, error = %e, "move failed; aborting batch");
                    report.failed = Some((op, e.to_string()));
                    break;
                }
            }
        }

        self.forget_moved(&report.completed);
        if let Err(e) = self.refresh(provider, &destination, true).await {
            warn!(destination = %destination, error = %e, "refresh after move failed");
            report.refresh_error = Some(e.to_string());
        }
        Ok(report)
    }

    /// Drop expansion entries of moved folders; their old paths are gone.
    fn forget_moved(&mut self, completed: &[MoveOperation]) {
        for op in completed {
            if self.tree.expanded.contains(&op.source)
                || self
                    .tree
                    .expanded
                    .iter()
                    .any(|p| is_descendant_path(&op.source, p))
            {
                self.tree.collapse(&op.source);
            }
        }
    }
}

/// Reject the batch when any destination name already exists.
async fn preflight<P>(provider: &P, plan: &MovePlan, destination: &str) -> Result<()>
where
    P: DirectoryListingProvider + ?Sized,
{
    let existing = provider.list(destination, true).await?;
    for op in &plan.operations {
        let name = base_name(&op.destination);
        if existing.iter().any(|node| node.name == name) {
            return Err(ExplorerError::Conflict(op.destination.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    use crate::fs::tree::NodeKind;
    use crate::selection::Modifiers;

    /// In-memory backend: folder path -> ordered (name, kind) entries.
    #[derive(Default)]
    struct MemoryBackend {
        dirs: Mutex<BTreeMap<String, Vec<(String, NodeKind)>>>,
        failing: Mutex<HashSet<String>>,
        connected: Mutex<bool>,
        fail_moves_after: Mutex<Option<usize>>,
        listed: Mutex<Vec<String>>,
        moved: Mutex<Vec<(String, String)>>,
        /// Folders that start failing to list once a move has run.
        fail_after_move: Mutex<HashSet<String>>,
    }

    impl MemoryBackend {
        fn new() -> Self {
            let backend = Self::default();
            *backend.connected.lock().unwrap() = true;
            backend
        }

        fn with_dir(self, dir: &str, children: &[(&str, NodeKind)]) -> Self {
            self.dirs.lock().unwrap().insert(
                dir.to_string(),
                children.iter().map(|(n, k)| (n.to_string(), *k)).collect(),
            );
            self
        }

        fn listed(&self) -> Vec<String> {
            self.listed.lock().unwrap().clone()
        }

        fn clear_listed(&self) {
            self.listed.lock().unwrap().clear();
        }

        fn add(&self, dir: &str, name: &str, kind: NodeKind) {
            self.dirs
                .lock()
                .unwrap()
                .entry(dir.to_string())
                .or_default()
                .push((name.to_string(), kind));
        }
    }

    #[async_trait]
    impl DirectoryListingProvider for MemoryBackend {
        async fn list(&self, path: &str, _include_hidden: bool) -> Result<Vec<Node>> {
            if !*self.connected.lock().unwrap() {
                return Err(ExplorerError::NotConnected);
            }
            self.listed.lock().unwrap().push(path.to_string());
            if self.failing.lock().unwrap().contains(path) {
                return Err(ExplorerError::Transport(format!("cannot list {}", path)));
            }
            let dirs = self.dirs.lock().unwrap();
            let entries = dirs
                .get(path)
                .ok_or_else(|| ExplorerError::Transport(format!("no such folder {}", path)))?;
            Ok(entries
                .iter()
                .map(|(name, kind)| {
                    let child = crate::fs::path::join_path_segments(path, name);
                    match kind {
                        NodeKind::Folder => Node::folder(&child, name),
                        NodeKind::File => Node::file(&child, name),
                    }
                })
                .collect())
        }
    }

    #[async_trait]
    impl MoveExecutor for MemoryBackend {
        async fn move_item(&self, source: &str, destination: &str) -> Result<()> {
            let mut budget = self.fail_moves_after.lock().unwrap();
            if let Some(remaining) = budget.as_mut() {
                if *remaining == 0 {
                    return Err(ExplorerError::Transport("disk full".into()));
                }
                *remaining -= 1;
            }
            drop(budget);

            let mut dirs = self.dirs.lock().unwrap();
            let parent = crate::fs::path::get_parent_directory_path(source);
            let name = base_name(source);
            let entry = {
                let siblings = dirs.get_mut(&parent).expect("source parent");
                let idx = siblings
                    .iter()
                    .position(|(n, _)| *n == name)
                    .expect("source entry");
                siblings.remove(idx)
            };
            let dest_parent = crate::fs::path::get_parent_directory_path(destination);
            dirs.entry(dest_parent)
                .or_default()
                .push((base_name(destination), entry.1));
            drop(dirs);
            self.moved
                .lock()
                .unwrap()
                .push((source.to_string(), destination.to_string()));
            let broken: Vec<String> = self.fail_after_move.lock().unwrap().drain().collect();
            self.failing.lock().unwrap().extend(broken);
            Ok(())
        }
    }

    use crate::fs::tree::NodeKind::{File as F, Folder as D};

    fn sample_backend() -> MemoryBackend {
        MemoryBackend::new()
            .with_dir("/", &[("docs", D), ("src", D), ("archive", D), ("readme.md", F)])
            .with_dir("/docs", &[("guide", D), ("notes.md", F)])
            .with_dir("/docs/guide", &[("intro.md", F)])
            .with_dir("/src", &[("main.rs", F)])
            .with_dir("/archive", &[])
    }

    async fn loaded_explorer(backend: &MemoryBackend) -> Explorer {
        let mut explorer = Explorer::new(ExplorerOptions::default());
        explorer.refresh(backend, "/", false).await.unwrap();
        explorer
    }

    fn visible(explorer: &Explorer) -> Vec<String> {
        explorer.tree().flatten().into_iter().map(|i| i.path).collect()
    }

    #[tokio::test]
    async fn initial_refresh_loads_top_level() {
        let backend = sample_backend();
        let explorer = loaded_explorer(&backend).await;
        assert_eq!(
            visible(&explorer),
            vec!["/docs", "/src", "/archive", "/readme.md"]
        );
        assert_eq!(explorer.selection().items().len(), 4);
    }

    #[tokio::test]
    async fn expand_fetches_children_once() {
        let backend = sample_backend();
        let mut explorer = loaded_explorer(&backend).await;
        backend.clear_listed();
        explorer.expand(&backend, "/docs").await.unwrap();
        assert_eq!(backend.listed(), vec!["/docs".to_string()]);
        assert!(visible(&explorer).contains(&"/docs/notes.md".to_string()));

        explorer.collapse("/docs");
        backend.clear_listed();
        explorer.expand(&backend, "/docs").await.unwrap();
        assert!(backend.listed().is_empty());
    }

    #[tokio::test]
    async fn refresh_fans_out_over_topmost_expanded_folders() {
        let backend = sample_backend();
        let mut explorer = loaded_explorer(&backend).await;
        explorer.expand(&backend, "/docs").await.unwrap();
        explorer.expand(&backend, "/docs/guide").await.unwrap();
        explorer.expand(&backend, "/src").await.unwrap();

        backend.add("/docs/guide", "setup.md", F);
        backend.add("/src", "lib.rs", F);
        backend.clear_listed();
        explorer.refresh(&backend, "/", false).await.unwrap();

        let listed = backend.listed();
        assert_eq!(listed[0], "/");
        let rest: HashSet<&str> = listed[1..].iter().map(|s| s.as_str()).collect();
        assert_eq!(rest, HashSet::from(["/docs", "/src"]));

        let rows = visible(&explorer);
        assert!(rows.contains(&"/src/lib.rs".to_string()));
        // Nested expanded folder keeps its cached children.
        assert!(rows.contains(&"/docs/guide/intro.md".to_string()));
    }

    #[tokio::test]
    async fn batch_failure_is_isolated() {
        let backend = sample_backend();
        let mut explorer = loaded_explorer(&backend).await;
        explorer.expand(&backend, "/docs").await.unwrap();
        explorer.expand(&backend, "/src").await.unwrap();

        backend.add("/src", "lib.rs", F);
        backend.add("/docs", "new.md", F);
        backend.failing.lock().unwrap().insert("/docs".into());
        explorer.refresh(&backend, "/", false).await.unwrap();

        let rows = visible(&explorer);
        assert!(rows.contains(&"/src/lib.rs".to_string()));
        assert!(rows.contains(&"/docs/notes.md".to_string()));
        assert!(!rows.contains(&"/docs/new.md".to_string()));
    }

    #[tokio::test]
    async fn primary_failure_leaves_state_untouched() {
        let backend = sample_backend();
        let mut explorer = loaded_explorer(&backend).await;
        let before = explorer.tree().nodes.clone();
        backend.failing.lock().unwrap().insert("/".into());
        let err = explorer.refresh(&backend, "/", false).await.unwrap_err();
        assert!(matches!(err, ExplorerError::Transport(_)));
        assert_eq!(explorer.tree().nodes, before);
    }

    #[tokio::test]
    async fn disconnected_refresh_is_a_noop() {
        let backend = sample_backend();
        let mut explorer = loaded_explorer(&backend).await;
        let before = explorer.tree().nodes.clone();
        *backend.connected.lock().unwrap() = false;
        explorer.refresh(&backend, "/", true).await.unwrap();
        assert_eq!(explorer.tree().nodes, before);
    }

    #[tokio::test]
    async fn stale_listing_is_discarded() {
        let backend = sample_backend();
        let mut explorer = loaded_explorer(&backend).await;
        explorer.expand(&backend, "/docs").await.unwrap();

        let slow = explorer.begin_fetch("/docs");
        let fast = explorer.begin_fetch("/docs");
        assert!(!explorer.is_current(&slow));

        assert!(explorer.apply_listing(&fast, vec![Node::file("/docs/new.md", "new.md")]));
        assert!(!explorer.apply_listing(&slow, vec![Node::file("/docs/old.md", "old.md")]));
        let rows = visible(&explorer);
        assert!(rows.contains(&"/docs/new.md".to_string()));
        assert!(!rows.contains(&"/docs/old.md".to_string()));
    }

    #[tokio::test]
    async fn selection_is_pruned_when_rows_disappear() {
        let backend = sample_backend();
        let mut explorer = loaded_explorer(&backend).await;
        explorer.expand(&backend, "/docs").await.unwrap();
        explorer
            .selection_mut()
            .select("/docs/notes.md", Modifiers::NONE);
        explorer.selection_mut().select("/src", Modifiers::ctrl());
        assert_eq!(explorer.selection().selection_count(), 2);

        explorer.collapse("/docs");
        assert_eq!(explorer.selection().selected_ids(), vec!["/src".to_string()]);
    }

    #[tokio::test]
    async fn moves_selection_and_refreshes() {
        let backend = sample_backend();
        let mut explorer = loaded_explorer(&backend).await;
        explorer.expand(&backend, "/archive").await.unwrap();
        explorer.selection_mut().select("/readme.md", Modifiers::NONE);
        explorer.selection_mut().select("/src", Modifiers::ctrl());

        let descriptors = explorer.selected_descriptors();
        let report = explorer
            .move_items(&backend, &backend, &descriptors, "/archive")
            .await
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.completed.len(), 2);

        let rows = visible(&explorer);
        assert!(rows.contains(&"/archive/readme.md".to_string()));
        assert!(rows.contains(&"/archive/src".to_string()));
        assert!(!rows.contains(&"/readme.md".to_string()));
    }

    #[tokio::test]
    async fn preflight_rejects_existing_destination() {
        let backend = sample_backend();
        backend.add("/archive", "readme.md", F);
        let mut explorer = loaded_explorer(&backend).await;
        let err = explorer
            .move_items(
                &backend,
                &backend,
                &[MoveDescriptor::new("/src"), MoveDescriptor::new("/readme.md")],
                "/archive",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::Conflict(ref p) if p == "/archive/readme.md"));
        assert!(backend.moved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn naming_conflict_rejects_batch_before_moving() {
        let backend = sample_backend();
        backend.add("/src", "readme.md", F);
        let mut explorer = loaded_explorer(&backend).await;
        let err = explorer
            .move_items(
                &backend,
                &backend,
                &[
                    MoveDescriptor::new("/readme.md"),
                    MoveDescriptor::new("/src/readme.md"),
                ],
                "/archive",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::NamingConflict { .. }));
        assert!(backend.moved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_mid_batch_stops_without_rollback() {
        let backend = sample_backend();
        *backend.fail_moves_after.lock().unwrap() = Some(1);
        let mut explorer = loaded_explorer(&backend).await;
        let report = explorer
            .move_items(
                &backend,
                &backend,
                &[
                    MoveDescriptor::new("/readme.md"),
                    MoveDescriptor::new("/src"),
                    MoveDescriptor::new("/docs"),
                ],
                "/archive",
            )
            .await
            .unwrap();
        assert_eq!(report.completed.len(), 1);
        assert_eq!(report.completed[0].source, "/readme.md");
        let (failed, _) = report.failed.expect("failure recorded");
        assert_eq!(failed.source, "/src");
        assert_eq!(backend.moved.lock().unwrap().len(), 1);
        assert!(visible(&explorer).contains(&"/src".to_string()));
    }

    #[tokio::test]
    async fn completed_moves_survive_a_failed_refresh() {
        let backend = sample_backend();
        let mut explorer = loaded_explorer(&backend).await;
        backend
            .fail_after_move
            .lock()
            .unwrap()
            .insert("/archive".into());

        let report = explorer
            .move_items(&backend, &backend, &[MoveDescriptor::new("/readme.md")], "/archive")
            .await
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.completed.len(), 1);
        assert_eq!(report.completed[0].destination, "/archive/readme.md");
        assert!(report.refresh_error.is_some());
        assert_eq!(backend.moved.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn successful_batch_has_no_refresh_error() {
        let backend = sample_backend();
        let mut explorer = loaded_explorer(&backend).await;
        let report = explorer
            .move_items(&backend, &backend, &[MoveDescriptor::new("/src")], "/archive")
            .await
            .unwrap();
        assert!(report.refresh_error.is_none());
    }

    #[tokio::test]
    async fn moved_folder_loses_stale_expansion() {
        let backend = sample_backend();
        let mut explorer = loaded_explorer(&backend).await;
        explorer.expand(&backend, "/docs").await.unwrap();
        explorer.expand(&backend, "/docs/guide").await.unwrap();
        explorer
            .move_items(&backend, &backend, &[MoveDescriptor::new("/docs")], "/archive")
            .await
            .unwrap();
        assert!(!explorer.tree().expanded.contains("/docs"));
        assert!(!explorer.tree().expanded.contains("/docs/guide"));
        assert!(explorer.tree().find("/docs").is_none());
    }
}
