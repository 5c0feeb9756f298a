use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::fs::path::{is_descendant_path, normalize_dir_path, ROOT};

/// Type of explorer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

/// A node in the cached explorer tree.
///
/// `children == None` means the folder has not been loaded yet;
/// `Some(vec![])` means it was loaded and is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub path: String,
    pub name: String,
    pub kind: NodeKind,
    pub is_expanded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
}

impl Node {
    /// Create a file node. The path doubles as the id.
    pub fn file(path: &str, name: &str) -> Self {
        let path = normalize_dir_path(path);
        Self {
            id: path.clone(),
            path,
            name: name.to_string(),
            kind: NodeKind::File,
            is_expanded: false,
            children: None,
        }
    }

    /// Create an unloaded folder node. The path doubles as the id.
    pub fn folder(path: &str, name: &str) -> Self {
        Self {
            kind: NodeKind::Folder,
            ..Self::file(path, name)
        }
    }

    /// Attach loaded children (builder style).
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

/// A flattened, visible row of the tree in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatItem {
    pub id: String,
    pub path: String,
    pub name: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub is_expanded: bool,
}

/// Freshly fetched children for one folder.
#[derive(Debug, Clone)]
pub struct ChildrenResult {
    pub path: String,
    pub children: Vec<Node>,
}

/// Lookup of the previous tree by path, used while merging a new snapshot.
pub type NodesByPath<'a> = HashMap<&'a str, &'a Node>;

/// Set of folder paths the user keeps expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSet {
    paths: HashSet<String>,
}

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn insert(&mut self, path: &str) -> bool {
        self.paths.insert(normalize_dir_path(path))
    }

    /// Remove `path` together with every expanded descendant.
    pub fn collapse(&mut self, path: &str) {
        let path = normalize_dir_path(path);
        self.paths
            .retain(|p| *p != path && !is_descendant_path(&path, p));
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.paths.iter()
    }
}

/// Cached explorer tree plus the expansion state it is annotated with.
///
/// All structural changes go through the merge functions here; nodes are
/// rebuilt rather than patched so a merge never half-applies.
#[derive(Debug, Clone, Default)]
pub struct TreeState {
    pub nodes: Vec<Node>,
    pub expanded: ExpansionSet,
}

impl TreeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every node of `nodes` by path.
    pub fn index_by_path(nodes: &[Node]) -> NodesByPath<'_> {
        let mut map = HashMap::new();
        Self::index_into(nodes, &mut map);
        map
    }

    fn index_into<'a>(nodes: &'a [Node], map: &mut NodesByPath<'a>) {
        for node in nodes {
            map.insert(node.path.as_str(), node);
            if let Some(children) = &node.children {
                Self::index_into(children, map);
            }
        }
    }

    /// Annotate a fresh listing with expansion state, reusing loaded subtrees.
    ///
    /// Children per folder: the fetched children whenever the listing
    /// supplied them. Without them an expanded folder keeps the previous
    /// node's loaded children, with or without `prefer_new`; a collapsed
    /// one is left unloaded.
    pub fn annotate_with_expansion(
        expanded: &ExpansionSet,
        fresh: Vec<Node>,
        previous: &NodesByPath<'_>,
        prefer_new: bool,
    ) -> Vec<Node> {
        fresh
            .into_iter()
            .map(|mut node| {
                node.path = normalize_dir_path(&node.path);
                if !node.is_folder() {
                    node.is_expanded = false;
                    node.children = None;
                    return node;
                }

                node.is_expanded = expanded.contains(&node.path);
                let previous_children = previous
                    .get(node.path.as_str())
                    .and_then(|prev| prev.children.as_ref());

                let chosen = match node.children.take() {
                    Some(fresh_children) => Some(fresh_children),
                    None if node.is_expanded => {
                        if prefer_new && previous_children.is_some() {
                            trace!(path = %node.path, "listing carried no children; keeping cached ones");
                        }
                        previous_children.cloned()
                    }
                    None => None,
                };

                node.children = chosen.map(|children| {
                    Self::annotate_with_expansion(expanded, children, previous, prefer_new)
                });
                node
            })
            .collect()
    }

    /// Replace the children of every folder named in `results`.
    ///
    /// Folders without a result keep their children. Recursion continues
    /// into the children now present so deeper refreshed folders are also
    /// picked up.
    pub fn apply_children_results(
        expanded: &ExpansionSet,
        current: Vec<Node>,
        results: &[ChildrenResult],
        previous: &NodesByPath<'_>,
    ) -> Vec<Node> {
        current
            .into_iter()
            .map(|mut node| {
                if !node.is_folder() {
                    return node;
                }
                node.is_expanded = expanded.contains(&node.path);

                if let Some(result) = results.iter().find(|r| r.path == node.path) {
                    node.children = Some(Self::annotate_with_expansion(
                        expanded,
                        result.children.clone(),
                        previous,
                        true,
                    ));
                }

                node.children = node
                    .children
                    .take()
                    .map(|children| Self::apply_children_results(expanded, children, results, previous));
                node
            })
            .collect()
    }

    /// Merge a listing of the top level.
    pub fn merge_root(&mut self, fresh: Vec<Node>) {
        self.seed_expansion_if_empty();
        let nodes = {
            let previous = Self::index_by_path(&self.nodes);
            Self::annotate_with_expansion(&self.expanded, fresh, &previous, false)
        };
        self.nodes = nodes;
    }

    /// Merge a batch of folder listings in one update.
    ///
    /// A result for the root replaces the top level; everything else is
    /// applied by path. Returns whether the tree changed.
    pub fn merge_children(&mut self, mut results: Vec<ChildrenResult>) -> bool {
        if results.is_empty() {
            return false;
        }
        self.seed_expansion_if_empty();
        for result in &mut results {
            result.path = normalize_dir_path(&result.path);
        }

        let before = self.nodes.clone();
        let root_index = results.iter().position(|r| r.path == ROOT);
        if let Some(idx) = root_index {
            let root = results.remove(idx);
            self.merge_root(root.children);
        }
        if !results.is_empty() {
            let nodes = {
                let previous = Self::index_by_path(&before);
                let current = std::mem::take(&mut self.nodes);
                Self::apply_children_results(&self.expanded, current, &results, &previous)
            };
            self.nodes = nodes;
        }
        self.nodes != before
    }

    /// Seed the expansion set from the current tree when it is empty.
    ///
    /// Covers trees built before expansion state was tracked separately.
    pub fn seed_expansion_if_empty(&mut self) {
        if !self.expanded.is_empty() || self.nodes.is_empty() {
            return;
        }
        fn walk(nodes: &[Node], expanded: &mut ExpansionSet) {
            for node in nodes.iter().filter(|n| n.is_folder()) {
                if node.is_expanded {
                    expanded.insert(&node.path);
                }
                if let Some(children) = &node.children {
                    walk(children, expanded);
                }
            }
        }
        walk(&self.nodes, &mut self.expanded);
        if !self.expanded.is_empty() {
            debug!(count = self.expanded.len(), "seeded expansion set from previous tree");
        }
    }

    /// Expanded folders present in the tree, minus any nested under another.
    pub fn topmost_expanded_paths(&self) -> Vec<String> {
        let mut present = Vec::new();
        Self::collect_expanded(&self.nodes, &self.expanded, &mut present);
        let topmost: Vec<String> = present
            .iter()
            .filter(|path| !present.iter().any(|other| is_descendant_path(other, path)))
            .cloned()
            .collect();
        topmost
    }

    fn collect_expanded(nodes: &[Node], expanded: &ExpansionSet, out: &mut Vec<String>) {
        for node in nodes.iter().filter(|n| n.is_folder()) {
            if expanded.contains(&node.path) {
                out.push(node.path.clone());
            }
            if let Some(children) = &node.children {
                Self::collect_expanded(children, expanded, out);
            }
        }
    }

    /// Expanded folders whose children have not been loaded.
    pub fn expanded_unloaded_paths(&self) -> Vec<String> {
        fn walk(nodes: &[Node], out: &mut Vec<String>) {
            for node in nodes.iter().filter(|n| n.is_folder()) {
                match &node.children {
                    None if node.is_expanded => out.push(node.path.clone()),
                    Some(children) if node.is_expanded => walk(children, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out
    }

    /// Mark `path` expanded. Returns true when its children still need a fetch.
    pub fn expand(&mut self, path: &str) -> bool {
        let path = normalize_dir_path(path);
        if self.find(&path).is_some_and(|node| !node.is_folder()) {
            return false;
        }
        self.expanded.insert(&path);
        self.reannotate();
        self.find(&path)
            .is_some_and(|node| node.is_folder() && node.children.is_none())
    }

    /// Collapse `path` and forget the expansion of everything inside it.
    pub fn collapse(&mut self, path: &str) {
        self.expanded.collapse(path);
        self.reannotate();
    }

    fn reannotate(&mut self) {
        let current = std::mem::take(&mut self.nodes);
        let nodes = {
            let previous = Self::index_by_path(&current);
            Self::annotate_with_expansion(&self.expanded, current.clone(), &previous, true)
        };
        self.nodes = nodes;
    }

    /// Find a node by path.
    pub fn find(&self, path: &str) -> Option<&Node> {
        let path = normalize_dir_path(path);
        fn walk<'a>(nodes: &'a [Node], target: &str) -> Option<&'a Node> {
            for node in nodes {
                if node.path == target {
                    return Some(node);
                }
                if is_descendant_path(&node.path, target) {
                    return node.children.as_deref().and_then(|c| walk(c, target));
                }
            }
            None
        }
        walk(&self.nodes, &path)
    }

    /// Whether `path` is the root or a folder currently in the tree.
    pub fn contains_folder(&self, path: &str) -> bool {
        let path = normalize_dir_path(path);
        path == ROOT || self.find(&path).is_some_and(Node::is_folder)
    }

    /// Visible rows in display order: children of expanded folders only.
    pub fn flatten(&self) -> Vec<FlatItem> {
        fn walk(nodes: &[Node], depth: usize, items: &mut Vec<FlatItem>) {
            for node in nodes {
                items.push(FlatItem {
                    id: node.id.clone(),
                    path: node.path.clone(),
                    name: node.name.clone(),
                    kind: node.kind,
                    depth,
                    is_expanded: node.is_expanded,
                });
                if node.is_expanded {
                    if let Some(children) = &node.children {
                        walk(children, depth + 1, items);
                    }
                }
            }
        }
        let mut items = Vec::new();
        walk(&self.nodes, 0, &mut items);
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top_level() -> Vec<Node> {
        vec![
            Node::folder("/a", "a"),
            Node::folder("/b", "b"),
            Node::file("/readme.md", "readme.md"),
        ]
    }

    fn state_with_loaded_a() -> TreeState {
        let mut state = TreeState::new();
        state.expanded.insert("/a");
        state.merge_root(top_level());
        state.merge_children(vec![ChildrenResult {
            path: "/a".into(),
            children: vec![Node::file("/a/c1", "c1"), Node::folder("/a/sub", "sub")],
        }]);
        state
    }

    #[test]
    fn merge_reuses_loaded_children_of_expanded_folder() {
        let mut state = state_with_loaded_a();
        let a = state.find("/a").unwrap();
        assert!(a.is_expanded);
        assert_eq!(a.children.as_ref().unwrap().len(), 2);

        // Top-level refresh omits /a's children.
        state.merge_root(top_level());
        let a = state.find("/a").unwrap();
        let names: Vec<&str> = a
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["c1", "sub"]);
    }

    #[test]
    fn annotate_preserves_previous_children_directly() {
        let previous_tree = vec![Node::folder("/a", "a")
            .with_children(vec![Node::file("/a/c1", "c1")])];
        let previous = TreeState::index_by_path(&previous_tree);
        let mut expanded = ExpansionSet::new();
        expanded.insert("/a");

        let out = TreeState::annotate_with_expansion(
            &expanded,
            vec![Node::folder("/a", "a")],
            &previous,
            false,
        );
        assert!(out[0].is_expanded);
        assert_eq!(out[0].children.as_ref().unwrap()[0].path, "/a/c1");
    }

    #[test]
    fn fetched_children_replace_cached_ones_without_prefer_new() {
        let previous_tree = vec![Node::folder("/a", "a")
            .with_children(vec![Node::file("/a/old", "old")])];
        let previous = TreeState::index_by_path(&previous_tree);
        let mut expanded = ExpansionSet::new();
        expanded.insert("/a");

        let out = TreeState::annotate_with_expansion(
            &expanded,
            vec![Node::folder("/a", "a").with_children(vec![Node::file("/a/new", "new")])],
            &previous,
            false,
        );
        let names: Vec<&str> = out[0]
            .children
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["new"]);
    }

    #[test]
    fn root_listing_with_nested_children_is_kept() {
        let mut state = state_with_loaded_a();
        state.merge_root(vec![
            Node::folder("/a", "a").with_children(vec![Node::file("/a/fresh", "fresh")]),
            Node::folder("/b", "b"),
        ]);
        assert!(state.find("/a/fresh").is_some());
        assert!(state.find("/a/c1").is_none());
        assert!(state.find("/a").unwrap().is_expanded);
    }

    #[test]
    fn collapsed_folder_without_fetch_is_unloaded() {
        let previous_tree = vec![Node::folder("/a", "a")
            .with_children(vec![Node::file("/a/c1", "c1")])];
        let previous = TreeState::index_by_path(&previous_tree);
        let out = TreeState::annotate_with_expansion(
            &ExpansionSet::new(),
            vec![Node::folder("/a", "a")],
            &previous,
            false,
        );
        assert!(!out[0].is_expanded);
        assert!(out[0].children.is_none());
    }

    #[test]
    fn nested_loaded_subtree_survives_ancestor_refresh() {
        let mut state = state_with_loaded_a();
        state.expanded.insert("/a/sub");
        state.merge_children(vec![ChildrenResult {
            path: "/a/sub".into(),
            children: vec![Node::file("/a/sub/deep.txt", "deep.txt")],
        }]);

        // Refresh /a itself: its fresh children arrive unloaded.
        state.merge_children(vec![ChildrenResult {
            path: "/a".into(),
            children: vec![Node::file("/a/c1", "c1"), Node::folder("/a/sub", "sub")],
        }]);
        let sub = state.find("/a/sub").unwrap();
        assert!(sub.is_expanded);
        assert_eq!(sub.children.as_ref().unwrap()[0].name, "deep.txt");
    }

    #[test]
    fn refresh_drops_entries_no_longer_listed() {
        let mut state = state_with_loaded_a();
        state.merge_children(vec![ChildrenResult {
            path: "/a".into(),
            children: vec![Node::folder("/a/sub", "sub")],
        }]);
        assert!(state.find("/a/c1").is_none());
        assert!(state.find("/a/sub").is_some());
    }

    #[test]
    fn merge_is_idempotent() {
        let mut first = state_with_loaded_a();
        let mut second = first.clone();
        let result = vec![ChildrenResult {
            path: "/a".into(),
            children: vec![Node::file("/a/c1", "c1")],
        }];
        first.merge_children(result.clone());
        second.merge_children(result.clone());
        second.merge_children(result);
        assert_eq!(first.nodes, second.nodes);

        first.merge_root(top_level());
        let snapshot = first.nodes.clone();
        first.merge_root(top_level());
        assert_eq!(first.nodes, snapshot);
    }

    #[test]
    fn root_result_replaces_top_level() {
        let mut state = state_with_loaded_a();
        let changed = state.merge_children(vec![ChildrenResult {
            path: "".into(),
            children: vec![Node::folder("/a", "a")],
        }]);
        assert!(changed);
        assert_eq!(state.nodes.len(), 1);
        assert!(state.find("/a/c1").is_some());
    }

    #[test]
    fn topmost_discards_nested_expanded_paths() {
        let mut state = state_with_loaded_a();
        state.expanded.insert("/a/sub");
        state.expanded.insert("/b");
        state.expanded.insert("/gone");
        state.merge_root(top_level());

        let mut topmost = state.topmost_expanded_paths();
        topmost.sort();
        assert_eq!(topmost, vec!["/a".to_string(), "/b".to_string()]);
    }

    #[test]
    fn expanded_unloaded_paths_lists_pending_folders() {
        let mut state = state_with_loaded_a();
        state.expand("/b");
        state.expand("/a/sub");
        let mut pending = state.expanded_unloaded_paths();
        pending.sort();
        assert_eq!(pending, vec!["/a/sub".to_string(), "/b".to_string()]);
    }

    #[test]
    fn collapse_removes_descendant_expansion() {
        let mut state = state_with_loaded_a();
        state.expand("/a/sub");
        state.collapse("/a");
        assert!(!state.expanded.contains("/a"));
        assert!(!state.expanded.contains("/a/sub"));
        let a = state.find("/a").unwrap();
        assert!(!a.is_expanded);
        // Loaded children stay cached while collapsed.
        assert!(a.children.is_some());
    }

    #[test]
    fn expand_reports_when_fetch_is_needed() {
        let mut state = state_with_loaded_a();
        assert!(state.expand("/b"));
        assert!(!state.expand("/a"));
        assert!(!state.expand("/readme.md"));
        assert!(!state.expanded.contains("/readme.md"));
        assert!(state.find("/b").unwrap().is_expanded);
    }

    #[test]
    fn seeds_expansion_from_previous_tree() {
        let mut state = TreeState::new();
        let mut a = Node::folder("/a", "a").with_children(vec![Node::file("/a/c1", "c1")]);
        a.is_expanded = true;
        state.nodes = vec![a, Node::folder("/b", "b")];
        assert!(state.expanded.is_empty());

        state.merge_root(top_level());
        assert!(state.expanded.contains("/a"));
        assert!(!state.expanded.contains("/b"));
        assert!(state.find("/a/c1").is_some());
    }

    #[test]
    fn flatten_lists_visible_rows_only() {
        let mut state = state_with_loaded_a();
        let paths: Vec<String> = state.flatten().into_iter().map(|i| i.path).collect();
        assert_eq!(paths, vec!["/a", "/a/c1", "/a/sub", "/b", "/readme.md"]);

        state.collapse("/a");
        let items = state.flatten();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].depth, 0);
    }

    #[test]
    fn files_never_carry_expansion_or_children() {
        let mut file = Node::file("/f", "f");
        file.is_expanded = true;
        file.children = Some(vec![]);
        let out = TreeState::annotate_with_expansion(
            &ExpansionSet::new(),
            vec![file],
            &HashMap::new(),
            true,
        );
        assert!(!out[0].is_expanded);
        assert!(out[0].children.is_none());
    }
}
