//! Planning of drag-and-drop and cut/paste moves.
//!
//! `plan` is pure: it never touches the backend and never checks for entries
//! already present at the destination. That pre-flight happens in the
//! explorer right before execution.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExplorerError, Result};
use crate::fs::path::{
    base_name, get_parent_directory_path, is_descendant_path, join_path_segments,
    normalize_dir_path, path_depth, sanitize_name, PLACEHOLDER_NAME, ROOT,
};
use crate::fs::tree::NodeKind;

/// One dragged or cut item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoveDescriptor {
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<NodeKind>,
}

impl MoveDescriptor {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: None,
            kind: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// A single planned move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOperation {
    pub source: String,
    pub destination: String,
}

/// Output of [`plan`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MovePlan {
    pub operations: Vec<MoveOperation>,
    /// Sources left out because moving them would be redundant or a no-op.
    pub skipped: Vec<String>,
}

impl MovePlan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

struct Candidate {
    source: String,
    name: String,
    depth: usize,
}

/// Turn a selection into a minimal, conflict-free list of moves into
/// `destination_dir`.
///
/// Redundant, self-targeted, already-in-place and cyclic moves are skipped.
/// Two items resolving to the same destination is an error and rejects the
/// whole batch.
pub fn plan(descriptors: &[MoveDescriptor], destination_dir: &str) -> Result<MovePlan> {
    let destination_dir = normalize_dir_path(destination_dir);

    let mut seen = HashSet::new();
    let mut candidates: Vec<Candidate> = Vec::new();
    for descriptor in descriptors {
        let source = normalize_dir_path(&descriptor.path);
        if source == ROOT || !seen.insert(source.clone()) {
            continue;
        }
        let raw_name = descriptor
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| {
                let base = base_name(&source);
                if base.is_empty() {
                    PLACEHOLDER_NAME.to_string()
                } else {
                    base
                }
            });
        let name = sanitize_name(&raw_name);
        if name.trim().is_empty() {
            debug!(source = %source, "dropping move descriptor with empty name");
            continue;
        }
        candidates.push(Candidate {
            depth: path_depth(&source),
            source,
            name,
        });
    }

    // Stable: equal depths keep selection order.
    candidates.sort_by_key(|c| c.depth);

    let mut plan = MovePlan::default();
    let mut claimed: HashMap<String, String> = HashMap::new();

    for candidate in &candidates {
        let source = &candidate.source;

        if candidates
            .iter()
            .any(|other| is_descendant_path(&other.source, source))
        {
            plan.skipped.push(source.clone());
            continue;
        }

        if *source == destination_dir
            || get_parent_directory_path(source) == destination_dir
            || is_descendant_path(source, &destination_dir)
        {
            plan.skipped.push(source.clone());
            continue;
        }

        let destination = join_path_segments(&destination_dir, &candidate.name);
        if let Some(other_source) = claimed.get(&destination) {
            return Err(ExplorerError::NamingConflict {
                destination,
                source_path: source.clone(),
                other_source: other_source.clone(),
            });
        }
        claimed.insert(destination.clone(), source.clone());
        plan.operations.push(MoveOperation {
            source: source.clone(),
            destination,
        });
    }

    debug!(
        destination = %destination_dir,
        operations = plan.operations.len(),
        skipped = plan.skipped.len(),
        "planned move batch"
    );
    Ok(plan)
}
