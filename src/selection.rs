//! Multi-select and range-select over an ordered item list.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::fs::tree::FlatItem;

/// Items that can be tracked by a [`SelectionModel`].
pub trait Selectable {
    fn selection_id(&self) -> &str;
}

impl Selectable for FlatItem {
    fn selection_id(&self) -> &str {
        &self.id
    }
}

impl Selectable for String {
    fn selection_id(&self) -> &str {
        self
    }
}

/// Keyboard/mouse modifiers accompanying a selection gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }
}

/// Keyboard navigation directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Home,
    End,
}

/// Behaviour switches for the selection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionOptions {
    /// Ctrl/Cmd toggles individual items.
    pub multi_select: bool,
    /// Shift extends a contiguous range from the anchor.
    pub range_select: bool,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            multi_select: true,
            range_select: true,
        }
    }
}

/// Owned copy of the selection handed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    /// Selected ids in item order.
    pub selected_ids: Vec<String>,
    pub anchor_id: Option<String>,
    pub last_selected_id: Option<String>,
}

/// Handle returned by [`SelectionModel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&SelectionSnapshot) + Send>;

/// Selection over an ordered list of items.
///
/// Ids that are not in the current list are ignored by every operation.
pub struct SelectionModel<T: Selectable> {
    items: Vec<T>,
    index: HashMap<String, usize>,
    selected: HashSet<String>,
    anchor_id: Option<String>,
    last_selected_id: Option<String>,
    options: SelectionOptions,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<T: Selectable> Default for SelectionModel<T> {
    fn default() -> Self {
        Self::new(SelectionOptions::default())
    }
}

impl<T: Selectable> SelectionModel<T> {
    pub fn new(options: SelectionOptions) -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            selected: HashSet::new(),
            anchor_id: None,
            last_selected_id: None,
            options,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Replace the backing list and prune state that no longer applies.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.index = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.selection_id().to_string(), i))
            .collect();
        self.items = items;

        let index = &self.index;
        self.selected.retain(|id| index.contains_key(id));
        if self
            .anchor_id
            .as_ref()
            .is_some_and(|id| !index.contains_key(id))
        {
            self.anchor_id = None;
        }
        if self
            .last_selected_id
            .as_ref()
            .is_some_and(|id| !index.contains_key(id))
        {
            self.last_selected_id = None;
        }
        self.notify();
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Select `id` according to the gesture modifiers.
    pub fn select(&mut self, id: &str, modifiers: Modifiers) {
        let Some(&target) = self.index.get(id) else {
            trace!(id, "select ignored: unknown id");
            return;
        };

        let anchor_index = self
            .anchor_id
            .as_ref()
            .and_then(|anchor| self.index.get(anchor).copied());

        match anchor_index {
            Some(anchor) if modifiers.shift && self.options.range_select => {
                let (start, end) = if anchor <= target {
                    (anchor, target)
                } else {
                    (target, anchor)
                };
                self.selected = self.items[start..=end]
                    .iter()
                    .map(|item| item.selection_id().to_string())
                    .collect();
            }
            _ if (modifiers.ctrl || modifiers.meta) && self.options.multi_select => {
                if !self.selected.remove(id) {
                    self.selected.insert(id.to_string());
                }
                self.anchor_id = Some(id.to_string());
            }
            _ => {
                self.selected.clear();
                self.selected.insert(id.to_string());
                self.anchor_id = Some(id.to_string());
            }
        }

        self.last_selected_id = Some(id.to_string());
        self.notify();
    }

    pub fn select_all(&mut self) {
        self.selected = self.index.keys().cloned().collect();
        self.notify();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.anchor_id = None;
        self.last_selected_id = None;
        self.notify();
    }

    /// Move the selection with the keyboard.
    ///
    /// The target is computed from the last selected item, then selected with
    /// the same modifier rules as a click, so shift extends from the anchor.
    pub fn navigate_selection(&mut self, direction: Direction, modifiers: Modifiers) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let current: isize = self
            .last_selected_id
            .as_ref()
            .and_then(|id| self.index.get(id))
            .map_or(-1, |&i| i as isize);
        let last = len as isize - 1;

        let target = match direction {
            Direction::Up => (current - 1).max(0),
            Direction::Down => (current + 1).min(last),
            Direction::Home => 0,
            Direction::End => last,
        };

        let id = self.items[target as usize].selection_id().to_string();
        self.select(&id, modifiers);
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selection_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected items in list order.
    pub fn selected_items(&self) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| self.selected.contains(item.selection_id()))
            .collect()
    }

    /// Selected ids in list order.
    pub fn selected_ids(&self) -> Vec<String> {
        self.selected_items()
            .into_iter()
            .map(|item| item.selection_id().to_string())
            .collect()
    }

    pub fn anchor_id(&self) -> Option<&str> {
        self.anchor_id.as_deref()
    }

    pub fn last_selected_id(&self) -> Option<&str> {
        self.last_selected_id.as_deref()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            selected_ids: self.selected_ids(),
            anchor_id: self.anchor_id.clone(),
            last_selected_id: self.last_selected_id.clone(),
        }
    }

    /// Register a listener called after every mutating operation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&SelectionSnapshot) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn notify(&self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, listener) in &self.listeners {
            listener(&snapshot);
        }
    }
}
