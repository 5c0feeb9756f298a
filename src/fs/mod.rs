pub mod debounce;
pub mod local;
pub mod move_plan;
pub mod path;
pub mod tree;
pub mod watcher;
