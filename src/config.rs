//! Explorer configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--config`, `--hidden`, `--no-watcher`, etc.)
//! 2. `$EXPLORER_CONFIG` environment variable (path to config file)
//! 3. Project-local `.explorer.toml` in the current working directory
//! 4. Global `~/.config/explorer/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::explorer::ExplorerOptions;
use crate::fs::debounce::DEFAULT_DEBOUNCE_MS;
use crate::fs::watcher::DEFAULT_IGNORE_PATTERNS;
use crate::selection::SelectionOptions;

// ── Section configs ──────────────────────────────────────────────────────────

/// General explorer settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory exposed as `/` (overridden by CLI positional arg).
    pub root: Option<String>,
    /// Include hidden entries in listings.
    pub include_hidden: Option<bool>,
    /// Directories always listed first.
    pub dirs_first: Option<bool>,
}

/// Selection behaviour.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SelectionConfig {
    /// Ctrl/Cmd-click toggles items.
    pub multi_select: Option<bool>,
    /// Shift-click selects ranges.
    pub range_select: Option<bool>,
}

/// Change notification settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WatcherConfig {
    /// Watch the root for changes and refresh automatically.
    pub enabled: Option<bool>,
    /// Quiet window in milliseconds.
    pub debounce_ms: Option<u64>,
    /// Path components whose changes are ignored.
    pub ignore: Option<Vec<String>>,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub selection: SelectionConfig,
    pub watcher: WatcherConfig,
    pub log: LogConfig,
}

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// The `--config` path is handled by the caller.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("EXPLORER_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".explorer.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("explorer").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            // Runs before logging::init, so tracing would drop this.
            eprintln!("Warning: failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; its `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                root: other.general.root.clone().or(self.general.root),
                include_hidden: other.general.include_hidden.or(self.general.include_hidden),
                dirs_first: other.general.dirs_first.or(self.general.dirs_first),
            },
            selection: SelectionConfig {
                multi_select: other.selection.multi_select.or(self.selection.multi_select),
                range_select: other.selection.range_select.or(self.selection.range_select),
            },
            watcher: WatcherConfig {
                enabled: other.watcher.enabled.or(self.watcher.enabled),
                debounce_ms: other.watcher.debounce_ms.or(self.watcher.debounce_ms),
                ignore: other.watcher.ignore.clone().or(self.watcher.ignore),
            },
            log: LogConfig {
                level: other.log.level.clone().or(self.log.level),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that highest-priority (env var) overwrites lower.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn root(&self) -> &str {
        self.general.root.as_deref().unwrap_or(".")
    }

    pub fn include_hidden(&self) -> bool {
        self.general.include_hidden.unwrap_or(false)
    }

    pub fn dirs_first(&self) -> bool {
        self.general.dirs_first.unwrap_or(true)
    }

    pub fn multi_select(&self) -> bool {
        self.selection.multi_select.unwrap_or(true)
    }

    pub fn range_select(&self) -> bool {
        self.selection.range_select.unwrap_or(true)
    }

    pub fn watcher_enabled(&self) -> bool {
        self.watcher.enabled.unwrap_or(true)
    }

    pub fn debounce_ms(&self) -> u64 {
        self.watcher.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }

    pub fn ignore_patterns(&self) -> Vec<String> {
        match &self.watcher.ignore {
            Some(patterns) => patterns.clone(),
            None => DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Options for the explorer core.
    pub fn explorer_options(&self) -> ExplorerOptions {
        ExplorerOptions {
            include_hidden: self.include_hidden(),
            selection: SelectionOptions {
                multi_select: self.multi_select(),
                range_select: self.range_select(),
            },
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
