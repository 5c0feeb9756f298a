use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use explorer_sync::config::{AppConfig, GeneralConfig, WatcherConfig};
use explorer_sync::error::{self, ExplorerError};
use explorer_sync::event::{Event, EventHandler};
use explorer_sync::explorer::{Explorer, MoveReport};
use explorer_sync::fs::debounce::ChangeNotificationDebouncer;
use explorer_sync::fs::local::LocalBackend;
use explorer_sync::fs::move_plan::MoveDescriptor;
use explorer_sync::fs::path::ROOT;
use explorer_sync::fs::tree::NodeKind;
use explorer_sync::fs::watcher::FsWatcher;
use explorer_sync::logging;

/// Keep a directory tree in sync with the filesystem and move items around.
#[derive(Parser, Debug)]
#[command(name = "explorer", version, about)]
struct Cli {
    /// Directory exposed as the explorer root (defaults to current directory)
    path: Option<PathBuf>,

    /// Config file read on top of the discovered ones
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Include hidden entries
    #[arg(long)]
    hidden: bool,

    /// Print the tree once and exit instead of watching for changes
    #[arg(long)]
    no_watcher: bool,

    /// Expand a folder (explorer path, repeatable)
    #[arg(long = "expand", value_name = "PATH")]
    expand: Vec<String>,

    /// Items to move (explorer paths), requires --to
    #[arg(long = "move", value_name = "SRC", num_args = 1.., requires = "to")]
    sources: Vec<String>,

    /// Destination folder for --move
    #[arg(long, value_name = "DEST", requires = "sources")]
    to: Option<String>,

    /// Print JSON instead of an indented tree
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Config values set by flags; unset flags leave the files in charge.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                root: self.path.as_ref().map(|p| p.display().to_string()),
                include_hidden: self.hidden.then_some(true),
                ..Default::default()
            },
            watcher: WatcherConfig {
                enabled: self.no_watcher.then_some(false),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    logging::init(config.log_level());

    let root = Path::new(config.root()).canonicalize().map_err(|_| {
        ExplorerError::InvalidPath(format!("{} does not exist", config.root()))
    })?;
    let backend = LocalBackend::new(&root).with_dirs_first(config.dirs_first());
    let mut explorer = Explorer::new(config.explorer_options());

    explorer.refresh(&backend, ROOT, false).await?;
    for path in &cli.expand {
        explorer.expand(&backend, path).await?;
    }

    if let Some(destination) = &cli.to {
        let descriptors: Vec<MoveDescriptor> = cli
            .sources
            .iter()
            .map(|source| describe(&explorer, source))
            .collect();
        let report = explorer
            .move_items(&backend, &backend, &descriptors, destination)
            .await?;
        print_report(&report, cli.json)?;
        return match report.failed {
            Some((op, message)) => Err(ExplorerError::Io(io::Error::other(format!(
                "moving {} failed: {}",
                op.source, message
            )))),
            None => Ok(()),
        };
    }

    print_tree(&explorer, cli.json)?;
    if !config.watcher_enabled() {
        return Ok(());
    }

    let (notify_tx, notify_rx) = mpsc::unbounded_channel();
    let _watcher = match FsWatcher::new(&backend, config.ignore_patterns(), notify_tx) {
        Ok(watcher) => watcher,
        Err(e) => {
            warn!(error = %e, "watcher unavailable; exiting");
            return Ok(());
        }
    };

    // The last expanded folder is the one refreshed first.
    let focus = cli.expand.last().cloned().unwrap_or_else(|| ROOT.to_string());
    let (_target_tx, target_rx) = watch::channel(focus);
    let (_connectivity_tx, connectivity_rx) = watch::channel(true);
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let debouncer = ChangeNotificationDebouncer::new(
        Duration::from_millis(config.debounce_ms()),
        target_rx,
    );
    tokio::spawn(debouncer.run(notify_rx, connectivity_rx, request_tx));

    let mut events = EventHandler::new();
    events.forward_refreshes(request_rx);
    events.listen_for_shutdown();
    info!(root = %root.display(), "watching for changes");

    loop {
        match events.next().await? {
            Event::Refresh(request) => {
                if let Err(e) = explorer
                    .refresh(&backend, &request.path, request.forced)
                    .await
                {
                    warn!(path = %request.path, error = %e, "refresh failed");
                    continue;
                }
                print_tree(&explorer, cli.json)?;
            }
            Event::Shutdown => break,
        }
    }

    Ok(())
}

/// Describe a source for the planner, using the cached node when loaded.
fn describe(explorer: &Explorer, source: &str) -> MoveDescriptor {
    match explorer.tree().find(source) {
        Some(node) => MoveDescriptor::new(&node.path)
            .with_name(&node.name)
            .with_kind(node.kind),
        None => MoveDescriptor::new(source),
    }
}

fn print_tree(explorer: &Explorer, json: bool) -> error::Result<()> {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer(&mut out, &explorer.tree().nodes)?;
        writeln!(out)?;
        return Ok(());
    }
    for item in explorer.tree().flatten() {
        let marker = match (item.kind, item.is_expanded) {
            (NodeKind::Folder, true) => "▾ ",
            (NodeKind::Folder, false) => "▸ ",
            (NodeKind::File, _) => "  ",
        };
        writeln!(out, "{}{}{}", "  ".repeat(item.depth), marker, item.name)?;
    }
    writeln!(out)?;
    Ok(())
}

fn print_report(report: &MoveReport, json: bool) -> error::Result<()> {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer(&mut out, report)?;
        writeln!(out)?;
        return Ok(());
    }
    for op in &report.completed {
        writeln!(out, "moved {} -> {}", op.source, op.destination)?;
    }
    for path in &report.plan.skipped {
        writeln!(out, "skipped {}", path)?;
    }
    if let Some((op, message)) = &report.failed {
        writeln!(out, "failed {} -> {}: {}", op.source, op.destination, message)?;
    }
    if let Some(message) = &report.refresh_error {
        writeln!(out, "moves finished but the destination could not be re-listed: {}", message)?;
    }
    Ok(())
}
