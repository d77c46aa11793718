//! CLI Tooling
//!
//! Command-line interface over [`OrderEngine`] for real directories. Paths
//! are resolved against the workspace root; records are kept wherever the
//! loaded configuration puts them.

use crate::config::{ConfigLoader, OrderConfig};
use crate::engine::{EngineOptions, OrderEngine};
use crate::error::OrderError;
use crate::key::derive_key;
use crate::logging::resolve_log_file_path;
use crate::mutation::OrderChange;
use crate::storage::LocalFsStorage;
use crate::types::{DirectoryIdentity, EntryKind};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::Table;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// dirorder - persistent custom ordering of directory children
#[derive(Parser)]
#[command(name = "dirorder")]
#[command(about = "Keep a custom order for the children of each directory")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the effective order of a directory
    List {
        dir: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Insert a name at a position
    Add {
        dir: PathBuf,
        name: String,
        index: usize,
    },
    /// Remove the entry at a position
    Remove { dir: PathBuf, index: usize },
    /// Exchange two entries
    Swap { dir: PathBuf, a: usize, b: usize },
    /// Move entries as one block
    Move {
        dir: PathBuf,
        /// Positions of the entries to move
        #[arg(required = true)]
        indices: Vec<usize>,
        /// Destination in the order with the moved entries taken out
        #[arg(long)]
        to: usize,
    },
    /// Rename the entry at a position, keeping its place
    Rename {
        dir: PathBuf,
        index: usize,
        new_name: String,
    },
    /// Move or copy the records of a directory tree after it moved on disk
    Relocate {
        from: PathBuf,
        to: PathBuf,
        /// The tree was copied rather than moved
        #[arg(long)]
        copy: bool,
    },
    /// Show the storage key and record path of a directory
    Key { dir: PathBuf },
    /// Show the effective configuration
    Config,
}

/// CLI context: loaded configuration plus the engine it describes.
pub struct CliContext {
    workspace_root: PathBuf,
    config: OrderConfig,
    engine: OrderEngine,
}

impl CliContext {
    /// Load configuration for the workspace, apply logging flags and build the engine.
    pub fn new(cli: &Cli) -> Result<Self, OrderError> {
        let workspace_root = dunce::canonicalize(&cli.workspace).map_err(|e| {
            OrderError::ConfigError(format!(
                "Failed to resolve workspace {}: {}",
                cli.workspace.display(),
                e
            ))
        })?;

        let mut config = match &cli.config {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(&workspace_root),
        }
        .map_err(|e| OrderError::ConfigError(e.to_string()))?;
        apply_log_overrides(&mut config, cli, &workspace_root)?;

        let options = EngineOptions::from_config(&config, &workspace_root)?;
        let engine = OrderEngine::new(Arc::new(LocalFsStorage::new()), options);

        Ok(Self {
            workspace_root,
            config,
            engine,
        })
    }

    pub fn config(&self) -> &OrderConfig {
        &self.config
    }

    pub fn engine(&self) -> &OrderEngine {
        &self.engine
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: &Commands) -> Result<String, OrderError> {
        let output = self.run(command).await;
        let stats = self.engine.cache_stats();
        debug!(
            hits = stats.hits,
            misses = stats.misses,
            hit_ratio = stats.hit_ratio(),
            "Cache statistics"
        );
        output
    }

    async fn run(&self, command: &Commands) -> Result<String, OrderError> {
        match command {
            Commands::List { dir, format } => {
                let dir = self.identity(dir);
                let order = self.engine.effective_order(&dir).await?;
                self.format_order(&dir, &order, *format).await
            }
            Commands::Add { dir, name, index } => {
                self.change(
                    dir,
                    OrderChange::Add {
                        name: name.clone(),
                        index: *index,
                    },
                )
                .await
            }
            Commands::Remove { dir, index } => {
                self.change(dir, OrderChange::Remove { index: *index }).await
            }
            Commands::Swap { dir, a, b } => self.change(dir, OrderChange::Swap { a: *a, b: *b }).await,
            Commands::Move { dir, indices, to } => {
                self.change(
                    dir,
                    OrderChange::MoveLot {
                        indices: indices.clone(),
                        destination: *to,
                    },
                )
                .await
            }
            Commands::Rename {
                dir,
                index,
                new_name,
            } => {
                self.change(
                    dir,
                    OrderChange::Update {
                        name: new_name.clone(),
                        index: *index,
                    },
                )
                .await
            }
            Commands::Relocate { from, to, copy } => {
                let relocated = self
                    .engine
                    .relocate_tree(&self.identity(from), &self.identity(to), !copy)
                    .await?;
                Ok(format!(
                    "{} {} record(s)",
                    if *copy { "Copied" } else { "Moved" },
                    relocated
                ))
            }
            Commands::Key { dir } => {
                let dir = self.identity(dir);
                Ok(format!(
                    "key:    {}\nrecord: {}",
                    derive_key(&dir),
                    self.engine.record_path(&dir).display()
                ))
            }
            Commands::Config => toml::to_string_pretty(&self.config)
                .map_err(|e| OrderError::ConfigError(format!("Failed to render config: {}", e))),
        }
    }

    async fn change(&self, dir: &Path, change: OrderChange) -> Result<String, OrderError> {
        let dir = self.identity(dir);
        let kind = change.kind();
        let order = self.engine.apply_change(&dir, change).await?;
        info!(directory = %dir, change = kind, "Applied order change");
        self.format_order(&dir, &order, OutputFormat::Text).await
    }

    /// Absolute identity for a path given on the command line.
    fn identity(&self, path: &Path) -> DirectoryIdentity {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };
        // A moved-away source no longer exists; keep the joined path then.
        DirectoryIdentity::new(dunce::canonicalize(&absolute).unwrap_or(absolute))
    }

    async fn format_order(
        &self,
        dir: &DirectoryIdentity,
        order: &[String],
        format: OutputFormat,
    ) -> Result<String, OrderError> {
        if format == OutputFormat::Json {
            return Ok(format!("{:#}", serde_json::Value::from(order.to_vec())));
        }

        let kinds: HashMap<String, EntryKind> = self
            .engine
            .list_children(dir)
            .await?
            .into_iter()
            .map(|child| (child.name, child.kind))
            .collect();

        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["#", "Name", "Kind"]);
        for (index, name) in order.iter().enumerate() {
            let kind = match kinds.get(name) {
                Some(EntryKind::Directory) => "dir",
                Some(EntryKind::File) => "file",
                None => "-",
            };
            table.add_row(vec![index.to_string(), name.clone(), kind.to_string()]);
        }
        Ok(table.to_string())
    }
}

fn apply_log_overrides(config: &mut OrderConfig, cli: &Cli, workspace_root: &Path) -> Result<(), OrderError> {
    let logging = &mut config.logging;
    if let Some(level) = &cli.log_level {
        logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        logging.output = output.clone();
    }
    if logging.output.contains("file") || cli.log_file.is_some() {
        logging.file = Some(resolve_log_file_path(
            cli.log_file.clone(),
            logging.file.clone(),
            Some(workspace_root),
        )?);
    }
    Ok(())
}
