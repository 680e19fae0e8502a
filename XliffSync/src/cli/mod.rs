//! XliffSync CLI - Command-line interface for synchronizing and checking catalogs

pub mod commands;
pub mod progress;

use std::path::{Path, PathBuf};

use clap::Parser;
use commands::Commands;
use tracing::Level;

use crate::config::Settings;

/// Editor settings file looked up in the project folder when `--settings` is absent.
const EDITOR_SETTINGS: &str = ".vscode/settings.json";

#[derive(Parser)]
#[command(name = "xliffsync")]
#[command(version)]
#[command(about = "XliffSync: keep XLIFF translation files in sync with the generated base file", long_about = None)]
struct Cli {
    /// JSON settings file (plain, `xliffSync.`-prefixed or nested keys)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log every matching and merge decision
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by all commands.
pub struct Context {
    settings_file: Option<PathBuf>,
    pub quiet: bool,
}

impl Context {
    /// Settings for a run in `project`
    ///
    /// An explicit `--settings` file wins, then the editor settings of the
    /// project folder, then the defaults.
    pub fn settings(&self, project: &Path) -> anyhow::Result<Settings> {
        if let Some(path) = &self.settings_file {
            return Ok(Settings::load(path)?);
        }
        let editor = project.join(EDITOR_SETTINGS);
        if editor.is_file() {
            return Ok(Settings::load(editor)?);
        }
        Ok(Settings::default())
    }
}

/// Run the XliffSync CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let context = Context {
        settings_file: cli.settings,
        quiet: cli.quiet,
    };
    cli.command.execute(&context)?;

    Ok(())
}
