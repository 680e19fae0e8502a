use clap::Subcommand;
use console::style;
use std::path::PathBuf;

use super::Context;
use super::progress::WARNING;
use crate::project::{BatchReport, FileOutcome};

pub mod check;
pub mod import;
pub mod new;
pub mod sync;

#[derive(Subcommand)]
pub enum Commands {
    /// Synchronize target files with the generated base file
    Sync {
        /// Project folder holding the translation files
        #[arg(default_value = ".")]
        project: PathBuf,

        /// Synchronize a single target file
        #[arg(short, long, conflicts_with = "all")]
        target: Option<PathBuf>,

        /// Synchronize every target file
        #[arg(short, long)]
        all: bool,
    },

    /// Create target files for new languages
    New {
        /// Project folder holding the translation files
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Target languages (e.g. fr-FR nl-NL)
        #[arg(required = true)]
        languages: Vec<String>,
    },

    /// Check target files for missing translations and translations that need work
    Check {
        /// Project folder holding the translation files
        #[arg(default_value = ".")]
        project: PathBuf,

        /// Check a single target file
        #[arg(short, long)]
        target: Option<PathBuf>,

        /// Check for missing translations
        #[arg(long)]
        missing: bool,

        /// Check for translations that need work
        #[arg(long)]
        needs_work: bool,
    },

    /// Import translations from other XLIFF files
    Import {
        /// Project folder holding the translation files
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Files to import translations from
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

impl Commands {
    pub fn execute(&self, context: &Context) -> anyhow::Result<()> {
        match self {
            Commands::Sync {
                project,
                target,
                all,
            } => sync::execute(context, project, target.as_deref(), *all),
            Commands::New { project, languages } => new::execute(context, project, languages),
            Commands::Check {
                project,
                target,
                missing,
                needs_work,
            } => check::execute(context, project, target.as_deref(), *missing, *needs_work),
            Commands::Import { project, files } => import::execute(context, project, files),
        }
    }
}

/// Print one line per file and the failures of a batch.
pub(crate) fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        let name = outcome.path().display();
        match outcome {
            FileOutcome::Synced { stats, .. } => println!(
                "  Synced {name}: {} units, {} matched, {} missing, {} changed",
                stats.units,
                stats.matched(),
                stats.missing,
                stats.source_changed
            ),
            FileOutcome::Created {
                language, stats, ..
            } => println!("  Created {name} ({language}): {} units", stats.units),
            FileOutcome::Copied { master, .. } => {
                println!("  Copied {name} from {}", master.display());
            }
            FileOutcome::Checked {
                report, written, ..
            } => {
                let line = format!(
                    "  Checked {name}: {} missing, {} need work, {} resolved",
                    report.missing_count, report.needs_work_count, report.resolved_count
                );
                if report.problem_detected() {
                    println!("{WARNING}{}", style(line).yellow());
                } else {
                    println!("{line}");
                }
                if *written {
                    println!("    updated {name}");
                }
            }
            FileOutcome::Imported { count, .. } => {
                println!("  Imported {count} translation(s) into {name}");
            }
            FileOutcome::Skipped { reason, .. } => println!("  Skipped {name}: {reason}"),
            FileOutcome::Failed { .. } => {}
        }
    }

    if report.fail_count() > 0 {
        println!();
        println!("{}", style("Failures:").red().bold());
        for failure in report.failures() {
            if let FileOutcome::Failed { path, error } = failure {
                println!("  {}: {error}", path.display());
            }
        }
    }
}
