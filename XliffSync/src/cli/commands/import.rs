//! CLI command for importing translations

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::Context;
use crate::cli::progress::{INBOX, print_done, print_step};
use crate::project::Project;

pub fn execute(context: &Context, project: &Path, files: &[PathBuf]) -> anyhow::Result<()> {
    let started = Instant::now();
    let settings = context.settings(project)?;
    let project = Project::open(project, settings)?;

    if !context.quiet {
        print_step(
            1,
            1,
            INBOX,
            &format!("Importing translations from {} file(s)...", files.len()),
        );
    }
    let report = project.import_translations(files);

    if !context.quiet {
        if report.outcomes.is_empty() {
            println!("  No translations imported");
        }
        super::print_report(&report);
        print_done(started.elapsed());
    }
    if report.fail_count() > 0 {
        anyhow::bail!("{} file(s) failed during import", report.fail_count());
    }
    Ok(())
}
