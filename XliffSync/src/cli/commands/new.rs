//! CLI command for creating target files

use std::path::Path;
use std::time::Instant;

use crate::cli::Context;
use crate::cli::progress::{DISK, LOOKING_GLASS, batch_bar, print_done, print_step, update_bar};
use crate::project::Project;

pub fn execute(context: &Context, project: &Path, languages: &[String]) -> anyhow::Result<()> {
    let started = Instant::now();
    let settings = context.settings(project)?;

    if !context.quiet {
        print_step(1, 2, LOOKING_GLASS, "Discovering translation files...");
    }
    let project = Project::open(project, settings)?;
    if !context.quiet {
        print_step(
            2,
            2,
            DISK,
            &format!("Creating {} target file(s)...", languages.len()),
        );
    }

    let pb = batch_bar(context.quiet);
    let report = project.create_target_files(languages, |progress| update_bar(&pb, progress))?;
    pb.finish_and_clear();

    if !context.quiet {
        super::print_report(&report);
        print_done(started.elapsed());
    }
    if report.fail_count() > 0 {
        anyhow::bail!("{} file(s) could not be created", report.fail_count());
    }
    Ok(())
}
