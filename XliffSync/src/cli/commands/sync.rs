//! CLI command for synchronizing target files

use std::path::Path;
use std::time::Instant;

use crate::cli::Context;
use crate::cli::progress::{LOOKING_GLASS, SYNC, batch_bar, print_done, print_step, update_bar};
use crate::error::Error;
use crate::project::Project;

pub fn execute(context: &Context, project: &Path, target: Option<&Path>, all: bool) -> anyhow::Result<()> {
    if target.is_none() && !all {
        return Err(Error::NoTargetSpecified.into());
    }
    let started = Instant::now();
    let settings = context.settings(project)?;

    if !context.quiet {
        print_step(1, 2, LOOKING_GLASS, "Discovering translation files...");
    }
    let project = Project::open(project, settings)?;
    if !context.quiet {
        println!("  Base file: {}", project.base_file().display());
        print_step(2, 2, SYNC, "Synchronizing...");
    }

    let pb = batch_bar(context.quiet);
    let report = match target {
        Some(target) => project.sync_file(target, |progress| update_bar(&pb, progress))?,
        None => project.sync_all(|progress| update_bar(&pb, progress))?,
    };
    pb.finish_and_clear();

    if !context.quiet {
        super::print_report(&report);
        print_done(started.elapsed());
    }
    if report.fail_count() > 0 {
        anyhow::bail!("{} file(s) failed to synchronize", report.fail_count());
    }
    Ok(())
}
