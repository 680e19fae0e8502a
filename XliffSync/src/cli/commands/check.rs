//! CLI command for translation checks

use std::path::Path;
use std::time::Instant;

use crate::check::CheckOptions;
use crate::cli::Context;
use crate::cli::progress::{LOOKING_GLASS, print_done, print_step};
use crate::project::Project;

pub fn execute(
    context: &Context,
    project: &Path,
    target: Option<&Path>,
    missing: bool,
    needs_work: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let settings = context.settings(project)?;
    let project = Project::open(project, settings)?;

    // Without a family flag both run
    let both = !missing && !needs_work;
    let options = CheckOptions {
        check_missing: missing || both,
        check_needs_work: needs_work || both,
        ..project.settings().check()
    };

    if !context.quiet {
        print_step(1, 1, LOOKING_GLASS, "Checking translations...");
    }
    let report = project.check(&options, target);

    if !context.quiet {
        super::print_report(&report);
        let (missing, needs_work) = report.checks().fold((0, 0), |(m, n), (_, check)| {
            (m + check.missing_count, n + check.needs_work_count)
        });
        if options.check_missing && missing == 0 {
            println!("No missing translations have been found!");
        }
        if options.check_needs_work && needs_work == 0 {
            println!("No translations that need work have been found!");
        }
        print_done(started.elapsed());
    }
    if report.fail_count() > 0 {
        anyhow::bail!("{} file(s) could not be checked", report.fail_count());
    }
    Ok(())
}
