//! CLI progress display utilities
//!
//! Step indicators with emojis and a progress bar for batch runs over the
//! catalogs of a project.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

use crate::project::BatchProgress;

/// Magnifying glass - for discovery and checks
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Arrows - for synchronization
pub static SYNC: Emoji<'_, '_> = Emoji("🔄 ", "");
/// Floppy disk - for writing
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Inbox - for imports
pub static INBOX: Emoji<'_, '_> = Emoji("📥 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
/// Warning sign - for problems
pub static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "! ");

/// Print a step indicator: `[1/3] 🔍 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

/// Progress bar style for batch runs
///
/// Format: `App.fr-FR.xlf [########--------] 2/4`
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .expect("valid template")
        .progress_chars("##-")
}

/// A progress bar fed by [`BatchProgress`] updates, hidden when `quiet`.
#[must_use]
pub fn batch_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    pb.set_style(bar_style());
    pb
}

/// Apply a batch progress update to `pb`.
pub fn update_bar(pb: &ProgressBar, progress: &BatchProgress) {
    pb.set_length(progress.total as u64);
    pb.set_position(progress.current as u64);
    if let Some(ref name) = progress.current_file {
        pb.set_message(name.clone());
    }
}
