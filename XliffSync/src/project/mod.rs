//! Project folders: catalog discovery and batch sync, check and import
//!
//! # Example
//! ```no_run
//! use xliffsync::config::Settings;
//! use xliffsync::project::Project;
//!
//! let project = Project::open("app", Settings::default())?;
//! let report = project.sync_all(|_| {})?;
//! println!("{} synced, {} failed", report.success_count(), report.fail_count());
//! # Ok::<(), xliffsync::Error>(())
//! ```

mod batch;
mod discovery;
mod import;
mod write;

pub use batch::{BatchProgress, BatchReport, FileOutcome, Project};
pub use discovery::{find_translation_files, new_target_path, resolve_base_file};
pub use import::TranslationMemory;
pub use write::write_atomic;
