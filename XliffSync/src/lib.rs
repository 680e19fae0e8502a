#![allow(non_snake_case)]
//! # XliffSync
//!
//! Keeps XLIFF 1.2 and 2.0 translation catalogs in step with the catalog a build
//! generates for the base language.
//!
//! - **Sync** - merge every target catalog with the regenerated base catalog,
//!   keeping translations, notes and formatting of matched units
//! - **Check** - flag missing translations and translations that need work
//! - **Import** - fill catalogs from translations found in other catalogs
//!
//! ## Quick Start
//!
//! ### Synchronizing a catalog
//!
//! ```no_run
//! use xliffsync::config::Settings;
//! use xliffsync::sync::synchronize;
//!
//! let settings = Settings::default();
//! let base = std::fs::read_to_string("Translations/App.g.xlf")?;
//! let output = synchronize(&base, None, Some("fr-FR"), &settings)?;
//! std::fs::write("Translations/App.fr-FR.xlf", output.content)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Checking a catalog
//!
//! ```no_run
//! use xliffsync::check::check_document;
//! use xliffsync::config::Settings;
//! use xliffsync::formats::XliffDocument;
//!
//! let settings = Settings::default();
//! let mut target = XliffDocument::read("Translations/App.fr-FR.xlf", settings.document())?;
//! let report = check_document(&mut target, &settings.check());
//! println!("{} missing, {} need work", report.missing_count, report.needs_work_count);
//! # Ok::<(), xliffsync::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `xliffsync` command-line binary

pub mod check;
pub mod config;
pub mod error;
pub mod formats;
pub mod project;
pub mod sync;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::config::{DocumentSettings, Settings};
    pub use crate::formats::xliff::{TranslationState, XliffDocument, XliffVersion};
    pub use crate::formats::xml::{NodeId, XmlFragment, XmlTree};

    pub use crate::sync::{
        MatchIndex, MatchKind, Matcher, SyncOutput, SyncStats, synchronize, synchronize_documents,
    };
    pub use crate::check::{CheckOptions, CheckReport, NeedsWorkRule, RuleSet, check_document};
    pub use crate::project::{BatchReport, FileOutcome, Project};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
