//! Synchronization of target catalogs with a generated source catalog
//!
//! # Example
//! ```no_run
//! use xliffsync::config::Settings;
//! use xliffsync::sync::synchronize;
//!
//! let settings = Settings::default();
//! let source = std::fs::read_to_string("Translations/App.g.xlf")?;
//! let target = std::fs::read_to_string("Translations/App.fr-FR.xlf")?;
//! let output = synchronize(&source, Some(&target), None, &settings)?;
//! println!("{} units, {} missing", output.stats.units, output.stats.missing);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod index;
mod matching;
mod merge;
mod translator;
mod types;

pub use index::{MatchIndex, UnitKeys};
pub use matching::{Matcher, UnitMatch};
pub use merge::SOURCE_CHANGED_NOTE;
pub use translator::{new_target, synchronize, synchronize_documents};
pub use types::{
    MatchKind, MatchStrategies, MergeOptions, MergeOutcome, SourceChangePolicy, SyncOptions,
    SyncOutput, SyncStats, TranslationSources, UnitMaps,
};
