//! XLIFF 1.2 / 2.0 document abstraction
//!
//! # Example
//! ```no_run
//! use xliffsync::config::DocumentSettings;
//! use xliffsync::formats::xliff::XliffDocument;
//!
//! let doc = XliffDocument::read("Translations/App.fr-FR.xlf", DocumentSettings::default())?;
//! for &unit in doc.translation_units() {
//!     println!("{:?}: {:?}", doc.unit_id(unit), doc.state(unit));
//! }
//! # Ok::<(), xliffsync::Error>(())
//! ```

mod document;
mod schema;
mod state;

pub use document::{XLIFF_SYNC_NOTE_DESIGNATION, XliffDocument};
pub use schema::{Xliff12, Xliff20, XliffSchema, schema_for};
pub use state::{TranslationState, XliffVersion};
