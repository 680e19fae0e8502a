//! File format handlers

pub mod xliff;
pub mod xml;

pub use xliff::{TranslationState, XliffDocument, XliffVersion};
pub use xml::{NodeId, SerializeOptions, XmlChild, XmlFragment, XmlTree};
