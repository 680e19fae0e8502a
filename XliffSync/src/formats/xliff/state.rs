//! Version-independent translation state and XLIFF versions

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Supported XLIFF versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XliffVersion {
    /// XLIFF 1.2
    V12,
    /// XLIFF 2.0
    V20,
}

impl XliffVersion {
    /// The value of the root `version` attribute.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            XliffVersion::V12 => "1.2",
            XliffVersion::V20 => "2.0",
        }
    }
}

impl fmt::Display for XliffVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for XliffVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.2" => Ok(XliffVersion::V12),
            "2.0" => Ok(XliffVersion::V20),
            other => Err(Error::UnsupportedVersion {
                version: Some(other.to_string()),
            }),
        }
    }
}

/// Translation state of a unit, independent of the XLIFF version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationState {
    /// No usable translation yet.
    Missing,
    /// A translation exists but has to be reviewed.
    NeedsWork,
    /// Translated.
    Translated,
}

impl fmt::Display for TranslationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TranslationState::Missing => "missing",
            TranslationState::NeedsWork => "needs work",
            TranslationState::Translated => "translated",
        };
        f.write_str(name)
    }
}
