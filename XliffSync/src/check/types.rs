//! Checker options, rule names and results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Prefix of every tool note the checker writes.
pub const PROBLEM_NOTE_PREFIX: &str = "Problem detected: ";

/// A needs-work rule, named as in the `needWorkTranslationRules` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedsWorkRule {
    SourceEqualsTarget,
    Placeholders,
    PlaceholdersDevNote,
    OptionMemberCount,
    OptionLeadingSpaces,
    ConsecutiveSpacesExist,
    ConsecutiveSpacesConsistent,
}

impl NeedsWorkRule {
    /// Every rule in evaluation order.
    pub const ALL: [NeedsWorkRule; 7] = [
        NeedsWorkRule::SourceEqualsTarget,
        NeedsWorkRule::Placeholders,
        NeedsWorkRule::PlaceholdersDevNote,
        NeedsWorkRule::OptionMemberCount,
        NeedsWorkRule::OptionLeadingSpaces,
        NeedsWorkRule::ConsecutiveSpacesExist,
        NeedsWorkRule::ConsecutiveSpacesConsistent,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            NeedsWorkRule::SourceEqualsTarget => "SourceEqualsTarget",
            NeedsWorkRule::Placeholders => "Placeholders",
            NeedsWorkRule::PlaceholdersDevNote => "PlaceholdersDevNote",
            NeedsWorkRule::OptionMemberCount => "OptionMemberCount",
            NeedsWorkRule::OptionLeadingSpaces => "OptionLeadingSpaces",
            NeedsWorkRule::ConsecutiveSpacesExist => "ConsecutiveSpacesExist",
            NeedsWorkRule::ConsecutiveSpacesConsistent => "ConsecutiveSpacesConsistent",
        }
    }
}

impl fmt::Display for NeedsWorkRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NeedsWorkRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NeedsWorkRule::ALL
            .into_iter()
            .find(|rule| rule.name() == s)
            .ok_or_else(|| Error::UnknownRule(s.to_string()))
    }
}

/// The enabled needs-work rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<NeedsWorkRule>,
    enable_all: bool,
}

impl RuleSet {
    pub fn new(rules: impl IntoIterator<Item = NeedsWorkRule>, enable_all: bool) -> Self {
        let mut enabled = Vec::new();
        for rule in rules {
            if !enabled.contains(&rule) {
                enabled.push(rule);
            }
        }
        RuleSet {
            rules: enabled,
            enable_all,
        }
    }

    #[must_use]
    pub fn all() -> Self {
        RuleSet::new([], true)
    }

    #[must_use]
    pub fn is_enabled(&self, rule: NeedsWorkRule) -> bool {
        self.enable_all || self.rules.contains(&rule)
    }

    /// Whether any rule is enabled at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.enable_all && self.rules.is_empty()
    }
}

/// What a check run looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckOptions {
    pub check_missing: bool,
    pub check_needs_work: bool,
    pub rules: RuleSet,
    /// Target languages whose translation is expected to equal the source
    pub copy_from_source_for_languages: Vec<String>,
    /// Compare texts with CRLF folded to LF
    pub ignore_line_endings: bool,
}

/// A problem found by a needs-work rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    SourceDiffersFromTarget,
    PlaceholderMismatch,
    PlaceholderUnexplained,
    OptionMemberCount,
    OptionLeadingSpaces,
    ConsecutiveSpacesInSource,
    ConsecutiveSpacesInTranslation,
    ConsecutiveSpacesInconsistent,
}

impl Problem {
    /// The rule that reports this problem.
    #[must_use]
    pub fn rule(self) -> NeedsWorkRule {
        match self {
            Problem::SourceDiffersFromTarget => NeedsWorkRule::SourceEqualsTarget,
            Problem::PlaceholderMismatch => NeedsWorkRule::Placeholders,
            Problem::PlaceholderUnexplained => NeedsWorkRule::PlaceholdersDevNote,
            Problem::OptionMemberCount => NeedsWorkRule::OptionMemberCount,
            Problem::OptionLeadingSpaces => NeedsWorkRule::OptionLeadingSpaces,
            Problem::ConsecutiveSpacesInSource | Problem::ConsecutiveSpacesInTranslation => {
                NeedsWorkRule::ConsecutiveSpacesExist
            }
            Problem::ConsecutiveSpacesInconsistent => NeedsWorkRule::ConsecutiveSpacesConsistent,
        }
    }

    fn description(self) -> &'static str {
        match self {
            Problem::SourceDiffersFromTarget => {
                "The source text is not the same as the translation, but the source-language is the same as the target-language."
            }
            Problem::PlaceholderMismatch => {
                "The number of placeholders in the source and translation text do not match."
            }
            Problem::PlaceholderUnexplained => {
                "One or more placeholders are missing an explanation in the Developer note."
            }
            Problem::OptionMemberCount => {
                "The number of option members in the source and translation text do not match."
            }
            Problem::OptionLeadingSpaces => {
                "The leading spaces in the option values of the source and translation text do not match."
            }
            Problem::ConsecutiveSpacesInSource => "Consecutive spaces exist in the source text.",
            Problem::ConsecutiveSpacesInTranslation => {
                "Consecutive spaces exist in the translation text."
            }
            Problem::ConsecutiveSpacesInconsistent => {
                "The \"consecutive space\"-occurrences in source and translation text do not match."
            }
        }
    }

    /// Text of the tool note attached for this problem.
    #[must_use]
    pub fn note(self) -> String {
        format!("{PROBLEM_NOTE_PREFIX}{}", self.description())
    }
}

/// Outcome of checking one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Units flagged as missing a translation
    pub missing_count: usize,
    /// Units in needs-work state after the check
    pub needs_work_count: usize,
    /// Units whose earlier problem note was removed
    pub resolved_count: usize,
}

impl CheckReport {
    #[must_use]
    pub fn problem_detected(&self) -> bool {
        self.missing_count > 0 || self.needs_work_count > 0
    }

    #[must_use]
    pub fn problem_resolved(&self) -> bool {
        self.resolved_count > 0
    }

    /// Whether the checked document changed and should be written back.
    #[must_use]
    pub fn needs_write(&self) -> bool {
        self.problem_detected() || self.problem_resolved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_names_round_trip() {
        for rule in NeedsWorkRule::ALL {
            assert_eq!(rule.name().parse::<NeedsWorkRule>().unwrap(), rule);
        }
        assert!(matches!(
            "Spelling".parse::<NeedsWorkRule>(),
            Err(Error::UnknownRule(name)) if name == "Spelling"
        ));
    }

    #[test]
    fn test_rule_set() {
        let rules = RuleSet::new([NeedsWorkRule::Placeholders, NeedsWorkRule::Placeholders], false);
        assert!(rules.is_enabled(NeedsWorkRule::Placeholders));
        assert!(!rules.is_enabled(NeedsWorkRule::SourceEqualsTarget));
        assert!(RuleSet::all().is_enabled(NeedsWorkRule::ConsecutiveSpacesConsistent));
        assert!(RuleSet::default().is_empty());
    }

    #[test]
    fn test_problem_notes() {
        assert_eq!(
            Problem::PlaceholderMismatch.note(),
            "Problem detected: The number of placeholders in the source and translation text do not match."
        );
        assert_eq!(
            Problem::ConsecutiveSpacesInTranslation.rule(),
            NeedsWorkRule::ConsecutiveSpacesExist
        );
    }
}
