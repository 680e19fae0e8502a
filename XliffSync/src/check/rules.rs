//! Needs-work rules over the flattened texts of a unit

use lazy_static::lazy_static;
use regex::Regex;

use super::types::{NeedsWorkRule, Problem, RuleSet};

lazy_static! {
    /// `%1` or `{0}` style placeholders
    static ref PLACEHOLDER: Regex = Regex::new(r"%[0-9]+|\{[0-9]+\}").unwrap();
    static ref CONSECUTIVE_SPACES: Regex = Regex::new(r"\s\s+").unwrap();
}

/// Generator-note keywords of units holding comma-separated option captions.
const OPTION_KEYWORDS: [&str; 2] = ["Property OptionCaption", "Property PromotedActionCategories"];

/// The texts the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct UnitTexts<'a> {
    pub source: &'a str,
    pub translation: &'a str,
    pub developer_note: &'a str,
    pub generator_note: Option<&'a str>,
    /// Source and target language are expected to carry the same text
    pub source_equals_target_expected: bool,
}

/// The first problem an enabled rule reports, in rule order.
pub fn first_problem(texts: &UnitTexts<'_>, rules: &RuleSet) -> Option<Problem> {
    let UnitTexts {
        source,
        translation,
        developer_note,
        ..
    } = *texts;

    if rules.is_enabled(NeedsWorkRule::SourceEqualsTarget)
        && texts.source_equals_target_expected
        && source != translation
    {
        return Some(Problem::SourceDiffersFromTarget);
    }
    if rules.is_enabled(NeedsWorkRule::Placeholders) && placeholders_mismatch(source, translation) {
        return Some(Problem::PlaceholderMismatch);
    }
    if rules.is_enabled(NeedsWorkRule::PlaceholdersDevNote)
        && placeholders_mismatch(source, developer_note)
    {
        return Some(Problem::PlaceholderUnexplained);
    }

    if is_option_caption(texts.generator_note) {
        if rules.is_enabled(NeedsWorkRule::OptionMemberCount)
            && option_member_count_mismatch(source, translation)
        {
            return Some(Problem::OptionMemberCount);
        }
        if rules.is_enabled(NeedsWorkRule::OptionLeadingSpaces)
            && option_leading_spaces_mismatch(source, translation)
        {
            return Some(Problem::OptionLeadingSpaces);
        }
    }

    if rules.is_enabled(NeedsWorkRule::ConsecutiveSpacesExist) {
        if CONSECUTIVE_SPACES.is_match(source) {
            return Some(Problem::ConsecutiveSpacesInSource);
        }
        if CONSECUTIVE_SPACES.is_match(translation) {
            return Some(Problem::ConsecutiveSpacesInTranslation);
        }
    }
    if rules.is_enabled(NeedsWorkRule::ConsecutiveSpacesConsistent)
        && consecutive_spaces_inconsistent(source, translation)
    {
        return Some(Problem::ConsecutiveSpacesInconsistent);
    }
    None
}

/// Some placeholder of either text is absent from the other.
pub fn placeholders_mismatch(a: &str, b: &str) -> bool {
    missing_placeholders(a, b) || missing_placeholders(b, a)
}

fn missing_placeholders(with_placeholders: &str, to_check: &str) -> bool {
    PLACEHOLDER
        .find_iter(with_placeholders)
        .any(|placeholder| !to_check.contains(placeholder.as_str()))
}

fn is_option_caption(generator_note: Option<&str>) -> bool {
    generator_note.is_some_and(|note| OPTION_KEYWORDS.iter().any(|keyword| note.contains(keyword)))
}

pub fn option_member_count_mismatch(source: &str, translation: &str) -> bool {
    source.matches(',').count() != translation.matches(',').count()
}

/// Members are compared pairwise; a translation with fewer members mismatches.
pub fn option_leading_spaces_mismatch(source: &str, translation: &str) -> bool {
    let mut translated = translation.split(',');
    source.split(',').any(|member| {
        translated
            .next()
            .is_none_or(|other| leading_whitespace(member) != leading_whitespace(other))
    })
}

fn leading_whitespace(text: &str) -> usize {
    text.chars().take_while(|c| c.is_whitespace()).count()
}

/// The whitespace runs of both texts differ in number or length.
pub fn consecutive_spaces_inconsistent(source: &str, translation: &str) -> bool {
    let lengths = |text: &str| -> Vec<usize> {
        CONSECUTIVE_SPACES
            .find_iter(text)
            .map(|run| run.as_str().chars().count())
            .collect()
    };
    lengths(source) != lengths(translation)
}
