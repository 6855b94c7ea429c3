//! Teams and the deterministic name rules used to resolve them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization as _;

use crate::CompetitionId;
use crate::constants::SHORT_CODE_LEN;

/// Stable identifier of a stored team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub i64);

impl From<i64> for TeamId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    /// Canonical display name, unique after normalization.
    pub name: String,
    pub short_code: Option<String>,
    pub competition_id: Option<CompetitionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A known spelling of a team as it appears in source pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamAlias {
    pub alias: &'static str,
    pub canonical: &'static str,
    pub short_code: Option<&'static str>,
}

const fn alias(
    alias: &'static str,
    canonical: &'static str,
    short_code: Option<&'static str>,
) -> TeamAlias {
    TeamAlias { alias, canonical, short_code }
}

/// Scraped spellings seen on fixture pages, mapped to the names teams are stored under.
pub const BUILTIN_ALIASES: &[TeamAlias] = &[
    alias("Brighton", "Brighton & Hove Albion", Some("BHA")),
    alias("Tottenham", "Tottenham Hotspur", Some("TOT")),
    alias("Spurs", "Tottenham Hotspur", Some("TOT")),
    alias("West Ham", "West Ham United", Some("WHU")),
    alias("Nott'ham Forest", "Nottingham Forest", Some("NFO")),
    alias("Newcastle Utd", "Newcastle United", Some("NEW")),
    alias("Wolves", "Wolverhampton Wanderers", Some("WOL")),
    alias("Manchester Utd", "Manchester United", Some("MUN")),
    alias("Man Utd", "Manchester United", Some("MUN")),
    alias("Man City", "Manchester City", Some("MCI")),
    alias("Sheffield Utd", "Sheffield United", Some("SHU")),
    alias("Leeds", "Leeds United", Some("LEE")),
    alias("Leicester", "Leicester City", Some("LEI")),
    alias("Ipswich", "Ipswich Town", Some("IPS")),
];

/// Lookup form of a team name: NFKC, trimmed, single-spaced, lowercase.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let folded: String = raw.nfkc().collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Storage form of a new team name: NFKC, trimmed, single-spaced, case kept.
#[must_use]
pub fn display_name(raw: &str) -> String {
    let folded: String = raw.nfkc().collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Heuristic three-letter code for a team first seen without one.
///
/// One word takes its first three letters, two words take the first letter
/// of the first and two of the second, longer names take the initials of
/// the first three words. Tokens without letters or digits ("&") are ignored.
#[must_use]
pub fn derive_short_code(name: &str) -> Option<String> {
    let words: Vec<Vec<char>> = display_name(name)
        .split(' ')
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<Vec<_>>())
        .filter(|w| !w.is_empty())
        .collect();

    let code: String = match words.as_slice() {
        [] => return None,
        [only] => only.iter().take(SHORT_CODE_LEN).collect(),
        [first, second] => {
            first.iter().take(1).chain(second.iter().take(SHORT_CODE_LEN - 1)).collect()
        },
        many => many.iter().take(SHORT_CODE_LEN).filter_map(|w| w.first()).collect(),
    };

    Some(code.to_uppercase())
}

/// Whether `needle` is a whole-word prefix of `haystack`. Both must already be normalized.
#[must_use]
pub fn is_word_prefix(needle: &str, haystack: &str) -> bool {
    if needle.is_empty() || needle.len() >= haystack.len() {
        return false;
    }
    haystack.starts_with(needle) && haystack[needle.len()..].starts_with(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize_name("  Manchester   CITY "), "manchester city");
        assert_eq!(normalize_name("Arsenal"), normalize_name("arsenal"));
    }

    #[test]
    fn normalize_folds_compatibility_characters() {
        // Full-width letters and non-breaking space fold under NFKC
        assert_eq!(normalize_name("Ａｒｓｅｎａｌ"), "arsenal");
        assert_eq!(normalize_name("West\u{00A0}Ham"), "west ham");
    }

    #[test]
    fn display_name_keeps_case() {
        assert_eq!(display_name("  Crystal   Palace "), "Crystal Palace");
    }

    #[test]
    fn short_code_single_word() {
        assert_eq!(derive_short_code("Arsenal").as_deref(), Some("ARS"));
        assert_eq!(derive_short_code("Chelsea").as_deref(), Some("CHE"));
    }

    #[test]
    fn short_code_two_words() {
        assert_eq!(derive_short_code("Manchester City").as_deref(), Some("MCI"));
        assert_eq!(derive_short_code("Aston Villa").as_deref(), Some("AVI"));
    }

    #[test]
    fn short_code_three_words_skips_symbols() {
        assert_eq!(derive_short_code("Brighton & Hove Albion").as_deref(), Some("BHA"));
        assert_eq!(derive_short_code("West Ham United").as_deref(), Some("WHU"));
    }

    #[test]
    fn short_code_empty_name() {
        assert_eq!(derive_short_code("  & "), None);
    }

    #[test]
    fn word_prefix_requires_word_boundary() {
        assert!(is_word_prefix("manchester", "manchester city"));
        assert!(!is_word_prefix("man", "manchester city"));
        assert!(!is_word_prefix("manchester city", "manchester city"));
        assert!(!is_word_prefix("", "arsenal"));
    }

    #[test]
    fn builtin_aliases_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for a in BUILTIN_ALIASES {
            assert!(seen.insert(normalize_name(a.alias)), "duplicate alias {}", a.alias);
        }
    }
}
