//! Linear issue identifier extraction.
//!
//! Identifiers have the form `TEAM-NUMBER`. They are found anywhere in a
//! branch name or commit message, matched without regard to ASCII case, and
//! always reported uppercase.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// A set of normalized issue identifiers such as `ENG-123`.
pub type IssueIds = BTreeSet<String>;

/// Errors raised while building an [`IssueMatcher`].
#[derive(Error, Debug)]
pub enum MatcherError {
    /// A team key was empty.
    #[error("team keys must not be empty strings")]
    EmptyTeamKey,

    /// The team key alternation could not be compiled.
    #[error("failed to build issue pattern from team keys: {0}")]
    Pattern(#[from] regex::Error),
}

// Any run of letters followed by a maximal run of digits.
#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static ANY_TEAM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i-u:[a-z]+)-[0-9]+").unwrap());

/// Finds issue identifiers in free-form text.
///
/// Without team keys any letter prefix is accepted. With team keys only the
/// listed prefixes are recognised; keys are matched literally (escaped) and
/// ASCII case-insensitively, so they should be given uppercase.
#[derive(Debug, Clone)]
pub struct IssueMatcher {
    pattern: Regex,
    team_keys: Option<Vec<String>>,
}

impl IssueMatcher {
    /// Builds a matcher for the given team keys.
    ///
    /// `None` and an empty list both mean "any team".
    pub fn new(team_keys: Option<&[String]>) -> Result<Self, MatcherError> {
        let team_keys = team_keys.filter(|keys| !keys.is_empty());

        let Some(keys) = team_keys else {
            return Ok(Self {
                pattern: ANY_TEAM_PATTERN.clone(),
                team_keys: None,
            });
        };

        if keys.iter().any(String::is_empty) {
            return Err(MatcherError::EmptyTeamKey);
        }

        let alternation = keys
            .iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!("(?i-u:{alternation})-[0-9]+"))?;

        Ok(Self {
            pattern,
            team_keys: Some(keys.to_vec()),
        })
    }

    /// Returns a matcher that accepts any team prefix.
    pub fn any_team() -> Self {
        Self {
            pattern: ANY_TEAM_PATTERN.clone(),
            team_keys: None,
        }
    }

    /// Returns the team keys this matcher is scoped to, if any.
    pub fn team_keys(&self) -> Option<&[String]> {
        self.team_keys.as_deref()
    }

    /// Extracts the identifiers contained in `text`.
    ///
    /// A match that starts directly after another letter is ignored, so a
    /// team key is never recognised inside a longer word. Whatever follows
    /// the digits does not matter: `SD-1681_block` and `SD-1681x` both yield
    /// `SD-1681`.
    pub fn extract(&self, text: &str) -> IssueIds {
        self.pattern
            .find_iter(text)
            .filter(|m| starts_at_word_edge(text, m.start()))
            .map(|m| m.as_str().to_ascii_uppercase())
            .collect()
    }

    /// Extracts identifiers from several texts into one set.
    pub fn extract_all<'a, I>(&self, texts: I) -> IssueIds
    where
        I: IntoIterator<Item = &'a str>,
    {
        texts
            .into_iter()
            .flat_map(|text| self.extract(text))
            .collect()
    }

    /// Returns `true` when `text` contains at least one identifier.
    pub fn has_issue(&self, text: &str) -> bool {
        self.pattern
            .find_iter(text)
            .any(|m| starts_at_word_edge(text, m.start()))
    }
}

/// Whether the character before `start` is absent or not a letter.
fn starts_at_word_edge(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_ascii_alphabetic())
}
