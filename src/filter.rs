//! Active filter predicates and their application to the collection.

use crate::repository::Repository;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A recognised filter key. `lang` is accepted as an alias of `language`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    Language,
    Fork,
    Year,
}

impl FromStr for FilterKey {
    type Err = String;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key.trim().to_lowercase().as_str() {
            "language" | "lang" => Ok(FilterKey::Language),
            "fork" => Ok(FilterKey::Fork),
            "year" => Ok(FilterKey::Year),
            other => Err(format!("unknown filter key '{}'", other)),
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterKey::Language => "language",
            FilterKey::Fork => "fork",
            FilterKey::Year => "year",
        };
        f.write_str(name)
    }
}

/// Parses a `key=value` token.
///
/// Returns `None` for malformed tokens (no `=`, empty key) and for keys that
/// are not recognised.
pub fn parse_assignment(token: &str) -> Option<(FilterKey, String)> {
    let Some((key, value)) = token.split_once('=') else {
        debug!("Skipping malformed filter token '{}'", token);
        return None;
    };
    if key.trim().is_empty() {
        debug!("Skipping filter token with empty key '{}'", token);
        return None;
    }
    match key.parse::<FilterKey>() {
        Ok(key) => Some((key, value.trim().to_string())),
        Err(reason) => {
            debug!("Ignoring filter token '{}': {}", token, reason);
            None
        }
    }
}

/// Resolves a `fork=` value to a boolean.
fn parse_fork(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    )
}

/// The set of active predicates. Empty means "no filtering".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    language: Option<String>,
    fork: Option<bool>,
    year: Option<String>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.fork.is_none() && self.year.is_none()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn fork(&self) -> Option<bool> {
        self.fork
    }

    pub fn year(&self) -> Option<&str> {
        self.year.as_deref()
    }

    /// Sets one predicate; the last write for a key wins. An empty value
    /// removes the predicate for that key.
    pub fn set(&mut self, key: FilterKey, value: &str) {
        let value = value.trim();
        match key {
            FilterKey::Language => {
                self.language = (!value.is_empty()).then(|| value.to_string());
            }
            FilterKey::Fork => {
                self.fork = (!value.is_empty()).then(|| parse_fork(value));
            }
            FilterKey::Year => {
                self.year = (!value.is_empty()).then(|| value.to_string());
            }
        }
    }

    pub fn clear(&mut self) {
        *self = FilterSet::default();
    }

    /// Whether `repo` satisfies every active predicate.
    pub fn matches(&self, repo: &Repository) -> bool {
        if let Some(language) = &self.language {
            match repo.language() {
                Some(actual) if actual.eq_ignore_ascii_case(language) => {}
                _ => return false,
            }
        }
        if let Some(fork) = self.fork {
            if repo.fork != fork {
                return false;
            }
        }
        if let Some(year) = &self.year {
            if &repo.year() != year {
                return false;
            }
        }
        true
    }

    /// Repositories that satisfy the predicates, in input order.
    pub fn apply<'a>(&self, repos: &'a [Repository]) -> Vec<&'a Repository> {
        repos.iter().filter(|repo| self.matches(repo)).collect()
    }

    /// Space separated `key=value` pairs, or `None` when empty.
    pub fn describe(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(language) = &self.language {
            parts.push(format!("{}={}", FilterKey::Language, language));
        }
        if let Some(fork) = self.fork {
            parts.push(format!("{}={}", FilterKey::Fork, fork));
        }
        if let Some(year) = &self.year {
            parts.push(format!("{}={}", FilterKey::Year, year));
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}
