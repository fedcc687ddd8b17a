//! Repository records and recency ordering.
//!
//! A [`Repository`] is one entry of the externally supplied metadata list
//! (a subset of the GitHub REST repository resource). Records are loaded once
//! and never mutated afterwards.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// Branch name used when the payload omits `default_branch`.
pub const DEFAULT_BRANCH: &str = "main";

/// Description shown for repositories that have none.
pub const NO_DESCRIPTION: &str = "No description yet.";

/// License attached to a repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub spdx_id: Option<String>,
}

impl License {
    /// Human readable label: the name, then the SPDX id, then the key.
    pub fn label(&self) -> Option<&str> {
        [&self.name, &self.spdx_id, &self.key]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.trim().is_empty())
    }
}

/// Metadata for a single repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fork: bool,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub pushed_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stargazers_count: u64,
    #[serde(default = "default_branch", deserialize_with = "branch_or_main")]
    pub default_branch: String,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    #[serde(default)]
    pub homepage: Option<String>,
}

impl Default for Repository {
    fn default() -> Self {
        Self {
            name: String::new(),
            full_name: String::new(),
            html_url: String::new(),
            description: None,
            fork: false,
            language: None,
            pushed_at: None,
            updated_at: None,
            stargazers_count: 0,
            default_branch: default_branch(),
            license: None,
            topics: Vec::new(),
            homepage: None,
        }
    }
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn branch_or_main<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|branch| !branch.trim().is_empty())
        .unwrap_or_else(default_branch))
}

impl Repository {
    /// Creates a record with only a name set. Mostly useful for fixtures.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            full_name: name.to_string(),
            ..Self::default()
        }
    }

    /// The language, treating an empty string as absent.
    pub fn language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|language| !language.is_empty())
    }

    pub fn description_or_default(&self) -> &str {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .unwrap_or(NO_DESCRIPTION)
    }

    pub fn license_label(&self) -> Option<&str> {
        self.license.as_ref().and_then(License::label)
    }

    /// Raw timestamp string used for the year filter: `pushed_at`, then
    /// `updated_at`, then the empty string.
    pub fn raw_timestamp(&self) -> &str {
        self.pushed_at
            .as_deref()
            .or(self.updated_at.as_deref())
            .unwrap_or("")
    }

    /// First four characters of [`Self::raw_timestamp`].
    pub fn year(&self) -> String {
        self.raw_timestamp().chars().take(4).collect()
    }

    /// The parsed `pushed_at`, falling back to the parsed `updated_at`.
    pub fn effective_date(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.pushed_at.as_deref())
            .or_else(|| parse_timestamp(self.updated_at.as_deref()))
    }

    /// Seconds since the Unix epoch of [`Self::effective_date`], or zero.
    pub fn effective_timestamp(&self) -> i64 {
        self.effective_date()
            .map(|date| date.timestamp())
            .unwrap_or(0)
    }

    /// Date label in the `Jan 05, 2024` form, `n/a` when unknown.
    pub fn date_label(&self) -> String {
        self.effective_date()
            .map(|date| date.format("%b %d, %Y").to_string())
            .unwrap_or_else(|| "n/a".to_string())
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value).ok()
}

/// Orders repositories by effective timestamp, newest first.
///
/// The sort is stable: records with equal timestamps keep their input order.
pub fn sort_by_recent<'a, I>(repos: I) -> Vec<&'a Repository>
where
    I: IntoIterator<Item = &'a Repository>,
{
    let mut sorted: Vec<&Repository> = repos.into_iter().collect();
    sorted.sort_by_key(|repo| std::cmp::Reverse(repo.effective_timestamp()));
    sorted
}
