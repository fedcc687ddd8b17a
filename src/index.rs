//! In-memory repository index.
//!
//! Exact lookups go through a lower-cased name map; prefix (fuzzy) lookups
//! scan the collection linearly.

use crate::repository::Repository;
use std::collections::HashMap;
use tracing::debug;

/// Number of ambiguous candidates shown to the user.
pub const AMBIGUOUS_DISPLAY_LIMIT: usize = 8;

/// Result of resolving a user supplied repository name.
#[derive(Debug, PartialEq)]
pub enum Lookup<'a> {
    /// Exact match, or the only prefix match.
    Found(&'a Repository),
    /// Several repositories share the prefix.
    Ambiguous(Vec<&'a Repository>),
    NotFound,
}

/// Read-only collection of repositories with a name index.
#[derive(Debug, Default)]
pub struct RepoIndex {
    repos: Vec<Repository>,
    by_name: HashMap<String, usize>,
}

impl RepoIndex {
    /// Builds the index. Records with an empty name stay in the collection but
    /// cannot be looked up by name.
    pub fn new(repos: Vec<Repository>) -> Self {
        let mut by_name = HashMap::new();
        for (position, repo) in repos.iter().enumerate() {
            if repo.name.trim().is_empty() {
                continue;
            }
            for key in [&repo.name, &repo.full_name] {
                let key = key.trim().to_lowercase();
                if !key.is_empty() {
                    by_name.entry(key).or_insert(position);
                }
            }
        }
        Self { repos, by_name }
    }

    pub fn repos(&self) -> &[Repository] {
        &self.repos
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Repository> {
        self.repos.get(position)
    }

    /// Resolves `query` to a repository.
    ///
    /// An exact case-insensitive match on `name` or `full_name` wins; otherwise
    /// every record whose name starts with the lower-cased query is collected.
    pub fn lookup(&self, query: &str) -> Lookup<'_> {
        let needle = query.trim().to_lowercase();

        if let Some(&position) = self.by_name.get(&needle) {
            debug!("Exact match for '{}'", query);
            return Lookup::Found(&self.repos[position]);
        }

        let mut matches = self.with_prefix(&needle);
        debug!("Prefix '{}' matched {} repositories", needle, matches.len());
        match matches.len() {
            0 => Lookup::NotFound,
            1 => Lookup::Found(matches.remove(0)),
            _ => Lookup::Ambiguous(matches),
        }
    }

    /// Repositories whose lower-cased name starts with `prefix`, in input order.
    pub fn with_prefix(&self, prefix: &str) -> Vec<&Repository> {
        let prefix = prefix.to_lowercase();
        self.repos
            .iter()
            .filter(|repo| !repo.name.is_empty())
            .filter(|repo| repo.name.to_lowercase().starts_with(&prefix))
            .collect()
    }
}
