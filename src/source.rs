//! Loading repository data from a file or URL.

use crate::http_client::HttpClient;
use crate::output::OutputEvent;
use crate::repository::Repository;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Default data file, relative to the working directory.
pub const DEFAULT_DATA_SOURCE: &str = "public_repos.json";

/// Errors raised while loading repository data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("could not parse repository data from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where repository data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// Interprets `http://` and `https://` strings as URLs, anything else as a
    /// file path.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        let lower = spec.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(spec.to_string())
        } else {
            DataSource::File(PathBuf::from(spec))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

/// Parses a JSON array of repository objects.
pub fn parse_repositories(text: &str, origin: &str) -> Result<Vec<Repository>, LoadError> {
    serde_json::from_str(text).map_err(|source| LoadError::Parse {
        origin: origin.to_string(),
        source,
    })
}

/// Loads every repository from `source`.
pub async fn load(source: &DataSource, http: &dyn HttpClient) -> Result<Vec<Repository>, LoadError> {
    let text = match source {
        DataSource::File(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| LoadError::Io {
                    path: path.display().to_string(),
                    source,
                })?
        }
        DataSource::Url(url) => http
            .get_text(url, &[("Accept", "application/json")])
            .await
            .map_err(|e| LoadError::Fetch {
                url: url.clone(),
                reason: e.to_string(),
            })?,
    };

    let repos = parse_repositories(&text, &source.to_string())?;
    info!("Loaded {} repositories from {}", repos.len(), source);
    Ok(repos)
}

/// Loads repositories, degrading to an empty collection on failure.
///
/// The second element is the single diagnostic to show when loading failed.
pub async fn load_or_empty(
    source: &DataSource,
    http: &dyn HttpClient,
) -> (Vec<Repository>, Option<OutputEvent>) {
    match load(source, http).await {
        Ok(repos) => (repos, None),
        Err(e) => {
            warn!("Repository data unavailable: {}", e);
            (Vec::new(), Some(OutputEvent::error(format!("failed to load repositories: {}", e))))
        }
    }
}
