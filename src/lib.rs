//! Repoterm - a terminal-style explorer for a collection of repositories.
//!
//! This library provides the core of the `repoterm` shell. It supports:
//!
//! - **Lookup** of repositories by exact name or unique prefix
//! - **Filtering** by language, fork status and year
//! - **Charts and timelines** rendered as text
//! - **A guided tour** that types commands by itself and can be aborted
//! - **Tab completion** and shell-style history navigation
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`repository`] - The repository record and date helpers
//! - [`source`] - Loading repository JSON from a file or URL
//! - [`index`] - Exact and prefix lookup
//! - [`filter`] - Filter keys and the active filter set
//! - [`command`] - Command registry and line parsing
//! - [`handlers`] - One handler per command, producing output events
//! - [`chart`] - Language counts and text bar charts
//! - [`session`] - History, filters and the tour flag
//! - [`tour`] - The cancelable guided tour
//! - [`interpreter`] - Ties parsing, handlers and the session together
//! - [`completion`] - Tab completion
//! - [`output`] - Output events
//! - [`render`] - Turning output events into terminal text
//! - [`terminal`] - Interactive and batch hosts
//! - [`launcher`] - Opening URLs in the browser
//! - [`config`] - Configuration (data source, delays, colour)
//! - [`providers`] - Shared dependency injection traits
//! - [`http_client`] - HTTP client abstraction
//!
//! # Example
//!
//! ```
//! use repoterm::index::RepoIndex;
//! use repoterm::interpreter::Interpreter;
//! use repoterm::output::line_texts;
//! use repoterm::repository::Repository;
//! use repoterm::tour::TourTiming;
//! use std::sync::Arc;
//!
//! let index = RepoIndex::new(vec![Repository::named("repoterm")]);
//! let mut interpreter = Interpreter::new(Arc::new(index), TourTiming::instant());
//!
//! let dispatch = interpreter.execute("repo rep");
//! assert_eq!(line_texts(&dispatch.events)[0], "repoterm");
//! ```

pub mod chart;
pub mod command;
pub mod completion;
pub mod config;
pub mod filter;
pub mod handlers;
pub mod http_client;
pub mod index;
pub mod interpreter;
pub mod launcher;
pub mod output;
pub mod providers;
pub mod render;
pub mod repository;
pub mod session;
pub mod source;
pub mod terminal;
pub mod tour;
