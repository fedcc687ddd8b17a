//! Per-session mutable state: command history, filters and the tour flag.
//!
//! Nothing here outlives the process.

use crate::filter::FilterSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Append-only list of submitted lines plus a navigation cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    /// `None` means "not navigating".
    cursor: Option<usize>,
}

impl History {
    /// Records a submitted line and stops navigation. Lines are never
    /// deduplicated.
    pub fn push(&mut self, line: &str) {
        self.entries.push(line.to_string());
        self.cursor = None;
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Moves one entry back and returns the line to show as pending input.
    ///
    /// Stays on the oldest entry once reached. Returns `None` when there is no
    /// history at all.
    pub fn back(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let position = match self.cursor {
            None => self.entries.len() - 1,
            Some(position) => position.saturating_sub(1),
        };
        self.cursor = Some(position);
        Some(&self.entries[position])
    }

    /// Moves one entry forward and returns the line to show as pending input.
    ///
    /// Moving past the newest entry stops navigating and yields an empty line.
    /// Returns `None` when not navigating.
    pub fn forward(&mut self) -> Option<&str> {
        let position = self.cursor?;
        if position + 1 >= self.entries.len() {
            self.cursor = None;
            return Some("");
        }
        self.cursor = Some(position + 1);
        Some(&self.entries[position + 1])
    }
}

/// Whether a tour is running. The cancellation token exists only while it is.
#[derive(Debug, Clone, Default)]
pub enum Exploration {
    #[default]
    Idle,
    Running(CancellationToken),
}

/// History shared between the session and the line editor's key bindings.
pub type SharedHistory = Arc<Mutex<History>>;

#[derive(Debug, Default)]
pub struct Session {
    history: SharedHistory,
    filters: FilterSet,
    exploration: Exploration,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A handle on the same history, for input sources outside the session.
    pub fn shared_history(&self) -> SharedHistory {
        Arc::clone(&self.history)
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterSet {
        &mut self.filters
    }

    pub fn exploration(&self) -> &Exploration {
        &self.exploration
    }

    pub fn is_exploring(&self) -> bool {
        matches!(self.exploration, Exploration::Running(_))
    }

    /// Moves to `Running` with `token` as the cancellation handle.
    ///
    /// Returns `false` and leaves the current run untouched if one is already
    /// active.
    pub fn begin_exploration(&mut self, token: CancellationToken) -> bool {
        if self.is_exploring() {
            return false;
        }
        info!("Exploration started");
        self.exploration = Exploration::Running(token);
        true
    }

    /// Back to `Idle`, dropping the cancellation handle.
    pub fn end_exploration(&mut self) {
        if self.is_exploring() {
            info!("Exploration finished");
        }
        self.exploration = Exploration::Idle;
    }

    /// Invokes the cancellation handle if one is registered.
    pub fn cancel_exploration(&self) -> bool {
        match &self.exploration {
            Exploration::Running(token) => {
                info!("Exploration cancellation requested");
                token.cancel();
                true
            }
            Exploration::Idle => false,
        }
    }
}
