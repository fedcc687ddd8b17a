//! The guided tour ("explore").
//!
//! A [`Tour`] is a task object: it owns the precomputed list of stops, its
//! position in that list and the cancellation token. [`Tour::run`] drives it to
//! the end, checking the token once at the top of every step. A step that has
//! started always renders completely.

use crate::handlers::repo_card;
use crate::output::OutputEvent;
use crate::providers::Delay;
use crate::repository::{sort_by_recent, Repository};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Number of repositories visited by a tour.
pub const TOUR_LENGTH: usize = 8;

/// Computes the tour stops.
///
/// The collection is sorted by recency and then re-sorted (stably) by star
/// count, so stars decide the order and recency breaks ties.
pub fn tour_list(repos: &[Repository]) -> Vec<Repository> {
    let mut ordered = sort_by_recent(repos);
    ordered.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    ordered.into_iter().take(TOUR_LENGTH).cloned().collect()
}

/// Pauses used while touring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourTiming {
    /// Before each simulated command.
    pub step_delay: Duration,
    /// After each repository card.
    pub settle_delay: Duration,
    /// Between simulated keystrokes.
    pub keystroke_delay: Duration,
}

impl TourTiming {
    pub fn instant() -> Self {
        Self {
            step_delay: Duration::ZERO,
            settle_delay: Duration::ZERO,
            keystroke_delay: Duration::ZERO,
        }
    }
}

impl Default for TourTiming {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(400),
            settle_delay: Duration::from_millis(900),
            keystroke_delay: Duration::from_millis(35),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourOutcome {
    Completed,
    Aborted,
}

/// One stop: the command to "type" and the repository it shows.
#[derive(Debug, Clone, PartialEq)]
pub struct TourStop {
    pub command: String,
    pub repo: Repository,
}

pub struct Tour {
    stops: Vec<Repository>,
    position: usize,
    token: CancellationToken,
    timing: TourTiming,
}

impl Tour {
    pub fn new(stops: Vec<Repository>, token: CancellationToken, timing: TourTiming) -> Self {
        Self {
            stops,
            position: 0,
            token,
            timing,
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn stops(&self) -> &[Repository] {
        &self.stops
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Advances to the next stop.
    ///
    /// `Err` carries the terminal outcome: `Completed` once every stop has been
    /// visited, `Aborted` when cancellation was requested before this stop.
    pub fn advance(&mut self) -> Result<TourStop, TourOutcome> {
        let Some(repo) = self.stops.get(self.position) else {
            return Err(TourOutcome::Completed);
        };
        if self.token.is_cancelled() {
            return Err(TourOutcome::Aborted);
        }
        self.position += 1;
        Ok(TourStop {
            command: format!("repo {}", repo.name),
            repo: repo.clone(),
        })
    }

    /// Runs the tour to its end, streaming output to `out`.
    ///
    /// A closed output channel counts as an abort.
    pub async fn run(mut self, delay: Arc<dyn Delay>, out: UnboundedSender<OutputEvent>) -> TourOutcome {
        info!("Tour started with {} stops", self.stops.len());
        loop {
            let stop = match self.advance() {
                Ok(stop) => stop,
                Err(outcome) => {
                    info!("Tour ended: {:?} after {} stops", outcome, self.position);
                    return outcome;
                }
            };
            debug!("Tour stop {}: {}", self.position, stop.repo.name);

            delay.sleep(self.timing.step_delay).await;
            if out.send(OutputEvent::Prompt).is_err() {
                return TourOutcome::Aborted;
            }
            for key in stop.command.chars() {
                delay.sleep(self.timing.keystroke_delay).await;
                if out.send(OutputEvent::Keystroke(key)).is_err() {
                    return TourOutcome::Aborted;
                }
            }
            let card = std::iter::once(OutputEvent::Submit).chain(repo_card(&stop.repo));
            for event in card {
                if out.send(event).is_err() {
                    return TourOutcome::Aborted;
                }
            }
            delay.sleep(self.timing.settle_delay).await;
        }
    }
}
