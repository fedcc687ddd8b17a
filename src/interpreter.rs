//! The command interpreter.
//!
//! [`Interpreter::execute`] takes one submitted line, records it in the
//! session history, dispatches it and returns the resulting output. Handler
//! failures are caught here and reported as a single error line; the
//! interpreter stays usable after any failure.

use crate::command::{self, Command};
use crate::completion::{self, Completion};
use crate::handlers::{self, HandlerContext, NO_REPOS};
use crate::index::RepoIndex;
use crate::output::OutputEvent;
use crate::providers::{RandomSource, ThreadRandom};
use crate::session::{Session, SharedHistory};
use crate::tour::{tour_list, Tour, TourOutcome, TourTiming};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Everything produced by one submitted line.
#[derive(Default)]
pub struct Dispatch {
    pub events: Vec<OutputEvent>,
    /// A tour that was just started. The host must run it and report the
    /// outcome back through [`Interpreter::finish_tour`].
    pub tour: Option<Tour>,
}

impl Dispatch {
    fn output(events: Vec<OutputEvent>) -> Self {
        Self { events, tour: None }
    }
}

pub struct Interpreter {
    index: Arc<RepoIndex>,
    session: Session,
    random: Box<dyn RandomSource>,
    timing: TourTiming,
}

impl Interpreter {
    pub fn new(index: Arc<RepoIndex>, timing: TourTiming) -> Self {
        Self::with_random(index, timing, Box::new(ThreadRandom))
    }

    /// Creates an interpreter with a custom random source (for testing).
    pub fn with_random(index: Arc<RepoIndex>, timing: TourTiming, random: Box<dyn RandomSource>) -> Self {
        Self {
            index,
            session: Session::new(),
            random,
            timing,
        }
    }

    pub fn index(&self) -> &Arc<RepoIndex> {
        &self.index
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Executes one raw input line.
    ///
    /// Empty input does nothing and is not recorded. Any other line is
    /// appended to the history, whether or not it succeeds.
    pub fn execute(&mut self, raw: &str) -> Dispatch {
        let Some(command) = command::parse(raw) else {
            return Dispatch::default();
        };
        self.session.history().push(raw);
        info!("Executing {:?}", command);

        match command {
            Command::Unknown(name) => Dispatch::output(vec![OutputEvent::error(format!(
                "command not found: {}. type 'help' for a list of commands",
                name
            ))]),
            Command::Explore => self.start_tour(),
            command => {
                let mut ctx = HandlerContext {
                    index: &self.index,
                    filters: self.session.filters_mut(),
                    random: self.random.as_ref(),
                };
                match handlers::dispatch(&command, &mut ctx) {
                    Ok(events) => Dispatch::output(events),
                    Err(e) => {
                        warn!("Command {:?} failed: {:#}", command, e);
                        Dispatch::output(vec![OutputEvent::error(format!("command error: {}", e))])
                    }
                }
            }
        }
    }

    fn start_tour(&mut self) -> Dispatch {
        if self.index.is_empty() {
            return Dispatch::output(vec![OutputEvent::warning(NO_REPOS)]);
        }

        let token = CancellationToken::new();
        if !self.session.begin_exploration(token.clone()) {
            return Dispatch::output(vec![OutputEvent::warning(
                "tour already running. press ctrl+c to stop it",
            )]);
        }
        let tour = Tour::new(tour_list(self.index.repos()), token, self.timing);

        Dispatch {
            events: vec![OutputEvent::accent(format!(
                "starting a tour of {} repositories. press ctrl+c to abort",
                tour.len()
            ))],
            tour: Some(tour),
        }
    }

    /// Records the end of the running tour and returns its closing notice.
    pub fn finish_tour(&mut self, outcome: TourOutcome) -> Vec<OutputEvent> {
        self.session.end_exploration();
        match outcome {
            TourOutcome::Completed => vec![OutputEvent::success("tour complete")],
            TourOutcome::Aborted => vec![OutputEvent::warning("tour aborted")],
        }
    }

    /// Handles the interrupt signal (ctrl+c).
    ///
    /// Cancels the running tour if there is one; otherwise it only echoes.
    pub fn interrupt(&mut self) -> Vec<OutputEvent> {
        if self.session.cancel_exploration() {
            info!("Interrupt cancelled the running tour");
        }
        vec![OutputEvent::muted("^C")]
    }

    /// Pending input after pressing "previous history".
    pub fn history_back(&mut self) -> Option<String> {
        self.session.history().back().map(str::to_string)
    }

    /// Pending input after pressing "next history".
    pub fn history_forward(&mut self) -> Option<String> {
        self.session.history().forward().map(str::to_string)
    }

    /// The session history, shared with the line editor's Up/Down keys.
    pub fn shared_history(&self) -> SharedHistory {
        self.session.shared_history()
    }

    /// Answers a completion request for `input`.
    pub fn complete(&self, input: &str) -> Completion {
        completion::complete(input, &self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{line_texts, Tone};
    use crate::repository::Repository;

    struct FixedRandom(usize);

    impl RandomSource for FixedRandom {
        fn index(&self, _len: usize) -> usize {
            self.0
        }
    }

    fn repo(name: &str, language: &str, fork: bool, stars: u64) -> Repository {
        Repository {
            language: Some(language.to_string()),
            fork,
            stargazers_count: stars,
            ..Repository::named(name)
        }
    }

    fn interpreter() -> Interpreter {
        let index = RepoIndex::new(vec![
            repo("a", "Go", false, 3),
            repo("b", "Go", true, 9),
            repo("c", "Rust", false, 1),
        ]);
        Interpreter::new(Arc::new(index), TourTiming::instant())
    }

    fn lines(dispatch: &Dispatch) -> Vec<String> {
        line_texts(&dispatch.events).into_iter().map(str::to_string).collect()
    }

    // =========================================================================
    // Dispatch and history
    // =========================================================================

    #[test]
    fn test_empty_input_is_a_noop() {
        let mut interp = interpreter();

        let dispatch = interp.execute("   ");

        assert!(dispatch.events.is_empty());
        assert!(interp.session().history().is_empty());
    }

    #[test]
    fn test_unknown_command_names_token_and_is_recorded() {
        let mut interp = interpreter();

        let dispatch = interp.execute("sudo rm");

        assert_eq!(dispatch.events.len(), 1);
        let line = dispatch.events[0].as_line().unwrap();
        assert_eq!(line.tone, Tone::Error);
        assert!(line.text.contains("sudo"));
        assert_eq!(interp.session().history().entries(), &["sudo rm"]);
    }

    #[test]
    fn test_history_grows_for_valid_and_invalid_lines() {
        let mut interp = interpreter();
        let submitted = ["help", "nope", "repo zzz", "", "ls", "  ", "graph bogus"];

        for line in submitted {
            interp.execute(line);
        }

        assert_eq!(interp.session().history().len(), 5);
        assert_eq!(interp.session().history().cursor(), None);
    }

    #[test]
    fn test_handler_failure_is_reported_and_session_continues() {
        let index = Arc::new(RepoIndex::new(vec![Repository::named("only")]));
        let mut interp = Interpreter::with_random(index, TourTiming::instant(), Box::new(FixedRandom(5)));

        let failed = interp.execute("random");
        let after = interp.execute("repo only");

        assert_eq!(failed.events.len(), 1);
        assert!(lines(&failed)[0].starts_with("command error:"));
        assert_eq!(lines(&after)[0], "only");
        assert_eq!(interp.session().history().len(), 2);
    }

    #[test]
    fn test_filter_then_ls_returns_only_matching() {
        let mut interp = interpreter();

        interp.execute("filter language=Rust");
        let dispatch = interp.execute("ls");

        assert_eq!(lines(&dispatch), vec!["filters: language=Rust", "c"]);
    }

    #[test]
    fn test_filter_clear_then_filter_reports_no_filters() {
        let mut interp = interpreter();

        interp.execute("filter lang=Go fork=true");
        interp.execute("filter clear");
        let dispatch = interp.execute("filter");

        assert_eq!(lines(&dispatch), vec!["no filters"]);
    }

    #[test]
    fn test_repo_not_found_emits_one_warning() {
        let mut interp = interpreter();
        let dispatch = interp.execute("repo x");

        assert_eq!(dispatch.events.len(), 1);
        assert_eq!(dispatch.events[0].as_line().unwrap().tone, Tone::Warning);
    }

    #[test]
    fn test_history_navigation_through_interpreter() {
        let mut interp = interpreter();
        interp.execute("ls");
        interp.execute("graph");

        assert_eq!(interp.history_back().as_deref(), Some("graph"));
        assert_eq!(interp.history_back().as_deref(), Some("ls"));
        assert_eq!(interp.history_forward().as_deref(), Some("graph"));
        assert_eq!(interp.history_forward().as_deref(), Some(""));

        interp.history_back();
        interp.execute("help");
        assert_eq!(interp.session().history().cursor(), None);
    }

    // =========================================================================
    // Exploration lifecycle
    // =========================================================================

    #[test]
    fn test_explore_starts_a_tour() {
        let mut interp = interpreter();

        let dispatch = interp.execute("explore");

        let tour = dispatch.tour.expect("tour started");
        let names: Vec<&str> = tour.stops().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert!(interp.session().is_exploring());
    }

    #[test]
    fn test_second_explore_reports_already_running_once() {
        let mut interp = interpreter();

        let first = interp.execute("explore");
        let second = interp.execute("explore");

        assert!(first.tour.is_some());
        assert!(second.tour.is_none());
        let already: Vec<String> = lines(&second)
            .into_iter()
            .filter(|line| line.contains("already running"))
            .collect();
        assert_eq!(already.len(), 1);
        assert!(!first.tour.unwrap().token().is_cancelled());
        assert!(interp.session().is_exploring());
    }

    #[test]
    fn test_explore_with_no_repositories() {
        let mut interp = Interpreter::new(Arc::new(RepoIndex::default()), TourTiming::instant());

        let dispatch = interp.execute("explore");

        assert!(dispatch.tour.is_none());
        assert!(!interp.session().is_exploring());
    }

    #[test]
    fn test_interrupt_cancels_running_tour() {
        let mut interp = interpreter();
        let tour = interp.execute("explore").tour.unwrap();

        let echo = interp.interrupt();

        assert_eq!(line_texts(&echo), vec!["^C"]);
        assert!(tour.token().is_cancelled());
        // Still running until the runner reports back.
        assert!(interp.session().is_exploring());
    }

    #[test]
    fn test_interrupt_when_idle_only_echoes() {
        let mut interp = interpreter();
        let echo = interp.interrupt();

        assert_eq!(line_texts(&echo), vec!["^C"]);
        assert!(!interp.session().is_exploring());
    }

    #[test]
    fn test_finish_tour_resets_state_with_distinct_notices() {
        let mut interp = interpreter();

        interp.execute("explore");
        let done = interp.finish_tour(TourOutcome::Completed);
        assert_eq!(line_texts(&done), vec!["tour complete"]);
        assert!(!interp.session().is_exploring());

        interp.execute("explore");
        let aborted = interp.finish_tour(TourOutcome::Aborted);
        assert_eq!(line_texts(&aborted), vec!["tour aborted"]);
        assert!(!interp.session().is_exploring());
    }

    #[test]
    fn test_commands_still_run_during_a_tour() {
        let mut interp = interpreter();
        interp.execute("explore");

        let dispatch = interp.execute("repo c");

        assert_eq!(lines(&dispatch)[0], "c");
    }
}
