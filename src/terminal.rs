//! The host surface: an interactive line editor and a batch runner.
//!
//! Both feed lines to the [`Interpreter`], render what comes back and drive a
//! started tour on a spawned task. Interactive mode reads input on a
//! dedicated thread (the line editor blocks) and prints through the editor's
//! external printer so output never tears the prompt.

use crate::completion::Completion;
use crate::index::RepoIndex;
use crate::interpreter::Interpreter;
use crate::launcher::{ProcessRunner, SystemProcessRunner, UrlLauncher};
use crate::output::OutputEvent;
use crate::providers::Delay;
use crate::render::{Renderer, PROMPT};
use crate::session::SharedHistory;
use crate::tour::{Tour, TourOutcome};
use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Context, Editor, Event, EventContext, EventHandler, ExternalPrinter,
    Helper, KeyCode, KeyEvent, Modifiers, Movement, RepeatCount,
};
use std::borrow::Cow::{self, Borrowed, Owned};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// What the input thread reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// ctrl+c at the prompt.
    Interrupt,
    /// ctrl+d or a closed input stream.
    Eof,
}

// =============================================================================
// Line editor helper
// =============================================================================

/// Completion and prompt colouring for the line editor.
pub struct ReplHelper {
    index: Arc<RepoIndex>,
    color: bool,
}

impl ReplHelper {
    pub fn new(index: Arc<RepoIndex>, color: bool) -> Self {
        Self { index, color }
    }
}

impl Helper for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let pair = |name: String| Pair {
            display: name.clone(),
            replacement: name,
        };
        match crate::completion::complete(&line[..pos], &self.index) {
            Completion::Nothing => Ok((pos, vec![])),
            Completion::Unique { start, replacement } => Ok((start, vec![pair(replacement)])),
            Completion::Candidates { start, candidates } => {
                Ok((start, candidates.into_iter().map(pair).collect()))
            }
        }
    }
}

impl Highlighter for ReplHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(&'s self, prompt: &'p str, _default: bool) -> Cow<'b, str> {
        if self.color {
            Owned(prompt.green().bold().to_string())
        } else {
            Borrowed(prompt)
        }
    }
}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Validator for ReplHelper {}

/// Up/Down key binding that moves the session's history cursor.
struct HistoryKey {
    history: SharedHistory,
    back: bool,
}

impl HistoryKey {
    /// The line to show as pending input, if the cursor moved.
    fn recall(&self) -> Option<String> {
        let mut history = self.history.lock().ok()?;
        let line = if self.back { history.back() } else { history.forward() }?;
        Some(line.to_string())
    }
}

impl ConditionalEventHandler for HistoryKey {
    fn handle(&self, _evt: &Event, _n: RepeatCount, _positive: bool, _ctx: &EventContext) -> Option<Cmd> {
        self.recall()
            .map(|line| Cmd::Replace(Movement::WholeBuffer, Some(line)))
    }
}

fn build_editor(helper: ReplHelper, history: &SharedHistory) -> rustyline::Result<Editor<ReplHelper, DefaultHistory>> {
    let mut editor = Editor::<ReplHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(helper));
    for (code, back) in [(KeyCode::Up, true), (KeyCode::Down, false)] {
        editor.bind_sequence(
            KeyEvent(code, Modifiers::NONE),
            EventHandler::Conditional(Box::new(HistoryKey {
                history: Arc::clone(history),
                back,
            })),
        );
    }
    Ok(editor)
}

/// Runs the line editor on its own thread.
///
/// The external printer (if the terminal supports one) is handed back through
/// `printer_tx` as a channel of ready-to-print text.
fn spawn_reader(
    helper: ReplHelper,
    history: SharedHistory,
    input_tx: mpsc::Sender<InputEvent>,
    printer_tx: oneshot::Sender<Option<std::sync::mpsc::Sender<String>>>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut editor = match build_editor(helper, &history) {
            Ok(editor) => editor,
            Err(e) => {
                error!("Could not start line editor: {}", e);
                let _ = printer_tx.send(None);
                let _ = input_tx.blocking_send(InputEvent::Eof);
                return;
            }
        };

        let printer = match editor.create_external_printer() {
            Ok(mut printer) => {
                let (tx, rx) = std::sync::mpsc::channel::<String>();
                std::thread::spawn(move || {
                    for message in rx {
                        if printer.print(message).is_err() {
                            break;
                        }
                    }
                });
                Some(tx)
            }
            Err(e) => {
                warn!("External printer unavailable, writing to stdout: {}", e);
                None
            }
        };
        let _ = printer_tx.send(printer);

        loop {
            let event = match editor.readline(PROMPT) {
                Ok(line) => InputEvent::Line(line),
                Err(ReadlineError::Interrupted) => InputEvent::Interrupt,
                Err(ReadlineError::Eof) => InputEvent::Eof,
                Err(e) => {
                    error!("Readline error: {}", e);
                    InputEvent::Eof
                }
            };
            let done = event == InputEvent::Eof;
            if input_tx.blocking_send(event).is_err() || done {
                break;
            }
        }
    })
}

// =============================================================================
// Output sink
// =============================================================================

/// Where rendered text goes in interactive mode.
struct Sink {
    renderer: Renderer,
    printer: Option<std::sync::mpsc::Sender<String>>,
    pending: String,
}

impl Sink {
    /// Writes events and flushes everything, including a partial line.
    fn emit(&mut self, events: &[OutputEvent]) -> Result<()> {
        self.stream(events)?;
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.print(rest)?;
        }
        Ok(())
    }

    /// Writes events, holding back a trailing partial line.
    ///
    /// The external printer redraws the prompt after every message, so typed
    /// characters are released a full line at a time.
    fn stream(&mut self, events: &[OutputEvent]) -> Result<()> {
        if self.printer.is_none() {
            return self.renderer.render(events);
        }
        self.pending.push_str(&self.renderer.render_to_string(events)?);
        if let Some(end) = self.pending.rfind('\n') {
            let ready: String = self.pending.drain(..=end).collect();
            self.print(ready)?;
        }
        Ok(())
    }

    fn print(&mut self, text: String) -> Result<()> {
        if let Some(printer) = &self.printer {
            if printer.send(text.clone()).is_ok() {
                return Ok(());
            }
        }
        self.printer = None;
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", text)?;
        stdout.flush()?;
        Ok(())
    }
}

// =============================================================================
// Terminal
// =============================================================================

pub struct Terminal<P: ProcessRunner = SystemProcessRunner> {
    interpreter: Interpreter,
    renderer: Renderer,
    delay: Arc<dyn Delay>,
    launcher: UrlLauncher<P>,
}

impl Terminal<SystemProcessRunner> {
    pub fn new(interpreter: Interpreter, renderer: Renderer, delay: Arc<dyn Delay>) -> Self {
        Self::with_launcher(interpreter, renderer, delay, UrlLauncher::new())
    }
}

impl<P: ProcessRunner> Terminal<P> {
    /// Creates a terminal with a custom URL launcher (for testing).
    pub fn with_launcher(
        interpreter: Interpreter,
        renderer: Renderer,
        delay: Arc<dyn Delay>,
        launcher: UrlLauncher<P>,
    ) -> Self {
        Self {
            interpreter,
            renderer,
            delay,
            launcher,
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Greeting shown when the interactive session starts.
    pub fn banner(&self) -> Vec<OutputEvent> {
        let count = self.interpreter.index().len();
        vec![
            OutputEvent::accent("repoterm"),
            OutputEvent::muted(format!(
                "{} repositories loaded. type 'help' to get started, ctrl+d to exit.",
                count
            )),
        ]
    }

    /// Launches every `OpenUrl` in `events`, returning failure notices.
    fn open_urls(&self, events: &[OutputEvent]) -> Vec<OutputEvent> {
        events
            .iter()
            .filter_map(|event| match event {
                OutputEvent::OpenUrl(url) => self
                    .launcher
                    .open(url)
                    .err()
                    .map(|e| OutputEvent::error(format!("could not open {}: {}", url, e))),
                _ => None,
            })
            .collect()
    }

    fn spawn_tour(&self, tour: Tour, out: mpsc::UnboundedSender<OutputEvent>) -> JoinHandle<TourOutcome> {
        debug!("Spawning tour with {} stops", tour.len());
        tokio::spawn(tour.run(Arc::clone(&self.delay), out))
    }

    // =========================================================================
    // Interactive mode
    // =========================================================================

    /// Runs the interactive session until ctrl+d.
    pub async fn run_interactive(mut self, startup: Vec<OutputEvent>) -> Result<()> {
        let (input_tx, mut input_rx) = mpsc::channel::<InputEvent>(16);
        let (printer_tx, printer_rx) = oneshot::channel();
        let helper = ReplHelper::new(Arc::clone(self.interpreter.index()), self.renderer.color());
        let _reader = spawn_reader(helper, self.interpreter.shared_history(), input_tx, printer_tx);

        let mut sink = Sink {
            renderer: self.renderer,
            printer: printer_rx.await.ok().flatten(),
            pending: String::new(),
        };
        sink.emit(&startup)?;
        sink.emit(&self.banner())?;

        let (tour_tx, mut tour_rx) = mpsc::unbounded_channel::<OutputEvent>();
        let mut running: Option<JoinHandle<TourOutcome>> = None;

        loop {
            tokio::select! {
                input = input_rx.recv() => match input {
                    Some(InputEvent::Line(line)) => {
                        let dispatch = self.interpreter.execute(&line);
                        sink.emit(&dispatch.events)?;
                        sink.emit(&self.open_urls(&dispatch.events))?;
                        if let Some(tour) = dispatch.tour {
                            running = Some(self.spawn_tour(tour, tour_tx.clone()));
                        }
                    }
                    Some(InputEvent::Interrupt) => sink.emit(&self.interpreter.interrupt())?,
                    Some(InputEvent::Eof) | None => break,
                },
                Some(event) = tour_rx.recv() => sink.stream(&[event])?,
                outcome = join_tour(&mut running) => {
                    while let Ok(event) = tour_rx.try_recv() {
                        sink.stream(&[event])?;
                    }
                    sink.emit(&self.interpreter.finish_tour(outcome))?;
                }
            }
        }

        if let Some(handle) = running.take() {
            handle.abort();
        }
        info!("Interactive session ended");
        Ok(())
    }

    // =========================================================================
    // Batch mode
    // =========================================================================

    /// Executes `lines` in order, rendering to stdout.
    pub async fn run_batch(&mut self, lines: &[String]) -> Result<()> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.run_batch_with_io(lines, &mut handle).await?;
        handle.flush()?;
        Ok(())
    }

    /// Executes `lines` in order, rendering to `output`.
    ///
    /// A started tour runs to its end before the next line; ctrl+c aborts it.
    pub async fn run_batch_with_io<W: Write>(&mut self, lines: &[String], output: &mut W) -> Result<()> {
        for line in lines {
            let dispatch = self.interpreter.execute(line);
            self.renderer.render_with_io(&dispatch.events, output)?;
            let failures = self.open_urls(&dispatch.events);
            self.renderer.render_with_io(&failures, output)?;

            if let Some(tour) = dispatch.tour {
                let outcome = self.drive_tour(tour, output).await?;
                let notice = self.interpreter.finish_tour(outcome);
                self.renderer.render_with_io(&notice, output)?;
            }
        }
        Ok(())
    }

    async fn drive_tour<W: Write>(&mut self, tour: Tour, output: &mut W) -> Result<TourOutcome> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = self.spawn_tour(tour, tx);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut interrupted = false;

        loop {
            tokio::select! {
                Some(event) = rx.recv() => self.renderer.render_with_io(&[event], output)?,
                signal = &mut ctrl_c, if !interrupted => {
                    interrupted = true;
                    match signal {
                        Ok(()) => {
                            let echo = self.interpreter.interrupt();
                            self.renderer.render_with_io(&echo, output)?;
                        }
                        Err(e) => warn!("Could not listen for ctrl+c: {}", e),
                    }
                }
                joined = &mut handle => {
                    while let Ok(event) = rx.try_recv() {
                        self.renderer.render_with_io(&[event], output)?;
                    }
                    return Ok(joined.unwrap_or_else(|e| {
                        error!("Tour task failed: {}", e);
                        TourOutcome::Aborted
                    }));
                }
            }
        }
    }
}

/// Resolves when the running tour finishes; pends forever when there is none.
async fn join_tour(running: &mut Option<JoinHandle<TourOutcome>>) -> TourOutcome {
    let Some(handle) = running.as_mut() else {
        return std::future::pending().await;
    };
    let outcome = match handle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Tour task failed: {}", e);
            TourOutcome::Aborted
        }
    };
    *running = None;
    outcome
}
