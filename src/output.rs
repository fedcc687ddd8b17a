//! Output events produced by command handlers and the tour runner.
//!
//! Nothing in the interpreter prints directly. Every handler returns a list of
//! [`OutputEvent`]s and the host decides how to show them (see
//! [`crate::render`]).

/// Visual weight of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Accent,
    Muted,
    Success,
    Warning,
    Error,
}

/// A single line of command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    /// A complete output line.
    Line(Line),
    /// Wipe all previous output.
    Clear,
    /// Ask the host to open a URL in a new context (browser).
    OpenUrl(String),
    /// Start of a simulated typed command: the prompt is shown.
    Prompt,
    /// One simulated keystroke.
    Keystroke(char),
    /// End of a simulated typed command.
    Submit,
}

impl OutputEvent {
    pub fn line(text: impl Into<String>, tone: Tone) -> Self {
        OutputEvent::Line(Line {
            text: text.into(),
            tone,
        })
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::line(text, Tone::Plain)
    }

    pub fn accent(text: impl Into<String>) -> Self {
        Self::line(text, Tone::Accent)
    }

    pub fn muted(text: impl Into<String>) -> Self {
        Self::line(text, Tone::Muted)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::line(text, Tone::Success)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::line(text, Tone::Warning)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::line(text, Tone::Error)
    }

    /// The line payload, if this event is a line.
    pub fn as_line(&self) -> Option<&Line> {
        match self {
            OutputEvent::Line(line) => Some(line),
            _ => None,
        }
    }
}

/// Text of every [`OutputEvent::Line`] in `events`, in order.
pub fn line_texts(events: &[OutputEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(OutputEvent::as_line)
        .map(|line| line.text.as_str())
        .collect()
}
