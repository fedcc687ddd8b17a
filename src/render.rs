//! Writing output events to a terminal.
//!
//! Handlers and the tour only produce [`OutputEvent`]s; this module is the
//! single place that turns them into bytes.

use crate::output::{Line, OutputEvent, Tone};
use anyhow::Result;
use colored::{ColoredString, Colorize};
use std::io::{self, Write};

/// Clears the screen and homes the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Prompt drawn before simulated input.
pub const PROMPT: &str = "$ ";

/// Renders output events, optionally with ANSI colour.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Renders events to stdout.
    pub fn render(&self, events: &[OutputEvent]) -> Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.render_with_io(events, &mut handle)?;
        handle.flush()?;
        Ok(())
    }

    // =========================================================================
    // Core methods with I/O injection (testable)
    // =========================================================================

    /// Renders events to `output`.
    ///
    /// `OpenUrl` produces no text; launching the browser is the host's job.
    pub fn render_with_io<W: Write>(&self, events: &[OutputEvent], output: &mut W) -> Result<()> {
        for event in events {
            match event {
                OutputEvent::Line(line) => writeln!(output, "{}", self.paint(line))?,
                OutputEvent::Clear => write!(output, "{}", CLEAR_SCREEN)?,
                OutputEvent::Prompt => write!(output, "{}", self.paint_prompt())?,
                OutputEvent::Keystroke(key) => {
                    write!(output, "{}", key)?;
                    output.flush()?;
                }
                OutputEvent::Submit => writeln!(output)?,
                OutputEvent::OpenUrl(_) => {}
            }
        }
        Ok(())
    }

    /// Renders events into a string (used by the readline printer).
    pub fn render_to_string(&self, events: &[OutputEvent]) -> Result<String> {
        let mut buffer = Vec::new();
        self.render_with_io(events, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// The prompt text, coloured when colour is on.
    pub fn paint_prompt(&self) -> String {
        if self.color {
            PROMPT.green().bold().to_string()
        } else {
            PROMPT.to_string()
        }
    }

    fn paint(&self, line: &Line) -> String {
        if !self.color {
            return line.text.clone();
        }
        let text = line.text.as_str();
        let painted: ColoredString = match line.tone {
            Tone::Plain => text.normal(),
            Tone::Accent => text.cyan().bold(),
            Tone::Muted => text.bright_black(),
            Tone::Success => text.green(),
            Tone::Warning => text.yellow(),
            Tone::Error => text.red(),
        };
        painted.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(events: &[OutputEvent]) -> String {
        Renderer::new(false).render_to_string(events).unwrap()
    }

    #[test]
    fn test_lines_are_written_one_per_row() {
        let out = render(&[OutputEvent::plain("one"), OutputEvent::error("two")]);
        assert_eq!(out, "one\ntwo\n");
    }

    #[test]
    fn test_typing_sequence_renders_like_a_command_line() {
        let events = vec![
            OutputEvent::Prompt,
            OutputEvent::Keystroke('l'),
            OutputEvent::Keystroke('s'),
            OutputEvent::Submit,
            OutputEvent::plain("alpha"),
        ];

        assert_eq!(render(&events), "$ ls\nalpha\n");
    }

    #[test]
    fn test_clear_writes_escape_sequence() {
        assert_eq!(render(&[OutputEvent::Clear]), CLEAR_SCREEN);
    }

    #[test]
    fn test_open_url_writes_nothing() {
        assert_eq!(render(&[OutputEvent::OpenUrl("https://example.com".into())]), "");
    }

    #[test]
    fn test_plain_rendering_has_no_escape_codes() {
        let out = render(&[OutputEvent::warning("careful"), OutputEvent::accent("name")]);
        assert!(!out.contains('\x1b'));
    }
}
