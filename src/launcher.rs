//! Opening repository pages in the system browser.
//!
//! The first available opener program is used. Only `http` and `https` URLs
//! are ever handed to it.

use anyhow::{anyhow, bail, Result};
use std::process::{Command, Output};
use tracing::{error, info};

/// Opener programs, in order of preference.
pub const OPENERS: &[&str] = &["xdg-open", "open", "wslview"];

/// Trait for running system processes.
///
/// This abstraction enables testing without spawning real processes.
pub trait ProcessRunner: Send + Sync {
    /// Executes a command and returns its output.
    fn run(&self, program: &str, args: &[&str]) -> Result<Output>;

    /// Checks if a program exists in PATH.
    fn program_exists(&self, program: &str) -> bool;
}

/// Default process runner using std::process::Command.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        Ok(Command::new(program).args(args).output()?)
    }

    fn program_exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

pub struct UrlLauncher<P: ProcessRunner = SystemProcessRunner> {
    runner: P,
}

impl UrlLauncher<SystemProcessRunner> {
    pub fn new() -> Self {
        Self::with_runner(SystemProcessRunner)
    }
}

impl Default for UrlLauncher<SystemProcessRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ProcessRunner> UrlLauncher<P> {
    /// Creates a launcher with a custom process runner (for testing).
    pub fn with_runner(runner: P) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &P {
        &self.runner
    }

    /// The opener that would be used, if any is installed.
    pub fn opener(&self) -> Option<&'static str> {
        OPENERS
            .iter()
            .copied()
            .find(|program| self.runner.program_exists(program))
    }

    /// Opens `url` with the first available opener.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not http(s), no opener is installed, or
    /// the opener exits unsuccessfully.
    pub fn open(&self, url: &str) -> Result<()> {
        if !is_web_url(url) {
            bail!("refusing to open non-web url '{}'", url);
        }
        let program = self
            .opener()
            .ok_or_else(|| anyhow!("no browser opener found (tried {})", OPENERS.join(", ")))?;

        info!("Opening {} with {}", url, program);
        let output = self.runner.run(program, &[url])?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("{} failed: {}", program, stderr.trim());
            Err(anyhow!("{} exited with {}", program, output.status))
        }
    }
}

fn is_web_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}
