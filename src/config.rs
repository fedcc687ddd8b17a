use crate::source::{DataSource, DEFAULT_DATA_SOURCE};
use crate::tour::TourTiming;
use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Environment variable naming the data source.
pub const DATA_ENV: &str = "REPOTERM_DATA";
/// Environment variable that zeroes every tour delay when set.
pub const INSTANT_ENV: &str = "REPOTERM_INSTANT";
/// Standard opt-out for coloured output.
pub const NO_COLOR_ENV: &str = "NO_COLOR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// File path or http(s) URL of the repository JSON.
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_keystroke_delay_ms")]
    pub keystroke_delay_ms: u64,
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_step_delay_ms() -> u64 {
    400
}

fn default_settle_delay_ms() -> u64 {
    900
}

fn default_keystroke_delay_ms() -> u64 {
    35
}

fn default_color() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source: None,
            step_delay_ms: default_step_delay_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            keystroke_delay_ms: default_keystroke_delay_ms(),
            color: default_color(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables, or defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::load_persisted()?;

        // Environment variables override config file
        config.apply_env_overrides_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from file only, or defaults. Environment overrides
    /// are never applied here, so the result is what `save` may write back.
    pub fn load_persisted() -> Result<Self> {
        Ok(Self::load_persisted_from(&Self::get_config_path()?))
    }

    fn load_persisted_from(config_path: &Path) -> Self {
        Self::load_from_file(config_path).unwrap_or_else(|e| {
            info!("{}, using defaults", e);
            Self::default()
        })
    }

    fn load_from_file(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Err(anyhow!("No config file found"));
        }
        let content = fs::read_to_string(config_path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| anyhow!("Invalid config at {}: {}", config_path.display(), e))?;
        info!("Loaded config from: {}", config_path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(source) = lookup(DATA_ENV).filter(|s| !s.trim().is_empty()) {
            self.data_source = Some(source);
        }
        if lookup(INSTANT_ENV).is_some() {
            self.step_delay_ms = 0;
            self.settle_delay_ms = 0;
            self.keystroke_delay_ms = 0;
        }
        if lookup(NO_COLOR_ENV).is_some_and(|v| !v.is_empty()) {
            self.color = false;
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        info!("Saved config to: {}", config_path.display());
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".repoterm"))
    }

    /// Set the data source in the config file, leaving every other stored
    /// setting as it was
    pub fn save_data_source(source: &str) -> Result<Self> {
        Self::save_data_source_at(&Self::get_config_path()?, source)
    }

    fn save_data_source_at(config_path: &Path, source: &str) -> Result<Self> {
        let mut config = Self::load_persisted_from(config_path);
        config.data_source = Some(source.to_string());
        config.save_to(config_path)?;
        info!("Data source saved to config file");
        Ok(config)
    }

    /// Resolves the data source: `cli` first, then config/environment, then
    /// the default file.
    pub fn data_source(&self, cli: Option<&str>) -> DataSource {
        let spec = cli
            .or(self.data_source.as_deref())
            .unwrap_or(DEFAULT_DATA_SOURCE);
        DataSource::parse(spec)
    }

    pub fn tour_timing(&self) -> TourTiming {
        TourTiming {
            step_delay: Duration::from_millis(self.step_delay_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            keystroke_delay: Duration::from_millis(self.keystroke_delay_ms),
        }
    }

    pub fn show_config_info() -> Result<()> {
        let config = Self::load()?;
        config.show_config_info_with_io(&mut std::io::stdout())
    }

    pub fn show_config_info_with_io<W: Write>(&self, output: &mut W) -> Result<()> {
        let config_path = Self::get_config_path()?;
        writeln!(output, "Configuration file: {}", config_path.display())?;
        if config_path.exists() {
            writeln!(output, "Status: Found")?;
        } else {
            writeln!(output, "Status: Not found (using defaults)")?;
        }

        writeln!(output, "Data source: {}", self.data_source(None))?;
        writeln!(
            output,
            "Tour delays: step {}ms, settle {}ms, keystroke {}ms",
            self.step_delay_ms, self.settle_delay_ms, self.keystroke_delay_ms
        )?;
        writeln!(output, "Color: {}", self.color)?;

        writeln!(output, "\nTo set the data source:")?;
        writeln!(output, "  repoterm --set-data <path-or-url>")?;
        writeln!(output, "\nOr set environment variable:")?;
        writeln!(output, "  export {}=<path-or-url>", DATA_ENV)?;

        Ok(())
    }
}
