use anyhow::{bail, Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::distance::{SimilarityScale, DEFAULT_SIMILARITY_SCALE};
use crate::source::{FullScan, LengthWindow, DEFAULT_EXHAUSTIVE_LIMIT, DEFAULT_FAST_LIMIT};

/// Top-level name scanned for environment overrides (`SEQSIM_*`).
pub const ENV_TOP_LEVEL: &str = "seqsim";

/// Prefix of environment variables that override config file values.
pub const ENV_PREFIX: &str = "SEQSIM_";

/// Configuration for seqsim.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (SEQSIM_* prefix)
/// 3. Config file (~/.config/seqsim/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite reference corpus.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/corpus.db
    /// - ENV: SEQSIM_DATABASE_PATH
    /// - Config: database_path = "/path/to/corpus.db"
    /// - Default: ~/.local/share/seqsim/corpus.db
    pub database_path: PathBuf,

    /// Path to the pretrained scaler artifact (JSON with `mean` and `scale`).
    ///
    /// Can be set via:
    /// - CLI: --scaler /path/to/scaler.json
    /// - ENV: SEQSIM_SCALER_PATH
    /// - Default: ~/.local/share/seqsim/scaler.json
    pub scaler_path: PathBuf,

    /// Results returned when the caller does not ask for a count.
    #[serde(deserialize_with = "number")]
    pub top_n: usize,

    /// Distance at which the similarity score reaches zero.
    #[serde(deserialize_with = "number")]
    pub similarity_scale: f64,

    /// Lower bound of the fast-mode window as a fraction of query length.
    #[serde(deserialize_with = "number")]
    pub window_lower: f64,

    /// Upper bound of the fast-mode window as a fraction of query length.
    #[serde(deserialize_with = "number")]
    pub window_upper: f64,

    /// Maximum candidates scanned in fast mode.
    #[serde(deserialize_with = "number")]
    pub fast_scan_limit: usize,

    /// Maximum candidates scanned in exhaustive mode.
    #[serde(deserialize_with = "number")]
    pub exhaustive_scan_limit: usize,

    /// Optional budget for the scan-and-score loop, in milliseconds.
    #[serde(deserialize_with = "optional_number")]
    pub search_deadline_ms: Option<u64>,

    /// Shortest cleaned query the CLI accepts.
    #[serde(deserialize_with = "number")]
    pub min_sequence_length: usize,

    /// Log filter used when RUST_LOG is unset (e.g. "info", "seqsim=debug").
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_data_path("corpus.db"),
            scaler_path: default_data_path("scaler.json"),
            top_n: 10,
            similarity_scale: DEFAULT_SIMILARITY_SCALE,
            window_lower: 0.8,
            window_upper: 1.2,
            fast_scan_limit: DEFAULT_FAST_LIMIT,
            exhaustive_scan_limit: DEFAULT_EXHAUSTIVE_LIMIT,
            search_deadline_ms: None,
            min_sequence_length: 10,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or an
    /// override holds an invalid value.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `path` (if it exists) and the environment.
    ///
    /// `SEQSIM_*` variables override the file; missing keys take their
    /// defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if path.exists() {
            let path_str = path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
        }

        builder
            .add_env(env::Options::with_top_level(ENV_TOP_LEVEL))
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid TOML")?;
        Ok(config)
    }

    /// Check that the values can build a working pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            bail!("top_n must be at least 1");
        }
        if SimilarityScale::new(self.similarity_scale).is_none() {
            bail!(
                "similarity_scale must be finite and positive, got {}",
                self.similarity_scale
            );
        }
        LengthWindow::new(self.window_lower, self.window_upper, self.fast_scan_limit)?;
        if self.fast_scan_limit == 0 || self.exhaustive_scan_limit == 0 {
            bail!("scan limits must be at least 1");
        }
        Ok(())
    }

    /// The similarity mapping.
    pub fn similarity(&self) -> Result<SimilarityScale> {
        SimilarityScale::new(self.similarity_scale).with_context(|| {
            format!(
                "similarity_scale must be finite and positive, got {}",
                self.similarity_scale
            )
        })
    }

    /// The fast-mode candidate source.
    pub fn length_window(&self) -> Result<LengthWindow> {
        Ok(LengthWindow::new(
            self.window_lower,
            self.window_upper,
            self.fast_scan_limit,
        )?)
    }

    /// The exhaustive-mode candidate source.
    #[must_use]
    pub const fn full_scan(&self) -> FullScan {
        FullScan::new(self.exhaustive_scan_limit)
    }

    #[must_use]
    pub fn search_deadline(&self) -> Option<Duration> {
        self.search_deadline_ms.map(Duration::from_millis)
    }

    /// Override the corpus path (the --db CLI flag).
    #[must_use]
    pub fn with_database_path(mut self, path: PathBuf) -> Self {
        self.database_path = path;
        self
    }

    /// Override the scaler path (the --scaler CLI flag).
    #[must_use]
    pub fn with_scaler_path(mut self, path: PathBuf) -> Self {
        self.scaler_path = path;
        self
    }
}

/// Environment overrides arrive as strings, so numeric keys accept both.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

fn number<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match NumberOrText::<T>::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(text) => text
            .trim()
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid number {text:?}: {e}"))),
    }
}

/// An empty string clears the value.
fn optional_number<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match NumberOrText::<T>::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(Some(n)),
        NumberOrText::Text(text) if text.trim().is_empty() => Ok(None),
        NumberOrText::Text(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid number {text:?}: {e}"))),
    }
}

/// Default location of data files.
///
/// Returns: ~/.local/share/seqsim/<name> (or platform equivalent)
fn default_data_path(name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("seqsim")
        .join(name)
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/seqsim/config.toml
/// - macOS: ~/Library/Application Support/seqsim/config.toml
/// - Windows: %APPDATA%\seqsim\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("seqsim")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# seqsim Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (SEQSIM_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite reference corpus (read-only)
#
# Can also be set via:
# - CLI: seqsim --db /custom/corpus.db predict ...
# - Environment: SEQSIM_DATABASE_PATH=/custom/corpus.db
#database_path = "/path/to/corpus.db"

# Path to the pretrained scaler artifact
#
# A JSON object with 27-element "mean" and "scale" arrays.
#scaler_path = "/path/to/scaler.json"

# Number of matches returned by default
top_n = 10

# Distance at which the similarity score drops to 0
similarity_scale = 10.0

# Fast mode only ranks entries whose length lies within
# [window_lower * len, window_upper * len] of the query
window_lower = 0.8
window_upper = 1.2

# Upper bounds on candidates scanned per query
fast_scan_limit = 50000
exhaustive_scan_limit = 100000

# Give up on a query after this many milliseconds of scanning
#search_deadline_ms = 2000

# Shortest accepted query after removing non-residue symbols
min_sequence_length = 10

# Log filter when RUST_LOG is unset
log_level = "info"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
