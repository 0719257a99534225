//! Configuration management for tis-emu.
//!
//! Configuration is loaded from multiple sources in priority order:
//! 1. Environment variables (TIS_EMU_MAX_TICKS, TIS_EMU_TRACE)
//! 2. Project-local config file (`./tis-emu.toml`)
//! 3. User config file (`~/.config/tis-emu/config.toml`)
//! 4. Built-in defaults
//!
//! # Config File Format
//!
//! ```toml
//! # tis-emu.toml
//!
//! # Give up on a program after this many board ticks
//! max_ticks = 10000
//!
//! # Print every output queue after each tick
//! trace_outputs = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global cached configuration.
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Tick budget used when nothing is configured.
pub const DEFAULT_MAX_TICKS: u64 = 10_000;

/// tis-emu configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Upper bound on ticks for runs that wait for a condition.
    /// Programs may loop forever, so every driven run is bounded.
    pub max_ticks: Option<u64>,

    /// Print output queues after every tick in the console runner.
    pub trace_outputs: Option<bool>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Project-local `tis-emu.toml`
    /// 3. User config `~/.config/tis-emu/config.toml`
    /// 4. Defaults
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(user_config) = Self::load_user_config() {
            config.merge(user_config);
        }

        if let Some(local_config) = Self::load_local_config() {
            config.merge(local_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Get the cached global configuration.
    ///
    /// Loads configuration on first call and caches it.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(|| {
            let config = Self::load();
            log::debug!("Loaded configuration: {:?}", config);
            config
        })
    }

    /// Tick budget, with fallback to [`DEFAULT_MAX_TICKS`].
    pub fn max_ticks(&self) -> u64 {
        self.max_ticks.unwrap_or(DEFAULT_MAX_TICKS)
    }

    pub fn trace_outputs(&self) -> bool {
        self.trace_outputs.unwrap_or(false)
    }

    /// Load user configuration from ~/.config/tis-emu/config.toml
    fn load_user_config() -> Option<Self> {
        let path = Self::user_config_path()?;
        Self::load_from_file(&path)
    }

    /// Load project-local configuration from ./tis-emu.toml
    fn load_local_config() -> Option<Self> {
        let local_path = Path::new("tis-emu.toml");
        if let Some(config) = Self::load_from_file(local_path) {
            return Some(config);
        }

        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let project_path = Path::new(&manifest_dir).join("tis-emu.toml");
            if let Some(config) = Self::load_from_file(&project_path) {
                return Some(config);
            }
        }

        None
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Merge another config into this one.
    /// Only overrides fields that are Some in the other config.
    fn merge(&mut self, other: Self) {
        if other.max_ticks.is_some() {
            self.max_ticks = other.max_ticks;
        }
        if other.trace_outputs.is_some() {
            self.trace_outputs = other.trace_outputs;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("TIS_EMU_MAX_TICKS") {
            match value.parse() {
                Ok(ticks) => {
                    log::info!("Using TIS_EMU_MAX_TICKS from environment: {}", ticks);
                    self.max_ticks = Some(ticks);
                }
                Err(e) => log::warn!("Ignoring TIS_EMU_MAX_TICKS={:?}: {}", value, e),
            }
        }
        if let Ok(value) = std::env::var("TIS_EMU_TRACE") {
            let enabled = matches!(value.as_str(), "1" | "true" | "yes");
            log::info!("Using TIS_EMU_TRACE from environment: {}", enabled);
            self.trace_outputs = Some(enabled);
        }
    }

    /// Get the path to the user config file (for display/creation).
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tis-emu").join("config.toml"))
    }

    /// Generate a sample config file content.
    pub fn sample_config() -> String {
        r#"# tis-emu configuration
# Place this file at ~/.config/tis-emu/config.toml or ./tis-emu.toml

# Give up on a run after this many board ticks (default 10000)
max_ticks = 10000

# Print every output queue after each tick (default false)
# trace_outputs = true
"#
        .to_string()
    }
}
