//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.wk-insight/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::analysis::dc_bias::DEFAULT_DROP_PERCENT;
use crate::analysis::mock::DEFAULT_TYPING_DELAY;
use crate::core::locale::Locale;
use crate::core::types::AnalysisMode;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct InsightConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub locale: Option<Locale>,
    pub default_mode: Option<AnalysisMode>,
    pub log_level: Option<String>,
    /// Seed the sidebar with example conversations.
    pub examples: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AnalysisConfig {
    pub typing_delay_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub drop_percent: Option<f64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub locale: Locale,
    pub default_mode: AnalysisMode,
    pub typing_delay: Duration,
    pub analysis_timeout: Duration,
    pub drop_percent: f64,
    pub log_level: LevelFilter,
    pub seed_examples: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_with(&InsightConfig::default(), &CliOverrides::default(), |_| None)
    }
}

/// Values given on the command line (None = not specified).
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub locale: Option<Locale>,
    pub mode: Option<AnalysisMode>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.wk-insight/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".wk-insight").join("config.toml"))
}

/// Load config from `~/.wk-insight/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `InsightConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<InsightConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(InsightConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<InsightConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(InsightConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: InsightConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG: &str = r#"# WK Insight Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# locale = "zh"                      # "zh" or "en"   (env: WK_INSIGHT_LOCALE, flag: --locale)
# default_mode = "identify_dut"      # "identify_dut", "interpret_graph", "dc_bias_saturation"
#                                    # (env: WK_INSIGHT_MODE, flag: --mode)
# log_level = "debug"                # "error", "warn", "info", "debug", "trace", "off"
#                                    # (env: WK_INSIGHT_LOG)
# examples = true                    # example conversations in the sidebar
#                                    # (env: WK_INSIGHT_EXAMPLES)

# [analysis]
# typing_delay_ms = 800              # env: WK_INSIGHT_TYPING_DELAY_MS
# timeout_ms = 30000
# drop_percent = 20.0                # inductance drop that defines saturation
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &InsightConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an explicit environment lookup.
pub fn resolve_with(
    config: &InsightConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Locale: CLI → env → config → default
    let locale = cli
        .locale
        .or_else(|| env("WK_INSIGHT_LOCALE").and_then(|v| Locale::parse(&v)))
        .or(config.general.locale)
        .unwrap_or_default();

    // Mode: CLI → env → config → default
    let default_mode = cli
        .mode
        .or_else(|| env("WK_INSIGHT_MODE").and_then(|v| AnalysisMode::parse(&v)))
        .or(config.general.default_mode)
        .unwrap_or_default();

    // Typing delay: env → config → default
    let typing_delay = env("WK_INSIGHT_TYPING_DELAY_MS")
        .and_then(|v| v.trim().parse().ok())
        .or(config.analysis.typing_delay_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TYPING_DELAY);

    // Log level: env → config → default
    let log_level = env("WK_INSIGHT_LOG")
        .or_else(|| config.general.log_level.clone())
        .and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .unwrap_or(DEFAULT_LOG_LEVEL);

    // Examples: env → config → default
    let seed_examples = env("WK_INSIGHT_EXAMPLES")
        .and_then(|v| parse_flag(&v))
        .or(config.general.examples)
        .unwrap_or(true);

    let drop_percent = config
        .analysis
        .drop_percent
        .filter(|p| p.is_finite() && *p > 0.0 && *p < 100.0)
        .unwrap_or(DEFAULT_DROP_PERCENT);

    ResolvedConfig {
        locale,
        default_mode,
        typing_delay,
        analysis_timeout: config
            .analysis
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_ANALYSIS_TIMEOUT),
        drop_percent,
        log_level,
        seed_examples,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
