//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/tidylist/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/tidylist/` (~/.config/tidylist/)
//! - Data: `$XDG_DATA_HOME/tidylist/` (~/.local/share/tidylist/)
//! - State/Logs: `$XDG_STATE_HOME/tidylist/` (~/.local/state/tidylist/)

use crate::error::{Error, Result};
use crate::locale::Locale;
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Who the local data belongs to
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Analytics thresholds and windows
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// TidyBot text provider (optional)
    #[serde(default)]
    pub tidybot: Option<TidyBotConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local profile settings
#[derive(Debug, Deserialize, Clone)]
pub struct ProfileConfig {
    /// User id that scopes every query
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Language for recommendation text and TidyBot answers
    #[serde(default)]
    pub locale: Locale,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            locale: Locale::default(),
        }
    }
}

fn default_user_id() -> String {
    "local".to_string()
}

// ============================================
// Analytics policy
// ============================================

/// Analytics policy: every tunable threshold the engine uses.
///
/// Defaults reproduce the historical TidyList behaviour. None of these
/// numbers have a documented rationale; treat them as product policy.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// Offset from UTC (minutes) used for calendar weeks, weekdays and hours
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Length of the insight comparison window in days
    #[serde(default = "default_trend_window_days")]
    pub trend_window_days: u32,

    /// Length of the burnout / pattern window in days
    #[serde(default = "default_burnout_window_days")]
    pub burnout_window_days: u32,

    /// Recommendation trigger thresholds
    #[serde(default)]
    pub recommendations: RecommendationThresholds,

    /// Burnout risk bands
    #[serde(default)]
    pub burnout: BurnoutThresholds,

    /// Contextual suggestion settings
    #[serde(default)]
    pub suggestions: SuggestionConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            trend_window_days: default_trend_window_days(),
            burnout_window_days: default_burnout_window_days(),
            recommendations: RecommendationThresholds::default(),
            burnout: BurnoutThresholds::default(),
            suggestions: SuggestionConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    /// The configured offset as a chrono timezone.
    pub fn offset(&self) -> Result<chrono::FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(chrono::FixedOffset::east_opt)
            .ok_or_else(|| {
                Error::Config(format!(
                    "analytics.utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ))
            })
    }

    /// Validate windows and bands, returning an error message if invalid
    pub fn validate(&self) -> Result<()> {
        self.offset()?;
        for (name, days) in [
            ("trend_window_days", self.trend_window_days),
            ("burnout_window_days", self.burnout_window_days),
        ] {
            if days == 0 || days > MAX_WINDOW_DAYS {
                return Err(Error::Config(format!(
                    "analytics.{name} must be between 1 and {MAX_WINDOW_DAYS} (got {days})"
                )));
            }
        }
        self.burnout.validate()?;
        if self.suggestions.max_suggestions == 0 {
            return Err(Error::Config(
                "analytics.suggestions.max_suggestions must be at least 1".to_string(),
            ));
        }
        if self.suggestions.upcoming_days > MAX_WINDOW_DAYS {
            return Err(Error::Config(format!(
                "analytics.suggestions.upcoming_days must be at most {MAX_WINDOW_DAYS} (got {})",
                self.suggestions.upcoming_days
            )));
        }
        Ok(())
    }
}

/// Upper bound for any configured window, in days.
pub const MAX_WINDOW_DAYS: u32 = 3650;

fn default_trend_window_days() -> u32 {
    7
}

fn default_burnout_window_days() -> u32 {
    30
}

/// Thresholds for the recommendation rules. A rule fires when its value is
/// strictly beyond the threshold.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RecommendationThresholds {
    /// LOW_COMPLETION when completion rate < this
    #[serde(default = "default_low_completion_rate")]
    pub low_completion_rate: i32,

    /// PRODUCTIVITY_DROP when weekly change < this
    #[serde(default = "default_productivity_drop")]
    pub productivity_drop: i32,

    /// MANY_OVERDUE when overdue count > this
    #[serde(default = "default_many_overdue")]
    pub many_overdue: usize,

    /// TOO_MANY_HIGH_PRIORITY when backlog > this
    #[serde(default = "default_too_many_high_priority")]
    pub too_many_high_priority: usize,

    /// LONG_AVERAGE_TASK when average minutes > this
    #[serde(default = "default_long_average_minutes")]
    pub long_average_minutes: u32,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            low_completion_rate: default_low_completion_rate(),
            productivity_drop: default_productivity_drop(),
            many_overdue: default_many_overdue(),
            too_many_high_priority: default_too_many_high_priority(),
            long_average_minutes: default_long_average_minutes(),
        }
    }
}

fn default_low_completion_rate() -> i32 {
    50
}

fn default_productivity_drop() -> i32 {
    -10
}

fn default_many_overdue() -> usize {
    3
}

fn default_too_many_high_priority() -> usize {
    5
}

fn default_long_average_minutes() -> u32 {
    120
}

/// A pair of thresholds: reaching `medium` raises a signal, reaching `high`
/// raises it twice.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct Band {
    pub medium: u64,
    pub high: u64,
}

impl Band {
    const fn new(medium: u64, high: u64) -> Self {
        Self { medium, high }
    }
}

/// Burnout risk bands over the rolling burnout window.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BurnoutThresholds {
    /// Total completed minutes
    #[serde(default = "default_burnout_total_minutes")]
    pub total_minutes: Band,

    /// Average minutes per completed task
    #[serde(default = "default_burnout_average_minutes")]
    pub average_minutes: Band,

    /// Overdue open tasks
    #[serde(default = "default_burnout_overdue")]
    pub overdue: Band,
}

impl Default for BurnoutThresholds {
    fn default() -> Self {
        Self {
            total_minutes: default_burnout_total_minutes(),
            average_minutes: default_burnout_average_minutes(),
            overdue: default_burnout_overdue(),
        }
    }
}

impl BurnoutThresholds {
    fn validate(&self) -> Result<()> {
        for (name, band) in [
            ("total_minutes", self.total_minutes),
            ("average_minutes", self.average_minutes),
            ("overdue", self.overdue),
        ] {
            if band.medium > band.high {
                return Err(Error::Config(format!(
                    "analytics.burnout.{name}: medium ({}) must not exceed high ({})",
                    band.medium, band.high
                )));
            }
        }
        Ok(())
    }
}

fn default_burnout_total_minutes() -> Band {
    Band::new(2400, 4800)
}

fn default_burnout_average_minutes() -> Band {
    Band::new(90, 180)
}

fn default_burnout_overdue() -> Band {
    Band::new(3, 6)
}

/// Contextual suggestion settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SuggestionConfig {
    /// BUSY_DAY when more open tasks than this were created today
    #[serde(default = "default_busy_day_tasks")]
    pub busy_day_tasks: usize,

    /// How far ahead to look for high-priority deadlines (days)
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u32,

    /// IMPROVE_PRODUCTIVITY when 7-day completion rate is below this
    #[serde(default = "default_low_completion_rate")]
    pub low_completion_rate: i32,

    /// Maximum number of suggestions returned
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            busy_day_tasks: default_busy_day_tasks(),
            upcoming_days: default_upcoming_days(),
            low_completion_rate: default_low_completion_rate(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

fn default_busy_day_tasks() -> usize {
    5
}

fn default_upcoming_days() -> u32 {
    3
}

fn default_max_suggestions() -> usize {
    3
}

// ============================================
// TidyBot
// ============================================

/// Insight text provider configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TidyBotConfig {
    /// Provider type
    #[serde(default)]
    pub provider: TextProviderKind,
    /// Model to use
    #[serde(default = "default_tidybot_model")]
    pub model: String,
    /// API endpoint (optional, uses default for provider)
    pub endpoint: Option<String>,
    /// API key (can also use env var)
    pub api_key: Option<String>,
    /// HTTP request timeout in seconds
    #[serde(default = "default_tidybot_timeout")]
    pub timeout_secs: u64,
}

impl Default for TidyBotConfig {
    fn default() -> Self {
        Self {
            provider: TextProviderKind::default(),
            model: default_tidybot_model(),
            endpoint: None,
            api_key: None,
            timeout_secs: default_tidybot_timeout(),
        }
    }
}

/// Supported insight text providers
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextProviderKind {
    #[default]
    Gemini,
    Ollama,
}

impl TextProviderKind {
    /// Returns the default endpoint for this provider
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            TextProviderKind::Gemini => "https://generativelanguage.googleapis.com",
            TextProviderKind::Ollama => "http://localhost:11434",
        }
    }

    /// Environment variable consulted when no api_key is configured
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            TextProviderKind::Gemini => Some("GEMINI_API_KEY"),
            TextProviderKind::Ollama => None,
        }
    }
}

fn default_tidybot_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_tidybot_timeout() -> u64 {
    60
}

// ============================================
// Logging
// ============================================

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.analytics.validate()?;

        Ok(config)
    }

    /// Returns the TidyBot settings, falling back to defaults when the
    /// section is absent.
    pub fn tidybot_or_default(&self) -> TidyBotConfig {
        self.tidybot.clone().unwrap_or_default()
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/tidylist/config.toml` (~/.config/tidylist/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("tidylist").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/tidylist/` (~/.local/share/tidylist/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("tidylist")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/tidylist/` (~/.local/state/tidylist/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("tidylist")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/tidylist/data.db` (~/.local/share/tidylist/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/tidylist/tidylist.log` (~/.local/state/tidylist/tidylist.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("tidylist.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.tidybot.is_none());
        assert_eq!(config.profile.user_id, "local");
        assert_eq!(config.analytics.trend_window_days, 7);
        assert_eq!(config.analytics.burnout_window_days, 30);
        assert_eq!(config.analytics.recommendations.low_completion_rate, 50);
        assert_eq!(config.analytics.recommendations.productivity_drop, -10);
        assert_eq!(config.analytics.recommendations.many_overdue, 3);
        assert_eq!(config.analytics.recommendations.too_many_high_priority, 5);
        assert_eq!(config.analytics.recommendations.long_average_minutes, 120);
        assert!(config.analytics.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[profile]
user_id = "alice"
locale = "id"

[analytics]
utc_offset_minutes = 420

[analytics.recommendations]
many_overdue = 10

[analytics.burnout]
overdue = { medium = 2, high = 4 }

[tidybot]
provider = "ollama"
model = "llama3.2"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.profile.user_id, "alice");
        assert_eq!(config.profile.locale, Locale::Indonesian);
        assert_eq!(config.analytics.utc_offset_minutes, 420);
        assert_eq!(config.analytics.recommendations.many_overdue, 10);
        // Unspecified thresholds keep their defaults
        assert_eq!(config.analytics.recommendations.long_average_minutes, 120);
        assert_eq!(config.analytics.burnout.overdue, Band::new(2, 4));
        assert_eq!(config.analytics.burnout.average_minutes, Band::new(90, 180));

        let tidybot = config.tidybot.unwrap();
        assert_eq!(tidybot.provider, TextProviderKind::Ollama);
        assert_eq!(tidybot.model, "llama3.2");
        assert_eq!(tidybot.timeout_secs, 60);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validate_rejects_inverted_band() {
        let mut analytics = AnalyticsConfig::default();
        analytics.burnout.total_minutes = Band::new(500, 100);
        assert!(analytics.validate().is_err());

        let mut analytics = AnalyticsConfig::default();
        analytics.trend_window_days = 0;
        assert!(analytics.validate().is_err());

        let mut analytics = AnalyticsConfig::default();
        analytics.utc_offset_minutes = 24 * 60;
        assert!(analytics.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        // Would overflow when converted to seconds
        let mut analytics = AnalyticsConfig::default();
        analytics.utc_offset_minutes = 40_000_000;
        assert!(analytics.offset().is_err());
        assert!(analytics.validate().is_err());

        let mut analytics = AnalyticsConfig::default();
        analytics.burnout_window_days = 200_000_000;
        assert!(analytics.validate().is_err());

        let mut analytics = AnalyticsConfig::default();
        analytics.trend_window_days = MAX_WINDOW_DAYS + 1;
        assert!(analytics.validate().is_err());

        let mut analytics = AnalyticsConfig::default();
        analytics.suggestions.upcoming_days = u32::MAX;
        assert!(analytics.validate().is_err());

        let mut analytics = AnalyticsConfig::default();
        analytics.trend_window_days = MAX_WINDOW_DAYS;
        analytics.burnout_window_days = MAX_WINDOW_DAYS;
        assert!(analytics.validate().is_ok());
    }

    #[test]
    fn test_provider_endpoints() {
        assert_eq!(
            TextProviderKind::Gemini.default_endpoint(),
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(
            TextProviderKind::Ollama.default_endpoint(),
            "http://localhost:11434"
        );
        assert_eq!(TextProviderKind::Gemini.api_key_env(), Some("GEMINI_API_KEY"));
    }

    #[test]
    fn test_paths_live_under_tidylist() {
        assert!(Config::config_path().ends_with("tidylist/config.toml"));
        assert!(Config::database_path().ends_with("tidylist/data.db"));
        assert!(Config::log_path().ends_with("tidylist/tidylist.log"));
    }
}
