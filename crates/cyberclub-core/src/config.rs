//! Configuration loading and validation.
//!
//! Config lives at `~/.cyberclub/config.toml`. Every field has a serde
//! default so a partial file (or none at all) still produces a runnable
//! gateway; the bot role additionally requires a Discord token and the
//! broadcast channel ids, checked at startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClubError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClubConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// HTTP API bind address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// Document store location.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Path to the sqlite file. Defaults to `~/.cyberclub/content.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn db_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| ClubConfig::home_dir().join("content.db"))
    }
}

/// How the bot reaches the content API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout; a hung store call fails rather than hangs.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000".into()
}
fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Discord credentials. The token can also come from the
/// `CYBERCLUB_DISCORD_TOKEN` environment variable, which wins over the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub application_id: String,
    /// Register slash commands guild-scoped when set (instant propagation),
    /// globally otherwise.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Gateway intents bitmask.
    #[serde(default = "default_intents")]
    pub intents: u64,
}

fn default_intents() -> u64 {
    // GUILDS
    1 << 0
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            application_id: String::new(),
            guild_id: None,
            intents: default_intents(),
        }
    }
}

/// Destination channels for lifecycle notifications.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BroadcastConfig {
    /// Channel for event-added / event-pruned announcements.
    #[serde(default)]
    pub events_channel_id: String,
    /// Channel for the daily fact.
    #[serde(default)]
    pub facts_channel_id: String,
}

/// Recurring job settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// How often the expired-event pruner runs.
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
    /// Events older than this past their date are pruned.
    #[serde(default = "default_grace_minutes")]
    pub grace_minutes: i64,
    /// Cron expression for the daily fact broadcast, evaluated in `timezone`.
    #[serde(default = "default_daily_fact_cron")]
    pub daily_fact_cron: String,
    /// IANA zone name the cron fires in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_prune_interval_secs() -> u64 {
    60
}
fn default_grace_minutes() -> i64 {
    10
}
fn default_daily_fact_cron() -> String {
    "0 7 * * *".into()
}
fn default_timezone() -> String {
    "UTC".into()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            prune_interval_secs: default_prune_interval_secs(),
            grace_minutes: default_grace_minutes(),
            daily_fact_cron: default_daily_fact_cron(),
            timezone: default_timezone(),
        }
    }
}

impl ClubConfig {
    /// `~/.cyberclub` — config, store, and anything else we persist.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cyberclub")
    }

    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Load from the default location; defaults when the file is absent.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default().with_env_overrides())
        }
    }

    /// Load from an explicit path; the file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|_| ClubError::ConfigNotFound(path.display().to_string()))?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| ClubError::config(format!("Invalid config {}: {e}", path.display())))?;
        Ok(config.with_env_overrides())
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)
            .map_err(|e| ClubError::config(format!("Cannot serialize config: {e}")))?;
        std::fs::write(&path, raw)?;
        Ok(())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var("CYBERCLUB_DISCORD_TOKEN") {
            if !token.is_empty() {
                self.discord.bot_token = token;
            }
        }
        self
    }

    /// The bot role cannot start without credentials and destinations.
    /// These are the only failures that are fatal at process start.
    pub fn validate_for_bot(&self) -> Result<()> {
        if self.discord.bot_token.is_empty() {
            return Err(ClubError::config(
                "discord.bot_token is required (or set CYBERCLUB_DISCORD_TOKEN)",
            ));
        }
        if self.discord.application_id.is_empty() {
            return Err(ClubError::config("discord.application_id is required"));
        }
        if self.broadcast.events_channel_id.is_empty() {
            return Err(ClubError::config("broadcast.events_channel_id is required"));
        }
        if self.broadcast.facts_channel_id.is_empty() {
            return Err(ClubError::config("broadcast.facts_channel_id is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClubConfig::default();
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.scheduler.prune_interval_secs, 60);
        assert_eq!(config.scheduler.grace_minutes, 10);
        assert_eq!(config.scheduler.daily_fact_cron, "0 7 * * *");
        assert_eq!(config.scheduler.timezone, "UTC");
        assert_eq!(config.client.request_timeout_secs, 10);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: ClubConfig = toml::from_str(
            r#"
            [gateway]
            port = 9000

            [broadcast]
            events_channel_id = "123"
            "#,
        )
        .expect("partial config parses");
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.broadcast.events_channel_id, "123");
        assert!(config.broadcast.facts_channel_id.is_empty());
    }

    #[test]
    fn test_bot_validation_requires_token_and_channels() {
        let mut config = ClubConfig::default();
        assert!(matches!(
            config.validate_for_bot(),
            Err(ClubError::Config(_))
        ));

        config.discord.bot_token = "token".into();
        config.discord.application_id = "app".into();
        config.broadcast.events_channel_id = "1".into();
        config.broadcast.facts_channel_id = "2".into();
        assert!(config.validate_for_bot().is_ok());
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = ClubConfig::load_from(Path::new("/nonexistent/config.toml"))
            .expect_err("missing file fails");
        assert!(matches!(err, ClubError::ConfigNotFound(_)));
    }
}
