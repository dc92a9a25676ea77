//! Configuration loading and resolution
//!
//! Every setting resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (handled together with 1 by clap's `env`)
//! 3. TOML config file
//! 4. Compiled default, or absent
//!
//! Blank values count as absent at every tier. A missing or malformed TOML
//! file never stops startup: it is logged and ignored.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory name used under the platform config/data directories
pub const APP_DIR: &str = "leadgen";

/// Default listening port of the webhook receiver
pub const DEFAULT_PORT: u16 = 5780;

/// Settings readable from the TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Discord webhook used for search notifications
    #[serde(default)]
    pub discord_webhook_url: Option<String>,
    /// Enrichment API webhook the proxies forward to
    #[serde(default)]
    pub clay_webhook_url: Option<String>,
    /// Origin header sent with proxied requests
    #[serde(default)]
    pub public_origin: Option<String>,
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_key: Option<String>,
    /// Base URL of the webhook receiver (poll client side)
    #[serde(default)]
    pub server_url: Option<String>,
    /// SQLite file for the durable result store
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub port: Option<u16>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the explicit path, else the platform default, else defaults
    ///
    /// An explicitly named file that cannot be read is reported with a
    /// warning; an absent default file is silently skipped.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return match Self::load(path) {
                Ok(config) => {
                    info!("Loaded config file: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("{}; continuing with defaults", e);
                    Self::default()
                }
            };
        }

        match default_config_path() {
            Some(path) if path.exists() => match Self::load(&path) {
                Ok(config) => {
                    info!("Loaded config file: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("{}; continuing with defaults", e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }
}

/// Platform config file path (`~/.config/leadgen/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Platform default location of the SQLite result store
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join("results.db"))
        .unwrap_or_else(|| PathBuf::from("./leadgen_data/results.db"))
}

/// True for empty or whitespace-only values
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// First non-blank value: CLI/env, then TOML
pub fn resolve_setting(cli_or_env: Option<String>, toml_value: Option<&str>) -> Option<String> {
    cli_or_env
        .filter(|v| !is_blank(v))
        .or_else(|| toml_value.filter(|v| !is_blank(v)).map(str::to_string))
        .map(|v| v.trim().to_string())
}

/// External collaborators the services talk to
///
/// Every field is optional: a missing URL disables the feature that needs it
/// (with an explicit error at request time) rather than stopping the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Integrations {
    pub discord_webhook_url: Option<String>,
    pub clay_webhook_url: Option<String>,
    pub public_origin: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
}

impl Integrations {
    /// Merge CLI/env overrides over TOML values
    pub fn resolve(overrides: Integrations, toml: &TomlConfig) -> Self {
        Self {
            discord_webhook_url: resolve_setting(
                overrides.discord_webhook_url,
                toml.discord_webhook_url.as_deref(),
            ),
            clay_webhook_url: resolve_setting(
                overrides.clay_webhook_url,
                toml.clay_webhook_url.as_deref(),
            ),
            public_origin: resolve_setting(overrides.public_origin, toml.public_origin.as_deref()),
            supabase_url: resolve_setting(overrides.supabase_url, toml.supabase_url.as_deref()),
            supabase_key: resolve_setting(overrides.supabase_key, toml.supabase_key.as_deref()),
        }
    }

    /// Log which integrations are available (never the values themselves)
    pub fn log_summary(&self) {
        let state = |v: &Option<String>| if v.is_some() { "configured" } else { "not configured" };
        info!("Discord webhook: {}", state(&self.discord_webhook_url));
        info!("Clay webhook: {}", state(&self.clay_webhook_url));
        info!("Supabase: {}", state(&self.supabase_url));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_setting_priority() {
        assert_eq!(
            resolve_setting(Some("cli".into()), Some("toml")),
            Some("cli".to_string())
        );
        assert_eq!(resolve_setting(None, Some("toml")), Some("toml".to_string()));
        assert_eq!(resolve_setting(None, None), None);
    }

    #[test]
    fn test_resolve_setting_skips_blank_values() {
        assert_eq!(
            resolve_setting(Some("   ".into()), Some("toml")),
            Some("toml".to_string())
        );
        assert_eq!(resolve_setting(Some(String::new()), Some("")), None);
        assert_eq!(resolve_setting(Some(" padded ".into()), None), Some("padded".to_string()));
    }

    #[test]
    fn test_integrations_merge() {
        let toml = TomlConfig {
            discord_webhook_url: Some("https://discord.test/hook".into()),
            clay_webhook_url: Some("https://clay.test/a".into()),
            ..Default::default()
        };
        let overrides = Integrations {
            clay_webhook_url: Some("https://clay.test/b".into()),
            ..Default::default()
        };

        let merged = Integrations::resolve(overrides, &toml);
        assert_eq!(merged.discord_webhook_url.as_deref(), Some("https://discord.test/hook"));
        assert_eq!(merged.clay_webhook_url.as_deref(), Some("https://clay.test/b"));
        assert_eq!(merged.supabase_url, None);
    }

    #[test]
    fn test_default_database_path_ends_with_file_name() {
        assert!(default_database_path().ends_with("results.db"));
    }
}
