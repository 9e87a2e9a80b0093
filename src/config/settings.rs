//! Bot settings.
//!
//! Settings are layered: the TOML file named by `BOT_CONFIG_PATH` (default
//! `config.toml`), then `config.development.toml` in debug builds, then the
//! `DISCORD_BOT_*` environment variables. Every layer is optional; only the
//! token is required once all layers are merged.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{fmt, fs, path::Path, path::PathBuf};

/// Environment variable naming the main config file
pub const CONFIG_PATH_VAR: &str = "BOT_CONFIG_PATH";
/// Config file used when `BOT_CONFIG_PATH` is unset
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
/// Overlay read on top of the main file in debug builds
pub const DEVELOPMENT_CONFIG_PATH: &str = "config.development.toml";
/// Log directory used by release builds when none is configured
pub const DEFAULT_LOG_DIR: &str = ".logs.d";

const TOKEN_VAR: &str = "DISCORD_BOT_TOKEN";
const GUILD_ID_VAR: &str = "DISCORD_BOT_GUILD_ID";
const PROXY_URL_VAR: &str = "DISCORD_BOT_PROXY_URL";
const LOG_DIR_VAR: &str = "DISCORD_BOT_LOG_DIR";

/// One layer of settings as written in a TOML file.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    /// `[discord_bot]` table
    pub discord_bot: DiscordBotSection,
    /// `[connection_strings]` table
    pub connection_strings: ConnectionStrings,
    /// `[logging]` table
    pub logging: LoggingSection,
}

/// Discord credentials and registration target.
#[derive(Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DiscordBotSection {
    /// Bot token
    pub token: Option<String>,
    /// Guild that receives the slash commands, kept as text until registration
    pub guild_id: Option<String>,
}

impl fmt::Debug for DiscordBotSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordBotSection")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("guild_id", &self.guild_id)
            .finish()
    }
}

/// Outbound connection settings.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConnectionStrings {
    /// Proxy that Discord HTTP requests are sent through
    pub proxy_url: Option<String>,
}

/// Log output settings.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSection {
    /// Directory for log files; empty disables file logging
    pub directory: Option<String>,
}

impl FileConfig {
    /// Parses a TOML document.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses `path`. A missing file yields `None`.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            tracing::debug!("No configuration file at {:?}", path_ref);
            return Ok(None);
        }
        let contents = fs::read_to_string(path_ref).map_err(|e| {
            Error::Config(format!("Failed to read config file {path_ref:?}: {e}"))
        })?;
        Self::parse(&contents)
            .map(Some)
            .map_err(|e| Error::Config(format!("Failed to parse config file {path_ref:?}: {e}")))
    }

    /// Overlays `other` on `self`; values present in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            discord_bot: DiscordBotSection {
                token: other.discord_bot.token.or(self.discord_bot.token),
                guild_id: other.discord_bot.guild_id.or(self.discord_bot.guild_id),
            },
            connection_strings: ConnectionStrings {
                proxy_url: other
                    .connection_strings
                    .proxy_url
                    .or(self.connection_strings.proxy_url),
            },
            logging: LoggingSection {
                directory: other.logging.directory.or(self.logging.directory),
            },
        }
    }

    /// Builds the environment layer from a variable lookup.
    pub fn from_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            discord_bot: DiscordBotSection {
                token: lookup(TOKEN_VAR),
                guild_id: lookup(GUILD_ID_VAR),
            },
            connection_strings: ConnectionStrings {
                proxy_url: lookup(PROXY_URL_VAR),
            },
            logging: LoggingSection {
                directory: lookup(LOG_DIR_VAR),
            },
        }
    }
}

/// Validated settings used by the running bot.
#[derive(Clone)]
pub struct BotConfig {
    /// Bot token
    pub token: String,
    /// Raw guild id; parsed when commands are registered
    pub guild_id: Option<String>,
    /// HTTP proxy for Discord API requests
    pub proxy_url: Option<String>,
    /// Directory for log files, `None` for console only
    pub log_dir: Option<PathBuf>,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("guild_id", &self.guild_id)
            .field("proxy_url", &self.proxy_url)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl BotConfig {
    /// Validates a merged configuration.
    ///
    /// `default_log_dir` is used when no layer names a log directory.
    pub fn from_file_config(config: FileConfig, default_log_dir: Option<&str>) -> Result<Self> {
        let token = non_empty(config.discord_bot.token).ok_or_else(|| {
            Error::Config(format!(
                "No bot token configured; set {TOKEN_VAR} or [discord_bot].token"
            ))
        })?;

        let proxy_url = non_empty(config.connection_strings.proxy_url);
        if let Some(url) = &proxy_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "Proxy URL must start with http:// or https://, got {url:?}"
                )));
            }
        }

        let log_dir = match config.logging.directory {
            Some(dir) => non_empty(Some(dir)).map(PathBuf::from),
            None => default_log_dir.map(PathBuf::from),
        };

        Ok(Self {
            token,
            guild_id: non_empty(config.discord_bot.guild_id),
            proxy_url,
            log_dir,
        })
    }
}

/// Loads the bot configuration from all layers.
///
/// Call after `dotenvy::dotenv()` so `.env` values are visible.
pub fn load_bot_configuration() -> Result<BotConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut merged = FileConfig::read(&path)?.unwrap_or_default();

    if cfg!(debug_assertions) {
        if let Some(development) = FileConfig::read(DEVELOPMENT_CONFIG_PATH)? {
            merged = merged.merge(development);
        }
    }

    merged = merged.merge(FileConfig::from_env(|key| std::env::var(key).ok()));

    let default_log_dir = if cfg!(debug_assertions) {
        None
    } else {
        Some(DEFAULT_LOG_DIR)
    };
    BotConfig::from_file_config(merged, default_log_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const FULL_CONFIG: &str = r#"
        [discord_bot]
        token = "file-token"
        guild_id = "123456789012345678"

        [connection_strings]
        proxy_url = "http://127.0.0.1:3000"

        [logging]
        directory = "logs"
    "#;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_full_config() -> Result<()> {
        let config = FileConfig::parse(FULL_CONFIG)?;
        assert_eq!(config.discord_bot.token.as_deref(), Some("file-token"));
        assert_eq!(
            config.discord_bot.guild_id.as_deref(),
            Some("123456789012345678")
        );
        assert_eq!(
            config.connection_strings.proxy_url.as_deref(),
            Some("http://127.0.0.1:3000")
        );
        assert_eq!(config.logging.directory.as_deref(), Some("logs"));
        Ok(())
    }

    #[test]
    fn test_parse_empty_config() -> Result<()> {
        assert_eq!(FileConfig::parse("")?, FileConfig::default());
        Ok(())
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        assert!(matches!(
            FileConfig::parse("[discord_bot\ntoken = 1"),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_read_missing_file_is_none() -> Result<()> {
        assert!(FileConfig::read("does/not/exist.toml")?.is_none());
        Ok(())
    }

    #[test]
    fn test_env_overrides_file() -> Result<()> {
        let file = FileConfig::parse(FULL_CONFIG)?;
        let env = FileConfig::from_env(env_from(&[
            ("DISCORD_BOT_TOKEN", "env-token"),
            ("DISCORD_BOT_GUILD_ID", "42"),
        ]));

        let merged = file.merge(env);
        assert_eq!(merged.discord_bot.token.as_deref(), Some("env-token"));
        assert_eq!(merged.discord_bot.guild_id.as_deref(), Some("42"));
        // Not set in the environment, so the file value stays
        assert_eq!(
            merged.connection_strings.proxy_url.as_deref(),
            Some("http://127.0.0.1:3000")
        );
        Ok(())
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let result = BotConfig::from_file_config(FileConfig::default(), None);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_token_is_an_error() {
        let env = FileConfig::from_env(env_from(&[("DISCORD_BOT_TOKEN", "   ")]));
        assert!(BotConfig::from_file_config(env, None).is_err());
    }

    #[test]
    fn test_guild_id_is_optional() -> Result<()> {
        let env = FileConfig::from_env(env_from(&[("DISCORD_BOT_TOKEN", "t")]));
        let config = BotConfig::from_file_config(env, None)?;
        assert_eq!(config.token, "t");
        assert!(config.guild_id.is_none());
        assert!(config.proxy_url.is_none());
        Ok(())
    }

    #[test]
    fn test_empty_proxy_counts_as_absent() -> Result<()> {
        let env = FileConfig::from_env(env_from(&[
            ("DISCORD_BOT_TOKEN", "t"),
            ("DISCORD_BOT_PROXY_URL", ""),
        ]));
        assert!(BotConfig::from_file_config(env, None)?.proxy_url.is_none());
        Ok(())
    }

    #[test]
    fn test_proxy_without_scheme_is_rejected() {
        let env = FileConfig::from_env(env_from(&[
            ("DISCORD_BOT_TOKEN", "t"),
            ("DISCORD_BOT_PROXY_URL", "127.0.0.1:3000"),
        ]));
        assert!(matches!(
            BotConfig::from_file_config(env, None),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_log_dir_defaults_and_overrides() -> Result<()> {
        let base = FileConfig::from_env(env_from(&[("DISCORD_BOT_TOKEN", "t")]));
        let config = BotConfig::from_file_config(base.clone(), Some(DEFAULT_LOG_DIR))?;
        assert_eq!(config.log_dir, Some(PathBuf::from(".logs.d")));

        let disabled = base.clone().merge(FileConfig::from_env(env_from(&[(
            "DISCORD_BOT_LOG_DIR",
            "",
        )])));
        let config = BotConfig::from_file_config(disabled, Some(DEFAULT_LOG_DIR))?;
        assert!(config.log_dir.is_none());

        let config = BotConfig::from_file_config(base, None)?;
        assert!(config.log_dir.is_none());
        Ok(())
    }

    #[test]
    fn test_debug_output_redacts_token() -> Result<()> {
        let config = BotConfig::from_file_config(FileConfig::parse(FULL_CONFIG)?, None)?;
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("file-token"));
        assert!(rendered.contains("<redacted>"));

        let section = format!("{:?}", FileConfig::parse(FULL_CONFIG)?.discord_bot);
        assert!(!section.contains("file-token"));
        Ok(())
    }
}
