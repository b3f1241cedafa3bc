//! TOML-based application configuration.
//!
//! Stores the non-secret settings:
//! - Where the state file lives
//! - Notion endpoint, API version and request timeout
//! - Property names of the target database
//!
//! Configuration is stored at `~/.config/notion-timer/config.toml`.
//! Credentials never live here; see [`Credentials`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::config_dir;
use super::state_store::STATE_FILE_NAME;
use crate::error::ConfigError;

pub const TOKEN_ENV: &str = "NOTION_TOKEN";
pub const DATABASE_ID_ENV: &str = "NOTION_DATABASE_ID";

/// Property names of the target database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyNames {
    /// Title property, receives the task.
    #[serde(default = "default_title")]
    pub title: String,
    /// Select property, receives the project.
    #[serde(default = "default_select")]
    pub select: String,
    #[serde(default = "default_start")]
    pub start: String,
    #[serde(default = "default_end")]
    pub end: String,
    /// Number property, receives the duration in minutes.
    #[serde(default = "default_duration")]
    pub duration: String,
}

/// Notion API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub properties: PropertyNames,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/notion-timer/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// State file path; relative paths resolve against the working directory.
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default)]
    pub notion: NotionConfig,
}

// Default functions
fn default_state_file() -> String {
    STATE_FILE_NAME.into()
}
fn default_api_base() -> String {
    "https://api.notion.com/v1/".into()
}
fn default_version() -> String {
    "2022-06-28".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_title() -> String {
    "Task".into()
}
fn default_select() -> String {
    "Project".into()
}
fn default_start() -> String {
    "Start".into()
}
fn default_end() -> String {
    "End".into()
}
fn default_duration() -> String {
    "Duration (minutes)".into()
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            title: default_title(),
            select: default_select(),
            start: default_start(),
            end: default_end(),
            duration: default_duration(),
        }
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            version: default_version(),
            timeout_secs: default_timeout_secs(),
            properties: PropertyNames::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            notion: NotionConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                    _ => return Err(invalid("only leaf values can be set".into())),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, or defaults if the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, or defaults if the file is absent.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check values serde cannot: a parseable base URL, a positive timeout,
    /// no blank names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let base = url::Url::parse(&self.notion.api_base)
            .map_err(|e| invalid("notion.api_base", e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("notion.api_base", "not a base URL".into()));
        }
        if self.notion.timeout_secs == 0 {
            return Err(invalid("notion.timeout_secs", "must be at least 1".into()));
        }

        let p = &self.notion.properties;
        for (key, value) in [
            ("state_file", &self.state_file),
            ("notion.version", &self.notion.version),
            ("notion.properties.title", &p.title),
            ("notion.properties.select", &p.select),
            ("notion.properties.start", &p.start),
            ("notion.properties.end", &p.end),
            ("notion.properties.duration", &p.duration),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(key, "must not be empty".into()));
            }
        }
        Ok(())
    }

    /// State file path, with `override_path` taking precedence.
    pub fn state_file_path(&self, override_path: Option<&Path>) -> PathBuf {
        override_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.state_file))
    }
}

/// Bearer token and target database, resolved once at the boundary.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub database_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("database_id", &self.database_id)
            .finish()
    }
}

impl Credentials {
    /// Resolve from explicit values, falling back to the process environment.
    pub fn resolve(
        token: Option<&str>,
        database_id: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Self::resolve_with(token, database_id, |name| std::env::var(name).ok())
    }

    /// Precedence: explicit argument > `env(name)` > `ConfigError::Missing`.
    /// Blank values count as absent.
    pub fn resolve_with(
        token: Option<&str>,
        database_id: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let pick = |explicit: Option<&str>, what: &'static str, env_var: &'static str| {
            explicit
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .or_else(|| {
                    env(env_var)
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                })
                .ok_or(ConfigError::Missing { what, env_var })
        };

        Ok(Self {
            token: pick(token, "Notion token", TOKEN_ENV)?,
            database_id: pick(database_id, "Notion database ID", DATABASE_ID_ENV)?,
        })
    }
}
