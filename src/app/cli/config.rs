//! TOML configuration file parsing and loading
//!
//! Handles default config file discovery, per-key validation of config
//! values and merging them with the command line into the settings the
//! pipeline and the logger run with.

use crate::core::error_handling::ContextualError;
use crate::core::logging::LogFormat;
use crate::pipeline::PipelineSettings;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::args::Args;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Error reading configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{message}")]
    Invalid { key: String, message: String },

    #[error("{message}")]
    UnknownKey { key: String, message: String },

    #[error("{message}")]
    Missing { path: PathBuf, message: String },
}

impl ConfigError {
    pub fn invalid(key: &str, reason: impl std::fmt::Display) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            message: format!("Invalid value for '{}': {}", key, reason),
        }
    }

    pub fn unknown_key(key: &str, path: &Path) -> Self {
        ConfigError::UnknownKey {
            key: key.to_string(),
            message: format!(
                "Unknown configuration key '{}' in {}",
                key,
                path.display()
            ),
        }
    }

    pub fn missing(path: &Path) -> Self {
        ConfigError::Missing {
            path: path.to_path_buf(),
            message: format!(
                "The specified configuration file does not exist: {}",
                path.display()
            ),
        }
    }
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            ConfigError::Invalid { .. } | ConfigError::UnknownKey { .. } | ConfigError::Missing { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { message, .. }
            | ConfigError::UnknownKey { message, .. }
            | ConfigError::Missing { message, .. } => Some(message),
            ConfigError::Read { .. } | ConfigError::Parse { .. } => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Values read from a config file; every key is optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileConfig {
    /// File the values came from, if any was loaded
    pub source: Option<PathBuf>,
    pub schema_version: Option<u32>,
    pub count: Option<usize>,
    pub produce_interval_ms: Option<u64>,
    pub process_delay_ms: Option<u64>,
    pub drain_timeout_ms: Option<u64>,
    pub join_timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub cancel_on_join_timeout: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub log_file: Option<PathBuf>,
    pub color: Option<bool>,
}

/// `<config dir>/Drainq/drainq.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Drainq").join("drainq.toml"))
}

/// Load the named config file, or the default one if it exists
///
/// A file named explicitly must exist; a missing default file just means
/// no config.
pub async fn load_config(config_file: Option<&Path>) -> ConfigResult<FileConfig> {
    let config_path = match config_file {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::missing(path));
            }
            Some(path.to_path_buf())
        }
        None => default_config_path().filter(|path| path.exists()),
    };

    let Some(path) = config_path else {
        log::debug!("No configuration file found");
        return Ok(FileConfig::default());
    };

    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
    parse_config(&contents, &path)
}

/// Parse and validate config file contents
pub fn parse_config(contents: &str, path: &Path) -> ConfigResult<FileConfig> {
    let table = toml::from_str::<toml::Table>(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut config = FileConfig {
        source: Some(path.to_path_buf()),
        ..Default::default()
    };
    apply_toml_values(&mut config, &table, path)?;
    Ok(config)
}

fn apply_toml_values(config: &mut FileConfig, table: &toml::Table, path: &Path) -> ConfigResult<()> {
    for (key, value) in table {
        match key.as_str() {
            "schema-version" => {
                let version = non_negative(key, value)?;
                let supported = crate::get_config_schema_version();
                if version == 0 || version > u64::from(supported) {
                    return Err(ConfigError::invalid(
                        key,
                        format!("schema version {} is not supported (expected 1..={})", version, supported),
                    ));
                }
                config.schema_version = Some(version as u32);
            }
            "count" => {
                config.count = Some(non_negative(key, value)? as usize);
            }
            "produce-interval-ms" => config.produce_interval_ms = Some(non_negative(key, value)?),
            "process-delay-ms" => config.process_delay_ms = Some(non_negative(key, value)?),
            "drain-timeout-ms" => config.drain_timeout_ms = Some(non_negative(key, value)?),
            "join-timeout-ms" => config.join_timeout_ms = Some(non_negative(key, value)?),
            "poll-interval-ms" => config.poll_interval_ms = Some(non_negative(key, value)?),
            "cancel-on-join-timeout" => config.cancel_on_join_timeout = Some(boolean(key, value)?),
            "color" => config.color = Some(boolean(key, value)?),
            "log-level" => {
                let level = string(key, value)?;
                if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                    return Err(ConfigError::invalid(
                        key,
                        format!("expected one of {}", LOG_LEVELS.join(", ")),
                    ));
                }
                config.log_level = Some(level.to_ascii_lowercase());
            }
            "log-format" => {
                let format = string(key, value)?;
                config.log_format = Some(
                    LogFormat::from_str(format)
                        .map_err(|_| ConfigError::invalid(key, "expected one of text, ext, json"))?,
                );
            }
            "log-file" => {
                let file = string(key, value)?;
                // "none" and "-" disable file logging
                config.log_file = if file.eq_ignore_ascii_case("none") || file == "-" {
                    None
                } else {
                    Some(PathBuf::from(file))
                };
            }
            _ => return Err(ConfigError::unknown_key(key, path)),
        }
    }
    Ok(())
}

fn non_negative(key: &str, value: &toml::Value) -> ConfigResult<u64> {
    let n = value
        .as_integer()
        .ok_or_else(|| ConfigError::invalid(key, "expected an integer"))?;
    u64::try_from(n).map_err(|_| ConfigError::invalid(key, "expected a non-negative integer"))
}

fn boolean(key: &str, value: &toml::Value) -> ConfigResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| ConfigError::invalid(key, "expected true or false"))
}

fn string<'a>(key: &str, value: &'a toml::Value) -> ConfigResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| ConfigError::invalid(key, "expected a string"))
}

/// Merge command line, config file and defaults into pipeline settings
///
/// Command line values win over config values, which win over defaults.
pub fn resolve_settings(args: &Args, config: &FileConfig) -> ConfigResult<PipelineSettings> {
    let defaults = PipelineSettings::default();
    let millis = |cli: Option<u64>, file: Option<u64>, default: Duration| {
        cli.or(file).map(Duration::from_millis).unwrap_or(default)
    };

    let settings = PipelineSettings {
        message_count: args.count.or(config.count).unwrap_or(defaults.message_count),
        produce_interval: millis(
            args.produce_interval_ms,
            config.produce_interval_ms,
            defaults.produce_interval,
        ),
        process_delay: millis(
            args.process_delay_ms,
            config.process_delay_ms,
            defaults.process_delay,
        ),
        drain_timeout: millis(
            args.drain_timeout_ms,
            config.drain_timeout_ms,
            defaults.drain_timeout,
        ),
        join_timeout: millis(
            args.join_timeout_ms,
            config.join_timeout_ms,
            defaults.join_timeout,
        ),
        poll_interval: millis(
            args.poll_interval_ms,
            config.poll_interval_ms,
            defaults.poll_interval,
        ),
        cancel_on_join_timeout: args.cancel_on_join_timeout
            || config.cancel_on_join_timeout.unwrap_or(false),
        producer_id: defaults.producer_id,
    };

    if settings.drain_timeout.is_zero() {
        return Err(ConfigError::invalid("drain-timeout-ms", "must be greater than zero"));
    }
    settings
        .validate()
        .map_err(|e| ConfigError::invalid("settings", e))?;

    Ok(settings)
}

/// Logger configuration after merging command line and config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    pub level: Option<String>,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
    pub color: bool,
}

pub fn resolve_logging(args: &Args, config: &FileConfig) -> ConfigResult<LoggingOptions> {
    let format = match args.log_format.as_deref() {
        Some(format) => LogFormat::from_str(format)
            .map_err(|_| ConfigError::invalid("log-format", "expected one of text, ext, json"))?,
        None => config.log_format.unwrap_or_default(),
    };

    Ok(LoggingOptions {
        level: args.log_level.clone().or_else(|| config.log_level.clone()),
        format,
        file: args.log_file.clone().or_else(|| config.log_file.clone()),
        color: resolve_color(args.color_choice(), config.color),
    })
}

/// Explicit choice first, then config, then whether stdout is a terminal
///
/// A set `NO_COLOR` environment variable turns off the automatic choice.
pub fn resolve_color(cli: Option<bool>, config: Option<bool>) -> bool {
    cli.or(config).unwrap_or_else(|| {
        std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
    })
}
