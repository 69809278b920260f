//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{collections::BTreeMap, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::domain::assets::class_key;

mod cli;

pub use cli::{
    BustArgs, CacheBustingOverrides, CliArgs, Command, HashArgs, LoggingOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "cachebust";
const ENV_PREFIX: &str = "CACHEBUST";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub cache_busting: CacheBustingSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// `<FileType>.enable_cache_busting` switches.
///
/// `enabled` applies to every asset class without an entry in `classes`.
/// Class keys are lowercased; busting is off unless configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheBustingSettings {
    pub enabled: bool,
    pub classes: BTreeMap<String, bool>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    raw.apply_logging_overrides(&cli.logging);
    if let Command::Bust(args) = &cli.command {
        raw.apply_bust_overrides(args);
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    cache_busting: RawCacheBustingSettings,
}

impl RawSettings {
    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    // The override targets the class being busted so it also beats a
    // class-specific entry from the file or environment.
    fn apply_bust_overrides(&mut self, args: &BustArgs) {
        if let Some(enabled) = args.overrides.enabled {
            let key = class_key(&args.class);
            self.cache_busting
                .classes
                .retain(|name, _| class_key(name) != key);
            self.cache_busting.classes.insert(key, enabled);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            cache_busting,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let cache_busting = build_cache_busting_settings(cache_busting)?;

        Ok(Self {
            logging,
            cache_busting,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_cache_busting_settings(
    cache_busting: RawCacheBustingSettings,
) -> Result<CacheBustingSettings, LoadError> {
    // Lowercase environment keys sort after mixed-case file keys, so the
    // environment wins when both name the same class.
    let mut classes = BTreeMap::new();
    for (name, enabled) in cache_busting.classes {
        if name.trim().is_empty() {
            return Err(LoadError::invalid(
                "cache_busting.classes",
                "class names must not be empty",
            ));
        }
        classes.insert(class_key(&name), enabled);
    }

    Ok(CacheBustingSettings {
        enabled: cache_busting.enabled.unwrap_or(false),
        classes,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheBustingSettings {
    enabled: Option<bool>,
    classes: BTreeMap<String, bool>,
}
