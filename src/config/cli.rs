use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the cachebust binary.
#[derive(Debug, Parser)]
#[command(
    name = "cachebust",
    version,
    about = "Append content-derived cache busters to asset URLs"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "CACHEBUST_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print an asset URL with its cache buster appended.
    Bust(BustArgs),
    /// Print the SHA-256 content hash of a file and the token derived from it.
    Hash(HashArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CacheBustingOverrides {
    /// Override `cache_busting.enabled` for this invocation.
    #[arg(
        long = "enable-cache-busting",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub enabled: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct BustArgs {
    #[command(flatten)]
    pub overrides: CacheBustingOverrides,

    /// Asset URL to decorate.
    #[arg(value_name = "URL", allow_hyphen_values = true)]
    pub url: String,

    /// Content hash of the stored file.
    #[arg(long, value_name = "HASH")]
    pub hash: Option<String>,

    /// Variant descriptor of a derived rendition, e.g. `ResizedImage_100_100`.
    #[arg(long, value_name = "VARIANT")]
    pub variant: Option<String>,

    /// Compute the content hash from this file instead of `--hash`.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Asset class used for the configuration lookup.
    #[arg(long, value_name = "CLASS", default_value = crate::domain::assets::DEFAULT_ASSET_CLASS)]
    pub class: String,

    /// Print a JSON object with the url, token, and token source.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct HashArgs {
    /// File to hash.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}
