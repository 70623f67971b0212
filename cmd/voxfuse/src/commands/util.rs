//! Utility functions for CLI commands.

use std::path::{Path, PathBuf};

use voxfuse_cli::{Config, Output, OutputFormat, load_config};
use voxfuse_enroll::Enroller;

use crate::Cli;

pub const APP_NAME: &str = "voxfuse";

/// Returns the config file location, if one can be determined.
pub fn config_path(cli: &Cli) -> Option<PathBuf> {
    match &cli.config {
        Some(p) => Some(PathBuf::from(p)),
        None => Config::default_config_path(APP_NAME),
    }
}

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Builds an enroller tuned by the configuration file.
pub fn enroller_from(cfg: &Config) -> Enroller {
    Enroller::new()
        .with_quality(cfg.quality.clone())
        .with_weighting(cfg.weighting.clone())
        .with_fusion(cfg.fusion.clone())
}

/// Pairs `--transcript` values with samples by position.
pub fn transcripts_of(values: &[String]) -> Vec<Option<String>> {
    values.iter().cloned().map(Some).collect()
}

/// Loads a request from a YAML or JSON file.
pub fn load_request<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)?;
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("yaml");

    let result = match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };

    Ok(result)
}

/// Requires input file to be provided.
pub fn require_input_file(cli: &Cli) -> anyhow::Result<&str> {
    cli.input
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("input file is required, use -f flag"))
}

/// Outputs result as JSON or YAML.
pub fn output_result<T: serde::Serialize>(cli: &Cli, result: &T) -> anyhow::Result<()> {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Yaml
    };
    Output::new(format, cli.output.clone()).write(result)
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints info message.
pub fn print_info(msg: &str) {
    eprintln!("\x1b[34mℹ\x1b[0m {}", msg);
}

/// Prints each warning on its own line.
pub fn print_warnings(warnings: &[String]) {
    for w in warnings {
        eprintln!("\x1b[33m{}\x1b[0m", w);
    }
}
