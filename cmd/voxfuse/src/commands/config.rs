//! Configuration management commands.

use clap::{Args, Subcommand};
use voxfuse_cli::{Config, save_config};

use super::{APP_NAME, config_path, get_config, output_result, print_info, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Configuration is stored in ~/.voxfuse/voxfuse/config.yaml. Keys are
/// dotted paths such as `fusion.outlier_threshold` or
/// `models.checkpoints.base`.
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Create the configuration file with default values
    Init {
        /// Overwrite an existing configuration with defaults
        #[arg(long)]
        force: bool,
    },
    /// View the current configuration
    View,
    /// Print a single value
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a single value (parsed as YAML)
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
}

impl ConfigCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::Init { force } => {
                let existed = config_path(cli).is_some_and(|p| p.exists());
                let cfg = get_config(cli)?;
                if !existed {
                    print_success(&format!("Config file created: {}", cfg.path().display()));
                } else if *force {
                    save_config(APP_NAME, &Config::default(), cfg.path().to_str())?;
                    print_success(&format!("Config file reset: {}", cfg.path().display()));
                } else {
                    print_info(&format!("Config file already exists: {}", cfg.path().display()));
                }
                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;
                println!("Config file: {}", cfg.path().display());
                output_result(cli, &cfg)
            }

            ConfigSubcommand::Get { key } => {
                let cfg = get_config(cli)?;
                output_result(cli, &cfg.get(key)?)
            }

            ConfigSubcommand::Set { key, value } => {
                let mut cfg = get_config(cli)?;
                cfg.set(key, value)?;
                print_success(&format!("Set {} = {}", key, value));
                Ok(())
            }
        }
    }
}
