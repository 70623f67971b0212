//! CLI utilities for voxfuse.
//!
//! This crate provides the configuration file and output helpers shared by
//! voxfuse command-line tools.

pub mod config;
pub mod output;

pub use config::{Config, ModelsConfig, load_config, save_config};
pub use output::{Output, OutputFormat};
