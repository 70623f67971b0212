//! Voxfuse CLI - multi-sample voice enrollment from the command line.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{AnalyzeCommand, ConfigCommand, EnrollCommand, FuseCommand};

/// Voxfuse CLI - multi-sample voice enrollment.
///
/// Combines several reference recordings of one speaker into a single
/// voice-clone prompt:
///   - Analyze recordings for duration, quality and weight
///   - Fuse precomputed speaker embeddings
///   - Enroll a speaker from recordings and their precomputed prompts
///
/// Configuration is stored in ~/.voxfuse/voxfuse/config.yaml.
#[derive(Parser)]
#[command(name = "voxfuse")]
#[command(about = "Multi-sample voice enrollment tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.voxfuse/voxfuse/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Input request file (YAML or JSON)
    #[arg(short = 'f', long = "file", global = true)]
    pub input: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CLI configuration
    Config(ConfigCommand),
    /// Measure duration, quality and weight of recordings
    Analyze(AnalyzeCommand),
    /// Fuse speaker embeddings from a file
    Fuse(FuseCommand),
    /// Build a fused voice-clone prompt from recordings
    Enroll(EnrollCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli),
        Commands::Analyze(cmd) => cmd.run(&cli),
        Commands::Fuse(cmd) => cmd.run(&cli),
        Commands::Enroll(cmd) => cmd.run(&cli),
    }
}
