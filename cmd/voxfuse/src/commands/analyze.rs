//! Sample analysis command.

use clap::Args;
use tracing::debug;
use voxfuse_enroll::{format_samples_summary, sample_warnings};

use super::{enroller_from, get_config, output_result, print_warnings, transcripts_of};
use crate::Cli;

/// Measure duration, quality and weight of recordings.
///
/// The summary and any warnings are printed to stderr; the sample records
/// go to the output.
#[derive(Args)]
pub struct AnalyzeCommand {
    /// Audio files (WAV)
    #[arg(required = true)]
    paths: Vec<String>,

    /// Transcript of the sample at the same position (repeatable)
    #[arg(short = 't', long = "transcript")]
    transcripts: Vec<String>,
}

impl AnalyzeCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        debug!(config = %cfg.path().display(), samples = self.paths.len(), "analyzing samples");

        let enroller = enroller_from(&cfg);
        let records = enroller.analyze(&self.paths, &transcripts_of(&self.transcripts));

        eprintln!("{}", format_samples_summary(&records));
        print_warnings(&sample_warnings(&records));

        output_result(cli, &records)
    }
}
