//! Embedding fusion command.

use clap::Args;
use serde::{Deserialize, Serialize};

use super::{enroller_from, get_config, load_request, output_result, print_info, require_input_file};
use crate::Cli;

/// Fuse speaker embeddings from a file.
///
/// The input file (-f) holds `embeddings` and optional `weights`:
///
///   {"embeddings": [[0.1, 0.9], [0.2, 0.8]], "weights": [0.6, 0.4]}
#[derive(Args)]
pub struct FuseCommand {
    /// Outlier similarity threshold (overrides the config file)
    #[arg(long)]
    threshold: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct FuseRequest {
    embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    weights: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
struct FuseResponse {
    dimension: usize,
    embedding: Vec<f32>,
}

impl FuseCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut cfg = get_config(cli)?;
        if let Some(t) = self.threshold {
            cfg.fusion.outlier_threshold = t;
        }

        let req: FuseRequest = load_request(require_input_file(cli)?)?;
        let fusion = enroller_from(&cfg).fuse(&req.embeddings, req.weights.as_deref())?;

        for (index, sim) in &fusion.excluded {
            print_info(&format!("Excluded embedding {} (similarity {:.3})", index, sim));
        }
        if fusion.fell_back {
            print_info("All embeddings were below the threshold, fused all of them");
        }

        output_result(
            cli,
            &FuseResponse {
                dimension: fusion.embedding.len(),
                embedding: fusion.embedding,
            },
        )
    }
}
