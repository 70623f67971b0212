//! Speaker enrollment command.

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;
use voxfuse_enroll::{
    Dtype, EnrollError, ModelCache, ModelLoader, PromptItem, VoiceCloneModel,
    format_samples_summary,
};

use super::{
    enroller_from, get_config, output_result, print_success, print_warnings, transcripts_of,
};
use crate::Cli;

/// Suffix appended to an audio file name to find its precomputed prompt.
const PROMPT_SUFFIX: &str = ".prompt.json";

/// Build a fused voice-clone prompt from recordings.
///
/// The synthesis model runs elsewhere: each recording must have its
/// voice-clone prompt saved as `<audio>.prompt.json`, either next to the
/// audio file or, with --model, in the directory registered for that model
/// under `models.checkpoints`.
#[derive(Args)]
pub struct EnrollCommand {
    /// Audio files (WAV)
    #[arg(required = true)]
    paths: Vec<String>,

    /// Transcript of the sample at the same position (repeatable)
    #[arg(short = 't', long = "transcript")]
    transcripts: Vec<String>,

    /// Use only the fused speaker embedding, without reference audio codes
    #[arg(long)]
    embedding_only: bool,

    /// Model whose prompt directory holds the precomputed prompts
    #[arg(short = 'm', long)]
    model: Option<String>,
}

impl EnrollCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let enroller = enroller_from(&cfg);
        let transcripts = transcripts_of(&self.transcripts);

        let enrollment = match &self.model {
            Some(name) => {
                let cache: ModelCache<PrecomputedPrompts, _> = ModelCache::with_config(
                    cfg.models.checkpoints.clone(),
                    PromptDirLoader,
                    cfg.models.cache_config(),
                );
                let prompts = cache.get(name)?;
                enroller.enroll(&*prompts, &self.paths, &transcripts, self.embedding_only)?
            }
            None => {
                let prompts = PrecomputedPrompts::sidecar();
                enroller.enroll(&prompts, &self.paths, &transcripts, self.embedding_only)?
            }
        };

        eprintln!("{}", format_samples_summary(&enrollment.samples));
        print_warnings(&enrollment.warnings);
        print_success(&format!(
            "Fused {} sample(s) into a {}-dim embedding",
            enrollment.samples.len(),
            enrollment.prompt.fused_embedding.len()
        ));

        output_result(cli, &enrollment)
    }
}

/// Voice-clone prompts computed ahead of time and stored as JSON files.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedPrompts {
    dir: Option<PathBuf>,
}

impl PrecomputedPrompts {
    /// Reads `<audio>.prompt.json` next to each audio file.
    pub fn sidecar() -> Self {
        Self { dir: None }
    }

    /// Reads `<file name>.prompt.json` from `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: Some(dir.into()) }
    }

    /// Returns where the prompt for `audio_path` is stored.
    pub fn prompt_path(&self, audio_path: &str) -> PathBuf {
        let audio = Path::new(audio_path);
        match &self.dir {
            Some(dir) => {
                let name = audio
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                dir.join(format!("{name}{PROMPT_SUFFIX}"))
            }
            None => PathBuf::from(format!("{audio_path}{PROMPT_SUFFIX}")),
        }
    }
}

impl VoiceCloneModel for PrecomputedPrompts {
    fn create_voice_clone_prompt(
        &self,
        audio_path: &str,
        transcript: Option<&str>,
        embedding_only: bool,
    ) -> Result<PromptItem, EnrollError> {
        let path = self.prompt_path(audio_path);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| EnrollError::Model(format!("read {}: {}", path.display(), e)))?;
        let mut item: PromptItem = serde_json::from_str(&content)
            .map_err(|e| EnrollError::Model(format!("parse {}: {}", path.display(), e)))?;
        debug!(
            path = %path.display(),
            dim = item.speaker_embedding.len(),
            "loaded precomputed prompt"
        );

        if embedding_only {
            item.reference_code = None;
            item.reference_text = None;
        } else if let Some(t) = transcript.filter(|t| !t.trim().is_empty()) {
            item.reference_text = Some(t.to_string());
        }
        Ok(item)
    }
}

/// Opens a prompt directory registered as a model checkpoint.
struct PromptDirLoader;

impl ModelLoader<PrecomputedPrompts> for PromptDirLoader {
    fn load(
        &self,
        name: &str,
        path: &Path,
        dtype: Dtype,
    ) -> Result<PrecomputedPrompts, EnrollError> {
        if !path.is_dir() {
            return Err(EnrollError::Model(format!(
                "{} is not a prompt directory",
                path.display()
            )));
        }
        // Stored prompts are already f32; any requested dtype is accepted.
        debug!(model = name, %dtype, "opened prompt directory");
        Ok(PrecomputedPrompts::in_dir(path))
    }
}
