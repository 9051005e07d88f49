use std::path::Path;

use anyhow::{Context, ensure};
use whisper_rs::WhisperContext;

use crate::Result;
use crate::backend::Transcriber;
use crate::wav::read_wav;

mod ctx;
mod logging;
mod resample;
mod segments;

use resample::resample_mono;
use segments::transcribe_samples;

/// whisper.cpp consumes mono 16 kHz audio.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Speech-to-text backend powered by `whisper-rs` / `whisper.cpp`.
///
/// The model is loaded once and reused for every utterance of a batch.
pub struct WhisperTranscriber {
    ctx: WhisperContext,
    model_path: String,
}

impl WhisperTranscriber {
    /// Load a whisper.cpp (ggml) model from disk.
    pub fn new(model_path: &str) -> Result<Self> {
        Ok(Self::load(model_path)?)
    }

    fn load(model_path: &str) -> anyhow::Result<Self> {
        ensure!(!model_path.trim().is_empty(), "model path must be provided");

        let path = Path::new(model_path);
        ensure!(path.exists(), "whisper model not found at '{}'", model_path);
        ensure!(
            path.is_file(),
            "whisper model path is not a file: '{}'",
            model_path
        );

        let ctx = ctx::get_context(model_path)?;
        Ok(Self {
            ctx,
            model_path: model_path.to_owned(),
        })
    }

    /// Access the underlying Whisper context.
    pub fn context(&self) -> &WhisperContext {
        &self.ctx
    }

    /// The model path this backend was loaded from.
    pub fn model_path(&self) -> &str {
        &self.model_path
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&mut self, audio_path: &Path, language: Option<&str>) -> Result<String> {
        let audio = read_wav(audio_path)?;
        let samples = resample_mono(&audio.samples, audio.sample_rate, WHISPER_SAMPLE_RATE)
            .with_context(|| format!("failed to resample '{}'", audio_path.display()))?;
        let text = transcribe_samples(&self.ctx, language, &samples)
            .with_context(|| format!("failed to transcribe '{}'", audio_path.display()))?;
        Ok(text)
    }
}
