//! Voice generation batch.
//!
//! For each utterance we synthesize speech, write it to the voices directory, and derive the
//! two tables the renderer needs: per-file durations in (playback-adjusted) video frames, and
//! per-file mouth cues sampled at the playback-adjusted cue rate.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::backend::Synthesizer;
use crate::cues::CueExtractor;
use crate::opts::GenerateOpts;
use crate::persist::{write_json, write_ts_module};
use crate::utterance::{CueTable, DurationRecord, Utterance};
use crate::wav::write_wav_pcm16;
use crate::{Error, Result};

/// Durations table, written into the voices directory.
pub const DURATIONS_FILE_NAME: &str = "durations.json";

/// Mouth cue table, written into the voices directory.
pub const CUES_FILE_NAME: &str = "mouth-data.json";

/// Name of the constant exported by the generated TypeScript cue module.
pub const CUES_TS_CONSTANT: &str = "MOUTH_DATA";

const CUES_TS_TYPE: &str = "Record<string, boolean[]>";
const GENERATOR_NAME: &str = "voiceline-generate";

// Token budget: the model emits 12.5 codec tokens per second of audio, and we assume
// 0.4 s per character with a 3 s floor, plus a fixed margin.
const SECONDS_PER_CHAR: f64 = 0.4;
const MIN_ESTIMATED_SECONDS: f64 = 3.0;
const TOKENS_PER_SECOND: f64 = 12.5;
const TOKEN_MARGIN: usize = 100;

/// Synthesis token budget for `text`, sized so speech is not truncated.
pub fn max_tokens_for(text: &str) -> usize {
    let estimated_seconds =
        (text.chars().count() as f64 * SECONDS_PER_CHAR).max(MIN_ESTIMATED_SECONDS);
    (estimated_seconds * TOKENS_PER_SECOND) as usize + TOKEN_MARGIN
}

/// Video frames covered by `duration_seconds` of audio played back at `playback_rate`.
pub fn frame_count(duration_seconds: f64, playback_rate: f64, fps: u32) -> u64 {
    (duration_seconds / playback_rate * f64::from(fps)) as u64
}

/// Tables produced by one generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOutput {
    pub durations: Vec<DurationRecord>,
    pub cues: CueTable,
}

impl GenerationOutput {
    /// Write `durations.json` and `mouth-data.json` into `voices_dir`, and the TypeScript cue
    /// module to `ts_module_path` when given.
    pub fn write(&self, voices_dir: &Path, ts_module_path: Option<&Path>) -> Result<()> {
        write_json(&voices_dir.join(DURATIONS_FILE_NAME), &self.durations, true)?;
        write_json(&voices_dir.join(CUES_FILE_NAME), &self.cues, false)?;
        if let Some(path) = ts_module_path {
            write_ts_module(path, GENERATOR_NAME, CUES_TS_CONSTANT, CUES_TS_TYPE, &self.cues)?;
        }
        Ok(())
    }
}

/// Runs the generation batch with an injected [`Synthesizer`].
pub struct VoiceGenerator<S: Synthesizer> {
    synthesizer: S,
}

impl<S: Synthesizer> VoiceGenerator<S> {
    pub fn new(synthesizer: S) -> Self {
        Self { synthesizer }
    }

    /// Access the configured synthesizer.
    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    /// Synthesize and write audio for every utterance, in order.
    ///
    /// Audio files are written as they are produced; the tables are returned for the caller
    /// to persist once the whole batch succeeded.
    pub fn generate(
        &mut self,
        utterances: &[Utterance],
        opts: &GenerateOpts,
    ) -> Result<GenerationOutput> {
        validate(opts)?;

        let extractor = CueExtractor::new(opts.cue_threshold);
        let cue_rate = opts.cue_target_rate();
        let mut output = GenerationOutput::default();

        for utterance in utterances {
            let max_tokens = max_tokens_for(&utterance.text);
            let voice_profile = opts.voice_profiles.get(&utterance.speaker);
            debug!(id = utterance.id, max_tokens, "synthesizing utterance");

            let started = Instant::now();
            let synthesis = self
                .synthesizer
                .synthesize(&utterance.text, voice_profile, max_tokens)?;
            let elapsed = started.elapsed();

            if synthesis.sample_rate == 0 {
                return Err(Error::invalid_input(format!(
                    "synthesizer returned a zero sample rate for utterance {}",
                    utterance.id
                )));
            }

            let audio_path = opts.voices_dir.join(&utterance.audio_file_name);
            write_wav_pcm16(&audio_path, &synthesis.samples, synthesis.sample_rate)?;

            let duration_seconds =
                synthesis.samples.len() as f64 / f64::from(synthesis.sample_rate);
            let frames = frame_count(duration_seconds, opts.playback_rate, opts.fps);
            let cues = extractor.extract(&synthesis.samples, synthesis.sample_rate, cue_rate)?;

            info!(
                id = utterance.id,
                speaker = %utterance.speaker,
                file = %utterance.audio_file_name,
                duration_seconds,
                frames,
                cues = cues.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "generated utterance"
            );

            output.durations.push(DurationRecord {
                id: utterance.id,
                audio_file_name: utterance.audio_file_name.clone(),
                duration_seconds,
                frame_count: frames,
            });
            output.cues.insert(utterance.audio_file_name.clone(), cues);
        }

        info!(generated = output.durations.len(), "generation finished");
        Ok(output)
    }
}

/// Generate every utterance and persist the duration and cue tables.
pub fn run_generation<S: Synthesizer>(
    synthesizer: S,
    utterances: &[Utterance],
    opts: &GenerateOpts,
    ts_module_path: Option<&Path>,
) -> Result<GenerationOutput> {
    let mut generator = VoiceGenerator::new(synthesizer);
    let output = generator.generate(utterances, opts)?;
    output.write(&opts.voices_dir, ts_module_path)?;
    Ok(output)
}

fn validate(opts: &GenerateOpts) -> Result<()> {
    if !(opts.playback_rate.is_finite() && opts.playback_rate > 0.0) {
        return Err(Error::invalid_input(format!(
            "playback rate must be a positive number, got {}",
            opts.playback_rate
        )));
    }
    if opts.fps == 0 {
        return Err(Error::invalid_input("fps must be positive"));
    }
    if opts.cue_target_rate() == 0 {
        return Err(Error::invalid_input("cue rate must be positive"));
    }
    Ok(())
}
