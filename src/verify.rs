//! Voice verification batch.
//!
//! For each utterance we transcribe its generated audio and score the transcript against the
//! script text. Per-utterance verdicts are informational; the only decision that leaves this
//! module is whether the *average* similarity clears the pass threshold.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::Result;
use crate::backend::Transcriber;
use crate::opts::VerifyOpts;
use crate::persist::write_json;
use crate::similarity::similarity;
use crate::utterance::{Utterance, VerificationRecord, serialize_round3};

/// File name of the report written into the voices directory.
pub const REPORT_FILE_NAME: &str = "verification-results.json";

const PREVIEW_CHARS: usize = 50;

/// Human-facing classification of a single similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Warn,
    Fail,
}

impl Verdict {
    pub fn classify(similarity: f64, opts: &VerifyOpts) -> Self {
        if similarity >= opts.warn_threshold {
            Verdict::Ok
        } else if similarity >= opts.fail_threshold {
            Verdict::Warn
        } else {
            Verdict::Fail
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Ok => "ok",
            Verdict::Warn => "warn",
            Verdict::Fail => "fail",
        }
    }
}

/// Summary of one verification run, serialized as the report file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    /// Mean similarity over utterances that had audio; 0.0 when none did.
    #[serde(serialize_with = "serialize_round3")]
    pub average_similarity: f64,

    /// Missing files and low-similarity utterances, in script order.
    pub warnings: Vec<String>,

    /// One record per scored utterance, in script order.
    pub results: Vec<VerificationRecord>,
}

impl VerificationReport {
    /// Whether the batch passes: the unrounded average must reach `pass_threshold`.
    pub fn passed(&self, pass_threshold: f64) -> bool {
        self.average_similarity >= pass_threshold
    }

    /// Process exit status for this report: 0 on pass, 1 otherwise.
    pub fn exit_code(&self, pass_threshold: f64) -> i32 {
        if self.passed(pass_threshold) { 0 } else { 1 }
    }

    /// Persist the report as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        write_json(path, self, true)
    }
}

/// Runs the verification batch with an injected [`Transcriber`].
pub struct VoiceVerifier<T: Transcriber> {
    transcriber: T,
}

impl<T: Transcriber> VoiceVerifier<T> {
    pub fn new(transcriber: T) -> Self {
        Self { transcriber }
    }

    /// Access the configured transcriber.
    pub fn transcriber(&self) -> &T {
        &self.transcriber
    }

    /// Verify every utterance in order.
    ///
    /// A missing audio file is recorded as a warning and excluded from the average.
    /// Transcriber errors abort the run.
    pub fn verify(
        &mut self,
        utterances: &[Utterance],
        opts: &VerifyOpts,
    ) -> Result<VerificationReport> {
        let mut results = Vec::with_capacity(utterances.len());
        let mut warnings = Vec::new();
        let mut total_similarity = 0.0;

        for utterance in utterances {
            let audio_path = opts.voices_dir.join(&utterance.audio_file_name);
            if !audio_path.exists() {
                warn!(
                    id = utterance.id,
                    path = %audio_path.display(),
                    "audio file not found"
                );
                warnings.push(format!("ID {}: audio file not found", utterance.id));
                continue;
            }

            let transcribed = self
                .transcriber
                .transcribe(&audio_path, opts.language.as_deref())?
                .trim()
                .to_owned();

            let score = similarity(&utterance.text, &transcribed);
            total_similarity += score;

            let verdict = Verdict::classify(score, opts);
            info!(
                id = utterance.id,
                speaker = %utterance.speaker,
                similarity = score,
                verdict = verdict.as_str(),
                original = %preview(&utterance.text),
                transcribed = %preview(&transcribed),
                "verified utterance"
            );

            if score < opts.warn_threshold {
                warnings.push(format!(
                    "ID {}: similarity {:.1}% - text may not match",
                    utterance.id,
                    score * 100.0
                ));
            }

            results.push(VerificationRecord {
                id: utterance.id,
                speaker: utterance.speaker.clone(),
                original_text: utterance.text.clone(),
                transcribed_text: transcribed,
                similarity: score,
            });
        }

        let average_similarity = if results.is_empty() {
            0.0
        } else {
            total_similarity / results.len() as f64
        };

        info!(
            verified = results.len(),
            warnings = warnings.len(),
            average_similarity,
            "verification finished"
        );

        Ok(VerificationReport {
            average_similarity,
            warnings,
            results,
        })
    }
}

/// Verify `utterances` and write the report to `<voices_dir>/verification-results.json`.
pub fn run_verification<T: Transcriber>(
    transcriber: T,
    utterances: &[Utterance],
    opts: &VerifyOpts,
) -> Result<VerificationReport> {
    let mut verifier = VoiceVerifier::new(transcriber);
    let report = verifier.verify(utterances, opts)?;
    report.write(&opts.voices_dir.join(REPORT_FILE_NAME))?;
    Ok(report)
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
