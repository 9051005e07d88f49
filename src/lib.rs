//! `voiceline`: batch voice generation and verification for narrated video scripts.
//!
//! This crate provides:
//! - Script loading (the `scriptData` array of a TypeScript module, or JSON)
//! - A generation batch: text-to-speech, WAV output, frame durations, lip-sync mouth cues
//! - A verification batch: speech-to-text and similarity scoring against the script
//! - Pluggable synthesis/transcription backends (HTTP TTS, Whisper)
//!
//! The batches take their speech models as injected capabilities ([`Synthesizer`],
//! [`Transcriber`]) so the scoring and cue logic can be exercised without any model.

// Batch entry points (most consumers should start here).
pub mod generate;
pub mod opts;
pub mod verify;

// Records, script loading, and speech capability interfaces.
pub mod backend;
pub mod script;
pub mod utterance;

// Core algorithms.
pub mod cues;
pub mod similarity;

// Audio and output files.
pub mod persist;
pub mod wav;

// Built-in speech backends (feature-gated).
pub mod backends;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

mod error;

pub use backend::{Synthesis, Synthesizer, Transcriber};
pub use error::{Error, Result};
pub use generate::{GenerationOutput, VoiceGenerator, run_generation};
pub use opts::{GenerateOpts, VerifyOpts, VoiceProfiles};
pub use script::{ScriptLoader, load_utterances};
pub use utterance::{CueTable, DurationRecord, Utterance, VerificationRecord};
pub use verify::{VerificationReport, VoiceVerifier, run_verification};

#[cfg(feature = "logging")]
pub use logging::init as init_logging;

#[cfg(feature = "whisper")]
pub use backends::whisper::WhisperTranscriber;

#[cfg(feature = "http-tts")]
pub use backends::http::HttpSynthesizer;
