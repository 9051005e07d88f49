use std::path::Path;

use crate::Result;

/// Audio produced by a [`Synthesizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// Mono samples normalized to `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Pluggable text-to-speech capability used by [`crate::generate::VoiceGenerator`].
///
/// Implementations block until audio is available. Failures propagate and abort the batch;
/// there is no retry.
pub trait Synthesizer {
    /// Synthesize `text` in the style described by `voice_profile` (free text, may be empty).
    ///
    /// `max_tokens` caps the number of codec tokens the model may emit; callers size it with
    /// headroom so speech is not cut short.
    fn synthesize(
        &mut self,
        text: &str,
        voice_profile: &str,
        max_tokens: usize,
    ) -> Result<Synthesis>;
}

/// Pluggable speech-to-text capability used by [`crate::verify::VoiceVerifier`].
pub trait Transcriber {
    /// Transcribe the audio file at `audio_path`. `language` is a hint such as `"ja"`.
    fn transcribe(&mut self, audio_path: &Path, language: Option<&str>) -> Result<String>;
}

impl<S: Synthesizer + ?Sized> Synthesizer for Box<S> {
    fn synthesize(
        &mut self,
        text: &str,
        voice_profile: &str,
        max_tokens: usize,
    ) -> Result<Synthesis> {
        (**self).synthesize(text, voice_profile, max_tokens)
    }
}

impl<T: Transcriber + ?Sized> Transcriber for Box<T> {
    fn transcribe(&mut self, audio_path: &Path, language: Option<&str>) -> Result<String> {
        (**self).transcribe(audio_path, language)
    }
}
