//! Speech synthesis over HTTP.
//!
//! Local TTS servers (mlx-audio, vLLM-style gateways, ...) commonly expose an
//! OpenAI-compatible `POST /v1/audio/speech` endpoint. We request WAV output and decode it
//! in-process, so the batch never depends on a particular model runtime.

use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::Result;
use crate::backend::{Synthesis, Synthesizer};
use crate::wav::decode_wav;

/// Default base URL of a locally running TTS server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default voice-design model.
pub const DEFAULT_MODEL: &str = "mlx-community/Qwen3-TTS-12Hz-1.7B-VoiceDesign-4bit";

const SPEECH_PATH: &str = "/v1/audio/speech";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    instructions: &'a str,
    max_tokens: usize,
    response_format: &'static str,
}

/// [`Synthesizer`] that calls an OpenAI-compatible speech endpoint.
pub struct HttpSynthesizer {
    client: Client,
    endpoint: String,
    model: String,
}

impl HttpSynthesizer {
    /// Build a synthesizer for `base_url` (e.g. `http://127.0.0.1:8000`) and `model`.
    ///
    /// Synthesis of a long line can take minutes, so the request timeout is generous;
    /// a stuck server still stalls the batch until it elapses.
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("voiceline-generate")
            .timeout(Duration::from_secs(30 * 60))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: speech_endpoint(base_url),
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Synthesizer for HttpSynthesizer {
    fn synthesize(
        &mut self,
        text: &str,
        voice_profile: &str,
        max_tokens: usize,
    ) -> Result<Synthesis> {
        let body = serde_json::to_vec(&SpeechRequest {
            model: &self.model,
            input: text,
            instructions: voice_profile,
            max_tokens,
            response_format: "wav",
        })?;

        let bytes = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .with_context(|| format!("request failed: {}", self.endpoint))?
            .error_for_status()
            .with_context(|| format!("synthesis failed (bad status): {}", self.endpoint))?
            .bytes()
            .context("failed to read synthesized audio")?;

        let audio = decode_wav(std::io::Cursor::new(bytes))?;
        Ok(Synthesis {
            samples: audio.samples,
            sample_rate: audio.sample_rate,
        })
    }
}

fn speech_endpoint(base_url: &str) -> String {
    format!("{}{SPEECH_PATH}", base_url.trim_end_matches('/'))
}
