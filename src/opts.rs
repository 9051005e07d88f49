use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::cues::DEFAULT_CUE_THRESHOLD;

/// Options for a voice generation batch.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLIs map user input into this type so that tests and other frontends can build
/// it programmatically.
#[derive(Debug, Clone)]
pub struct GenerateOpts {
    /// Directory the generated audio files are written to.
    pub voices_dir: PathBuf,

    /// Nominal video frame rate used for frame counts.
    pub fps: u32,

    /// Playback-speed multiplier applied by the renderer (1.2 = 20% faster).
    ///
    /// Frame counts are divided by this exactly once, here.
    pub playback_rate: f64,

    /// Nominal mouth cue rate before the playback-speed adjustment.
    pub cue_fps: u32,

    /// RMS level above which a cue slice counts as "mouth open".
    pub cue_threshold: f32,

    /// Per-speaker voice style instructions handed to the synthesizer.
    pub voice_profiles: VoiceProfiles,
}

impl Default for GenerateOpts {
    fn default() -> Self {
        Self {
            voices_dir: PathBuf::from("public/voices"),
            fps: 30,
            playback_rate: 1.2,
            cue_fps: 30,
            cue_threshold: DEFAULT_CUE_THRESHOLD,
            voice_profiles: VoiceProfiles::default(),
        }
    }
}

impl GenerateOpts {
    /// Cue sampling rate, scaled so cues stay aligned with sped-up playback.
    pub fn cue_target_rate(&self) -> u32 {
        (self.cue_fps as f64 * self.playback_rate) as u32
    }
}

/// Options for a voice verification batch.
#[derive(Debug, Clone)]
pub struct VerifyOpts {
    /// Directory holding the audio files to verify.
    pub voices_dir: PathBuf,

    /// Language hint passed to the transcriber (e.g. `"ja"`). `None` lets it auto-detect.
    pub language: Option<String>,

    /// Per-utterance similarity below which a warning is recorded.
    pub warn_threshold: f64,

    /// Per-utterance similarity below which an utterance is reported as failed.
    pub fail_threshold: f64,

    /// Minimum average similarity for the batch to pass.
    pub pass_threshold: f64,
}

impl Default for VerifyOpts {
    fn default() -> Self {
        Self {
            voices_dir: PathBuf::from("public/voices"),
            language: Some("ja".to_owned()),
            warn_threshold: 0.7,
            fail_threshold: 0.5,
            pass_threshold: 0.6,
        }
    }
}

/// Free-text voice instructions keyed by speaker. Unknown speakers get an empty profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceProfiles {
    by_speaker: HashMap<String, String>,
}

impl VoiceProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, speaker: impl Into<String>, instructions: impl Into<String>) -> Self {
        self.by_speaker.insert(speaker.into(), instructions.into());
        self
    }

    pub fn get(&self, speaker: &str) -> &str {
        self.by_speaker.get(speaker).map_or("", String::as_str)
    }

    /// Load profiles from a JSON object of `{"speaker": "instructions"}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let by_speaker: HashMap<String, String> = serde_json::from_str(raw)?;
        Ok(Self { by_speaker })
    }
}
