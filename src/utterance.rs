//! Records produced and consumed by the batches.
//!
//! Serialized field names follow the files the video project already reads
//! (`durations.json`, `mouth-data.json`, `verification-results.json`), which is why some Rust
//! field names differ from their JSON keys.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One line of dialogue from the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    /// Unique id; script order is id order as loaded.
    pub id: u32,

    /// Speaker identifier (`character` in the script source).
    #[serde(rename = "character")]
    pub speaker: String,

    /// The line to be spoken.
    pub text: String,

    /// File name of the audio for this line, relative to the voices directory.
    #[serde(rename = "voiceFile")]
    pub audio_file_name: String,
}

impl Utterance {
    pub fn new(
        id: u32,
        speaker: impl Into<String>,
        text: impl Into<String>,
        audio_file_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            speaker: speaker.into(),
            text: text.into(),
            audio_file_name: audio_file_name.into(),
        }
    }
}

/// Outcome of comparing one utterance's transcript with its source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationRecord {
    pub id: u32,

    #[serde(rename = "character")]
    pub speaker: String,

    #[serde(rename = "original")]
    pub original_text: String,

    #[serde(rename = "transcribed")]
    pub transcribed_text: String,

    #[serde(serialize_with = "serialize_round3")]
    pub similarity: f64,
}

/// Duration metadata for one generated audio file.
///
/// `frame_count` is already playback-adjusted; consumers must not divide by the
/// playback speed again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationRecord {
    pub id: u32,

    #[serde(rename = "file")]
    pub audio_file_name: String,

    #[serde(rename = "duration", serialize_with = "serialize_round2")]
    pub duration_seconds: f64,

    #[serde(rename = "frames")]
    pub frame_count: u64,
}

/// Mapping from audio file name to its mouth cue sequence.
///
/// Entries keep insertion order so the emitted tables follow script order. Inserting a file
/// name twice replaces the earlier sequence in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueTable {
    entries: Vec<(String, Vec<bool>)>,
}

impl CueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, audio_file_name: impl Into<String>, cues: Vec<bool>) {
        let audio_file_name = audio_file_name.into();
        match self
            .entries
            .iter_mut()
            .find(|(name, _)| *name == audio_file_name)
        {
            Some((_, existing)) => *existing = cues,
            None => self.entries.push((audio_file_name, cues)),
        }
    }

    pub fn get(&self, audio_file_name: &str) -> Option<&[bool]> {
        self.entries
            .iter()
            .find(|(name, _)| name == audio_file_name)
            .map(|(_, cues)| cues.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[bool])> {
        self.entries
            .iter()
            .map(|(name, cues)| (name.as_str(), cues.as_slice()))
    }
}

impl Serialize for CueTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, cues) in &self.entries {
            map.serialize_entry(name, cues)?;
        }
        map.end()
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

pub(crate) fn serialize_round2<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*value, 2))
}

pub(crate) fn serialize_round3<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*value, 3))
}
