//! Mouth cue extraction.
//!
//! Lip-sync in the renderer only needs "mouth open" vs. "mouth closed" per frame, so we
//! reduce the waveform to one RMS level per frame-sized chunk and threshold it.

use crate::{Error, Result};

/// RMS level above which a chunk counts as audible.
pub const DEFAULT_CUE_THRESHOLD: f32 = 0.02;

/// Turns a mono waveform into a per-frame audible/silent sequence.
#[derive(Debug, Clone, Copy)]
pub struct CueExtractor {
    /// Strict lower bound: a chunk is active only when its RMS is greater than this.
    pub threshold: f32,
}

impl Default for CueExtractor {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CUE_THRESHOLD,
        }
    }
}

impl CueExtractor {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Extract one cue per `sample_rate / target_rate` samples.
    ///
    /// The output has `ceil(samples.len() / samples_per_chunk)` entries; a trailing partial
    /// chunk is scored over the samples it has.
    pub fn extract(
        &self,
        samples: &[f32],
        sample_rate: u32,
        target_rate: u32,
    ) -> Result<Vec<bool>> {
        let samples_per_chunk = samples_per_chunk(sample_rate, target_rate)?;
        let threshold = f64::from(self.threshold);

        Ok(samples
            .chunks(samples_per_chunk)
            .map(|chunk| rms(chunk) > threshold)
            .collect())
    }
}

/// Extract cues with the default threshold.
pub fn extract_cues(samples: &[f32], sample_rate: u32, target_rate: u32) -> Result<Vec<bool>> {
    CueExtractor::default().extract(samples, sample_rate, target_rate)
}

fn samples_per_chunk(sample_rate: u32, target_rate: u32) -> Result<usize> {
    if target_rate == 0 {
        return Err(Error::invalid_input("cue target rate must be positive"));
    }
    let per_chunk = (sample_rate / target_rate) as usize;
    if per_chunk == 0 {
        return Err(Error::invalid_input(format!(
            "cue target rate {target_rate} Hz exceeds sample rate {sample_rate} Hz"
        )));
    }
    Ok(per_chunk)
}

/// Root-mean-square amplitude; an empty chunk is silent.
fn rms(chunk: &[f32]) -> f64 {
    if chunk.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = chunk.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_sq / chunk.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_all_closed() -> anyhow::Result<()> {
        for len in [0, 1, 443, 444, 445, 48_000] {
            let cues = extract_cues(&vec![0.0; len], 16_000, 36)?;
            assert!(cues.iter().all(|&open| !open), "len {len}");
        }
        Ok(())
    }

    #[test]
    fn output_length_rounds_partial_chunks_up() -> anyhow::Result<()> {
        // 16_000 / 36 = 444 samples per chunk.
        assert_eq!(extract_cues(&[], 16_000, 36)?.len(), 0);
        assert_eq!(extract_cues(&vec![0.0; 444], 16_000, 36)?.len(), 1);
        assert_eq!(extract_cues(&vec![0.0; 445], 16_000, 36)?.len(), 2);
        assert_eq!(extract_cues(&vec![0.0; 48_000], 16_000, 36)?.len(), 109);
        Ok(())
    }

    #[test]
    fn threshold_comparison_is_strict() -> anyhow::Result<()> {
        let extractor = CueExtractor::new(0.25);

        let at = extractor.extract(&[0.25; 4], 4, 1)?;
        assert_eq!(at, vec![false]);

        let above = extractor.extract(&[0.250_001; 4], 4, 1)?;
        assert_eq!(above, vec![true]);
        Ok(())
    }

    #[test]
    fn cues_follow_loud_and_quiet_chunks() -> anyhow::Result<()> {
        let mut samples = vec![0.0_f32; 10];
        samples[2] = 0.5;
        samples[3] = -0.5;
        // Below threshold: rms ~= 0.007.
        samples[9] = 0.01;
        // Partial trailing chunk of one sample.
        samples.push(0.8);

        let cues = extract_cues(&samples, 2, 1)?;
        assert_eq!(cues, vec![false, true, false, false, false, true]);
        Ok(())
    }

    #[test]
    fn invalid_rates_are_rejected() {
        assert!(matches!(
            extract_cues(&[0.0; 8], 16_000, 0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            extract_cues(&[0.0; 8], 10, 36),
            Err(Error::InvalidInput(_))
        ));
    }
}
