use std::io::{BufWriter, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::persist::write_atomically;
use crate::{Error, Result};

/// Decoded mono audio.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoAudio {
    /// Samples normalized to `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl MonoAudio {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Load a WAV file as mono `f32` samples.
pub fn read_wav(path: &Path) -> Result<MonoAudio> {
    let reader = WavReader::open(path)?;
    read_wav_samples(reader)
}

/// Decode WAV bytes from any reader (e.g. an HTTP response body) as mono `f32` samples.
///
/// Multichannel input is downmixed by averaging; integer PCM is normalized by its bit depth.
pub fn decode_wav<R: Read>(reader: R) -> Result<MonoAudio> {
    read_wav_samples(WavReader::new(reader)?)
}

fn read_wav_samples<R: Read>(mut reader: WavReader<R>) -> Result<MonoAudio> {
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(Error::invalid_input("WAV header declares zero channels"));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|pcm| pcm as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    Ok(MonoAudio {
        samples: downmix_to_mono(&interleaved, spec.channels as usize),
        sample_rate: spec.sample_rate,
    })
}

fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Write mono samples as a 16-bit PCM WAV file.
///
/// Samples outside `[-1.0, 1.0]` are clipped.
pub fn write_wav_pcm16(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    if sample_rate == 0 {
        return Err(Error::invalid_input("sample rate must be positive"));
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    write_atomically(path, |file| {
        let mut writer = WavWriter::new(BufWriter::new(file), spec)?;
        for &s in samples {
            let pcm = (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
            writer.write_sample(pcm)?;
        }
        writer.finalize()?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm16_roundtrip_preserves_length_and_rate() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tone.wav");
        let samples: Vec<f32> = (0..2_400).map(|i| ((i as f32) * 0.05).sin() * 0.5).collect();

        write_wav_pcm16(&path, &samples, 24_000)?;
        let audio = read_wav(&path)?;

        assert_eq!(audio.sample_rate, 24_000);
        assert_eq!(audio.samples.len(), samples.len());
        assert!((audio.duration_seconds() - 0.1).abs() < 1e-9);
        for (got, want) in audio.samples.iter().zip(&samples) {
            assert!((got - want).abs() < 1e-3);
        }
        Ok(())
    }

    #[test]
    fn out_of_range_samples_are_clipped() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("clip.wav");

        write_wav_pcm16(&path, &[2.0, -2.0], 8_000)?;
        let audio = read_wav(&path)?;

        assert!(audio.samples[0] > 0.999);
        assert!(audio.samples[1] < -0.999);
        Ok(())
    }

    #[test]
    fn stereo_float_input_is_downmixed() -> anyhow::Result<()> {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 16_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut bytes = std::io::Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut bytes, spec)?;
            for s in [0.5_f32, -0.5, 1.0, 0.0] {
                writer.write_sample(s)?;
            }
            writer.finalize()?;
        }

        let audio = decode_wav(std::io::Cursor::new(bytes.into_inner()))?;
        assert_eq!(audio.sample_rate, 16_000);
        assert_eq!(audio.samples, vec![0.0, 0.5]);
        Ok(())
    }
}
