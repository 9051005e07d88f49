use anyhow::{Context, Result, anyhow};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

// Source frames fed to rubato per `process()` call.
const CHUNK_FRAMES: usize = 2048;

/// Resample a whole mono clip from `src_rate` to `dst_rate`.
///
/// The output has `ceil(len * dst_rate / src_rate)` samples, aligned with the input
/// (the resampler's startup delay is trimmed).
pub(super) fn resample_mono(samples: &[f32], src_rate: u32, dst_rate: u32) -> Result<Vec<f32>> {
    if src_rate == dst_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if src_rate == 0 {
        return Err(anyhow!("cannot resample audio with a zero sample rate"));
    }

    let ratio = f64::from(dst_rate) / f64::from(src_rate);
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0,
        SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        },
        CHUNK_FRAMES,
        1, // mono
    )
    .map_err(|e| anyhow!(e))
    .context("failed to init resampler")?;

    let expected = (samples.len() as f64 * ratio).ceil() as usize;
    let delay = resampler.output_delay();
    let mut out = Vec::with_capacity(expected + delay + CHUNK_FRAMES);

    // rubato expects exact block sizes; pad the tail with zeros, and keep feeding silence
    // until the delayed output covers the whole clip.
    let mut block = vec![0.0_f32; CHUNK_FRAMES];
    let mut consumed = 0;
    while out.len() < expected + delay {
        let take = (samples.len() - consumed).min(CHUNK_FRAMES);
        block[..take].copy_from_slice(&samples[consumed..consumed + take]);
        block[take..].fill(0.0);
        consumed += take;

        let resampled = resampler
            .process(&[&block[..]], None)
            .map_err(|e| anyhow!(e))
            .context("resampler process failed")?;
        out.extend_from_slice(&resampled[0]);
    }

    out.drain(..delay);
    out.truncate(expected);
    Ok(out)
}
