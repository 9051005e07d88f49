use anyhow::{Context, Result};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperState};

/// Run one full Whisper pass and join the segment texts into a single transcript.
pub(super) fn transcribe_samples(
    ctx: &WhisperContext,
    language: Option<&str>,
    samples_16k_mono: &[f32],
) -> Result<String> {
    if samples_16k_mono.is_empty() {
        return Ok(String::new());
    }

    let state = run_whisper_full(ctx, language, samples_16k_mono)?;

    let mut text = String::new();
    for segment in state.as_iter() {
        let piece = segment.to_str().context("failed to get segment text")?;
        text.push_str(piece);
    }
    Ok(text.trim().to_owned())
}

fn build_full_params(language: Option<&str>) -> FullParams<'_, '_> {
    let mut params = FullParams::new(SamplingStrategy::BeamSearch {
        beam_size: 5,
        patience: 1.0,
    });

    params.set_n_threads(num_cpus::get() as i32);
    params.set_translate(false);
    params.set_language(language);

    // Each utterance is an independent clip.
    params.set_no_context(true);
    params.set_single_segment(false);

    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    params
}

fn run_whisper_full(
    ctx: &WhisperContext,
    language: Option<&str>,
    samples: &[f32],
) -> Result<WhisperState> {
    let params = build_full_params(language);

    let mut state = ctx
        .create_state()
        .context("failed to create whisper state")?;

    state
        .full(params, samples)
        .context("failed to run whisper full()")?;

    Ok(state)
}
