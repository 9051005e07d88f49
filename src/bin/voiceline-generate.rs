use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use voiceline::backends::http::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use voiceline::cues::DEFAULT_CUE_THRESHOLD;
use voiceline::{GenerateOpts, HttpSynthesizer, VoiceProfiles, load_utterances, run_generation};

#[derive(Parser, Debug)]
#[command(name = "voiceline-generate")]
#[command(about = "Generate voice audio, durations, and mouth cues for a video script")]
struct Params {
    /// Script source (`.ts` with an exported `scriptData` array, or `.json`).
    #[arg(short = 's', long = "script", default_value = "src/data/script.ts")]
    script_path: PathBuf,

    /// Directory the audio files and tables are written to.
    #[arg(short = 'o', long = "voices-dir", default_value = "public/voices")]
    voices_dir: PathBuf,

    /// Where to write the TypeScript mouth cue module.
    #[arg(long = "ts-output", default_value = "src/data/mouth-data.generated.ts")]
    ts_output: PathBuf,

    /// Skip writing the TypeScript mouth cue module.
    #[arg(long = "no-ts-output", default_value_t = false)]
    no_ts_output: bool,

    /// Base URL of the OpenAI-compatible TTS server.
    #[arg(long = "tts-url", default_value = DEFAULT_BASE_URL)]
    tts_url: String,

    /// TTS model name sent to the server.
    #[arg(short = 'm', long = "model", default_value = DEFAULT_MODEL)]
    model: String,

    /// JSON object mapping speaker ids to voice instructions.
    #[arg(long = "voice-profiles")]
    voice_profiles: Option<PathBuf>,

    /// Video frame rate.
    #[arg(long = "fps", default_value_t = 30)]
    fps: u32,

    /// Playback-speed multiplier applied by the renderer.
    #[arg(long = "playback-rate", default_value_t = 1.2)]
    playback_rate: f64,

    /// Nominal mouth cue rate (scaled by the playback rate).
    #[arg(long = "cue-fps", default_value_t = 30)]
    cue_fps: u32,

    /// RMS threshold for an open mouth.
    #[arg(long = "cue-threshold", default_value_t = DEFAULT_CUE_THRESHOLD)]
    cue_threshold: f32,
}

fn main() {
    voiceline::init_logging();

    if let Err(err) = run() {
        error!(error = ?err, "voiceline-generate failed");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let params = Params::parse();

    let voice_profiles = match &params.voice_profiles {
        Some(path) => VoiceProfiles::from_json_file(path)
            .with_context(|| format!("failed to load voice profiles: {}", path.display()))?,
        None => VoiceProfiles::default(),
    };

    let opts = GenerateOpts {
        voices_dir: params.voices_dir.clone(),
        fps: params.fps,
        playback_rate: params.playback_rate,
        cue_fps: params.cue_fps,
        cue_threshold: params.cue_threshold,
        voice_profiles,
    };

    let utterances = load_utterances(&params.script_path)
        .with_context(|| format!("failed to load script: {}", params.script_path.display()))?;
    info!(count = utterances.len(), "loaded utterances");

    let synthesizer = HttpSynthesizer::new(&params.tts_url, params.model.clone())
        .context("failed to initialize TTS backend")?;
    info!(endpoint = synthesizer.endpoint(), model = %params.model, "using TTS server");

    let ts_output = (!params.no_ts_output).then_some(params.ts_output.as_path());
    let output = run_generation(synthesizer, &utterances, &opts, ts_output)?;

    info!(
        generated = output.durations.len(),
        voices_dir = %opts.voices_dir.display(),
        "done; update durationInFrames in the script from durations.json"
    );
    Ok(())
}
