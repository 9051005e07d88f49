use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use voiceline::verify::REPORT_FILE_NAME;
use voiceline::{VerifyOpts, WhisperTranscriber, load_utterances, run_verification};

#[derive(Parser, Debug)]
#[command(name = "voiceline-verify")]
#[command(about = "Transcribe generated voices and compare them with the script text")]
struct Params {
    /// Path to a whisper.cpp model file (e.g. `ggml-small.bin`).
    #[arg(short = 'm', long = "model")]
    model_path: String,

    /// Script source (`.ts` with an exported `scriptData` array, or `.json`).
    #[arg(short = 's', long = "script", default_value = "src/data/script.ts")]
    script_path: PathBuf,

    /// Directory holding the generated audio files; the report is written here too.
    #[arg(short = 'd', long = "voices-dir", default_value = "public/voices")]
    voices_dir: PathBuf,

    /// Language hint for transcription. Use `auto` to let Whisper detect it.
    #[arg(short = 'l', long = "language", default_value = "ja")]
    language: String,

    /// Per-utterance similarity below which a warning is recorded.
    #[arg(long = "warn-threshold", default_value_t = 0.7)]
    warn_threshold: f64,

    /// Minimum average similarity for the run to pass.
    #[arg(long = "pass-threshold", default_value_t = 0.6)]
    pass_threshold: f64,
}

fn main() {
    voiceline::init_logging();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            error!(error = ?err, "voiceline-verify failed");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let params = Params::parse();
    let opts = to_opts(&params);

    let utterances = load_utterances(&params.script_path)
        .with_context(|| format!("failed to load script: {}", params.script_path.display()))?;
    info!(count = utterances.len(), "loaded utterances");

    let transcriber = WhisperTranscriber::new(&params.model_path)
        .context("failed to initialize Whisper backend")?;

    let report = run_verification(transcriber, &utterances, &opts)?;
    for warning in &report.warnings {
        warn!(warning = %warning, "verification warning");
    }

    let code = report.exit_code(opts.pass_threshold);
    info!(
        verified = report.results.len(),
        average_similarity = report.average_similarity,
        passed = code == 0,
        report = %opts.voices_dir.join(REPORT_FILE_NAME).display(),
        "verification complete"
    );
    Ok(code)
}

fn to_opts(params: &Params) -> VerifyOpts {
    let language = match params.language.as_str() {
        "" | "auto" => None,
        lang => Some(lang.to_owned()),
    };

    VerifyOpts {
        voices_dir: params.voices_dir.clone(),
        language,
        warn_threshold: params.warn_threshold,
        pass_threshold: params.pass_threshold,
        ..VerifyOpts::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_is_required() {
        let err = Params::try_parse_from(["voiceline-verify"])
            .err()
            .expect("expected missing-args error");
        assert!(err.to_string().contains("--model"));
    }

    #[test]
    fn auto_language_disables_the_hint() {
        let params = Params::try_parse_from(["voiceline-verify", "-m", "ggml.bin", "-l", "auto"])
            .expect("parse params");
        assert_eq!(to_opts(&params).language, None);

        let params =
            Params::try_parse_from(["voiceline-verify", "-m", "ggml.bin"]).expect("parse params");
        let opts = to_opts(&params);
        assert_eq!(opts.language.as_deref(), Some("ja"));
        assert_eq!(opts.pass_threshold, 0.6);
    }
}
