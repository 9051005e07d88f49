use std::collections::HashMap;
use std::path::{Path, PathBuf};

use voiceline::verify::REPORT_FILE_NAME;
use voiceline::wav::write_wav_pcm16;
use voiceline::{Transcriber, Utterance, VerifyOpts, VoiceVerifier, run_verification};

/// Returns a canned transcript per audio file name.
struct FakeTranscriber {
    transcripts: HashMap<String, String>,
    seen: Vec<(PathBuf, Option<String>)>,
}

impl FakeTranscriber {
    fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            transcripts: pairs
                .iter()
                .map(|(file, text)| (file.to_string(), text.to_string()))
                .collect(),
            seen: Vec::new(),
        }
    }
}

impl Transcriber for FakeTranscriber {
    fn transcribe(
        &mut self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> voiceline::Result<String> {
        self.seen
            .push((audio_path.to_path_buf(), language.map(str::to_owned)));
        let name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        Ok(self.transcripts.get(name).cloned().unwrap_or_default())
    }
}

fn touch_wav(dir: &Path, name: &str) -> anyhow::Result<()> {
    write_wav_pcm16(&dir.join(name), &[0.0; 160], 16_000)?;
    Ok(())
}

fn opts_for(dir: &Path) -> VerifyOpts {
    VerifyOpts {
        voices_dir: dir.to_path_buf(),
        ..VerifyOpts::default()
    }
}

#[test]
fn exact_transcript_passes_with_no_warnings() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    touch_wav(dir.path(), "a.wav")?;
    let opts = opts_for(dir.path());

    // Differs only in punctuation, spacing, and kana script.
    let transcriber = FakeTranscriber::new(&[("a.wav", " コンニチハ。 ")]);
    let utterances = vec![Utterance::new(1, "aoi", "こんにちは！", "a.wav")];

    let report = run_verification(transcriber, &utterances, &opts)?;

    assert_eq!(report.average_similarity, 1.0);
    assert!(report.warnings.is_empty());
    assert_eq!(report.exit_code(opts.pass_threshold), 0);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].transcribed_text, "コンニチハ。");

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(REPORT_FILE_NAME))?)?;
    assert_eq!(written["average_similarity"], 1.0);
    assert_eq!(written["warnings"], serde_json::json!([]));
    assert_eq!(written["results"][0]["character"], "aoi");
    assert_eq!(written["results"][0]["original"], "こんにちは！");
    Ok(())
}

#[test]
fn low_average_fails_with_warnings() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    touch_wav(dir.path(), "01.wav")?;
    touch_wav(dir.path(), "02.wav")?;
    let opts = opts_for(dir.path());

    // Scores 1.0 and 2 * 1 / 20 = 0.1, averaging 0.55.
    let transcriber =
        FakeTranscriber::new(&[("01.wav", "abcdefghij"), ("02.wav", "aqqqqqqqqq")]);
    let utterances = vec![
        Utterance::new(1, "aoi", "abcdefghij", "01.wav"),
        Utterance::new(2, "metan", "abcdefghij", "02.wav"),
    ];

    let report = run_verification(transcriber, &utterances, &opts)?;

    assert!((report.average_similarity - 0.55).abs() < 1e-12);
    assert_eq!(report.exit_code(opts.pass_threshold), 1);
    assert_eq!(
        report.warnings,
        vec!["ID 2: similarity 10.0% - text may not match".to_owned()]
    );
    Ok(())
}

#[test]
fn missing_audio_is_warned_and_excluded_from_average() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    touch_wav(dir.path(), "01.wav")?;
    let opts = opts_for(dir.path());

    let mut verifier = VoiceVerifier::new(FakeTranscriber::new(&[("01.wav", "はい")]));
    let utterances = vec![
        Utterance::new(1, "aoi", "はい", "01.wav"),
        Utterance::new(2, "metan", "いいえ", "02.wav"),
    ];

    let report = verifier.verify(&utterances, &opts)?;

    assert_eq!(report.average_similarity, 1.0);
    assert_eq!(report.warnings, vec!["ID 2: audio file not found".to_owned()]);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.exit_code(opts.pass_threshold), 0);

    // Only the existing file reached the transcriber, with the language hint.
    assert_eq!(
        verifier.transcriber().seen,
        vec![(dir.path().join("01.wav"), Some("ja".to_owned()))]
    );
    Ok(())
}

#[test]
fn nothing_scored_fails() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let opts = opts_for(dir.path());

    let report = run_verification(
        FakeTranscriber::new(&[]),
        &[Utterance::new(1, "aoi", "はい", "missing.wav")],
        &opts,
    )?;

    assert_eq!(report.average_similarity, 0.0);
    assert_eq!(report.exit_code(opts.pass_threshold), 1);
    assert_eq!(report.warnings.len(), 1);
    Ok(())
}

#[test]
fn transcriber_errors_abort_the_run() -> anyhow::Result<()> {
    struct Broken;
    impl Transcriber for Broken {
        fn transcribe(&mut self, _: &Path, _: Option<&str>) -> voiceline::Result<String> {
            Err(anyhow::anyhow!("decoder crashed").into())
        }
    }

    let dir = tempfile::tempdir()?;
    touch_wav(dir.path(), "01.wav")?;
    let opts = opts_for(dir.path());

    let err = run_verification(Broken, &[Utterance::new(1, "aoi", "はい", "01.wav")], &opts)
        .unwrap_err();
    assert!(err.to_string().contains("decoder crashed"));
    assert!(!dir.path().join(REPORT_FILE_NAME).exists());
    Ok(())
}
