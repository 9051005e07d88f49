//! Script loading.
//!
//! Batches only see `Vec<Utterance>`; where the utterances come from is behind [`ScriptLoader`].
//! The video project keeps its dialogue in a TypeScript module as an exported array literal,
//! so [`TsScriptLoader`] is the loader the CLIs use.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::utterance::Utterance;
use crate::{Error, Result};

/// Source of the ordered utterance list for a batch run.
pub trait ScriptLoader {
    fn load_utterances(&self, path: &Path) -> Result<Vec<Utterance>>;
}

static SCRIPT_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export const scriptData[^=]*=\s*\[([\s\S]*?)\];").expect("valid regex")
});

// Fields must appear in this order; anything between `text` and `voiceFile` is skipped,
// as long as it contains no closing brace.
static RECORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\{\s*id:\s*(\d+),\s*character:\s*"([^"]+)",\s*text:\s*"([^"]+)"[^}]*voiceFile:\s*"([^"]+)""#,
    )
    .expect("valid regex")
});

/// Loads utterances from the `export const scriptData = [...]` literal of a TypeScript file.
#[derive(Debug, Clone, Copy, Default)]
pub struct TsScriptLoader;

impl ScriptLoader for TsScriptLoader {
    fn load_utterances(&self, path: &Path) -> Result<Vec<Utterance>> {
        let source = std::fs::read_to_string(path).map_err(|err| {
            Error::script(format!("failed to read '{}': {err}", path.display()))
        })?;
        parse_script_source(&source)
    }
}

/// Loads utterances from a JSON array of `{id, character, text, voiceFile}` objects.
///
/// Extra fields per record are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonScriptLoader;

impl ScriptLoader for JsonScriptLoader {
    fn load_utterances(&self, path: &Path) -> Result<Vec<Utterance>> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            Error::script(format!("failed to read '{}': {err}", path.display()))
        })?;
        let utterances: Vec<Utterance> = serde_json::from_str(&raw)
            .map_err(|err| Error::script(format!("invalid script JSON: {err}")))?;
        ensure_unique_ids(&utterances)?;
        Ok(utterances)
    }
}

/// Pick a loader from the file extension: `.json` → JSON, everything else → TypeScript.
pub fn loader_for_path(path: &Path) -> Box<dyn ScriptLoader> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Box::new(JsonScriptLoader),
        _ => Box::new(TsScriptLoader),
    }
}

/// Convenience wrapper: load utterances with the loader matching `path`.
pub fn load_utterances(path: &Path) -> Result<Vec<Utterance>> {
    loader_for_path(path).load_utterances(path)
}

/// Extract utterances from TypeScript source text.
pub fn parse_script_source(source: &str) -> Result<Vec<Utterance>> {
    let block = SCRIPT_DATA_RE
        .captures(source)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| Error::script("scriptData not found in script source"))?;

    let mut utterances = Vec::new();
    for caps in RECORD_RE.captures_iter(block.as_str()) {
        let id = caps[1]
            .parse::<u32>()
            .map_err(|err| Error::script(format!("invalid id '{}': {err}", &caps[1])))?;
        utterances.push(Utterance::new(id, &caps[2], &caps[3], &caps[4]));
    }

    ensure_unique_ids(&utterances)?;
    Ok(utterances)
}

fn ensure_unique_ids(utterances: &[Utterance]) -> Result<()> {
    let mut seen = HashSet::with_capacity(utterances.len());
    for u in utterances {
        if !seen.insert(u.id) {
            return Err(Error::script(format!("duplicate utterance id {}", u.id)));
        }
    }
    Ok(())
}
