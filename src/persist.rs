//! Atomic output files.
//!
//! Every table a batch produces is written to a temp file next to its destination and then
//! renamed into place, so an aborted run leaves either the old file or the new one.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::Result;

/// Write `path` through a temp file in the same directory, creating the directory if needed.
pub fn write_atomically(path: &Path, write: impl FnOnce(&mut File) -> Result<()>) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Serialize `value` as JSON into `path`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    write_atomically(path, |file| {
        let mut w = BufWriter::new(file);
        if pretty {
            serde_json::to_writer_pretty(&mut w, value)?;
        } else {
            serde_json::to_writer(&mut w, value)?;
        }
        w.flush()?;
        Ok(())
    })
}

/// Render `value` as a TypeScript module exporting a single constant.
///
/// The renderer imports this module directly, so the value must serialize to plain JSON
/// literals (`true`/`false`, numbers, strings).
pub fn write_ts_constant<T: Serialize + ?Sized>(
    w: &mut impl Write,
    generator: &str,
    name: &str,
    ts_type: &str,
    value: &T,
) -> Result<()> {
    writeln!(w, "// Auto-generated file - do not edit")?;
    writeln!(w, "// Generated by {generator}")?;
    writeln!(w)?;
    write!(w, "export const {name}: {ts_type} = ")?;
    serde_json::to_writer(&mut *w, value)?;
    writeln!(w, ";")?;
    Ok(())
}

/// [`write_ts_constant`] into `path`, atomically.
pub fn write_ts_module<T: Serialize + ?Sized>(
    path: &Path,
    generator: &str,
    name: &str,
    ts_type: &str,
    value: &T,
) -> Result<()> {
    write_atomically(path, |file| {
        let mut w = BufWriter::new(file);
        write_ts_constant(&mut w, generator, name, ts_type, value)?;
        w.flush()?;
        Ok(())
    })
}
