//! Temp-then-rename file writes.
//!
//! Artifacts are written to a temporary sibling of the destination, flushed,
//! synced and then renamed over it. If any step fails the temporary file is
//! dropped (and deleted), so the destination either keeps its old contents
//! or receives the complete new ones.

use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{GradeError, Result};

/// Write `path` atomically using `fill` to produce the contents.
pub(crate) fn write_with<F>(path: &Path, stage: &'static str, fill: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| GradeError::io(stage, dir, e))?;

    let temp = tempfile::Builder::new()
        .prefix(".gradematch-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| GradeError::io(stage, path, e))?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        fill(&mut writer).map_err(|e| GradeError::io(stage, path, e))?;
        writer.flush().map_err(|e| GradeError::io(stage, path, e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| GradeError::io(stage, path, e))?;
    temp.persist(path)
        .map_err(|e| GradeError::io(stage, path, e.error))?;
    Ok(())
}

/// Write `bytes` to `path` atomically.
pub(crate) fn write_bytes(path: &Path, stage: &'static str, bytes: &[u8]) -> Result<()> {
    write_with(path, stage, |w| w.write_all(bytes))
}
