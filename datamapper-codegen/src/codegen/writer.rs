//! File writer honouring the overwrite and dry-run switches

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{CodegenError, Result};

/// What happened to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Created,
    Overwritten,
    /// The file existed and overwriting was off
    Skipped,
    /// Nothing was written
    DryRun,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteOutcome::Created => "created",
            WriteOutcome::Overwritten => "overwritten",
            WriteOutcome::Skipped => "skipped",
            WriteOutcome::DryRun => "dry run",
        })
    }
}

/// Write `contents` to `path`, creating parent directories.
///
/// An existing file is left untouched unless `overwrite` is set. In dry-run
/// mode the disk is never touched.
pub fn write_file(path: &Path, contents: &str, overwrite: bool, dry_run: bool) -> Result<WriteOutcome> {
    let exists = path.exists();

    if exists && !overwrite {
        return Ok(WriteOutcome::Skipped);
    }
    if dry_run {
        return Ok(WriteOutcome::DryRun);
    }

    let wrap = |source| CodegenError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, contents).map_err(wrap)?;

    Ok(if exists {
        WriteOutcome::Overwritten
    } else {
        WriteOutcome::Created
    })
}
