use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::model::{SubjectFolder, recording_count};
use crate::error::{PipelineError, Result};

/// Find subject folders directly under `root` and the recordings inside them.
///
/// A child counts as a subject folder when it is a directory whose name starts
/// with one of `prefixes`. Inside it, every regular file whose name ends with
/// `extension` is a recording. Anything else is skipped without comment.
/// Folders and files come back sorted by name so that runs are reproducible.
pub fn scan(root: &Path, prefixes: &[String], extension: &str) -> Result<Vec<SubjectFolder>> {
    if !root.exists() {
        return Err(PipelineError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(PipelineError::NotADirectory(root.to_path_buf()));
    }

    let mut folders = Vec::new();
    for (name, path) in sorted_entries(root)? {
        if !prefixes.iter().any(|p| name.starts_with(p.as_str())) || !path.is_dir() {
            continue;
        }

        let recordings: Vec<PathBuf> = sorted_entries(&path)?
            .into_iter()
            .filter(|(file_name, file_path)| file_name.ends_with(extension) && file_path.is_file())
            .map(|(_, file_path)| file_path)
            .collect();

        let folder = SubjectFolder {
            name,
            path,
            recordings,
        };
        debug!(
            "{} ({} group): {} recording(s)",
            folder.name,
            folder.prefix(prefixes).unwrap_or("?"),
            folder.recordings.len()
        );
        folders.push(folder);
    }

    info!(
        "Found {} subject folder(s) with {} recording(s) under {}",
        folders.len(),
        recording_count(&folders),
        root.display()
    );
    Ok(folders)
}

/// `(file name, path)` for every entry of `dir`, sorted by name.
fn sorted_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let io_err = |source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        entries.push((name, entry.path()));
    }
    entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}
