use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, bail};
use log::{debug, warn};

/// Extension of the documents picked up from directories.
const MARKDOWN_EXTENSION: &str = "md";

/// Expand `inputs` into the documents to transform.
///
/// Files are taken as given, directories are searched recursively for
/// `*.md` files in sorted order. Duplicates are dropped, keeping the first
/// occurrence.
///
/// # Errors
///
/// Returns an error if an input does not exist.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
  let mut files = Vec::new();

  for input in inputs {
    if input.is_dir() {
      let found = collect_markdown_files(input);
      debug!("Found {} markdown files in {}", found.len(), input.display());
      files.extend(found);
    } else if input.is_file() {
      files.push(input.clone());
    } else {
      bail!("Input does not exist: {}", input.display());
    }
  }

  let mut seen = std::collections::HashSet::new();
  files.retain(|file| seen.insert(file.clone()));
  Ok(files)
}

/// Every `*.md` file below `dir`, sorted.
#[must_use]
pub fn collect_markdown_files(dir: &Path) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
    .follow_links(true)
    .into_iter()
    .filter_map(|entry| {
      entry
        .inspect_err(|e| warn!("Skipping unreadable entry: {e}"))
        .ok()
    })
    .filter(|e| {
      e.file_type().is_file()
        && e
          .path()
          .extension()
          .is_some_and(|ext| ext == MARKDOWN_EXTENSION)
    })
    .map(walkdir::DirEntry::into_path)
    .collect();

  files.sort();
  files
}
