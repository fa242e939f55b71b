//! Types for the vuedown-commonmark public API.
use std::{
  fs,
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
  cache::CacheRef,
  error::{TransformError, TransformResult},
};

/// A Markdown document to transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
  name:   String,
  origin: PathBuf,
  text:   String,
}

impl SourceDocument {
  /// Create a document from its origin path and text.
  ///
  /// The logical name is the file stem of `origin`.
  #[must_use]
  pub fn new(origin: impl Into<PathBuf>, text: impl Into<String>) -> Self {
    let origin = origin.into();
    let name = origin
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_default();
    Self {
      name,
      origin,
      text: text.into(),
    }
  }

  /// Read a document from disk.
  ///
  /// # Errors
  ///
  /// Returns [`TransformError::Read`] if the file cannot be read.
  pub fn from_path(path: &Path) -> TransformResult<Self> {
    let text = fs::read_to_string(path).map_err(|source| {
      TransformError::Read {
        path: path.to_path_buf(),
        source,
      }
    })?;
    Ok(Self::new(path, text))
  }

  /// Logical name: the origin's file name without its extension.
  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Path the document came from.
  #[must_use]
  pub fn origin(&self) -> &Path {
    &self.origin
  }

  /// Raw Markdown text.
  #[must_use]
  pub fn text(&self) -> &str {
    &self.text
  }
}

/// One demo fragment lifted out of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
  /// Cache identity, `<doc>-component-<ordinal>`.
  pub name:        String,
  /// Position in document order, from 0.
  pub ordinal:     usize,
  /// Placeholder element name in the parent template, `component<ordinal>`.
  pub placeholder: String,
  /// Inner HTML of the wrapper marker.
  pub content:     String,
  /// Where the cache stored the record.
  pub reference:   CacheRef,
}

/// The assembled component definition for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalArtifact {
  /// Placeholder-bearing markup wrapped in a single root `<div>`.
  pub template: String,
  /// Concatenated text of the document's top-level `<style>` elements.
  pub style:    String,
  /// Default-exported registration object.
  pub script:   String,
}

impl FinalArtifact {
  /// Serialize as a single-file component.
  #[must_use]
  pub fn to_sfc(&self) -> String {
    format!(
      "<template>{}</template>\n\n<style>{}</style>\n<script>{}</script>\n",
      self.template, self.style, self.script
    )
  }
}

/// Result of transforming one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
  pub artifact:   FinalArtifact,
  pub components: Vec<ComponentRecord>,
  /// Cache reference of the final artifact, `<doc>-<id>`.
  pub reference:  CacheRef,
}
