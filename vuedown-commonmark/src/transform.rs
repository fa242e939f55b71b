//! One document, end to end.
use std::{path::Path, sync::Arc};

use log::debug;

use crate::{
  cache::ContentCache,
  error::TransformResult,
  extract::extract_components,
  renderer::{Renderer, RendererConfig, build_renderer},
  types::{SourceDocument, TransformOutput},
  utils::generate_id,
};

/// Renders documents, extracts their demo blocks and stores the results.
///
/// A transformer is read-only once built and may be shared across threads.
pub struct Transformer {
  renderer: Renderer,
  cache:    Arc<dyn ContentCache>,
}

impl std::fmt::Debug for Transformer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Transformer")
      .field("renderer", &self.renderer)
      .finish_non_exhaustive()
  }
}

impl Transformer {
  /// Build the renderer described by `config` and store into `cache`.
  ///
  /// # Errors
  ///
  /// Returns an error if an extension rejects its arguments.
  pub fn new(
    config: impl Into<RendererConfig>,
    cache: Arc<dyn ContentCache>,
  ) -> TransformResult<Self> {
    Ok(Self::with_renderer(build_renderer(config.into())?, cache))
  }

  /// Use an already built renderer.
  #[must_use]
  pub fn with_renderer(
    renderer: Renderer,
    cache: Arc<dyn ContentCache>,
  ) -> Self {
    Self { renderer, cache }
  }

  #[must_use]
  pub const fn renderer(&self) -> &Renderer {
    &self.renderer
  }

  #[must_use]
  pub fn cache(&self) -> &dyn ContentCache {
    self.cache.as_ref()
  }

  /// Transform one document.
  ///
  /// Every demo block is saved as `<doc>-component-<i>` and the assembled
  /// component as `<doc>-<id>`, where `<id>` is derived from the document's
  /// origin path.
  ///
  /// # Errors
  ///
  /// Returns an error if rendering fails or the cache rejects a write. Records
  /// saved before the failure are left in place.
  pub fn transform(
    &self,
    document: &SourceDocument,
  ) -> TransformResult<TransformOutput> {
    debug!("Transforming {}", document.origin().display());

    let html = self.renderer.render(document.text())?;
    let extraction =
      extract_components(&html, document.name(), self.cache.as_ref())?;

    let name =
      format!("{}-{}", document.name(), generate_id(document.origin()));
    let reference = self.cache.save(&name, &extraction.artifact.to_sfc())?;

    debug!(
      "Transformed {} ({} demo blocks) into {}",
      document.origin().display(),
      extraction.components.len(),
      reference.path.display()
    );

    Ok(TransformOutput {
      artifact: extraction.artifact,
      components: extraction.components,
      reference,
    })
  }

  /// Read and transform the document at `path`.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or the transform fails.
  pub fn transform_path(
    &self,
    path: &Path,
  ) -> TransformResult<TransformOutput> {
    self.transform(&SourceDocument::from_path(path)?)
  }
}
