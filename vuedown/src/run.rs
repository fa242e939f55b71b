use std::{path::PathBuf, sync::Arc};

use color_eyre::eyre::{Context, Result};
use log::{error, info};
use rayon::prelude::*;
use vuedown_commonmark::{
  FileCache,
  TransformError,
  TransformOutput,
  Transformer,
};
use vuedown_config::Config;

/// Result of transforming one input.
#[derive(Debug)]
pub struct Outcome {
  pub input:  PathBuf,
  pub result: Result<TransformOutput, TransformError>,
}

impl Outcome {
  #[must_use]
  pub const fn is_ok(&self) -> bool {
    self.result.is_ok()
  }
}

/// Build a transformer writing into the configured cache directory.
///
/// # Errors
///
/// Returns an error if the configuration names an unknown extension or an
/// extension rejects its arguments.
pub fn build_transformer(config: &Config) -> Result<Transformer> {
  let options = config
    .render_options()
    .wrap_err("Invalid renderer configuration")?;
  let cache_dir = config.cache_dir();
  info!("Cache directory: {}", cache_dir.display());

  Transformer::new(options, Arc::new(FileCache::new(cache_dir)))
    .wrap_err("Failed to build the renderer")
}

/// Transform every file in parallel. Outcomes keep the order of `files`.
#[must_use]
pub fn transform_files(
  transformer: &Transformer,
  files: &[PathBuf],
) -> Vec<Outcome> {
  files
    .par_iter()
    .map(|input| {
      let result = transformer.transform_path(input);
      if let Err(ref e) = result {
        error!("Failed to transform {}: {e}", input.display());
      }
      Outcome {
        input: input.clone(),
        result,
      }
    })
    .collect()
}
