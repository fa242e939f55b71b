//! Configuration types for building a renderer.
use std::{collections::BTreeMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::core::MarkdownRenderer;
use crate::{container::ContainerRender, error::TransformResult};

/// Highlight hook: `(code, language)` to highlighted HTML, or `None` to let
/// the base renderer escape the code.
pub type HighlightFn = Arc<dyn Fn(&str, &str) -> Option<String> + Send + Sync>;

/// Hook run on the raw text before rendering.
pub type PreprocessFn =
  Arc<dyn Fn(&MarkdownRenderer, &str) -> String + Send + Sync>;

/// A complete replacement for the rendering pipeline.
pub type FullRenderFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Named Markdown dialect the renderer starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
  /// CommonMark plus tables and strikethrough.
  #[default]
  Default,
  /// Plain CommonMark.
  #[serde(rename = "commonmark")]
  CommonMark,
  /// CommonMark with every optional behavior off, autolinks included.
  Zero,
}

impl std::str::FromStr for Preset {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "default" => Ok(Self::Default),
      "commonmark" => Ok(Self::CommonMark),
      "zero" => Ok(Self::Zero),
      other => Err(format!("unknown preset '{other}'")),
    }
  }
}

/// A renderer extension, activated once while the renderer is built.
pub trait Extension: Send + Sync {
  /// Name used to look the extension up from configuration files.
  fn name(&self) -> &str;

  /// Register rules, containers or option changes on `renderer`.
  ///
  /// # Errors
  ///
  /// Returns an error if `args` are not what the extension accepts.
  fn register(
    &self,
    renderer: &mut MarkdownRenderer,
    args: &[Value],
  ) -> TransformResult<()>;
}

/// One entry of the `use` list.
#[derive(Clone)]
pub enum ExtensionUse {
  /// Activate with no arguments.
  Bare(Arc<dyn Extension>),
  /// Activate with the given arguments.
  WithArgs(Arc<dyn Extension>, Vec<Value>),
}

impl ExtensionUse {
  #[must_use]
  pub fn extension(&self) -> &dyn Extension {
    match self {
      Self::Bare(ext) | Self::WithArgs(ext, _) => ext.as_ref(),
    }
  }

  #[must_use]
  pub fn args(&self) -> &[Value] {
    match self {
      Self::Bare(_) => &[],
      Self::WithArgs(_, args) => args,
    }
  }
}

impl fmt::Debug for ExtensionUse {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Bare(ext) => f.debug_tuple("Bare").field(&ext.name()).finish(),
      Self::WithArgs(ext, args) => {
        f.debug_tuple("WithArgs")
          .field(&ext.name())
          .field(args)
          .finish()
      },
    }
  }
}

/// Options for the Markdown pipeline.
#[derive(Clone)]
pub struct RenderOptions {
  pub preset:          Preset,
  /// Pass raw HTML through. When off, raw HTML is escaped as text.
  pub html:            bool,
  /// Custom highlight hook. `None` selects the built-in highlighter.
  pub highlight:       Option<HighlightFn>,
  /// Theme for the built-in highlighter.
  pub highlight_theme: Option<String>,
  /// Extensions, activated in order.
  pub plugins:         Vec<ExtensionUse>,
  pub preprocess:      Option<PreprocessFn>,
  /// Replaces the default demo block markup for both phases.
  pub vue_render:      Option<Arc<dyn ContainerRender>>,
  /// Options not recognised above, handed to the Markdown backend.
  pub passthrough:     BTreeMap<String, Value>,
}

impl Default for RenderOptions {
  fn default() -> Self {
    Self {
      preset:          Preset::Default,
      html:            true,
      highlight:       None,
      highlight_theme: None,
      plugins:         Vec::new(),
      preprocess:      None,
      vue_render:      None,
      passthrough:     BTreeMap::new(),
    }
  }
}

impl fmt::Debug for RenderOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RenderOptions")
      .field("preset", &self.preset)
      .field("html", &self.html)
      .field("highlight", &self.highlight.as_ref().map(|_| "<fn>"))
      .field("highlight_theme", &self.highlight_theme)
      .field("plugins", &self.plugins)
      .field("preprocess", &self.preprocess.as_ref().map(|_| "<fn>"))
      .field("vue_render", &self.vue_render.as_ref().map(|_| "<fn>"))
      .field("passthrough", &self.passthrough)
      .finish()
  }
}

/// How the renderer is put together.
#[derive(Clone)]
pub enum RendererConfig {
  /// The function is the whole pipeline; nothing else applies.
  FullOverride(FullRenderFn),
  Options(RenderOptions),
}

impl Default for RendererConfig {
  fn default() -> Self {
    Self::Options(RenderOptions::default())
  }
}

impl From<RenderOptions> for RendererConfig {
  fn from(options: RenderOptions) -> Self {
    Self::Options(options)
  }
}

impl fmt::Debug for RendererConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::FullOverride(_) => f.write_str("FullOverride(<fn>)"),
      Self::Options(options) => {
        f.debug_tuple("Options").field(options).finish()
      },
    }
  }
}
