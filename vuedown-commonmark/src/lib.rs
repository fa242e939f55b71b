//! # vuedown-commonmark
//!
//! Compiles Markdown documents with live `::: demo` blocks into Vue
//! single-file components.
//!
//! Each demo block is rendered into a `<demo-block>` fragment carrying its
//! source, its description and its own `<script>`/`<style>`, then lifted out
//! of the page into a cache entry of its own. The page keeps an empty
//! `<component<i>>` placeholder per block and registers every entry in its
//! `components` object.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use vuedown_commonmark::{
//!   MemoryCache,
//!   RenderOptions,
//!   SourceDocument,
//!   Transformer,
//! };
//!
//! let transformer =
//!   Transformer::new(RenderOptions::default(), Arc::new(MemoryCache::new()))
//!     .expect("default options are valid");
//!
//! let document = SourceDocument::new(
//!   "button.md",
//!   "# Button\n\n::: demo basic usage\n<button>Go</button>\n:::\n",
//! );
//! let output = transformer.transform(&document).expect("transform");
//!
//! assert!(output.artifact.template.contains("<component0></component0>"));
//! assert_eq!(output.components[0].name, "button-component-0");
//! ```
//!
//! ## Architecture
//!
//! - [`renderer`]: comrak-based renderer with an ordered rule table and
//!   extensions
//! - [`container`]: the `:::` block-container scanner and the demo container
//! - [`extract`]: lifts rendered demo blocks into component records
//! - [`cache`]: named storage for records and final components
//! - [`transform`]: the end-to-end pipeline for one document
//! - [`syntax`]: syntax highlighting backends
//! - [`utils`]: identifiers, tag stripping and small HTML helpers
pub mod cache;
pub mod container;
pub mod error;
pub mod extract;
pub mod renderer;
pub mod syntax;
pub mod transform;
pub mod types;
pub mod utils;

pub use crate::{
  cache::{CacheRef, ContentCache, FileCache, MemoryCache},
  error::{CacheError, TransformError, TransformResult},
  extract::{Extraction, extract_components},
  renderer::{
    Extension,
    ExtensionUse,
    Preset,
    RenderOptions,
    Renderer,
    RendererConfig,
    build_renderer,
  },
  transform::Transformer,
  types::{ComponentRecord, FinalArtifact, SourceDocument, TransformOutput},
  utils::{TagFilter, generate_id, strip_tags},
};
