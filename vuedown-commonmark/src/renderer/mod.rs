//! Configurable Markdown renderer.
//!
//! # Architecture
//!
//! - [`types`]: configuration ([`RendererConfig`], [`RenderOptions`]) and the
//!   [`Extension`] trait
//! - [`core`]: [`MarkdownRenderer`], [`Renderer`] and [`build_renderer`]
//! - [`rules`]: the AST rule table and the built-in highlight hook
//! - [`extensions`]: extensions that can be activated by name
pub mod core;
pub mod extensions;
pub mod rules;
pub mod types;

pub use core::{MarkdownFeatures, MarkdownRenderer, Renderer, build_renderer};

pub use extensions::{BUILTIN_EXTENSIONS, builtin_extension};
pub use rules::{AstTransformer, Rule, default_highlighter};
pub use types::{
  Extension,
  ExtensionUse,
  FullRenderFn,
  HighlightFn,
  PreprocessFn,
  Preset,
  RenderOptions,
  RendererConfig,
};
