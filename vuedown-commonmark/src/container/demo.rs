//! The `::: demo` container.
//!
//! A demo block shows a live component next to its source:
//!
//! ```text
//! ::: demo basic usage
//! <template><div>hi</div></template>
//! <script>export default {}</script>
//! <style>.a{color:red}</style>
//! :::
//! ```
//!
//! renders as a `<demo-block>` inside a `<template>`, carrying the source
//! markup in a `source` slot, the description rendered as Markdown, and a
//! `highlight` slot holding the rendered body. The block's own `<script>` and
//! `<style>` follow the template. Everything is wrapped in a `<vuecomponent>`
//! marker for the extraction pass.
use std::sync::{Arc, LazyLock};

use log::trace;
use regex::Regex;

use super::{
  Container,
  ContainerRender,
  ContainerToken,
  Nesting,
  RenderEnv,
  ReservedChar,
};
use crate::{
  error::TransformResult,
  utils::{
    TagFilter,
    compile_or_never,
    decode_hex_entities,
    markup::{SCRIPT_TAG, STYLE_TAG, top_level_raw_text},
    strip_empty_attribute_values,
    strip_tags,
  },
};

/// Name of the demo container.
pub const DEMO_CONTAINER: &str = "demo";

/// Element wrapped around every rendered demo block.
pub const WRAPPER_TAG: &str = "vuecomponent";

/// `@` is escaped inside demo bodies so attribute shorthands such as
/// `@click` still parse as HTML attributes. The sentinel is itself a valid
/// attribute name prefix.
pub const RESERVED_AT: ReservedChar = ReservedChar {
  ch:       '@',
  sentinel: "vuedown-at-",
};

static DEMO_INFO_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never("DEMO_INFO_RE", r"^demo\s*(.*)$"));

/// Description of a demo info string, or `None` if it is not a demo.
#[must_use]
pub fn demo_description(info: &str) -> Option<&str> {
  DEMO_INFO_RE
    .captures(info.trim())
    .map(|caps| caps.get(1).map_or("", |m| m.as_str().trim()))
}

/// State carried from a demo block's opening to its closing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoFrame {
  pub description: String,
  pub raw_markup:  String,
}

/// Default markup for demo blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoRender;

impl DemoRender {
  fn open(
    token: &ContainerToken<'_>,
    env: &mut RenderEnv<'_>,
  ) -> TransformResult<String> {
    let description = demo_description(token.info)
      .unwrap_or_default()
      .to_string();

    // A leading fenced block holds the markup verbatim.
    let raw_markup = env
      .renderer
      .leading_code_literal(token.content)
      .unwrap_or_else(|| token.content.to_string());

    let source = strip_empty_attribute_values(&decode_hex_entities(
      &strip_tags(&raw_markup, &TagFilter::remove(&["script", "style"])),
    ));

    let description_html = if description.is_empty() {
      String::new()
    } else {
      env.renderer.render_blocks(&description)?
    };

    trace!("Opening demo block '{description}'");
    env.frames.push(DemoFrame {
      description,
      raw_markup,
    });

    Ok(format!(
      "<template>\n<demo-block class=\"demo-box\">\n<div class=\"source\" \
       slot=\"source\">{source}</div>\n{description_html}<div \
       class=\"highlight\" slot=\"highlight\">\n"
    ))
  }

  fn close(
    token: &ContainerToken<'_>,
    env: &mut RenderEnv<'_>,
  ) -> TransformResult<String> {
    let raw_markup = env
      .frames
      .pop()
      .map_or_else(|| token.content.to_string(), |frame| frame.raw_markup);
    let (script, style) = extract_script_and_style(&raw_markup);

    Ok(format!("</div></demo-block></template>\n{script}\n{style}\n"))
  }
}

impl ContainerRender for DemoRender {
  fn render(
    &self,
    token: &ContainerToken<'_>,
    env: &mut RenderEnv<'_>,
  ) -> TransformResult<String> {
    match token.nesting {
      Nesting::Open => Self::open(token, env),
      Nesting::Close => Self::close(token, env),
    }
  }
}

/// Outer HTML of the first `<script>` and `<style>` in `markup` that are not
/// inside a `<template>`, exactly as written.
///
/// Either is empty when missing.
#[must_use]
pub fn extract_script_and_style(markup: &str) -> (String, String) {
  let first = |pattern: &Regex| {
    top_level_raw_text(markup, pattern)
      .first()
      .map_or_else(String::new, |span| markup[span.outer.clone()].to_string())
  };
  (first(&SCRIPT_TAG), first(&STYLE_TAG))
}

/// Surrounds another renderer's output with the wrapper marker.
#[derive(Clone)]
pub struct DemoContainer {
  inner: Arc<dyn ContainerRender>,
}

impl DemoContainer {
  #[must_use]
  pub fn new(inner: Arc<dyn ContainerRender>) -> Self {
    Self { inner }
  }
}

impl ContainerRender for DemoContainer {
  fn render(
    &self,
    token: &ContainerToken<'_>,
    env: &mut RenderEnv<'_>,
  ) -> TransformResult<String> {
    let content = self.inner.render(token, env)?;
    Ok(match token.nesting {
      Nesting::Open => format!("<{WRAPPER_TAG}>\n{content}\n"),
      Nesting::Close => format!("\n{content}</{WRAPPER_TAG}>\n"),
    })
  }
}

/// The demo container, rendering with `vue_render` when given and
/// [`DemoRender`] otherwise.
#[must_use]
pub fn demo_container(
  vue_render: Option<Arc<dyn ContainerRender>>,
) -> Container {
  let inner = vue_render
    .unwrap_or_else(|| Arc::new(DemoRender) as Arc<dyn ContainerRender>);
  Container::new(
    DEMO_CONTAINER,
    Arc::new(|info: &str| demo_description(info).is_some()),
    Arc::new(DemoContainer::new(inner)),
  )
  .with_reserved(RESERVED_AT)
}
