//! Lifting rendered demo blocks out of a document.
//!
//! Every `<vuecomponent>` wrapper in the rendered HTML becomes a
//! [`ComponentRecord`] saved to the cache, and is replaced in the parent by an
//! empty `<component<i>>` placeholder. What remains of the parent becomes the
//! template of its [`FinalArtifact`].
//!
//! The markup is cut by byte ranges rather than reserialized, so records and
//! templates keep the exact tag and attribute spelling of the rendered HTML.
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;

use crate::{
  cache::ContentCache,
  container::demo::WRAPPER_TAG,
  error::TransformResult,
  types::{ComponentRecord, FinalArtifact},
  utils::markup::{
    Content,
    ElementSpan,
    SCRIPT_TAG,
    STYLE_TAG,
    cut_elements,
    outermost_elements,
    tag_pattern,
    top_level_raw_text,
  },
};

static WRAPPER_TAG_RE: LazyLock<Regex> =
  LazyLock::new(|| tag_pattern(WRAPPER_TAG));

/// Output of [`extract_components`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
  pub artifact:   FinalArtifact,
  pub components: Vec<ComponentRecord>,
}

/// Cache name of a document's `ordinal`-th component.
#[must_use]
pub fn component_name(doc_name: &str, ordinal: usize) -> String {
  format!("{doc_name}-component-{ordinal}")
}

/// Placeholder element name for the `ordinal`-th component.
#[must_use]
pub fn placeholder_name(ordinal: usize) -> String {
  format!("component{ordinal}")
}

/// Extract every wrapper marker from `html` into the cache.
///
/// Markers are numbered in document order from 0; a marker nested in another
/// stays inside its outermost ancestor's record. Remaining `<script>`
/// elements outside `<template>` are dropped, `<style>` elements are moved
/// into the style zone, and the rest is wrapped in one root `<div>`.
///
/// # Errors
///
/// Returns an error if a record cannot be saved.
pub fn extract_components(
  html: &str,
  doc_name: &str,
  cache: &dyn ContentCache,
) -> TransformResult<Extraction> {
  let markers = outermost_elements(html, &WRAPPER_TAG_RE, Content::Elements);
  if markers.last().is_some_and(|marker| marker.inner.end == html.len()) {
    warn!("Unclosed <{WRAPPER_TAG}> in {doc_name}, recording the rest");
  }

  let mut components = Vec::with_capacity(markers.len());
  let mut rest = String::with_capacity(html.len());
  let mut last = 0;

  for (ordinal, marker) in markers.iter().enumerate() {
    let content = html[marker.inner.clone()].to_string();
    let name = component_name(doc_name, ordinal);
    let reference = cache.save(&name, &content)?;
    debug!("Extracted {name} ({} bytes)", content.len());

    let placeholder = placeholder_name(ordinal);
    rest.push_str(&html[last..marker.outer.start]);
    rest.push_str(&format!("<{placeholder}></{placeholder}>"));
    last = marker.outer.end;

    components.push(ComponentRecord {
      name,
      ordinal,
      placeholder,
      content,
      reference,
    });
  }
  rest.push_str(&html[last..]);

  let styles = top_level_raw_text(&rest, &STYLE_TAG);
  let style = styles
    .iter()
    .map(|span| &rest[span.inner.clone()])
    .collect::<String>();

  let mut removed: Vec<ElementSpan> = top_level_raw_text(&rest, &SCRIPT_TAG);
  removed.extend(styles);
  removed.sort_unstable_by_key(|span| span.outer.start);
  let template = format!("<div>{}</div>", cut_elements(&rest, &removed));

  Ok(Extraction {
    artifact: FinalArtifact {
      template,
      style,
      script: registration_script(&components),
    },
    components,
  })
}

/// The default-exported object registering every placeholder.
#[must_use]
pub fn registration_script(components: &[ComponentRecord]) -> String {
  if components.is_empty() {
    return "export default {\n  components: {}\n}".to_string();
  }

  let entries = components
    .iter()
    .map(|c| {
      format!("    {}: require('{}')", c.placeholder, c.reference.import)
    })
    .collect::<Vec<_>>()
    .join(",\n");
  format!("export default {{\n  components: {{\n{entries}\n  }}\n}}")
}
