//! Locating elements in raw markup without parsing it into a tree.
//!
//! Elements are found by their tags and returned as byte ranges into the
//! input, so callers can cut and splice markup while every byte they do not
//! touch stays as written. Tag and attribute case in particular survives,
//! which Vue templates depend on (`<MyWidget :initialValue="x">`).
use std::{ops::Range, sync::LazyLock};

use regex::Regex;

use super::compile_or_never;

pub static SCRIPT_TAG: LazyLock<Regex> =
  LazyLock::new(|| tag_pattern("script"));
pub static STYLE_TAG: LazyLock<Regex> = LazyLock::new(|| tag_pattern("style"));
pub static TEMPLATE_TAG: LazyLock<Regex> =
  LazyLock::new(|| tag_pattern("template"));

/// Where one element sits in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpan {
  /// From the start of the open tag to the end of the close tag.
  pub outer: Range<usize>,
  /// Between the open and close tags.
  pub inner: Range<usize>,
}

impl ElementSpan {
  fn contains(&self, other: &Self) -> bool {
    self.inner.start <= other.outer.start && other.outer.start < self.inner.end
  }
}

/// How an element's content is treated while looking for its close tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
  /// Same-name elements may nest and are matched by depth.
  Elements,
  /// The first close tag ends the element, as for `<script>` and `<style>`.
  RawText,
}

/// Case-insensitive pattern for the open and close tags of `name`.
///
/// Group 1 is `/` for a close tag and empty otherwise.
#[must_use]
pub fn tag_pattern(name: &str) -> Regex {
  compile_or_never(
    "TAG_PATTERN",
    &format!(r"(?i)<(/?){}(?:\s[^>]*)?>", regex::escape(name)),
  )
}

/// Outermost elements whose tags match `pattern`, in document order.
///
/// An element that is never closed runs to the end of `html`. Close tags
/// without an open element are skipped.
#[must_use]
pub fn outermost_elements(
  html: &str,
  pattern: &Regex,
  content: Content,
) -> Vec<ElementSpan> {
  let mut spans = Vec::new();
  let mut depth = 0usize;
  let mut open = None;

  for caps in pattern.captures_iter(html) {
    let Some(tag) = caps.get(0) else {
      continue;
    };
    let closing = caps.get(1).is_some_and(|slash| !slash.is_empty());

    if !closing {
      if depth == 0 {
        open = Some((tag.start(), tag.end()));
        depth = 1;
      } else if content == Content::Elements {
        depth += 1;
      }
      continue;
    }

    if depth == 0 {
      continue;
    }
    depth -= 1;
    if depth == 0
      && let Some((start, inner_start)) = open.take()
    {
      spans.push(ElementSpan {
        outer: start..tag.end(),
        inner: inner_start..tag.start(),
      });
    }
  }

  if let Some((start, inner_start)) = open {
    spans.push(ElementSpan {
      outer: start..html.len(),
      inner: inner_start..html.len(),
    });
  }

  spans
}

/// Raw-text elements matching `pattern` that are not inside a `<template>`.
#[must_use]
pub fn top_level_raw_text(html: &str, pattern: &Regex) -> Vec<ElementSpan> {
  let templates = outermost_elements(html, &TEMPLATE_TAG, Content::Elements);
  outermost_elements(html, pattern, Content::RawText)
    .into_iter()
    .filter(|span| !templates.iter().any(|t| t.contains(span)))
    .collect()
}

/// Copy `html` without the `outer` ranges of `spans`.
///
/// Spans must be sorted by start; a span overlapping an earlier one is
/// skipped.
#[must_use]
pub fn cut_elements(html: &str, spans: &[ElementSpan]) -> String {
  let mut out = String::with_capacity(html.len());
  let mut last = 0;
  for span in spans {
    if span.outer.start < last {
      continue;
    }
    out.push_str(&html[last..span.outer.start]);
    last = span.outer.end;
  }
  out.push_str(&html[last..]);
  out
}
