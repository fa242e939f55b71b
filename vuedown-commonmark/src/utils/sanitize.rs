//! String-level HTML tag stripping.
//!
//! Works on raw markup with regular expressions. Nothing is parsed into a
//! tree, so malformed input is neither validated nor rebalanced: only tags are
//! removed.
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::compile_or_never;

/// Which tags [`strip_tags`] touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
  /// Delete the listed elements together with everything between their open
  /// and close tags. Unpaired tags with a listed name are deleted on their
  /// own.
  Remove(Vec<String>),

  /// Delete the tags of every element that is not listed, keeping its text.
  /// Listed elements stay verbatim, attributes included.
  Keep(Vec<String>),
}

impl TagFilter {
  /// Build a [`TagFilter::Remove`] from string slices.
  #[must_use]
  pub fn remove(tags: &[&str]) -> Self {
    Self::Remove(tags.iter().map(|t| t.to_ascii_lowercase()).collect())
  }

  /// Build a [`TagFilter::Keep`] from string slices.
  #[must_use]
  pub fn keep(tags: &[&str]) -> Self {
    Self::Keep(tags.iter().map(|t| t.to_ascii_lowercase()).collect())
  }
}

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never("TAG_RE", r"<(/?)([A-Za-z][A-Za-z0-9-]*)\b[^>]*>")
});

/// Strip HTML tags from `html` according to `filter`.
///
/// Tag names compare case-insensitively.
#[must_use]
pub fn strip_tags(html: &str, filter: &TagFilter) -> String {
  match filter {
    TagFilter::Remove(tags) => remove_elements(html, tags),
    TagFilter::Keep(tags) => keep_elements(html, tags),
  }
}

fn remove_elements(html: &str, tags: &[String]) -> String {
  let mut out = html.to_string();

  for tag in tags {
    let escaped = regex::escape(tag);
    let element_re = compile_or_never(
      "ELEMENT_RE",
      &format!(r"(?is)<{escaped}\b[^>]*>.*?</{escaped}\s*>"),
    );
    out = element_re.replace_all(&out, "").into_owned();

    let stray_re =
      compile_or_never("STRAY_TAG_RE", &format!(r"(?i)</?{escaped}\b[^>]*>"));
    out = stray_re.replace_all(&out, "").into_owned();
  }

  out
}

fn keep_elements(html: &str, tags: &[String]) -> String {
  TAG_RE
    .replace_all(html, |caps: &Captures| {
      let name = caps[2].to_ascii_lowercase();
      if tags.iter().any(|t| *t == name) {
        caps[0].to_string()
      } else {
        String::new()
      }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_remove_script_and_style() {
    let html = "<template><div>hi</div></template>\n<script>export default \
                {}</script>\n<style>.a{color:red}</style>";
    let out = strip_tags(html, &TagFilter::remove(&["script", "style"]));
    assert_eq!(out, "<template><div>hi</div></template>\n\n");
  }

  #[test]
  fn test_remove_is_case_insensitive_and_multiline() {
    let html = "a<SCRIPT type=\"x\">\nlet a = 1;\n</Script>b";
    let out = strip_tags(html, &TagFilter::remove(&["script"]));
    assert_eq!(out, "ab");
  }

  #[test]
  fn test_remove_unpaired_tag() {
    let out = strip_tags("<style>.a{}", &TagFilter::remove(&["style"]));
    assert_eq!(out, ".a{}");
  }

  #[test]
  fn test_remove_does_not_touch_prefixed_names() {
    let html = "<scripts>x</scripts>";
    let out = strip_tags(html, &TagFilter::remove(&["script"]));
    assert_eq!(out, html);
  }

  #[test]
  fn test_keep_listed_tags_verbatim() {
    let html = r#"<p class="a">one <b>two</b> <a href="/x">three</a></p>"#;
    let out = strip_tags(html, &TagFilter::keep(&["a"]));
    assert_eq!(out, r#"one two <a href="/x">three</a>"#);
  }

  #[test]
  fn test_keep_no_rebalancing() {
    let out = strip_tags("<b>open <i>never closed", &TagFilter::keep(&["b"]));
    assert_eq!(out, "<b>open never closed");
  }
}
