use std::sync::LazyLock;

use regex::{Captures, Regex};

pub mod codeblock;
pub mod id;
pub mod markup;
pub mod sanitize;

pub use id::generate_id;
pub use sanitize::{TagFilter, strip_tags};

/// Compile a pattern, logging and degrading to [`never_matching_regex`] when
/// it does not compile.
pub(crate) fn compile_or_never(name: &str, pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    log::error!(
      "Failed to compile {name} regex: {e}\n Falling back to never matching \
       regex."
    );
    never_matching_regex()
  })
}

/// Wrap every literal `{{` and `}}` in an inert `<span>` so a template
/// compiler downstream does not read them as interpolations.
#[must_use]
pub fn escape_delimiters(html: &str) -> String {
  static DELIMITER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_or_never("DELIMITER_RE", r"(\{\{|\}\})"));

  DELIMITER_RE
    .replace_all(html, "<span>$1</span>")
    .into_owned()
}

/// Decode `&#xHHHH;` numeric character references with exactly four hex
/// digits back into literal characters.
///
/// Longer or shorter references are left untouched, as are references that
/// do not name a valid scalar value (lone surrogates).
#[must_use]
pub fn decode_hex_entities(text: &str) -> String {
  static HEX_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_or_never("HEX_ENTITY_RE", r"(?i)&#x([0-9a-z_]{4});")
  });

  HEX_ENTITY_RE
    .replace_all(text, |caps: &Captures| {
      u32::from_str_radix(&caps[1], 16)
        .ok()
        .and_then(char::from_u32)
        .map_or_else(|| caps[0].to_string(), String::from)
    })
    .into_owned()
}

/// Remove `=""` left behind on valueless attributes (`<input disabled="">`).
///
/// Only the last such attribute of a tag is rewritten per pass, and only when
/// a `>` follows on the same line.
#[must_use]
pub fn strip_empty_attribute_values(html: &str) -> String {
  static EMPTY_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_or_never("EMPTY_ATTR_RE", r#"(<[^>]*)="""#));

  EMPTY_ATTR_RE
    .replace_all(html, |caps: &Captures| {
      let end = caps.get(0).map_or(html.len(), |m| m.end());
      let rest_of_line = html[end..].split('\n').next().unwrap_or_default();
      if rest_of_line.contains('>') {
        caps[1].to_string()
      } else {
        caps[0].to_string()
      }
    })
    .into_owned()
}

/// Create a regex that never matches anything.
///
/// This is used as a fallback pattern when a regex fails to compile.
///
/// # Panics
///
/// Panics if the fallback regex pattern `r"^\b$"` fails to compile, which
/// should never happen.
#[must_use]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(
      clippy::expect_used,
      reason = "This pattern is guaranteed to be valid"
    )]
    Regex::new(r"^\b$").expect("regex pattern ^\\b$ should always compile")
  })
}
