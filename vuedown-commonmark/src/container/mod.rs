//! Fenced `:::` block containers.
//!
//! A container opens with a line of at least three colons followed by an info
//! string, indented less than four columns, and closes with a colon-only line
//! at least as long as the opener:
//!
//! ```text
//! ::: demo basic usage
//! body, rendered as Markdown
//! :::
//! ```
//!
//! Each registered [`Container`] decides through its validator which info
//! strings activate it. Lines inside fenced code are never treated as
//! container fences, nested containers are matched by depth, and a container
//! without a closing line runs to the end of the text.
//!
//! Rendering is two-phase: the container's [`ContainerRender`] is called once
//! with [`Nesting::Open`] before the body and once with [`Nesting::Close`]
//! after it. State that must survive from one phase to the other lives in the
//! per-render [`RenderEnv`].
use std::{
  fmt,
  sync::{Arc, LazyLock},
};

use regex::Regex;

use crate::{
  error::TransformResult,
  renderer::MarkdownRenderer,
  utils::{codeblock::FenceTracker, compile_or_never},
};

pub mod demo;

pub use demo::{DemoContainer, DemoFrame, DemoRender, demo_container};

/// Minimum number of colons in a container fence.
const MIN_FENCE_LEN: usize = 3;

/// Which phase of a container is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
  Open,
  Close,
}

/// One phase of a container, as seen by its renderer.
#[derive(Debug, Clone, Copy)]
pub struct ContainerToken<'t> {
  pub nesting: Nesting,
  /// Name of the container that matched.
  pub name:    &'t str,
  /// Trimmed info string of the opening fence.
  pub info:    &'t str,
  /// Untouched text between the fences.
  pub content: &'t str,
}

/// Mutable state for a single render call.
pub struct RenderEnv<'r> {
  pub renderer: &'r MarkdownRenderer,
  /// Demo blocks opened but not yet closed, innermost last.
  pub frames:   Vec<DemoFrame>,
}

impl<'r> RenderEnv<'r> {
  #[must_use]
  pub const fn new(renderer: &'r MarkdownRenderer) -> Self {
    Self {
      renderer,
      frames: Vec::new(),
    }
  }
}

/// Produces the markup for both phases of a container.
pub trait ContainerRender: Send + Sync {
  /// Markup for the phase given by `token.nesting`.
  ///
  /// # Errors
  ///
  /// Implementations may fail when nested rendering or HTML parsing fails.
  fn render(
    &self,
    token: &ContainerToken<'_>,
    env: &mut RenderEnv<'_>,
  ) -> TransformResult<String>;
}

/// Decides whether an info string activates a container.
pub type ValidateFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A character that must not reach the Markdown parser inside a container's
/// body. It is replaced by `sentinel` before the body is rendered and put back
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedChar {
  pub ch:       char,
  pub sentinel: &'static str,
}

impl ReservedChar {
  #[must_use]
  pub fn escape(&self, text: &str) -> String {
    text.replace(self.ch, self.sentinel)
  }

  #[must_use]
  pub fn restore(&self, html: &str) -> String {
    html.replace(self.sentinel, self.ch.encode_utf8(&mut [0; 4]))
  }
}

/// A registered block container.
#[derive(Clone)]
pub struct Container {
  name:     String,
  validate: ValidateFn,
  render:   Arc<dyn ContainerRender>,
  reserved: Option<ReservedChar>,
}

impl Container {
  #[must_use]
  pub fn new(
    name: impl Into<String>,
    validate: ValidateFn,
    render: Arc<dyn ContainerRender>,
  ) -> Self {
    Self {
      name: name.into(),
      validate,
      render,
      reserved: None,
    }
  }

  /// Escape `reserved` in this container's body while it renders.
  #[must_use]
  pub const fn with_reserved(mut self, reserved: ReservedChar) -> Self {
    self.reserved = Some(reserved);
    self
  }

  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  #[must_use]
  pub fn validates(&self, info: &str) -> bool {
    (self.validate)(info)
  }

  #[must_use]
  pub fn renderer(&self) -> &dyn ContainerRender {
    self.render.as_ref()
  }

  #[must_use]
  pub const fn reserved(&self) -> Option<ReservedChar> {
    self.reserved
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("name", &self.name)
      .field("reserved", &self.reserved)
      .finish_non_exhaustive()
  }
}

/// A container occurrence found by [`scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'s> {
  /// Index into the container list passed to [`scan`].
  pub container: usize,
  pub info:      &'s str,
  pub body:      &'s str,
  /// False when the text ended before a closing fence.
  pub closed:    bool,
}

/// A run of text split out by [`scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'s> {
  Markdown(&'s str),
  Block(Block<'s>),
}

/// HTML comment standing in for one phase of a container while the whole
/// document goes through comrak as a single tree.
#[must_use]
pub fn placeholder(nesting: Nesting, id: usize) -> String {
  let phase = match nesting {
    Nesting::Open => "open",
    Nesting::Close => "close",
  };
  format!("<!--{PLACEHOLDER_PREFIX}:{phase}:{id}-->")
}

/// Whether an HTML block literal is a [`placeholder`].
#[must_use]
pub fn is_placeholder(literal: &str) -> bool {
  let literal = literal.trim();
  PLACEHOLDER_RE
    .find(literal)
    .is_some_and(|m| m.start() == 0 && m.end() == literal.len())
}

const PLACEHOLDER_PREFIX: &str = "vuedown-container";

pub(crate) static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never(
    "PLACEHOLDER_RE",
    r"<!--vuedown-container:(open|close):(\d+)-->\n?",
  )
});

/// Parse a colon fence, returning its length and trimmed info string.
fn parse_fence(line: &str) -> Option<(usize, &str)> {
  let mut indent = 0;
  for c in line.chars() {
    match c {
      ' ' => indent += 1,
      '\t' => indent += 4,
      _ => break,
    }
  }
  if indent >= 4 {
    return None;
  }

  let trimmed = line.trim_start_matches([' ', '\t']);
  let count = trimmed.chars().take_while(|&c| c == ':').count();
  if count < MIN_FENCE_LEN {
    return None;
  }
  Some((count, trimmed[count..].trim()))
}

/// Index of the first container whose validator accepts `info`.
fn matching_container(containers: &[Container], info: &str) -> Option<usize> {
  if info.is_empty() {
    return None;
  }
  containers.iter().position(|c| c.validates(info))
}

/// Split lines into `(byte offset, line)` pairs, keeping line endings.
fn lines_with_offsets(text: &str) -> Vec<(usize, &str)> {
  let mut offset = 0;
  text
    .split_inclusive('\n')
    .map(|line| {
      let start = offset;
      offset += line.len();
      (start, line)
    })
    .collect()
}

/// Find the line closing a container opened with `fence_len` colons.
fn find_close(
  lines: &[(usize, &str)],
  from: usize,
  fence_len: usize,
  containers: &[Container],
) -> Option<usize> {
  let mut depth = 0usize;
  let mut fence = FenceTracker::new();

  for (index, (_, line)) in lines.iter().enumerate().skip(from) {
    if !fence.in_code_block()
      && let Some((count, info)) = parse_fence(line)
    {
      if info.is_empty() {
        if depth > 0 {
          depth -= 1;
          continue;
        }
        if count >= fence_len {
          return Some(index);
        }
      } else if matching_container(containers, info).is_some() {
        depth += 1;
        continue;
      }
    }
    fence = fence.process_line(line);
  }

  None
}

/// Split `text` into Markdown runs and top-level container blocks.
///
/// Nested containers stay inside their parent's body and are found when the
/// body itself is scanned.
#[must_use]
pub fn scan<'s>(text: &'s str, containers: &[Container]) -> Vec<Segment<'s>> {
  let lines = lines_with_offsets(text);
  let mut segments = Vec::new();
  let mut fence = FenceTracker::new();
  let mut markdown_start = 0;
  let mut index = 0;

  while index < lines.len() {
    let (start, line) = lines[index];

    if !fence.in_code_block()
      && let Some((count, info)) = parse_fence(line)
      && let Some(container) = matching_container(containers, info)
    {
      if markdown_start < start {
        segments.push(Segment::Markdown(&text[markdown_start..start]));
      }

      let body_start = start + line.len();
      let close = find_close(&lines, index + 1, count, containers);
      let (body_end, next) = match close {
        Some(close) => (lines[close].0, close + 1),
        None => (text.len(), lines.len()),
      };
      if close.is_none() {
        log::debug!("Container '{info}' is not closed, running to end of text");
      }

      segments.push(Segment::Block(Block {
        container,
        info,
        body: &text[body_start.min(body_end)..body_end],
        closed: close.is_some(),
      }));

      markdown_start =
        lines.get(next).map_or(text.len(), |(offset, _)| *offset);
      index = next;
      continue;
    }

    fence = fence.process_line(line);
    index += 1;
  }

  if markdown_start < text.len() {
    segments.push(Segment::Markdown(&text[markdown_start..]));
  }

  segments
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Noop;

  impl ContainerRender for Noop {
    fn render(
      &self,
      _token: &ContainerToken<'_>,
      _env: &mut RenderEnv<'_>,
    ) -> TransformResult<String> {
      Ok(String::new())
    }
  }

  fn tip() -> Container {
    Container::new(
      "tip",
      Arc::new(|info: &str| info.starts_with("tip")),
      Arc::new(Noop),
    )
  }

  fn blocks<'s>(segments: &[Segment<'s>]) -> Vec<Block<'s>> {
    segments
      .iter()
      .filter_map(|s| {
        match s {
          Segment::Block(block) => Some(*block),
          Segment::Markdown(_) => None,
        }
      })
      .collect()
  }

  #[test]
  fn test_parse_fence() {
    assert_eq!(parse_fence("::: tip hello\n"), Some((3, "tip hello")));
    assert_eq!(parse_fence("   :::::\n"), Some((5, "")));
    assert_eq!(parse_fence("    ::: tip"), None);
    assert_eq!(parse_fence(":: tip"), None);
  }

  #[test]
  fn test_scan_single_block() {
    let text = "before\n\n::: tip note\ninside\n:::\nafter\n";
    let segments = scan(text, &[tip()]);
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0], Segment::Markdown("before\n\n"));
    assert_eq!(
      segments[1],
      Segment::Block(Block {
        container: 0,
        info:      "tip note",
        body:      "inside\n",
        closed:    true,
      })
    );
    assert_eq!(segments[2], Segment::Markdown("after\n"));
  }

  #[test]
  fn test_scan_rejects_unvalidated_info() {
    let text = "::: warning\nx\n:::\n";
    let segments = scan(text, &[tip()]);
    assert_eq!(segments, vec![Segment::Markdown(text)]);
  }

  #[test]
  fn test_scan_nested_blocks_stay_in_body() {
    let text = "::: tip outer\n::: tip inner\nx\n:::\ny\n:::\n";
    let found = blocks(&scan(text, &[tip()]));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].info, "tip outer");
    assert_eq!(found[0].body, "::: tip inner\nx\n:::\ny\n");
  }

  #[test]
  fn test_scan_fences_inside_code_are_opaque() {
    let text = "::: tip a\n```\n:::\n```\n:::\n";
    let found = blocks(&scan(text, &[tip()]));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].body, "```\n:::\n```\n");

    let text = "```\n::: tip a\n```\n";
    assert!(blocks(&scan(text, &[tip()])).is_empty());
  }

  #[test]
  fn test_scan_close_must_be_long_enough() {
    let text = ":::: tip a\n:::\nstill inside\n::::\n";
    let found = blocks(&scan(text, &[tip()]));
    assert_eq!(found[0].body, ":::\nstill inside\n");
  }

  #[test]
  fn test_scan_unclosed_runs_to_end() {
    let text = "::: tip a\nline one\nline two";
    let found = blocks(&scan(text, &[tip()]));
    assert_eq!(found.len(), 1);
    assert!(!found[0].closed);
    assert_eq!(found[0].body, "line one\nline two");
  }

  #[test]
  fn test_placeholder_detection() {
    let open = placeholder(Nesting::Open, 3);
    assert_eq!(open, "<!--vuedown-container:open:3-->");
    assert!(is_placeholder(&format!("{open}\n")));
    assert!(is_placeholder(&placeholder(Nesting::Close, 0)));
    assert!(!is_placeholder("<!-- a comment -->\n"));
    assert!(!is_placeholder("<div><!--vuedown-container:open:3--></div>"));
  }

  #[test]
  fn test_reserved_char_round_trip() {
    let reserved = ReservedChar {
      ch:       '@',
      sentinel: "vuedown-at-",
    };
    let escaped = reserved.escape("<button @click=\"go\">");
    assert_eq!(escaped, "<button vuedown-at-click=\"go\">");
    assert_eq!(reserved.restore(&escaped), "<button @click=\"go\">");
  }
}
