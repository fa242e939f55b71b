/// State tracking for code fence detection in markdown.
///
/// Tracks whether a line scanner is inside a fenced code block and remembers
/// the fence character and length so only a matching fence closes it. The
/// container scanner uses it to keep `:::` lines inside code opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceTracker {
  in_code_block:    bool,
  code_fence_char:  Option<char>,
  code_fence_count: usize,
}

impl FenceTracker {
  /// Create a new fence tracker.
  #[must_use]
  pub const fn new() -> Self {
    Self {
      in_code_block:    false,
      code_fence_char:  None,
      code_fence_count: 0,
    }
  }

  /// Check if currently inside a code block.
  #[must_use]
  pub const fn in_code_block(&self) -> bool {
    self.in_code_block
  }

  /// Fence line that would close the open code block, if any.
  #[must_use]
  pub fn closing_fence(&self) -> Option<String> {
    if !self.in_code_block {
      return None;
    }
    self
      .code_fence_char
      .map(|c| c.to_string().repeat(self.code_fence_count))
  }

  /// Process a line and return the fence state after it.
  #[must_use]
  pub fn process_line(&self, line: &str) -> Self {
    let trimmed = line.trim_start();

    if !(trimmed.starts_with("```") || trimmed.starts_with("~~~")) {
      return *self;
    }

    let Some(fence_char) = trimmed.chars().next() else {
      return *self;
    };
    let fence_count = trimmed.chars().take_while(|&c| c == fence_char).count();
    let rest = &trimmed[fence_count * fence_char.len_utf8()..];

    if !self.in_code_block {
      // Backtick fences cannot carry backticks in their info string.
      if fence_char == '`' && rest.contains('`') {
        return *self;
      }
      return Self {
        in_code_block:    true,
        code_fence_char:  Some(fence_char),
        code_fence_count: fence_count,
      };
    }

    if self.code_fence_char == Some(fence_char)
      && fence_count >= self.code_fence_count
      && rest.trim().is_empty()
    {
      return Self::new();
    }

    *self
  }
}
