//! Backend trait and the alias-resolving front end.
use std::collections::BTreeMap;

use super::error::{SyntaxError, SyntaxResult};

/// Fence languages rewritten before they reach a backend.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
  ("js", "javascript"),
  ("ts", "typescript"),
  ("py", "python"),
  ("sh", "bash"),
  ("shell", "bash"),
  ("yml", "yaml"),
  ("md", "markdown"),
  // Single-file components have no grammar of their own.
  ("vue", "html"),
];

/// A syntax highlighting backend.
pub trait SyntaxHighlighter: Send + Sync {
  fn name(&self) -> &'static str;

  /// Whether `language` (a name or file extension) has a grammar.
  fn supports_language(&self, language: &str) -> bool;

  /// Highlight `code` as complete `<pre>` markup.
  ///
  /// # Errors
  ///
  /// Returns an error if the language is unknown or the backend fails.
  fn highlight(
    &self,
    code: &str,
    language: &str,
    theme: Option<&str>,
  ) -> SyntaxResult<String>;
}

#[derive(Debug, Clone)]
pub struct SyntaxConfig {
  /// Theme passed to the backend; `None` lets the backend choose.
  pub default_theme:    Option<String>,
  /// Lowercase fence language to backend language.
  pub language_aliases: BTreeMap<String, String>,
}

impl Default for SyntaxConfig {
  fn default() -> Self {
    Self {
      default_theme:    None,
      language_aliases: LANGUAGE_ALIASES
        .iter()
        .map(|(alias, language)| {
          ((*alias).to_string(), (*language).to_string())
        })
        .collect(),
    }
  }
}

/// A backend plus the aliases applied before it is asked anything.
pub struct SyntaxManager {
  backend: Box<dyn SyntaxHighlighter>,
  config:  SyntaxConfig,
}

impl SyntaxManager {
  #[must_use]
  pub fn new(
    backend: Box<dyn SyntaxHighlighter>,
    config: SyntaxConfig,
  ) -> Self {
    Self { backend, config }
  }

  #[must_use]
  pub fn backend(&self) -> &dyn SyntaxHighlighter {
    self.backend.as_ref()
  }

  #[must_use]
  pub const fn config(&self) -> &SyntaxConfig {
    &self.config
  }

  /// Backend language for a fence language, lowercased with aliases applied.
  ///
  /// `None` for an empty language or one the backend has no grammar for.
  #[must_use]
  pub fn resolve(&self, language: &str) -> Option<String> {
    if language.is_empty() {
      return None;
    }
    let lowered = language.to_ascii_lowercase();
    let resolved = self
      .config
      .language_aliases
      .get(&lowered)
      .cloned()
      .unwrap_or(lowered);
    self.backend.supports_language(&resolved).then_some(resolved)
  }

  /// Highlight `code` in the configured theme.
  ///
  /// # Errors
  ///
  /// Returns [`SyntaxError::UnsupportedLanguage`] when [`Self::resolve`]
  /// yields nothing, and propagates backend failures.
  pub fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String> {
    let resolved = self
      .resolve(language)
      .ok_or_else(|| SyntaxError::UnsupportedLanguage(language.to_string()))?;
    self
      .backend
      .highlight(code, &resolved, self.config.default_theme.as_deref())
  }
}

impl std::fmt::Debug for SyntaxManager {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SyntaxManager")
      .field("backend", &self.backend.name())
      .field("config", &self.config)
      .finish()
  }
}
