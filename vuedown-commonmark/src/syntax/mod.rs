//! Syntax highlighting for fenced code.
//!
//! [`SyntaxManager`] resolves fence languages through an alias table and hands
//! the code to a [`SyntaxHighlighter`] backend. With the default `syntect`
//! feature the backend is syntect, extended with the grammars and themes of
//! two-face.

pub mod error;
pub mod types;

pub use error::{SyntaxError, SyntaxResult};
pub use types::{SyntaxConfig, SyntaxHighlighter, SyntaxManager};

#[cfg(feature = "syntect")] mod syntect;
#[cfg(feature = "syntect")] pub use syntect::*;

/// The manager for the compiled-in backend.
///
/// # Errors
///
/// Returns [`SyntaxError::NoBackendAvailable`] when the crate was built
/// without a highlighting backend.
pub fn create_default_manager(
  theme: Option<String>,
) -> SyntaxResult<SyntaxManager> {
  #[cfg(feature = "syntect")]
  {
    create_syntect_manager(theme)
  }

  #[cfg(not(feature = "syntect"))]
  {
    let _ = theme;
    Err(SyntaxError::NoBackendAvailable)
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn test_default_aliases() {
    let config = SyntaxConfig::default();
    assert_eq!(config.language_aliases["js"], "javascript");
    assert_eq!(config.language_aliases["vue"], "html");
    assert!(config.default_theme.is_none());
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_syntect_backend() {
    let backend = SyntectBackend::default();
    assert_eq!(backend.name(), "syntect");
    let html = backend
      .highlight("fn main() {}", "rust", None)
      .expect("rust should highlight");
    assert!(html.starts_with("<pre"));
    assert!(html.contains("main"));
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_theme_lookup() {
    assert!(find_theme(FALLBACK_THEME).is_some());
    assert!(find_theme("Nord").is_some());
    assert!(find_theme("solarized_dark").is_some());
    assert!(find_theme("no-such-theme").is_none());
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_resolve() {
    let manager =
      create_default_manager(None).expect("syntect manager should build");
    assert_eq!(manager.resolve("JS").as_deref(), Some("javascript"));
    assert_eq!(manager.resolve("vue").as_deref(), Some("html"));
    assert_eq!(manager.resolve("rust").as_deref(), Some("rust"));
    assert!(manager.resolve("").is_none());
    assert!(manager.resolve("definitely-not-a-language").is_none());
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_unknown_language_is_an_error() {
    let manager = create_default_manager(Some("bogus".to_string()))
      .expect("unknown themes fall back");
    assert!(matches!(
      manager.highlight("x", "definitely-not-a-language"),
      Err(SyntaxError::UnsupportedLanguage(_))
    ));
    assert!(manager.highlight("x = 1", "py").is_ok());
  }

  #[cfg(not(feature = "syntect"))]
  #[test]
  fn test_no_backend() {
    assert!(matches!(
      create_default_manager(None),
      Err(SyntaxError::NoBackendAvailable)
    ));
  }
}
