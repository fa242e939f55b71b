//! Syntect backend with the extra grammars and themes from two-face.
use std::sync::OnceLock;

use syntect::{
  highlighting::Theme,
  html::highlighted_html_for_string,
  parsing::SyntaxSet,
};
use two_face::{
  re_exports::syntect::highlighting::ThemeSet,
  theme::{EmbeddedLazyThemeSet, EmbeddedThemeName},
};

use super::{
  error::{SyntaxError, SyntaxResult},
  types::{SyntaxConfig, SyntaxHighlighter, SyntaxManager},
};

/// Theme used when none is configured or the configured one is unknown.
pub const FALLBACK_THEME: &str = "InspiredGitHub";

fn syntax_set() -> &'static SyntaxSet {
  static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
  SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
}

fn syntect_themes() -> &'static ThemeSet {
  static THEMES: OnceLock<ThemeSet> = OnceLock::new();
  THEMES.get_or_init(ThemeSet::load_defaults)
}

fn embedded_themes() -> &'static EmbeddedLazyThemeSet {
  static THEMES: OnceLock<EmbeddedLazyThemeSet> = OnceLock::new();
  THEMES.get_or_init(two_face::theme::extra)
}

/// two-face theme for a case-insensitive, dash-separated name.
fn embedded_theme_name(name: &str) -> Option<EmbeddedThemeName> {
  let normalized = name.to_ascii_lowercase().replace(['_', ' '], "-");
  Some(match normalized.as_str() {
    "dracula" => EmbeddedThemeName::Dracula,
    "github" => EmbeddedThemeName::Github,
    "gruvbox-dark" | "gruvboxdark" => EmbeddedThemeName::GruvboxDark,
    "gruvbox-light" | "gruvboxlight" => EmbeddedThemeName::GruvboxLight,
    "monokai" | "monokai-extended" => EmbeddedThemeName::MonokaiExtended,
    "nord" => EmbeddedThemeName::Nord,
    "one-half-dark" | "onehalfdark" => EmbeddedThemeName::OneHalfDark,
    "one-half-light" | "onehalflight" => EmbeddedThemeName::OneHalfLight,
    "solarized-dark" | "solarizeddark" => EmbeddedThemeName::SolarizedDark,
    "solarized-light" | "solarizedlight" => EmbeddedThemeName::SolarizedLight,
    "two-dark" | "twodark" => EmbeddedThemeName::TwoDark,
    "vs-dark" | "visualstudiodarkplus" => {
      EmbeddedThemeName::VisualStudioDarkPlus
    },
    "zenburn" => EmbeddedThemeName::Zenburn,
    _ => return None,
  })
}

/// Look a theme up among syntect's defaults (exact name) and then two-face's
/// extras.
#[must_use]
pub fn find_theme(name: &str) -> Option<&'static Theme> {
  syntect_themes()
    .themes
    .get(name)
    .or_else(|| embedded_theme_name(name).map(|n| embedded_themes().get(n)))
}

fn fallback_theme() -> &'static Theme {
  syntect_themes()
    .themes
    .get(FALLBACK_THEME)
    .unwrap_or_else(|| embedded_themes().get(EmbeddedThemeName::InspiredGithub))
}

/// Highlights with syntect into inline-styled `<pre>` blocks.
pub struct SyntectBackend {
  theme: &'static Theme,
}

impl SyntectBackend {
  /// Backend using `theme`, or [`FALLBACK_THEME`] when it is unset or
  /// unknown.
  #[must_use]
  pub fn new(theme: Option<&str>) -> Self {
    Self {
      theme: theme.map_or_else(fallback_theme, Self::theme_or_fallback),
    }
  }

  fn theme_or_fallback(name: &str) -> &'static Theme {
    find_theme(name).unwrap_or_else(|| {
      log::warn!("Unknown highlight theme '{name}', using {FALLBACK_THEME}");
      fallback_theme()
    })
  }
}

impl Default for SyntectBackend {
  fn default() -> Self {
    Self::new(None)
  }
}

impl SyntaxHighlighter for SyntectBackend {
  fn name(&self) -> &'static str {
    "syntect"
  }

  fn supports_language(&self, language: &str) -> bool {
    syntax_set().find_syntax_by_token(language).is_some()
  }

  fn highlight(
    &self,
    code: &str,
    language: &str,
    theme: Option<&str>,
  ) -> SyntaxResult<String> {
    let syntaxes = syntax_set();
    let syntax = syntaxes
      .find_syntax_by_token(language)
      .ok_or_else(|| SyntaxError::UnsupportedLanguage(language.to_string()))?;
    let theme = theme.map_or(self.theme, Self::theme_or_fallback);

    highlighted_html_for_string(code, syntaxes, syntax, theme)
      .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))
  }
}

/// Syntect-backed [`SyntaxManager`] with the default aliases.
///
/// # Errors
///
/// Never fails; the signature matches [`super::create_default_manager`].
pub fn create_syntect_manager(
  theme: Option<String>,
) -> SyntaxResult<SyntaxManager> {
  let backend = SyntectBackend::new(theme.as_deref());
  Ok(SyntaxManager::new(Box::new(backend), SyntaxConfig::default()))
}
