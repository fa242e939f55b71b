use std::path::PathBuf;

use clap::Parser;
use vuedown_commonmark::Preset;
use vuedown_config::Config;

/// Command line interface for vuedown
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Compile Markdown documents with demo blocks into Vue components"
)]
pub struct Cli {
  /// Markdown files, or directories searched recursively for `*.md` files
  #[arg(required = true)]
  pub inputs: Vec<PathBuf>,

  /// Directory the generated components are written to [default:
  /// .vuedown-cache]
  #[arg(short = 'o', long = "cache-dir")]
  pub cache_dir: Option<PathBuf>,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,

  /// Markdown dialect to start from (default, commonmark or zero)
  #[arg(long)]
  pub preset: Option<Preset>,

  /// Escape raw HTML in documents instead of passing it through
  #[arg(long = "no-html")]
  pub no_html: bool,

  /// Disable syntax highlighting of fenced code
  #[arg(long = "no-highlight")]
  pub no_highlight: bool,

  /// Theme for the built-in syntax highlighter
  #[arg(long)]
  pub theme: Option<String>,

  /// Number of threads to use for parallel processing.
  #[arg(short = 'p', long = "jobs")]
  pub jobs: Option<usize>,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Let flags given on the command line override `config`.
  pub fn apply_to(&self, config: &mut Config) {
    if let Some(preset) = self.preset {
      config.preset = Some(preset);
    }
    if self.no_html {
      config.html = Some(false);
    }
    if self.no_highlight {
      config.highlight = Some(false);
    }
    if let Some(ref theme) = self.theme {
      config.highlight_theme = Some(theme.clone());
    }
    if let Some(ref cache_dir) = self.cache_dir {
      config.cache_dir = Some(cache_dir.clone());
    }
    if let Some(jobs) = self.jobs {
      config.jobs = Some(jobs);
    }
  }
}
