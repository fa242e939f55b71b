use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
  sync::Arc,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vuedown_commonmark::renderer::{
  ExtensionUse,
  HighlightFn,
  Preset,
  RenderOptions,
  builtin_extension,
};

use crate::error::ConfigError;

/// Cache directory used when neither a file nor the command line names one.
pub const DEFAULT_CACHE_DIR: &str = ".vuedown-cache";

/// One entry of the `use` list: an extension name, or an array holding the
/// name followed by the extension's arguments.
///
/// ```toml
/// use = ["gfm", ["container", "tip", "Tip"]]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginSpec {
  Name(String),
  WithArgs(Vec<Value>),
}

impl PluginSpec {
  /// Resolve against the built-in extension registry.
  ///
  /// # Errors
  ///
  /// Returns an error if the entry is empty, its first element is not a
  /// string, or no built-in extension has that name.
  pub fn resolve(&self) -> Result<ExtensionUse, ConfigError> {
    let lookup = |name: &str| {
      builtin_extension(name)
        .ok_or_else(|| ConfigError::UnknownExtension(name.to_string()))
    };

    match self {
      Self::Name(name) => Ok(ExtensionUse::Bare(lookup(name)?)),
      Self::WithArgs(entry) => {
        let Some((Value::String(name), args)) = entry.split_first() else {
          return Err(ConfigError::Config(format!(
            "'use' entries must start with an extension name, got {}",
            Value::Array(entry.clone())
          )));
        };
        Ok(ExtensionUse::WithArgs(lookup(name)?, args.to_vec()))
      },
    }
  }
}

/// Configuration for vuedown.
///
/// Fields are loaded from TOML or JSON files, merged in order, and then
/// overridden from the command line. Unset fields keep the renderer's
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Markdown dialect to start from.
  pub preset: Option<Preset>,

  /// Whether raw HTML in documents is passed through.
  pub html: Option<bool>,

  /// Whether fenced code is syntax highlighted.
  pub highlight: Option<bool>,

  /// Theme for the built-in highlighter.
  pub highlight_theme: Option<String>,

  /// Extensions to activate, in order.
  #[serde(rename = "use")]
  pub plugins: Vec<PluginSpec>,

  /// Options handed to the Markdown backend as-is.
  pub options: BTreeMap<String, Value>,

  /// Directory the cache writes components into.
  pub cache_dir: Option<PathBuf>,

  /// Number of documents transformed in parallel.
  pub jobs: Option<usize>,
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {e}",
        path.display()
      ))
    })?;

    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);

    match extension.as_deref() {
      Some("json") => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {e}",
            path.display()
          ))
        })
      },
      Some("toml") => {
        toml::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {e}",
            path.display()
          ))
        })
      },
      Some(_) => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load and merge `config_files` in order, then apply `KEY=VALUE`
  /// overrides.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = Self::default();
    for path in config_files {
      config.merge(Self::from_file(path)?);
    }

    if config_files.len() > 1 {
      log::info!("Loaded and merged {} config files", config_files.len());
    }

    config.apply_overrides(config_overrides)?;
    Ok(config)
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - The `use` list: Other's entries are appended
  /// - `options`: Other's entries are merged in, overriding individual keys
  pub fn merge(&mut self, other: Self) {
    let Self {
      preset,
      html,
      highlight,
      highlight_theme,
      plugins,
      options,
      cache_dir,
      jobs,
    } = other;

    if preset.is_some() {
      self.preset = preset;
    }
    if html.is_some() {
      self.html = html;
    }
    if highlight.is_some() {
      self.highlight = highlight;
    }
    if highlight_theme.is_some() {
      self.highlight_theme = highlight_theme;
    }
    if cache_dir.is_some() {
      self.cache_dir = cache_dir;
    }
    if jobs.is_some() {
      self.jobs = jobs;
    }
    self.plugins.extend(plugins);
    self.options.extend(options);
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// Keys are field names; `options.<name>` sets a backend option and `use`
  /// appends an extension by name. An empty value clears optional fields.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    if let Some(option) = key.strip_prefix("options.") {
      self
        .options
        .insert(option.to_string(), parse_option_value(value));
      return Ok(());
    }

    match key {
      "preset" => {
        self.preset = non_empty(value)
          .map(str::parse::<Preset>)
          .transpose()
          .map_err(ConfigError::Config)?;
      },
      "html" => self.html = Some(parse_bool(key, value)?),
      "highlight" => self.highlight = Some(parse_bool(key, value)?),
      "highlight_theme" => {
        self.highlight_theme = non_empty(value).map(str::to_string);
      },
      "cache_dir" => self.cache_dir = non_empty(value).map(PathBuf::from),
      "jobs" => {
        self.jobs = non_empty(value)
          .map(str::parse::<usize>)
          .transpose()
          .map_err(|e| {
            ConfigError::Config(format!(
              "Invalid value for 'jobs': '{value}' ({e})"
            ))
          })?;
      },
      "use" => self.plugins.push(PluginSpec::Name(value.to_string())),
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'"
        )));
      },
    }

    Ok(())
  }

  /// Cache directory, falling back to [`DEFAULT_CACHE_DIR`].
  #[must_use]
  pub fn cache_dir(&self) -> PathBuf {
    self
      .cache_dir
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR))
  }

  /// Build renderer options from this configuration.
  ///
  /// # Errors
  ///
  /// Returns an error if a `use` entry names an unknown extension or is
  /// malformed.
  pub fn render_options(&self) -> Result<RenderOptions, ConfigError> {
    let defaults = RenderOptions::default();

    let highlight = if self.highlight == Some(false) {
      let disabled: HighlightFn = Arc::new(|_: &str, _: &str| None);
      Some(disabled)
    } else {
      None
    };

    let plugins = self
      .plugins
      .iter()
      .map(PluginSpec::resolve)
      .collect::<Result<Vec<_>, _>>()?;

    for key in self.options.keys() {
      log::debug!("Passing option '{key}' to the Markdown backend");
    }

    Ok(RenderOptions {
      preset: self.preset.unwrap_or(defaults.preset),
      html: self.html.unwrap_or(defaults.html),
      highlight,
      highlight_theme: self.highlight_theme.clone(),
      plugins,
      passthrough: self.options.clone(),
      ..defaults
    })
  }
}

fn non_empty(value: &str) -> Option<&str> {
  (!value.is_empty()).then_some(value)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" | "on" => Ok(true),
    "false" | "no" | "0" | "off" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'"
      )))
    },
  }
}

/// Booleans and numbers are typed, everything else is a string.
fn parse_option_value(value: &str) -> Value {
  match value {
    "true" => Value::Bool(true),
    "false" => Value::Bool(false),
    _ => {
      value
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(value.to_string()))
    },
  }
}
