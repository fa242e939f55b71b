//! Core implementation of the Markdown renderer.
//!
//! [`MarkdownRenderer`] owns the comrak feature switches, the ordered rule
//! table and the registered block containers. All of them are fixed once
//! [`build_renderer`] returns, so a built renderer is read-only and can be
//! shared between threads.
use std::collections::BTreeMap;

use comrak::{Arena, nodes::NodeValue, options::Options, parse_document};
use log::{debug, trace, warn};
use serde_json::Value;

use super::{
  rules::{CodeInlineRule, FenceRule, HtmlEscapeRule, Rule, default_highlighter},
  types::{FullRenderFn, PreprocessFn, Preset, RenderOptions, RendererConfig},
};
use crate::{
  container::{
    Block,
    Container,
    ContainerToken,
    Nesting,
    PLACEHOLDER_RE,
    RenderEnv,
    ReservedChar,
    Segment,
    demo_container,
    placeholder,
    scan,
  },
  error::{TransformError, TransformResult},
  utils::codeblock::FenceTracker,
};

/// Markdown dialect switches handed to comrak.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownFeatures {
  pub table:             bool,
  pub strikethrough:     bool,
  pub tasklist:          bool,
  pub autolink:          bool,
  pub footnotes:         bool,
  pub superscript:       bool,
  pub description_lists: bool,
  pub smart:             bool,
  pub hardbreaks:        bool,
  /// Prefix for generated heading anchors; `None` leaves headings bare.
  pub header_ids:        Option<String>,
}

impl MarkdownFeatures {
  /// Switches a preset starts from.
  #[must_use]
  pub fn for_preset(preset: Preset) -> Self {
    match preset {
      Preset::Default => {
        Self {
          table: true,
          strikethrough: true,
          ..Self::default()
        }
      },
      Preset::CommonMark | Preset::Zero => Self::default(),
    }
  }

  /// Apply options the renderer does not interpret itself.
  ///
  /// Unknown keys and non-boolean values are logged and ignored.
  pub fn apply_passthrough(&mut self, options: &BTreeMap<String, Value>) {
    for (key, value) in options {
      let Some(enabled) = value.as_bool() else {
        warn!("Ignoring option '{key}': expected a boolean, got {value}");
        continue;
      };
      match key.as_str() {
        "linkify" | "autolink" => self.autolink = enabled,
        "typographer" | "smart" => self.smart = enabled,
        "breaks" | "hardbreaks" => self.hardbreaks = enabled,
        "table" => self.table = enabled,
        "strikethrough" => self.strikethrough = enabled,
        "tasklist" => self.tasklist = enabled,
        "footnotes" => self.footnotes = enabled,
        "superscript" => self.superscript = enabled,
        "description_lists" => self.description_lists = enabled,
        _ => warn!("Ignoring unrecognized renderer option '{key}'"),
      }
    }
  }
}

/// Markdown to HTML renderer with a rule table and block containers.
#[derive(Debug)]
pub struct MarkdownRenderer {
  preset:     Preset,
  html:       bool,
  features:   MarkdownFeatures,
  rules:      Vec<Rule>,
  containers: Vec<Container>,
}

impl MarkdownRenderer {
  /// Create a renderer with the built-in rule table and no containers.
  ///
  /// The table is `html_escape` (only when raw HTML is disabled), `fence`,
  /// then `code_inline`. Extensions append after these.
  #[must_use]
  pub fn new(options: &RenderOptions) -> Self {
    let mut features = MarkdownFeatures::for_preset(options.preset);
    features.apply_passthrough(&options.passthrough);
    if options.preset == Preset::Zero {
      features.autolink = false;
    }

    let highlight = options.highlight.clone().unwrap_or_else(|| {
      default_highlighter(options.highlight_theme.clone())
    });

    let mut rules = Vec::new();
    if !options.html {
      rules.push(Rule::new("html_escape", HtmlEscapeRule));
    }
    rules.push(Rule::new("fence", FenceRule::new(highlight)));
    rules.push(Rule::new("code_inline", CodeInlineRule));

    Self {
      preset: options.preset,
      html: options.html,
      features,
      rules,
      containers: Vec::new(),
    }
  }

  #[must_use]
  pub const fn preset(&self) -> Preset {
    self.preset
  }

  /// Whether raw HTML passes through.
  #[must_use]
  pub const fn html(&self) -> bool {
    self.html
  }

  #[must_use]
  pub const fn features(&self) -> &MarkdownFeatures {
    &self.features
  }

  pub const fn features_mut(&mut self) -> &mut MarkdownFeatures {
    &mut self.features
  }

  /// Names of the rule table entries, in order.
  #[must_use]
  pub fn rule_names(&self) -> Vec<&str> {
    self.rules.iter().map(Rule::name).collect()
  }

  /// Append a rule to the table.
  pub fn add_rule(&mut self, rule: Rule) {
    debug!("Registering render rule '{}'", rule.name());
    self.rules.push(rule);
  }

  /// Register a block container. Earlier containers win when several accept
  /// the same info string.
  pub fn add_container(&mut self, container: Container) {
    debug!("Registering container '{}'", container.name());
    self.containers.push(container);
  }

  #[must_use]
  pub fn containers(&self) -> &[Container] {
    &self.containers
  }

  /// Build comrak options from the feature switches.
  fn comrak_options(&self) -> Options<'_> {
    let mut options = Options::default();
    options.extension.table = self.features.table;
    options.extension.strikethrough = self.features.strikethrough;
    options.extension.tasklist = self.features.tasklist;
    options.extension.autolink = self.features.autolink;
    options.extension.footnotes = self.features.footnotes;
    options.extension.superscript = self.features.superscript;
    options.extension.description_lists = self.features.description_lists;
    options.extension.header_ids.clone_from(&self.features.header_ids);
    options.parse.smart = self.features.smart;
    options.render.hardbreaks = self.features.hardbreaks;
    // Rules emit raw HTML nodes; disabled HTML is escaped by a rule instead.
    options.render.r#unsafe = true;
    options
  }

  /// Render Markdown with the rule table, ignoring containers.
  ///
  /// # Errors
  ///
  /// Returns [`TransformError::Render`] if formatting fails.
  pub fn render_blocks(&self, text: &str) -> TransformResult<String> {
    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, text, &options);

    for rule in &self.rules {
      trace!("Applying render rule '{}'", rule.name());
      rule.apply(root);
    }

    let mut html = String::new();
    comrak::format_html(root, &options, &mut html)
      .map_err(|e| TransformError::Render(e.to_string()))?;
    Ok(html)
  }

  /// Literal of a fenced code block that opens `text`, if there is one.
  #[must_use]
  pub fn leading_code_literal(&self, text: &str) -> Option<String> {
    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, text, &options);

    let first = root.first_child()?;
    let data = first.data.borrow();
    match &data.value {
      NodeValue::CodeBlock(block) if block.fenced => {
        Some(block.literal.clone())
      },
      _ => None,
    }
  }

  /// Render a document, containers included.
  ///
  /// # Errors
  ///
  /// Returns an error if formatting or a container renderer fails.
  pub fn render(&self, text: &str) -> TransformResult<String> {
    let mut env = RenderEnv::new(self);
    let html = self.render_with(text, &mut env)?;
    if !env.frames.is_empty() {
      warn!("{} demo block(s) were opened but never closed", env.frames.len());
    }
    Ok(html)
  }

  /// Render `text` sharing `env` with the caller.
  ///
  /// The document is parsed once: every container is replaced by placeholder
  /// HTML blocks around its body, so link reference definitions and footnotes
  /// resolve across container boundaries. The container markup is spliced in
  /// after formatting.
  ///
  /// # Errors
  ///
  /// Returns an error if formatting or a container renderer fails.
  pub fn render_with(
    &self,
    text: &str,
    env: &mut RenderEnv<'_>,
  ) -> TransformResult<String> {
    let mut document = String::with_capacity(text.len());
    let mut outputs = Vec::new();
    self.flatten(text, env, &mut document, &mut outputs)?;

    let html = self.render_blocks(&document)?;
    Ok(splice_containers(&html, &outputs))
  }

  fn flatten(
    &self,
    text: &str,
    env: &mut RenderEnv<'_>,
    document: &mut String,
    outputs: &mut Vec<ContainerOutput>,
  ) -> TransformResult<()> {
    for segment in scan(text, &self.containers) {
      match segment {
        Segment::Markdown(markdown) => document.push_str(markdown),
        Segment::Block(block) => {
          self.flatten_container(&block, env, document, outputs)?;
        },
      }
    }
    Ok(())
  }

  fn flatten_container(
    &self,
    block: &Block<'_>,
    env: &mut RenderEnv<'_>,
    document: &mut String,
    outputs: &mut Vec<ContainerOutput>,
  ) -> TransformResult<()> {
    let Some(container) = self.containers.get(block.container) else {
      return Err(TransformError::Render(format!(
        "no container at index {}",
        block.container
      )));
    };

    let mut token = ContainerToken {
      nesting: Nesting::Open,
      name:    container.name(),
      info:    block.info,
      content: block.body,
    };

    let id = outputs.len();
    outputs.push(ContainerOutput {
      open:     container.renderer().render(&token, env)?,
      close:    String::new(),
      reserved: container.reserved(),
    });
    push_placeholder(document, Nesting::Open, id);

    let body = match container.reserved() {
      Some(reserved) => reserved.escape(block.body),
      None => block.body.to_string(),
    };
    self.flatten(&body, env, document, outputs)?;

    // A code fence left open by the body would swallow the close placeholder.
    let fence = body
      .lines()
      .fold(FenceTracker::new(), |fence, line| fence.process_line(line));
    if let Some(closing) = fence.closing_fence() {
      ensure_newline(document);
      document.push_str(&closing);
      document.push('\n');
    }

    token.nesting = Nesting::Close;
    if let Some(output) = outputs.get_mut(id) {
      output.close = container.renderer().render(&token, env)?;
    }
    push_placeholder(document, Nesting::Close, id);
    Ok(())
  }
}

/// Markup rendered for one container occurrence.
#[derive(Debug)]
struct ContainerOutput {
  open:     String,
  close:    String,
  reserved: Option<ReservedChar>,
}

fn ensure_newline(document: &mut String) {
  if !document.is_empty() && !document.ends_with('\n') {
    document.push('\n');
  }
}

/// Append a placeholder as its own HTML block.
fn push_placeholder(document: &mut String, nesting: Nesting, id: usize) {
  ensure_newline(document);
  document.push('\n');
  document.push_str(&placeholder(nesting, id));
  document.push('\n');
}

/// Replace placeholders with container markup, restoring reserved characters
/// in the HTML between a container's placeholders.
fn splice_containers(html: &str, outputs: &[ContainerOutput]) -> String {
  let mut spliced = String::with_capacity(html.len());
  let mut active: Vec<Option<ReservedChar>> = Vec::new();
  let mut last = 0;

  let restore = |chunk: &str, active: &[Option<ReservedChar>]| {
    active
      .iter()
      .flatten()
      .fold(chunk.to_string(), |chunk, reserved| reserved.restore(&chunk))
  };

  for caps in PLACEHOLDER_RE.captures_iter(html) {
    let Some(whole) = caps.get(0) else {
      continue;
    };
    let Some(output) =
      caps[2].parse::<usize>().ok().and_then(|id| outputs.get(id))
    else {
      continue;
    };

    spliced.push_str(&restore(&html[last..whole.start()], &active));
    last = whole.end();

    if &caps[1] == "open" {
      spliced.push_str(&output.open);
      active.push(output.reserved);
    } else {
      active.pop();
      spliced.push_str(&output.close);
    }
  }
  spliced.push_str(&restore(&html[last..], &active));

  spliced
}

/// A built rendering pipeline.
pub enum Renderer {
  /// A caller-supplied function that is the whole pipeline.
  Custom(FullRenderFn),
  Markdown {
    markdown:   MarkdownRenderer,
    preprocess: Option<PreprocessFn>,
  },
}

impl Renderer {
  /// Render a document.
  ///
  /// # Errors
  ///
  /// Returns an error if the Markdown pipeline fails. A custom pipeline never
  /// fails.
  pub fn render(&self, text: &str) -> TransformResult<String> {
    match self {
      Self::Custom(render) => Ok(render(text)),
      Self::Markdown {
        markdown,
        preprocess,
      } => {
        match preprocess {
          Some(preprocess) => markdown.render(&preprocess(markdown, text)),
          None => markdown.render(text),
        }
      },
    }
  }

  /// The Markdown renderer, unless the pipeline is a custom function.
  #[must_use]
  pub const fn markdown(&self) -> Option<&MarkdownRenderer> {
    match self {
      Self::Custom(_) => None,
      Self::Markdown { markdown, .. } => Some(markdown),
    }
  }
}

impl std::fmt::Debug for Renderer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Custom(_) => f.write_str("Renderer::Custom(<fn>)"),
      Self::Markdown { markdown, .. } => {
        f.debug_tuple("Renderer::Markdown").field(markdown).finish()
      },
    }
  }
}

/// Build a renderer from its configuration.
///
/// For [`RendererConfig::Options`] the renderer is constructed, every
/// extension in `plugins` is activated in order, and the demo container is
/// registered last.
///
/// # Errors
///
/// Returns an error if an extension rejects its arguments.
pub fn build_renderer(config: RendererConfig) -> TransformResult<Renderer> {
  let options = match config {
    RendererConfig::FullOverride(render) => {
      debug!("Using a custom render function for the whole pipeline");
      return Ok(Renderer::Custom(render));
    },
    RendererConfig::Options(options) => options,
  };

  let mut markdown = MarkdownRenderer::new(&options);
  for plugin in &options.plugins {
    let extension = plugin.extension();
    debug!("Activating extension '{}'", extension.name());
    extension.register(&mut markdown, plugin.args())?;
  }
  markdown.add_container(demo_container(options.vue_render.clone()));

  Ok(Renderer::Markdown {
    markdown,
    preprocess: options.preprocess,
  })
}
