//! Rendering rules applied to the comrak AST.
//!
//! The rule table is an ordered list fixed when the renderer is built. Each
//! rule rewrites nodes in place, typically into `HtmlInline` nodes carrying
//! final markup, before the tree is formatted.
use comrak::nodes::{AstNode, NodeValue};
use html_escape::{encode_double_quoted_attribute, encode_text};

use super::types::HighlightFn;
use crate::{
  container::is_placeholder,
  syntax::{SyntaxError, create_default_manager},
  utils::escape_delimiters,
};

/// Trait for AST transformations.
pub trait AstTransformer: Send + Sync {
  fn transform<'a>(&self, node: &'a AstNode<'a>);
}

/// A named entry of the rule table.
pub struct Rule {
  name:        String,
  transformer: Box<dyn AstTransformer>,
}

impl Rule {
  #[must_use]
  pub fn new(
    name: impl Into<String>,
    transformer: impl AstTransformer + 'static,
  ) -> Self {
    Self {
      name:        name.into(),
      transformer: Box::new(transformer),
    }
  }

  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn apply<'a>(&self, root: &'a AstNode<'a>) {
    self.transformer.transform(root);
  }
}

impl std::fmt::Debug for Rule {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Rule").field("name", &self.name).finish()
  }
}

/// Visit every descendant of `node`, handing its value to `f`.
pub fn walk_values<'a, F>(node: &'a AstNode<'a>, f: &mut F)
where
  F: FnMut(&mut NodeValue),
{
  for child in node.children() {
    {
      let mut data = child.data.borrow_mut();
      f(&mut data.value);
    }
    walk_values(child, f);
  }
}

/// Escapes raw HTML blocks and inline HTML so they render as text.
///
/// Container placeholders are left for the splicing pass.
pub struct HtmlEscapeRule;

impl AstTransformer for HtmlEscapeRule {
  fn transform<'a>(&self, node: &'a AstNode<'a>) {
    walk_values(node, &mut |value| {
      let escaped = match value {
        NodeValue::HtmlBlock(block) if is_placeholder(&block.literal) => {
          return;
        },
        NodeValue::HtmlBlock(block) => {
          format!("<p>{}</p>\n", encode_text(block.literal.trim_end()))
        },
        NodeValue::HtmlInline(html) => encode_text(html.as_str()).into_owned(),
        _ => return,
      };
      *value = NodeValue::HtmlInline(escaped);
    });
  }
}

/// Runs fenced and indented code through the highlight hook.
pub struct FenceRule {
  highlight: HighlightFn,
}

impl FenceRule {
  #[must_use]
  pub fn new(highlight: HighlightFn) -> Self {
    Self { highlight }
  }
}

impl AstTransformer for FenceRule {
  fn transform<'a>(&self, node: &'a AstNode<'a>) {
    walk_values(node, &mut |value| {
      let NodeValue::CodeBlock(block) = value else {
        return;
      };
      let language = block.info.split_whitespace().next().unwrap_or_default();
      let Some(highlighted) = (self.highlight)(&block.literal, language)
        .filter(|html| !html.is_empty())
      else {
        return;
      };

      let html = if highlighted.starts_with("<pre") {
        format!("{}\n", highlighted.trim_end())
      } else {
        format!(
          "<pre><code class=\"language-{}\">{highlighted}</code></pre>\n",
          encode_double_quoted_attribute(language)
        )
      };
      *value = NodeValue::HtmlInline(html);
    });
  }
}

/// Renders inline code with template delimiters made inert.
pub struct CodeInlineRule;

impl AstTransformer for CodeInlineRule {
  fn transform<'a>(&self, node: &'a AstNode<'a>) {
    walk_values(node, &mut |value| {
      if let NodeValue::Code(code) = value {
        let html = format!(
          "<code>{}</code>",
          escape_delimiters(&encode_text(&code.literal))
        );
        *value = NodeValue::HtmlInline(html);
      }
    });
  }
}

/// The built-in highlight hook.
///
/// Yields `None` for an empty or unknown language and when highlighting
/// fails. Successful output gets `{{`/`}}` wrapped in inert spans.
#[must_use]
pub fn default_highlighter(theme: Option<String>) -> HighlightFn {
  let manager = match create_default_manager(theme) {
    Ok(manager) => Some(manager),
    Err(e) => {
      log::warn!("Syntax highlighting unavailable: {e}");
      None
    },
  };

  std::sync::Arc::new(move |code: &str, language: &str| {
    match manager.as_ref()?.highlight(code, language) {
      Ok(html) => Some(escape_delimiters(&html)),
      Err(SyntaxError::UnsupportedLanguage(_)) => None,
      Err(e) => {
        log::debug!("Failed to highlight {language} code: {e}");
        None
      },
    }
  })
}
