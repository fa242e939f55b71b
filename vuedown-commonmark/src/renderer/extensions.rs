//! Built-in extensions that configuration files can activate by name.
use std::sync::Arc;

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::Value;

use super::{core::MarkdownRenderer, types::Extension};
use crate::{
  container::{Container, ContainerRender, ContainerToken, Nesting, RenderEnv},
  error::{TransformError, TransformResult},
};

/// Names accepted by [`builtin_extension`].
pub const BUILTIN_EXTENSIONS: &[&str] = &["container", "header_ids", "gfm"];

/// Look up a built-in extension by name.
#[must_use]
pub fn builtin_extension(name: &str) -> Option<Arc<dyn Extension>> {
  match name {
    "container" => Some(Arc::new(ContainerExtension)),
    "header_ids" => Some(Arc::new(HeaderIdsExtension)),
    "gfm" => Some(Arc::new(GfmExtension)),
    _ => None,
  }
}

fn string_arg<'a>(
  extension: &str,
  args: &'a [Value],
  index: usize,
) -> TransformResult<Option<&'a str>> {
  match args.get(index) {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(s)) => Ok(Some(s.as_str())),
    Some(other) => {
      Err(TransformError::Extension {
        name:   extension.to_string(),
        reason: format!("argument {index} must be a string, got {other}"),
      })
    },
  }
}

/// A generic named container: `::: <name> [title]`.
///
/// Arguments: the container name, then an optional default title used when
/// the fence carries none.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerExtension;

impl Extension for ContainerExtension {
  fn name(&self) -> &str {
    "container"
  }

  fn register(
    &self,
    renderer: &mut MarkdownRenderer,
    args: &[Value],
  ) -> TransformResult<()> {
    let Some(name) = string_arg(self.name(), args, 0)?
      .filter(|name| !name.trim().is_empty())
    else {
      return Err(TransformError::Extension {
        name:   self.name().to_string(),
        reason: "a container name is required".to_string(),
      });
    };
    let default_title = string_arg(self.name(), args, 1)?.map(str::to_string);

    let matcher = name.to_string();
    renderer.add_container(Container::new(
      name,
      Arc::new(move |info: &str| {
        info.split_whitespace().next() == Some(matcher.as_str())
      }),
      Arc::new(NamedContainerRender {
        name: name.to_string(),
        default_title,
      }),
    ));
    Ok(())
  }
}

/// Renders a generic container as a classed `<div>`.
#[derive(Debug, Clone)]
pub struct NamedContainerRender {
  name:          String,
  default_title: Option<String>,
}

impl ContainerRender for NamedContainerRender {
  fn render(
    &self,
    token: &ContainerToken<'_>,
    _env: &mut RenderEnv<'_>,
  ) -> TransformResult<String> {
    if token.nesting == Nesting::Close {
      return Ok("</div>\n".to_string());
    }

    let title = token
      .info
      .strip_prefix(self.name.as_str())
      .map(str::trim)
      .filter(|title| !title.is_empty())
      .or(self.default_title.as_deref());

    let mut html = format!(
      "<div class=\"{}\">\n",
      encode_double_quoted_attribute(&self.name)
    );
    if let Some(title) = title {
      html.push_str(&format!(
        "<p class=\"container-title\">{}</p>\n",
        encode_text(title)
      ));
    }
    Ok(html)
  }
}

/// Heading anchors, with an optional id prefix as the first argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderIdsExtension;

impl Extension for HeaderIdsExtension {
  fn name(&self) -> &str {
    "header_ids"
  }

  fn register(
    &self,
    renderer: &mut MarkdownRenderer,
    args: &[Value],
  ) -> TransformResult<()> {
    let prefix = string_arg(self.name(), args, 0)?.unwrap_or_default();
    renderer.features_mut().header_ids = Some(prefix.to_string());
    Ok(())
  }
}

/// GitHub Flavored Markdown: tables, strikethrough, task lists, autolinks
/// and footnotes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GfmExtension;

impl Extension for GfmExtension {
  fn name(&self) -> &str {
    "gfm"
  }

  fn register(
    &self,
    renderer: &mut MarkdownRenderer,
    _args: &[Value],
  ) -> TransformResult<()> {
    let features = renderer.features_mut();
    features.table = true;
    features.strikethrough = true;
    features.tasklist = true;
    features.autolink = true;
    features.footnotes = true;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
  use serde_json::json;

  use super::*;
  use crate::renderer::{
    ExtensionUse,
    RenderOptions,
    RendererConfig,
    build_renderer,
  };

  fn render(plugins: Vec<ExtensionUse>, text: &str) -> String {
    let renderer = build_renderer(RendererConfig::Options(RenderOptions {
      plugins,
      preset: crate::renderer::Preset::CommonMark,
      ..RenderOptions::default()
    }))
    .unwrap();
    renderer.render(text).unwrap()
  }

  fn ext(name: &str) -> Arc<dyn Extension> {
    builtin_extension(name).unwrap()
  }

  #[test]
  fn test_registry() {
    for name in BUILTIN_EXTENSIONS {
      assert_eq!(ext(name).name(), *name);
    }
    assert!(builtin_extension("nope").is_none());
  }

  #[test]
  fn test_container_extension() {
    let html = render(
      vec![ExtensionUse::WithArgs(ext("container"), vec![json!("tip")])],
      "::: tip Heads up\nSome *text*.\n:::\n",
    );
    assert!(html.contains("<div class=\"tip\">"), "{html}");
    assert!(
      html.contains("<p class=\"container-title\">Heads up</p>"),
      "{html}"
    );
    assert!(html.contains("<em>text</em>"), "{html}");
    assert!(html.trim_end().ends_with("</div>"), "{html}");
  }

  #[test]
  fn test_container_default_title() {
    let html = render(
      vec![ExtensionUse::WithArgs(ext("container"), vec![
        json!("warning"),
        json!("Warning"),
      ])],
      "::: warning\nCareful.\n:::\n",
    );
    assert!(
      html.contains("<p class=\"container-title\">Warning</p>"),
      "{html}"
    );
  }

  #[test]
  fn test_container_requires_name() {
    let result = build_renderer(RendererConfig::Options(RenderOptions {
      plugins: vec![ExtensionUse::Bare(ext("container"))],
      ..RenderOptions::default()
    }));
    assert!(matches!(result, Err(TransformError::Extension { .. })));

    let result = build_renderer(RendererConfig::Options(RenderOptions {
      plugins: vec![ExtensionUse::WithArgs(ext("container"), vec![json!(3)])],
      ..RenderOptions::default()
    }));
    assert!(matches!(result, Err(TransformError::Extension { .. })));
  }

  #[test]
  fn test_demo_inside_named_container() {
    let html = render(
      vec![ExtensionUse::WithArgs(ext("container"), vec![json!("tip")])],
      "::: tip\n::: demo\n```html\n<b>x</b>\n```\n:::\n:::\n",
    );
    assert!(html.contains("<div class=\"tip\">"), "{html}");
    assert!(html.contains("<vuecomponent>"), "{html}");
    assert!(html.contains("</vuecomponent>"), "{html}");
  }

  #[test]
  fn test_header_ids_extension() {
    let html = render(
      vec![ExtensionUse::WithArgs(ext("header_ids"), vec![json!("doc-")])],
      "# Hello World\n",
    );
    assert!(html.contains("doc-hello-world"), "{html}");
  }

  #[test]
  fn test_gfm_extension() {
    let html = render(
      vec![ExtensionUse::Bare(ext("gfm"))],
      "~~gone~~ and https://example.com\n",
    );
    assert!(html.contains("<del>gone</del>"), "{html}");
    assert!(html.contains("<a href=\"https://example.com\">"), "{html}");
  }
}
