//! End-to-end tests for the document transform.
#![allow(clippy::unwrap_used, reason = "Tests can unwrap")]

use std::sync::Arc;

use tendril::TendrilSink;
use vuedown_commonmark::{
  CacheError,
  ContentCache,
  FileCache,
  MemoryCache,
  RenderOptions,
  RendererConfig,
  SourceDocument,
  TransformError,
  TransformOutput,
  Transformer,
  container::{ContainerRender, ContainerToken, Nesting, RenderEnv},
  error::TransformResult,
  renderer::{ExtensionUse, HighlightFn, Preset, builtin_extension},
};

const SCENARIO: &str = "# Title

::: demo basic usage
<template><div>hi</div></template>
<script>export default {}</script>
<style>.a{color:red}</style>
:::
";

fn memory_transformer(
  options: impl Into<RendererConfig>,
) -> (Transformer, Arc<MemoryCache>) {
  let cache = Arc::new(MemoryCache::new());
  let transformer =
    Transformer::new(options, Arc::<MemoryCache>::clone(&cache)).unwrap();
  (transformer, cache)
}

fn transform(text: &str) -> (TransformOutput, Arc<MemoryCache>) {
  let (transformer, cache) = memory_transformer(RenderOptions::default());
  let output = transformer
    .transform(&SourceDocument::new("docs/page.md", text))
    .unwrap();
  (output, cache)
}

fn no_highlight() -> HighlightFn {
  Arc::new(|_: &str, _: &str| None)
}

/// Names of the `component<i>` placeholders in `template`, in order.
fn placeholders(template: &str) -> Vec<String> {
  let document = kuchikikiki::parse_html().one(template);
  document
    .descendants()
    .filter_map(|node| {
      node
        .as_element()
        .map(|element| element.name.local.to_string())
    })
    .filter(|name| {
      name
        .strip_prefix("component")
        .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()) && !n.is_empty())
    })
    .collect()
}

#[test]
fn test_basic_usage_scenario() {
  let (output, cache) = transform(SCENARIO);

  let template = &output.artifact.template;
  let title = template.find("<h1>Title</h1>").unwrap();
  let placeholder = template.find("<component0></component0>").unwrap();
  assert!(title < placeholder, "{template}");
  assert_eq!(placeholders(template), ["component0"]);

  assert_eq!(output.components.len(), 1);
  let record = &output.components[0];
  assert_eq!(record.name, "page-component-0");
  assert!(
    record
      .content
      .contains("<div class=\"source\" slot=\"source\"><template><div>hi</div>"),
    "{}",
    record.content
  );
  assert!(record.content.contains("<p>basic usage</p>"));

  let close = record.content.find("</demo-block></template>").unwrap();
  let script = record
    .content
    .rfind("<script>export default {}</script>")
    .unwrap();
  let style = record.content.rfind("<style>.a{color:red}</style>").unwrap();
  assert!(close < script && script < style, "{}", record.content);

  assert_eq!(
    cache.load("page-component-0").unwrap().as_deref(),
    Some(record.content.as_str())
  );

  assert_eq!(
    output.artifact.script,
    "export default {\n  components: {\n    component0: \
     require('./page-component-0.vue')\n  }\n}"
  );
  assert!(output.artifact.style.is_empty());
}

#[test]
fn test_zero_demos() {
  let (output, cache) = transform("# Plain\n\nJust *text*.\n");

  assert!(output.components.is_empty());
  assert!(placeholders(&output.artifact.template).is_empty());
  assert_eq!(
    output.artifact.script,
    "export default {\n  components: {}\n}"
  );
  assert_eq!(cache.names(), [output.reference.name.clone()]);
}

#[test]
fn test_many_demos_in_order() {
  let text = (0..4)
    .map(|i| format!("Intro {i}\n\n::: demo case {i}\n<b>{i}</b>\n:::\n"))
    .collect::<Vec<_>>()
    .join("\n");
  let (output, cache) = transform(&text);

  assert_eq!(output.components.len(), 4);
  let expected = (0..4).map(|i| format!("component{i}")).collect::<Vec<_>>();
  assert_eq!(placeholders(&output.artifact.template), expected);

  let mut last = 0;
  for (i, record) in output.components.iter().enumerate() {
    assert_eq!(record.ordinal, i);
    assert_eq!(record.name, format!("page-component-{i}"));
    assert!(record.content.contains(&format!("<p>case {i}</p>")));
    assert!(cache.load(&record.name).unwrap().is_some());

    let entry = format!("component{i}: require('./page-component-{i}.vue')");
    let at = output.artifact.script.find(&entry).unwrap();
    assert!(at >= last);
    last = at;
  }
  assert_eq!(output.artifact.script.matches("require(").count(), 4);
}

#[test]
fn test_template_reparses_to_single_root() {
  let (output, _) = transform(SCENARIO);

  let document =
    kuchikikiki::parse_html().one(output.artifact.template.as_str());
  let body = document.select_first("body").unwrap();
  let children = body.as_node().children().collect::<Vec<_>>();
  assert_eq!(children.len(), 1);
  assert!(
    children[0]
      .as_element()
      .is_some_and(|element| &*element.name.local == "div")
  );
  assert!(document.select_first("vuecomponent").is_err());
}

#[test]
fn test_idempotent() {
  let (transformer, cache) = memory_transformer(RenderOptions::default());
  let document = SourceDocument::new("docs/page.md", SCENARIO);

  let first = transformer.transform(&document).unwrap();
  let second = transformer.transform(&document).unwrap();

  assert_eq!(first.artifact, second.artifact);
  assert_eq!(first.reference, second.reference);
  assert_eq!(cache.len(), 2);
}

#[test]
fn test_idempotent_on_disk() {
  let dir = tempfile::tempdir().unwrap();
  let cache = Arc::new(FileCache::new(dir.path().join("cache")));
  let transformer =
    Transformer::new(RenderOptions::default(), Arc::<FileCache>::clone(&cache))
      .unwrap();
  let document = SourceDocument::new("docs/page.md", SCENARIO);

  let first = transformer.transform(&document).unwrap();
  let second = transformer.transform(&document).unwrap();

  assert_eq!(first.artifact, second.artifact);
  assert_eq!(first.reference, second.reference);
  assert_eq!(
    std::fs::read_to_string(&first.reference.path).unwrap(),
    first.artifact.to_sfc()
  );
  assert!(first.components[0].reference.path.is_file());
}

#[test]
fn test_hex_entity_in_source() {
  let (output, _) = transform("::: demo\n<p>&#x0041;</p>\n:::\n");
  let record = &output.components[0].content;
  assert!(
    record.contains("<div class=\"source\" slot=\"source\"><p>A</p>"),
    "{record}"
  );
}

#[test]
fn test_empty_description() {
  let (output, _) = transform("::: demo\n<b>x</b>\n:::\n");
  let record = &output.components[0].content;
  assert!(
    record.contains("</div>\n<div class=\"highlight\" slot=\"highlight\">"),
    "{record}"
  );
}

#[test]
fn test_fenced_source_is_verbatim() {
  let (transformer, _) = memory_transformer(RenderOptions {
    highlight: Some(no_highlight()),
    ..RenderOptions::default()
  });
  let output = transformer
    .transform(&SourceDocument::new(
      "button.md",
      "::: demo\n```html\n<button>Go</button>\n```\n:::\n",
    ))
    .unwrap();

  let record = &output.components[0].content;
  assert!(
    record.contains("slot=\"source\"><button>Go</button>"),
    "{record}"
  );
  assert!(
    record.contains(
      "<pre><code class=\"language-html\">&lt;button&gt;Go&lt;/button&gt;"
    ),
    "{record}"
  );
}

#[test]
fn test_full_override_ignores_options() {
  let config = RendererConfig::FullOverride(Arc::new(|text: &str| {
    format!("<h2>{} bytes</h2>", text.len())
  }));
  let (transformer, cache) = memory_transformer(config);

  let output = transformer
    .transform(&SourceDocument::new("page.md", "::: demo\n<b>x</b>\n:::\n"))
    .unwrap();

  assert!(output.components.is_empty());
  assert_eq!(output.artifact.template, "<div><h2>22 bytes</h2></div>");
  assert_eq!(cache.len(), 1);
}

#[test]
fn test_options_with_extensions() {
  let (transformer, _) = memory_transformer(RenderOptions {
    preset: Preset::CommonMark,
    plugins: vec![ExtensionUse::WithArgs(
      builtin_extension("container").unwrap(),
      vec![serde_json::json!("tip")],
    )],
    ..RenderOptions::default()
  });

  let output = transformer
    .transform(&SourceDocument::new(
      "page.md",
      "::: tip\nRead this.\n:::\n\n::: demo\n<b>x</b>\n:::\n",
    ))
    .unwrap();

  assert!(output.artifact.template.contains("<div class=\"tip\">"));
  assert_eq!(placeholders(&output.artifact.template), ["component0"]);
}

struct Framed;

impl ContainerRender for Framed {
  fn render(
    &self,
    token: &ContainerToken<'_>,
    _env: &mut RenderEnv<'_>,
  ) -> TransformResult<String> {
    Ok(match token.nesting {
      Nesting::Open => "<my-demo>".to_string(),
      Nesting::Close => "</my-demo>".to_string(),
    })
  }
}

#[test]
fn test_custom_demo_render_is_still_wrapped() {
  let (transformer, _) = memory_transformer(RenderOptions {
    vue_render: Some(Arc::new(Framed)),
    ..RenderOptions::default()
  });

  let output = transformer
    .transform(&SourceDocument::new("page.md", "::: demo\n<b>x</b>\n:::\n"))
    .unwrap();

  assert_eq!(output.components.len(), 1);
  let record = &output.components[0].content;
  assert!(record.contains("<my-demo>"), "{record}");
  assert!(record.contains("</my-demo>"), "{record}");
  assert!(!record.contains("demo-block"), "{record}");
  assert_eq!(placeholders(&output.artifact.template), ["component0"]);
}

#[test]
fn test_top_level_style_collected() {
  let (output, _) = transform(
    "<style>\n.page { margin: 0 }\n</style>\n\n::: demo\n<b>x</b>\n:::\n",
  );
  assert!(output.artifact.style.contains(".page { margin: 0 }"));
  assert!(!output.artifact.template.contains("<style"));
}

#[test]
fn test_cache_failure_propagates() {
  let dir = tempfile::tempdir().unwrap();
  let blocker = dir.path().join("blocked");
  std::fs::write(&blocker, "not a directory").unwrap();

  let transformer = Transformer::new(
    RenderOptions::default(),
    Arc::new(FileCache::new(&blocker)),
  )
  .unwrap();
  let result =
    transformer.transform(&SourceDocument::new("page.md", SCENARIO));

  assert!(matches!(
    result,
    Err(TransformError::Cache(CacheError::Io { .. }))
  ));
}

#[test]
fn test_vue_markup_case_survives() {
  let (output, _) = transform(
    "<MyWidget :initialValue=\"x\"></MyWidget>\n\n::: demo\n<el-date-picker \
     :pickerOptions=\"opts\"></el-date-picker>\n:::\n",
  );

  let template = &output.artifact.template;
  assert!(
    template.contains("<MyWidget :initialValue=\"x\"></MyWidget>"),
    "{template}"
  );

  let record = &output.components[0].content;
  assert!(
    record.contains(
      "slot=\"source\"><el-date-picker :pickerOptions=\"opts\"></el-date-picker>"
    ),
    "{record}"
  );
  assert!(!record.contains("pickeroptions"), "{record}");
}

#[test]
fn test_reference_definition_after_demo() {
  let (output, _) = transform(
    "See [the docs][d].\n\n::: demo\n<b>x</b>\n:::\n\n[d]: https://example.com\n",
  );

  let template = &output.artifact.template;
  assert!(
    template.contains("<a href=\"https://example.com\">the docs</a>"),
    "{template}"
  );
  assert_eq!(placeholders(template), ["component0"]);
}

#[test]
fn test_dotted_document_name() {
  let (transformer, cache) = memory_transformer(RenderOptions::default());
  let output = transformer
    .transform(&SourceDocument::new(
      "docs/v1..2.md",
      "::: demo\n<b>x</b>\n:::\n",
    ))
    .unwrap();

  assert_eq!(output.components[0].name, "v1..2-component-0");
  assert!(cache.load("v1..2-component-0").unwrap().is_some());
}
