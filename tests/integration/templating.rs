//! Parsing, initialization and rendering through the public API.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{Value, json};
use yatplt::templating::{
    Context, EvalError, Evaluator, Fragment, InitOptions, LookupEvaluator, PairKind,
    RenderOptions, Scope, Template, TemplateError, TemplateParser,
};
use yatplt::test_utils::{CountingEvaluator, init_test_logging};

/// Evaluates every expression to its source in upper case; blocks are no-ops.
struct ShoutEvaluator;

#[async_trait]
impl Evaluator for ShoutEvaluator {
    async fn execute(
        &self,
        _source: &str,
        _context: &Context,
        _scope: &mut Scope,
    ) -> Result<(), EvalError> {
        Ok(())
    }

    async fn evaluate(
        &self,
        source: &str,
        _context: &Context,
        _scope: &mut Scope,
    ) -> Result<Option<Value>, EvalError> {
        Ok(Some(Value::String(source.to_uppercase())))
    }
}

async fn render(template: &Template, scope: &mut Scope) -> Result<String, TemplateError> {
    template.render_string(scope, &LookupEvaluator, RenderOptions::default()).await
}

#[tokio::test]
async fn test_round_trip_scenario() {
    init_test_logging(None);
    let template = Template::parse("a{{%'x'+'y'%}}b").unwrap();
    assert!(template.is_initialized());
    assert_eq!(render(&template, &mut Scope::new()).await.unwrap(), "axyb");
}

#[test]
fn test_text_without_directives_is_one_literal() {
    let stripped = TemplateParser::new().parse("  plain text \n").unwrap();
    assert_eq!(stripped, vec![Fragment::literal("plain text")]);

    let verbatim =
        TemplateParser::new().with_strip_literal_text(false).parse("  plain text \n").unwrap();
    assert_eq!(verbatim, vec![Fragment::literal("  plain text \n")]);
}

#[test]
fn test_count_mismatch_names_the_pair() {
    let err = TemplateParser::new().parse("{{! a !}} {{! b").unwrap_err();
    assert!(err.is_tag_mismatch());
    let message = err.to_string();
    assert!(message.contains("{{!"));
    assert!(message.contains("!}}"));
}

#[test]
fn test_interleaved_pairs_fail_and_sequential_pairs_parse() {
    let err = TemplateParser::new().parse("{{! a {{% b !}} c %}}").unwrap_err();
    assert!(err.is_tag_mismatch());

    let fragments = TemplateParser::new().parse("{{! a = 1 !}} {{% a %}}").unwrap();
    let kinds: Vec<_> = fragments
        .iter()
        .filter_map(Fragment::as_directive)
        .map(|d| d.kind())
        .collect();
    assert_eq!(kinds, vec![PairKind::Block, PairKind::Expression]);
}

#[test]
fn test_indentation_scenarios() {
    let parser = TemplateParser::new();
    let fragments = parser.parse("{{!\n    a = 1\n    b = 2\n!}}").unwrap();
    let directive = fragments[0].as_directive().unwrap();
    assert_eq!(directive.source(), "a = 1\nb = 2");

    let err = parser.parse("{{!\n    a = 1\n  b = 2\n    c = 3\n!}}").unwrap_err();
    assert!(matches!(err, TemplateError::Indentation { line: 2, expected: 4, found: 2, .. }));
}

#[test]
fn test_comment_region_removed_before_matching() {
    // Removal happens before splitting, so both sides join into one literal.
    let fragments = TemplateParser::new().parse("keep{{#dropped{{%'x'%}}#}}keep2").unwrap();
    assert_eq!(fragments, vec![Fragment::literal("keepkeep2")]);
}

#[tokio::test]
async fn test_one_time_expression_replaced_in_place() {
    let parser = TemplateParser::new().with_strip_literal_text(false);
    let mut template =
        Template::new("<{1{% 'first' %}1}|{{% 'second' %}}|{1{% 'third' %}1}>", &parser, None)
            .unwrap();

    let err = render(&template, &mut Scope::new()).await.unwrap_err();
    assert!(matches!(err, TemplateError::NotInitialized));

    template
        .initialize(&mut Scope::new(), &LookupEvaluator, InitOptions::default())
        .await
        .unwrap();
    assert!(!template.fragments().iter().any(Fragment::is_one_time));
    assert_eq!(template.fragments()[1], Fragment::literal("first"));
    assert_eq!(render(&template, &mut Scope::new()).await.unwrap(), "<first|second|third>");
}

#[tokio::test]
async fn test_initialize_again_is_noop_when_allowed() {
    let evaluator = CountingEvaluator::new(LookupEvaluator);
    let mut template = Template::parse("{1{! global a = 1 !}1}{{% a %}}").unwrap();
    template.initialize(&mut Scope::new(), &evaluator, InitOptions::default()).await.unwrap();
    let before = template.fragments().to_vec();

    template
        .initialize(
            &mut Scope::new(),
            &evaluator,
            InitOptions::default().allow_already_initialized(true),
        )
        .await
        .unwrap();
    assert_eq!(template.fragments(), before.as_slice());
    assert_eq!(evaluator.executions(), 1);

    let err = template
        .initialize(&mut Scope::new(), &evaluator, InitOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TemplateError::AlreadyInitialized));
}

#[tokio::test]
async fn test_shared_context_and_call_scope() {
    let context = Context::new();
    context.insert("greeting", json!("hello"));
    let template = Template::new(
        "{{! who = name !}}{{% greeting + ' ' + who %}}",
        &TemplateParser::new(),
        Some(context.clone()),
    )
    .unwrap();

    let mut scope = Scope::new();
    scope.insert("name".into(), json!("ada"));
    assert_eq!(render(&template, &mut scope).await.unwrap(), "hello ada");
    // reuse_scope hands the caller's scope to blocks.
    assert_eq!(scope.get("who"), Some(&json!("ada")));

    context.insert("greeting", json!("bye"));
    assert_eq!(render(&template, &mut scope).await.unwrap(), "bye ada");
}

#[tokio::test]
async fn test_null_result_policy() {
    let template = Template::parse("a{{% none %}}b").unwrap();
    let err = render(&template, &mut Scope::new()).await.unwrap_err();
    match err {
        TemplateError::NullResult { fragment } => assert_eq!(fragment, "render-expression#1"),
        other => panic!("unexpected error: {other}"),
    }

    let out = template
        .render_string(&mut Scope::new(), &LookupEvaluator, RenderOptions::default().allow_none(true))
        .await
        .unwrap();
    assert_eq!(out, "ab");
}

#[tokio::test]
async fn test_custom_evaluator_receives_normalized_source() {
    let template = Template::parse("[{{%\n    shout\n%}}]").unwrap();
    let out = template
        .render_string(&mut Scope::new(), &ShoutEvaluator, RenderOptions::default())
        .await
        .unwrap();
    assert_eq!(out, "[SHOUT]");
}

#[tokio::test]
async fn test_stream_yields_chunks_lazily() {
    let evaluator = CountingEvaluator::new(LookupEvaluator);
    let template = Template::parse("a{{% 'b' %}}c{{% 'd' %}}").unwrap();
    let mut scope = Scope::new();
    let stream = template.render_stream(&mut scope, &evaluator, RenderOptions::default()).unwrap();
    let mut stream = std::pin::pin!(stream);

    assert_eq!(stream.next().await.unwrap().unwrap(), "a");
    assert_eq!(evaluator.evaluations(), 0);
    assert_eq!(stream.next().await.unwrap().unwrap(), "b");
    assert_eq!(evaluator.evaluations(), 1);
}

#[tokio::test]
async fn test_custom_delimiters() {
    let parser = TemplateParser::new()
        .with_pair(PairKind::Expression, "<%=", "%>")
        .with_comment("<#", "#>");
    let template = Template::new("<# note #>x<%= 'y' %>z", &parser, None).unwrap();
    assert_eq!(render(&template, &mut Scope::new()).await.unwrap(), "xyz");
}
