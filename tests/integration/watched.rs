//! File-backed templates and reload behavior.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde_json::json;
use tempfile::TempDir;
use yatplt::templating::{
    Context, InitOptions, LookupEvaluator, RenderOptions, Scope, TemplateError, WatchedTemplate,
};
use yatplt::test_utils::{CountingEvaluator, MemorySource};

/// Rewrite `path` and push its mtime forward so the change is visible even on
/// filesystems with coarse timestamps.
fn rewrite(path: &Path, text: &str, bump: u64) {
    std::fs::write(path, text).unwrap();
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(bump)).unwrap();
}

#[tokio::test]
async fn test_reload_after_file_change() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("page.tpl");
    rewrite(&path, "{1{! global version = 'one' !}1}v={{% version %}}", 1);

    let evaluator = CountingEvaluator::new(LookupEvaluator);
    let template = WatchedTemplate::new(&path);

    let out = template.render_string(&mut Scope::new(), &evaluator, RenderOptions::default()).await;
    assert_eq!(out.unwrap(), "v=one");
    let first = template.loaded_at().await.unwrap();

    // Unchanged file: no re-initialization.
    template.render_string(&mut Scope::new(), &evaluator, RenderOptions::default()).await.unwrap();
    assert_eq!(evaluator.executions(), 1);

    rewrite(&path, "{1{! global version = 'two' !}1}v={{% version %}}", 60);
    assert!(!template.is_up_to_date().await);
    let out = template.render_string(&mut Scope::new(), &evaluator, RenderOptions::default()).await;
    assert_eq!(out.unwrap(), "v=two");
    assert_eq!(evaluator.executions(), 2);
    assert!(template.loaded_at().await.unwrap() > first);
}

#[tokio::test]
async fn test_deleted_file_propagates_io_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("page.tpl");
    rewrite(&path, "text", 1);

    let template = WatchedTemplate::new(&path);
    template.update(&LookupEvaluator).await.unwrap();

    std::fs::remove_file(&path).unwrap();
    let err = template
        .render_string(&mut Scope::new(), &LookupEvaluator, RenderOptions::default())
        .await
        .unwrap_err();
    match err {
        TemplateError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_concurrent_updates_on_changed_file_reload_once() {
    let source = Arc::new(MemorySource::new().with_latency(Duration::from_millis(10)));
    source.write("/site/index.tpl", "{1{! global built = 'yes' !}1}{{% built %}}");
    let evaluator = CountingEvaluator::new(LookupEvaluator);
    let template = WatchedTemplate::new("/site/index.tpl").with_source(source.clone());

    template.update(&evaluator).await.unwrap();
    assert_eq!(evaluator.executions(), 1);

    source.write("/site/index.tpl", "{1{! global built = 'again' !}1}{{% built %}}");
    let (a, b, c) = tokio::join!(
        template.update(&evaluator),
        template.update(&evaluator),
        template.update(&evaluator)
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(evaluator.executions(), 2);
    assert_eq!(source.reads(), 2);
    let out = template
        .render_string(&mut Scope::new(), &evaluator, RenderOptions::default())
        .await
        .unwrap();
    assert_eq!(out, "again");
}

#[tokio::test]
async fn test_shared_context_survives_reload() {
    let source = Arc::new(MemorySource::new());
    source.write("t", "{1{! global loads = 'first' !}1}{{% loads + '/' + extra %}}");
    let context = Context::new();
    context.insert("extra", json!("kept"));
    let template = WatchedTemplate::new("t")
        .with_source(source.clone())
        .with_context(context.clone())
        .with_init_options(InitOptions::default().reuse_scope(false));

    let out = template
        .render_string(&mut Scope::new(), &LookupEvaluator, RenderOptions::default())
        .await;
    assert_eq!(out.unwrap(), "first/kept");

    source.write("t", "{1{! global loads = 'second' !}1}{{% loads + '/' + extra %}}");
    let out = template
        .render_string(&mut Scope::new(), &LookupEvaluator, RenderOptions::default())
        .await;
    assert_eq!(out.unwrap(), "second/kept");
    assert_eq!(context.get("loads"), Some(json!("second")));
}

#[tokio::test]
async fn test_failed_reload_retries_on_next_update() {
    let source = Arc::new(MemorySource::new());
    source.write("t", "ok");
    let template = WatchedTemplate::new("t").with_source(source.clone());
    template.update(&LookupEvaluator).await.unwrap();

    source.write("t", "{{% broken");
    assert!(template.update(&LookupEvaluator).await.unwrap_err().is_parse_error());
    assert!(template.template().await.is_none());

    source.write("t", "fixed");
    let out = template
        .render_string(&mut Scope::new(), &LookupEvaluator, RenderOptions::default())
        .await
        .unwrap();
    assert_eq!(out, "fixed");
}
