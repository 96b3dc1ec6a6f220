//! File-backed templates that reload when their source changes.
//!
//! A [`WatchedTemplate`] caches one parsed and initialized [`Template`]
//! together with the modification time of the file it was loaded from.
//! Every render first calls [`WatchedTemplate::update`], which reloads the
//! template when the file is newer than the cached copy, or has disappeared.
//!
//! Reloads are serialized by an async mutex. A caller that queued behind a
//! reload re-checks freshness after acquiring the lock, so any number of
//! concurrent callers racing on a changed file trigger exactly one reload.

use async_trait::async_trait;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{Mutex, RwLock};

use futures::stream::Stream;
use futures::TryStreamExt;

use super::context::{Context, Scope};
use super::error::TemplateError;
use super::evaluator::Evaluator;
use super::options::{InitOptions, RenderOptions};
use super::parser::TemplateParser;
use super::template::{Template, chunk_stream, write_chunks};

/// Where template text and modification times come from.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn read(&self, path: &Path) -> io::Result<String>;

    /// Last modification time. A missing file is an `io::ErrorKind::NotFound` error.
    async fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

/// [`TemplateSource`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

#[async_trait]
impl TemplateSource for FsSource {
    async fn read(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        tokio::fs::metadata(path).await?.modified()
    }
}

#[derive(Default)]
struct Loaded {
    template: Option<Arc<Template>>,
    timestamp: Option<SystemTime>,
}

/// A template cached from a file and reloaded when the file changes.
///
/// ```rust,no_run
/// use yatplt::templating::{LookupEvaluator, RenderOptions, Scope, WatchedTemplate};
///
/// # async fn example() -> Result<(), yatplt::templating::TemplateError> {
/// let page = WatchedTemplate::new("templates/page.tpl");
/// let html = page
///     .render_string(&mut Scope::new(), &LookupEvaluator, RenderOptions::default())
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct WatchedTemplate {
    path: PathBuf,
    parser: TemplateParser,
    context: Context,
    init_scope: Scope,
    init_options: InitOptions,
    auto_reload: bool,
    source: Arc<dyn TemplateSource>,
    state: RwLock<Loaded>,
    reload_lock: Mutex<()>,
}

impl WatchedTemplate {
    /// Create an unloaded wrapper around `path`. Nothing is read until the
    /// first `update` or render.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            parser: TemplateParser::default(),
            context: Context::new(),
            init_scope: Scope::new(),
            init_options: InitOptions::default(),
            auto_reload: true,
            source: Arc::new(FsSource),
            state: RwLock::new(Loaded::default()),
            reload_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: TemplateParser) -> Self {
        self.parser = parser;
        self
    }

    /// Context shared by every template loaded from the file.
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Scope handed to one-time directives on each reload.
    #[must_use]
    pub fn with_init_scope(mut self, scope: Scope) -> Self {
        self.init_scope = scope;
        self
    }

    /// Options for the `initialize` call made on each reload.
    /// `allow_already_initialized` is always forced on.
    #[must_use]
    pub fn with_init_options(mut self, options: InitOptions) -> Self {
        self.init_options = options;
        self
    }

    /// Whether renders check the file and reload first (default `true`).
    #[must_use]
    pub fn with_auto_reload(mut self, auto_reload: bool) -> Self {
        self.auto_reload = auto_reload;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn TemplateSource>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The cached template, if one is loaded.
    pub async fn template(&self) -> Option<Arc<Template>> {
        self.state.read().await.template.clone()
    }

    /// Modification time of the file when the cached template was loaded.
    pub async fn loaded_at(&self) -> Option<SystemTime> {
        self.state.read().await.timestamp
    }

    /// False if never loaded, if the file is gone, or if it was modified
    /// after the cached copy was loaded.
    pub async fn is_up_to_date(&self) -> bool {
        let Some(timestamp) = self.state.read().await.timestamp else {
            return false;
        };
        match self.source.modified(&self.path).await {
            Ok(modified) => modified <= timestamp,
            Err(e) => {
                tracing::debug!("Cannot stat {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Reload the template if it is not up to date.
    ///
    /// The cached template is dropped before reading, so a failed reload
    /// leaves the wrapper unloaded and the next call retries.
    ///
    /// # Errors
    ///
    /// I/O errors unchanged, parse errors, and errors from initializing the
    /// freshly parsed template.
    pub async fn update<E>(&self, evaluator: &E) -> Result<(), TemplateError>
    where
        E: Evaluator + ?Sized,
    {
        if self.is_up_to_date().await {
            return Ok(());
        }

        let _guard = self.reload_lock.lock().await;
        if self.is_up_to_date().await {
            tracing::debug!("{} was reloaded while waiting", self.path.display());
            return Ok(());
        }

        *self.state.write().await = Loaded::default();

        // Sampled before reading: an edit landing mid-reload stays newer.
        let modified = self.source.modified(&self.path).await?;
        let text = self.source.read(&self.path).await?;
        let mut template = Template::new(&text, &self.parser, Some(self.context.clone()))?;

        let mut scope = self.init_scope.clone();
        template
            .initialize(
                &mut scope,
                evaluator,
                self.init_options.allow_already_initialized(true),
            )
            .await?;

        tracing::info!(
            "Loaded template {} ({} fragment(s))",
            self.path.display(),
            template.fragments().len()
        );
        *self.state.write().await = Loaded {
            template: Some(Arc::new(template)),
            timestamp: Some(modified),
        };
        Ok(())
    }

    async fn current<E>(&self, evaluator: &E) -> Result<Arc<Template>, TemplateError>
    where
        E: Evaluator + ?Sized,
    {
        if self.auto_reload {
            self.update(evaluator).await?;
        }
        self.template().await.ok_or_else(|| TemplateError::NotLoaded {
            path: self.path.clone(),
        })
    }

    /// Reload if needed, then render into a lazy chunk stream.
    ///
    /// The stream keeps the template it started with even if another caller
    /// reloads the file meanwhile.
    ///
    /// # Errors
    ///
    /// Reload errors, [`TemplateError::NotLoaded`] with auto-reload off and
    /// nothing loaded, and render errors through the stream.
    pub async fn render_stream<'a, E>(
        &self,
        scope: &'a mut Scope,
        evaluator: &'a E,
        options: RenderOptions,
    ) -> Result<impl Stream<Item = Result<String, TemplateError>> + Send + 'a, TemplateError>
    where
        E: Evaluator + ?Sized,
    {
        let template = self.current(evaluator).await?;
        if !template.is_initialized() {
            return Err(TemplateError::NotInitialized);
        }
        Ok(chunk_stream(template, scope, evaluator, options))
    }

    /// Reload if needed, then render into a string.
    ///
    /// # Errors
    ///
    /// See [`WatchedTemplate::render_stream`].
    pub async fn render_string<E>(
        &self,
        scope: &mut Scope,
        evaluator: &E,
        options: RenderOptions,
    ) -> Result<String, TemplateError>
    where
        E: Evaluator + ?Sized,
    {
        let chunks = self.render_stream(scope, evaluator, options).await?;
        chunks.try_collect::<Vec<String>>().await.map(|chunks| chunks.concat())
    }

    /// Reload if needed, then render into `path`, creating or truncating it.
    ///
    /// # Errors
    ///
    /// See [`WatchedTemplate::render_stream`], plus I/O errors unchanged.
    pub async fn render_to_path<E>(
        &self,
        path: impl AsRef<Path>,
        scope: &mut Scope,
        evaluator: &E,
        options: RenderOptions,
    ) -> Result<(), TemplateError>
    where
        E: Evaluator + ?Sized,
    {
        let chunks = self.render_stream(scope, evaluator, options).await?;
        write_chunks(path.as_ref(), chunks).await
    }
}

impl fmt::Debug for WatchedTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchedTemplate")
            .field("path", &self.path)
            .field("auto_reload", &self.auto_reload)
            .finish_non_exhaustive()
    }
}
