//! Template lifecycle: initialize once, render many times.
//!
//! A [`Template`] is built from parsed fragments. If any one-time directive is
//! present it starts uninitialized; [`Template::initialize`] runs every
//! one-time directive in source order, replacing expressions by their
//! rendered text and removing blocks, and the template becomes initialized
//! for good. Render calls then walk the remaining fragments, each call
//! producing fresh output from the same fragments and the same shared
//! [`Context`].
//!
//! # Example
//!
//! ```rust,no_run
//! use yatplt::templating::{LookupEvaluator, RenderOptions, Scope, Template};
//!
//! # async fn example() -> Result<(), yatplt::templating::TemplateError> {
//! let mut template = Template::parse("{1{! global site = 'docs' !}1}<h1>{{% site %}}</h1>")?;
//! template.initialize(&mut Scope::new(), &LookupEvaluator, Default::default()).await?;
//!
//! let html = template
//!     .render_string(&mut Scope::new(), &LookupEvaluator, RenderOptions::default())
//!     .await?;
//! assert_eq!(html, "<h1>docs</h1>");
//! # Ok(())
//! # }
//! ```

use futures::stream::{self, Stream, TryStreamExt};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use super::context::{Context, Scope, stringify};
use super::delimiters::{Form, Phase};
use super::error::TemplateError;
use super::evaluator::Evaluator;
use super::fragment::{Directive, Fragment};
use super::options::{InitOptions, RenderOptions};
use super::parser::TemplateParser;

/// A parsed template with its shared context.
pub struct Template {
    fragments: Vec<Fragment>,
    context: Context,
    initialized: bool,
    separator: &'static str,
}

impl Template {
    /// Parse `source` and wrap the fragments.
    ///
    /// When `context` is `None` a fresh, empty context is created.
    ///
    /// # Errors
    ///
    /// Any parse error from [`TemplateParser::parse`].
    pub fn new(
        source: &str,
        parser: &TemplateParser,
        context: Option<Context>,
    ) -> Result<Self, TemplateError> {
        let fragments = parser.parse(source)?;
        let mut template = Self::from_fragments(fragments, context);
        if parser.strip_literal_text() {
            template.separator = "\n";
        }
        Ok(template)
    }

    /// Parse `source` with the default parser and a fresh context.
    ///
    /// # Errors
    ///
    /// Any parse error from [`TemplateParser::parse`].
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        Self::new(source, &TemplateParser::default(), None)
    }

    /// Read and parse a template file.
    ///
    /// # Errors
    ///
    /// I/O errors unchanged, or any parse error.
    pub async fn from_path(
        path: impl AsRef<Path>,
        parser: &TemplateParser,
        context: Option<Context>,
    ) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path).await?;
        tracing::debug!("Loaded template {} ({} bytes)", path.display(), source.len());
        Self::new(&source, parser, context)
    }

    /// Wrap an existing fragment sequence. The template is initialized iff it
    /// holds no one-time directive.
    #[must_use]
    pub fn from_fragments(fragments: Vec<Fragment>, context: Option<Context>) -> Self {
        let initialized = !fragments.iter().any(Fragment::is_one_time);
        Self {
            fragments,
            context: context.unwrap_or_default(),
            initialized,
            separator: "",
        }
    }

    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// True once `initialize` has run, or from the start if the template has
    /// no one-time directive.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run every one-time directive once.
    ///
    /// Blocks are executed and removed. Expressions are evaluated with a copy
    /// of `scope`; their stringified result replaces them, or they are removed
    /// when the result is none (with `allow_none`) or empty after stripping.
    /// The fragment sequence is only replaced once every directive has
    /// succeeded, so a failure leaves the template untouched and still
    /// uninitialized.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::AlreadyInitialized`] unless `allow_already_initialized`
    /// - [`TemplateError::NullResult`] for a none result without `allow_none`
    /// - [`TemplateError::Evaluation`] when the evaluator fails
    pub async fn initialize<E>(
        &mut self,
        scope: &mut Scope,
        evaluator: &E,
        options: InitOptions,
    ) -> Result<&mut Self, TemplateError>
    where
        E: Evaluator + ?Sized,
    {
        if self.initialized {
            if options.allow_already_initialized {
                return Ok(self);
            }
            return Err(TemplateError::AlreadyInitialized);
        }

        let settle = options.render_options();
        let mut next = Vec::with_capacity(self.fragments.len());
        let mut executed = 0usize;

        for fragment in &self.fragments {
            let directive = match fragment {
                Fragment::Directive(d) if d.phase() == Phase::OneTime => d,
                other => {
                    next.push(other.clone());
                    continue;
                }
            };
            executed += 1;

            match directive.form() {
                Form::Block => {
                    self.execute_block(directive, scope, evaluator, options.reuse_scope).await?;
                }
                Form::Expression => {
                    let value = self.evaluate_expression(directive, scope, evaluator).await?;
                    if let Some(text) = settle_result(directive, value, settle)? {
                        next.push(Fragment::Literal(text));
                    }
                }
            }
        }

        tracing::debug!(
            "Initialized template: {} one-time directive(s), {} -> {} fragment(s)",
            executed,
            self.fragments.len(),
            next.len()
        );
        self.fragments = next;
        self.initialized = true;
        Ok(self)
    }

    /// Render into a lazy stream of output chunks.
    ///
    /// Each pull runs directives until one produces output. Literals are
    /// yielded verbatim, blocks produce nothing, expressions yield their
    /// stringified (optionally stripped) result. The stream ends after the
    /// first error. Dropping it early simply stops running directives.
    ///
    /// # Errors
    ///
    /// [`TemplateError::NotInitialized`] before `initialize` has run.
    pub fn render_stream<'a, E>(
        &'a self,
        scope: &'a mut Scope,
        evaluator: &'a E,
        options: RenderOptions,
    ) -> Result<impl Stream<Item = Result<String, TemplateError>> + Send + 'a, TemplateError>
    where
        E: Evaluator + ?Sized,
    {
        if !self.initialized {
            return Err(TemplateError::NotInitialized);
        }
        Ok(chunk_stream(self, scope, evaluator, options))
    }

    /// Render and concatenate every chunk.
    ///
    /// # Errors
    ///
    /// See [`Template::render_stream`]; evaluation errors as in `initialize`.
    pub async fn render_string<E>(
        &self,
        scope: &mut Scope,
        evaluator: &E,
        options: RenderOptions,
    ) -> Result<String, TemplateError>
    where
        E: Evaluator + ?Sized,
    {
        let chunks = self.render_stream(scope, evaluator, options)?;
        chunks.try_collect::<Vec<String>>().await.map(|chunks| chunks.concat())
    }

    /// Render into `path`, creating or truncating it. Chunks are written as
    /// they are produced.
    ///
    /// # Errors
    ///
    /// See [`Template::render_stream`], plus I/O errors unchanged.
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
        let chunks = self.render_stream(scope, evaluator, options)?;
        write_chunks(path.as_ref(), chunks).await
    }

    async fn execute_block<E>(
        &self,
        directive: &Directive,
        scope: &mut Scope,
        evaluator: &E,
        reuse_scope: bool,
    ) -> Result<(), TemplateError>
    where
        E: Evaluator + ?Sized,
    {
        tracing::debug!("Executing {}", directive.name());
        let result = if reuse_scope {
            evaluator.execute(directive.source(), &self.context, scope).await
        } else {
            let mut copy = scope.clone();
            evaluator.execute(directive.source(), &self.context, &mut copy).await
        };
        result.map_err(|source| TemplateError::Evaluation {
            fragment: directive.name(),
            source,
        })
    }

    async fn evaluate_expression<E>(
        &self,
        directive: &Directive,
        scope: &Scope,
        evaluator: &E,
    ) -> Result<Option<Value>, TemplateError>
    where
        E: Evaluator + ?Sized,
    {
        tracing::debug!("Evaluating {}", directive.name());
        // Expressions never see the caller's scope itself.
        let mut copy = scope.clone();
        evaluator
            .evaluate(directive.source(), &self.context, &mut copy)
            .await
            .map_err(|source| TemplateError::Evaluation {
                fragment: directive.name(),
                source,
            })
    }

    async fn render_fragment<E>(
        &self,
        fragment: &Fragment,
        scope: &mut Scope,
        evaluator: &E,
        options: RenderOptions,
    ) -> Result<Option<String>, TemplateError>
    where
        E: Evaluator + ?Sized,
    {
        let directive = match fragment {
            Fragment::Literal(text) => return Ok(Some(text.clone())),
            Fragment::Directive(d) if d.phase() == Phase::OneTime => {
                return Err(TemplateError::UnexpectedFragment {
                    fragment: d.name(),
                    stage: "render",
                });
            }
            Fragment::Directive(d) => d,
        };

        match directive.form() {
            Form::Block => {
                self.execute_block(directive, scope, evaluator, options.reuse_scope).await?;
                Ok(None)
            }
            Form::Expression => {
                let value = self.evaluate_expression(directive, scope, evaluator).await?;
                settle_result(directive, value, options)
            }
        }
    }
}

/// Apply the none/strip/empty rules to an expression result.
fn settle_result(
    directive: &Directive,
    value: Option<Value>,
    options: RenderOptions,
) -> Result<Option<String>, TemplateError> {
    let value = match value {
        None | Some(Value::Null) if options.allow_none => return Ok(None),
        None | Some(Value::Null) => {
            return Err(TemplateError::NullResult {
                fragment: directive.name(),
            });
        }
        Some(value) => value,
    };

    let text = stringify(&value);
    if !options.strip_result {
        return Ok(Some(text));
    }
    let stripped = text.trim();
    if stripped.is_empty() {
        Ok(None)
    } else {
        Ok(Some(stripped.to_string()))
    }
}

/// The chunk stream behind every render entry point. `T` is either a borrowed
/// template or an owned handle such as `Arc<Template>`.
pub(crate) fn chunk_stream<'a, T, E>(
    template: T,
    scope: &'a mut Scope,
    evaluator: &'a E,
    options: RenderOptions,
) -> impl Stream<Item = Result<String, TemplateError>> + Send + 'a
where
    T: Borrow<Template> + Send + Sync + 'a,
    E: Evaluator + ?Sized,
{
    stream::try_unfold((template, 0usize, scope), move |(template, mut index, scope)| async move {
        loop {
            let current: &Template = template.borrow();
            let Some(fragment) = current.fragments.get(index) else {
                return Ok(None);
            };
            index += 1;

            if let Some(chunk) = current.render_fragment(fragment, scope, evaluator, options).await? {
                tracing::trace!("Yielding chunk of {} bytes", chunk.len());
                return Ok(Some((chunk, (template, index, scope))));
            }
        }
    })
}

/// Write every chunk of `chunks` to `path`, truncating it first.
pub(crate) async fn write_chunks<S>(path: &Path, chunks: S) -> Result<(), TemplateError>
where
    S: Stream<Item = Result<String, TemplateError>>,
{
    let mut file = tokio::fs::File::create(path).await?;
    let mut chunks = std::pin::pin!(chunks);
    let mut written = 0usize;
    while let Some(chunk) = chunks.try_next().await? {
        file.write_all(chunk.as_bytes()).await?;
        written += chunk.len();
    }
    file.flush().await?;
    tracing::debug!("Rendered {} bytes to {}", written, path.display());
    Ok(())
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fragment) in self.fragments.iter().enumerate() {
            if i > 0 {
                f.write_str(self.separator)?;
            }
            write!(f, "{fragment}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("fragments", &self.fragments)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}
