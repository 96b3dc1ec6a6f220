//! Two-phase text templating.
//!
//! A template is literal text interleaved with directives. Each directive is
//! delimited by one of four tag pairs and carries a body of embedded code that
//! an [`Evaluator`] runs:
//!
//! | Kind                  | Default tags      | Runs during   | Produces output |
//! |-----------------------|-------------------|---------------|-----------------|
//! | one-time block        | `{1{!` ... `!}1}` | `initialize`  | no              |
//! | one-time expression   | `{1{%` ... `%}1}` | `initialize`  | yes, folded in  |
//! | render block          | `{{!` ... `!}}`   | every render  | no              |
//! | render expression     | `{{%` ... `%}}`   | every render  | yes             |
//!
//! Comments (`{{#` ... `#}}` by default) are removed before anything else.
//!
//! # Pipeline
//!
//! 1. [`comments::strip_comments`] removes comment regions
//! 2. [`matcher::match_tags`] pairs every start tag with its end tag
//! 3. [`classify::classify`] splits the text into [`Fragment`]s and normalizes
//!    the indentation of each directive body
//! 4. [`Template::initialize`] runs the one-time directives once and replaces
//!    them by their results
//! 5. [`Template::render_stream`] runs the render directives and yields output
//!    chunks lazily
//!
//! [`WatchedTemplate`] wraps the pipeline for a file and reloads it when the
//! file changes.
//!
//! # Example
//!
//! ```rust,no_run
//! use yatplt::templating::{
//!     InitOptions, LookupEvaluator, RenderOptions, Scope, Template,
//! };
//!
//! # async fn example() -> Result<(), yatplt::templating::TemplateError> {
//! let mut template = Template::parse("{1{! global site = 'docs' !}1}{{% site + '/' + page %}}")?;
//! template
//!     .initialize(&mut Scope::new(), &LookupEvaluator, InitOptions::default())
//!     .await?;
//!
//! let mut scope = Scope::new();
//! scope.insert("page".into(), "index".into());
//! let out = template
//!     .render_string(&mut scope, &LookupEvaluator, RenderOptions::default())
//!     .await?;
//! assert_eq!(out, "docs/index");
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod comments;
pub mod context;
pub mod delimiters;
pub mod error;
pub mod evaluator;
pub mod fragment;
pub mod indent;
pub mod matcher;
pub mod options;
pub mod parser;
pub mod scanner;
pub mod template;
pub mod watched;

pub use context::{Context, Scope, stringify};
pub use delimiters::{DelimiterPair, Delimiters, Form, PairKind, Phase};
pub use error::{EvalError, TemplateError};
pub use evaluator::{Evaluator, LookupEvaluator};
pub use fragment::{Directive, Fragment};
pub use options::{InitOptions, RenderOptions};
pub use parser::TemplateParser;
pub use scanner::find_all;
pub use template::Template;
pub use watched::{FsSource, TemplateSource, WatchedTemplate};
