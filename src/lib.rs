//! yatplt - yet another template preprocessor
//!
//! Templates are literal text mixed with directives delimited by paired tags.
//! Directives hold code for a pluggable [`Evaluator`](templating::Evaluator)
//! and run in one of two phases:
//!
//! - **one-time** directives run once, when the template is initialized, and
//!   their output is folded into the template
//! - **render** directives run on every render
//!
//! # Core Modules
//!
//! - [`templating`] - Parser, fragments, the template lifecycle and watched templates
//! - [`config`] - Configuration file with parser options and delimiters
//! - [`core`] - User-facing error reporting
//! - [`cli`] - The `yatplt` command-line interface
//! - [`constants`] - Default delimiters and other fixed values
//!
//! # Template Syntax
//!
//! ```text
//! {{# comments are removed before parsing #}}
//! {1{! global site = 'docs' !}1}        one-time block
//! <title>{1{% site %}1}</title>         one-time expression
//! {{! page = name + '.html' !}}         render block
//! <a href="{{% page %}}">{{% name %}}</a>  render expression
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use yatplt::templating::{
//!     InitOptions, LookupEvaluator, RenderOptions, Scope, Template, TemplateParser,
//! };
//!
//! # async fn example() -> Result<(), yatplt::templating::TemplateError> {
//! let parser = TemplateParser::new().with_strip_literal_text(false);
//! let mut template = Template::new("{1{% 'Hello' %}1}, {{% name %}}!", &parser, None)?;
//! template.initialize(&mut Scope::new(), &LookupEvaluator, InitOptions::default()).await?;
//!
//! let mut scope = Scope::new();
//! scope.insert("name".into(), "world".into());
//! let text = template
//!     .render_string(&mut scope, &LookupEvaluator, RenderOptions::default())
//!     .await?;
//! assert_eq!(text, "Hello, world!");
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! yatplt render page.tpl --set name=world
//! yatplt check page.tpl --format json
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod templating;

// Test utilities (only compiled for tests)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
