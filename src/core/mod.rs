//! Core types shared by the yatplt command-line layer
//!
//! - [`YatpltError`] - errors surfaced by the `yatplt` binary
//! - [`ErrorContext`] - an error with details and a suggestion for the user
//! - [`user_friendly_error`] - convert any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! Template parsing and rendering errors live in
//! [`crate::templating::TemplateError`]; they are wrapped here only when they
//! reach the user.

pub mod error;

pub use error::{ErrorContext, YatpltError, user_friendly_error};
