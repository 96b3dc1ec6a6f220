//! Integration test suite for yatplt
//!
//! End-to-end tests through the public API and the `yatplt` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **templating**: parsing, initialization and rendering through the public API
//! - **watched**: file-backed templates and reload behavior
//! - **cli**: the `render` and `check` commands

mod cli;
mod templating;
mod watched;
