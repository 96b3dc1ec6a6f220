//! Test utilities for yatplt
//!
//! This module provides helpers shared by the unit tests and the integration
//! test suite:
//! - Logging initialization that plays well with the test harness
//! - [`CountingEvaluator`] to observe how often directives run
//! - [`MemorySource`] to drive a watched template without touching the disk
//!
//! # Example
//!
//! ```rust,no_run
//! use yatplt::templating::LookupEvaluator;
//! use yatplt::test_utils::{CountingEvaluator, init_test_logging};
//!
//! init_test_logging(None);
//! let evaluator = CountingEvaluator::new(LookupEvaluator);
//! assert_eq!(evaluator.executions(), 0);
//! ```

pub mod evaluator;
pub mod source;

pub use evaluator::CountingEvaluator;
pub use source::MemorySource;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// This function initializes the tracing subscriber for tests, but only once
/// regardless of how many times it's called. It respects the `RUST_LOG` environment
/// variable if set, or uses the provided log level.
///
/// To enable logging in tests via environment variable:
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            // No logging if neither is provided
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
