//! Evaluator wrapper that counts calls.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::templating::{Context, EvalError, Evaluator, Scope};

/// Delegates to an inner evaluator and records every call.
#[derive(Debug, Default)]
pub struct CountingEvaluator<E> {
    inner: E,
    executions: AtomicUsize,
    evaluations: AtomicUsize,
    sources: Mutex<Vec<String>>,
}

impl<E: Evaluator> CountingEvaluator<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            executions: AtomicUsize::new(0),
            evaluations: AtomicUsize::new(0),
            sources: Mutex::new(Vec::new()),
        }
    }

    /// Number of block executions so far.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    /// Number of expression evaluations so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }

    /// Directive bodies in call order.
    pub fn sources(&self) -> Vec<String> {
        self.sources.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, source: &str) {
        if let Ok(mut sources) = self.sources.lock() {
            sources.push(source.to_string());
        }
    }
}

#[async_trait]
impl<E: Evaluator> Evaluator for CountingEvaluator<E> {
    async fn execute(
        &self,
        source: &str,
        context: &Context,
        scope: &mut Scope,
    ) -> Result<(), EvalError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        self.record(source);
        self.inner.execute(source, context, scope).await
    }

    async fn evaluate(
        &self,
        source: &str,
        context: &Context,
        scope: &mut Scope,
    ) -> Result<Option<Value>, EvalError> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        self.record(source);
        self.inner.evaluate(source, context, scope).await
    }
}
