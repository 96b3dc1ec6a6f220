//! Shared template context and per-call scopes.
//!
//! The [`Context`] plays the role of global variables: one instance is owned
//! by a template, handed to every evaluator call, and survives across render
//! calls (and across reloads of a watched template). Mutations made by one
//! directive are visible to the directives after it and to later renders.
//!
//! A [`Scope`] holds caller-supplied values for a single `initialize` or
//! `render` call.

use dashmap::DashMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Values visible to the directives of one call.
pub type Scope = Map<String, Value>;

/// Shared, mutable, template-lifetime variables.
///
/// Cloning yields another handle to the same storage. The context adds no
/// cross-call locking of its own; callers that render one template
/// concurrently and need consistent context state must serialize the renders.
#[derive(Clone, Default)]
pub struct Context {
    vars: Arc<DashMap<String, Value>>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context pre-populated from a scope-like map.
    #[must_use]
    pub fn from_map(map: Scope) -> Self {
        let context = Self::new();
        for (key, value) in map {
            context.insert(key, value);
        }
        context
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.vars.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.vars.insert(key.into(), value)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.vars.remove(key).map(|(_, value)| value)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Copy of the current contents, sorted by key.
    #[must_use]
    pub fn snapshot(&self) -> Scope {
        let mut entries: Vec<(String, Value)> =
            self.vars.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().collect()
    }

    /// True if both handles point at the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.vars, &other.vars)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.snapshot()).finish()
    }
}

/// String form of an evaluation result: strings verbatim, anything else as JSON.
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
