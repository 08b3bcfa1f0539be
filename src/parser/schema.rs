//! Trace store schema definitions.
//!
//! A trace store is a forest: every node carries one span and its ordered
//! child traces. Spans are bags of string annotations written by the
//! tracer (`Name`, `Span.Start`, `Span.End`, plus arbitrary tags).

use crate::utils::config::NAME_KEY;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level structure of a trace store file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStore {
    /// Root traces, in recording order
    #[serde(default)]
    pub traces: Vec<Trace>,
}

/// A span and the traces it spawned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub span: Span,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub: Vec<Trace>,
}

/// A single timestamped operation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub id: SpanId,

    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// Identity of a span within its trace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanId {
    pub trace: u64,
    pub span: u64,

    /// Zero for root spans
    #[serde(default)]
    pub parent: u64,
}

/// A key/value tag on a span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub key: String,
    pub value: String,
}

impl Annotation {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Span {
    /// Annotations as a map; later duplicates win
    pub fn string_map(&self) -> BTreeMap<String, String> {
        self.annotations
            .iter()
            .map(|a| (a.key.clone(), a.value.clone()))
            .collect()
    }

    /// Value of the last annotation with this key
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations
            .iter()
            .rev()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    /// The `Name` annotation, if any
    pub fn name(&self) -> Option<&str> {
        self.annotation(NAME_KEY)
    }
}

impl Trace {
    /// A leaf trace
    pub fn new(span: Span) -> Self {
        Self {
            span,
            sub: Vec::new(),
        }
    }

    /// Number of spans in this subtree
    pub fn span_count(&self) -> usize {
        1 + self.sub.iter().map(Trace::span_count).sum::<usize>()
    }
}
