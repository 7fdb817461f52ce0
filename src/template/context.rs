//! Mutable state owned by a single rendering pass

use std::collections::HashSet;

/// Identifiers of templates selected during a pass, in selection order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRecord {
    identifiers: Vec<String>,
}

impl MatchRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, identifier: impl Into<String>) {
        self.identifiers.push(identifier.into());
    }

    pub fn as_slice(&self) -> &[String] {
        &self.identifiers
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn clear(&mut self) {
        self.identifiers.clear();
    }
}

/// Per-pass state: match log, widget id counter and rendered subjects
///
/// Rendering resets the context at the start of every pass. Concurrent
/// passes never share one.
#[derive(Debug, Default)]
pub struct PassContext {
    matches: MatchRecord,
    widget_counter: u32,
    rendered: HashSet<String>,
}

impl PassContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything recorded so far
    pub fn reset(&mut self) {
        self.matches.clear();
        self.widget_counter = 0;
        self.rendered.clear();
    }

    pub fn matches(&self) -> &MatchRecord {
        &self.matches
    }

    pub fn record_match(&mut self, identifier: &str) {
        self.matches.push(identifier);
    }

    /// Next generated widget id: `rating-1`, `rating-2`, ...
    pub fn next_widget_id(&mut self, prefix: &str) -> String {
        self.widget_counter += 1;
        format!("{}-{}", prefix, self.widget_counter)
    }

    /// Mark a subject as rendered; false if it already was
    pub fn mark_rendered(&mut self, subject: &str) -> bool {
        self.rendered.insert(subject.to_string())
    }

    pub fn is_rendered(&self, subject: &str) -> bool {
        self.rendered.contains(subject)
    }

    pub fn into_matches(self) -> MatchRecord {
        self.matches
    }
}
