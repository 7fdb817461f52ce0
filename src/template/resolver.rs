//! Template resolution - picks the display template for a subject's types
//!
//! Every combination of the subject's declared types is looked up, shortest
//! first. A combination of `L` types that finds a template lands in bucket
//! `L`. Only the bucket with the greatest `L` is considered: a match on two
//! types always beats a match on one, whatever their priorities. Inside that
//! bucket the lowest priority number wins, ties going to the combination
//! generated first.

use tracing::debug;

use crate::graph::{GraphError, GraphSource};

use super::context::PassContext;
use super::registry::{Template, TemplateRegistry};

/// Resolves subjects to templates against one registry
#[derive(Debug, Clone, Copy)]
pub struct TemplateResolver<'r> {
    registry: &'r TemplateRegistry,
}

impl<'r> TemplateResolver<'r> {
    pub fn new(registry: &'r TemplateRegistry) -> Self {
        Self { registry }
    }

    /// Best template for a set of declared types
    ///
    /// Duplicate types are ignored. The winner is appended to the pass's
    /// match log; `None` means the caller falls back to generic rendering.
    pub fn resolve(&self, types: &[String], ctx: &mut PassContext) -> Option<&'r Template> {
        let mut unique: Vec<&str> = Vec::with_capacity(types.len());
        for t in types {
            if !unique.contains(&t.as_str()) {
                unique.push(t);
            }
        }

        // Matches from the longest combination length seen so far
        let mut best: Vec<&'r Template> = Vec::new();
        for len in 1..=unique.len() {
            let mut bucket = Vec::new();
            for set in combinations(&unique, len) {
                debug!(?set, "find_template: look for");
                if let Some(template) = self.lookup(&set) {
                    bucket.push(template);
                }
            }
            if !bucket.is_empty() {
                best = bucket;
            }
        }

        if best.is_empty() {
            debug!(types = ?unique, "find_template: no template found");
            return None;
        }

        best.sort_by_key(|t| t.priority());
        let template = best[0];
        debug!(identifier = %template.identifier, "find_template: found");
        ctx.record_match(&template.identifier);
        Some(template)
    }

    /// Resolve using the subject's `rdf:type` values in the graph
    pub fn resolve_subject<G: GraphSource + ?Sized>(
        &self,
        graph: &G,
        subject: &str,
        ctx: &mut PassContext,
    ) -> Result<Option<&'r Template>, GraphError> {
        let types = graph.types_of(subject)?;
        Ok(self.resolve(&types, ctx))
    }

    /// Set key first; single combinations also try the scalar key, then the
    /// first matching pattern key
    fn lookup(&self, set: &[&str]) -> Option<&'r Template> {
        let registry = self.registry;
        registry.get_set(set).or_else(|| match set {
            [single] => registry
                .get_type(single)
                .or_else(|| registry.match_pattern(single)),
            _ => None,
        })
    }
}

/// All `len`-sized combinations of `items`, without repeats, in
/// lexicographic index order
///
/// Combinations are produced one at a time, so only the current index
/// vector is held in memory.
pub fn combinations<T: Clone>(items: &[T], len: usize) -> Combinations<'_, T> {
    Combinations {
        items,
        indices: (0..len).collect(),
        done: len == 0 || len > items.len(),
    }
}

/// Iterator returned by [`combinations`]
#[derive(Debug, Clone)]
pub struct Combinations<'a, T> {
    items: &'a [T],
    indices: Vec<usize>,
    done: bool,
}

impl<T: Clone> Iterator for Combinations<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.done {
            return None;
        }
        let current = self.indices.iter().map(|&i| self.items[i].clone()).collect();

        // Rightmost index that can still move forward
        let (n, len) = (self.items.len(), self.indices.len());
        match (0..len).rev().find(|&i| self.indices[i] != i + n - len) {
            Some(pos) => {
                self.indices[pos] += 1;
                for j in pos + 1..len {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(current)
    }
}
