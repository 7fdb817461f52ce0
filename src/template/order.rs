//! Rendering order of subjects by matched template priority

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::graph::{GraphError, GraphSource};

use super::context::PassContext;
use super::resolver::TemplateResolver;

/// Reorders a base subject sequence into priority buckets
///
/// Matched subjects come first, bucketed by template priority (ascending)
/// and in base order within a bucket. Unmatched subjects follow in base
/// order. Repeated subjects in the base order keep their first occurrence.
pub struct SubjectOrderer;

impl SubjectOrderer {
    /// Order with a caller-supplied priority lookup; `None` leaves a subject
    /// in the leftover tail
    pub fn order_by<F, E>(base: &[String], mut priority_of: F) -> Result<Vec<String>, E>
    where
        F: FnMut(&str) -> Result<Option<u32>, E>,
    {
        let mut seen: HashSet<&String> = HashSet::new();
        let base: Vec<&String> = base.iter().filter(|s| seen.insert(*s)).collect();

        let mut buckets: BTreeMap<u32, Vec<&String>> = BTreeMap::new();
        for &subject in &base {
            if let Some(priority) = priority_of(subject)? {
                debug!(%subject, priority, "order: bucketed");
                buckets.entry(priority).or_default().push(subject);
            }
        }

        let matched: HashSet<&str> = buckets.values().flatten().map(|s| s.as_str()).collect();
        let leftover: Vec<&String> = base
            .iter()
            .copied()
            .filter(|s| !matched.contains(s.as_str()))
            .collect();
        debug!(
            matched = matched.len(),
            leftover = leftover.len(),
            "order: ordered and leftover subjects"
        );

        Ok(buckets
            .into_values()
            .flatten()
            .chain(leftover)
            .cloned()
            .collect())
    }

    /// Order by resolving each subject's template against the graph
    pub fn order<G: GraphSource + ?Sized>(
        resolver: &TemplateResolver<'_>,
        graph: &G,
        base: &[String],
        ctx: &mut PassContext,
    ) -> Result<Vec<String>, GraphError> {
        Self::order_by(base, |subject| {
            Ok(resolver
                .resolve_subject(graph, subject, ctx)?
                .map(|t| t.priority()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::convert::Infallible;

    fn subjects(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn order(base: &[String], priorities: &HashMap<&str, u32>) -> Vec<String> {
        SubjectOrderer::order_by(base, |s| Ok::<_, Infallible>(priorities.get(s).copied()))
            .unwrap()
    }

    #[test]
    fn test_matched_first_by_priority_then_leftover() {
        let base = subjects(&["a", "b", "c", "d", "e"]);
        let priorities = HashMap::from([("b", 99), ("d", 1), ("e", 99)]);
        assert_eq!(order(&base, &priorities), subjects(&["d", "b", "e", "a", "c"]));
    }

    #[test]
    fn test_order_is_idempotent() {
        let base = subjects(&["a", "b", "c", "d"]);
        let priorities = HashMap::from([("c", 5), ("a", 7)]);
        let once = order(&base, &priorities);
        assert_eq!(order(&once, &priorities), once);
    }

    #[test]
    fn test_every_subject_exactly_once() {
        let base = subjects(&["a", "b", "a", "c"]);
        let priorities = HashMap::from([("a", 2)]);
        assert_eq!(order(&base, &priorities), subjects(&["a", "b", "c"]));
    }

    #[test]
    fn test_empty_base() {
        assert!(order(&[], &HashMap::new()).is_empty());
    }

    #[test]
    fn test_lookup_errors_propagate() {
        let base = subjects(&["a"]);
        let result = SubjectOrderer::order_by(&base, |_| Err::<Option<u32>, _>("boom"));
        assert_eq!(result, Err("boom"));
    }

    #[test]
    fn test_order_against_graph() {
        use crate::template::registry::{Template, TemplateKey, TemplateRegistry};

        let source = r#"
            <http://ex.org/a> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Thing> .
            <http://ex.org/b> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Person> .
        "#;
        let graph = crate::graph::Graph::from_document(&crate::parse(source).unwrap());
        let mut registry = TemplateRegistry::new();
        registry.insert(
            TemplateKey::single("http://schema.org/Person"),
            Template::new("person").with_priority(10),
        );
        let resolver = TemplateResolver::new(&registry);
        let mut ctx = PassContext::new();
        let ordered =
            SubjectOrderer::order(&resolver, &graph, &graph.base_order(), &mut ctx).unwrap();
        assert_eq!(ordered, subjects(&["http://ex.org/b", "http://ex.org/a"]));
        assert_eq!(ctx.matches().as_slice(), &["person".to_string()]);
    }
}
