//! In-memory graph and the query interface the renderer depends on
//!
//! The rendering core never owns graph storage; it talks to a [`GraphSource`].
//! [`Graph`] is the bundled implementation, built from a parsed N-Triples
//! [`Document`]. Subjects, predicates and values keep their first-seen order,
//! which makes the base ordering and the generic rendering deterministic.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::parser::ast::{Document, Term, Triple};

/// `rdf:type`
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Errors reported by a graph collaborator
#[derive(Debug, Error)]
pub enum GraphError {
    /// The renderer asked for a subject the graph does not describe
    #[error("unknown subject: {subject}")]
    UnknownSubject { subject: String },

    /// Backend-specific query failure
    #[error("graph query failed: {message}")]
    Query { message: String },
}

/// Ordered predicate → values mapping for one subject
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, Vec<Term>)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, ignoring exact duplicates
    pub fn push(&mut self, predicate: &str, value: Term) {
        match self.entries.iter_mut().find(|(p, _)| p == predicate) {
            Some((_, values)) => {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
            None => self.entries.push((predicate.to_string(), vec![value])),
        }
    }

    /// Values for a predicate, empty when absent
    pub fn get(&self, predicate: &str) -> &[Term] {
        self.entries
            .iter()
            .find(|(p, _)| p == predicate)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// Predicates in first-seen order
    pub fn predicates(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Term])> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Query interface over an externally owned graph
pub trait GraphSource {
    /// All described subjects, in the graph's natural order
    fn subjects(&self) -> Vec<String>;

    /// Whether the graph describes this subject
    fn contains_subject(&self, subject: &str) -> bool;

    /// Order subjects are offered to the orderer in
    fn base_order(&self) -> Vec<String> {
        self.subjects()
    }

    /// Every predicate and its values for a subject
    fn properties_of(&self, subject: &str) -> Result<Properties, GraphError>;

    /// `(predicate, object)` pairs for a subject
    fn query_subject(&self, subject: &str) -> Result<Vec<(String, Term)>, GraphError> {
        let props = self.properties_of(subject)?;
        Ok(props
            .iter()
            .flat_map(|(p, values)| values.iter().map(move |v| (p.to_string(), v.clone())))
            .collect())
    }

    /// Declared `rdf:type` identifiers of a subject, duplicates removed
    fn types_of(&self, subject: &str) -> Result<Vec<String>, GraphError> {
        let props = self.properties_of(subject)?;
        let mut types: Vec<String> = Vec::new();
        for value in props.get(RDF_TYPE) {
            if let Some(id) = value.resource_id() {
                if !types.contains(&id) {
                    types.push(id);
                }
            }
        }
        Ok(types)
    }

    /// Serialization of the whole graph for a debug view
    fn dump(&self) -> String;
}

/// In-memory graph preserving insertion order
#[derive(Debug, Clone, Default)]
pub struct Graph {
    subjects: Vec<(Term, Properties)>,
    index: HashMap<String, usize>,
    referenced: HashSet<String>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a parsed document
    pub fn from_document(doc: &Document) -> Self {
        let mut graph = Self::new();
        for triple in &doc.triples {
            graph.insert(&triple.node);
        }
        graph
    }

    /// Insert a statement; literal subjects are ignored
    pub fn insert(&mut self, triple: &Triple) {
        let Some(id) = triple.subject.resource_id() else {
            return;
        };
        let idx = match self.index.get(&id) {
            Some(&idx) => idx,
            None => {
                self.subjects.push((triple.subject.clone(), Properties::new()));
                self.index.insert(id, self.subjects.len() - 1);
                self.subjects.len() - 1
            }
        };
        self.subjects[idx].1.push(&triple.predicate, triple.object.clone());

        if triple.predicate != RDF_TYPE {
            if let Some(object_id) = triple.object.resource_id() {
                self.referenced.insert(object_id);
            }
        }
    }
}

impl GraphSource for Graph {
    fn subjects(&self) -> Vec<String> {
        self.subjects
            .iter()
            .filter_map(|(term, _)| term.resource_id())
            .collect()
    }

    fn contains_subject(&self, subject: &str) -> bool {
        self.index.contains_key(subject)
    }

    /// Subjects never used as an object first, then the rest, both in
    /// first-seen order
    fn base_order(&self) -> Vec<String> {
        let (roots, referenced): (Vec<String>, Vec<String>) = self
            .subjects()
            .into_iter()
            .partition(|s| !self.referenced.contains(s));
        roots.into_iter().chain(referenced).collect()
    }

    fn properties_of(&self, subject: &str) -> Result<Properties, GraphError> {
        self.index
            .get(subject)
            .map(|&idx| self.subjects[idx].1.clone())
            .ok_or_else(|| GraphError::UnknownSubject {
                subject: subject.to_string(),
            })
    }

    fn dump(&self) -> String {
        let mut out = String::new();
        for (subject, props) in &self.subjects {
            for (predicate, values) in props.iter() {
                for value in values {
                    out.push_str(&format!("{} <{}> {} .\n", subject, predicate, value));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Literal;
    use crate::parser::parse;

    const SOURCE: &str = r#"
        <http://ex.org/review> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Review> .
        <http://ex.org/review> <http://schema.org/reviewRating> _:r .
        _:r <http://schema.org/ratingValue> "4" .
        <http://ex.org/review> <http://schema.org/name> "Great" .
        <http://ex.org/review> <http://schema.org/name> "Great" .
    "#;

    fn graph() -> Graph {
        Graph::from_document(&parse(SOURCE).expect("Should parse"))
    }

    #[test]
    fn test_subjects_in_first_seen_order() {
        assert_eq!(graph().subjects(), vec!["http://ex.org/review", "_:r"]);
    }

    #[test]
    fn test_duplicate_values_collapsed() {
        let props = graph().properties_of("http://ex.org/review").unwrap();
        assert_eq!(
            props.get("http://schema.org/name"),
            &[Term::Literal(Literal::plain("Great"))]
        );
    }

    #[test]
    fn test_predicates_in_first_seen_order() {
        let props = graph().properties_of("http://ex.org/review").unwrap();
        let preds: Vec<_> = props.predicates().collect();
        assert_eq!(
            preds,
            vec![
                RDF_TYPE,
                "http://schema.org/reviewRating",
                "http://schema.org/name"
            ]
        );
    }

    #[test]
    fn test_types_of() {
        assert_eq!(
            graph().types_of("http://ex.org/review").unwrap(),
            vec!["http://schema.org/Review"]
        );
        assert!(graph().types_of("_:r").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_subject_is_error() {
        let err = graph().properties_of("http://ex.org/none").unwrap_err();
        assert!(matches!(err, GraphError::UnknownSubject { .. }));
    }

    #[test]
    fn test_base_order_puts_roots_first() {
        let src = r#"
            _:r <http://schema.org/ratingValue> "4" .
            <http://ex.org/review> <http://schema.org/reviewRating> _:r .
        "#;
        let g = Graph::from_document(&parse(src).unwrap());
        assert_eq!(g.base_order(), vec!["http://ex.org/review", "_:r"]);
    }

    #[test]
    fn test_query_subject_pairs() {
        let pairs = graph().query_subject("_:r").unwrap();
        assert_eq!(
            pairs,
            vec![(
                "http://schema.org/ratingValue".to_string(),
                Term::Literal(Literal::plain("4"))
            )]
        );
    }

    #[test]
    fn test_dump_reparses_to_same_graph() {
        let g = graph();
        let reparsed = Graph::from_document(&parse(&g.dump()).expect("dump is valid N-Triples"));
        assert_eq!(reparsed.subjects(), g.subjects());
        assert_eq!(reparsed.dump(), g.dump());
    }
}
