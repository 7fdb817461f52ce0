//! Syntax tree for N-Triples documents

use std::fmt;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A literal value with optional datatype or language tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    /// Lexical form, escapes already resolved
    pub lexical: String,
    /// Datatype IRI, when the literal is typed
    pub datatype: Option<String>,
    /// Language tag, when the literal is a language-tagged string
    pub language: Option<String>,
}

impl Literal {
    /// A plain literal without datatype or language
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    /// A literal carrying an explicit datatype
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// A language-tagged literal
    pub fn tagged(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }
}

/// An RDF term as found in subject or object position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// Absolute IRI (without angle brackets)
    Iri(String),
    /// Blank node label (without the `_:` prefix)
    BlankNode(String),
    Literal(Literal),
}

impl Term {
    /// Subject identifier for resources, `None` for literals
    ///
    /// Blank nodes keep their `_:` prefix so they never collide with IRIs.
    pub fn resource_id(&self) -> Option<String> {
        match self {
            Term::Iri(iri) => Some(iri.clone()),
            Term::BlankNode(label) => Some(format!("_:{}", label)),
            Term::Literal(_) => None,
        }
    }
}

impl fmt::Display for Term {
    /// N-Triples form of the term
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(label) => write!(f, "_:{}", label),
            Term::Literal(lit) => {
                write!(f, "\"{}\"", escape_lexical(&lit.lexical))?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{}", lang)?;
                } else if let Some(dt) = &lit.datatype {
                    write!(f, "^^<{}>", dt)?;
                }
                Ok(())
            }
        }
    }
}

fn escape_lexical(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// A single statement
#[derive(Debug, Clone, PartialEq)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

/// Root AST node - a complete N-Triples document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub triples: Vec<Spanned<Triple>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id() {
        assert_eq!(
            Term::Iri("http://example.org/a".into()).resource_id(),
            Some("http://example.org/a".to_string())
        );
        assert_eq!(
            Term::BlankNode("b1".into()).resource_id(),
            Some("_:b1".to_string())
        );
        assert_eq!(Term::Literal(Literal::plain("x")).resource_id(), None);
    }

    #[test]
    fn test_display_literal_escapes() {
        let term = Term::Literal(Literal::tagged("line\n\"q\"", "en"));
        assert_eq!(term.to_string(), r#""line\n\"q\""@en"#);
    }

    #[test]
    fn test_display_typed_literal() {
        let term = Term::Literal(Literal::typed(
            "2021-05-01",
            "http://www.w3.org/2001/XMLSchema#date",
        ));
        assert_eq!(
            term.to_string(),
            "\"2021-05-01\"^^<http://www.w3.org/2001/XMLSchema#date>"
        );
    }
}
