//! Rating widget
//!
//! A rating is either a plain literal value or a subject carrying the rating
//! properties of schema.org (`ratingValue`, `bestRating`, `worstRating`,
//! `reviewCount`) or hReview (`value`, `best`, `worst`, `average`). The widget
//! markup is a placeholder span with the extracted numbers as data
//! attributes; the statements themselves are kept as hidden RDFa spans.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::graph::{GraphError, GraphSource, RDF_TYPE};
use crate::parser::ast::Term;
use crate::template::PassContext;

use super::html::{escape_xml, local_name};

pub const DEFAULT_WORST: f64 = 1.0;
pub const DEFAULT_BEST: f64 = 5.0;

static BEST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^best(Rating)?$").expect("valid regex"));
static WORST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^worst(Rating)?$").expect("valid regex"));
static VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(ratingValue|value|average)$").expect("valid regex"));
static REVIEW_COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^reviewCount$").expect("valid regex"));

/// Numbers extracted for one rating widget
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub value: Option<f64>,
    pub worst: f64,
    pub best: f64,
    pub review_count: Option<u64>,
}

impl Default for Rating {
    fn default() -> Self {
        Self {
            value: None,
            worst: DEFAULT_WORST,
            best: DEFAULT_BEST,
            review_count: None,
        }
    }
}

impl Rating {
    /// Rating given directly as a literal
    pub fn from_lexical(lexical: &str) -> Self {
        Self {
            value: parse_number(lexical),
            ..Self::default()
        }
    }

    /// Apply one statement of a rating subject
    pub fn apply(&mut self, predicate: &str, object: &Term) {
        let Term::Literal(literal) = object else {
            return;
        };
        let name = local_name(predicate);
        if BEST.is_match(name) {
            self.best = parse_number(&literal.lexical).unwrap_or(self.best);
        } else if WORST.is_match(name) {
            self.worst = parse_number(&literal.lexical).unwrap_or(self.worst);
        } else if VALUE.is_match(name) {
            self.value = parse_number(&literal.lexical).or(self.value);
        } else if REVIEW_COUNT.is_match(name) {
            self.review_count = literal.lexical.trim().parse().ok().or(self.review_count);
        }
    }

    /// Scan every statement of a rating subject
    pub fn from_statements<'a>(statements: impl IntoIterator<Item = (&'a str, &'a Term)>) -> Self {
        let mut rating = Self::default();
        for (predicate, object) in statements {
            rating.apply(predicate, object);
        }
        rating
    }
}

fn parse_number(lexical: &str) -> Option<f64> {
    lexical.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Render a rating value of `predicate` as a widget
///
/// A referenced subject is marked as rendered so it is not rendered again on
/// its own.
pub fn render_rating<G: GraphSource + ?Sized>(
    graph: &G,
    predicate: &str,
    value: &Term,
    ctx: &mut PassContext,
    prefix: &str,
) -> Result<String, GraphError> {
    let id = ctx.next_widget_id("rating");
    let mut statements = String::new();

    let rating = match value {
        Term::Literal(literal) => {
            statements.push_str(&format!(
                r#"<span property="{}" content="{}"></span>"#,
                escape_xml(predicate),
                escape_xml(&literal.lexical)
            ));
            Rating::from_lexical(&literal.lexical)
        }
        resource => {
            let subject = resource.resource_id().unwrap_or_default();
            let pairs = if graph.contains_subject(&subject) {
                ctx.mark_rendered(&subject);
                graph.query_subject(&subject)?
            } else {
                Vec::new()
            };

            let types: Vec<String> = pairs
                .iter()
                .filter(|(p, _)| p == RDF_TYPE)
                .filter_map(|(_, o)| o.resource_id())
                .collect();
            let typeof_attr = if types.is_empty() {
                String::new()
            } else {
                format!(r#" typeof="{}""#, escape_xml(&types.join(" ")))
            };

            statements.push_str(&format!(
                r#"<span rel="{}" resource="{}"{}>"#,
                escape_xml(predicate),
                escape_xml(&subject),
                typeof_attr
            ));
            for (p, o) in pairs.iter().filter(|(p, _)| p != RDF_TYPE) {
                let content = match o {
                    Term::Literal(literal) => literal.lexical.clone(),
                    other => other.resource_id().unwrap_or_default(),
                };
                statements.push_str(&format!(
                    r#"<span property="{}" content="{}"></span>"#,
                    escape_xml(p),
                    escape_xml(&content)
                ));
            }
            statements.push_str("</span>");

            Rating::from_statements(pairs.iter().map(|(p, o)| (p.as_str(), o)))
        }
    };

    let mut html = format!(
        r#"<span class="{prefix}rating" id="{id}" data-worst="{}" data-best="{}""#,
        rating.worst, rating.best
    );
    if let Some(value) = rating.value {
        html.push_str(&format!(r#" data-rating="{}">{} / {}</span>"#, value, value, rating.best));
    } else {
        html.push_str("></span>");
    }
    html.push_str(&statements);
    if let Some(count) = rating.review_count {
        html.push_str(&format!(
            r#"<span class="{prefix}review-count">{} reviews</span>"#,
            count
        ));
    }
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::parser::ast::Literal;

    const SCHEMA: &str = "http://schema.org/";

    fn lit(s: &str) -> Term {
        Term::Literal(Literal::plain(s))
    }

    #[test]
    fn test_literal_rating_uses_defaults() {
        let rating = Rating::from_lexical("4");
        assert_eq!(rating.value, Some(4.0));
        assert_eq!(rating.worst, DEFAULT_WORST);
        assert_eq!(rating.best, DEFAULT_BEST);
    }

    #[test]
    fn test_schema_org_properties() {
        let best = format!("{}bestRating", SCHEMA);
        let worst = format!("{}worstRating", SCHEMA);
        let value = format!("{}ratingValue", SCHEMA);
        let count = format!("{}reviewCount", SCHEMA);
        let (b, w, v, c) = (lit("10"), lit("0"), lit("7.5"), lit("12"));
        let rating = Rating::from_statements([
            (best.as_str(), &b),
            (worst.as_str(), &w),
            (value.as_str(), &v),
            (count.as_str(), &c),
        ]);
        assert_eq!(
            rating,
            Rating {
                value: Some(7.5),
                worst: 0.0,
                best: 10.0,
                review_count: Some(12),
            }
        );
    }

    #[test]
    fn test_hreview_properties() {
        let (avg, best) = (lit("3"), lit("4"));
        let rating = Rating::from_statements([
            ("http://rdf.data-vocabulary.org/#average", &avg),
            ("http://rdf.data-vocabulary.org/#best", &best),
        ]);
        assert_eq!(rating.value, Some(3.0));
        assert_eq!(rating.best, 4.0);
    }

    #[test]
    fn test_unparsable_numbers_ignored() {
        let (v, b) = (lit("great"), lit("many"));
        let rating = Rating::from_statements([
            ("http://schema.org/ratingValue", &v),
            ("http://schema.org/bestRating", &b),
        ]);
        assert_eq!(rating.value, None);
        assert_eq!(rating.best, DEFAULT_BEST);
    }

    #[test]
    fn test_widget_ids_are_sequential() {
        let graph = Graph::new();
        let mut ctx = PassContext::new();
        let a = render_rating(&graph, "http://schema.org/ratingValue", &lit("4"), &mut ctx, "rl-")
            .unwrap();
        let b = render_rating(&graph, "http://schema.org/ratingValue", &lit("2"), &mut ctx, "rl-")
            .unwrap();
        assert!(a.contains(r#"id="rating-1""#));
        assert!(b.contains(r#"id="rating-2""#));
        assert!(a.contains(r#"data-rating="4""#));
        assert!(!a.contains("<script"));
    }

    #[test]
    fn test_subject_rating_marks_subject_rendered() {
        let source = r#"
            _:r <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Rating> .
            _:r <http://schema.org/ratingValue> "4" .
            _:r <http://schema.org/bestRating> "10" .
            _:r <http://schema.org/reviewCount> "3" .
        "#;
        let graph = Graph::from_document(&crate::parse(source).unwrap());
        let mut ctx = PassContext::new();
        let html = render_rating(
            &graph,
            "http://schema.org/reviewRating",
            &Term::BlankNode("r".into()),
            &mut ctx,
            "rl-",
        )
        .unwrap();

        assert!(ctx.is_rendered("_:r"));
        assert!(html.contains(r#"data-rating="4""#));
        assert!(html.contains(r#"data-best="10""#));
        assert!(html.contains(r#"typeof="http://schema.org/Rating""#));
        assert!(html.contains(
            r#"<span property="http://schema.org/ratingValue" content="4"></span>"#
        ));
        assert!(html.contains("3 reviews"));
    }
}
