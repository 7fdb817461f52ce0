//! HTML+RDFa generation from a graph and a template registry

use std::collections::HashMap;

use tracing::debug;

use crate::graph::{GraphError, GraphSource, RDF_TYPE};
use crate::literal::humanize;
use crate::parser::ast::{Literal, Term};
use crate::template::{
    PassContext, PropertyGrouper, SubjectOrderer, Template, TemplateRegistry, TemplateResolver,
};

use super::rating::render_rating;
use super::HtmlConfig;

/// Assemble an HTML document from rendered blocks
pub struct HtmlBuilder {
    config: HtmlConfig,
    subjects: Vec<String>,
    extracted: Option<String>,
}

impl HtmlBuilder {
    /// Create a new HTML builder
    pub fn new(config: HtmlConfig) -> Self {
        Self {
            config,
            subjects: vec![],
            extracted: None,
        }
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> &str {
        if self.config.pretty_print {
            "  "
        } else {
            ""
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add the markup of one top-level subject
    pub fn add_subject(&mut self, html: String) {
        self.subjects.push(html);
    }

    /// Add the serialized graph panel
    pub fn set_extracted(&mut self, dump: &str) {
        self.extracted = Some(format!(
            r#"<pre class="{}extracted">{}</pre>"#,
            self.prefix(),
            escape_xml(dump)
        ));
    }

    /// Build the final output
    pub fn build(self) -> String {
        let nl = self.newline();
        let indent = self.indent_str();
        let prefix = self.prefix();

        let mut html = String::new();

        if self.config.standalone {
            html.push_str("<!DOCTYPE html>");
            html.push_str(nl);
            html.push_str("<html>");
            html.push_str(nl);
            html.push_str(r#"<head><meta charset="utf-8"><title>"#);
            html.push_str(&escape_xml(&self.config.title));
            html.push_str("</title></head>");
            html.push_str(nl);
            html.push_str("<body>");
            html.push_str(nl);
        }

        html.push_str(&format!(r#"<div class="{}document">"#, prefix));
        html.push_str(nl);
        for subject in &self.subjects {
            html.push_str(indent);
            html.push_str(subject);
            html.push_str(nl);
        }
        html.push_str("</div>");
        html.push_str(nl);

        if let Some(extracted) = &self.extracted {
            html.push_str(extracted);
            html.push_str(nl);
        }

        if self.config.standalone {
            html.push_str("</body>");
            html.push_str(nl);
            html.push_str("</html>");
            html.push_str(nl);
        }

        html
    }
}

/// Render every subject of a graph
///
/// Subjects are visited in template priority order. A subject that was
/// already rendered nested inside another one is not rendered again.
/// The pass context is reset first, so each call is a fresh pass.
pub fn render_html<G: GraphSource + ?Sized>(
    graph: &G,
    registry: &TemplateRegistry,
    config: &HtmlConfig,
    ctx: &mut PassContext,
) -> Result<String, GraphError> {
    ctx.reset();
    let mut writer = Writer::new(graph, registry, config);
    let mut builder = HtmlBuilder::new(config.clone());

    let base = graph.base_order();
    let ordered = SubjectOrderer::order_by::<_, GraphError>(&base, |subject| {
        Ok(writer.template_for(subject, ctx)?.map(|t| t.priority()))
    })?;

    for subject in &ordered {
        if ctx.is_rendered(subject) {
            debug!(%subject, "already rendered");
            continue;
        }
        let html = writer.render_subject(subject, false, ctx)?;
        builder.add_subject(html);
    }

    if config.show_extracted {
        builder.set_extracted(&graph.dump());
    }

    Ok(builder.build())
}

/// Per-pass subject renderer
///
/// Each subject's template is resolved once per pass and cached, so the
/// match log records a subject at most once.
struct Writer<'a, G: ?Sized> {
    graph: &'a G,
    resolver: TemplateResolver<'a>,
    prefix: String,
    templates: HashMap<String, Option<&'a Template>>,
}

impl<'a, G: GraphSource + ?Sized> Writer<'a, G> {
    fn new(graph: &'a G, registry: &'a TemplateRegistry, config: &HtmlConfig) -> Self {
        Self {
            graph,
            resolver: TemplateResolver::new(registry),
            prefix: config.class_prefix.clone().unwrap_or_default(),
            templates: HashMap::new(),
        }
    }

    fn template_for(
        &mut self,
        subject: &str,
        ctx: &mut PassContext,
    ) -> Result<Option<&'a Template>, GraphError> {
        if let Some(&cached) = self.templates.get(subject) {
            return Ok(cached);
        }
        let template = self.resolver.resolve_subject(self.graph, subject, ctx)?;
        self.templates.insert(subject.to_string(), template);
        Ok(template)
    }

    /// Render a subject, nested as a relation target when `rel` is set
    fn render_subject(
        &mut self,
        subject: &str,
        rel: bool,
        ctx: &mut PassContext,
    ) -> Result<String, GraphError> {
        ctx.mark_rendered(subject);
        let properties = self.graph.properties_of(subject)?;
        let types = self.graph.types_of(subject)?;
        let template = self.template_for(subject, ctx)?;
        let prefix = self.prefix.clone();

        let mut html = format!(
            r#"<div class="{}subject" resource="{}""#,
            prefix,
            escape_xml(subject)
        );
        if !types.is_empty() {
            html.push_str(&format!(r#" typeof="{}""#, escape_xml(&types.join(" "))));
        }

        let mut body = String::new();
        match template {
            Some(template) => {
                let effective = PropertyGrouper::effective_template(template, rel);
                html.push_str(&format!(
                    r#" data-template="{}""#,
                    escape_xml(&effective.identifier)
                ));
                debug!(%subject, template = %effective.identifier, rel, "render_subject");

                for group in PropertyGrouper::group_sections(&properties, effective) {
                    let rating = group.format.is_rating();
                    let mut failure = None;
                    let rendered = group.render(&mut |predicate, values| {
                        match self.render_property(predicate, values, rating, ctx) {
                            Ok(html) => html,
                            Err(e) => {
                                failure.get_or_insert(e);
                                String::new()
                            }
                        }
                    });
                    if let Some(e) = failure {
                        return Err(e);
                    }
                    if !rendered.is_empty() {
                        body.push_str(&format!(
                            r#"<div class="{}group {}{}">{}</div>"#,
                            prefix,
                            prefix,
                            escape_xml(&group.name),
                            rendered
                        ));
                    }
                }
            }
            None => {
                debug!(%subject, "render_subject: generic");
                for (predicate, values) in properties.iter() {
                    if predicate == RDF_TYPE {
                        continue;
                    }
                    body.push_str(&self.render_property(predicate, values, false, ctx)?);
                }
            }
        }

        html.push('>');
        html.push_str(&body);
        html.push_str("</div>");
        Ok(html)
    }

    fn render_property(
        &mut self,
        predicate: &str,
        values: &[Term],
        rating: bool,
        ctx: &mut PassContext,
    ) -> Result<String, GraphError> {
        if values.is_empty() {
            return Ok(String::new());
        }

        let mut rendered = String::new();
        for value in values {
            let html = if rating {
                render_rating(self.graph, predicate, value, ctx, &self.prefix)?
            } else {
                self.render_value(predicate, value, ctx)?
            };
            rendered.push_str(&html);
        }

        Ok(format!(
            r#"<div class="{p}property"><span class="{p}label">{}</span> {}</div>"#,
            escape_xml(local_name(predicate)),
            rendered,
            p = self.prefix
        ))
    }

    fn render_value(
        &mut self,
        predicate: &str,
        value: &Term,
        ctx: &mut PassContext,
    ) -> Result<String, GraphError> {
        match value {
            Term::Literal(literal) => Ok(render_literal(predicate, literal)),
            resource => {
                let id = resource.resource_id().unwrap_or_default();
                if self.graph.contains_subject(&id) && !ctx.is_rendered(&id) {
                    let nested = self.render_subject(&id, true, ctx)?;
                    return Ok(format!(
                        r#"<div rel="{}">{}</div>"#,
                        escape_xml(predicate),
                        nested
                    ));
                }
                Ok(match resource {
                    Term::Iri(iri) => format!(
                        r#"<a rel="{}" href="{}">{}</a>"#,
                        escape_xml(predicate),
                        escape_xml(iri),
                        escape_xml(iri)
                    ),
                    _ => format!(
                        r#"<span rel="{}" resource="{}">{}</span>"#,
                        escape_xml(predicate),
                        escape_xml(&id),
                        escape_xml(&id)
                    ),
                })
            }
        }
    }
}

fn render_literal(predicate: &str, literal: &Literal) -> String {
    let text = humanize(literal);
    let mut attrs = format!(r#" property="{}""#, escape_xml(predicate));
    if let Some(datatype) = &literal.datatype {
        attrs.push_str(&format!(r#" datatype="{}""#, escape_xml(datatype)));
    }
    if let Some(language) = &literal.language {
        attrs.push_str(&format!(r#" lang="{}""#, escape_xml(language)));
    }
    if text != literal.lexical {
        attrs.push_str(&format!(r#" content="{}""#, escape_xml(&literal.lexical)));
    }
    format!("<span{}>{}</span>", attrs, escape_xml(&text))
}

/// Last path or fragment segment of an identifier
pub(crate) fn local_name(iri: &str) -> &str {
    let trimmed = iri.trim_end_matches(['/', '#']);
    match trimmed.rfind(['/', '#', ':']) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Escape special XML characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::template::{GroupFormat, GroupRequest, TemplateKey, BODY, TITLE};

    const SOURCE: &str = r#"
        <http://ex.org/review> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Review> .
        <http://ex.org/review> <http://schema.org/name> "Great <book>" .
        <http://ex.org/review> <http://schema.org/author> <http://ex.org/alice> .
        <http://ex.org/review> <http://schema.org/reviewRating> _:r .
        _:r <http://schema.org/ratingValue> "4" .
        <http://ex.org/alice> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Person> .
        <http://ex.org/alice> <http://schema.org/name> "Alice" .
        <http://ex.org/alice> <http://schema.org/email> "alice@ex.org" .
    "#;

    fn graph() -> Graph {
        Graph::from_document(&crate::parse(SOURCE).unwrap())
    }

    fn registry() -> TemplateRegistry {
        let mut registry = TemplateRegistry::new();
        registry.insert(
            TemplateKey::single("http://schema.org/Review"),
            Template::new("review")
                .with_priority(5)
                .with_sections([
                    GroupRequest::named(TITLE),
                    GroupRequest::named("rating"),
                    GroupRequest::Other,
                ])
                .with_props(TITLE, ["http://schema.org/name"])
                .with_props("rating", ["http://schema.org/reviewRating"])
                .with_format("rating", GroupFormat::Rating),
        );
        registry.insert(
            TemplateKey::single("http://schema.org/Person"),
            Template::new("person")
                .with_props(TITLE, ["http://schema.org/name"])
                .with_props(BODY, ["http://schema.org/email"])
                .with_rel(
                    Template::new("person-rel")
                        .with_sections([GroupRequest::named(TITLE)])
                        .with_props(TITLE, ["http://schema.org/name"]),
                ),
        );
        registry
    }

    fn fragment() -> HtmlConfig {
        HtmlConfig::new()
            .with_standalone(false)
            .with_pretty_print(false)
            .with_extracted(false)
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("http://schema.org/name"), "name");
        assert_eq!(local_name("http://rdf.data-vocabulary.org/#value"), "value");
        assert_eq!(local_name("http://ex.org/ns/"), "ns");
        assert_eq!(local_name("urn:isbn"), "isbn");
        assert_eq!(local_name("plain"), "plain");
    }

    #[test]
    fn test_each_subject_rendered_once() {
        let mut ctx = PassContext::new();
        let html = render_html(&graph(), &registry(), &fragment(), &mut ctx).unwrap();
        assert_eq!(html.matches(r#"resource="http://ex.org/alice""#).count(), 1);
        assert_eq!(html.matches(r#"<div class="rl-subject""#).count(), 2);
    }

    #[test]
    fn test_relation_uses_rel_template() {
        let mut ctx = PassContext::new();
        let html = render_html(&graph(), &registry(), &fragment(), &mut ctx).unwrap();
        assert!(html.contains(r#"data-template="person-rel""#));
        // the email is only part of the full person template
        assert!(!html.contains("alice@ex.org"));
    }

    #[test]
    fn test_rating_group_renders_widget() {
        let mut ctx = PassContext::new();
        let html = render_html(&graph(), &registry(), &fragment(), &mut ctx).unwrap();
        assert!(html.contains(r#"id="rating-1""#));
        assert!(html.contains(r#"data-rating="4""#));
        assert!(ctx.is_rendered("_:r"));
    }

    #[test]
    fn test_match_log_records_each_subject_once() {
        let mut ctx = PassContext::new();
        render_html(&graph(), &registry(), &fragment(), &mut ctx).unwrap();
        assert_eq!(
            ctx.matches().as_slice(),
            &["review".to_string(), "person".to_string()]
        );
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let mut ctx = PassContext::new();
        let html = render_html(&graph(), &registry(), &fragment(), &mut ctx).unwrap();
        assert!(html.contains("Great &lt;book&gt;"));
        assert!(!html.contains("<book>"));
    }

    #[test]
    fn test_unmatched_subject_renders_generically() {
        let graph = Graph::from_document(
            &crate::parse(r#"<http://ex.org/x> <http://ex.org/label> "X" ."#).unwrap(),
        );
        let mut ctx = PassContext::new();
        let html = render_html(&graph, &TemplateRegistry::new(), &fragment(), &mut ctx).unwrap();
        assert_eq!(
            html,
            concat!(
                r#"<div class="rl-document">"#,
                r#"<div class="rl-subject" resource="http://ex.org/x">"#,
                r#"<div class="rl-property"><span class="rl-label">label</span> "#,
                r#"<span property="http://ex.org/label">X</span></div>"#,
                "</div></div>"
            )
        );
        assert!(ctx.matches().is_empty());
    }

    #[test]
    fn test_humanized_literal_keeps_lexical_content() {
        let literal = Literal::plain("P1D");
        assert_eq!(
            render_literal("http://schema.org/duration", &literal),
            r#"<span property="http://schema.org/duration" content="P1D">1 day</span>"#
        );
    }

    #[test]
    fn test_standalone_document_with_extracted_panel() {
        let mut ctx = PassContext::new();
        let html = render_html(&graph(), &registry(), &HtmlConfig::default(), &mut ctx).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.contains(r#"<pre class="rl-extracted">"#));
        assert!(html.contains("&lt;http://ex.org/alice&gt;"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
