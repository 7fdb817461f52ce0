//! RDF Linter - template-driven HTML+RDFa rendering of structured data
//!
//! This library parses an N-Triples graph, picks a display template for each
//! subject from its declared types, orders subjects by template priority and
//! renders them as HTML with RDFa attributes.
//!
//! # Example
//!
//! ```rust
//! use rdf_linter::render;
//!
//! let html = render(r#"
//!     <http://ex.org/alice> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://schema.org/Person> .
//!     <http://ex.org/alice> <http://schema.org/name> "Alice" .
//! "#).unwrap();
//! assert!(html.contains(r#"typeof="http://schema.org/Person""#));
//! assert!(html.contains("Alice"));
//! ```

pub mod error;
pub mod graph;
pub mod literal;
pub mod parser;
pub mod renderer;
pub mod template;
pub mod templates;

pub use error::ParseError;
pub use graph::{Graph, GraphError, GraphSource, Properties};
pub use literal::{humanize, infer_datatype, XsdDatatype};
pub use parser::{parse, Document};
pub use renderer::{render_html, HtmlConfig};
pub use template::{
    GroupFormat, MatchRecord, PassContext, Template, TemplateError, TemplateKey,
    TemplateRegistry, TemplateResolver,
};
pub use templates::TemplateConfigError;

use thiserror::Error;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error during parsing
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Invalid template definition
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Failure of the graph collaborator
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

impl From<Vec<ParseError>> for RenderError {
    fn from(errors: Vec<ParseError>) -> Self {
        RenderError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// HTML output configuration
    pub html: HtmlConfig,
    /// Templates used to resolve subjects
    pub templates: TemplateRegistry,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            html: HtmlConfig::default(),
            templates: templates::default_registry(),
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTML configuration
    pub fn with_html(mut self, config: HtmlConfig) -> Self {
        self.html = config;
        self
    }

    /// Replace the template registry entirely
    pub fn with_registry(mut self, registry: TemplateRegistry) -> Self {
        self.templates = registry;
        self
    }

    /// Merge caller templates over the current ones; caller entries win on
    /// key collision
    pub fn with_template_overrides(mut self, overrides: TemplateRegistry) -> Self {
        self.templates = self.templates.merged_with(overrides);
        self
    }
}

/// Result of one rendering pass
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Rendered markup
    pub html: String,
    /// Identifiers of the templates selected during the pass, in order
    pub matched_templates: MatchRecord,
}

/// Render N-Triples source to HTML with default configuration
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, &RenderConfig::default())
}

/// Render N-Triples source to HTML with custom configuration
///
/// # Example
///
/// ```rust
/// use rdf_linter::{render_with_config, HtmlConfig, RenderConfig};
///
/// let config = RenderConfig::new().with_html(HtmlConfig::new().with_standalone(false));
/// let html = render_with_config(r#"<http://ex.org/a> <http://ex.org/p> "v" ."#, &config).unwrap();
/// assert!(html.starts_with(r#"<div class="rl-document">"#));
/// ```
pub fn render_with_config(source: &str, config: &RenderConfig) -> Result<String, RenderError> {
    Ok(render_pass(source, config)?.html)
}

/// Render N-Triples source and report the templates matched on the way
pub fn render_pass(source: &str, config: &RenderConfig) -> Result<RenderOutput, RenderError> {
    let doc = parse(source)?;
    let graph = Graph::from_document(&doc);
    let mut ctx = PassContext::new();
    let html = render_graph(&graph, config, &mut ctx)?;
    Ok(RenderOutput {
        html,
        matched_templates: ctx.into_matches(),
    })
}

/// Render any graph source within a caller-owned pass context
pub fn render_graph<G: GraphSource + ?Sized>(
    graph: &G,
    config: &RenderConfig,
    ctx: &mut PassContext,
) -> Result<String, RenderError> {
    Ok(render_html(graph, &config.templates, &config.html, ctx)?)
}
