//! Partitioning of a subject's predicates into display groups

use std::fmt;

use tracing::debug;

use crate::graph::{Properties, RDF_TYPE};
use crate::parser::ast::Term;

use super::registry::{GroupFormat, Template};

pub const TITLE: &str = "title";
pub const BODY: &str = "body";
pub const DESCRIPTION: &str = "description";
pub const NESTED: &str = "nested";

/// A group token requested while rendering a subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRequest {
    /// Group declared by the template through `<name>_props`
    Named(String),
    /// Every predicate not in the title, body or description groups
    Other,
    /// Every predicate not in the nested group
    OtherNested,
}

impl GroupRequest {
    /// Interpret a token; `other` and `other_nested` are reserved
    pub fn parse(token: &str) -> Self {
        match token {
            "other" => GroupRequest::Other,
            "other_nested" => GroupRequest::OtherNested,
            name => GroupRequest::Named(name.to_string()),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        GroupRequest::Named(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            GroupRequest::Named(name) => name,
            GroupRequest::Other => "other",
            GroupRequest::OtherNested => "other_nested",
        }
    }

    /// Layout used when a template does not declare `sections`
    pub fn default_sections() -> Vec<GroupRequest> {
        vec![
            GroupRequest::named(TITLE),
            GroupRequest::named(DESCRIPTION),
            GroupRequest::named(BODY),
            GroupRequest::Other,
        ]
    }
}

impl From<&str> for GroupRequest {
    fn from(token: &str) -> Self {
        GroupRequest::parse(token)
    }
}

impl fmt::Display for GroupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered predicates of one group, their values and how to combine them
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyGroup {
    pub name: String,
    pub predicates: Vec<String>,
    pub format: GroupFormat,
    values: Vec<Vec<Term>>,
}

impl PropertyGroup {
    /// Values of a predicate within this group, empty when the subject has none
    pub fn values(&self, predicate: &str) -> &[Term] {
        self.predicates
            .iter()
            .position(|p| p == predicate)
            .map(|idx| self.values[idx].as_slice())
            .unwrap_or(&[])
    }

    /// Apply the group's format with a per-predicate render callback
    pub fn render(&self, render: &mut dyn FnMut(&str, &[Term]) -> String) -> String {
        self.format
            .apply(&self.predicates, &mut |predicate| render(predicate, self.values(predicate)))
    }
}

/// Computes display groups from a template and a subject's properties
pub struct PropertyGrouper;

impl PropertyGrouper {
    /// Template to group with: the relation sub-template when rendering a
    /// relation target and one is declared, the template itself otherwise
    pub fn effective_template(template: &Template, as_relation: bool) -> &Template {
        match (&template.rel, as_relation) {
            (Some(rel), true) => rel.as_ref(),
            _ => template,
        }
    }

    /// Predicates eligible for grouping; `rdf:type` is expressed separately
    pub fn groupable_predicates(properties: &Properties) -> Vec<String> {
        properties
            .predicates()
            .filter(|p| *p != RDF_TYPE)
            .map(str::to_string)
            .collect()
    }

    /// Resolve one group token
    ///
    /// Returns `None` when the resulting predicate list is empty or absent, in
    /// which case nothing is emitted for the token.
    pub fn group(
        properties: &Properties,
        template: &Template,
        request: &GroupRequest,
    ) -> Option<PropertyGroup> {
        let (predicates, format) = match request {
            GroupRequest::Named(name) => {
                let props = template.props(name).unwrap_or(&[]).to_vec();
                let format = template.format(name).cloned().unwrap_or_default();
                (props, format)
            }
            GroupRequest::Other => {
                let excluded = [TITLE, BODY, DESCRIPTION];
                (Self::remaining(properties, template, &excluded), GroupFormat::Concat)
            }
            GroupRequest::OtherNested => (
                Self::remaining(properties, template, &[NESTED]),
                GroupFormat::Concat,
            ),
        };

        debug!(
            template = %template.identifier,
            group = %request,
            ?predicates,
            "resolved property group"
        );

        if predicates.is_empty() {
            return None;
        }

        let values = predicates
            .iter()
            .map(|p| properties.get(p).to_vec())
            .collect();

        Some(PropertyGroup {
            name: request.name().to_string(),
            predicates,
            format,
            values,
        })
    }

    /// Groups for every section of the template, in section order
    pub fn group_sections(properties: &Properties, template: &Template) -> Vec<PropertyGroup> {
        template
            .sections
            .iter()
            .filter_map(|request| Self::group(properties, template, request))
            .collect()
    }

    fn remaining(properties: &Properties, template: &Template, excluded: &[&str]) -> Vec<String> {
        Self::groupable_predicates(properties)
            .into_iter()
            .filter(|p| {
                !excluded
                    .iter()
                    .any(|group| template.props(group).unwrap_or(&[]).contains(p))
            })
            .collect()
    }
}
