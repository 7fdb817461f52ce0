//! Template registry keyed by type identifiers, type sets and patterns

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

use super::grouper::GroupRequest;

/// Priority used when a template declares none; larger means later
pub const DEFAULT_PRIORITY: u32 = 99;

/// Errors that can occur while building templates and registries
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Pattern key that is not a valid regular expression
    #[error("invalid pattern key '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Record with no `type`, `types` or `pattern`
    #[error("template '{identifier}' declares no type, types or pattern key")]
    MissingKey { identifier: String },

    /// Record with more than one key shape
    #[error("template '{identifier}' declares more than one of type, types and pattern")]
    AmbiguousKey { identifier: String },

    /// `types = []`
    #[error("template '{identifier}' declares an empty type set")]
    EmptyTypeSet { identifier: String },

    /// `<group>_props` that is not a list of strings
    #[error("template '{identifier}': {field} must be a list of predicate identifiers")]
    InvalidProps { identifier: String, field: String },

    /// `<group>_fmt` that names no known format
    #[error("template '{identifier}': invalid format in {field}: {message}")]
    InvalidFormat {
        identifier: String,
        field: String,
        message: String,
    },

    /// Blank token in `sections`
    #[error("template '{identifier}': empty section token")]
    EmptySection { identifier: String },

    /// Field that is neither a known key nor a `_props`/`_fmt` entry
    #[error("template '{identifier}': unknown field '{field}'")]
    UnknownField { identifier: String, field: String },
}

/// Programmatic format: receives the group's predicates and a per-predicate
/// render callback
pub type FormatFn =
    Arc<dyn Fn(&[String], &mut dyn FnMut(&str) -> String) -> String + Send + Sync>;

/// How a group's rendered predicates are combined
#[derive(Clone, Default)]
pub enum GroupFormat {
    /// Render each predicate and concatenate in order
    #[default]
    Concat,
    /// Keep only the first predicate that renders to something
    First,
    /// Join non-empty renderings with a separator
    Join(String),
    /// Concatenate, rendering each value as a rating widget
    Rating,
    Custom(FormatFn),
}

impl GroupFormat {
    /// Combine the renderings of `predicates`
    pub fn apply(&self, predicates: &[String], render: &mut dyn FnMut(&str) -> String) -> String {
        match self {
            GroupFormat::Concat | GroupFormat::Rating => {
                predicates.iter().map(|p| render(p.as_str())).collect()
            }
            GroupFormat::First => predicates
                .iter()
                .map(|p| render(p.as_str()))
                .find(|s| !s.is_empty())
                .unwrap_or_default(),
            GroupFormat::Join(separator) => predicates
                .iter()
                .map(|p| render(p.as_str()))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(separator),
            GroupFormat::Custom(f) => f(predicates, render),
        }
    }

    pub fn is_rating(&self) -> bool {
        matches!(self, GroupFormat::Rating)
    }
}

impl fmt::Debug for GroupFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupFormat::Concat => write!(f, "Concat"),
            GroupFormat::First => write!(f, "First"),
            GroupFormat::Join(sep) => f.debug_tuple("Join").field(sep).finish(),
            GroupFormat::Rating => write!(f, "Rating"),
            GroupFormat::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl PartialEq for GroupFormat {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (GroupFormat::Concat, GroupFormat::Concat)
            | (GroupFormat::First, GroupFormat::First)
            | (GroupFormat::Rating, GroupFormat::Rating) => true,
            (GroupFormat::Join(a), GroupFormat::Join(b)) => a == b,
            (GroupFormat::Custom(a), GroupFormat::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A display template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Name reported in the match log
    pub identifier: String,
    /// Explicit priority, see [`Template::priority`]
    pub priority: Option<u32>,
    /// Group tokens rendered, in order, for a subject using this template
    pub sections: Vec<GroupRequest>,
    /// Used instead of this template when the subject is a relation target
    pub rel: Option<Box<Template>>,
    props: HashMap<String, Vec<String>>,
    formats: HashMap<String, GroupFormat>,
}

impl Template {
    /// Template with no groups and the default section layout
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            priority: None,
            sections: GroupRequest::default_sections(),
            rel: None,
            props: HashMap::new(),
            formats: HashMap::new(),
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_props<I, S>(mut self, group: &str, predicates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_props(group, predicates.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_format(mut self, group: &str, format: GroupFormat) -> Self {
        self.set_format(group, format);
        self
    }

    pub fn with_sections<I>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = GroupRequest>,
    {
        self.sections = sections.into_iter().collect();
        self
    }

    pub fn with_rel(mut self, rel: Template) -> Self {
        self.rel = Some(Box::new(rel));
        self
    }

    pub fn set_props(&mut self, group: &str, predicates: Vec<String>) {
        self.props.insert(group.to_string(), predicates);
    }

    pub fn set_format(&mut self, group: &str, format: GroupFormat) {
        self.formats.insert(group.to_string(), format);
    }

    /// Effective priority, [`DEFAULT_PRIORITY`] when unspecified
    pub fn priority(&self) -> u32 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }

    /// `<group>_props`
    pub fn props(&self, group: &str) -> Option<&[String]> {
        self.props.get(group).map(|v| v.as_slice())
    }

    /// `<group>_fmt`
    pub fn format(&self, group: &str) -> Option<&GroupFormat> {
        self.formats.get(group)
    }
}

/// Registry key shapes
#[derive(Debug, Clone)]
pub enum TemplateKey {
    /// One type identifier
    Type(String),
    /// Unordered set of type identifiers
    TypeSet(BTreeSet<String>),
    /// Regular expression searched in a single type identifier
    Pattern(Regex),
}

impl TemplateKey {
    pub fn single(type_id: impl Into<String>) -> Self {
        TemplateKey::Type(type_id.into())
    }

    pub fn set<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TemplateKey::TypeSet(types.into_iter().map(Into::into).collect())
    }

    pub fn pattern(pattern: &str) -> Result<Self, TemplateError> {
        Regex::new(pattern)
            .map(TemplateKey::Pattern)
            .map_err(|e| TemplateError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }
}

impl PartialEq for TemplateKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TemplateKey::Type(a), TemplateKey::Type(b)) => a == b,
            (TemplateKey::TypeSet(a), TemplateKey::TypeSet(b)) => a == b,
            (TemplateKey::Pattern(a), TemplateKey::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKey::Type(t) => write!(f, "{}", t),
            TemplateKey::TypeSet(set) => {
                write!(f, "{{{}}}", set.iter().cloned().collect::<Vec<_>>().join(", "))
            }
            TemplateKey::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Ordered collection of keyed templates
///
/// Iteration order is insertion order; it decides which pattern key wins
/// when several match the same identifier.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    entries: Vec<(TemplateKey, Template)>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a template, replacing (in place) any entry with an equal key
    pub fn insert(&mut self, key: TemplateKey, template: Template) -> Option<Template> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, template)),
            None => {
                self.entries.push((key, template));
                None
            }
        }
    }

    /// Exact key lookup
    pub fn get(&self, key: &TemplateKey) -> Option<&Template> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, t)| t)
    }

    /// Lookup by type set, order of `types` is irrelevant
    pub fn get_set(&self, types: &[&str]) -> Option<&Template> {
        let wanted: BTreeSet<&str> = types.iter().copied().collect();
        self.entries.iter().find_map(|(k, t)| match k {
            TemplateKey::TypeSet(set)
                if set.len() == wanted.len() && set.iter().all(|s| wanted.contains(s.as_str())) =>
            {
                Some(t)
            }
            _ => None,
        })
    }

    /// Lookup by a single type identifier key
    pub fn get_type(&self, type_id: &str) -> Option<&Template> {
        self.entries.iter().find_map(|(k, t)| match k {
            TemplateKey::Type(id) if id == type_id => Some(t),
            _ => None,
        })
    }

    /// First pattern key, in registry order, found in `type_id`
    pub fn match_pattern(&self, type_id: &str) -> Option<&Template> {
        self.entries.iter().find_map(|(k, t)| match k {
            TemplateKey::Pattern(re) if re.is_match(type_id) => Some(t),
            _ => None,
        })
    }

    /// Merge `overrides` over this registry
    ///
    /// Override entries come first in the result; entries of `self` whose key
    /// collides with an override are dropped.
    pub fn merged_with(self, overrides: TemplateRegistry) -> TemplateRegistry {
        let mut entries = overrides.entries;
        for (key, template) in self.entries {
            if !entries.iter().any(|(k, _)| *k == key) {
                entries.push((key, template));
            }
        }
        TemplateRegistry { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TemplateKey, &Template)> {
        self.entries.iter().map(|(k, t)| (k, t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
