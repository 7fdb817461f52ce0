//! Template sources in TOML
//!
//! A built-in set of templates for common schema.org types ships with the
//! crate. Callers supply their own templates in the same format; entries from
//! the caller take precedence over built-in ones with an equal key.
//!
//! ```toml
//! [[template]]
//! identifier = "schema:Person"
//! type = "http://schema.org/Person"
//! priority = 10
//! title_props = ["http://schema.org/name"]
//! title_fmt = "first"
//!
//! [template.rel]
//! sections = ["title"]
//! title_props = ["http://schema.org/name"]
//! ```

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::template::{
    GroupFormat, GroupRequest, Template, TemplateError, TemplateKey, TemplateRegistry,
};

/// Errors that can occur when loading a template source
#[derive(Error, Debug)]
pub enum TemplateConfigError {
    #[error("Failed to read template file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse template TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// TOML structure for deserializing a template source
#[derive(Deserialize)]
struct TomlTemplates {
    #[serde(default)]
    template: Vec<TomlTemplate>,
}

#[derive(Deserialize)]
struct TomlTemplate {
    identifier: String,
    #[serde(rename = "type")]
    type_id: Option<String>,
    types: Option<Vec<String>>,
    pattern: Option<String>,
    priority: Option<u32>,
    rel: Option<TomlRel>,
    #[serde(flatten)]
    body: TomlBody,
}

#[derive(Deserialize)]
struct TomlRel {
    identifier: Option<String>,
    #[serde(flatten)]
    body: TomlBody,
}

/// Fields shared by templates and relation sub-templates
#[derive(Deserialize)]
struct TomlBody {
    sections: Option<Vec<String>>,
    /// `<group>_props` and `<group>_fmt` entries
    #[serde(flatten)]
    groups: HashMap<String, toml::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TomlFormat {
    Name(String),
    Join { join: String },
}

/// Built-in templates for common schema.org types
const DEFAULT_TEMPLATES: &str = r#"
[[template]]
identifier = "schema:Book+Review"
types = ["http://schema.org/Book", "http://schema.org/Review"]
priority = 5
sections = ["title", "rating", "body", "other"]
title_props = ["http://schema.org/name", "http://schema.org/itemReviewed"]
title_fmt = "first"
rating_props = ["http://schema.org/reviewRating"]
rating_fmt = "rating"
body_props = ["http://schema.org/reviewBody", "http://schema.org/author"]

[[template]]
identifier = "schema:Review"
type = "http://schema.org/Review"
priority = 5
sections = ["title", "rating", "body", "other"]
title_props = ["http://schema.org/name", "http://schema.org/itemReviewed"]
title_fmt = "first"
rating_props = ["http://schema.org/reviewRating"]
rating_fmt = "rating"
body_props = ["http://schema.org/reviewBody", "http://schema.org/description"]

[template.rel]
sections = ["title", "rating"]
title_props = ["http://schema.org/name"]
rating_props = ["http://schema.org/reviewRating"]
rating_fmt = "rating"

[[template]]
identifier = "schema:Product"
type = "http://schema.org/Product"
priority = 10
sections = ["title", "description", "rating", "other"]
title_props = ["http://schema.org/name"]
description_props = ["http://schema.org/description"]
rating_props = ["http://schema.org/aggregateRating"]
rating_fmt = "rating"

[[template]]
identifier = "schema:Person"
type = "http://schema.org/Person"
priority = 10
title_props = ["http://schema.org/name", "http://schema.org/givenName"]
title_fmt = "first"
description_props = ["http://schema.org/jobTitle"]
body_props = ["http://schema.org/email", "http://schema.org/telephone"]
body_fmt = { join = ", " }

[template.rel]
sections = ["title"]
title_props = ["http://schema.org/name"]

[[template]]
identifier = "schema:Organization"
type = "http://schema.org/Organization"
priority = 20
title_props = ["http://schema.org/name", "http://schema.org/legalName"]
title_fmt = "first"
body_props = ["http://schema.org/address", "http://schema.org/url"]

[[template]]
identifier = "schema:Book"
type = "http://schema.org/Book"
priority = 20
title_props = ["http://schema.org/name"]
description_props = ["http://schema.org/author", "http://schema.org/isbn"]
description_fmt = { join = " | " }

[[template]]
identifier = "schema:Event"
pattern = "^http://schema\\.org/.*Event$"
priority = 15
title_props = ["http://schema.org/name"]
body_props = ["http://schema.org/startDate", "http://schema.org/endDate", "http://schema.org/duration", "http://schema.org/location"]
"#;

static DEFAULTS: Lazy<TemplateRegistry> = Lazy::new(|| {
    load_str(DEFAULT_TEMPLATES).expect("Default templates should be valid")
});

/// Built-in template registry
pub fn default_registry() -> TemplateRegistry {
    DEFAULTS.clone()
}

/// Load a template source from a TOML file
pub fn load_file(path: &Path) -> Result<TemplateRegistry, TemplateConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_str(&content)
}

/// Load a template source from a TOML string
///
/// Records are registered in file order. A later record with a key equal to
/// an earlier one replaces it.
pub fn load_str(content: &str) -> Result<TemplateRegistry, TemplateConfigError> {
    let parsed: TomlTemplates = toml::from_str(content)?;

    let mut registry = TemplateRegistry::new();
    for record in parsed.template {
        let key = record_key(&record)?;
        let mut template = build_template(&record.identifier, record.body)?;
        template.priority = record.priority;
        if let Some(rel) = record.rel {
            let identifier = rel.identifier.unwrap_or_else(|| record.identifier.clone());
            template.rel = Some(Box::new(build_template(&identifier, rel.body)?));
        }
        debug!(%key, identifier = %template.identifier, "registered template");
        registry.insert(key, template);
    }
    Ok(registry)
}

/// Default templates with `overrides` merged over them
pub fn with_overrides(overrides: TemplateRegistry) -> TemplateRegistry {
    default_registry().merged_with(overrides)
}

fn record_key(record: &TomlTemplate) -> Result<TemplateKey, TemplateError> {
    let identifier = || record.identifier.clone();
    match (&record.type_id, &record.types, &record.pattern) {
        (Some(type_id), None, None) => Ok(TemplateKey::single(type_id.as_str())),
        (None, Some(types), None) if types.is_empty() => Err(TemplateError::EmptyTypeSet {
            identifier: identifier(),
        }),
        (None, Some(types), None) => Ok(TemplateKey::set(types.iter().map(String::as_str))),
        (None, None, Some(pattern)) => TemplateKey::pattern(pattern),
        (None, None, None) => Err(TemplateError::MissingKey {
            identifier: identifier(),
        }),
        _ => Err(TemplateError::AmbiguousKey {
            identifier: identifier(),
        }),
    }
}

fn build_template(identifier: &str, body: TomlBody) -> Result<Template, TemplateError> {
    let mut template = Template::new(identifier);

    if let Some(sections) = body.sections {
        let mut requests = Vec::with_capacity(sections.len());
        for token in sections {
            if token.trim().is_empty() {
                return Err(TemplateError::EmptySection {
                    identifier: identifier.to_string(),
                });
            }
            requests.push(GroupRequest::parse(token.trim()));
        }
        template.sections = requests;
    }

    for (field, value) in body.groups {
        if let Some(group) = field.strip_suffix("_props") {
            template.set_props(group, parse_props(identifier, &field, value)?);
        } else if let Some(group) = field.strip_suffix("_fmt") {
            template.set_format(group, parse_format(identifier, &field, value)?);
        } else {
            return Err(TemplateError::UnknownField {
                identifier: identifier.to_string(),
                field,
            });
        }
    }

    Ok(template)
}

fn parse_props(
    identifier: &str,
    field: &str,
    value: toml::Value,
) -> Result<Vec<String>, TemplateError> {
    let invalid = || TemplateError::InvalidProps {
        identifier: identifier.to_string(),
        field: field.to_string(),
    };
    let toml::Value::Array(items) = value else {
        return Err(invalid());
    };
    items
        .into_iter()
        .map(|item| match item {
            toml::Value::String(s) => Ok(s),
            _ => Err(invalid()),
        })
        .collect()
}

fn parse_format(
    identifier: &str,
    field: &str,
    value: toml::Value,
) -> Result<GroupFormat, TemplateError> {
    let invalid = |message: String| TemplateError::InvalidFormat {
        identifier: identifier.to_string(),
        field: field.to_string(),
        message,
    };
    let format: TomlFormat = value.try_into().map_err(|e| invalid(e.to_string()))?;
    match format {
        TomlFormat::Name(name) => match name.as_str() {
            "concat" => Ok(GroupFormat::Concat),
            "first" => Ok(GroupFormat::First),
            "rating" => Ok(GroupFormat::Rating),
            other => Err(invalid(format!(
                "unknown format '{}', expected concat, first, rating or {{ join = \"...\" }}",
                other
            ))),
        },
        TomlFormat::Join { join } => Ok(GroupFormat::Join(join)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{PassContext, TemplateResolver, BODY, TITLE};

    #[test]
    fn test_default_templates_load() {
        let registry = default_registry();
        assert_eq!(registry.len(), 7);
        let person = registry.get_type("http://schema.org/Person").unwrap();
        assert_eq!(person.priority(), 10);
        assert_eq!(person.format(TITLE), Some(&GroupFormat::First));
        assert_eq!(person.format(BODY), Some(&GroupFormat::Join(", ".into())));
        assert_eq!(person.rel.as_ref().unwrap().identifier, "schema:Person");
    }

    #[test]
    fn test_default_set_and_pattern_keys() {
        let registry = default_registry();
        assert!(registry
            .get_set(&["http://schema.org/Review", "http://schema.org/Book"])
            .is_some());
        assert_eq!(
            registry
                .match_pattern("http://schema.org/MusicEvent")
                .unwrap()
                .identifier,
            "schema:Event"
        );
    }

    #[test]
    fn test_book_review_prefers_combined_template() {
        let registry = default_registry();
        let mut ctx = PassContext::new();
        let types = vec![
            "http://schema.org/Book".to_string(),
            "http://schema.org/Review".to_string(),
        ];
        let found = TemplateResolver::new(&registry).resolve(&types, &mut ctx).unwrap();
        assert_eq!(found.identifier, "schema:Book+Review");
    }

    #[test]
    fn test_load_sections_and_groups() {
        let registry = load_str(
            r#"
            [[template]]
            identifier = "card"
            type = "http://ex.org/Card"
            sections = ["title", "other_nested"]
            title_props = ["http://ex.org/label"]
            nested_props = ["http://ex.org/part"]
            "#,
        )
        .unwrap();
        let card = registry.get_type("http://ex.org/Card").unwrap();
        assert_eq!(card.priority, None);
        assert_eq!(
            card.sections,
            vec![GroupRequest::named(TITLE), GroupRequest::OtherNested]
        );
        assert_eq!(card.props("nested").unwrap(), ["http://ex.org/part".to_string()]);
    }

    #[test]
    fn test_missing_key() {
        let err = load_str("[[template]]\nidentifier = \"x\"\n").unwrap_err();
        assert!(matches!(
            err,
            TemplateConfigError::Template(TemplateError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_ambiguous_key() {
        let err = load_str("[[template]]\nidentifier = \"x\"\ntype = \"A\"\npattern = \"A\"\n")
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateConfigError::Template(TemplateError::AmbiguousKey { .. })
        ));
    }

    #[test]
    fn test_empty_type_set() {
        let err = load_str("[[template]]\nidentifier = \"x\"\ntypes = []\n").unwrap_err();
        assert!(matches!(
            err,
            TemplateConfigError::Template(TemplateError::EmptyTypeSet { .. })
        ));
    }

    #[test]
    fn test_invalid_props_and_format() {
        let err =
            load_str("[[template]]\nidentifier = \"x\"\ntype = \"A\"\ntitle_props = \"name\"\n")
                .unwrap_err();
        assert!(matches!(
            err,
            TemplateConfigError::Template(TemplateError::InvalidProps { .. })
        ));

        let err =
            load_str("[[template]]\nidentifier = \"x\"\ntype = \"A\"\ntitle_fmt = \"stars\"\n")
                .unwrap_err();
        assert!(matches!(
            err,
            TemplateConfigError::Template(TemplateError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_unknown_field() {
        let err = load_str("[[template]]\nidentifier = \"x\"\ntype = \"A\"\ncolour = \"red\"\n")
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateConfigError::Template(TemplateError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let err = load_str("[[template]\n").unwrap_err();
        assert!(matches!(err, TemplateConfigError::ParseError(_)));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = load_str(
            "[[template]]\nidentifier = \"my-person\"\ntype = \"http://schema.org/Person\"\npriority = 1\n",
        )
        .unwrap();
        let merged = with_overrides(overrides);
        assert_eq!(merged.len(), 7);
        let person = merged.get_type("http://schema.org/Person").unwrap();
        assert_eq!(person.identifier, "my-person");
        assert_eq!(merged.iter().next().unwrap().1.identifier, "my-person");
    }
}
