//! Literal humanization with datatype inference
//!
//! Typed literals are formatted by the humanizer of their datatype. Literals
//! without a datatype are sniffed: the lexical form is tried against a fixed
//! sequence of grammars and the first match decides the datatype used for
//! formatting. The trial order is part of the public contract:
//!
//! 1. `xsd:duration` (most distinctive, tried first)
//! 2. `xsd:date`
//! 3. `xsd:time`
//! 4. `xsd:dateTime`
//! 5. a lenient ISO-8601 date-time form (optional seconds, fractional seconds
//!    and a `+hh:mm`/`-hh:mm`/`UTC`/`Z` suffix), read as `xsd:dateTime`
//!
//! Anything that matches no grammar is rendered verbatim.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;

use crate::parser::ast::Literal;

/// XML Schema namespace
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(-)?P(?:([0-9]+)Y)?(?:([0-9]+)M)?(?:([0-9]+)D)?(T(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+(?:\.[0-9]+)?)S)?)?$",
    )
    .expect("duration grammar is valid")
});

static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?[0-9]{4})-([0-9]{2})-([0-9]{2})((?:[+\-][0-9]{2}:[0-9]{2})|UTC|Z)?$")
        .expect("date grammar is valid")
});

static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2})(\.[0-9]+)?((?:[+\-][0-9]{2}:[0-9]{2})|UTC|Z)?$")
        .expect("time grammar is valid")
});

static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(-?[0-9]{4})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2}):([0-9]{2})(\.[0-9]+)?((?:[+\-][0-9]{2}:[0-9]{2})|UTC|Z)?$",
    )
    .expect("dateTime grammar is valid")
});

static LENIENT_DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(-?[0-9]{4})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2})(?::([0-9]{2}))?(\.[0-9]+)?((?:[+\-][0-9]{2}:[0-9]{2})|UTC|Z)?$",
    )
    .expect("lenient dateTime grammar is valid")
});

/// Datatypes with a dedicated humanizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XsdDatatype {
    Duration,
    Date,
    Time,
    DateTime,
    Boolean,
}

impl XsdDatatype {
    /// Full datatype IRI
    pub fn iri(&self) -> String {
        let local = match self {
            XsdDatatype::Duration => "duration",
            XsdDatatype::Date => "date",
            XsdDatatype::Time => "time",
            XsdDatatype::DateTime => "dateTime",
            XsdDatatype::Boolean => "boolean",
        };
        format!("{}{}", XSD, local)
    }

    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri.strip_prefix(XSD)? {
            "duration" => Some(XsdDatatype::Duration),
            "date" => Some(XsdDatatype::Date),
            "time" => Some(XsdDatatype::Time),
            "dateTime" => Some(XsdDatatype::DateTime),
            "boolean" => Some(XsdDatatype::Boolean),
            _ => None,
        }
    }
}

/// One step of the inference sequence, in trial order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inference {
    Duration,
    Date,
    Time,
    DateTime,
    LenientDateTime,
}

/// Grammars tried for untyped literals, first match wins
pub const INFERENCE_ORDER: [Inference; 5] = [
    Inference::Duration,
    Inference::Date,
    Inference::Time,
    Inference::DateTime,
    Inference::LenientDateTime,
];

impl Inference {
    /// Whether the lexical form matches this step's grammar
    pub fn matches(&self, lexical: &str) -> bool {
        match self {
            Inference::Duration => parse_duration(lexical).is_some(),
            Inference::Date => DATE.is_match(lexical),
            Inference::Time => TIME.is_match(lexical),
            Inference::DateTime => DATE_TIME.is_match(lexical),
            Inference::LenientDateTime => LENIENT_DATE_TIME.is_match(lexical),
        }
    }

    /// Datatype assigned when this step matches
    pub fn datatype(&self) -> XsdDatatype {
        match self {
            Inference::Duration => XsdDatatype::Duration,
            Inference::Date => XsdDatatype::Date,
            Inference::Time => XsdDatatype::Time,
            Inference::DateTime | Inference::LenientDateTime => XsdDatatype::DateTime,
        }
    }
}

/// First grammar in [`INFERENCE_ORDER`] matching the lexical form
pub fn infer(lexical: &str) -> Option<Inference> {
    INFERENCE_ORDER.iter().copied().find(|step| {
        let hit = step.matches(lexical);
        trace!(?step, lexical, hit, "literal grammar trial");
        hit
    })
}

/// Datatype inferred for an untyped lexical form
pub fn infer_datatype(lexical: &str) -> Option<XsdDatatype> {
    infer(lexical).map(|step| step.datatype())
}

/// Display string for a literal
///
/// Untyped literals are re-typed by [`infer`] and humanized again; when no
/// grammar matches the raw lexical form is returned unchanged.
pub fn humanize(literal: &Literal) -> String {
    match &literal.datatype {
        Some(datatype) => humanize_typed(datatype, &literal.lexical),
        None => match infer(&literal.lexical) {
            Some(step) => {
                let typed = Literal::typed(literal.lexical.clone(), step.datatype().iri());
                humanize(&typed)
            }
            None => literal.lexical.clone(),
        },
    }
}

/// Humanize a lexical form for an explicit datatype
///
/// Unknown datatypes, and lexical forms invalid for their datatype, come back
/// verbatim.
pub fn humanize_typed(datatype: &str, lexical: &str) -> String {
    let formatted = match XsdDatatype::from_iri(datatype) {
        Some(XsdDatatype::Duration) => parse_duration(lexical).map(|d| d.humanize()),
        Some(XsdDatatype::Date) => humanize_date(lexical),
        Some(XsdDatatype::Time) => humanize_time(lexical),
        Some(XsdDatatype::DateTime) => humanize_date_time(lexical),
        Some(XsdDatatype::Boolean) => humanize_boolean(lexical),
        None => None,
    };
    formatted.unwrap_or_else(|| lexical.to_string())
}

/// Parsed `xsd:duration` components, kept as written
#[derive(Debug, Clone, PartialEq)]
struct Duration {
    negative: bool,
    parts: Vec<(String, &'static str)>,
}

fn parse_duration(lexical: &str) -> Option<Duration> {
    let caps = DURATION.captures(lexical)?;
    const UNITS: [(usize, &str); 6] = [
        (2, "year"),
        (3, "month"),
        (4, "day"),
        (6, "hour"),
        (7, "minute"),
        (8, "second"),
    ];
    let parts: Vec<(String, &'static str)> = UNITS
        .iter()
        .filter_map(|&(group, unit)| caps.get(group).map(|m| (m.as_str().to_string(), unit)))
        .collect();

    // "P" alone, or a "T" with no time component, is not a duration
    let has_time_marker = caps.get(5).is_some();
    let has_time_part = [6, 7, 8].iter().any(|&g| caps.get(g).is_some());
    if parts.is_empty() || (has_time_marker && !has_time_part) {
        return None;
    }

    Some(Duration {
        negative: caps.get(1).is_some(),
        parts,
    })
}

impl Duration {
    fn humanize(&self) -> String {
        let words: Vec<String> = self
            .parts
            .iter()
            .map(|(amount, unit)| {
                if amount == "1" {
                    format!("{} {}", amount, unit)
                } else {
                    format!("{} {}s", amount, unit)
                }
            })
            .collect();

        let joined = match words.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} and {}", rest.join(", "), last),
            Some((last, _)) => last.clone(),
            None => String::new(),
        };

        if self.negative {
            format!("minus {}", joined)
        } else {
            joined
        }
    }
}

/// Trailing `" UTC"` / `" +02:00"` for a captured zone
fn zone_suffix(zone: Option<regex::Match<'_>>) -> String {
    match zone.map(|m| m.as_str()) {
        Some("Z") | Some("UTC") => " UTC".to_string(),
        Some(offset) => format!(" {}", offset),
        None => String::new(),
    }
}

fn capture_num<T: std::str::FromStr>(caps: &Captures<'_>, group: usize) -> Option<T> {
    caps.get(group)?.as_str().parse().ok()
}

fn date_from(caps: &Captures<'_>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        capture_num(caps, 1)?,
        capture_num(caps, 2)?,
        capture_num(caps, 3)?,
    )
}

fn humanize_date(lexical: &str) -> Option<String> {
    let caps = DATE.captures(lexical)?;
    let date = date_from(&caps)?;
    Some(format!(
        "{}{}",
        date.format("%A, %d %B %Y"),
        zone_suffix(caps.get(4))
    ))
}

fn humanize_time(lexical: &str) -> Option<String> {
    let caps = TIME.captures(lexical)?;
    let time = NaiveTime::from_hms_opt(
        capture_num(&caps, 1)?,
        capture_num(&caps, 2)?,
        capture_num(&caps, 3)?,
    )?;
    Some(format!("{}{}", time.format("%r"), zone_suffix(caps.get(5))))
}

fn humanize_date_time(lexical: &str) -> Option<String> {
    let caps = LENIENT_DATE_TIME.captures(lexical)?;
    let date = date_from(&caps)?;
    let seconds = match caps.get(6) {
        Some(_) => capture_num(&caps, 6)?,
        None => 0,
    };
    let time = NaiveTime::from_hms_opt(capture_num(&caps, 4)?, capture_num(&caps, 5)?, seconds)?;
    Some(format!(
        "{} on {}{}",
        time.format("%r"),
        date.format("%A, %d %B %Y"),
        zone_suffix(caps.get(8))
    ))
}

fn humanize_boolean(lexical: &str) -> Option<String> {
    match lexical.trim() {
        "true" | "1" => Some("true".to_string()),
        "false" | "0" => Some("false".to_string()),
        _ => None,
    }
}
