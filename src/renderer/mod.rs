//! HTML renderer for structured data
//!
//! This module takes a graph and a template registry and produces HTML with
//! RDFa attributes and CSS classes for styling.

pub mod config;
pub mod html;
pub mod rating;

pub use config::HtmlConfig;
pub use html::{render_html, HtmlBuilder};
pub use rating::{render_rating, Rating};
