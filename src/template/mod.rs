//! Template resolution and ranking engine
//!
//! This module picks a display template for each subject, orders subjects by
//! template priority and partitions their properties into display groups.
//!
//! # Example
//!
//! ```
//! use rdf_linter::template::{
//!     PassContext, Template, TemplateKey, TemplateRegistry, TemplateResolver,
//! };
//!
//! let mut registry = TemplateRegistry::new();
//! registry.insert(TemplateKey::set(["Book"]), Template::new("book").with_priority(1));
//! registry.insert(
//!     TemplateKey::set(["Book", "Review"]),
//!     Template::new("book-review").with_priority(5),
//! );
//!
//! let mut ctx = PassContext::new();
//! let types = vec!["Book".to_string(), "Review".to_string()];
//! let found = TemplateResolver::new(&registry).resolve(&types, &mut ctx);
//! assert_eq!(found.unwrap().identifier, "book-review");
//! ```

mod context;
mod grouper;
mod order;
mod registry;
mod resolver;

pub use context::{MatchRecord, PassContext};
pub use grouper::{GroupRequest, PropertyGroup, PropertyGrouper, BODY, DESCRIPTION, NESTED, TITLE};
pub use order::SubjectOrderer;
pub use registry::{
    FormatFn, GroupFormat, Template, TemplateError, TemplateKey, TemplateRegistry,
    DEFAULT_PRIORITY,
};
pub use resolver::{combinations, Combinations, TemplateResolver};
