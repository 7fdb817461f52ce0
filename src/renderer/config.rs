//! Configuration for HTML rendering

/// Configuration options for HTML+RDFa output
#[derive(Debug, Clone)]
pub struct HtmlConfig {
    /// Whether to wrap output in a complete HTML document
    pub standalone: bool,

    /// Whether to put each top-level block on its own indented line
    pub pretty_print: bool,

    /// Prefix for CSS class names (e.g., "rl-" for "rl-subject")
    pub class_prefix: Option<String>,

    /// Whether to append the serialized graph after the rendered subjects
    pub show_extracted: bool,

    /// Document title used when standalone
    pub title: String,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            standalone: true,
            pretty_print: true,
            class_prefix: Some("rl-".to_string()),
            show_extracted: true,
            title: "Structured Data".to_string(),
        }
    }
}

impl HtmlConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether output is standalone
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the CSS class prefix
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Remove the CSS class prefix
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    /// Set whether the extracted graph panel is shown
    pub fn with_extracted(mut self, show: bool) -> Self {
        self.show_extracted = show;
        self
    }

    /// Set the document title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HtmlConfig::default();
        assert!(config.standalone);
        assert!(config.pretty_print);
        assert!(config.show_extracted);
        assert_eq!(config.class_prefix, Some("rl-".to_string()));
    }

    #[test]
    fn test_builder_pattern() {
        let config = HtmlConfig::new()
            .with_standalone(false)
            .with_pretty_print(false)
            .with_extracted(false)
            .with_class_prefix("my-")
            .with_title("Reviews");

        assert!(!config.standalone);
        assert!(!config.pretty_print);
        assert!(!config.show_extracted);
        assert_eq!(config.class_prefix, Some("my-".to_string()));
        assert_eq!(config.title, "Reviews");
    }
}
