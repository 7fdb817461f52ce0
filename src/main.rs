//! RDF Linter CLI
//!
//! Usage:
//!   rdf-linter [OPTIONS] [FILE]
//!
//! Options:
//!   -t, --templates <FILE>  Additional templates (TOML format)
//!   -d, --debug             Log template resolution to stderr
//!   --fragment              Emit an HTML fragment instead of a document
//!   --no-extracted          Omit the serialized graph panel
//!   --list-templates        List the effective templates and exit
//!   --matches               Print matched template identifiers to stderr
//!   -h, --help              Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rdf_linter::templates;
use rdf_linter::{render_pass, HtmlConfig, RenderConfig, RenderError};

#[derive(Parser)]
#[command(name = "rdf-linter")]
#[command(about = "Render structured data as HTML+RDFa using type-keyed templates")]
struct Cli {
    /// Input N-Triples file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Additional templates (TOML format), taking precedence over built-in ones
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Log template resolution to stderr
    #[arg(short, long)]
    debug: bool,

    /// Emit an HTML fragment instead of a complete document
    #[arg(long)]
    fragment: bool,

    /// Omit the serialized graph panel
    #[arg(long)]
    no_extracted: bool,

    /// List the effective templates and exit
    #[arg(long)]
    list_templates: bool,

    /// Print matched template identifiers to stderr after rendering
    #[arg(long)]
    matches: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // Load templates
    let mut config = RenderConfig::new().with_html(
        HtmlConfig::new()
            .with_standalone(!cli.fragment)
            .with_extracted(!cli.no_extracted),
    );
    if let Some(path) = &cli.templates {
        match templates::load_file(path) {
            Ok(overrides) => config = config.with_template_overrides(overrides),
            Err(e) => {
                eprintln!("Error loading templates '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    if cli.list_templates {
        for (key, template) in config.templates.iter() {
            println!("{:>3}  {}  {}", template.priority(), template.identifier, key);
        }
        return;
    }

    // Interactive stdin with no input file: tell the user where input is read from
    if cli.input.is_none() && io::stdin().is_terminal() {
        eprintln!("rdf-linter: reading N-Triples from stdin (run with --help for usage)");
    }

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    match render_pass(&source, &config) {
        Ok(output) => {
            println!("{}", output.html);
            if cli.matches {
                for identifier in output.matched_templates.as_slice() {
                    eprintln!("matched: {}", identifier);
                }
            }
        }
        Err(RenderError::Parse(errors)) => {
            for error in &errors {
                eprint!("{}", error.format(&source, &filename));
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("rdf_linter=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
