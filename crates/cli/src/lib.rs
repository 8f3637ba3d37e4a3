#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Command-line surface of the `zeus` generator.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use zeus_core::{
    ConfigStore, DEFAULT_CONFIG_FILENAME, Environment, FileConfigStore, HttpMethod,
    InvocationOptions, ModuleStyle, Orchestrator, SubscriptionTransport,
};

const LOG_ENV: &str = "ZEUS_LOG";
const LOG_TARGETS: [&str; 2] = ["zeus_core", "zeus_cli"];

#[derive(Parser, Debug, Clone)]
#[command(
    name = "zeus",
    version,
    about = "Generate a typed GraphQL client from a schema URL or file"
)]
pub struct Cli {
    #[arg(
        value_name = "URL_OR_PATH",
        help = "Schema endpoint URL or schema file. Falls back to the stored value, then a prompt"
    )]
    pub source: Option<String>,

    #[arg(
        value_name = "OUTPUT_DIR",
        default_value = ".",
        help = "Directory the zeus/ bindings directory is created in"
    )]
    pub output_dir: PathBuf,

    #[arg(
        long = "header",
        short = 'H',
        value_name = "NAME: VALUE",
        help = "Header sent with the schema request. May be repeated"
    )]
    pub headers: Vec<String>,

    #[arg(long, short = 'n', help = "Generate bindings for Node.js instead of the browser")]
    pub node: bool,

    #[arg(long = "esModule", short = 'e', help = "Use ES module imports with .js suffixes")]
    pub es_module: bool,

    #[arg(
        long,
        short = 'g',
        value_name = "PATH",
        help = "Also write the schema text to PATH (.graphql/.gql file or directory)"
    )]
    pub graphql: Option<PathBuf>,

    #[arg(
        long = "jsonSchema",
        value_name = "PATH",
        help = "Also write a JSON Schema document to PATH (.json file or directory)"
    )]
    pub json_schema: Option<PathBuf>,

    #[arg(long = "constEnums", help = "Generate `const enum` declarations")]
    pub const_enums: bool,

    #[arg(long = "typedDocumentNode", help = "Also write the typedDocumentNode.ts plugin")]
    pub typed_document_node: bool,

    #[arg(
        long,
        value_name = "graphql-ws|legacy",
        help = "Subscription transport. Anything other than graphql-ws means legacy"
    )]
    pub subscriptions: Option<String>,

    #[arg(
        long,
        value_name = "GET|POST",
        help = "HTTP method for the schema request. Anything other than GET means POST"
    )]
    pub method: Option<String>,

    #[arg(
        long = "config",
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_FILENAME,
        help = "File the schema source is remembered in"
    )]
    pub config: PathBuf,

    #[arg(long = "noSave", help = "Don't remember the schema source for later runs")]
    pub no_save: bool,
}

impl Cli {
    /// Map parsed arguments to pipeline options.
    pub fn to_options(&self) -> InvocationOptions {
        InvocationOptions {
            source: self.source.clone(),
            output_dir: self.output_dir.clone(),
            headers: self.headers.clone(),
            method: HttpMethod::normalize(self.method.as_deref()),
            environment: Environment::from_node_flag(self.node),
            module_style: ModuleStyle::from_es_module_flag(self.es_module),
            const_enums: self.const_enums,
            subscriptions: SubscriptionTransport::from_flag(self.subscriptions.as_deref()),
            graphql: self.graphql.clone(),
            json_schema: self.json_schema.clone(),
            typed_document_node: self.typed_document_node,
            save_on_input: !self.no_save,
        }
    }
}

/// Parse `args` (program name first), run the pipeline and return the
/// process exit code.
pub async fn run<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => {
            init_tracing();
            execute(&cli).await
        }
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Run one invocation for already parsed arguments.
pub async fn execute(cli: &Cli) -> i32 {
    let store: Arc<dyn ConfigStore> = Arc::new(FileConfigStore::load(&cli.config));
    let options = cli.to_options();
    debug!(?options, "Starting invocation.");

    match Orchestrator::new(store).run(&options).await {
        Ok(report) => {
            for path in &report.written {
                println!("Wrote {}", path.display());
            }
            if report.is_success() {
                0
            } else {
                for failure in &report.failures {
                    eprintln!("{failure}");
                }
                1
            }
        }
        Err(err) => {
            eprintln!("Error during {} stage: {err}", err.stage());
            1
        }
    }
}

pub fn init_tracing() {
    // ZEUS_LOG controls log level: "trace", "debug", "info", "warn", "error"
    // or a full tracing filter spec like "zeus_core=debug,reqwest=warn"
    let filter = match std::env::var(LOG_ENV) {
        Ok(level) if is_plain_level(&level) => scoped_filter(&level),
        Ok(spec) => spec,
        Err(_) => scoped_filter("info"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn scoped_filter(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_plain_level() {
        assert!(is_plain_level("debug"));
        assert!(is_plain_level("WARN"));
        assert!(!is_plain_level("zeus_core=debug"));
    }

    #[test]
    fn test_scoped_filter() {
        assert_eq!(scoped_filter("debug"), "zeus_core=debug,zeus_cli=debug");
    }
}
