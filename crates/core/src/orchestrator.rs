//! Runs one invocation: resolve, acquire, parse once, generate, write.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, error, info};

use crate::config::ConfigStore;
use crate::error::ZeusError;
use crate::fetch::{FetchOptions, fetch_schema, read_schema_file};
use crate::generators::{Generator, GeneratorInput, registry};
use crate::options::InvocationOptions;
use crate::output::write_artifact;
use crate::source::{ResolvedSource, SourceKind, resolve_source};
use crate::tree::{GraphqlSchemaParser, SchemaParser};

/// Outcome of an invocation that got past parsing.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Every file written, in generator order.
    pub written: Vec<PathBuf>,
    /// One entry per generator that failed to generate or write.
    pub failures: Vec<ZeusError>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Owns the collaborators of a run: config store, parser and generators.
pub struct Orchestrator {
    store: Arc<dyn ConfigStore>,
    parser: Box<dyn SchemaParser>,
    generators: Vec<Box<dyn Generator>>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("store", &self.store)
            .field("parser", &self.parser)
            .field(
                "generators",
                &self.generators.iter().map(|g| g.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Orchestrator {
    /// Orchestrator with the GraphQL parser and the full generator registry.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            parser: Box::new(GraphqlSchemaParser),
            generators: registry(),
        }
    }

    pub fn with_parser(mut self, parser: Box<dyn SchemaParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_generators(mut self, generators: Vec<Box<dyn Generator>>) -> Self {
        self.generators = generators;
        self
    }

    /// Execute one invocation.
    ///
    /// Resolution, acquisition and parse failures are returned as `Err` and
    /// nothing is written. Generator and write failures are isolated per
    /// generator and collected in the [`RunReport`]. A pending save of the
    /// source is awaited last.
    pub async fn run(&self, options: &InvocationOptions) -> Result<RunReport, ZeusError> {
        let (source, pending) =
            resolve_source(options.source.as_deref(), &self.store, options.save_on_input)?;

        let result = self.generate_all(&source, options).await;

        if let Some(pending) = pending {
            pending.finish().await;
        }
        result
    }

    async fn generate_all(
        &self,
        source: &ResolvedSource,
        options: &InvocationOptions,
    ) -> Result<RunReport, ZeusError> {
        let text = acquire(source, options).await?;
        let tree = self.parser.parse(&text)?;
        let input = GeneratorInput {
            text: &text,
            tree: &tree,
            source,
        };

        let requested: Vec<&dyn Generator> = self
            .generators
            .iter()
            .map(AsRef::as_ref)
            .filter(|g| g.is_requested(options))
            .collect();
        debug!(
            generators = ?requested.iter().map(|g| g.name()).collect::<Vec<_>>(),
            "Running generators."
        );

        let outcomes = join_all(
            requested
                .iter()
                .map(|generator| run_generator(*generator, &input, options)),
        )
        .await;

        let mut report = RunReport::default();
        for (generator, outcome) in requested.iter().zip(outcomes) {
            match outcome {
                Ok(paths) => report.written.extend(paths),
                Err(err) => {
                    error!(generator = generator.name(), error = %err, "Generator failed.");
                    report.failures.push(err);
                }
            }
        }

        info!(
            written = report.written.len(),
            failed = report.failures.len(),
            "Generation finished."
        );
        Ok(report)
    }
}

async fn acquire(source: &ResolvedSource, options: &InvocationOptions) -> Result<String, ZeusError> {
    match source.kind {
        SourceKind::Url => {
            let fetch_options = FetchOptions {
                headers: options.headers.clone(),
                method: options.method,
            };
            fetch_schema(&source.value, &fetch_options).await
        }
        SourceKind::Path => read_schema_file(Path::new(&source.value)).await,
    }
}

/// Generate, then write artifacts in order. The first write failure aborts
/// the remaining writes of this generator only.
async fn run_generator(
    generator: &dyn Generator,
    input: &GeneratorInput<'_>,
    options: &InvocationOptions,
) -> Result<Vec<PathBuf>, ZeusError> {
    let artifacts = generator.generate(input, options)?;
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        let path = write_artifact(&artifact.directory, &artifact.filename, &artifact.content).await?;
        written.push(path);
    }
    debug!(generator = generator.name(), files = written.len(), "Generator finished.");
    Ok(written)
}
