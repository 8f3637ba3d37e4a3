//! Copies the acquired schema text to a `.graphql` destination.

use super::{GeneratedArtifact, Generator, GeneratorInput};
use crate::error::ZeusError;
use crate::options::InvocationOptions;
use crate::output::OutputDestination;

pub const GRAPHQL_EXTENSIONS: [&str; 2] = [".graphql", ".gql"];
pub const DEFAULT_FILENAME: &str = "schema.graphql";

/// Writes the schema text verbatim when `--graphql` is given.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaMirror;

impl Generator for SchemaMirror {
    fn name(&self) -> &'static str {
        "schema-mirror"
    }

    fn is_requested(&self, options: &InvocationOptions) -> bool {
        options.graphql.is_some()
    }

    fn generate(
        &self,
        input: &GeneratorInput<'_>,
        options: &InvocationOptions,
    ) -> Result<Vec<GeneratedArtifact>, ZeusError> {
        let Some(path) = &options.graphql else {
            return Ok(vec![]);
        };
        let dest = OutputDestination::resolve(path, &GRAPHQL_EXTENSIONS, DEFAULT_FILENAME);
        Ok(vec![GeneratedArtifact {
            directory: dest.directory,
            filename: dest.filename,
            content: input.text.to_string(),
        }])
    }
}
