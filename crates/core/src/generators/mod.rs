//! Artifact generators.
//!
//! Every generator receives the same schema text and the same parsed tree.
//! Generators never write to disk themselves; they return artifacts and the
//! orchestrator writes them.

pub mod json_schema;
pub mod schema_mirror;
pub mod typed_document_node;
pub mod typescript;

use std::fmt::Debug;
use std::path::PathBuf;

use crate::error::ZeusError;
use crate::options::InvocationOptions;
use crate::source::ResolvedSource;
use crate::tree::SchemaTree;

pub use json_schema::JsonSchemaGenerator;
pub use schema_mirror::SchemaMirror;
pub use typed_document_node::TypedDocumentNodeGenerator;
pub use typescript::TypeScriptGenerator;

/// Shared, read-only input handed to every generator.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorInput<'a> {
    /// Schema text exactly as acquired.
    pub text: &'a str,
    /// The tree parsed once from `text`.
    pub tree: &'a SchemaTree,
    pub source: &'a ResolvedSource,
}

/// One file produced by a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Directory the file goes into, relative to the working directory
    /// unless the user gave an absolute path.
    pub directory: PathBuf,
    pub filename: String,
    pub content: String,
}

impl GeneratedArtifact {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// A unit that turns the parsed schema into zero or more artifacts.
pub trait Generator: Send + Sync + Debug {
    /// Stable name used in logs and failure reports.
    fn name(&self) -> &'static str;

    /// Whether this invocation asked for this generator's output.
    fn is_requested(&self, options: &InvocationOptions) -> bool;

    fn generate(
        &self,
        input: &GeneratorInput<'_>,
        options: &InvocationOptions,
    ) -> Result<Vec<GeneratedArtifact>, ZeusError>;
}

/// The fixed generator set, in registration order.
pub fn registry() -> Vec<Box<dyn Generator>> {
    vec![
        Box::new(SchemaMirror),
        Box::new(JsonSchemaGenerator),
        Box::new(TypeScriptGenerator),
        Box::new(TypedDocumentNodeGenerator),
    ]
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_registry_order() {
        let names: Vec<_> = registry().iter().map(|g| g.name()).collect();
        assert_eq!(
            names,
            ["schema-mirror", "json-schema", "typescript", "typed-document-node"]
        );
    }

    #[test]
    fn test_default_options_request_bindings_only() {
        let options = InvocationOptions::default();
        let requested: Vec<_> = registry()
            .into_iter()
            .filter(|g| g.is_requested(&options))
            .map(|g| g.name())
            .collect();
        assert_eq!(requested, ["typescript"]);
    }

    #[test]
    fn test_every_flag_requests_everything() {
        let options = InvocationOptions {
            graphql: Some(PathBuf::from("out")),
            json_schema: Some(PathBuf::from("out")),
            typed_document_node: true,
            ..InvocationOptions::default()
        };
        assert!(registry().iter().all(|g| g.is_requested(&options)));
    }
}
