//! Error taxonomy for a single generator invocation.
//!
//! The first four variants stop the pipeline before anything is written.
//! Write and generator failures are collected per generator and reported
//! together once every generator has finished.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving, acquiring, parsing or emitting a schema.
#[derive(Debug, Error)]
pub enum ZeusError {
    /// Neither the command line, the persisted config nor a prompt produced a source.
    #[error(
        "No schema source given. Pass a URL or a path to a schema file as the first argument"
    )]
    MissingSchemaSource,

    /// The remote endpoint could not be queried for its schema.
    #[error("Failed to fetch schema from '{url}': {reason}")]
    SchemaFetchFailed { url: String, reason: String },

    /// The local schema file could not be read.
    #[error("Failed to read schema file '{}': {source}", path.display())]
    SchemaSourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The schema text is not a valid schema document.
    #[error("Failed to parse schema: {0}")]
    SchemaParseError(String),

    /// A generated artifact could not be written to disk.
    #[error("Failed to write '{}': {source}", path.display())]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A generator could not turn the schema into its output.
    #[error("Generator '{generator}' failed: {reason}")]
    GeneratorFailed {
        generator: &'static str,
        reason: String,
    },

    /// The persisted configuration could not be read or written.
    #[error("Config store error: {0}")]
    Config(String),
}

impl ZeusError {
    /// Whether this error aborts the invocation before any artifact is written.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingSchemaSource
                | Self::SchemaFetchFailed { .. }
                | Self::SchemaSourceUnreadable { .. }
                | Self::SchemaParseError(_)
        )
    }

    /// Name of the pipeline stage that raised this error.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingSchemaSource => "resolve",
            Self::SchemaFetchFailed { .. } | Self::SchemaSourceUnreadable { .. } => "acquire",
            Self::SchemaParseError(_) => "parse",
            Self::ArtifactWriteFailed { .. } => "write",
            Self::GeneratorFailed { .. } => "generate",
            Self::Config(_) => "config",
        }
    }

    pub(crate) fn generator(generator: &'static str, reason: impl Into<String>) -> Self {
        Self::GeneratorFailed {
            generator,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ZeusError::MissingSchemaSource.is_fatal());
        assert!(ZeusError::SchemaParseError("bad".into()).is_fatal());
        assert!(
            ZeusError::SchemaFetchFailed {
                url: "https://x".into(),
                reason: "boom".into()
            }
            .is_fatal()
        );
        assert!(!ZeusError::generator("json-schema", "bad tree").is_fatal());
        assert!(
            !ZeusError::ArtifactWriteFailed {
                path: PathBuf::from("out/schema.json"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_messages_name_the_failing_path() {
        let err = ZeusError::SchemaSourceUnreadable {
            path: PathBuf::from("./missing.graphql"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("./missing.graphql"));
        assert_eq!(err.stage(), "acquire");
    }
}
