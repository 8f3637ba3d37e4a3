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

//! Schema acquisition and client code generation for GraphQL APIs.
//!
//! One invocation resolves a schema source, fetches or reads the schema,
//! parses it once and hands the result to every requested generator.

pub mod config;
pub mod error;
pub mod fetch;
pub mod generators;
pub mod introspection;
pub mod options;
pub mod orchestrator;
pub mod output;
pub mod source;
pub mod tree;

pub use config::{ConfigStore, DEFAULT_CONFIG_FILENAME, FileConfigStore, MemoryConfigStore};
pub use error::ZeusError;
pub use generators::{GeneratedArtifact, Generator, GeneratorInput};
pub use options::{Environment, HttpMethod, InvocationOptions, ModuleStyle, SubscriptionTransport};
pub use orchestrator::{Orchestrator, RunReport};
pub use source::{ResolvedSource, SourceKind};
pub use tree::{GraphqlSchemaParser, SchemaParser, SchemaTree};
