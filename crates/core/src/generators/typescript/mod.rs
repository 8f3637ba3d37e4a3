//! TypeScript client bindings.
//!
//! The schema tree is lowered to a small TypeScript AST (`types`), assembled
//! into modules (`codegen`) and printed through the `Emit` trait (`emit`).

pub mod codegen;
pub mod emit;
pub mod runtime;
pub mod types;
pub mod utils;

use tracing::debug;

use self::codegen::{codegen_const_module, codegen_index_module};
use self::emit::Emit;
use super::{GeneratedArtifact, Generator, GeneratorInput};
use crate::error::ZeusError;
use crate::options::InvocationOptions;

/// Directory under the output directory that holds the binding modules.
pub const BINDINGS_DIR: &str = "zeus";

/// Writes `const.ts` and `index.ts` under `<outputDir>/zeus/`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptGenerator;

impl Generator for TypeScriptGenerator {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn is_requested(&self, _options: &InvocationOptions) -> bool {
        true
    }

    fn generate(
        &self,
        input: &GeneratorInput<'_>,
        options: &InvocationOptions,
    ) -> Result<Vec<GeneratedArtifact>, ZeusError> {
        let host = input.source.is_url().then_some(input.source.value.as_str());
        let directory = options.output_dir.join(BINDINGS_DIR);

        let modules = [
            ("const", codegen_const_module(input.tree)),
            ("index", codegen_index_module(input.tree, options, host)),
        ];
        debug!(
            environment = options.environment.as_str(),
            const_enums = options.const_enums,
            "Generated TypeScript bindings."
        );

        Ok(modules
            .into_iter()
            .map(|(name, module)| GeneratedArtifact {
                directory: directory.clone(),
                filename: format!("{name}.ts"),
                content: module.emit(),
            })
            .collect())
    }
}
