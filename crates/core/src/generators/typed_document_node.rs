//! `typedDocumentNode.ts`: builds typed `DocumentNode`s from Zeus selections.

use super::typescript::BINDINGS_DIR;
use super::typescript::emit::Emit;
use super::typescript::types::{TsImport, TsModule, TsStmt};
use super::typescript::utils::sibling_import;
use super::{GeneratedArtifact, Generator, GeneratorInput};
use crate::error::ZeusError;
use crate::options::{InvocationOptions, ModuleStyle};

pub const FILENAME: &str = "typedDocumentNode.ts";

const RUNTIME_IMPORTS: [&str; 9] = [
    "ValueTypes",
    "GenericOperation",
    "OperationOptions",
    "GraphQLTypes",
    "InputType",
    "ScalarDefinition",
    "ThunderGraphQLOptions",
    "Zeus",
    "ExtractVariables",
];

const TYPED_GQL: &str = r#"
export const typedGql =
  <O extends keyof typeof Ops, SCLR extends ScalarDefinition, R extends keyof ValueTypes = GenericOperation<O>>(
    operation: O,
    graphqlOptions?: ThunderGraphQLOptions<SCLR>,
  ) =>
  <Z extends ValueTypes[R]>(
    o: Z & {
      [P in keyof Z]: P extends keyof ValueTypes[R] ? Z[P] : never;
    },
    ops?: OperationOptions,
  ) => {
    const str = Zeus(operation, o, {
      operationOptions: ops,
      scalars: graphqlOptions?.scalars,
    });
    return gql(str) as TypedDocumentNode<InputType<GraphQLTypes[R], Z, SCLR>, ExtractVariables<Z>>;
  };
"#;

/// Writes the typed-query plugin next to the bindings when
/// `--typedDocumentNode` is given.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypedDocumentNodeGenerator;

impl Generator for TypedDocumentNodeGenerator {
    fn name(&self) -> &'static str {
        "typed-document-node"
    }

    fn is_requested(&self, options: &InvocationOptions) -> bool {
        options.typed_document_node
    }

    fn generate(
        &self,
        _input: &GeneratorInput<'_>,
        options: &InvocationOptions,
    ) -> Result<Vec<GeneratedArtifact>, ZeusError> {
        Ok(vec![GeneratedArtifact {
            directory: options.output_dir.join(BINDINGS_DIR),
            filename: FILENAME.to_string(),
            content: codegen_plugin_module(options).emit(),
        }])
    }
}

fn codegen_plugin_module(options: &InvocationOptions) -> TsModule {
    let js_extensions = options.uses_js_extensions();

    let gql = if options.module_style == ModuleStyle::EsModule {
        TsImport::named(&["gql"], "graphql-tag")
    } else {
        TsImport::default_binding("gql", "graphql-tag")
    };
    let index = if js_extensions { "./index.js" } else { "./" };

    TsModule {
        header: vec!["/* eslint-disable */".to_string()],
        imports: vec![
            TsImport::named(&["TypedDocumentNode"], "@graphql-typed-document-node/core"),
            gql,
            TsImport::named(&RUNTIME_IMPORTS, index),
            TsImport::named(&["Ops"], sibling_import("const", js_extensions)),
        ],
        statements: vec![TsStmt::Raw(TYPED_GQL.to_string())],
        types: vec![],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::options::Environment;

    #[test]
    fn test_commonjs_browser_imports() {
        let output = codegen_plugin_module(&InvocationOptions::default()).emit();
        assert!(output.contains("import gql from \"graphql-tag\";"));
        assert!(output.contains("Zeus, ExtractVariables } from \"./\";"));
        assert!(output.contains("import { Ops } from \"./const\";"));
        assert!(output.contains("export const typedGql ="));
        assert!(output.contains("InputType<GraphQLTypes[R], Z, SCLR>"));
    }

    #[test]
    fn test_es_module_imports() {
        let options = InvocationOptions {
            module_style: ModuleStyle::EsModule,
            ..InvocationOptions::default()
        };
        let output = codegen_plugin_module(&options).emit();
        assert!(output.contains("import { gql } from \"graphql-tag\";"));
        assert!(output.contains("from \"./index.js\";"));
        assert!(output.contains("import { Ops } from \"./const.js\";"));
    }

    #[test]
    fn test_node_uses_js_suffix_with_default_gql() {
        let options = InvocationOptions {
            environment: Environment::Node,
            ..InvocationOptions::default()
        };
        let output = codegen_plugin_module(&options).emit();
        assert!(output.contains("import gql from \"graphql-tag\";"));
        assert!(output.contains("from \"./index.js\";"));
    }

    #[test]
    fn test_artifact_location() {
        let options = InvocationOptions {
            output_dir: PathBuf::from("src"),
            typed_document_node: true,
            ..InvocationOptions::default()
        };
        let tree = crate::tree::SchemaTree::default();
        let source = crate::source::ResolvedSource::classify("schema.graphql");
        let input = GeneratorInput {
            text: "",
            tree: &tree,
            source: &source,
        };
        let artifacts = TypedDocumentNodeGenerator.generate(&input, &options).unwrap();
        assert_eq!(artifacts[0].path(), PathBuf::from("src/zeus/typedDocumentNode.ts"));
    }
}
