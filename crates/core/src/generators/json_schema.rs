//! JSON Schema (draft-07) rendition of the schema tree.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value, json};

use super::{GeneratedArtifact, Generator, GeneratorInput};
use crate::error::ZeusError;
use crate::options::InvocationOptions;
use crate::output::OutputDestination;
use crate::tree::{FieldNode, NodeKind, SchemaTree, TypeNode, TypeRef};

pub const JSON_EXTENSIONS: [&str; 1] = [".json"];
pub const DEFAULT_FILENAME: &str = "schema.json";

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";
const NAME: &str = "json-schema";

/// Writes a JSON Schema document when `--jsonSchema` is given.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSchemaGenerator;

impl Generator for JsonSchemaGenerator {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_requested(&self, options: &InvocationOptions) -> bool {
        options.json_schema.is_some()
    }

    fn generate(
        &self,
        input: &GeneratorInput<'_>,
        options: &InvocationOptions,
    ) -> Result<Vec<GeneratedArtifact>, ZeusError> {
        let Some(path) = &options.json_schema else {
            return Ok(vec![]);
        };
        let document = to_json_schema(input.tree).map_err(|reason| ZeusError::generator(NAME, reason))?;
        let content = to_pretty_json(&document).map_err(|reason| ZeusError::generator(NAME, reason))?;

        let dest = OutputDestination::resolve(path, &JSON_EXTENSIONS, DEFAULT_FILENAME);
        Ok(vec![GeneratedArtifact {
            directory: dest.directory,
            filename: dest.filename,
            content,
        }])
    }
}

/// Serialize with 4-space indentation.
fn to_pretty_json(value: &Value) -> Result<String, String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut ser)
        .map_err(|err| format!("Failed to serialize JSON schema: {err}"))?;
    String::from_utf8(buf).map_err(|err| format!("JSON schema is not UTF-8: {err}"))
}

/// Build the draft-07 document: one definition per named type and one root
/// property per operation.
pub fn to_json_schema(tree: &SchemaTree) -> Result<Value, String> {
    let mut definitions = Map::new();
    for node in &tree.nodes {
        definitions.insert(node.name.clone(), definition(tree, node)?);
    }

    let properties: Map<String, Value> = tree
        .operations
        .iter()
        .map(|(op, name)| (op.to_string(), type_ref(name)))
        .collect();

    Ok(json!({
        "$schema": DRAFT_07,
        "type": "object",
        "properties": properties,
        "definitions": definitions,
    }))
}

fn type_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/definitions/{name}") })
}

fn with_description(mut schema: Value, description: Option<&String>) -> Value {
    if let (Some(description), Some(obj)) = (description, schema.as_object_mut()) {
        obj.insert("description".into(), Value::String(description.clone()));
    }
    schema
}

fn definition(tree: &SchemaTree, node: &TypeNode) -> Result<Value, String> {
    let schema = match &node.kind {
        NodeKind::Object { fields, .. } | NodeKind::Interface { fields } => {
            object_schema(tree, fields, output_field)?
        }
        NodeKind::InputObject { fields } => object_schema(tree, fields, input_field)?,
        NodeKind::Union { members } => {
            let mut variants = Vec::new();
            for member in members {
                if !tree.is_known(member) {
                    return Err(format!("Union '{}' refers to undefined type '{member}'", node.name));
                }
                variants.push(type_ref(member));
            }
            json!({ "anyOf": variants })
        }
        NodeKind::Enum { values } => json!({
            "type": "string",
            "enum": values.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
        }),
        NodeKind::Scalar => json!({ "title": node.name }),
    };
    Ok(with_description(schema, node.description.as_ref()))
}

fn object_schema(
    tree: &SchemaTree,
    fields: &[FieldNode],
    field_schema: fn(&SchemaTree, &FieldNode) -> Result<Value, String>,
) -> Result<Value, String> {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        properties.insert(field.name.clone(), field_schema(tree, field)?);
        if field.ty.is_non_null() {
            required.push(field.name.clone());
        }
    }
    Ok(json!({
        "type": "object",
        "properties": properties,
        "required": required,
    }))
}

/// Output fields carry their return type and, if any, their arguments.
fn output_field(tree: &SchemaTree, field: &FieldNode) -> Result<Value, String> {
    let returns = type_schema(tree, &field.ty)?;
    let schema = if field.args.is_empty() {
        returns
    } else {
        json!({
            "type": "object",
            "properties": {
                "return": returns,
                "arguments": object_schema(tree, &field.args, input_field)?,
            },
        })
    };
    Ok(with_description(schema, field.description.as_ref()))
}

fn input_field(tree: &SchemaTree, field: &FieldNode) -> Result<Value, String> {
    let mut schema = type_schema(tree, &field.ty)?;
    if let (Some(default), Some(obj)) = (&field.default_value, schema.as_object_mut()) {
        obj.insert("default".into(), Value::String(default.clone()));
    }
    Ok(with_description(schema, field.description.as_ref()))
}

fn type_schema(tree: &SchemaTree, ty: &TypeRef) -> Result<Value, String> {
    match ty {
        TypeRef::NonNull(inner) => type_schema(tree, inner),
        TypeRef::List(inner) => Ok(json!({ "type": "array", "items": type_schema(tree, inner)? })),
        TypeRef::Named(name) => match name.as_str() {
            "String" | "ID" => Ok(json!({ "type": "string" })),
            "Int" => Ok(json!({ "type": "integer" })),
            "Float" => Ok(json!({ "type": "number" })),
            "Boolean" => Ok(json!({ "type": "boolean" })),
            other if tree.get(other).is_some() => Ok(type_ref(other)),
            other => Err(format!("Reference to undefined type '{other}'")),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::source::ResolvedSource;
    use crate::tree::{GraphqlSchemaParser, SchemaParser};

    const SCHEMA: &str = r#"
type Query {
  "Current user"
  me: User
  users(first: Int = 10): [User!]!
}

type User {
  id: ID!
  role: Role
}

enum Role {
  ADMIN
  MEMBER
}
"#;

    fn generate(text: &str, json_schema: &str) -> Result<Vec<GeneratedArtifact>, ZeusError> {
        let tree = GraphqlSchemaParser.parse(text).unwrap();
        let source = ResolvedSource::classify("schema.graphql");
        let input = GeneratorInput {
            text,
            tree: &tree,
            source: &source,
        };
        let options = InvocationOptions {
            json_schema: Some(PathBuf::from(json_schema)),
            ..InvocationOptions::default()
        };
        JsonSchemaGenerator.generate(&input, &options)
    }

    #[test]
    fn test_document_shape() {
        let tree = GraphqlSchemaParser.parse(SCHEMA).unwrap();
        let doc = to_json_schema(&tree).unwrap();

        assert_eq!(doc["$schema"], DRAFT_07);
        assert_eq!(doc["properties"]["query"]["$ref"], "#/definitions/Query");
        assert!(doc["properties"].get("mutation").is_none());

        let user = &doc["definitions"]["User"];
        assert_eq!(user["type"], "object");
        assert_eq!(user["properties"]["id"]["type"], "string");
        assert_eq!(user["properties"]["role"]["$ref"], "#/definitions/Role");
        assert_eq!(user["required"], json!(["id"]));

        assert_eq!(doc["definitions"]["Role"]["enum"], json!(["ADMIN", "MEMBER"]));
    }

    #[test]
    fn test_fields_with_arguments() {
        let tree = GraphqlSchemaParser.parse(SCHEMA).unwrap();
        let doc = to_json_schema(&tree).unwrap();
        let query = &doc["definitions"]["Query"]["properties"];

        assert_eq!(query["me"]["description"], "Current user");
        let users = &query["users"]["properties"];
        assert_eq!(users["return"]["type"], "array");
        assert_eq!(users["return"]["items"]["$ref"], "#/definitions/User");
        assert_eq!(users["arguments"]["properties"]["first"]["type"], "integer");
        assert_eq!(users["arguments"]["properties"]["first"]["default"], "10");
    }

    #[test]
    fn test_four_space_indent_and_destination() {
        let artifacts = generate(SCHEMA, "out").unwrap();
        let artifact = &artifacts[0];
        assert_eq!(artifact.path(), PathBuf::from("out/schema.json"));
        assert!(artifact.content.starts_with("{\n    \"$schema\""));

        let artifacts = generate(SCHEMA, "out/api.json").unwrap();
        assert_eq!(artifacts[0].path(), PathBuf::from("out/api.json"));
    }

    #[test]
    fn test_undefined_type_fails() {
        let err = generate("type Query { thing: Missing }", "out").unwrap_err();
        assert!(matches!(
            err,
            ZeusError::GeneratorFailed {
                generator: "json-schema",
                ..
            }
        ));
        assert!(err.to_string().contains("Missing"));
    }
}
