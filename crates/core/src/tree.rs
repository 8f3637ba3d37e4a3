//! Language-agnostic schema tree shared by every generator.
//!
//! The tree is produced once per invocation by a [`SchemaParser`] and handed
//! out by shared reference. It keeps definition order so generated output is
//! stable between runs.

use graphql_parser::schema::{
    Definition, Document, EnumValue, Field, InputValue, SchemaDefinition, Type, TypeDefinition,
    TypeExtension, parse_schema,
};
use tracing::debug;

use crate::error::ZeusError;

/// Scalars every schema has without declaring them.
pub const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// Reference to a type from a field or argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// Name of the innermost named type.
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }
}

/// A field of an object, interface or input object, or a field argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNode {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub args: Vec<FieldNode>,
    /// Default value as written in the schema, for arguments and input fields.
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueNode {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Object {
        interfaces: Vec<String>,
        fields: Vec<FieldNode>,
    },
    Interface {
        fields: Vec<FieldNode>,
    },
    Union {
        members: Vec<String>,
    },
    Enum {
        values: Vec<EnumValueNode>,
    },
    InputObject {
        fields: Vec<FieldNode>,
    },
    Scalar,
}

/// A named type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNode {
    pub name: String,
    pub description: Option<String>,
    pub kind: NodeKind,
}

impl TypeNode {
    /// Output or input fields, empty for unions, enums and scalars.
    pub fn fields(&self) -> &[FieldNode] {
        match &self.kind {
            NodeKind::Object { fields, .. }
            | NodeKind::Interface { fields }
            | NodeKind::InputObject { fields } => fields,
            _ => &[],
        }
    }
}

/// Root operation type names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationRoots {
    pub query: Option<String>,
    pub mutation: Option<String>,
    pub subscription: Option<String>,
}

impl OperationRoots {
    /// `(operation, type name)` pairs for the roots that exist.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("query", &self.query),
            ("mutation", &self.mutation),
            ("subscription", &self.subscription),
        ]
        .into_iter()
        .filter_map(|(op, name)| name.as_deref().map(|n| (op, n)))
    }
}

/// The parsed schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaTree {
    pub nodes: Vec<TypeNode>,
    pub operations: OperationRoots,
}

impl SchemaTree {
    pub fn get(&self, name: &str) -> Option<&TypeNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Whether `name` is declared in the schema or is a built-in scalar.
    pub fn is_known(&self, name: &str) -> bool {
        BUILTIN_SCALARS.contains(&name) || self.get(name).is_some()
    }

    /// Object types that implement `interface`.
    pub fn implementors<'a>(&'a self, interface: &'a str) -> impl Iterator<Item = &'a TypeNode> {
        self.nodes.iter().filter(move |node| {
            matches!(
                &node.kind,
                NodeKind::Object { interfaces, .. } if interfaces.iter().any(|i| i == interface)
            )
        })
    }
}

/// Turns schema text into a [`SchemaTree`].
pub trait SchemaParser: Send + Sync + std::fmt::Debug {
    fn parse(&self, text: &str) -> Result<SchemaTree, ZeusError>;
}

/// Parser for GraphQL schema definition language.
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphqlSchemaParser;

impl SchemaParser for GraphqlSchemaParser {
    fn parse(&self, text: &str) -> Result<SchemaTree, ZeusError> {
        let document = parse_schema::<String>(text)
            .map_err(|err| ZeusError::SchemaParseError(err.to_string()))?;
        let tree = lower_document(document);
        debug!(
            types = tree.nodes.len(),
            query = ?tree.operations.query,
            "Parsed schema."
        );
        Ok(tree)
    }
}

fn lower_type(ty: Type<'_, String>) -> TypeRef {
    match ty {
        Type::NamedType(name) => TypeRef::Named(name),
        Type::ListType(inner) => TypeRef::List(Box::new(lower_type(*inner))),
        Type::NonNullType(inner) => TypeRef::NonNull(Box::new(lower_type(*inner))),
    }
}

fn lower_input_value(value: InputValue<'_, String>) -> FieldNode {
    FieldNode {
        name: value.name,
        description: value.description,
        ty: lower_type(value.value_type),
        args: Vec::new(),
        default_value: value.default_value.map(|v| v.to_string()),
    }
}

fn lower_field(field: Field<'_, String>) -> FieldNode {
    FieldNode {
        name: field.name,
        description: field.description,
        ty: lower_type(field.field_type),
        args: field.arguments.into_iter().map(lower_input_value).collect(),
        default_value: None,
    }
}

fn lower_enum_value(value: EnumValue<'_, String>) -> EnumValueNode {
    EnumValueNode {
        name: value.name,
        description: value.description,
    }
}

fn lower_definition(def: TypeDefinition<'_, String>) -> TypeNode {
    let (name, description, kind) = match def {
        TypeDefinition::Scalar(t) => (t.name, t.description, NodeKind::Scalar),
        TypeDefinition::Object(t) => (
            t.name,
            t.description,
            NodeKind::Object {
                interfaces: t.implements_interfaces,
                fields: t.fields.into_iter().map(lower_field).collect(),
            },
        ),
        TypeDefinition::Interface(t) => (
            t.name,
            t.description,
            NodeKind::Interface {
                fields: t.fields.into_iter().map(lower_field).collect(),
            },
        ),
        TypeDefinition::Union(t) => (t.name, t.description, NodeKind::Union { members: t.types }),
        TypeDefinition::Enum(t) => (
            t.name,
            t.description,
            NodeKind::Enum {
                values: t.values.into_iter().map(lower_enum_value).collect(),
            },
        ),
        TypeDefinition::InputObject(t) => (
            t.name,
            t.description,
            NodeKind::InputObject {
                fields: t.fields.into_iter().map(lower_input_value).collect(),
            },
        ),
    };
    TypeNode {
        name,
        description,
        kind,
    }
}

/// Merge an extension into its base definition. Returns `false` when the
/// base type is not declared anywhere in the document.
fn apply_extension(nodes: &mut [TypeNode], ext: TypeExtension<'_, String>) -> bool {
    let name = match &ext {
        TypeExtension::Scalar(e) => &e.name,
        TypeExtension::Object(e) => &e.name,
        TypeExtension::Interface(e) => &e.name,
        TypeExtension::Union(e) => &e.name,
        TypeExtension::Enum(e) => &e.name,
        TypeExtension::InputObject(e) => &e.name,
    };
    let Some(node) = nodes.iter_mut().find(|n| &n.name == name) else {
        return false;
    };

    match (&mut node.kind, ext) {
        (NodeKind::Object { interfaces, fields }, TypeExtension::Object(e)) => {
            interfaces.extend(e.implements_interfaces);
            fields.extend(e.fields.into_iter().map(lower_field));
        }
        (NodeKind::Interface { fields }, TypeExtension::Interface(e)) => {
            fields.extend(e.fields.into_iter().map(lower_field));
        }
        (NodeKind::Union { members }, TypeExtension::Union(e)) => members.extend(e.types),
        (NodeKind::Enum { values }, TypeExtension::Enum(e)) => {
            values.extend(e.values.into_iter().map(lower_enum_value));
        }
        (NodeKind::InputObject { fields }, TypeExtension::InputObject(e)) => {
            fields.extend(e.fields.into_iter().map(lower_input_value));
        }
        (NodeKind::Scalar, TypeExtension::Scalar(_)) => {}
        (_, other) => {
            debug!(extension = ?other, "Ignoring extension of a different kind.");
        }
    }
    true
}

fn lower_document(document: Document<'_, String>) -> SchemaTree {
    let mut nodes = Vec::new();
    let mut extensions = Vec::new();
    let mut schema_def: Option<SchemaDefinition<'_, String>> = None;

    for definition in document.definitions {
        match definition {
            Definition::SchemaDefinition(def) => schema_def = Some(def),
            Definition::TypeDefinition(def) => nodes.push(lower_definition(def)),
            Definition::TypeExtension(ext) => extensions.push(ext),
            Definition::DirectiveDefinition(def) => {
                debug!(directive = %def.name, "Skipping directive definition.");
            }
        }
    }

    for ext in extensions {
        if !apply_extension(&mut nodes, ext) {
            debug!("Skipping extension of an undeclared type.");
        }
    }

    let operations = match schema_def {
        Some(def) => OperationRoots {
            query: def.query,
            mutation: def.mutation,
            subscription: def.subscription,
        },
        None => {
            let root = |name: &str| {
                nodes
                    .iter()
                    .any(|n: &TypeNode| n.name == name)
                    .then(|| name.to_string())
            };
            OperationRoots {
                query: root("Query"),
                mutation: root("Mutation"),
                subscription: root("Subscription"),
            }
        }
    };

    SchemaTree { nodes, operations }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
"""Root query"""
type Query {
  ping: String
  user(id: ID!, active: Boolean = true): User
  search(term: String!): [SearchResult!]!
}

type Mutation {
  setRole(id: ID!, role: Role!): User!
}

interface Node {
  id: ID!
}

type User implements Node {
  id: ID!
  role: Role
}

type Team implements Node {
  id: ID!
}

union SearchResult = User | Team

enum Role {
  ADMIN
  MEMBER
}

input UserFilter {
  role: Role
  limit: Int = 20
}

scalar DateTime

extend type Query {
  now: DateTime!
}

extend enum Role {
  GUEST
}
"#;

    fn parse() -> SchemaTree {
        GraphqlSchemaParser.parse(SCHEMA).unwrap()
    }

    #[test]
    fn test_nodes_in_definition_order() {
        let tree = parse();
        let names: Vec<_> = tree.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Query",
                "Mutation",
                "Node",
                "User",
                "Team",
                "SearchResult",
                "Role",
                "UserFilter",
                "DateTime"
            ]
        );
        assert_eq!(tree.get("Query").unwrap().description.as_deref(), Some("Root query"));
    }

    #[test]
    fn test_default_operation_roots() {
        let tree = parse();
        assert_eq!(tree.operations.query.as_deref(), Some("Query"));
        assert_eq!(tree.operations.mutation.as_deref(), Some("Mutation"));
        assert_eq!(tree.operations.subscription, None);
        let ops: Vec<_> = tree.operations.iter().collect();
        assert_eq!(ops, [("query", "Query"), ("mutation", "Mutation")]);
    }

    #[test]
    fn test_explicit_schema_block() {
        let tree = GraphqlSchemaParser
            .parse("schema { query: Root }\ntype Root { ping: String }")
            .unwrap();
        assert_eq!(tree.operations.query.as_deref(), Some("Root"));
        assert_eq!(tree.operations.mutation, None);
    }

    #[test]
    fn test_field_arguments_and_types() {
        let tree = parse();
        let query = tree.get("Query").unwrap();
        let user = &query.fields()[1];
        assert_eq!(user.name, "user");
        assert_eq!(user.args.len(), 2);
        assert_eq!(
            user.args[0].ty,
            TypeRef::NonNull(Box::new(TypeRef::Named("ID".into())))
        );
        assert_eq!(user.args[1].default_value.as_deref(), Some("true"));

        let search = &query.fields()[2];
        assert_eq!(search.ty.base_name(), "SearchResult");
        assert!(search.ty.is_non_null());
    }

    #[test]
    fn test_extensions_are_merged() {
        let tree = parse();
        let query = tree.get("Query").unwrap();
        assert!(query.fields().iter().any(|f| f.name == "now"));

        let NodeKind::Enum { values } = &tree.get("Role").unwrap().kind else {
            panic!("Role is not an enum");
        };
        let names: Vec<_> = values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["ADMIN", "MEMBER", "GUEST"]);
    }

    #[test]
    fn test_implementors() {
        let tree = parse();
        let names: Vec<_> = tree.implementors("Node").map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["User", "Team"]);
    }

    #[test]
    fn test_is_known() {
        let tree = parse();
        assert!(tree.is_known("String"));
        assert!(tree.is_known("DateTime"));
        assert!(!tree.is_known("Missing"));
    }

    #[test]
    fn test_parse_error() {
        let err = GraphqlSchemaParser.parse("type Query {").unwrap_err();
        assert!(matches!(err, ZeusError::SchemaParseError(_)));
    }
}
