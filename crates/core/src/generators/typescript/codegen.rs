//! Code generation from the schema tree to TypeScript AST.
//!
//! `const.ts` carries the runtime type maps the query builder walks.
//! `index.ts` carries the runtime itself plus the generated type maps.

use super::emit::Emit;
use super::runtime::{
    FETCH_RUNTIME, HELPER_TYPES, OPERATION_RUNTIME, environment_bindings, subscription_runtime,
};
use super::types::{
    TsExpr, TsImport, TsLiteral, TsModule, TsPrimitive, TsProp, TsStmt, TsType, TsTypeDef,
    TypeDefKind,
};
use super::utils::{builtin_scalar_type, sibling_import};
use crate::options::{Environment, InvocationOptions, SubscriptionTransport};
use crate::tree::{FieldNode, NodeKind, SchemaTree, TypeNode, TypeRef};

const HEADER: &str = "/* eslint-disable */";
const DEFAULT_HOST: &str = "Specify host";
const SCALAR_SELECTION: &str = "boolean | `@${string}`";
const VARIABLE: &str = "Variable<any, string>";

// =============================================================================
// const.ts
// =============================================================================

/// Generate `const.ts`: `AllTypesProps`, `ReturnTypes` and `Ops`.
pub fn codegen_const_module(tree: &SchemaTree) -> TsModule {
    let record = || Some(TsType::reference("Record<string, any>"));

    TsModule {
        header: vec![HEADER.to_string()],
        imports: vec![],
        statements: vec![
            TsStmt::Const {
                name: "AllTypesProps".into(),
                ty: record(),
                init: TsExpr::Object(tree.nodes.iter().filter_map(all_types_props_entry).collect()),
                is_export: true,
            },
            TsStmt::Const {
                name: "ReturnTypes".into(),
                ty: record(),
                init: TsExpr::Object(tree.nodes.iter().filter_map(return_types_entry).collect()),
                is_export: true,
            },
            TsStmt::Const {
                name: "Ops".into(),
                ty: None,
                init: TsExpr::Object(
                    tree.operations
                        .iter()
                        .map(|(op, name)| (op.to_string(), TsExpr::const_string(name)))
                        .collect(),
                ),
                is_export: true,
            },
        ],
        types: vec![],
    }
}

/// Argument types per field, input field types, and enum markers.
fn all_types_props_entry(node: &TypeNode) -> Option<(String, TsExpr)> {
    let value = match &node.kind {
        NodeKind::Enum { .. } => TsExpr::const_string("enum"),
        NodeKind::Object { fields, .. } | NodeKind::Interface { fields } => {
            let with_args: Vec<_> = fields
                .iter()
                .filter(|f| !f.args.is_empty())
                .map(|f| {
                    let args = f
                        .args
                        .iter()
                        .map(|a| (a.name.clone(), TsExpr::string(a.ty.base_name())))
                        .collect();
                    (f.name.clone(), TsExpr::Object(args))
                })
                .collect();
            if with_args.is_empty() {
                return None;
            }
            TsExpr::Object(with_args)
        }
        NodeKind::InputObject { fields } => TsExpr::Object(
            fields
                .iter()
                .map(|f| (f.name.clone(), TsExpr::string(f.ty.base_name())))
                .collect(),
        ),
        NodeKind::Union { .. } | NodeKind::Scalar => return None,
    };
    Some((node.name.clone(), value))
}

/// Named return type per output field.
fn return_types_entry(node: &TypeNode) -> Option<(String, TsExpr)> {
    let value = match &node.kind {
        NodeKind::Object { fields, .. } | NodeKind::Interface { fields } => TsExpr::Object(
            fields
                .iter()
                .map(|f| (f.name.clone(), TsExpr::string(f.ty.base_name())))
                .collect(),
        ),
        NodeKind::Union { members } => TsExpr::Object(
            members
                .iter()
                .map(|m| (format!("...on {m}"), TsExpr::string(m)))
                .collect(),
        ),
        _ => return None,
    };
    Some((node.name.clone(), value))
}

// =============================================================================
// index.ts
// =============================================================================

/// Generate `index.ts`. `host` is the endpoint the schema was fetched from.
pub fn codegen_index_module(
    tree: &SchemaTree,
    options: &InvocationOptions,
    host: Option<&str>,
) -> TsModule {
    let mut statements = vec![
        TsStmt::Const {
            name: "HOST".into(),
            ty: None,
            init: TsExpr::string(host.unwrap_or(DEFAULT_HOST)),
            is_export: true,
        },
        TsStmt::Const {
            name: "HEADERS".into(),
            ty: Some(TsType::reference("Record<string, string>")),
            init: TsExpr::Object(vec![]),
            is_export: true,
        },
    ];
    statements.extend(
        [
            environment_bindings(options.environment),
            FETCH_RUNTIME,
            subscription_runtime(options.subscriptions),
            OPERATION_RUNTIME,
            HELPER_TYPES,
        ]
        .into_iter()
        .map(|code| TsStmt::Raw(code.to_string())),
    );

    let mut types: Vec<TsTypeDef> = tree
        .nodes
        .iter()
        .filter_map(|node| codegen_enum(node, options.const_enums))
        .collect();
    types.push(type_map("ValueTypes", tree, value_type));
    types.push(type_map("ModelTypes", tree, model_type));
    types.push(type_map("GraphQLTypes", tree, graphql_type));

    TsModule {
        header: vec![HEADER.to_string()],
        imports: codegen_index_imports(options),
        statements,
        types,
    }
}

fn codegen_index_imports(options: &InvocationOptions) -> Vec<TsImport> {
    let mut imports = Vec::new();

    if options.environment == Environment::Node {
        imports.push(TsImport {
            default: Some("fetch".into()),
            ..TsImport::named(&["Response"], "node-fetch")
        });
        imports.push(TsImport::default_binding("WebSocket", "ws"));
    }

    if options.subscriptions == SubscriptionTransport::GraphqlWs {
        imports.push(TsImport::named(&["createClient"], "graphql-ws"));
    }

    imports.push(TsImport::named(
        &["AllTypesProps", "ReturnTypes", "Ops"],
        sibling_import("const", options.uses_js_extensions()),
    ));
    imports
}

fn codegen_enum(node: &TypeNode, is_const: bool) -> Option<TsTypeDef> {
    let NodeKind::Enum { values } = &node.kind else {
        return None;
    };
    Some(TsTypeDef {
        name: node.name.clone(),
        kind: TypeDefKind::Enum {
            members: values
                .iter()
                .map(|v| (v.name.clone(), TsLiteral::String(v.name.clone())))
                .collect(),
            is_const,
        },
    })
}

/// `export interface <name> { <TypeName>: ...; }` over every declared type.
fn type_map(
    name: &str,
    tree: &SchemaTree,
    entry: fn(&SchemaTree, &TypeNode) -> TsType,
) -> TsTypeDef {
    TsTypeDef {
        name: name.to_string(),
        kind: TypeDefKind::Interface {
            properties: tree
                .nodes
                .iter()
                .map(|node| TsProp {
                    name: node.name.clone(),
                    ty: entry(tree, node),
                    optional: false,
                })
                .collect(),
        },
    }
}

fn is_leaf(tree: &SchemaTree, name: &str) -> bool {
    tree.get(name).is_none_or(|node| {
        matches!(node.kind, NodeKind::Scalar | NodeKind::Enum { .. })
    })
}

fn alias_type(props: Vec<TsProp>) -> TsType {
    TsType::Ref(format!("AliasType<{}>", TsType::Object(props).emit()))
}

fn nullable(ty: TsType, extra: &[TsPrimitive]) -> TsType {
    extra
        .iter()
        .fold(ty, |acc, p| acc.or(TsType::Primitive(*p)))
}

// -----------------------------------------------------------------------------
// ValueTypes: selection sets and argument inputs
// -----------------------------------------------------------------------------

fn value_type(tree: &SchemaTree, node: &TypeNode) -> TsType {
    match &node.kind {
        NodeKind::Object { fields, .. } => {
            alias_type(fields.iter().map(|f| selection_prop(tree, f)).collect())
        }
        NodeKind::Interface { fields } => {
            let mut props: Vec<_> = fields.iter().map(|f| selection_prop(tree, f)).collect();
            props.extend(tree.implementors(&node.name).map(|n| fragment_prop(&n.name)));
            alias_type(props)
        }
        NodeKind::Union { members } => alias_type(members.iter().map(|m| fragment_prop(m)).collect()),
        NodeKind::InputObject { fields } => TsType::Object(
            fields
                .iter()
                .map(|f| TsProp {
                    name: f.name.clone(),
                    ty: input_type(tree, &f.ty).or(TsType::reference(VARIABLE)),
                    optional: is_optional_input(f),
                })
                .collect(),
        ),
        NodeKind::Enum { .. } => TsType::reference(node.name.clone()),
        NodeKind::Scalar => TsType::Primitive(TsPrimitive::Unknown),
    }
}

fn fragment_prop(member: &str) -> TsProp {
    TsProp {
        name: format!("...on {member}"),
        ty: TsType::lookup("ValueTypes", member),
        optional: true,
    }
}

fn is_optional_input(field: &FieldNode) -> bool {
    !field.ty.is_non_null() || field.default_value.is_some()
}

/// `field?: <selection>` or, with arguments, `field?: [{ args }, <selection>]`.
fn selection_prop(tree: &SchemaTree, field: &FieldNode) -> TsProp {
    let base = field.ty.base_name();
    let selection = if is_leaf(tree, base) {
        TsType::reference(SCALAR_SELECTION)
    } else {
        TsType::lookup("ValueTypes", base)
    };

    let ty = if field.args.is_empty() {
        selection
    } else {
        let args = TsType::Object(
            field
                .args
                .iter()
                .map(|a| TsProp {
                    name: a.name.clone(),
                    ty: input_type(tree, &a.ty).or(TsType::reference(VARIABLE)),
                    optional: is_optional_input(a),
                })
                .collect(),
        );
        let with_args = TsType::Tuple(vec![args, selection.clone()]);
        if field.args.iter().all(is_optional_input) {
            with_args.or(selection)
        } else {
            with_args
        }
    };

    TsProp {
        name: field.name.clone(),
        ty,
        optional: true,
    }
}

fn input_type(tree: &SchemaTree, ty: &TypeRef) -> TsType {
    match ty {
        TypeRef::NonNull(inner) => strict_input_type(tree, inner),
        other => nullable(
            strict_input_type(tree, other),
            &[TsPrimitive::Undefined, TsPrimitive::Null],
        ),
    }
}

fn strict_input_type(tree: &SchemaTree, ty: &TypeRef) -> TsType {
    match ty {
        TypeRef::NonNull(inner) => strict_input_type(tree, inner),
        TypeRef::List(inner) => TsType::Array(Box::new(input_type(tree, inner))),
        TypeRef::Named(name) => builtin_scalar_type(name).unwrap_or_else(|| match tree.get(name) {
            Some(node) if matches!(node.kind, NodeKind::Enum { .. } | NodeKind::InputObject { .. }) => {
                TsType::lookup("ValueTypes", name)
            }
            _ => TsType::Primitive(TsPrimitive::Unknown),
        }),
    }
}

// -----------------------------------------------------------------------------
// ModelTypes and GraphQLTypes: response shapes
// -----------------------------------------------------------------------------

fn model_type(tree: &SchemaTree, node: &TypeNode) -> TsType {
    response_type(tree, node, "ModelTypes")
}

fn graphql_type(tree: &SchemaTree, node: &TypeNode) -> TsType {
    response_type(tree, node, "GraphQLTypes")
}

fn response_type(tree: &SchemaTree, node: &TypeNode, ns: &str) -> TsType {
    let with_typename = ns == "GraphQLTypes";
    match &node.kind {
        NodeKind::Object { fields, .. } => {
            let mut props = Vec::new();
            if with_typename {
                props.push(typename_prop(&[node.name.as_str()]));
            }
            props.extend(fields.iter().map(|f| output_prop(tree, f, ns)));
            TsType::Object(props)
        }
        NodeKind::Interface { fields } => {
            let implementors: Vec<_> = tree.implementors(&node.name).map(|n| n.name.as_str()).collect();
            if !with_typename && !implementors.is_empty() {
                return TsType::Union(implementors.iter().map(|n| TsType::lookup(ns, n)).collect());
            }
            let mut props = Vec::new();
            if with_typename && !implementors.is_empty() {
                props.push(typename_prop(&implementors));
            }
            props.extend(fields.iter().map(|f| output_prop(tree, f, ns)));
            TsType::Object(props)
        }
        NodeKind::Union { members } => {
            TsType::Union(members.iter().map(|m| TsType::lookup(ns, m)).collect())
        }
        NodeKind::InputObject { fields } => {
            TsType::Object(fields.iter().map(|f| output_prop(tree, f, ns)).collect())
        }
        NodeKind::Enum { .. } => TsType::reference(node.name.clone()),
        NodeKind::Scalar if with_typename => {
            TsType::reference(format!("ScalarTag<\"{}\">", node.name))
        }
        NodeKind::Scalar => TsType::Primitive(TsPrimitive::Unknown),
    }
}

fn typename_prop(names: &[&str]) -> TsProp {
    let ty = match names {
        [single] => TsType::Literal(TsLiteral::String((*single).to_string())),
        many => TsType::Union(
            many.iter()
                .map(|n| TsType::Literal(TsLiteral::String((*n).to_string())))
                .collect(),
        ),
    };
    TsProp {
        name: "__typename".into(),
        ty,
        optional: false,
    }
}

fn output_prop(tree: &SchemaTree, field: &FieldNode, ns: &str) -> TsProp {
    TsProp {
        name: field.name.clone(),
        ty: output_type(tree, &field.ty, ns),
        optional: !field.ty.is_non_null(),
    }
}

fn output_type(tree: &SchemaTree, ty: &TypeRef, ns: &str) -> TsType {
    match ty {
        TypeRef::NonNull(inner) => strict_output_type(tree, inner, ns),
        other => nullable(strict_output_type(tree, other, ns), &[TsPrimitive::Undefined]),
    }
}

fn strict_output_type(tree: &SchemaTree, ty: &TypeRef, ns: &str) -> TsType {
    match ty {
        TypeRef::NonNull(inner) => strict_output_type(tree, inner, ns),
        TypeRef::List(inner) => TsType::Array(Box::new(output_type(tree, inner, ns))),
        TypeRef::Named(name) => builtin_scalar_type(name).unwrap_or_else(|| match tree.get(name) {
            Some(node) if matches!(node.kind, NodeKind::Enum { .. }) => TsType::reference(name.clone()),
            Some(_) => TsType::lookup(ns, name),
            None => TsType::Primitive(TsPrimitive::Unknown),
        }),
    }
}
