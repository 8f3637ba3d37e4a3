//! Introspection results to schema definition text.
//!
//! Remote endpoints answer the introspection query with JSON. The rest of the
//! pipeline works on schema text, so the result is printed back as SDL.

use serde::Deserialize;

/// Standard introspection query sent to remote endpoints.
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types { ...FullType }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args { ...InputValue }
    type { ...TypeRef }
    isDeprecated
    deprecationReason
  }
  inputFields { ...InputValue }
  interfaces { ...TypeRef }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes { ...TypeRef }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}"#;

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    query_type: Option<NamedRef>,
    mutation_type: Option<NamedRef>,
    subscription_type: Option<NamedRef>,
    types: Vec<FullType>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FullType {
    kind: TypeKind,
    name: String,
    description: Option<String>,
    fields: Option<Vec<Field>>,
    input_fields: Option<Vec<InputValue>>,
    interfaces: Option<Vec<TypeRef>>,
    enum_values: Option<Vec<EnumValue>>,
    possible_types: Option<Vec<TypeRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Field {
    name: String,
    description: Option<String>,
    #[serde(default)]
    args: Vec<InputValue>,
    #[serde(rename = "type")]
    ty: TypeRef,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputValue {
    name: String,
    description: Option<String>,
    #[serde(rename = "type")]
    ty: TypeRef,
    default_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnumValue {
    name: String,
    description: Option<String>,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeRef {
    kind: TypeKind,
    name: Option<String>,
    of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    fn render(&self) -> Result<String, String> {
        match self.kind {
            TypeKind::NonNull => Ok(format!("{}!", self.inner()?.render()?)),
            TypeKind::List => Ok(format!("[{}]", self.inner()?.render()?)),
            _ => self
                .name
                .clone()
                .ok_or_else(|| format!("{:?} type reference without a name", self.kind)),
        }
    }

    fn inner(&self) -> Result<&TypeRef, String> {
        self.of_type
            .as_deref()
            .ok_or_else(|| format!("{:?} type reference without ofType", self.kind))
    }
}

impl IntrospectionSchema {
    /// Print the schema as SDL. Introspection types and built-in scalars are skipped.
    pub fn to_sdl(&self) -> Result<String, String> {
        let mut blocks = Vec::new();

        if let Some(schema_block) = self.schema_block() {
            blocks.push(schema_block);
        }

        for ty in &self.types {
            if ty.name.starts_with("__")
                || (ty.kind == TypeKind::Scalar && BUILTIN_SCALARS.contains(&ty.name.as_str()))
            {
                continue;
            }
            blocks.push(print_type(ty)?);
        }

        Ok(blocks.join("\n"))
    }

    /// `schema { ... }` is only needed when a root type has a non-default name.
    fn schema_block(&self) -> Option<String> {
        let roots = [
            ("query", &self.query_type, "Query"),
            ("mutation", &self.mutation_type, "Mutation"),
            ("subscription", &self.subscription_type, "Subscription"),
        ];
        let custom = roots
            .iter()
            .any(|(_, named, default)| named.as_ref().is_some_and(|n| n.name != *default));
        if !custom {
            return None;
        }

        let mut out = String::from("schema {\n");
        for (op, named, _) in roots {
            if let Some(named) = named {
                out.push_str(&format!("  {op}: {}\n", named.name));
            }
        }
        out.push_str("}\n");
        Some(out)
    }
}

fn print_description(description: Option<&str>, indent: &str) -> String {
    match description.filter(|d| !d.is_empty()) {
        Some(d) => {
            let escaped = d.replace("\"\"\"", "\\\"\"\"");
            let body = escaped
                .lines()
                .map(|line| format!("{indent}{line}\n"))
                .collect::<String>();
            format!("{indent}\"\"\"\n{body}{indent}\"\"\"\n")
        }
        None => String::new(),
    }
}

// JSON string escapes are a subset of GraphQL string escapes.
fn print_deprecated(is_deprecated: bool, reason: Option<&str>) -> Result<String, String> {
    if !is_deprecated {
        return Ok(String::new());
    }
    match reason {
        Some(r) if r != "No longer supported" => {
            let literal = serde_json::to_string(r).map_err(|e| e.to_string())?;
            Ok(format!(" @deprecated(reason: {literal})"))
        }
        _ => Ok(" @deprecated".to_string()),
    }
}

fn print_input_value(value: &InputValue) -> Result<String, String> {
    let mut out = format!("{}: {}", value.name, value.ty.render()?);
    if let Some(default) = &value.default_value {
        out.push_str(&format!(" = {default}"));
    }
    Ok(out)
}

fn print_fields(fields: &[Field]) -> Result<String, String> {
    let mut out = String::new();
    for field in fields {
        out.push_str(&print_description(field.description.as_deref(), "  "));
        out.push_str("  ");
        out.push_str(&field.name);
        if !field.args.is_empty() {
            let args = field
                .args
                .iter()
                .map(print_input_value)
                .collect::<Result<Vec<_>, _>>()?;
            out.push_str(&format!("({})", args.join(", ")));
        }
        out.push_str(&format!(
            ": {}{}\n",
            field.ty.render()?,
            print_deprecated(field.is_deprecated, field.deprecation_reason.as_deref())?
        ));
    }
    Ok(out)
}

fn print_implements(interfaces: Option<&Vec<TypeRef>>) -> Result<String, String> {
    let names = interfaces
        .map(|list| list.iter().map(TypeRef::render).collect::<Result<Vec<_>, _>>())
        .transpose()?
        .unwrap_or_default();
    if names.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!(" implements {}", names.join(" & ")))
    }
}

fn print_type(ty: &FullType) -> Result<String, String> {
    let mut out = print_description(ty.description.as_deref(), "");
    match ty.kind {
        TypeKind::Scalar => out.push_str(&format!("scalar {}\n", ty.name)),
        TypeKind::Object | TypeKind::Interface => {
            let keyword = if ty.kind == TypeKind::Object {
                "type"
            } else {
                "interface"
            };
            out.push_str(&format!(
                "{keyword} {}{} {{\n",
                ty.name,
                print_implements(ty.interfaces.as_ref())?
            ));
            out.push_str(&print_fields(ty.fields.as_deref().unwrap_or_default())?);
            out.push_str("}\n");
        }
        TypeKind::Union => {
            let members = ty
                .possible_types
                .iter()
                .flatten()
                .map(TypeRef::render)
                .collect::<Result<Vec<_>, _>>()?;
            out.push_str(&format!("union {} = {}\n", ty.name, members.join(" | ")));
        }
        TypeKind::Enum => {
            out.push_str(&format!("enum {} {{\n", ty.name));
            for value in ty.enum_values.iter().flatten() {
                out.push_str(&print_description(value.description.as_deref(), "  "));
                out.push_str(&format!(
                    "  {}{}\n",
                    value.name,
                    print_deprecated(value.is_deprecated, value.deprecation_reason.as_deref())?
                ));
            }
            out.push_str("}\n");
        }
        TypeKind::InputObject => {
            out.push_str(&format!("input {} {{\n", ty.name));
            for field in ty.input_fields.iter().flatten() {
                out.push_str(&print_description(field.description.as_deref(), "  "));
                out.push_str(&format!("  {}\n", print_input_value(field)?));
            }
            out.push_str("}\n");
        }
        TypeKind::List | TypeKind::NonNull => {
            return Err(format!("wrapper kind {:?} used as named type {}", ty.kind, ty.name));
        }
    }
    Ok(out)
}
