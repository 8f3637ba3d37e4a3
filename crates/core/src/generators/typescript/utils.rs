//! Common utilities for TypeScript code generation.

use super::types::{TsPrimitive, TsType};

/// Check if an identifier needs quoting when used as a property or enum key.
///
/// Returns true if the name:
/// - Is empty
/// - Doesn't start with a letter, underscore, or dollar sign
/// - Contains characters other than alphanumeric, underscore, or dollar sign
pub fn needs_quoting(name: &str) -> bool {
    name.is_empty()
        || !name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for use in JavaScript/TypeScript string literals.
/// Escapes backslashes and double quotes.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quote a string if needed for use as a property key or enum key.
pub fn quote_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// TypeScript type of a built-in GraphQL scalar.
pub fn builtin_scalar_type(name: &str) -> Option<TsType> {
    let primitive = match name {
        "String" | "ID" => TsPrimitive::String,
        "Int" | "Float" => TsPrimitive::Number,
        "Boolean" => TsPrimitive::Boolean,
        _ => return None,
    };
    Some(TsType::Primitive(primitive))
}

/// Relative import specifier for a sibling module, e.g. `./const.js`.
pub fn sibling_import(module: &str, js_extensions: bool) -> String {
    if js_extensions {
        format!("./{module}.js")
    } else {
        format!("./{module}")
    }
}
