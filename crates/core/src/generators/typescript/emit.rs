//! TypeScript code emission via the Emit trait.
//!
//! Each AST type implements `Emit` so modules are printed by composing the
//! string forms of their parts.

use super::types::{
    TsExpr, TsImport, TsLiteral, TsModule, TsPrimitive, TsProp, TsStmt, TsType, TsTypeDef,
    TypeDefKind,
};
use super::utils::{escape_js_string, quote_if_needed};

/// Trait for emitting TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

// =============================================================================
// Primitive Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string".to_string(),
            TsPrimitive::Number => "number".to_string(),
            TsPrimitive::Boolean => "boolean".to_string(),
            TsPrimitive::Null => "null".to_string(),
            TsPrimitive::Undefined => "undefined".to_string(),
            TsPrimitive::Unknown => "unknown".to_string(),
        }
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
        }
    }
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit();
                // Wrap unions in parentheses
                if matches!(**inner, TsType::Union(_)) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Union(types) => types.iter().map(Emit::emit).collect::<Vec<_>>().join(" | "),
            TsType::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = props.iter().map(Emit::emit).collect();
                    format!("{{ {} }}", parts.join("; "))
                }
            }
            TsType::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(Emit::emit).collect();
                format!("[{}]", parts.join(", "))
            }
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        format!("{key}{opt}: {}", self.ty.emit())
    }
}

// =============================================================================
// Type Definitions
// =============================================================================

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        match &self.kind {
            TypeDefKind::Interface { properties } => {
                let mut output = format!("export interface {} {{\n", self.name);
                for prop in properties {
                    output.push_str(&format!("  {};\n", prop.emit()));
                }
                output.push_str("}\n");
                output
            }
            TypeDefKind::Enum { members, is_const } => {
                let keyword = if *is_const { "const enum" } else { "enum" };
                let mut output = format!("export {keyword} {} {{\n", self.name);
                for (key, value) in members {
                    output.push_str(&format!("  {} = {},\n", quote_if_needed(key), value.emit()));
                }
                output.push_str("}\n");
                output
            }
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for TsExpr {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

impl TsExpr {
    /// Emit with nested object literals indented (2 spaces per level).
    pub fn emit_indented(&self, indent: usize) -> String {
        match self {
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Object(entries) => {
                if entries.is_empty() {
                    return "{}".to_string();
                }
                let inner = "  ".repeat(indent + 1);
                let mut output = "{\n".to_string();
                for (key, value) in entries {
                    output.push_str(&format!(
                        "{inner}{}: {},\n",
                        quote_if_needed(key),
                        value.emit_indented(indent + 1)
                    ));
                }
                output.push_str(&format!("{}}}", "  ".repeat(indent)));
                output
            }
            TsExpr::Cast { expr, ty } => {
                format!("{} as {}", expr.emit_indented(indent), ty.emit())
            }
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

impl Emit for TsStmt {
    fn emit(&self) -> String {
        match self {
            TsStmt::Const {
                name,
                ty,
                init,
                is_export,
            } => {
                let export = if *is_export { "export " } else { "" };
                let ty_str = ty.as_ref().map(|t| format!(": {}", t.emit())).unwrap_or_default();
                format!("{export}const {name}{ty_str} = {};\n", init.emit())
            }
            TsStmt::Raw(code) => {
                let mut output = code.trim_matches('\n').to_string();
                output.push('\n');
                output
            }
        }
    }
}

// =============================================================================
// Imports
// =============================================================================

impl Emit for TsImport {
    fn emit(&self) -> String {
        let mut bindings = Vec::new();
        if let Some(default) = &self.default {
            bindings.push(default.clone());
        }
        if !self.items.is_empty() {
            bindings.push(format!("{{ {} }}", self.items.join(", ")));
        }
        format!(
            "import {} from \"{}\";\n",
            bindings.join(", "),
            self.from
        )
    }
}

// =============================================================================
// Module
// =============================================================================

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut output = String::new();

        for line in &self.header {
            output.push_str(line);
            output.push('\n');
        }
        if !self.header.is_empty() {
            output.push('\n');
        }

        for import in &self.imports {
            output.push_str(&import.emit());
        }
        if !self.imports.is_empty() {
            output.push('\n');
        }

        for stmt in &self.statements {
            output.push_str(&stmt.emit());
            output.push('\n');
        }

        for type_def in &self.types {
            output.push_str(&type_def.emit());
            output.push('\n');
        }

        let trimmed = output.trim_end().len();
        output.truncate(trimmed);
        output.push('\n');
        output
    }
}

// =============================================================================
// Tests
// =============================================================================
