//! TypeScript IR types for code generation.
//!
//! - TsType: Types (primitives, arrays, unions, objects, tuples, etc.)
//! - TsExpr: Initializer expressions for exported constants
//! - TsModule: Imports, statements and type definitions of one output file

/// TypeScript type representation
#[derive(Debug, Clone)]
pub enum TsType {
    /// Primitive types: string, number, boolean, null, undefined, unknown
    Primitive(TsPrimitive),
    /// Array type: T[]
    Array(Box<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Object type: { foo: string; bar?: number }
    Object(Vec<TsProp>),
    /// Tuple type: [A, B]
    Tuple(Vec<TsType>),
    /// Literal type: "foo"
    Literal(TsLiteral),
    /// Named type reference or any type expression emitted verbatim
    Ref(String),
}

impl TsType {
    pub fn reference(name: impl Into<String>) -> Self {
        TsType::Ref(name.into())
    }

    /// `Namespace["Name"]` lookup into one of the generated type maps.
    pub fn lookup(namespace: &str, name: &str) -> Self {
        TsType::Ref(format!("{namespace}[\"{name}\"]"))
    }

    /// Flatten nested unions into one.
    pub fn or(self, other: TsType) -> Self {
        let mut members = match self {
            TsType::Union(members) => members,
            ty => vec![ty],
        };
        match other {
            TsType::Union(more) => members.extend(more),
            ty => members.push(ty),
        }
        TsType::Union(members)
    }
}

/// TypeScript primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Unknown,
}

/// Object property definition
#[derive(Debug, Clone)]
pub struct TsProp {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
}

/// TypeScript literal values
#[derive(Debug, Clone)]
pub enum TsLiteral {
    String(String),
}

/// TypeScript expression
#[derive(Debug, Clone)]
pub enum TsExpr {
    /// Literal value: "bar"
    Literal(TsLiteral),
    /// Object literal, emitted one key per line
    Object(Vec<(String, TsExpr)>),
    /// Type cast: expr as Type
    Cast { expr: Box<TsExpr>, ty: TsType },
}

impl TsExpr {
    pub fn string(s: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(s.into()))
    }

    /// `"value" as const`
    pub fn const_string(s: impl Into<String>) -> Self {
        TsExpr::Cast {
            expr: Box::new(Self::string(s)),
            ty: TsType::reference("const"),
        }
    }
}

// =============================================================================
// Module-Level IR (for printer)
// =============================================================================

/// Import statement
#[derive(Debug, Clone)]
pub struct TsImport {
    /// Default import binding
    pub default: Option<String>,
    /// Named items to import
    pub items: Vec<String>,
    /// Module path
    pub from: String,
}

impl TsImport {
    pub fn named(items: &[&str], from: impl Into<String>) -> Self {
        Self {
            default: None,
            items: items.iter().map(|s| (*s).to_string()).collect(),
            from: from.into(),
        }
    }

    /// `import name from "..."`
    pub fn default_binding(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            default: Some(name.into()),
            items: Vec::new(),
            from: from.into(),
        }
    }
}

/// Type definition kind
#[derive(Debug, Clone)]
pub enum TypeDefKind {
    /// interface Foo { ... }
    Interface { properties: Vec<TsProp> },
    /// enum Foo { ... } or const enum Foo { ... }
    Enum {
        members: Vec<(String, TsLiteral)>,
        is_const: bool,
    },
}

/// Type definition
#[derive(Debug, Clone)]
pub struct TsTypeDef {
    pub name: String,
    pub kind: TypeDefKind,
}

/// Top-level statement
#[derive(Debug, Clone)]
pub enum TsStmt {
    /// export const name: Type = init;
    Const {
        name: String,
        ty: Option<TsType>,
        init: TsExpr,
        is_export: bool,
    },
    /// Raw code block (for runtime code that doesn't fit the AST)
    Raw(String),
}

/// Complete TypeScript module
#[derive(Debug, Clone, Default)]
pub struct TsModule {
    /// Leading comment lines, emitted before imports
    pub header: Vec<String>,
    pub imports: Vec<TsImport>,
    pub statements: Vec<TsStmt>,
    pub types: Vec<TsTypeDef>,
}
