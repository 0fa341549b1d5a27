//! Normalized, language-agnostic class declarations.
//!
//! Front-ends (see `umlgen-java`) translate source files into these types.
//! Nothing in here is tied to a particular grammar: type references are
//! structured, and method bodies are reduced to the handful of usage facts the
//! classifiers need.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{SourceLocation, Visibility};

/// Kind of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclKind {
    Class,
    AbstractClass,
    Interface,
    Enum,
}

/// A structured reference to a type as written at a use site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// `Name` or `pkg.Name`, with optional type arguments (`Map<K, V>`).
    Named { name: String, args: Vec<TypeRef> },
    /// `T[]`
    Array(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    /// Normalized signature, used as the resolver cache key.
    pub fn signature(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, args } if args.is_empty() => write!(f, "{name}"),
            TypeRef::Named { name, args } => {
                write!(f, "{name}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            TypeRef::Array(element) => write!(f, "{element}[]"),
        }
    }
}

/// How a field is initialized at its declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    #[default]
    None,
    /// `new T(...)`
    New(TypeRef),
    /// Any other expression.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_final: bool,
    /// `Some(true)` when the field carries a nullability annotation.
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub initializer: Initializer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDecl {
    pub name: String,
    pub ty: TypeRef,
}

/// Right-hand side of an assignment to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignSource {
    /// A fresh instance: `this.f = new T(...)`.
    New(TypeRef),
    /// A parameter of the enclosing constructor/method: `this.f = p`.
    Parameter(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAssignment {
    pub field: String,
    pub source: AssignSource,
}

/// A use of a type rather than an instance: `Type.method(...)` or
/// `Type.CONSTANT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCall {
    pub ty: TypeRef,
    /// Invoked method or read field.
    pub method: String,
}

/// Usage facts collected from a constructor or method body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyFacts {
    /// Names on which a member was accessed (`x.foo()`, `x.bar`).
    #[serde(default)]
    pub member_accesses: Vec<String>,
    /// Names passed as call arguments (`other.take(x)`).
    #[serde(default)]
    pub call_arguments: Vec<String>,
    #[serde(default)]
    pub field_assignments: Vec<FieldAssignment>,
    #[serde(default)]
    pub static_calls: Vec<StaticCall>,
    #[serde(default)]
    pub locals: Vec<LocalDecl>,
    /// The body starts with `this(...)`.
    #[serde(default)]
    pub delegates_to_this: bool,
}

impl BodyFacts {
    pub fn accesses_member_of(&self, name: &str) -> bool {
        self.member_accesses.iter().any(|n| n == name)
    }

    pub fn passes_as_argument(&self, name: &str) -> bool {
        self.call_arguments.iter().any(|n| n == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    /// `None` for constructors and `void` methods.
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub body: BodyFacts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupertypeKind {
    Extends,
    Implements,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supertype {
    pub ty: TypeRef,
    pub kind: SupertypeKind,
}

/// One class-like declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    /// Qualified name, e.g. `com.example.Room`.
    pub name: String,
    pub kind: DeclKind,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub constructors: Vec<MethodDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub supertypes: Vec<Supertype>,
    /// Qualified names imported by the declaring compilation unit.
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            supertypes: Vec::new(),
            imports: Vec::new(),
            location: None,
        }
    }

    /// Unqualified name: `com.example.Room` → `Room`.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    pub fn package(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(pkg, _)| pkg)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Constructors followed by methods.
    pub fn callables(&self) -> impl Iterator<Item = &MethodDecl> {
        self.constructors.iter().chain(self.methods.iter())
    }
}

/// Last segment of a dotted name.
pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_display() {
        let ty = TypeRef::generic(
            "Map",
            vec![TypeRef::named("Light"), TypeRef::array(TypeRef::named("Room"))],
        );
        assert_eq!(ty.to_string(), "Map<Light, Room[]>");
        assert_eq!(ty.signature(), "Map<Light, Room[]>");
    }

    #[test]
    fn test_simple_name_and_package() {
        let decl = ClassDecl::new("com.example.home.Room", DeclKind::Class);
        assert_eq!(decl.simple_name(), "Room");
        assert_eq!(decl.package(), Some("com.example.home"));

        let bare = ClassDecl::new("Room", DeclKind::Class);
        assert_eq!(bare.simple_name(), "Room");
        assert_eq!(bare.package(), None);
    }

    #[test]
    fn test_body_facts_queries() {
        let facts = BodyFacts {
            member_accesses: vec!["room".to_string()],
            call_arguments: vec!["thermostat".to_string()],
            ..BodyFacts::default()
        };
        assert!(facts.accesses_member_of("room"));
        assert!(!facts.accesses_member_of("thermostat"));
        assert!(facts.passes_as_argument("thermostat"));
    }

    #[test]
    fn test_class_decl_deserializes_with_defaults() {
        let json = r#"{
            "name": "demo.Logger",
            "kind": "class",
            "fields": [{ "name": "level", "ty": { "named": { "name": "int", "args": [] } } }]
        }"#;
        let decl: ClassDecl = serde_json::from_str(json).unwrap();
        assert_eq!(decl.fields.len(), 1);
        assert_eq!(decl.fields[0].initializer, Initializer::None);
        assert!(decl.methods.is_empty());
    }
}
