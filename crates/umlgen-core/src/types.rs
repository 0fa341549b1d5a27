use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::ast::{ClassDecl, DeclKind, MethodDecl};

/// Location in source code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
    #[default]
    Package,
}

impl Visibility {
    /// UML access modifier symbol. Package visibility has none.
    pub fn symbol(&self) -> &'static str {
        match self {
            Visibility::Public => "+",
            Visibility::Protected => "#",
            Visibility::Private => "-",
            Visibility::Package => "",
        }
    }
}

/// Kind of a diagram entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Class,
    AbstractClass,
    Interface,
    Enum,
    /// Referenced but not declared in the analyzed set.
    External,
}

impl From<DeclKind> for EntityKind {
    fn from(kind: DeclKind) -> Self {
        match kind {
            DeclKind::Class => EntityKind::Class,
            DeclKind::AbstractClass => EntityKind::AbstractClass,
            DeclKind::Interface => EntityKind::Interface,
            DeclKind::Enum => EntityKind::Enum,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Class => write!(f, "class"),
            EntityKind::AbstractClass => write!(f, "abstract-class"),
            EntityKind::Interface => write!(f, "interface"),
            EntityKind::Enum => write!(f, "enum"),
            EntityKind::External => write!(f, "external"),
        }
    }
}

/// Kind of relationship between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Inheritance,
    Realization,
    Composition,
    Aggregation,
    Association,
    Dependency,
}

impl RelationshipKind {
    /// Aggregation and composition edges imply the source holds the target.
    pub fn is_ownership(&self) -> bool {
        matches!(
            self,
            RelationshipKind::Composition | RelationshipKind::Aggregation
        )
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipKind::Inheritance => write!(f, "inheritance"),
            RelationshipKind::Realization => write!(f, "realization"),
            RelationshipKind::Composition => write!(f, "composition"),
            RelationshipKind::Aggregation => write!(f, "aggregation"),
            RelationshipKind::Association => write!(f, "association"),
            RelationshipKind::Dependency => write!(f, "dependency"),
        }
    }
}

/// Target-side multiplicity of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Multiplicity {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "0..1")]
    ZeroOrOne,
    #[serde(rename = "0..*")]
    Many,
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::One => write!(f, "1"),
            Multiplicity::ZeroOrOne => write!(f, "0..1"),
            Multiplicity::Many => write!(f, "0..*"),
        }
    }
}

/// Identity of a relationship: two edges with the same key are the same edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationshipKey {
    pub source: String,
    pub target: String,
    pub kind: RelationshipKind,
    pub label: Option<String>,
}

/// A directed edge of the class diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub kind: RelationshipKind,
    pub multiplicity: Option<Multiplicity>,
    pub label: Option<String>,
}

impl Relationship {
    pub fn key(&self) -> RelationshipKey {
        RelationshipKey {
            source: self.source.clone(),
            target: self.target.clone(),
            kind: self.kind,
            label: self.label.clone(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.kind, self.target)?;
        if let Some(m) = self.multiplicity {
            write!(f, " [{m}]")?;
        }
        if let Some(label) = &self.label {
            write!(f, " ({label})")?;
        }
        Ok(())
    }
}

/// Field as shown in a class box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Method or constructor as shown in a class box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSummary {
    pub name: String,
    pub params: Vec<ParamSummary>,
    #[serde(rename = "returnType")]
    pub return_type: Option<String>,
    pub visibility: Visibility,
}

impl From<&MethodDecl> for MethodSummary {
    fn from(method: &MethodDecl) -> Self {
        Self {
            name: method.name.clone(),
            params: method
                .params
                .iter()
                .map(|p| ParamSummary {
                    name: p.name.clone(),
                    ty: p.ty.to_string(),
                })
                .collect(),
            return_type: method.return_type.as_ref().map(|t| t.to_string()),
            visibility: method.visibility,
        }
    }
}

/// A node of the class diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    pub fields: Vec<FieldSummary>,
    pub methods: Vec<MethodSummary>,
    pub supertypes: Vec<String>,
    pub location: Option<SourceLocation>,
}

impl Entity {
    /// Placeholder for a type referenced but never declared.
    pub fn external(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: EntityKind::External,
            fields: Vec::new(),
            methods: Vec::new(),
            supertypes: Vec::new(),
            location: None,
        }
    }

    pub fn simple_name(&self) -> &str {
        crate::ast::simple_name(&self.name)
    }

    pub fn is_external(&self) -> bool {
        self.kind == EntityKind::External
    }
}

impl From<&ClassDecl> for Entity {
    fn from(decl: &ClassDecl) -> Self {
        Self {
            name: decl.name.clone(),
            kind: decl.kind.into(),
            fields: decl
                .fields
                .iter()
                .map(|f| FieldSummary {
                    name: f.name.clone(),
                    ty: f.ty.to_string(),
                    visibility: f.visibility,
                })
                .collect(),
            methods: decl.callables().map(MethodSummary::from).collect(),
            supertypes: decl.supertypes.iter().map(|s| s.ty.to_string()).collect(),
            location: decl.location.clone(),
        }
    }
}
