//! Walks a Java syntax tree and builds normalized declarations.

use std::path::Path;

use tree_sitter::Node;

use umlgen_core::ast::{
    AssignSource, BodyFacts, ClassDecl, DeclKind, FieldAssignment, FieldDecl, Initializer,
    LocalDecl, MethodDecl, ParamDecl, StaticCall, Supertype, SupertypeKind, TypeRef,
};
use umlgen_core::types::{SourceLocation, Visibility};

use crate::node_text;
use crate::types::{type_list, type_ref, with_declarator_dimensions};

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
];

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

/// Declaration modifiers and the annotations we care about.
#[derive(Debug, Default)]
struct Modifiers {
    visibility: Option<Visibility>,
    is_static: bool,
    is_final: bool,
    is_abstract: bool,
    is_default: bool,
    nullable: Option<bool>,
}

impl Modifiers {
    fn of(decl: Node, source: &str) -> Self {
        let mut m = Modifiers::default();
        let Some(modifiers) = children(decl).into_iter().find(|c| c.kind() == "modifiers") else {
            return m;
        };
        for child in children(modifiers) {
            match child.kind() {
                "public" => m.visibility = Some(Visibility::Public),
                "protected" => m.visibility = Some(Visibility::Protected),
                "private" => m.visibility = Some(Visibility::Private),
                "static" => m.is_static = true,
                "final" => m.is_final = true,
                "abstract" => m.is_abstract = true,
                "default" => m.is_default = true,
                "marker_annotation" | "annotation" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    let name = node_text(name, source);
                    match name.rsplit('.').next().unwrap_or(&name) {
                        "Nullable" | "CheckForNull" => m.nullable = Some(true),
                        "NonNull" | "Nonnull" | "NotNull" => m.nullable = Some(false),
                        _ => {}
                    }
                }
                _ => {}
            }
        }
        m
    }

    /// Interface members are implicitly public.
    fn visibility(&self, in_interface: bool) -> Visibility {
        match self.visibility {
            Some(v) => v,
            None if in_interface => Visibility::Public,
            None => Visibility::Package,
        }
    }
}

/// Collects usage facts from one constructor or method body.
struct BodyScanner<'a> {
    source: &'a str,
    facts: BodyFacts,
    /// `f = x` without `this.`; only a field assignment if `f` is not shadowed.
    bare_assignments: Vec<FieldAssignment>,
    /// `Upper.call()`; a static call unless `Upper` turns out to be a variable.
    receivers: Vec<StaticCall>,
}

impl<'a> BodyScanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            facts: BodyFacts::default(),
            bare_assignments: Vec::new(),
            receivers: Vec::new(),
        }
    }

    fn text(&self, node: Node) -> String {
        node_text(node, self.source)
    }

    fn scan(&mut self, node: Node) {
        match node.kind() {
            // Anonymous and local classes are their own scope.
            "class_body" | "class_declaration" | "interface_declaration" | "enum_declaration"
            | "record_declaration" => return,
            "explicit_constructor_invocation" => {
                if node
                    .child_by_field_name("constructor")
                    .is_some_and(|c| c.kind() == "this")
                {
                    self.facts.delegates_to_this = true;
                }
            }
            "local_variable_declaration" => self.local_declaration(node),
            "enhanced_for_statement" => {
                if let (Some(ty), Some(name)) = (
                    node.child_by_field_name("type").and_then(|t| type_ref(t, self.source)),
                    node.child_by_field_name("name").filter(|n| !n.is_missing()),
                ) {
                    self.facts.locals.push(LocalDecl {
                        name: self.text(name),
                        ty,
                    });
                }
            }
            "method_invocation" => self.method_invocation(node),
            "field_access" => {
                if let Some(object) = node
                    .child_by_field_name("object")
                    .filter(|o| o.kind() == "identifier")
                {
                    self.receiver(object, node.child_by_field_name("field"));
                }
            }
            "argument_list" => {
                for arg in named_children(node) {
                    if arg.kind() == "identifier" {
                        let name = self.text(arg);
                        push_unique(&mut self.facts.call_arguments, &name);
                    }
                }
            }
            "assignment_expression" => self.assignment(node),
            _ => {}
        }
        for child in named_children(node) {
            self.scan(child);
        }
    }

    fn local_declaration(&mut self, node: Node) {
        let declared = node.child_by_field_name("type");
        for declarator in children(node)
            .into_iter()
            .filter(|c| c.kind() == "variable_declarator")
        {
            let Some(name) = declarator
                .child_by_field_name("name")
                .filter(|n| !n.is_missing())
            else {
                continue;
            };
            let value = declarator.child_by_field_name("value");
            let ty = match declared {
                Some(t) if self.text(t) == "var" => value
                    .filter(|v| v.kind() == "object_creation_expression")
                    .and_then(|v| v.child_by_field_name("type"))
                    .and_then(|t| type_ref(t, self.source)),
                Some(t) => type_ref(t, self.source)
                    .map(|ty| with_declarator_dimensions(ty, declarator, self.source)),
                None => None,
            };
            if let Some(ty) = ty {
                self.facts.locals.push(LocalDecl {
                    name: self.text(name),
                    ty,
                });
            }
        }
    }

    fn method_invocation(&mut self, node: Node) {
        let Some(object) = node.child_by_field_name("object") else {
            return;
        };
        match object.kind() {
            "identifier" => self.receiver(object, node.child_by_field_name("name")),
            // `this.room.open()` reads the field
            "field_access" => {
                let is_this = object
                    .child_by_field_name("object")
                    .is_some_and(|o| o.kind() == "this");
                if let (true, Some(field)) = (is_this, object.child_by_field_name("field")) {
                    let name = self.text(field);
                    push_unique(&mut self.facts.member_accesses, &name);
                }
            }
            _ => {}
        }
    }

    /// `object.member` where `object` is a bare identifier. An uppercase
    /// name is taken as a type (`Helper.assist()`, `Mode.ECO`) until
    /// `finish` finds a variable of that name.
    fn receiver(&mut self, object: Node, member: Option<Node>) {
        let receiver = self.text(object);
        if receiver.starts_with(|c: char| c.is_ascii_uppercase()) {
            let method = member.map(|n| self.text(n)).unwrap_or_default();
            self.receivers.push(StaticCall {
                ty: TypeRef::named(receiver),
                method,
            });
        } else {
            push_unique(&mut self.facts.member_accesses, &receiver);
        }
    }

    fn assignment(&mut self, node: Node) {
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return;
        };
        let source = match right.kind() {
            "object_creation_expression" => right
                .child_by_field_name("type")
                .and_then(|t| type_ref(t, self.source))
                .map(AssignSource::New)
                .unwrap_or(AssignSource::Other),
            "identifier" => AssignSource::Parameter(self.text(right)),
            _ => AssignSource::Other,
        };
        match left.kind() {
            "field_access" => {
                let is_this = left
                    .child_by_field_name("object")
                    .is_some_and(|o| o.kind() == "this");
                if let (true, Some(field)) = (is_this, left.child_by_field_name("field")) {
                    self.facts.field_assignments.push(FieldAssignment {
                        field: self.text(field),
                        source,
                    });
                }
            }
            "identifier" => self.bare_assignments.push(FieldAssignment {
                field: self.text(left),
                source,
            }),
            _ => {}
        }
    }

    /// Resolve what needed scope information and return the facts.
    fn finish(mut self, params: &[ParamDecl], fields: &[String]) -> BodyFacts {
        let in_scope = |name: &str| {
            params.iter().any(|p| p.name == name)
                || self.facts.locals.iter().any(|l| l.name == name)
        };

        let bare: Vec<FieldAssignment> = self
            .bare_assignments
            .drain(..)
            .filter(|a| fields.contains(&a.field) && !in_scope(&a.field))
            .collect();
        let mut receivers = Vec::new();
        let mut variable_receivers = Vec::new();
        for call in self.receivers.drain(..) {
            let name = call.ty.to_string();
            if in_scope(&name) || fields.contains(&name) {
                variable_receivers.push(name);
            } else {
                receivers.push(call);
            }
        }

        self.facts.field_assignments.extend(bare);
        for assignment in &mut self.facts.field_assignments {
            if let AssignSource::Parameter(p) = &assignment.source {
                if !params.iter().any(|param| &param.name == p) {
                    assignment.source = AssignSource::Other;
                }
            }
        }
        for name in variable_receivers {
            push_unique(&mut self.facts.member_accesses, &name);
        }
        self.facts.static_calls = receivers;
        self.facts
    }
}

/// Builds [`ClassDecl`]s for every type declared in one compilation unit.
pub(crate) struct DeclExtractor<'a> {
    source: &'a str,
    path: &'a Path,
    package: Option<String>,
    imports: Vec<String>,
    decls: Vec<ClassDecl>,
}

impl<'a> DeclExtractor<'a> {
    pub(crate) fn new(
        source: &'a str,
        path: &'a Path,
        package: Option<String>,
        imports: Vec<String>,
    ) -> Self {
        Self {
            source,
            path,
            package,
            imports,
            decls: Vec::new(),
        }
    }

    pub(crate) fn run(mut self, root: Node) -> Vec<ClassDecl> {
        for child in named_children(root) {
            if TYPE_DECLARATIONS.contains(&child.kind()) {
                self.extract_type(child, None);
            }
        }
        self.decls
    }

    fn text(&self, node: Node) -> String {
        node_text(node, self.source)
    }

    /// Identifier text, or `None` for a node invented by error recovery.
    fn name_of(&self, node: Node) -> Option<String> {
        if node.is_missing() {
            return None;
        }
        let name = self.text(node);
        (!name.is_empty()).then_some(name)
    }

    fn location(&self, node: Node) -> SourceLocation {
        let pos = node.start_position();
        SourceLocation {
            file: self.path.to_path_buf(),
            line: pos.row + 1,
            column: pos.column + 1,
        }
    }

    fn extract_type(&mut self, node: Node, outer: Option<&str>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let Some(simple) = self.name_of(name_node) else {
            return;
        };
        let name = match (outer, &self.package) {
            (Some(outer), _) => format!("{outer}.{simple}"),
            (None, Some(package)) => format!("{package}.{simple}"),
            (None, None) => simple.clone(),
        };
        let modifiers = Modifiers::of(node, self.source);
        let kind = match node.kind() {
            "interface_declaration" => DeclKind::Interface,
            "enum_declaration" => DeclKind::Enum,
            _ if modifiers.is_abstract => DeclKind::AbstractClass,
            _ => DeclKind::Class,
        };
        let in_interface = kind == DeclKind::Interface;

        let mut decl = ClassDecl::new(name, kind);
        decl.imports = self.imports.clone();
        decl.location = Some(self.location(name_node));

        for child in children(node) {
            let kind = match child.kind() {
                "superclass" | "extends_interfaces" => SupertypeKind::Extends,
                "super_interfaces" => SupertypeKind::Implements,
                _ => continue,
            };
            decl.supertypes.extend(
                type_list(child, self.source)
                    .into_iter()
                    .map(|ty| Supertype { ty, kind }),
            );
        }

        if node.kind() == "record_declaration" {
            self.record_components(node, &simple, &mut decl);
        }

        let mut nested = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            self.members(body, &mut decl, in_interface, &mut nested);
        }

        let qualified = decl.name.clone();
        self.decls.push(decl);
        for inner in nested {
            self.extract_type(inner, Some(&qualified));
        }
    }

    /// Record components become private final fields set by the canonical
    /// constructor.
    fn record_components(&self, node: Node, simple: &str, decl: &mut ClassDecl) {
        let Some(params) = node.child_by_field_name("parameters") else {
            return;
        };
        let params = self.params(params);
        let mut assignments = Vec::new();
        for param in &params {
            decl.fields.push(FieldDecl {
                name: param.name.clone(),
                ty: param.ty.clone(),
                visibility: Visibility::Private,
                is_static: false,
                is_final: true,
                nullable: None,
                initializer: Initializer::None,
            });
            assignments.push(FieldAssignment {
                field: param.name.clone(),
                source: AssignSource::Parameter(param.name.clone()),
            });
        }
        decl.constructors.push(MethodDecl {
            name: simple.to_string(),
            params,
            return_type: None,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            body: BodyFacts {
                field_assignments: assignments,
                ..BodyFacts::default()
            },
        });
    }

    fn members<'t>(
        &self,
        body: Node<'t>,
        decl: &mut ClassDecl,
        in_interface: bool,
        nested: &mut Vec<Node<'t>>,
    ) {
        let mut callables = Vec::new();
        for member in named_children(body) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    decl.fields.extend(self.fields(member, in_interface));
                }
                "constructor_declaration" | "method_declaration" => callables.push(member),
                "enum_body_declarations" => {
                    self.members(member, decl, in_interface, nested);
                }
                kind if TYPE_DECLARATIONS.contains(&kind) => nested.push(member),
                _ => {}
            }
        }

        // Bodies need every field name to tell `f = x` from a local.
        let field_names: Vec<String> = decl.fields.iter().map(|f| f.name.clone()).collect();
        for node in callables {
            let Some(callable) = self.callable(node, &field_names, in_interface) else {
                continue;
            };
            if node.kind() == "constructor_declaration" {
                decl.constructors.push(callable);
            } else {
                decl.methods.push(callable);
            }
        }
    }

    fn fields(&self, node: Node, in_interface: bool) -> Vec<FieldDecl> {
        let modifiers = Modifiers::of(node, self.source);
        let Some(ty) = node
            .child_by_field_name("type")
            .and_then(|t| type_ref(t, self.source))
        else {
            return Vec::new();
        };

        children(node)
            .into_iter()
            .filter(|c| c.kind() == "variable_declarator")
            .filter_map(|declarator| {
                let name = self.name_of(declarator.child_by_field_name("name")?)?;
                let initializer = match declarator.child_by_field_name("value") {
                    None => Initializer::None,
                    Some(value) if value.kind() == "object_creation_expression" => value
                        .child_by_field_name("type")
                        .and_then(|t| type_ref(t, self.source))
                        .map(Initializer::New)
                        .unwrap_or(Initializer::Other),
                    Some(_) => Initializer::Other,
                };
                Some(FieldDecl {
                    name,
                    ty: with_declarator_dimensions(ty.clone(), declarator, self.source),
                    visibility: modifiers.visibility(in_interface),
                    is_static: modifiers.is_static || in_interface,
                    is_final: modifiers.is_final || in_interface,
                    nullable: modifiers.nullable,
                    initializer,
                })
            })
            .collect()
    }

    fn params(&self, node: Node) -> Vec<ParamDecl> {
        let mut params = Vec::new();
        for param in named_children(node) {
            match param.kind() {
                "formal_parameter" => {
                    let (Some(ty), Some(name)) = (
                        param
                            .child_by_field_name("type")
                            .and_then(|t| type_ref(t, self.source)),
                        param
                            .child_by_field_name("name")
                            .and_then(|n| self.name_of(n)),
                    ) else {
                        continue;
                    };
                    params.push(ParamDecl {
                        name,
                        ty: with_declarator_dimensions(ty, param, self.source),
                    });
                }
                // `Room... rooms`
                "spread_parameter" => {
                    let parts = named_children(param);
                    let ty = parts.iter().find_map(|p| type_ref(*p, self.source));
                    let name = parts
                        .iter()
                        .find(|p| p.kind() == "variable_declarator")
                        .and_then(|d| d.child_by_field_name("name"))
                        .and_then(|n| self.name_of(n));
                    if let (Some(ty), Some(name)) = (ty, name) {
                        params.push(ParamDecl {
                            name,
                            ty: TypeRef::array(ty),
                        });
                    }
                }
                _ => {}
            }
        }
        params
    }

    fn callable(&self, node: Node, fields: &[String], in_interface: bool) -> Option<MethodDecl> {
        let modifiers = Modifiers::of(node, self.source);
        let name = self.name_of(node.child_by_field_name("name")?)?;
        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.params(p))
            .unwrap_or_default();
        let return_type = node
            .child_by_field_name("type")
            .and_then(|t| type_ref(t, self.source));
        let body = node.child_by_field_name("body");
        let is_abstract = modifiers.is_abstract
            || (in_interface && body.is_none() && !modifiers.is_static && !modifiers.is_default);

        let facts = match body {
            Some(body) => {
                let mut scanner = BodyScanner::new(self.source);
                scanner.scan(body);
                scanner.finish(&params, fields)
            }
            None => BodyFacts::default(),
        };

        Some(MethodDecl {
            name,
            params,
            return_type,
            visibility: modifiers.visibility(in_interface),
            is_static: modifiers.is_static,
            is_abstract,
            body: facts,
        })
    }
}
