use tree_sitter::Node;

use umlgen_core::ast::TypeRef;

use crate::node_text;

/// `java.util. List` → `java.util.List`
fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn wrap_array(mut ty: TypeRef, dimensions: usize) -> TypeRef {
    for _ in 0..dimensions {
        ty = TypeRef::array(ty);
    }
    ty
}

/// Number of `[]` pairs in a `dimensions` node.
pub(crate) fn dimension_count(node: Node, source: &str) -> usize {
    node_text(node, source).matches('[').count()
}

/// Apply the declarator-side dimensions of `int values[]` to `ty`.
pub(crate) fn with_declarator_dimensions(ty: TypeRef, declarator: Node, source: &str) -> TypeRef {
    match declarator.child_by_field_name("dimensions") {
        Some(dims) => wrap_array(ty, dimension_count(dims, source)),
        None => ty,
    }
}

fn type_arguments(node: Node, source: &str) -> Vec<TypeRef> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter_map(|arg| type_ref(arg, source))
        .collect()
}

/// Convert a type node to a [`TypeRef`]. `void` and unsupported shapes yield
/// `None`.
pub(crate) fn type_ref(node: Node, source: &str) -> Option<TypeRef> {
    if node.is_missing() {
        return None;
    }
    match node.kind() {
        "type_identifier" | "integral_type" | "floating_point_type" | "boolean_type" => {
            Some(TypeRef::named(node_text(node, source)))
        }
        "scoped_type_identifier" => Some(TypeRef::named(compact(&node_text(node, source)))),
        "generic_type" => {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            let base = children
                .iter()
                .find(|c| matches!(c.kind(), "type_identifier" | "scoped_type_identifier"))?;
            let args = children
                .iter()
                .find(|c| c.kind() == "type_arguments")
                .map(|a| type_arguments(*a, source))
                .unwrap_or_default();
            Some(TypeRef::generic(compact(&node_text(*base, source)), args))
        }
        "array_type" => {
            let element = type_ref(node.child_by_field_name("element")?, source)?;
            let dimensions = node
                .child_by_field_name("dimensions")
                .map(|d| dimension_count(d, source))
                .unwrap_or(1);
            Some(wrap_array(element, dimensions))
        }
        "annotated_type" => {
            let mut cursor = node.walk();
            let inner = node
                .named_children(&mut cursor)
                .filter(|c| !matches!(c.kind(), "marker_annotation" | "annotation"))
                .last();
            inner.and_then(|t| type_ref(t, source))
        }
        // `?` alone is Object; `? extends T` and `? super T` use the bound
        "wildcard" => {
            let mut cursor = node.walk();
            let bound = node
                .named_children(&mut cursor)
                .filter(|c| !matches!(c.kind(), "marker_annotation" | "annotation"))
                .last();
            match bound {
                Some(b) => type_ref(b, source),
                None => Some(TypeRef::named("Object")),
            }
        }
        _ => None,
    }
}

/// Types listed under `extends`/`implements`, generic arguments kept.
pub(crate) fn type_list(node: Node, source: &str) -> Vec<TypeRef> {
    let mut refs = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "type_list" {
            refs.extend(type_list(child, source));
        } else if let Some(ty) = type_ref(child, source) {
            refs.push(ty);
        }
    }
    refs
}
