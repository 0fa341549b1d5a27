use std::collections::HashMap;

use umlgen_core::model::DiagramModel;
use umlgen_core::types::{Entity, EntityKind, RelationshipKind};

use crate::quote;

/// Generate a GraphViz DOT class diagram with UML arrowheads.
pub fn generate_class_diagram(model: &DiagramModel, include_members: bool) -> String {
    let mut out = String::new();
    out.push_str("digraph classes {\n");
    out.push_str("  rankdir=BT;\n");
    out.push_str("  node [shape=record, fontname=\"Helvetica\", fontsize=10];\n");
    out.push_str("  edge [fontname=\"Helvetica\", fontsize=9];\n\n");

    let ids: HashMap<&str, String> = model
        .entities()
        .map(|e| (e.name.as_str(), sanitize_dot_id(&e.name)))
        .collect();

    for entity in model.entities() {
        let id = &ids[entity.name.as_str()];
        let label = record_label(entity, include_members);
        match entity.kind {
            EntityKind::External => out.push_str(&format!(
                "  {id} [label=\"{label}\", style=dashed];\n"
            )),
            _ => out.push_str(&format!("  {id} [label=\"{label}\"];\n")),
        }
    }
    out.push('\n');

    for r in model.relationships() {
        let (Some(from), Some(to)) = (ids.get(r.source.as_str()), ids.get(r.target.as_str()))
        else {
            continue;
        };
        let mut attrs = vec![match r.kind {
            RelationshipKind::Inheritance => "arrowhead=empty".to_string(),
            RelationshipKind::Realization => "arrowhead=empty, style=dashed".to_string(),
            RelationshipKind::Composition => {
                "dir=both, arrowtail=diamond, arrowhead=vee".to_string()
            }
            RelationshipKind::Aggregation => {
                "dir=both, arrowtail=odiamond, arrowhead=vee".to_string()
            }
            RelationshipKind::Association => "arrowhead=vee".to_string(),
            RelationshipKind::Dependency => "arrowhead=vee, style=dashed".to_string(),
        }];
        if let Some(label) = &r.label {
            attrs.push(format!("label=\"{}\"", quote(label)));
        }
        if let Some(m) = r.multiplicity {
            attrs.push(format!("headlabel=\"{m}\""));
        }
        out.push_str(&format!("  {from} -> {to} [{}];\n", attrs.join(", ")));
    }

    out.push_str("}\n");
    out
}

/// `{«interface»\nName|fields|methods}` with record-special characters escaped.
fn record_label(entity: &Entity, include_members: bool) -> String {
    let mut title = String::new();
    match entity.kind {
        EntityKind::Class => {}
        EntityKind::AbstractClass => title.push_str("«abstract»\\n"),
        EntityKind::Interface => title.push_str("«interface»\\n"),
        EntityKind::Enum => title.push_str("«enumeration»\\n"),
        EntityKind::External => title.push_str("«external»\\n"),
    }
    title.push_str(&escape_record(entity.simple_name()));

    if !include_members || entity.is_external() {
        return format!("{{{title}}}");
    }

    let fields: String = entity
        .fields
        .iter()
        .map(|f| {
            escape_record(&format!(
                "{} {} : {}",
                f.visibility.symbol(),
                f.name,
                f.ty
            )) + "\\l"
        })
        .collect();
    let methods: String = entity
        .methods
        .iter()
        .map(|m| {
            let params: Vec<String> = m
                .params
                .iter()
                .map(|p| format!("{} : {}", p.name, p.ty))
                .collect();
            let ret = m
                .return_type
                .as_deref()
                .map(|t| format!(" : {t}"))
                .unwrap_or_default();
            escape_record(&format!(
                "{} {}({}){ret}",
                m.visibility.symbol(),
                m.name,
                params.join(", ")
            )) + "\\l"
        })
        .collect();
    format!("{{{title}|{fields}|{methods}}}")
}

fn escape_record(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '{' | '}' | '|' | '<' | '>' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out.trim_start().to_string()
}

/// Sanitize a string to be a valid DOT node ID.
fn sanitize_dot_id(s: &str) -> String {
    s.replace(['/', '.', '-', ' ', '$'], "_")
}
