use std::collections::HashMap;

use umlgen_core::model::DiagramModel;
use umlgen_core::types::{Entity, EntityKind, RelationshipKind};

use crate::quote;

/// Generate a Mermaid class diagram.
///
/// Entities are labelled with their simple name; ids are derived from the
/// qualified name so that equal simple names in different packages stay
/// apart.
pub fn generate_class_diagram(model: &DiagramModel, include_members: bool) -> String {
    let mut out = String::new();
    out.push_str("classDiagram\n");

    let ids: HashMap<&str, String> = model
        .entities()
        .map(|e| (e.name.as_str(), sanitize_mermaid_id(&e.name)))
        .collect();

    for entity in model.entities() {
        let id = &ids[entity.name.as_str()];
        out.push_str(&format!(
            "  class {id}[\"{}\"]\n",
            quote(entity.simple_name())
        ));
        if let Some(stereotype) = stereotype(entity.kind) {
            out.push_str(&format!("  <<{stereotype}>> {id}\n"));
        }
        if include_members {
            push_members(&mut out, id, entity);
        }
    }

    for r in model.relationships() {
        let (Some(from), Some(to)) = (ids.get(r.source.as_str()), ids.get(r.target.as_str()))
        else {
            continue;
        };
        let arrow = match r.kind {
            RelationshipKind::Inheritance => "--|>",
            RelationshipKind::Realization => "..|>",
            RelationshipKind::Composition => "*--",
            RelationshipKind::Aggregation => "o--",
            RelationshipKind::Association => "-->",
            RelationshipKind::Dependency => "..>",
        };
        let cardinality = r
            .multiplicity
            .map(|m| format!(" \"{m}\""))
            .unwrap_or_default();
        let label = r
            .label
            .as_deref()
            .map(|l| format!(" : {l}"))
            .unwrap_or_default();
        out.push_str(&format!("  {from} {arrow}{cardinality} {to}{label}\n"));
    }

    out
}

fn stereotype(kind: EntityKind) -> Option<&'static str> {
    match kind {
        EntityKind::Class => None,
        EntityKind::AbstractClass => Some("abstract"),
        EntityKind::Interface => Some("interface"),
        EntityKind::Enum => Some("enumeration"),
        EntityKind::External => Some("external"),
    }
}

fn push_members(out: &mut String, id: &str, entity: &Entity) {
    for field in &entity.fields {
        out.push_str(&format!(
            "  {id} : {}{} {}\n",
            field.visibility.symbol(),
            mermaid_type(&field.ty),
            field.name
        ));
    }
    for method in &entity.methods {
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| format!("{} {}", mermaid_type(&p.ty), p.name))
            .collect();
        let ret = method
            .return_type
            .as_deref()
            .map(|t| format!(" {}", mermaid_type(t)))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {id} : {}{}({}){ret}\n",
            method.visibility.symbol(),
            method.name,
            params.join(", ")
        ));
    }
}

/// Mermaid writes generics as `List~Room~`.
fn mermaid_type(ty: &str) -> String {
    ty.replace(['<', '>'], "~")
}

/// Sanitize a string to be a valid Mermaid node ID.
fn sanitize_mermaid_id(s: &str) -> String {
    s.replace(['/', '.', '-', ' ', '$'], "_")
        .replace(['<', '>'], "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::smart_home;

    #[test]
    fn test_generate_class_diagram() {
        let diagram = generate_class_diagram(&smart_home().model, true);
        assert!(diagram.starts_with("classDiagram\n"));
        assert!(diagram.contains("  class home_Hub[\"Hub\"]\n"));
        assert!(diagram.contains("  <<abstract>> home_ADevice\n"));
        assert!(diagram.contains("  <<interface>> home_Switchable\n"));
        assert!(diagram.contains("  <<external>> Clock\n"));
        assert!(diagram.contains("  home_Hub : -List~Room~ rooms\n"));
        assert!(diagram.contains("  home_Hub : +add(Room room)\n"));
    }

    #[test]
    fn test_relationship_arrows() {
        let diagram = generate_class_diagram(&smart_home().model, false);
        assert!(diagram.contains("  home_Hub *-- \"1\" home_Logger : logger\n"));
        assert!(diagram.contains("  home_Hub o-- \"0..*\" home_Room : rooms\n"));
        assert!(diagram.contains("  home_Hub --> \"0..1\" Clock : clock\n"));
        assert!(diagram.contains("  home_Light --|> home_ADevice\n"));
        assert!(diagram.contains("  home_Light ..|> home_Switchable\n"));
        assert!(!diagram.contains(" : -"));
    }
}
