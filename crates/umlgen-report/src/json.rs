use serde::Serialize;

use umlgen_core::model::DiagramModel;
use umlgen_core::pipeline::Analysis;
use umlgen_core::types::{Entity, EntityKind, Relationship, RelationshipKind};

fn to_json<T: Serialize>(value: &T, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

/// Model output with run diagnostics.
#[derive(Debug, Serialize)]
pub struct ModelReport<'a> {
    pub entities: Vec<&'a Entity>,
    pub relationships: &'a [Relationship],
    pub failures: Vec<String>,
    pub duplicates: &'a [String],
}

impl<'a> From<&'a Analysis> for ModelReport<'a> {
    fn from(analysis: &'a Analysis) -> Self {
        Self {
            entities: analysis.model.entities().collect(),
            relationships: analysis.model.relationships(),
            failures: analysis.failures.iter().map(|e| e.to_string()).collect(),
            duplicates: &analysis.duplicates,
        }
    }
}

/// Format the diagram model as JSON.
pub fn format_model(analysis: &Analysis, compact: bool) -> serde_json::Result<String> {
    to_json(&ModelReport::from(analysis), compact)
}

/// Diagram in the intermediate shape consumed by GLSP class-diagram editors.
#[derive(Debug, Serialize)]
pub struct GlspDiagram {
    pub nodes: Vec<GlspNode>,
    pub edges: Vec<GlspEdge>,
}

#[derive(Debug, Serialize)]
pub struct GlspNode {
    pub id: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub properties: Vec<GlspProperty>,
    pub operations: Vec<GlspOperation>,
    pub comment: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlspProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub access_modifier: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlspOperation {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub access_modifier: &'static str,
    pub attributes: Vec<GlspAttribute>,
}

#[derive(Debug, Serialize)]
pub struct GlspAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlspEdge {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub from_id: usize,
    pub to_id: usize,
    pub multiplicity: String,
    pub label: String,
}

fn node_type(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Class | EntityKind::External => "class",
        EntityKind::AbstractClass => "abstract-class",
        EntityKind::Interface => "interface",
        EntityKind::Enum => "enumeration",
    }
}

fn edge_type(kind: RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::Inheritance => "generalization",
        RelationshipKind::Realization => "interface-realization",
        RelationshipKind::Composition => "composition",
        RelationshipKind::Aggregation => "aggregation",
        RelationshipKind::Association => "association",
        RelationshipKind::Dependency => "dependency",
    }
}

fn glsp_node(id: usize, entity: &Entity, include_members: bool) -> GlspNode {
    let (properties, operations) = if include_members {
        (
            entity
                .fields
                .iter()
                .map(|f| GlspProperty {
                    name: f.name.clone(),
                    ty: f.ty.clone(),
                    access_modifier: f.visibility.symbol(),
                })
                .collect(),
            entity
                .methods
                .iter()
                .map(|m| GlspOperation {
                    name: m.name.clone(),
                    ty: m.return_type.clone().unwrap_or_else(|| "void".to_string()),
                    access_modifier: m.visibility.symbol(),
                    attributes: m
                        .params
                        .iter()
                        .map(|p| GlspAttribute {
                            name: p.name.clone(),
                            ty: p.ty.clone(),
                        })
                        .collect(),
                })
                .collect(),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    GlspNode {
        id,
        name: entity.simple_name().to_string(),
        kind: node_type(entity.kind),
        properties,
        operations,
        comment: if entity.is_external() {
            "external".to_string()
        } else {
            String::new()
        },
    }
}

/// Convert a model to the GLSP intermediate diagram. Node ids are positions
/// in the model.
pub fn glsp_diagram(model: &DiagramModel, include_members: bool) -> GlspDiagram {
    let nodes = model
        .entities()
        .enumerate()
        .map(|(id, entity)| glsp_node(id, entity, include_members))
        .collect();
    let edges = model
        .relationships()
        .iter()
        .filter_map(|r| {
            Some(GlspEdge {
                kind: edge_type(r.kind),
                from_id: model.index_of(&r.source)?,
                to_id: model.index_of(&r.target)?,
                multiplicity: r.multiplicity.map(|m| m.to_string()).unwrap_or_default(),
                label: r.label.clone().unwrap_or_default(),
            })
        })
        .collect();
    GlspDiagram { nodes, edges }
}

/// Format the GLSP intermediate diagram as JSON.
pub fn format_glsp(
    model: &DiagramModel,
    include_members: bool,
    compact: bool,
) -> serde_json::Result<String> {
    to_json(&glsp_diagram(model, include_members), compact)
}
