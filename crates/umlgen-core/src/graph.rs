use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::model::DiagramModel;
use crate::types::{EntityKind, Multiplicity, RelationshipKind};

/// Node in the class graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub name: String,
    pub kind: EntityKind,
}

/// Edge in the class graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub kind: RelationshipKind,
    pub multiplicity: Option<Multiplicity>,
    pub label: Option<String>,
}

/// Directed graph view over a [`DiagramModel`].
pub struct ClassGraph {
    graph: DiGraph<GraphNode, GraphEdge>,
    index: HashMap<String, NodeIndex>,
}

impl ClassGraph {
    pub fn from_model(model: &DiagramModel) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for entity in model.entities() {
            let idx = graph.add_node(GraphNode {
                name: entity.name.clone(),
                kind: entity.kind,
            });
            index.insert(entity.name.clone(), idx);
        }
        for r in model.relationships() {
            // Closed model: both endpoints are present.
            if let (Some(&from), Some(&to)) = (index.get(&r.source), index.get(&r.target)) {
                graph.add_edge(
                    from,
                    to,
                    GraphEdge {
                        kind: r.kind,
                        multiplicity: r.multiplicity,
                        label: r.label.clone(),
                    },
                );
            }
        }
        Self { graph, index }
    }

    /// Iterate over all edges with their source and target nodes.
    pub fn edges_with_nodes(&self) -> Vec<(&GraphNode, &GraphNode, &GraphEdge)> {
        self.graph
            .edge_references()
            .map(|e| {
                let src = &self.graph[e.source()];
                let tgt = &self.graph[e.target()];
                (src, tgt, e.weight())
            })
            .collect()
    }

    /// Groups of entities that own each other in a cycle through composition
    /// or aggregation edges. A composition cycle cannot be honoured at
    /// runtime, so renderers surface these as warnings.
    pub fn ownership_cycles(&self) -> Vec<Vec<String>> {
        let ownership = self.graph.filter_map(
            |_, node| Some(node.name.clone()),
            |_, edge| edge.kind.is_ownership().then_some(()),
        );
        let mut cycles: Vec<Vec<String>> = petgraph::algo::kosaraju_scc(&ownership)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut names: Vec<String> =
                    scc.iter().map(|&idx| ownership[idx].clone()).collect();
                names.sort();
                names
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Direct subtypes (inheritance or realization) of `name`.
    pub fn subtypes_of(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let mut subtypes: Vec<&str> = self
            .graph
            .edges_directed(idx, petgraph::Direction::Incoming)
            .filter(|e| {
                matches!(
                    e.weight().kind,
                    RelationshipKind::Inheritance | RelationshipKind::Realization
                )
            })
            .map(|e| self.graph[e.source()].name.as_str())
            .collect();
        subtypes.sort_unstable();
        subtypes
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get all nodes
    pub fn nodes(&self) -> Vec<&GraphNode> {
        self.graph.node_weights().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelBuilder;
    use crate::types::Relationship;

    fn edge(from: &str, to: &str, kind: RelationshipKind) -> Relationship {
        Relationship {
            source: from.to_string(),
            target: to.to_string(),
            kind,
            multiplicity: None,
            label: None,
        }
    }

    fn graph(edges: Vec<Relationship>) -> ClassGraph {
        let mut builder = ModelBuilder::new();
        builder.add_relationships(edges);
        ClassGraph::from_model(&builder.build())
    }

    #[test]
    fn test_from_model() {
        let g = graph(vec![
            edge("A", "B", RelationshipKind::Composition),
            edge("A", "C", RelationshipKind::Dependency),
        ]);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.edges_with_nodes().len(), 2);
        assert_eq!(g.nodes().len(), 3);
    }

    #[test]
    fn test_ownership_cycles_ignore_other_kinds() {
        let g = graph(vec![
            edge("A", "B", RelationshipKind::Composition),
            edge("B", "A", RelationshipKind::Aggregation),
            edge("C", "D", RelationshipKind::Association),
            edge("D", "C", RelationshipKind::Association),
        ]);
        let cycles = g.ownership_cycles();
        assert_eq!(cycles, vec![vec!["A".to_string(), "B".to_string()]]);
    }

    #[test]
    fn test_subtypes_of() {
        let g = graph(vec![
            edge("Light", "ADevice", RelationshipKind::Inheritance),
            edge("Thermostat", "ADevice", RelationshipKind::Inheritance),
            edge("Hub", "ADevice", RelationshipKind::Aggregation),
        ]);
        assert_eq!(g.subtypes_of("ADevice"), vec!["Light", "Thermostat"]);
        assert!(g.subtypes_of("Missing").is_empty());
    }
}
