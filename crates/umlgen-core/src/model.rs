//! The class-diagram model handed to renderers.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::AnalysisError;
use crate::relationship::RelationshipSet;
use crate::types::{Entity, Relationship};

/// Entities and relationships of one analysis run.
///
/// Every relationship endpoint is an entity of the model, either declared or
/// an external stub. The model is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramModel {
    entities: IndexMap<String, Entity>,
    relationships: Vec<Relationship>,
}

impl DiagramModel {
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn relationships_from<'a>(
        &'a self,
        source: &'a str,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships.iter().filter(move |r| r.source == source)
    }

    /// Position of an entity in declaration order; used as a stable node id.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entities.get_index_of(name)
    }

    /// True when every relationship endpoint exists.
    pub fn is_closed(&self) -> bool {
        self.relationships
            .iter()
            .all(|r| self.contains(&r.source) && self.contains(&r.target))
    }
}

/// Assembles a [`DiagramModel`].
#[derive(Debug, Default)]
pub struct ModelBuilder {
    entities: IndexMap<String, Entity>,
    relationships: RelationshipSet,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declared entity. A second entity with the same name is
    /// rejected and the first one kept.
    pub fn add_entity(&mut self, entity: Entity) -> Result<(), AnalysisError> {
        if self.entities.contains_key(&entity.name) {
            tracing::warn!(entity = %entity.name, "duplicate declaration ignored");
            return Err(AnalysisError::DuplicateEntity { name: entity.name });
        }
        self.entities.insert(entity.name.clone(), entity);
        Ok(())
    }

    pub fn add_relationships(&mut self, relationships: impl IntoIterator<Item = Relationship>) {
        self.relationships.extend(relationships);
    }

    /// Finish the model, adding an external stub for every endpoint that has
    /// no entity.
    pub fn build(mut self) -> DiagramModel {
        let mut stubs = 0usize;
        for r in self.relationships.iter() {
            for name in [&r.source, &r.target] {
                if !self.entities.contains_key(name.as_str()) {
                    self.entities.insert(name.clone(), Entity::external(name));
                    stubs += 1;
                }
            }
        }
        tracing::debug!(
            entities = self.entities.len(),
            relationships = self.relationships.len(),
            stubs,
            "diagram model built"
        );
        DiagramModel {
            entities: self.entities,
            relationships: self.relationships.into_vec(),
        }
    }
}
