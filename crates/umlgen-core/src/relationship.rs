//! Turns classifier output into deduplicated, directed relationships.

use indexmap::IndexMap;

use crate::ast::{ClassDecl, DeclKind, SupertypeKind};
use crate::error::Result;
use crate::member;
use crate::resolver::{Resolution, TypeResolver};
use crate::types::{Relationship, RelationshipKey, RelationshipKind};
use crate::usage;

/// A relationship seen from its source entity, before the source is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub target: String,
    pub kind: RelationshipKind,
    pub multiplicity: Option<crate::types::Multiplicity>,
    pub label: Option<String>,
}

impl Candidate {
    pub fn into_relationship(self, source: &str) -> Relationship {
        Relationship {
            source: source.to_string(),
            target: self.target,
            kind: self.kind,
            multiplicity: self.multiplicity,
            label: self.label,
        }
    }
}

/// Relationships keyed by identity. The first edge inserted for a key wins.
#[derive(Debug, Clone, Default)]
pub struct RelationshipSet {
    edges: IndexMap<RelationshipKey, Relationship>,
}

impl RelationshipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when an edge with the same identity was already present.
    pub fn insert(&mut self, relationship: Relationship) -> bool {
        let key = relationship.key();
        if self.edges.contains_key(&key) {
            return false;
        }
        self.edges.insert(key, relationship);
        true
    }

    pub fn extend(&mut self, relationships: impl IntoIterator<Item = Relationship>) {
        for r in relationships {
            self.insert(r);
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.edges.values()
    }

    pub fn into_vec(self) -> Vec<Relationship> {
        self.edges.into_values().collect()
    }
}

/// Inheritance and realization edges from the declared supertypes.
///
/// An interface extending another interface is inheritance; a class
/// implementing one is realization. Foreign supertypes are dropped.
pub fn supertype_candidates(decl: &ClassDecl, resolver: &TypeResolver) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();
    for supertype in &decl.supertypes {
        let Resolution::Scalar(target) = resolver.resolve(&supertype.ty, &decl.name)? else {
            continue;
        };
        if target == decl.name {
            continue;
        }
        let kind = match (supertype.kind, decl.kind) {
            (SupertypeKind::Extends, _) | (SupertypeKind::Implements, DeclKind::Interface) => {
                RelationshipKind::Inheritance
            }
            (SupertypeKind::Implements, _) => RelationshipKind::Realization,
        };
        candidates.push(Candidate {
            target,
            kind,
            multiplicity: None,
            label: None,
        });
    }
    Ok(candidates)
}

/// All relationships originating at `decl`: supertypes, then fields, then
/// transient usages. Fails as a whole if any type of `decl` is unresolvable
/// in strict mode.
pub fn relationships_for(decl: &ClassDecl, resolver: &TypeResolver) -> Result<Vec<Relationship>> {
    let supertypes = supertype_candidates(decl, resolver)?;
    let fields = member::classify_fields(decl, resolver)?;
    let usages = usage::classify_usages(decl, resolver)?;

    let mut set = RelationshipSet::new();
    set.extend(
        supertypes
            .into_iter()
            .chain(fields)
            .chain(usages)
            .map(|c| c.into_relationship(&decl.name)),
    );
    Ok(set.into_vec())
}
