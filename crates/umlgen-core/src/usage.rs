//! Transient references: parameters, locals and static receivers that a class
//! uses without storing them in a field.

use std::collections::HashSet;

use crate::ast::{AssignSource, BodyFacts, ClassDecl, MethodDecl, TypeRef};
use crate::error::Result;
use crate::relationship::Candidate;
use crate::resolver::{Resolution, TypeResolver};
use crate::types::{Multiplicity, RelationshipKind};

/// How a transient reference is used inside a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// A member of it is accessed.
    MemberAccess,
    /// Passed on to another call and nothing else (or not used at all).
    PassThrough,
    /// Receiver of a static call; no instance involved.
    Static,
}

impl Usage {
    fn of(name: &str, body: &BodyFacts) -> Self {
        if body.accesses_member_of(name) {
            Usage::MemberAccess
        } else {
            Usage::PassThrough
        }
    }
}

/// Map a usage of `resolution` to candidates.
pub fn classify(resolution: &Resolution, usage: Usage, label: &str) -> Vec<Candidate> {
    let multiplicity = match resolution.arity() {
        Some(arity) if arity.is_collection() => Multiplicity::Many,
        _ => Multiplicity::One,
    };
    resolution
        .targets()
        .into_iter()
        .map(|target| {
            let (kind, multiplicity) = match usage {
                Usage::MemberAccess => (RelationshipKind::Association, Some(multiplicity)),
                Usage::PassThrough | Usage::Static => (RelationshipKind::Dependency, None),
            };
            Candidate {
                target: target.to_string(),
                kind,
                multiplicity,
                label: Some(label.to_string()),
            }
        })
        .collect()
}

fn stores_parameter(method: &MethodDecl, param: &str) -> bool {
    method
        .body
        .field_assignments
        .iter()
        .any(|a| matches!(&a.source, AssignSource::Parameter(p) if p == param))
}

/// Classify the transient references of every constructor and method.
///
/// Types already stored in a field of `decl` are left to the member
/// classifier, and references back to `decl` itself are dropped.
pub fn classify_usages(decl: &ClassDecl, resolver: &TypeResolver) -> Result<Vec<Candidate>> {
    let mut stored = HashSet::new();
    for field in &decl.fields {
        let resolution = resolver.resolve(&field.ty, &decl.name)?;
        stored.extend(resolution.targets().into_iter().map(str::to_string));
    }

    let mut candidates = Vec::new();
    let mut push = |resolution: Resolution, usage: Usage, label: &str| {
        candidates.extend(
            classify(&resolution, usage, label)
                .into_iter()
                .filter(|c| c.target != decl.name && !stored.contains(&c.target)),
        );
    };

    for method in decl.callables() {
        let references = method
            .params
            .iter()
            .filter(|p| !stores_parameter(method, &p.name))
            .map(|p| (&p.name, &p.ty))
            .chain(method.body.locals.iter().map(|l| (&l.name, &l.ty)));
        for (name, ty) in references {
            let resolution = resolver.resolve(ty, &decl.name)?;
            push(resolution, Usage::of(name, &method.body), name);
        }

        for call in &method.body.static_calls {
            let resolution = resolve_receiver(resolver, &call.ty, &decl.name)?;
            push(resolution, Usage::Static, &call.method);
        }
    }

    Ok(candidates)
}

fn resolve_receiver(resolver: &TypeResolver, ty: &TypeRef, entity: &str) -> Result<Resolution> {
    // `List.of(..)` names a container without instantiating it
    Ok(match resolver.resolve(ty, entity)? {
        scalar @ Resolution::Scalar(_) => scalar,
        _ => Resolution::Foreign,
    })
}
