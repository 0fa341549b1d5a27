//! Field classification: how strongly does a class own what it stores?

use serde::{Deserialize, Serialize};

use crate::ast::{AssignSource, ClassDecl, FieldDecl, Initializer, TypeRef};
use crate::error::Result;
use crate::relationship::Candidate;
use crate::resolver::{Resolution, TypeResolver};
use crate::types::{Multiplicity, RelationshipKind};

/// Structural evidence about who creates a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OwnershipClue {
    /// Instantiated by the owner: at the declaration, or in every constructor.
    ConstructedInline,
    /// Assigned from a constructor or setter parameter.
    Injected,
    None,
}

/// A field reduced to what classification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub resolution: Resolution,
    pub clue: OwnershipClue,
    pub nullable: bool,
}

/// Map a member to its relationship candidates. Foreign members yield none.
pub fn classify(member: &Member) -> Vec<Candidate> {
    let label = Some(member.name.clone());
    let edge = |target: &str, kind, multiplicity| Candidate {
        target: target.to_string(),
        kind,
        multiplicity: Some(multiplicity),
        label: label.clone(),
    };

    match &member.resolution {
        Resolution::Foreign => Vec::new(),
        collection @ (Resolution::List(_) | Resolution::Set(_) | Resolution::Map { .. }) => {
            collection
                .targets()
                .into_iter()
                .map(|t| edge(t, RelationshipKind::Aggregation, Multiplicity::Many))
                .collect()
        }
        Resolution::Optional(target) => vec![edge(
            target,
            RelationshipKind::Association,
            Multiplicity::ZeroOrOne,
        )],
        Resolution::Scalar(target) => {
            let (kind, multiplicity) = match member.clue {
                OwnershipClue::ConstructedInline => {
                    (RelationshipKind::Composition, Multiplicity::One)
                }
                OwnershipClue::Injected if member.nullable => {
                    (RelationshipKind::Association, Multiplicity::ZeroOrOne)
                }
                OwnershipClue::Injected => (RelationshipKind::Association, Multiplicity::One),
                OwnershipClue::None => (RelationshipKind::Association, Multiplicity::ZeroOrOne),
            };
            vec![edge(target, kind, multiplicity)]
        }
    }
}

/// Derive the ownership clue of `field`, whose resolved target is `target`.
///
/// Any assignment from a parameter marks the field injected, even when it is
/// also constructed somewhere. Inline construction requires `new target(..)`
/// at the declaration or in every constructor that does not delegate to
/// `this(..)`.
pub fn ownership_clue(
    decl: &ClassDecl,
    field: &FieldDecl,
    target: &str,
    resolver: &TypeResolver,
) -> OwnershipClue {
    let constructs = |ty: &TypeRef| {
        matches!(
            resolver.resolve(ty, &decl.name),
            Ok(Resolution::Scalar(ref t)) if t == target
        )
    };

    let injected = decl.callables().any(|m| {
        m.body.field_assignments.iter().any(|a| {
            a.field == field.name
                && matches!(&a.source, AssignSource::Parameter(p)
                    if m.params.iter().any(|param| &param.name == p))
        })
    });
    if injected {
        return OwnershipClue::Injected;
    }

    if let Initializer::New(ty) = &field.initializer {
        if constructs(ty) {
            return OwnershipClue::ConstructedInline;
        }
    }

    let mut constructors = decl
        .constructors
        .iter()
        .filter(|c| !c.body.delegates_to_this)
        .peekable();
    if constructors.peek().is_some()
        && constructors.all(|c| {
            c.body.field_assignments.iter().any(|a| {
                a.field == field.name && matches!(&a.source, AssignSource::New(ty) if constructs(ty))
            })
        })
    {
        return OwnershipClue::ConstructedInline;
    }

    OwnershipClue::None
}

/// Classify every field of `decl`.
pub fn classify_fields(decl: &ClassDecl, resolver: &TypeResolver) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();
    for field in &decl.fields {
        let resolution = resolver.resolve(&field.ty, &decl.name)?;
        let clue = match &resolution {
            Resolution::Scalar(target) => ownership_clue(decl, field, target, resolver),
            _ => OwnershipClue::None,
        };
        let member = Member {
            name: field.name.clone(),
            resolution,
            clue,
            nullable: field.nullable.unwrap_or(false),
        };
        candidates.extend(classify(&member));
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::config::ResolverConfig;
    use crate::resolver::TypeTable;
    use crate::types::Visibility;

    fn resolver(decls: &[ClassDecl]) -> TypeResolver {
        let config = ResolverConfig::default();
        TypeResolver::new(TypeTable::from_declarations(decls, &config), &config)
    }

    fn field(name: &str, ty: TypeRef, initializer: Initializer) -> FieldDecl {
        FieldDecl {
            name: name.to_string(),
            ty,
            visibility: Visibility::Private,
            is_static: false,
            is_final: false,
            nullable: None,
            initializer,
        }
    }

    fn constructor(params: &[(&str, &str)], assignments: Vec<FieldAssignment>) -> MethodDecl {
        MethodDecl {
            name: "<init>".to_string(),
            params: params
                .iter()
                .map(|(n, t)| ParamDecl {
                    name: n.to_string(),
                    ty: TypeRef::named(*t),
                })
                .collect(),
            return_type: None,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            body: BodyFacts {
                field_assignments: assignments,
                ..BodyFacts::default()
            },
        }
    }

    fn assign(field: &str, source: AssignSource) -> FieldAssignment {
        FieldAssignment {
            field: field.to_string(),
            source,
        }
    }

    fn analyze(owner: ClassDecl) -> Vec<Candidate> {
        let decls = vec![
            owner,
            ClassDecl::new("Logger", DeclKind::Class),
            ClassDecl::new("Room", DeclKind::Class),
            ClassDecl::new("Light", DeclKind::Class),
            ClassDecl::new("Thermostat", DeclKind::Class),
        ];
        let r = resolver(&decls);
        classify_fields(&decls[0], &r).unwrap()
    }

    #[test]
    fn test_inline_initializer_is_composition() {
        let mut owner = ClassDecl::new("IntegrationTest", DeclKind::Class);
        owner.fields.push(field(
            "logger",
            TypeRef::named("Logger"),
            Initializer::New(TypeRef::named("Logger")),
        ));
        let edges = analyze(owner);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, RelationshipKind::Composition);
        assert_eq!(edges[0].multiplicity, Some(Multiplicity::One));
        assert_eq!(edges[0].label.as_deref(), Some("logger"));
    }

    #[test]
    fn test_construction_in_every_constructor_is_composition() {
        let mut owner = ClassDecl::new("Hub", DeclKind::Class);
        owner
            .fields
            .push(field("logger", TypeRef::named("Logger"), Initializer::None));
        owner.constructors.push(constructor(
            &[],
            vec![assign("logger", AssignSource::New(TypeRef::named("Logger")))],
        ));
        owner.constructors.push(constructor(
            &[("level", "int")],
            vec![assign("logger", AssignSource::New(TypeRef::named("Logger")))],
        ));
        assert_eq!(analyze(owner)[0].kind, RelationshipKind::Composition);
    }

    #[test]
    fn test_construction_in_some_constructors_is_association() {
        let mut owner = ClassDecl::new("Hub", DeclKind::Class);
        owner
            .fields
            .push(field("logger", TypeRef::named("Logger"), Initializer::None));
        owner.constructors.push(constructor(
            &[],
            vec![assign("logger", AssignSource::New(TypeRef::named("Logger")))],
        ));
        owner.constructors.push(constructor(&[("level", "int")], vec![]));
        let edges = analyze(owner);
        assert_eq!(edges[0].kind, RelationshipKind::Association);
        assert_eq!(edges[0].multiplicity, Some(Multiplicity::ZeroOrOne));
    }

    #[test]
    fn test_delegating_constructor_is_ignored() {
        let mut owner = ClassDecl::new("Hub", DeclKind::Class);
        owner
            .fields
            .push(field("logger", TypeRef::named("Logger"), Initializer::None));
        owner.constructors.push(constructor(
            &[],
            vec![assign("logger", AssignSource::New(TypeRef::named("Logger")))],
        ));
        let mut delegating = constructor(&[("level", "int")], vec![]);
        delegating.body.delegates_to_this = true;
        owner.constructors.push(delegating);
        assert_eq!(analyze(owner)[0].kind, RelationshipKind::Composition);
    }

    #[test]
    fn test_injected_field_is_association() {
        let mut owner = ClassDecl::new("Hub", DeclKind::Class);
        owner
            .fields
            .push(field("room", TypeRef::named("Room"), Initializer::None));
        owner.constructors.push(constructor(
            &[("room", "Room")],
            vec![assign("room", AssignSource::Parameter("room".to_string()))],
        ));
        let edges = analyze(owner);
        assert_eq!(edges[0].kind, RelationshipKind::Association);
        assert_eq!(edges[0].multiplicity, Some(Multiplicity::One));
    }

    #[test]
    fn test_nullable_injected_field_is_optional() {
        let mut owner = ClassDecl::new("Hub", DeclKind::Class);
        let mut room = field("room", TypeRef::named("Room"), Initializer::None);
        room.nullable = Some(true);
        owner.fields.push(room);
        let mut setter = constructor(
            &[("room", "Room")],
            vec![assign("room", AssignSource::Parameter("room".to_string()))],
        );
        setter.name = "setRoom".to_string();
        owner.methods.push(setter);
        let edges = analyze(owner);
        assert_eq!(edges[0].kind, RelationshipKind::Association);
        assert_eq!(edges[0].multiplicity, Some(Multiplicity::ZeroOrOne));
    }

    #[test]
    fn test_injection_beats_inline_construction() {
        let mut owner = ClassDecl::new("Hub", DeclKind::Class);
        owner.fields.push(field(
            "logger",
            TypeRef::named("Logger"),
            Initializer::New(TypeRef::named("Logger")),
        ));
        let mut setter = constructor(
            &[("logger", "Logger")],
            vec![assign("logger", AssignSource::Parameter("logger".to_string()))],
        );
        setter.name = "setLogger".to_string();
        owner.methods.push(setter);
        assert_eq!(analyze(owner)[0].kind, RelationshipKind::Association);
    }

    #[test]
    fn test_unassigned_field_is_optional_association() {
        let mut owner = ClassDecl::new("Hub", DeclKind::Class);
        owner
            .fields
            .push(field("room", TypeRef::named("Room"), Initializer::Other));
        let edges = analyze(owner);
        assert_eq!(edges[0].kind, RelationshipKind::Association);
        assert_eq!(edges[0].multiplicity, Some(Multiplicity::ZeroOrOne));
    }

    #[test]
    fn test_constructing_a_different_type_is_not_composition() {
        let mut owner = ClassDecl::new("Hub", DeclKind::Class);
        owner.fields.push(field(
            "room",
            TypeRef::named("Room"),
            Initializer::New(TypeRef::named("Light")),
        ));
        assert_eq!(analyze(owner)[0].kind, RelationshipKind::Association);
    }

    #[test]
    fn test_collections_are_aggregation_even_when_constructed() {
        let mut owner = ClassDecl::new("SmartHomeController", DeclKind::Class);
        let list = TypeRef::generic("List", vec![TypeRef::named("Room")]);
        owner.fields.push(field(
            "rooms",
            list,
            Initializer::New(TypeRef::generic("ArrayList", vec![])),
        ));
        owner.fields.push(field(
            "lightThermostatMap",
            TypeRef::generic(
                "Map",
                vec![TypeRef::named("Light"), TypeRef::named("Thermostat")],
            ),
            Initializer::None,
        ));
        let edges = analyze(owner);
        assert_eq!(edges.len(), 3);
        assert!(edges
            .iter()
            .all(|e| e.kind == RelationshipKind::Aggregation
                && e.multiplicity == Some(Multiplicity::Many)));
        let targets: Vec<&str> = edges.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["Room", "Light", "Thermostat"]);
    }

    #[test]
    fn test_foreign_fields_produce_nothing() {
        let mut owner = ClassDecl::new("Hub", DeclKind::Class);
        owner
            .fields
            .push(field("name", TypeRef::named("String"), Initializer::Other));
        owner
            .fields
            .push(field("count", TypeRef::named("int"), Initializer::None));
        assert!(analyze(owner).is_empty());
    }

    #[test]
    fn test_classify_is_pure() {
        let member = Member {
            name: "room".to_string(),
            resolution: Resolution::Optional("Room".to_string()),
            clue: OwnershipClue::ConstructedInline,
            nullable: false,
        };
        let edges = classify(&member);
        assert_eq!(edges[0].kind, RelationshipKind::Association);
        assert_eq!(edges[0].multiplicity, Some(Multiplicity::ZeroOrOne));
        assert_eq!(classify(&member), edges);
    }
}
