pub mod diagram;
pub mod dot;
pub mod json;
pub mod text;

/// Escape `"` for quoted labels in Mermaid and DOT output.
pub(crate) fn quote(s: &str) -> String {
    s.replace('"', "\\\"")
}

#[cfg(test)]
pub(crate) mod test_support {
    use umlgen_core::ast::*;
    use umlgen_core::config::{ResolverConfig, UnknownTypePolicy};
    use umlgen_core::pipeline::{Analysis, AnalysisPipeline};
    use umlgen_core::types::Visibility;

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

    /// Hub owns a Logger, aggregates Rooms (which aggregate Hubs back) and
    /// refers to an undeclared Clock; Light is an ADevice and Switchable.
    pub(crate) fn smart_home() -> Analysis {
        let mut hub = ClassDecl::new("home.Hub", DeclKind::Class);
        hub.fields.push(field(
            "logger",
            TypeRef::named("Logger"),
            Initializer::New(TypeRef::named("Logger")),
        ));
        hub.fields.push(field(
            "rooms",
            TypeRef::generic("List", vec![TypeRef::named("Room")]),
            Initializer::None,
        ));
        hub.fields
            .push(field("clock", TypeRef::named("Clock"), Initializer::None));
        hub.methods.push(MethodDecl {
            name: "add".to_string(),
            params: vec![ParamDecl {
                name: "room".to_string(),
                ty: TypeRef::named("Room"),
            }],
            return_type: None,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            body: BodyFacts::default(),
        });

        let mut room = ClassDecl::new("home.Room", DeclKind::Class);
        room.fields.push(field(
            "hubs",
            TypeRef::generic("Set", vec![TypeRef::named("Hub")]),
            Initializer::None,
        ));

        let mut light = ClassDecl::new("home.Light", DeclKind::Class);
        light.supertypes = vec![
            Supertype {
                ty: TypeRef::named("ADevice"),
                kind: SupertypeKind::Extends,
            },
            Supertype {
                ty: TypeRef::named("Switchable"),
                kind: SupertypeKind::Implements,
            },
        ];

        let decls = vec![
            hub,
            ClassDecl::new("home.Logger", DeclKind::Class),
            room,
            ClassDecl::new("home.ADevice", DeclKind::AbstractClass),
            light,
            ClassDecl::new("home.Switchable", DeclKind::Interface),
        ];
        AnalysisPipeline::with_resolver_config(ResolverConfig {
            unknown_types: UnknownTypePolicy::External,
            ..ResolverConfig::default()
        })
        .analyze(decls)
        .unwrap()
    }
}
