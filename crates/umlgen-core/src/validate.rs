//! Shape checks on normalized declarations before any classification runs.

use std::collections::HashSet;

use crate::ast::{ClassDecl, MethodDecl, TypeRef};
use crate::error::{AnalysisError, Result};

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

fn is_qualified_name(name: &str) -> bool {
    is_identifier(name) && name.split('.').all(|segment| !segment.is_empty())
}

fn check_type(entity: &str, ty: &TypeRef, context: &str) -> Result<()> {
    match ty {
        TypeRef::Named { name, args } => {
            if !is_qualified_name(name) {
                return Err(AnalysisError::malformed(
                    entity,
                    format!("invalid type name `{name}` in {context}"),
                ));
            }
            args.iter().try_for_each(|arg| check_type(entity, arg, context))
        }
        TypeRef::Array(element) => check_type(entity, element, context),
    }
}

fn check_callable(entity: &str, method: &MethodDecl) -> Result<()> {
    if !is_identifier(&method.name) {
        return Err(AnalysisError::malformed(
            entity,
            format!("invalid method name `{}`", method.name),
        ));
    }
    let mut seen = HashSet::new();
    for param in &method.params {
        if !is_identifier(&param.name) {
            return Err(AnalysisError::malformed(
                entity,
                format!("empty parameter name in `{}`", method.name),
            ));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(AnalysisError::malformed(
                entity,
                format!("duplicate parameter `{}` in `{}`", param.name, method.name),
            ));
        }
        check_type(entity, &param.ty, &format!("parameter `{}`", param.name))?;
    }
    if let Some(ret) = &method.return_type {
        check_type(entity, ret, &format!("return type of `{}`", method.name))?;
    }
    for local in &method.body.locals {
        check_type(entity, &local.ty, &format!("local `{}`", local.name))?;
    }
    for call in &method.body.static_calls {
        check_type(entity, &call.ty, &format!("static call `{}`", call.method))?;
    }
    Ok(())
}

/// Check one declaration.
pub fn validate_declaration(decl: &ClassDecl) -> Result<()> {
    if !is_qualified_name(&decl.name) {
        return Err(AnalysisError::malformed(&decl.name, "invalid qualified name"));
    }
    let entity = decl.name.as_str();

    let mut fields = HashSet::new();
    for field in &decl.fields {
        if !is_identifier(&field.name) {
            return Err(AnalysisError::malformed(entity, "empty field name"));
        }
        if !fields.insert(field.name.as_str()) {
            return Err(AnalysisError::malformed(
                entity,
                format!("duplicate field `{}`", field.name),
            ));
        }
        check_type(entity, &field.ty, &format!("field `{}`", field.name))?;
    }
    for method in decl.callables() {
        check_callable(entity, method)?;
    }
    for supertype in &decl.supertypes {
        check_type(entity, &supertype.ty, "supertype")?;
    }
    Ok(())
}

/// Check every declaration; the first malformed one fails the run.
pub fn validate_all(decls: &[ClassDecl]) -> Result<()> {
    decls.iter().try_for_each(validate_declaration)
}
