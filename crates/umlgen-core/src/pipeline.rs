use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::ast::ClassDecl;
use crate::config::{Config, ResolverConfig};
use crate::error::{AnalysisError, Result};
use crate::model::{DiagramModel, ModelBuilder};
use crate::relationship;
use crate::resolver::{TypeResolver, TypeTable};
use crate::types::Entity;
use crate::validate;

/// Output of one run: the model plus what went wrong on the way.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub model: DiagramModel,
    /// Entities whose classification failed (strict mode). They appear in the
    /// model without any outgoing relationship.
    pub failures: Vec<AnalysisError>,
    /// Names declared more than once; the first declaration was kept.
    pub duplicates: Vec<String>,
}

impl Analysis {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Shared flag for aborting a run from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Reusable analysis pipeline: declarations in, diagram model out.
pub struct AnalysisPipeline {
    resolver_config: ResolverConfig,
}

impl AnalysisPipeline {
    pub fn new(config: &Config) -> Self {
        Self::with_resolver_config(config.resolver.clone())
    }

    pub fn with_resolver_config(resolver_config: ResolverConfig) -> Self {
        Self { resolver_config }
    }

    /// Run the classification over `decls`.
    ///
    /// Malformed input fails the whole run. Unresolved types in strict mode
    /// fail only the referencing entity.
    pub fn analyze(&self, decls: Vec<ClassDecl>) -> Result<Analysis> {
        self.analyze_with_cancellation(decls, &CancellationToken::new())
    }

    /// Like [`analyze`](Self::analyze), aborted with `Cancelled` once
    /// `cancellation` is set. The token only affects this run.
    pub fn analyze_with_cancellation(
        &self,
        decls: Vec<ClassDecl>,
        cancellation: &CancellationToken,
    ) -> Result<Analysis> {
        validate::validate_all(&decls)?;

        let mut builder = ModelBuilder::new();
        let mut duplicates = Vec::new();
        let mut unique = Vec::with_capacity(decls.len());
        for decl in decls {
            match builder.add_entity(Entity::from(&decl)) {
                Ok(()) => unique.push(decl),
                Err(AnalysisError::DuplicateEntity { name }) => duplicates.push(name),
                Err(e) => return Err(e),
            }
        }

        // Fresh per run; dropped when this call returns.
        let resolver = TypeResolver::new(
            TypeTable::from_declarations(&unique, &self.resolver_config),
            &self.resolver_config,
        );

        let per_entity: Vec<Result<Vec<_>>> = unique
            .par_iter()
            .map(|decl| {
                if cancellation.is_cancelled() {
                    return Err(AnalysisError::Cancelled);
                }
                relationship::relationships_for(decl, &resolver)
            })
            .collect();

        if cancellation.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        let mut failures = Vec::new();
        for outcome in per_entity {
            match outcome {
                Ok(relationships) => builder.add_relationships(relationships),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("{e}");
                    failures.push(e);
                }
            }
        }

        let (hits, misses) = resolver.cache_stats();
        tracing::debug!(
            entities = unique.len(),
            known_types = resolver.table().len(),
            cache_hits = hits,
            cache_misses = misses,
            "classification finished"
        );

        Ok(Analysis {
            model: builder.build(),
            failures,
            duplicates,
        })
    }
}
