pub mod analyzer;
pub mod ast;
pub mod config;
pub mod error;
pub mod graph;
pub mod member;
pub mod model;
pub mod pipeline;
pub mod relationship;
pub mod resolver;
pub mod source;
pub mod types;
pub mod usage;
pub mod validate;

pub use analyzer::{LanguageFrontend, ParsedFile};
pub use ast::ClassDecl;
pub use config::Config;
pub use error::AnalysisError;
pub use graph::ClassGraph;
pub use model::DiagramModel;
pub use pipeline::{Analysis, AnalysisPipeline, CancellationToken};
pub use source::SourceCollector;
pub use types::*;
