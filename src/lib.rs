//! Static variable-scope analysis for brick pipelines.
//!
//! A pipeline is an ordered sequence of configured bricks, possibly nesting
//! sub-pipelines in named slots (loop bodies, branch bodies). On every edit
//! the host runs the analyses in this crate against the current tree to warn
//! when a brick references a variable that is not guaranteed to exist at that
//! point, without executing anything.
//!
//! ```
//! use pipescope::analysis::{Analysis, VarAnalysis};
//! use pipescope::config::AnalysisConfig;
//! use pipescope::context::{AnalysisContext, EmptyRegistry};
//! use pipescope::core::{BrickConfig, Expression, ModDefinition, Pipeline};
//!
//! let mut greet = BrickConfig::new("util/echo");
//! greet.config.insert("message".into(), Expression::var("@input.title"));
//!
//! let definition = ModDefinition::new("trigger/page-load", Pipeline::new(vec![greet]));
//! let config = AnalysisConfig::default();
//! let context = AnalysisContext::new(&EmptyRegistry, &EmptyRegistry, &config);
//!
//! let mut analysis = VarAnalysis::new();
//! analysis.run(&definition, &context).unwrap();
//! // No reader seeded @input, so the reference is flagged.
//! assert_eq!(analysis.annotations().len(), 1);
//! ```

pub mod analysis;
pub mod config;
pub mod context;
pub mod core;
pub mod visitor;

pub use crate::analysis::{
    run_analyses, Analysis, Annotation, AnnotationDetail, OutputKeyAnalysis, Scope, Severity,
    VarAnalysis, VarExistence,
};
pub use crate::config::AnalysisConfig;
pub use crate::context::{
    build_seed_scope, AnalysisContext, EmptyRegistry, IntegrationContextLookup, ReaderSchemaLookup,
};
pub use crate::core::errors::{Error, Result};
pub use crate::core::{
    BrickConfig, BrickPosition, Expression, IntegrationRef, ModDefinition, Pipeline, SubPipeline,
};
pub use crate::visitor::{PipelineVisitor, VisitBrickExtra, VisitPipelineExtra};
