//! Analysis passes over a pipeline and the annotations they produce.

pub mod output_key_analysis;
pub mod scope;
pub mod var_analysis;

pub use output_key_analysis::OutputKeyAnalysis;
pub use scope::{flatten_keys, Scope, VarExistence};
pub use var_analysis::VarAnalysis;

use crate::context::AnalysisContext;
use crate::core::errors::Result;
use crate::core::{BrickPosition, Expression, ModDefinition};
use serde::Serialize;

/// Severity of an annotation shown to the pipeline author.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Structured payload attached to an annotation, sufficient for UI display
/// without re-running analysis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnotationDetail {
    /// The offending expression.
    pub expression: Expression,
    /// Variable names known at that point, sorted.
    pub known_vars: Vec<String>,
}

/// A non-fatal finding at a specific pipeline position.
///
/// Annotations are appended in traversal order and never deduplicated; the
/// rendering layer decides presentation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Annotation {
    pub position: BrickPosition,
    pub message: String,
    pub analysis_id: &'static str,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<AnnotationDetail>,
}

/// One analysis pass over a pipeline definition.
///
/// Passes are run fresh per edit; no state survives across runs. A pass
/// reports findings as annotations and reserves errors for structural
/// problems that make the pipeline unanalyzable.
pub trait Analysis {
    /// Stable identifier, carried on every annotation the pass emits.
    fn id(&self) -> &'static str;

    fn run(&mut self, mod_definition: &ModDefinition, context: &AnalysisContext<'_>)
        -> Result<()>;

    fn annotations(&self) -> &[Annotation];
}

/// Run a set of passes over one definition and collect their annotations in
/// pass order. The first structural error aborts the whole run.
pub fn run_analyses(
    mod_definition: &ModDefinition,
    context: &AnalysisContext<'_>,
    analyses: &mut [Box<dyn Analysis>],
) -> Result<Vec<Annotation>> {
    let mut annotations = Vec::new();
    for analysis in analyses.iter_mut() {
        log::debug!("running analysis '{}'", analysis.id());
        analysis.run(mod_definition, context)?;
        annotations.extend(analysis.annotations().iter().cloned());
    }
    Ok(annotations)
}
