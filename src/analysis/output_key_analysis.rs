//! Output-key validity pass.
//!
//! A brick's output key becomes the variable name `@{key}`, so it has to be
//! a plain identifier for downstream references to parse. Violations are
//! Error-severity annotations; they do not stop analysis of the rest of the
//! pipeline.

use crate::analysis::{Analysis, Annotation, Severity};
use crate::context::AnalysisContext;
use crate::core::errors::Result;
use crate::core::{BrickConfig, BrickPosition, ModDefinition};
use crate::visitor::{walk_brick, PipelineVisitor, VisitBrickExtra};
use once_cell::sync::Lazy;
use regex::Regex;

const ANALYSIS_ID: &str = "outputKey";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Za-z][A-Za-z0-9_]*$").expect("static pattern"));

#[derive(Debug, Default)]
pub struct OutputKeyAnalysis {
    annotations: Vec<Annotation>,
}

impl OutputKeyAnalysis {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Analysis for OutputKeyAnalysis {
    fn id(&self) -> &'static str {
        ANALYSIS_ID
    }

    fn run(
        &mut self,
        mod_definition: &ModDefinition,
        _context: &AnalysisContext<'_>,
    ) -> Result<()> {
        self.visit_root_pipeline(&mod_definition.pipeline)
    }

    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl PipelineVisitor for OutputKeyAnalysis {
    fn visit_brick(
        &mut self,
        position: &BrickPosition,
        brick: &BrickConfig,
        extra: VisitBrickExtra,
    ) -> Result<()> {
        if let Some(output_key) = &brick.output_key {
            if !IDENTIFIER.is_match(output_key) {
                self.annotations.push(Annotation {
                    position: position.clone(),
                    message: format!(
                        "Output key \"{output_key}\" must start with a letter and contain only letters, numbers, and underscores"
                    ),
                    analysis_id: ANALYSIS_ID,
                    severity: Severity::Error,
                    detail: None,
                });
            }
        }

        walk_brick(self, position, brick, extra)
    }
}
