//! The variable-scope pass.
//!
//! Walks the pipeline once and computes, for every brick, the set of
//! variable names known to exist on entry; references to names outside that
//! set become Warning annotations. Sub-pipeline bodies see the scope
//! available to their owning brick (plus the slot's injected variable, if
//! any) and never leak bindings back to the parent level.

use crate::analysis::scope::{Scope, VarExistence};
use crate::analysis::{Analysis, Annotation, AnnotationDetail, Severity};
use crate::context::{build_seed_scope, AnalysisContext};
use crate::core::errors::Result;
use crate::core::{BrickConfig, BrickPosition, Expression, ModDefinition, Pipeline};
use crate::visitor::{
    walk_brick, walk_pipeline, PipelineVisitor, VisitBrickExtra, VisitPipelineExtra,
};
use std::collections::HashMap;

const ANALYSIS_ID: &str = "var";

/// Frame tracking the last visited brick at the current pipeline level:
/// the scope it saw on entry and the output it bound, if any.
#[derive(Clone, Debug, Default)]
struct VisitedBrick {
    vars: Scope,
    output: Option<Scope>,
}

/// Static variable-scope analysis over one pipeline definition.
///
/// All state is private to one run; build a fresh instance per edit.
#[derive(Debug, Default)]
pub struct VarAnalysis {
    /// Scope visible at each brick's entry, keyed by brick path.
    known_vars: HashMap<String, Scope>,
    previous: VisitedBrick,
    /// Saved frames of enclosing pipelines, one per open slot.
    context_stack: Vec<VisitedBrick>,
    annotations: Vec<Annotation>,
    depth_limit: usize,
}

impl VarAnalysis {
    pub fn new() -> Self {
        Self {
            depth_limit: crate::config::DEFAULT_MAX_PIPELINE_DEPTH,
            ..Self::default()
        }
    }

    /// Scope snapshot table, keyed by brick path. Read-only after a run;
    /// editor UIs use it to answer "what variables are usable here".
    pub fn known_vars(&self) -> &HashMap<String, Scope> {
        &self.known_vars
    }

    pub fn take_annotations(&mut self) -> Vec<Annotation> {
        std::mem::take(&mut self.annotations)
    }
}

impl Analysis for VarAnalysis {
    fn id(&self) -> &'static str {
        ANALYSIS_ID
    }

    fn run(
        &mut self,
        mod_definition: &ModDefinition,
        context: &AnalysisContext<'_>,
    ) -> Result<()> {
        self.depth_limit = context.config.max_pipeline_depth;
        self.previous = VisitedBrick {
            vars: build_seed_scope(mod_definition, context),
            output: None,
        };

        self.visit_root_pipeline(&mod_definition.pipeline)
    }

    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl PipelineVisitor for VarAnalysis {
    fn visit_brick(
        &mut self,
        position: &BrickPosition,
        brick: &BrickConfig,
        extra: VisitBrickExtra,
    ) -> Result<()> {
        let empty = Scope::new();
        let current_vars = self
            .previous
            .vars
            .union(self.previous.output.as_ref().unwrap_or(&empty));
        self.known_vars
            .insert(position.path.clone(), current_vars.clone());

        let output = brick.output_key.as_ref().map(|output_key| {
            let existence = if brick.condition.is_none() {
                VarExistence::Definitely
            } else {
                VarExistence::Maybe
            };

            let mut output = Scope::singleton(format!("@{output_key}"), existence);
            // Shape is unknown statically, so any nested access stays
            // plausible once the output exists at all.
            output.insert(format!("@{output_key}.*"), VarExistence::Maybe);
            output
        });

        self.previous = VisitedBrick {
            vars: current_vars,
            output,
        };

        walk_brick(self, position, brick, extra)
    }

    fn visit_expression(
        &mut self,
        position: &BrickPosition,
        expression: &Expression,
        brick_position: &BrickPosition,
    ) -> Result<()> {
        let Expression::Var(name) = expression else {
            return Ok(());
        };

        // A missing snapshot means the brick hook never ran for this path;
        // treat it as an empty scope rather than fault.
        let known = self.known_vars.get(&brick_position.path);
        let resolved = known.is_some_and(|scope| scope.resolves(name));
        if !resolved {
            self.annotations.push(Annotation {
                position: position.clone(),
                message: format!("Variable {name} might not be defined"),
                analysis_id: ANALYSIS_ID,
                severity: Severity::Warning,
                detail: Some(AnnotationDetail {
                    expression: expression.clone(),
                    known_vars: known.map(Scope::names).unwrap_or_default(),
                }),
            });
        }

        Ok(())
    }

    fn visit_pipeline(
        &mut self,
        position: &BrickPosition,
        pipeline: &Pipeline,
        extra: VisitPipelineExtra<'_>,
    ) -> Result<()> {
        // Slot bodies start from the owning brick's entry scope, not from
        // sibling outputs accumulated after it, plus the slot's injected
        // variable when one is declared.
        let injected = extra
            .input_key
            .map(|input_key| Scope::singleton(format!("@{input_key}"), VarExistence::Definitely));

        self.context_stack.push(self.previous.clone());
        self.previous = VisitedBrick {
            vars: self.previous.vars.clone(),
            output: injected,
        };

        let result = walk_pipeline(self, position, pipeline, extra);

        // Pop even on the error path so the stack stays symmetric.
        self.previous = self.context_stack.pop().unwrap_or_default();
        result
    }

    fn depth_limit(&self) -> usize {
        self.depth_limit
    }
}
