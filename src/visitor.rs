//! Generic pre-order traversal over a pipeline tree.
//!
//! Visits every brick exactly once in document order (depth-first, config
//! entries in declared order), and every expression reachable from a brick's
//! configuration before moving on to the next sibling brick. Passes override
//! the `visit_*` hooks they care about and delegate to the matching `walk_*`
//! function to keep the default traversal; an un-overridden hook is pure
//! traversal.
//!
//! Structural errors (a brick without an id, a pipeline expression nested
//! inside a structured value, nesting past the configured limit) abort the
//! walk with an error instead of producing partial results.

use crate::config::DEFAULT_MAX_PIPELINE_DEPTH;
use crate::core::errors::{Error, Result};
use crate::core::{BrickConfig, BrickPosition, Expression, Pipeline};

/// Context handed to `visit_brick`.
#[derive(Clone, Copy, Debug)]
pub struct VisitBrickExtra {
    /// Index of the brick within its pipeline.
    pub index: usize,
    /// Nesting depth of the enclosing pipeline; the root pipeline is 0.
    pub depth: usize,
}

/// Context handed to `visit_pipeline`: which named slot of which parent brick
/// is being entered, or all-`None` for the root pipeline.
#[derive(Clone, Copy, Debug)]
pub struct VisitPipelineExtra<'a> {
    pub parent: Option<&'a BrickConfig>,
    pub slot_name: Option<&'a str>,
    /// Variable the slot injects into its body (without the `@` sigil).
    pub input_key: Option<&'a str>,
    pub depth: usize,
}

impl VisitPipelineExtra<'_> {
    pub fn root() -> Self {
        VisitPipelineExtra {
            parent: None,
            slot_name: None,
            input_key: None,
            depth: 0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

pub trait PipelineVisitor {
    /// Entry point for one traversal.
    fn visit_root_pipeline(&mut self, pipeline: &Pipeline) -> Result<()> {
        self.visit_pipeline(&BrickPosition::root(), pipeline, VisitPipelineExtra::root())
    }

    /// Fires for the root pipeline and for every slot body, bracketing the
    /// walk of its bricks. Overrides that push/pop state should wrap their
    /// call to [`walk_pipeline`].
    fn visit_pipeline(
        &mut self,
        position: &BrickPosition,
        pipeline: &Pipeline,
        extra: VisitPipelineExtra<'_>,
    ) -> Result<()> {
        walk_pipeline(self, position, pipeline, extra)
    }

    fn visit_brick(
        &mut self,
        position: &BrickPosition,
        brick: &BrickConfig,
        extra: VisitBrickExtra,
    ) -> Result<()> {
        walk_brick(self, position, brick, extra)
    }

    /// Leaf hook; fires for `Var` and `Literal` expressions together with the
    /// position of the enclosing brick. Default is a no-op.
    fn visit_expression(
        &mut self,
        _position: &BrickPosition,
        _expression: &Expression,
        _brick_position: &BrickPosition,
    ) -> Result<()> {
        Ok(())
    }

    /// Maximum slot nesting depth tolerated before traversal aborts.
    fn depth_limit(&self) -> usize {
        DEFAULT_MAX_PIPELINE_DEPTH
    }
}

pub fn walk_pipeline<V>(
    visitor: &mut V,
    position: &BrickPosition,
    pipeline: &Pipeline,
    extra: VisitPipelineExtra<'_>,
) -> Result<()>
where
    V: PipelineVisitor + ?Sized,
{
    for (index, brick) in pipeline.bricks.iter().enumerate() {
        let brick_position = position.brick(index);
        if brick.id.is_empty() {
            return Err(Error::MissingBrickId {
                path: brick_position.path,
            });
        }

        visitor.visit_brick(
            &brick_position,
            brick,
            VisitBrickExtra {
                index,
                depth: extra.depth,
            },
        )?;
    }

    Ok(())
}

pub fn walk_brick<V>(
    visitor: &mut V,
    position: &BrickPosition,
    brick: &BrickConfig,
    extra: VisitBrickExtra,
) -> Result<()>
where
    V: PipelineVisitor + ?Sized,
{
    // The guard references variables too.
    if let Some(condition) = &brick.condition {
        walk_expression(visitor, &position.join("if"), condition, position)?;
    }

    for (key, value) in &brick.config {
        let entry_position = position.config_entry(key);
        match value {
            Expression::Pipeline(sub) => {
                let depth = extra.depth + 1;
                if depth > visitor.depth_limit() {
                    return Err(Error::NestingTooDeep {
                        path: entry_position.path,
                        limit: visitor.depth_limit(),
                    });
                }

                visitor.visit_pipeline(
                    &entry_position,
                    &sub.pipeline,
                    VisitPipelineExtra {
                        parent: Some(brick),
                        slot_name: Some(key),
                        input_key: sub.input_key.as_deref(),
                        depth,
                    },
                )?;
            }
            expression => {
                walk_expression(visitor, &entry_position, expression, position)?;
            }
        }
    }

    Ok(())
}

pub fn walk_expression<V>(
    visitor: &mut V,
    position: &BrickPosition,
    expression: &Expression,
    brick_position: &BrickPosition,
) -> Result<()>
where
    V: PipelineVisitor + ?Sized,
{
    match expression {
        Expression::Var(_) | Expression::Literal(_) => {
            visitor.visit_expression(position, expression, brick_position)
        }
        Expression::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk_expression(visitor, &position.join(&index.to_string()), item, brick_position)?;
            }
            Ok(())
        }
        Expression::Object(entries) => {
            for (key, value) in entries {
                walk_expression(visitor, &position.join(key), value, brick_position)?;
            }
            Ok(())
        }
        // Direct slot entries are dispatched by walk_brick, so any pipeline
        // reaching this point is nested inside a structured value.
        Expression::Pipeline(_) => Err(Error::MisplacedPipeline {
            path: position.path.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SubPipeline;
    use pretty_assertions::assert_eq;

    /// Records one line per hook invocation, in firing order.
    #[derive(Default)]
    struct RecordingVisitor {
        events: Vec<String>,
        depth_limit: Option<usize>,
    }

    impl PipelineVisitor for RecordingVisitor {
        fn visit_pipeline(
            &mut self,
            position: &BrickPosition,
            pipeline: &Pipeline,
            extra: VisitPipelineExtra<'_>,
        ) -> Result<()> {
            self.events.push(format!(
                "enter {} slot={:?} input={:?}",
                if position.path.is_empty() { "<root>" } else { &position.path },
                extra.slot_name,
                extra.input_key
            ));
            let result = walk_pipeline(self, position, pipeline, extra);
            self.events.push("exit".to_string());
            result
        }

        fn visit_brick(
            &mut self,
            position: &BrickPosition,
            brick: &BrickConfig,
            extra: VisitBrickExtra,
        ) -> Result<()> {
            self.events.push(format!("brick {} {}", position.path, brick.id));
            walk_brick(self, position, brick, extra)
        }

        fn visit_expression(
            &mut self,
            position: &BrickPosition,
            expression: &Expression,
            _brick_position: &BrickPosition,
        ) -> Result<()> {
            if let Expression::Var(name) = expression {
                self.events.push(format!("var {} {}", position.path, name));
            }
            Ok(())
        }

        fn depth_limit(&self) -> usize {
            self.depth_limit.unwrap_or(DEFAULT_MAX_PIPELINE_DEPTH)
        }
    }

    fn loop_brick(body: Vec<BrickConfig>) -> BrickConfig {
        let mut brick = BrickConfig::new("control/for-each");
        brick.config.insert(
            "elements".into(),
            Expression::var("@input.items"),
        );
        brick.config.insert(
            "body".into(),
            Expression::Pipeline(SubPipeline::with_input_key("item", body)),
        );
        brick
    }

    fn echo_brick(message: Expression) -> BrickConfig {
        let mut brick = BrickConfig::new("util/echo");
        brick.config.insert("message".into(), message);
        brick
    }

    #[test]
    fn visits_in_document_order_with_slot_context() {
        let pipeline = Pipeline::new(vec![
            loop_brick(vec![echo_brick(Expression::var("@item"))]),
            echo_brick(Expression::literal("done")),
        ]);

        let mut visitor = RecordingVisitor::default();
        visitor.visit_root_pipeline(&pipeline).unwrap();

        assert_eq!(
            visitor.events,
            vec![
                "enter <root> slot=None input=None",
                "brick 0 control/for-each",
                "var 0.config.elements @input.items",
                "enter 0.config.body slot=Some(\"body\") input=Some(\"item\")",
                "brick 0.config.body.0 util/echo",
                "var 0.config.body.0.config.message @item",
                "exit",
                "brick 1 util/echo",
                "exit",
            ]
        );
    }

    #[test]
    fn finds_vars_nested_in_structured_values() {
        let mut entries = indexmap::IndexMap::new();
        entries.insert("title".to_string(), Expression::var("@form.title"));
        let brick = echo_brick(Expression::Array(vec![
            Expression::literal(1),
            Expression::Object(entries),
        ]));

        let mut visitor = RecordingVisitor::default();
        visitor
            .visit_root_pipeline(&Pipeline::new(vec![brick]))
            .unwrap();

        assert!(visitor
            .events
            .contains(&"var 0.config.message.1.title @form.title".to_string()));
    }

    #[test]
    fn guard_expression_is_visited_before_config() {
        let mut brick = echo_brick(Expression::literal("hi"));
        brick.condition = Some(Expression::var("@flags.enabled"));

        let mut visitor = RecordingVisitor::default();
        visitor
            .visit_root_pipeline(&Pipeline::new(vec![brick]))
            .unwrap();

        assert!(visitor.events.contains(&"var 0.if @flags.enabled".to_string()));
    }

    #[test]
    fn missing_brick_id_is_fatal() {
        let pipeline = Pipeline::new(vec![BrickConfig::new("")]);
        let mut visitor = RecordingVisitor::default();
        let err = visitor.visit_root_pipeline(&pipeline).unwrap_err();
        assert!(matches!(err, Error::MissingBrickId { path } if path == "0"));
    }

    #[test]
    fn nested_pipeline_expression_is_fatal() {
        let brick = echo_brick(Expression::Array(vec![Expression::Pipeline(
            SubPipeline::new(Pipeline::default()),
        )]));
        let mut visitor = RecordingVisitor::default();
        let err = visitor
            .visit_root_pipeline(&Pipeline::new(vec![brick]))
            .unwrap_err();
        assert!(matches!(err, Error::MisplacedPipeline { path } if path == "0.config.message.0"));
    }

    #[test]
    fn depth_limit_aborts_traversal() {
        let inner = loop_brick(vec![echo_brick(Expression::literal("deep"))]);
        let outer = loop_brick(vec![inner]);
        let mut visitor = RecordingVisitor {
            depth_limit: Some(1),
            ..Default::default()
        };
        let err = visitor
            .visit_root_pipeline(&Pipeline::new(vec![outer]))
            .unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep { limit: 1, .. }));
    }
}
