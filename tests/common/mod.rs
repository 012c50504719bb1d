//! Shared fixtures for integration tests.

#![allow(dead_code)]

use pipescope::analysis::Analysis;
use pipescope::{
    AnalysisConfig, AnalysisContext, BrickConfig, EmptyRegistry, Expression, IntegrationContextLookup,
    IntegrationRef, ModDefinition, Pipeline, ReaderSchemaLookup, SubPipeline, VarAnalysis,
};
use serde_json::Value;

/// Reader registry that returns a fixed property tree for every trigger.
pub struct FixedReader(pub Value);

impl ReaderSchemaLookup for FixedReader {
    fn output_properties(&self, _trigger: &str) -> anyhow::Result<Option<Value>> {
        Ok(Some(self.0.clone()))
    }
}

/// Integration registry that returns a fixed context object.
pub struct FixedIntegrations(pub Value);

impl IntegrationContextLookup for FixedIntegrations {
    fn integration_context(&self, _integrations: &[IntegrationRef]) -> anyhow::Result<Value> {
        Ok(self.0.clone())
    }
}

/// Registry whose lookups always fail.
pub struct BrokenRegistry;

impl ReaderSchemaLookup for BrokenRegistry {
    fn output_properties(&self, trigger: &str) -> anyhow::Result<Option<Value>> {
        anyhow::bail!("no schema service for trigger '{trigger}'")
    }
}

impl IntegrationContextLookup for BrokenRegistry {
    fn integration_context(&self, _integrations: &[IntegrationRef]) -> anyhow::Result<Value> {
        anyhow::bail!("integration service unreachable")
    }
}

pub fn producer(output_key: &str) -> BrickConfig {
    let mut brick = BrickConfig::new("util/produce");
    brick.output_key = Some(output_key.into());
    brick
}

pub fn guarded_producer(output_key: &str, condition: Expression) -> BrickConfig {
    let mut brick = producer(output_key);
    brick.condition = Some(condition);
    brick
}

pub fn consumer(name: &str) -> BrickConfig {
    let mut brick = BrickConfig::new("util/echo");
    brick.config.insert("message".into(), Expression::var(name));
    brick
}

pub fn for_each(input_key: &str, body: Vec<BrickConfig>) -> BrickConfig {
    let mut brick = BrickConfig::new("control/for-each");
    brick.config.insert(
        "elements".into(),
        Expression::literal(serde_json::json!(["a", "b"])),
    );
    brick.config.insert(
        "body".into(),
        Expression::Pipeline(SubPipeline::with_input_key(input_key, body)),
    );
    brick
}

/// Run the variable-scope pass with empty registries.
pub fn analyze(pipeline: Pipeline) -> VarAnalysis {
    analyze_with(ModDefinition::new("trigger/manual", pipeline), &EmptyRegistry)
}

/// Run the variable-scope pass against a specific reader registry.
pub fn analyze_with(definition: ModDefinition, reader: &dyn ReaderSchemaLookup) -> VarAnalysis {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = AnalysisConfig::default();
    let context = AnalysisContext::new(reader, &EmptyRegistry, &config);

    let mut analysis = VarAnalysis::new();
    analysis
        .run(&definition, &context)
        .expect("structurally valid pipeline");
    analysis
}
