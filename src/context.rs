//! Collaborator interfaces and seed-scope construction.
//!
//! The analyzer never reaches into global registries; the host injects
//! read-only lookup capabilities here, which keeps runs deterministic and
//! testable with fixed fixtures.

use crate::analysis::scope::{flatten_keys, Scope};
use crate::config::AnalysisConfig;
use crate::core::{IntegrationRef, ModDefinition};
use serde_json::{Map, Value};

/// Resolves a trigger/source type to the output property tree of its reader.
///
/// The top-level (and nested) property names seed `@input` bindings; `None`
/// means no reader, which simply yields no `@input` bindings.
pub trait ReaderSchemaLookup {
    fn output_properties(&self, trigger: &str) -> anyhow::Result<Option<Value>>;
}

/// Resolves configured integrations to a context object. Only the key
/// structure of the returned value is used; values are ignored.
pub trait IntegrationContextLookup {
    fn integration_context(&self, integrations: &[IntegrationRef]) -> anyhow::Result<Value>;
}

/// Registry that knows nothing; handy for hosts without readers or
/// integrations and for tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyRegistry;

impl ReaderSchemaLookup for EmptyRegistry {
    fn output_properties(&self, _trigger: &str) -> anyhow::Result<Option<Value>> {
        Ok(None)
    }
}

impl IntegrationContextLookup for EmptyRegistry {
    fn integration_context(&self, _integrations: &[IntegrationRef]) -> anyhow::Result<Value> {
        Ok(Value::Object(Map::new()))
    }
}

/// Everything a pass needs besides the definition itself.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub readers: &'a dyn ReaderSchemaLookup,
    pub integrations: &'a dyn IntegrationContextLookup,
    pub config: &'a AnalysisConfig,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        readers: &'a dyn ReaderSchemaLookup,
        integrations: &'a dyn IntegrationContextLookup,
        config: &'a AnalysisConfig,
    ) -> Self {
        Self {
            readers,
            integrations,
            config,
        }
    }
}

/// Build the scope visible on entry to the root pipeline.
///
/// Merged in precedence order: integration context keys, the reader's
/// property tree under `@input`, and non-empty option args under `@options`
/// (later sources override earlier ones on exact key collision, which is not
/// expected in practice). Every seeded name is `Definitely` bound.
///
/// Collaborator failures degrade to an empty contribution from that source
/// and are logged; they never abort analysis.
pub fn build_seed_scope(
    mod_definition: &ModDefinition,
    context: &AnalysisContext<'_>,
) -> Scope {
    let mut seed = Map::new();

    if !mod_definition.integrations.is_empty() {
        match context
            .integrations
            .integration_context(&mod_definition.integrations)
        {
            Ok(Value::Object(entries)) => seed.extend(entries),
            Ok(other) => {
                log::warn!("integration context is not an object, ignoring: {other}");
            }
            Err(error) => {
                log::warn!("failed to resolve integration context: {error:#}");
            }
        }
    }

    match context.readers.output_properties(&mod_definition.trigger) {
        Ok(Some(properties)) => {
            seed.insert("@input".to_string(), properties);
        }
        Ok(None) => {}
        Err(error) => {
            log::warn!(
                "failed to resolve reader schema for trigger '{}': {error:#}",
                mod_definition.trigger
            );
        }
    }

    let has_options = matches!(&mod_definition.options_args, Value::Object(args) if !args.is_empty());
    if has_options {
        seed.insert("@options".to_string(), mod_definition.options_args.clone());
    }

    Scope::from_definite(flatten_keys(&Value::Object(seed)))
}
