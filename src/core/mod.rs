pub mod errors;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered sequence of bricks. The root pipeline and every slot body share
/// this type recursively.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    pub bricks: Vec<BrickConfig>,
}

impl Pipeline {
    pub fn new(bricks: Vec<BrickConfig>) -> Self {
        Self { bricks }
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bricks.len()
    }
}

impl From<Vec<BrickConfig>> for Pipeline {
    fn from(bricks: Vec<BrickConfig>) -> Self {
        Self { bricks }
    }
}

/// One configured brick in a pipeline.
///
/// Bricks are immutable snapshots during an analysis run; the analyzer never
/// mutates pipeline structure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrickConfig {
    /// Registry id of the brick type, e.g. `"control/for-each"`. An empty id
    /// is a structural error caught by traversal.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Name under which the brick's result is bound, without the `@` sigil.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    /// Guard condition; when present the brick may be skipped at runtime, so
    /// its output is only `Maybe` bound.
    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<Expression>,
    /// Configuration properties in declared order. Entries holding
    /// `Expression::Pipeline` values are the brick's slots.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub config: IndexMap<String, Expression>,
}

impl BrickConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            output_key: None,
            condition: None,
            config: IndexMap::new(),
        }
    }
}

/// Operand inside a brick's configuration.
///
/// A closed set of variants so traversal can match exhaustively. Only `Var`
/// is dispatched to the scope-check hook; `Array` and `Object` are walked
/// solely to find `Var`s nested inside structured values. `Pipeline` is only
/// legal as a direct config entry (a slot); anywhere deeper it is a
/// structural error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Expression {
    /// Reference to a variable resolved at runtime, e.g. `"@input.title"`.
    Var(String),
    /// Opaque literal; never inspected further.
    Literal(Value),
    Array(Vec<Expression>),
    Object(IndexMap<String, Expression>),
    Pipeline(SubPipeline),
}

impl Expression {
    pub fn var(name: impl Into<String>) -> Self {
        Expression::Var(name.into())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }
}

/// Slot payload: a nested pipeline plus the variable the slot injects into
/// its body, if any (e.g. a loop body's per-item key, without the `@` sigil).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubPipeline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_key: Option<String>,
    pub pipeline: Pipeline,
}

impl SubPipeline {
    pub fn new(pipeline: impl Into<Pipeline>) -> Self {
        Self {
            input_key: None,
            pipeline: pipeline.into(),
        }
    }

    pub fn with_input_key(input_key: impl Into<String>, pipeline: impl Into<Pipeline>) -> Self {
        Self {
            input_key: Some(input_key.into()),
            pipeline: pipeline.into(),
        }
    }
}

/// Dotted path locating a brick or expression within the pipeline tree,
/// computed during traversal. Root bricks are `"0"`, `"1"`, …; a brick inside
/// a slot is `"{parent}.config.{slot}.{index}"`; expressions extend their
/// brick's path through config keys and array indices. Stable for a given
/// tree, and the key of the scope snapshot table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrickPosition {
    pub path: String,
}

impl BrickPosition {
    /// Position of the root pipeline itself (empty path).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Extend the path by one segment.
    pub fn join(&self, segment: &str) -> Self {
        if self.path.is_empty() {
            Self::new(segment)
        } else {
            Self::new(format!("{}.{}", self.path, segment))
        }
    }

    /// Position of the `index`-th brick of the pipeline at this position.
    pub fn brick(&self, index: usize) -> Self {
        self.join(&index.to_string())
    }

    /// Position of a named config entry of the brick at this position.
    pub fn config_entry(&self, key: &str) -> Self {
        self.join("config").join(key)
    }
}

impl std::fmt::Display for BrickPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// Reference to a configured integration, forwarded verbatim to the
/// integration-context lookup; the analyzer only ever uses the key set of
/// the context it returns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegrationRef {
    /// Key under which the integration's context is bound (with `@` sigil).
    pub output_key: String,
    pub integration_id: String,
}

impl IntegrationRef {
    pub fn new(output_key: impl Into<String>, integration_id: impl Into<String>) -> Self {
        Self {
            output_key: output_key.into(),
            integration_id: integration_id.into(),
        }
    }
}

/// The subject of one analysis run: a pipeline plus the declarations needed
/// to seed its root scope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModDefinition {
    /// Starter/trigger type id, resolved through the reader-schema lookup to
    /// the `@input` property tree.
    pub trigger: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<IntegrationRef>,
    /// Arbitrary nested option values; flattened under `@options` when
    /// non-empty. Only the key structure matters to analysis.
    #[serde(default)]
    pub options_args: Value,
    pub pipeline: Pipeline,
}

impl ModDefinition {
    pub fn new(trigger: impl Into<String>, pipeline: impl Into<Pipeline>) -> Self {
        Self {
            trigger: trigger.into(),
            integrations: Vec::new(),
            options_args: Value::Null,
            pipeline: pipeline.into(),
        }
    }
}
