//! Analysis configuration.

use serde::{Deserialize, Serialize};

/// Default cap on slot nesting depth.
pub const DEFAULT_MAX_PIPELINE_DEPTH: usize = 64;

/// Host-tunable knobs for an analysis run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Pipelines nested deeper than this abort traversal with a structural
    /// error; well-formed pipelines sit far below it.
    pub max_pipeline_depth: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_pipeline_depth: DEFAULT_MAX_PIPELINE_DEPTH,
        }
    }
}
