//! Variable scopes and the existence lattice.
//!
//! A scope maps variable names to how confidently they are known to be bound
//! at a point in the pipeline. Names are dotted paths (`@input.title`); a
//! wildcard entry `name.*` records that some unspecified nested property of
//! `name` may exist, which is enough to suppress diagnostics for any access
//! under that prefix.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Confidence that a variable is bound when a point in the pipeline executes.
///
/// `Maybe` is strictly weaker than `Definitely`, but both count as "known":
/// only absence from the scope triggers a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VarExistence {
    /// May or may not be bound, e.g. the output of a guarded brick.
    Maybe,
    /// Guaranteed bound.
    Definitely,
}

/// Mapping from variable name to existence confidence.
///
/// Backed by a persistent map so the per-brick snapshots taken during a run
/// share structure instead of deep-copying.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope {
    vars: im::HashMap<String, VarExistence>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(name: impl Into<String>, existence: VarExistence) -> Self {
        let mut scope = Self::new();
        scope.insert(name, existence);
        scope
    }

    /// Bind every given name at `Definitely`.
    pub fn from_definite<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scope = Self::new();
        for name in names {
            scope.insert(name, VarExistence::Definitely);
        }
        scope
    }

    pub fn insert(&mut self, name: impl Into<String>, existence: VarExistence) {
        self.vars.insert(name.into(), existence);
    }

    pub fn get(&self, name: &str) -> Option<VarExistence> {
        self.vars.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Union of two scopes; on collision the most recently computed entry
    /// (`other`) wins.
    ///
    /// Collisions are legitimate: a brick can rebind an output key already
    /// bound at its level, and nested slots can inject the same input key.
    /// The newer binding shadows the older one.
    pub fn union(&self, other: &Scope) -> Scope {
        let mut merged = self.vars.clone();
        for (name, existence) in &other.vars {
            if let Some(previous) = merged.insert(name.clone(), *existence) {
                log::debug!("scope union rebinds '{name}' ({previous:?} -> {existence:?})");
            }
        }
        Scope { vars: merged }
    }

    /// Whether a variable reference resolves against this scope: an exact
    /// entry, or a wildcard entry whose prefix (dot included) starts `name`.
    /// `obj.*` matches `obj.foo` and `obj.foo.bar`, but not `obj` or `objx`.
    pub fn resolves(&self, name: &str) -> bool {
        if self.vars.contains_key(name) {
            return true;
        }

        self.vars
            .keys()
            .filter_map(|key| key.strip_suffix('*'))
            .any(|prefix| prefix.ends_with('.') && name.starts_with(prefix))
    }

    /// Sorted variable names, for diagnostic payloads and autocomplete.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.vars.keys().cloned().collect();
        names.sort();
        names
    }
}

impl FromIterator<(String, VarExistence)> for Scope {
    fn from_iter<I: IntoIterator<Item = (String, VarExistence)>>(iter: I) -> Self {
        Scope {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Flatten a JSON object into one dotted path per reachable key.
///
/// Objects recurse, everything else is a leaf: `{"a": {"b": 1}}` produces
/// `["a", "a.b"]`. Non-object input produces nothing.
pub fn flatten_keys(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    if let Value::Object(entries) = value {
        for (key, nested) in entries {
            paths.push(key.clone());
            for nested_path in flatten_keys(nested) {
                paths.push(format!("{key}.{nested_path}"));
            }
        }
    }
    paths
}
