//! The variable store (C5): per-execution overrides, file-level `@name = value`
//! definitions, and an environment snapshot, consulted in that order.

use std::collections::BTreeMap;

/// Holds the three tiers of plain-variable lookup spec.md §3/§4.5 describes.
///
/// Values returned by `get` are raw: they may themselves contain `{{...}}`
/// placeholders. Recursive resolution of those is the resolver's job
/// (`infrastructure::resolver`), which is why this type stays dependency-free.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    overrides: BTreeMap<String, String>,
    /// File-level `@name = value` definitions in source order; later
    /// definitions of the same name shadow earlier ones.
    file_vars: Vec<(String, String)>,
    env_snapshot: BTreeMap<String, String>,
}

impl VariableStore {
    /// An empty store with no overrides, file vars, or environment snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a caller-supplied environment snapshot (read-only,
    /// taken once per resolution session per spec §5).
    #[must_use]
    pub fn with_env_snapshot(env_snapshot: BTreeMap<String, String>) -> Self {
        Self {
            env_snapshot,
            ..Self::default()
        }
    }

    /// Snapshot the current process environment via `std::env::vars`.
    #[must_use]
    pub fn from_process_env() -> Self {
        Self::with_env_snapshot(std::env::vars().collect())
    }

    /// Set a per-execution override, the highest-priority tier.
    pub fn set_override(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.overrides.insert(name.into(), value.into());
    }

    /// Append a file-level `@name = value` definition in source order.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.file_vars.push((name.into(), value.into()));
    }

    /// Look up a name across overrides, then file-level definitions
    /// (last-wins shadowing), then the environment snapshot.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.overrides.get(name) {
            return Some(value.as_str());
        }
        if let Some((_, value)) = self.file_vars.iter().rev().find(|(n, _)| n == name) {
            return Some(value.as_str());
        }
        self.env_snapshot.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_file_var_and_env() {
        let mut store = VariableStore::with_env_snapshot(BTreeMap::from([(
            "host".to_string(),
            "env-host".to_string(),
        )]));
        store.define("host", "file-host");
        store.set_override("host", "override-host");

        assert_eq!(store.get("host"), Some("override-host"));
    }

    #[test]
    fn later_file_var_shadows_earlier_one() {
        let mut store = VariableStore::new();
        store.define("token", "first");
        store.define("token", "second");
        assert_eq!(store.get("token"), Some("second"));
    }

    #[test]
    fn falls_back_to_environment_when_nothing_else_defines_it() {
        let store = VariableStore::with_env_snapshot(BTreeMap::from([(
            "region".to_string(),
            "us-east-1".to_string(),
        )]));
        assert_eq!(store.get("region"), Some("us-east-1"));
    }

    #[test]
    fn unknown_name_returns_none() {
        let store = VariableStore::new();
        assert_eq!(store.get("nope"), None);
    }
}
