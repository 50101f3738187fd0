//! Per-run key/value state.

use serde_json::{Map, Value};

/// Sentinel stored under `command` until the parser resolves one.
pub const UNKNOWN_COMMAND: &str = "unknown";

/// Mutable key/value data scoped to one invocation.
///
/// Unknown keys read as absent. `command` is always present. Nothing here
/// survives past the run that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationState {
    data: Map<String, Value>,
}

impl InvocationState {
    /// Create state holding only the `command` sentinel.
    pub fn new() -> Self {
        Self::with_initial_data(Map::new())
    }

    /// Seed state with `initial`. `command` is reset to the sentinel.
    pub fn with_initial_data(initial: Map<String, Value>) -> Self {
        let mut data = initial;
        data.insert(
            "command".to_string(),
            Value::String(UNKNOWN_COMMAND.to_string()),
        );
        Self { data }
    }

    /// Value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.data.insert(key.into(), value)
    }

    /// Remove `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// The resolved command name, or the sentinel before parsing.
    pub fn command(&self) -> &str {
        self.data
            .get("command")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_COMMAND)
    }

    /// Record the resolved command name.
    pub fn set_command(&mut self, command: &str) {
        self.set("command", Value::String(command.to_string()));
    }

    /// Whether a result query is active. Absent reads as `false`.
    pub fn query_active(&self) -> bool {
        self.data
            .get("query_active")
            .is_some_and(is_truthy)
    }

    /// All stored entries.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.data
    }
}

impl Default for InvocationState {
    fn default() -> Self {
        Self::new()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn starts_with_unknown_command() {
        let state = InvocationState::new();
        assert_eq!(state.command(), "unknown");
        assert_eq!(state.get("command"), Some(&json!("unknown")));
    }

    #[test]
    fn unknown_keys_are_absent() {
        let state = InvocationState::new();
        assert!(state.get("anything").is_none());
        assert!(!state.query_active());
    }

    #[test]
    fn initial_data_is_kept_but_command_is_reset() {
        let mut seed = Map::new();
        seed.insert("command".into(), json!("stale"));
        seed.insert("tenant".into(), json!("contoso"));

        let state = InvocationState::with_initial_data(seed);
        assert_eq!(state.command(), "unknown");
        assert_eq!(state.get("tenant"), Some(&json!("contoso")));
    }

    #[test]
    fn query_active_is_boolean_like() {
        let mut state = InvocationState::new();
        state.set("query_active", json!(true));
        assert!(state.query_active());
        state.set("query_active", json!(0));
        assert!(!state.query_active());
        state.set("query_active", json!("yes"));
        assert!(state.query_active());
        state.remove("query_active");
        assert!(!state.query_active());
    }

    #[test]
    fn set_command_records_name() {
        let mut state = InvocationState::new();
        state.set_command("vm create");
        assert_eq!(state.command(), "vm create");
    }
}
