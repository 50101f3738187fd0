//! `--query` result filtering.
//!
//! The query is a dotted path into the result: object keys and array
//! indices separated by `.`, e.g. `items.0.name`. Registering the hooks
//! wires it into a run:
//!
//! - `post-parse-args`: a string `_query` field marks the run as querying
//!   (`query_active`) and records the path under `query`.
//! - `filter-result`: the result is replaced by the selected value, or
//!   `null` when the path does not resolve.
//!
//! # Example
//!
//! ```
//! use clinch::query::select;
//! use serde_json::json;
//!
//! let result = json!({"items": [{"name": "web01"}, {"name": "web02"}]});
//! assert_eq!(select(&result, "items.1.name"), json!("web02"));
//! assert_eq!(select(&result, "items.7"), json!(null));
//! ```

use serde_json::Value;

use crate::events::{Event, EventBus, HookId};

/// Parsed-args field carrying the query path.
pub const QUERY_FIELD: &str = "_query";
/// State key set when a query reshapes the result.
pub const QUERY_ACTIVE_KEY: &str = "query_active";
/// State key holding the query path.
pub const QUERY_KEY: &str = "query";

/// Register the query hooks on `events`.
pub fn register(events: &mut EventBus) -> [HookId; 2] {
    let parsed = events.register(Event::PostParseArgs, |ctx| {
        let query = ctx
            .parsed_args()
            .and_then(|args| args.get_str(QUERY_FIELD))
            .map(str::to_string);
        if let Some(query) = query {
            tracing::debug!(%query, "query active");
            ctx.state.set(QUERY_ACTIVE_KEY, Value::Bool(true));
            ctx.state.set(QUERY_KEY, Value::String(query));
        }
        Ok(())
    });

    let filter = events.register(Event::FilterResult, |ctx| {
        if !ctx.state.query_active() {
            return Ok(());
        }
        let Some(query) = ctx
            .state
            .get(QUERY_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            return Ok(());
        };
        if let Some(result) = ctx.result_mut() {
            *result = select(result, &query);
        }
        Ok(())
    });

    [parsed, filter]
}

/// Value at dotted `path` inside `value`, or `null` when it does not exist.
///
/// An empty path selects the whole value.
pub fn select(value: &Value, path: &str) -> Value {
    if path.is_empty() {
        return value.clone();
    }
    let mut current = value;
    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(found) => current = found,
            None => return Value::Null,
        }
    }
    current.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventContext, EventPayload};
    use crate::invocation::InvocationState;
    use crate::parser::ParsedArgs;
    use serde_json::json;

    #[test]
    fn select_walks_objects_and_arrays() {
        let value = json!({"a": {"b": [10, {"c": "deep"}]}});
        assert_eq!(select(&value, "a.b.0"), json!(10));
        assert_eq!(select(&value, "a.b.1.c"), json!("deep"));
        assert_eq!(select(&value, ""), value);
    }

    #[test]
    fn select_misses_are_null() {
        let value = json!({"a": [1]});
        assert_eq!(select(&value, "b"), Value::Null);
        assert_eq!(select(&value, "a.x"), Value::Null);
        assert_eq!(select(&value, "a.0.z"), Value::Null);
    }

    #[test]
    fn hooks_mark_state_and_filter_result() {
        let mut bus = EventBus::new();
        register(&mut bus);
        let mut state = InvocationState::new();

        let parsed = ParsedArgs::new("vm list").with_field(QUERY_FIELD, json!("0.name"));
        let mut ctx = EventContext::new(
            &mut state,
            EventPayload::ParsedArgs {
                command: "vm list",
                args: &parsed,
            },
        );
        bus.raise(Event::PostParseArgs, &mut ctx).unwrap();

        let mut result = json!([{"name": "web01"}]);
        let mut ctx = EventContext::new(&mut state, EventPayload::Result(&mut result));
        bus.raise(Event::FilterResult, &mut ctx).unwrap();

        assert!(state.query_active());
        assert_eq!(result, json!("web01"));
    }

    #[test]
    fn absent_query_leaves_result_alone() {
        let mut bus = EventBus::new();
        register(&mut bus);
        let mut state = InvocationState::new();

        let parsed = ParsedArgs::new("vm list").with_field(QUERY_FIELD, Value::Null);
        let mut ctx = EventContext::new(
            &mut state,
            EventPayload::ParsedArgs {
                command: "vm list",
                args: &parsed,
            },
        );
        bus.raise(Event::PostParseArgs, &mut ctx).unwrap();

        let mut result = json!({"keep": true});
        let mut ctx = EventContext::new(&mut state, EventPayload::Result(&mut result));
        bus.raise(Event::FilterResult, &mut ctx).unwrap();

        assert!(!state.query_active());
        assert_eq!(result, json!({"keep": true}));
    }
}
