//! Invocation events and the bus that delivers them.
//!
//! The invoker raises a fixed sequence of [`Event`]s during a run. Each
//! event has an ordered list of subscribers that are called synchronously,
//! in registration order, before the pipeline moves on.
//!
//! | Order | Event                        | Payload                     |
//! |-------|------------------------------|-----------------------------|
//! | 1     | `pre-command-table-create`   | raw args                    |
//! | 2     | `post-command-table-create`  | command table               |
//! | 3     | `command-table-loaded`       | parser                      |
//! | 4     | `pre-parse-args`             | raw args                    |
//! | 5     | `post-parse-args`            | command name + parsed args  |
//! | 6     | `transform-result`           | result (mutable)            |
//! | 7     | `filter-result`              | result (mutable)            |
//!
//! # Example
//!
//! ```
//! use clinch::events::{Event, EventBus};
//! use serde_json::json;
//!
//! let mut bus = EventBus::new();
//! bus.register(Event::TransformResult, |ctx| {
//!     if let Some(result) = ctx.result_mut() {
//!         *result = json!({"wrapped": result.take()});
//!     }
//!     Ok(())
//! });
//! assert_eq!(bus.subscriber_count(Event::TransformResult), 1);
//! ```

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::commands::CommandTable;
use crate::error::{CliError, Result};
use crate::invocation::InvocationState;
use crate::parser::{CommandParser, ParsedArgs};

/// Extension points raised by the invoker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    PreCommandTableCreate,
    PostCommandTableCreate,
    CommandTableLoaded,
    PreParseArgs,
    PostParseArgs,
    TransformResult,
    FilterResult,
}

impl Event {
    /// Every event, in the order a successful run raises them.
    pub const ALL: [Event; 7] = [
        Event::PreCommandTableCreate,
        Event::PostCommandTableCreate,
        Event::CommandTableLoaded,
        Event::PreParseArgs,
        Event::PostParseArgs,
        Event::TransformResult,
        Event::FilterResult,
    ];

    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            Event::PreCommandTableCreate => "pre-command-table-create",
            Event::PostCommandTableCreate => "post-command-table-create",
            Event::CommandTableLoaded => "command-table-loaded",
            Event::PreParseArgs => "pre-parse-args",
            Event::PostParseArgs => "post-parse-args",
            Event::TransformResult => "transform-result",
            Event::FilterResult => "filter-result",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Data handed to subscribers.
///
/// Only [`EventPayload::Result`] is mutable.
pub enum EventPayload<'a> {
    Args(&'a [String]),
    CommandTable(&'a CommandTable),
    Parser(&'a dyn CommandParser),
    ParsedArgs {
        command: &'a str,
        args: &'a ParsedArgs,
    },
    Result(&'a mut Value),
}

/// Everything a subscriber can observe for one raised event.
pub struct EventContext<'a> {
    /// Per-run key/value state.
    pub state: &'a mut InvocationState,
    /// Event-specific data.
    pub payload: EventPayload<'a>,
}

impl<'a> EventContext<'a> {
    /// Create a context.
    pub fn new(state: &'a mut InvocationState, payload: EventPayload<'a>) -> Self {
        Self { state, payload }
    }

    /// Raw argument vector, for the args events.
    pub fn args(&self) -> Option<&[String]> {
        match &self.payload {
            EventPayload::Args(args) => Some(*args),
            _ => None,
        }
    }

    /// Parsed arguments, for `post-parse-args`.
    pub fn parsed_args(&self) -> Option<&ParsedArgs> {
        match &self.payload {
            EventPayload::ParsedArgs { args, .. } => Some(*args),
            _ => None,
        }
    }

    /// Command table, for `post-command-table-create`.
    pub fn command_table(&self) -> Option<&CommandTable> {
        match &self.payload {
            EventPayload::CommandTable(table) => Some(*table),
            _ => None,
        }
    }

    /// Mutable result, for `transform-result` and `filter-result`.
    pub fn result_mut(&mut self) -> Option<&mut Value> {
        match &mut self.payload {
            EventPayload::Result(result) => Some(&mut **result),
            _ => None,
        }
    }
}

/// Subscriber callback.
pub type HookFn = Box<dyn Fn(&mut EventContext<'_>) -> anyhow::Result<()>>;

/// Handle returned by [`EventBus::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// Ordered subscriber lists, one per event.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<Event, Vec<(HookId, HookFn)>>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `event`. Subscribers run in registration order.
    pub fn register<F>(&mut self, event: Event, handler: F) -> HookId
    where
        F: Fn(&mut EventContext<'_>) -> anyhow::Result<()> + 'static,
    {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(event)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unregister(&mut self, event: Event, id: HookId) -> bool {
        let Some(list) = self.handlers.get_mut(&event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(hook_id, _)| *hook_id != id);
        list.len() != before
    }

    /// Number of subscribers for `event`.
    pub fn subscriber_count(&self, event: Event) -> usize {
        self.handlers.get(&event).map_or(0, Vec::len)
    }

    /// Call every subscriber of `event`, stopping at the first failure.
    pub fn raise(&self, event: Event, ctx: &mut EventContext<'_>) -> Result<()> {
        let Some(list) = self.handlers.get(&event) else {
            return Ok(());
        };
        tracing::trace!(%event, subscribers = list.len(), "raising event");
        for (_, handler) in list {
            handler(ctx).map_err(|source| match CliError::recognize(source) {
                Ok(err) => err,
                Err(source) => CliError::Hook {
                    event: event.name().to_string(),
                    source,
                },
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(event, list)| (event.name(), list.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn event_names_are_stable() {
        let names: Vec<_> = Event::ALL.iter().map(Event::name).collect();
        assert_eq!(
            names,
            vec![
                "pre-command-table-create",
                "post-command-table-create",
                "command-table-loaded",
                "pre-parse-args",
                "post-parse-args",
                "transform-result",
                "filter-result",
            ]
        );
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let order = Rc::clone(&order);
            bus.register(Event::PreParseArgs, move |_| {
                order.borrow_mut().push(i);
                Ok(())
            });
        }

        let mut state = InvocationState::new();
        let args = vec!["vm".to_string()];
        let mut ctx = EventContext::new(&mut state, EventPayload::Args(&args));
        bus.raise(Event::PreParseArgs, &mut ctx).unwrap();

        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn result_payload_is_rewritable() {
        let mut bus = EventBus::new();
        bus.register(Event::FilterResult, |ctx| {
            if let Some(result) = ctx.result_mut() {
                *result = json!({"filtered": true});
            }
            Ok(())
        });

        let mut state = InvocationState::new();
        let mut value = json!({"raw": 1});
        let mut ctx = EventContext::new(&mut state, EventPayload::Result(&mut value));
        bus.raise(Event::FilterResult, &mut ctx).unwrap();

        assert_eq!(value, json!({"filtered": true}));
    }

    #[test]
    fn subscribers_may_write_state() {
        let mut bus = EventBus::new();
        bus.register(Event::PreParseArgs, |ctx| {
            ctx.state.set("seen", json!(true));
            Ok(())
        });

        let mut state = InvocationState::new();
        let mut ctx = EventContext::new(&mut state, EventPayload::Args(&[]));
        bus.raise(Event::PreParseArgs, &mut ctx).unwrap();

        assert_eq!(state.get("seen"), Some(&json!(true)));
    }

    #[test]
    fn failing_subscriber_stops_the_raise() {
        let mut bus = EventBus::new();
        let calls = Rc::new(RefCell::new(0));
        bus.register(Event::PreParseArgs, |_| Err(anyhow::anyhow!("hook exploded")));
        let counter = Rc::clone(&calls);
        bus.register(Event::PreParseArgs, move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        let mut state = InvocationState::new();
        let mut ctx = EventContext::new(&mut state, EventPayload::Args(&[]));
        let err = bus.raise(Event::PreParseArgs, &mut ctx).unwrap_err();

        assert!(matches!(err, CliError::Hook { ref event, .. } if event == "pre-parse-args"));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn recognized_errors_pass_through_hooks() {
        let mut bus = EventBus::new();
        bus.register(Event::PreParseArgs, |_| {
            Err(CliError::validation("not allowed").into())
        });

        let mut state = InvocationState::new();
        let mut ctx = EventContext::new(&mut state, EventPayload::Args(&[]));
        let err = bus.raise(Event::PreParseArgs, &mut ctx).unwrap_err();

        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn unregister_removes_subscriber() {
        let mut bus = EventBus::new();
        let id = bus.register(Event::FilterResult, |_| Ok(()));
        bus.register(Event::FilterResult, |_| Ok(()));

        assert!(bus.unregister(Event::FilterResult, id));
        assert!(!bus.unregister(Event::FilterResult, id));
        assert_eq!(bus.subscriber_count(Event::FilterResult), 1);
    }

    #[test]
    fn raising_without_subscribers_is_ok() {
        let bus = EventBus::new();
        let mut state = InvocationState::new();
        let mut ctx = EventContext::new(&mut state, EventPayload::Args(&[]));
        assert!(bus.raise(Event::CommandTableLoaded, &mut ctx).is_ok());
    }
}
