//! Final result of a run.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::commands::TableTransformer;
use crate::error::Result;

/// Normalize a handler's return value into a generic JSON value.
pub fn todict<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// The outcome of a successful run.
#[derive(Clone)]
pub struct CommandResultItem {
    /// Result after `transform-result` and `filter-result` hooks.
    pub result: Value,
    /// Display transformer of the command that produced it.
    pub table_transformer: Option<TableTransformer>,
    /// Whether a query reshaped the result.
    pub is_query_active: bool,
    /// Process exit code.
    pub exit_code: i32,
}

impl CommandResultItem {
    /// Create a successful result item.
    pub fn new(
        result: Value,
        table_transformer: Option<TableTransformer>,
        is_query_active: bool,
    ) -> Self {
        Self {
            result,
            table_transformer,
            is_query_active,
            exit_code: 0,
        }
    }

    /// The result reshaped for table display.
    ///
    /// A query already chose the shape, so the transformer is skipped then.
    pub fn table_view(&self) -> Value {
        match &self.table_transformer {
            Some(transform) if !self.is_query_active => transform(&self.result),
            _ => self.result.clone(),
        }
    }
}

impl fmt::Debug for CommandResultItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandResultItem")
            .field("result", &self.result)
            .field("table_transformer", &self.table_transformer.is_some())
            .field("is_query_active", &self.is_query_active)
            .field("exit_code", &self.exit_code)
            .finish()
    }
}
