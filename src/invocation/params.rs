//! Handler parameter filtering.

use serde_json::{Map, Value};

/// Field holding the handler dispatch reference.
pub const FUNC_FIELD: &str = "func";
/// Field holding the resolved command name.
pub const COMMAND_FIELD: &str = "command";
/// Prefix marking framework-internal fields.
pub const PRIVATE_PREFIX: char = '_';

/// Parameters passed to a command handler.
pub type Params = Map<String, Value>;

/// Strip framework-internal fields from parsed arguments.
///
/// Keeps every field not starting with `_`, except `func` and `command`.
/// Order of the remaining fields follows `fields`.
pub fn filter_params(fields: &Map<String, Value>) -> Params {
    fields
        .iter()
        .filter(|(key, _)| !key.starts_with(PRIVATE_PREFIX))
        .filter(|(key, _)| key.as_str() != FUNC_FIELD && key.as_str() != COMMAND_FIELD)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
