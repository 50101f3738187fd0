//! Implicit deprecation lookup.
//!
//! A command inherits the deprecation of the nearest deprecated group on
//! its path. `vm disk attach` is checked against `vm disk` first, then
//! `vm`.

use super::info::{DeprecationInfo, DeprecationKind};

/// Capability to find the deprecation attached to a command path.
pub trait DeprecationLookup {
    /// Deprecation declared on the command or group named `path`, if any.
    fn resolve_deprecation(&self, path: &str) -> Option<DeprecationInfo>;
}

impl<F> DeprecationLookup for F
where
    F: Fn(&str) -> Option<DeprecationInfo>,
{
    fn resolve_deprecation(&self, path: &str) -> Option<DeprecationInfo> {
        self(path)
    }
}

/// Resolve the deprecation `command_name` inherits from its ancestors.
///
/// Returns `None` when no ancestor group carries deprecation metadata.
/// The command's own deprecation is not considered here.
pub fn resolve_implicit_deprecation(
    command_name: &str,
    lookup: &dyn DeprecationLookup,
) -> Option<DeprecationInfo> {
    let mut path: Vec<&str> = command_name.split_whitespace().collect();
    path.pop();

    while !path.is_empty() {
        let joined = path.join(" ");
        if let Some(found) = lookup.resolve_deprecation(&joined) {
            tracing::debug!(command = command_name, ancestor = %joined, "implicit deprecation");
            return Some(implicit_from(found));
        }
        path.pop();
    }
    None
}

fn implicit_from(found: DeprecationInfo) -> DeprecationInfo {
    DeprecationInfo {
        kind: DeprecationKind::Implicit,
        object_type: "command".to_string(),
        tag_fn: None,
        message_fn: None,
        ..found
    }
}
