//! Command invocation.
//!
//! - [`invoker`] - [`CommandInvoker`], the controller that runs one invocation
//! - [`state`] - [`InvocationState`], per-run key/value data shared with hooks
//! - [`validation`] - Command-level and argument-level validation
//! - [`params`] - Handler parameter filtering
//! - [`result`] - [`CommandResultItem`] and result normalization

pub mod invoker;
pub mod params;
pub mod result;
pub mod state;
pub mod validation;

pub use invoker::{rudimentary_command_name, CommandInvoker, InvokerBuilder};
pub use params::{filter_params, Params};
pub use result::{todict, CommandResultItem};
pub use state::{InvocationState, UNKNOWN_COMMAND};
pub use validation::validate;
