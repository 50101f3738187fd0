//! Validation of parsed arguments.
//!
//! A parse result is validated in exactly one of two modes:
//!
//! - **Command-level**: a single validator attached to the command sees the
//!   whole [`ParsedArgs`]. Argument validators are not run.
//! - **Argument-level**: otherwise every argument validator runs in
//!   declaration order, each seeing the whole [`ParsedArgs`].
//!
//! Validators are one-shot: they are taken out of the record before they
//! run. A validator that panics is treated like one that returned a fault.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{CliError, Result};
use crate::parser::{ErrorReporter, ParsedArgs, Validator};

/// Run the validators attached to `parsed`.
///
/// A [`CliError`] returned by a validator is propagated unchanged. Any other
/// error becomes a validation error built by `parsed.reporter`, or by
/// `fallback` when the parse result carries no reporter.
pub fn validate(parsed: &mut ParsedArgs, fallback: &dyn ErrorReporter) -> Result<()> {
    let outcome = if parsed.command_validator.is_some() {
        validate_command_level(parsed)
    } else {
        validate_argument_level(parsed)
    };

    outcome.map_err(|err| match CliError::recognize(err) {
        Ok(recognized) => recognized,
        Err(fault) => {
            let message = fault.to_string();
            tracing::debug!(command = %parsed.command, error = %message, "validator fault");
            match &parsed.reporter {
                Some(reporter) => reporter.validation_error(&message),
                None => fallback.validation_error(&message),
            }
        }
    })
}

fn validate_command_level(parsed: &mut ParsedArgs) -> anyhow::Result<()> {
    if let Some(validator) = parsed.command_validator.take() {
        run_guarded(&validator, parsed)?;
    }
    Ok(())
}

fn validate_argument_level(parsed: &mut ParsedArgs) -> anyhow::Result<()> {
    let validators = parsed.argument_validators.take().unwrap_or_default();
    for validator in &validators {
        run_guarded(validator, parsed)?;
    }
    Ok(())
}

/// Run one validator, turning a panic into an ordinary fault.
fn run_guarded(validator: &Validator, parsed: &mut ParsedArgs) -> anyhow::Result<()> {
    match panic::catch_unwind(AssertUnwindSafe(|| validator(parsed))) {
        Ok(outcome) => outcome,
        Err(payload) => Err(anyhow::anyhow!(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "validator panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct TopLevel;

    impl ErrorReporter for TopLevel {
        fn validation_error(&self, message: &str) -> CliError {
            CliError::Validation {
                message: message.to_string(),
                usage: Some("top-level usage".into()),
            }
        }
    }

    struct Sub;

    impl ErrorReporter for Sub {
        fn validation_error(&self, message: &str) -> CliError {
            CliError::Validation {
                message: message.to_string(),
                usage: Some("subcommand usage".into()),
            }
        }
    }

    fn validator<F>(f: F) -> Validator
    where
        F: Fn(&mut ParsedArgs) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Arc::new(f)
    }

    fn usage_of(err: &CliError) -> Option<&str> {
        match err {
            CliError::Validation { usage, .. } => usage.as_deref(),
            _ => None,
        }
    }

    #[test]
    fn command_level_suppresses_argument_level() {
        let arg_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&arg_calls);

        let mut parsed = ParsedArgs::new("vm create");
        parsed.command_validator = Some(validator(|ns: &mut ParsedArgs| {
            ns.set("validated_by", json!("command"));
            Ok(())
        }));
        parsed.argument_validators = Some(vec![validator(move |_: &mut ParsedArgs| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })]);

        validate(&mut parsed, &TopLevel).unwrap();

        assert_eq!(arg_calls.load(Ordering::SeqCst), 0);
        assert_eq!(parsed.get("validated_by"), Some(&json!("command")));
        assert!(parsed.command_validator.is_none());
    }

    #[test]
    fn argument_validators_run_in_order_with_full_record() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&seen);
        let second = Arc::clone(&seen);

        let mut parsed = ParsedArgs::new("vm create").with_field("size", json!("large"));
        parsed.argument_validators = Some(vec![
            validator(move |ns: &mut ParsedArgs| {
                first.lock().unwrap().push(format!("first:{}", ns.get_str("size").unwrap()));
                ns.set("size", json!("LARGE"));
                Ok(())
            }),
            validator(move |ns: &mut ParsedArgs| {
                second.lock().unwrap().push(format!("second:{}", ns.get_str("size").unwrap()));
                Ok(())
            }),
        ]);

        validate(&mut parsed, &TopLevel).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["first:large", "second:LARGE"]);
        assert!(parsed.argument_validators.is_none());
    }

    #[test]
    fn no_validators_is_ok() {
        let mut parsed = ParsedArgs::new("vm list");
        assert!(validate(&mut parsed, &TopLevel).is_ok());
    }

    #[test]
    fn recognized_errors_propagate_unchanged() {
        let mut parsed = ParsedArgs::new("vm create");
        parsed.reporter = Some(Arc::new(Sub));
        parsed.command_validator = Some(validator(|_: &mut ParsedArgs| {
            Err(CliError::validation("name must be lowercase").into())
        }));

        let err = validate(&mut parsed, &TopLevel).unwrap_err();

        assert_eq!(err.to_string(), "name must be lowercase");
        assert_eq!(usage_of(&err), None);
    }

    #[test]
    fn faults_are_reported_through_subparser() {
        let mut parsed = ParsedArgs::new("vm create");
        parsed.reporter = Some(Arc::new(Sub));
        parsed.argument_validators = Some(vec![validator(|_: &mut ParsedArgs| {
            Err(anyhow::anyhow!("index out of range"))
        })]);

        let err = validate(&mut parsed, &TopLevel).unwrap_err();

        assert_eq!(err.to_string(), "index out of range");
        assert_eq!(usage_of(&err), Some("subcommand usage"));
    }

    #[test]
    fn faults_fall_back_to_top_level_parser() {
        let mut parsed = ParsedArgs::new("vm create");
        parsed.command_validator = Some(validator(|_: &mut ParsedArgs| {
            Err(anyhow::anyhow!("unexpected None"))
        }));

        let err = validate(&mut parsed, &TopLevel).unwrap_err();

        assert!(matches!(err, CliError::Validation { .. }));
        assert_eq!(err.to_string(), "unexpected None");
        assert_eq!(usage_of(&err), Some("top-level usage"));
    }

    #[test]
    fn failing_argument_validator_stops_the_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut parsed = ParsedArgs::new("vm create");
        parsed.argument_validators = Some(vec![
            validator(|_: &mut ParsedArgs| Err(anyhow::anyhow!("first failed"))),
            validator(move |_: &mut ParsedArgs| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        ]);

        assert!(validate(&mut parsed, &TopLevel).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn panicking_validator_becomes_validation_error() {
        let mut parsed = ParsedArgs::new("vm create");
        parsed.reporter = Some(Arc::new(Sub));
        parsed.argument_validators = Some(vec![validator(|ns: &mut ParsedArgs| {
            let zones: Vec<&str> = Vec::new();
            ns.set("zone", json!(zones[ns.fields.len() + 3]));
            Ok(())
        })]);

        let err = validate(&mut parsed, &TopLevel).unwrap_err();

        assert!(matches!(err, CliError::Validation { .. }));
        assert!(err.to_string().contains("index out of bounds"));
        assert_eq!(usage_of(&err), Some("subcommand usage"));
    }

    #[test]
    fn panicking_command_validator_uses_top_level_usage() {
        let mut parsed = ParsedArgs::new("vm create");
        parsed.command_validator = Some(validator(|ns: &mut ParsedArgs| {
            let name = ns.get_str("name").map(str::to_string);
            ns.set("name", json!(name.unwrap().to_lowercase()));
            Ok(())
        }));

        let err = validate(&mut parsed, &TopLevel).unwrap_err();

        assert!(matches!(err, CliError::Validation { .. }));
        assert_eq!(usage_of(&err), Some("top-level usage"));
    }

    #[test]
    fn panic_payloads_become_messages() {
        assert_eq!(panic_message(&"static text"), "static text");
        assert_eq!(panic_message(&String::from("owned text")), "owned text");
        assert_eq!(panic_message(&42_u8), "validator panicked");
    }
}
