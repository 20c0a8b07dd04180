//! tmplvars - date placeholders for notification messages
//!
//! Expands `${function args...}` placeholders in a message with the result of
//! a registered date function. If the message cannot be parsed or run, the
//! original message is returned untouched, never a half-expanded one.
//!
//! # Example
//!
//! ```rust
//! use tmplvars::{build_registry, substitute};
//!
//! let registry = build_registry();
//! let out = substitute("Backup of ${yesterday_date} finished", &registry);
//! assert!(out.starts_with("Backup of 20"));
//!
//! // Unknown functions leave the message as it was
//! assert_eq!(substitute("${tomorrow}", &registry), "${tomorrow}");
//! ```

pub mod config;
pub mod error;
pub mod parser;
pub mod template;
pub mod time;

pub use config::{Config, ConfigError};
pub use error::ParseError;
pub use parser::{parse, Template};
pub use template::{build_registry, Builtin, ExecError, FunctionRegistry};
pub use time::{resolve_time_args, Clock, FixedClock, Location, SystemClock, TimeArgs};

use log::debug;
use once_cell::sync::Lazy;
use thiserror::Error;

/// Errors that can occur while substituting a message
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SubstituteError {
    /// Error during parsing
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Error while running the template
    #[error("execution error: {0}")]
    Exec(#[from] ExecError),
}

impl From<Vec<ParseError>> for SubstituteError {
    fn from(errors: Vec<ParseError>) -> Self {
        SubstituteError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse, bind and run `message` against `registry`
///
/// # Example
///
/// ```rust
/// use tmplvars::{try_substitute, FunctionRegistry, SubstituteError};
///
/// let registry = FunctionRegistry::new();
/// let err = try_substitute("${today \"15:04\"}", &registry).unwrap_err();
/// assert!(matches!(err, SubstituteError::Exec(_)));
/// ```
pub fn try_substitute(message: &str, registry: &FunctionRegistry) -> Result<String, SubstituteError> {
    let template = parse(message)?;
    if template.is_plain_text() {
        return Ok(message.to_string());
    }
    let bound = crate::template::bind(&template, registry)?;
    Ok(bound.execute()?)
}

/// Replace every placeholder in `message`
///
/// Any parse or execution failure returns `message` unchanged.
pub fn substitute(message: &str, registry: &FunctionRegistry) -> String {
    match try_substitute(message, registry) {
        Ok(out) => out,
        Err(e) => {
            debug!("Leaving message unchanged: {}", e);
            message.to_string()
        }
    }
}

static DEFAULT_REGISTRY: Lazy<FunctionRegistry> = Lazy::new(build_registry);

/// [`substitute`] against a process-wide registry using the system clock and
/// the local zone
pub fn replace_vars(message: &str) -> String {
    substitute(message, &DEFAULT_REGISTRY)
}
