//! Function registry and template execution
//!
//! The registry maps names to the date functions; the executor evaluates a
//! parsed template's actions against it.
//!
//! # Example
//!
//! ```text
//! Report for ${yesterday_date}
//! Generated at ${today "15:04 MST" "Europe/Berlin"}
//! Window start ${today_mins_ago 30 "15:04" "UTC"}
//! ```

mod executor;
mod registry;

pub use executor::{bind, BoundTemplate};
pub use registry::{build_registry, Builtin, ExecError, FunctionRegistry, Param, ParamKind};
