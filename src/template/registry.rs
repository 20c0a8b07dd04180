//! Function registry: the named date functions a template may call

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use log::warn;
use thiserror::Error;

use crate::parser::ast::Value;
use crate::time::{format, resolve_time_args, Clock, Location, SystemClock, DEFAULT_LAYOUT};

/// Errors that can occur while executing a template
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// Function not found in registry
    #[error("function \"{name}\" not defined")]
    UnknownFunction { name: String },

    /// Wrong number of arguments
    #[error("wrong number of args for {function}: want {expected} got {found}")]
    ArgumentCount {
        function: String,
        expected: usize,
        found: usize,
    },

    /// Argument of the wrong type
    #[error("wrong type for value; expected {expected}; got {found} (argument {param} of {function})")]
    ArgumentType {
        function: String,
        param: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Arguments given to something that is not a function
    #[error("can't give argument to non-function {found}")]
    NotAFunction { found: String },

    /// Field access on the empty data context
    #[error("can't evaluate field {field} in type string")]
    FieldAccess { field: String },

    /// Minute offset outside the representable time range
    #[error("cannot shift time back by {minutes} minutes")]
    TimeOutOfRange { minutes: i64 },

    /// The clock's instant has no wall-clock time in the location
    #[error("time out of range in location {location}")]
    ClockOutOfRange { location: &'static str },
}

/// Type of a function parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    String,
}

impl ParamKind {
    pub fn name(self) -> &'static str {
        match self {
            ParamKind::Int => "int",
            ParamKind::String => "string",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ParamKind::Int, Value::Int(_)) | (ParamKind::String, Value::Str(_))
        )
    }
}

/// A declared function parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
}

const LAYOUT: Param = Param {
    name: "layout",
    kind: ParamKind::String,
};
const TIMEZONE: Param = Param {
    name: "timezone",
    kind: ParamKind::String,
};
const MINS_AGO: Param = Param {
    name: "minsAgo",
    kind: ParamKind::Int,
};

/// The functions available to templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `today_date`: current local date, `2006-01-02`
    TodayDate,
    /// `today layout timezone`
    Today,
    /// `today_mins_ago minsAgo layout timezone`
    TodayMinsAgo,
    /// `yesterday_date`: previous local date, `2006-01-02`
    YesterdayDate,
    /// `yesterday layout timezone`
    Yesterday,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::TodayDate,
        Builtin::Today,
        Builtin::TodayMinsAgo,
        Builtin::YesterdayDate,
        Builtin::Yesterday,
    ];

    /// Name used to call the function from a template
    pub fn name(self) -> &'static str {
        match self {
            Builtin::TodayDate => "today_date",
            Builtin::Today => "today",
            Builtin::TodayMinsAgo => "today_mins_ago",
            Builtin::YesterdayDate => "yesterday_date",
            Builtin::Yesterday => "yesterday",
        }
    }

    pub fn params(self) -> &'static [Param] {
        match self {
            Builtin::TodayDate | Builtin::YesterdayDate => &[],
            Builtin::Today | Builtin::Yesterday => &[LAYOUT, TIMEZONE],
            Builtin::TodayMinsAgo => &[MINS_AGO, LAYOUT, TIMEZONE],
        }
    }

    /// Human-readable signature, e.g. `today(layout string, timezone string)`
    pub fn signature(self) -> String {
        let params: Vec<String> = self
            .params()
            .iter()
            .map(|p| format!("{} {}", p.name, p.kind.name()))
            .collect();
        format!("{}({})", self.name(), params.join(", "))
    }

    /// Check `args` against the declared parameters
    fn check_args(self, args: &[Value]) -> Result<(), ExecError> {
        let params = self.params();
        if args.len() != params.len() {
            return Err(ExecError::ArgumentCount {
                function: self.name().to_string(),
                expected: params.len(),
                found: args.len(),
            });
        }
        for (param, arg) in params.iter().zip(args) {
            if !param.kind.accepts(arg) {
                return Err(ExecError::ArgumentType {
                    function: self.name().to_string(),
                    param: param.name,
                    expected: param.kind.name(),
                    found: arg.kind(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registry mapping function names to the date functions
///
/// Immutable once built; share it freely between threads.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<&'static str, Builtin>,
    clock: Arc<dyn Clock>,
    /// Zone used by `today_date` and `yesterday_date`
    local_zone: Location,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Registry with all functions, the system clock and the process-local zone
    pub fn new() -> Self {
        Self {
            functions: Builtin::ALL.iter().map(|b| (b.name(), *b)).collect(),
            clock: Arc::new(SystemClock),
            local_zone: Location::Local,
        }
    }

    /// Read "now" from `clock` instead of the system clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Use `zone` for the functions that take no timezone argument
    pub fn with_local_zone(mut self, zone: Location) -> Self {
        self.local_zone = zone;
        self
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<Builtin> {
        self.functions.get(name).copied()
    }

    /// Check if a function exists
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// All registered function names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn local_zone(&self) -> Location {
        self.local_zone
    }

    /// Call a function by name with already-evaluated arguments
    pub fn call(&self, name: &str, args: &[Value]) -> Result<String, ExecError> {
        let builtin = self.get(name).ok_or_else(|| ExecError::UnknownFunction {
            name: name.to_string(),
        })?;
        builtin.check_args(args)?;

        let text = |i: usize| match &args[i] {
            Value::Str(s) => s.as_str(),
            _ => "",
        };
        match builtin {
            Builtin::TodayDate => self.today_date(),
            Builtin::Today => self.today(text(0), text(1)),
            Builtin::TodayMinsAgo => {
                let mins_ago = match args[0] {
                    Value::Int(n) => n,
                    _ => 0,
                };
                self.today_mins_ago(mins_ago, text(1), text(2))
            }
            Builtin::YesterdayDate => self.yesterday_date(),
            Builtin::Yesterday => self.yesterday(text(0), text(1)),
        }
    }

    /// Current date in the local zone, `2006-01-02`
    pub fn today_date(&self) -> Result<String, ExecError> {
        render(self.local_zone, self.clock.now(), 0, DEFAULT_LAYOUT)
    }

    /// Current time in `timezone`, rendered with `layout`
    pub fn today(&self, layout: &str, timezone: &str) -> Result<String, ExecError> {
        let args = resolve_time_args(layout, timezone);
        render(args.location, self.clock.now(), 0, &args.layout)
    }

    /// Time `mins_ago` minutes before now in `timezone`, rendered with `layout`
    ///
    /// A zero or negative `mins_ago` gives the current time.
    pub fn today_mins_ago(
        &self,
        mins_ago: i64,
        layout: &str,
        timezone: &str,
    ) -> Result<String, ExecError> {
        let args = resolve_time_args(layout, timezone);
        let now = self.clock.now();
        if mins_ago <= 0 {
            warn!("Invalid minsAgo argument: {}", mins_ago);
            return render(args.location, now, 0, &args.layout);
        }

        let out_of_range = ExecError::TimeOutOfRange { minutes: mins_ago };
        let then = TimeDelta::try_minutes(mins_ago)
            .and_then(|delta| now.checked_sub_signed(delta))
            .ok_or_else(|| out_of_range.clone())?;
        let stamp = args.location.stamp(then, 0).ok_or(out_of_range)?;
        Ok(format(&stamp, &args.layout))
    }

    /// Previous calendar day in the local zone, `2006-01-02`
    pub fn yesterday_date(&self) -> Result<String, ExecError> {
        render(self.local_zone, self.clock.now(), 1, DEFAULT_LAYOUT)
    }

    /// Current time one calendar day back in `timezone`, rendered with `layout`
    pub fn yesterday(&self, layout: &str, timezone: &str) -> Result<String, ExecError> {
        let args = resolve_time_args(layout, timezone);
        render(args.location, self.clock.now(), 1, &args.layout)
    }
}

fn render(
    location: Location,
    instant: DateTime<Utc>,
    days_back: u64,
    layout: &str,
) -> Result<String, ExecError> {
    let stamp = location
        .stamp(instant, days_back)
        .ok_or(ExecError::ClockOutOfRange {
            location: location.name(),
        })?;
    Ok(format(&stamp, layout))
}

/// Build a registry with every function, the system clock and local zone
pub fn build_registry() -> FunctionRegistry {
    FunctionRegistry::new()
}
