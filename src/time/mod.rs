//! Clock, timezone and layout support for the date functions

pub mod clock;
pub mod layout;
pub mod location;

pub use clock::{Clock, FixedClock, SystemClock};
pub use layout::{format, Stamp, DEFAULT_LAYOUT};
pub use location::{resolve_time_args, Location, LocationError, TimeArgs};
