//! Unit constants in the event-builder convention: nanoseconds and
//! centimeters are 1.

pub const NS: f64 = 1.0;
pub const US: f64 = 1e3 * NS;
pub const MS: f64 = 1e6 * NS;
pub const S: f64 = 1e9 * NS;

pub const CM: f64 = 1.0;
pub const UM: f64 = 1e-4 * CM;
