//! Named, reusable selections built by editing a base cut list.

mod builder;
mod report;

pub use builder::{SelectionBuilder, TagMatcher};
pub use report::{CutReport, SelectionReport};
