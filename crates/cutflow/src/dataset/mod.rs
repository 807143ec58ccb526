//! Columnar event tables.

mod column;
mod loader;
mod table;

pub use column::Column;
pub use loader::load_csv;
pub use table::Dataset;
