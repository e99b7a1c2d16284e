pub mod busy;
pub mod clipboard;
pub mod column_units;
pub mod events;
pub mod find;
pub mod matrix;
pub mod sheet;
pub mod undo;
pub mod units;

pub use gridex_core::{CellRange, GridAccessor, GridError, RowInterval, Selection};
pub use matrix::{CopyTarget, Matrix, MatrixConfig};
pub use sheet::Sheet;
