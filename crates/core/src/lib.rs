//! `gridex-core`: selection encoding, cell ranges, grid access and errors.
//!
//! No engine state lives here; every other crate in the workspace builds on
//! these types.

pub mod error;
pub mod grid;
pub mod range;
pub mod selection;

pub use error::{DecodeError, GridError};
pub use grid::{ClipboardHost, GridAccessor};
pub use range::{CellRange, RowInterval};
pub use selection::Selection;
