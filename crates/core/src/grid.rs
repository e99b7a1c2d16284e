//! Host grid access.
//!
//! Everything in the engine reads and writes cells through this trait. Row 0
//! and column 0 hold titles; data cells live in `1..=row_count()` and
//! `1..=col_count()`.

pub trait GridAccessor {
    /// Cell value. With `display` set, the formatted value shown to the user;
    /// otherwise the internal canonical value. `None` for an empty cell.
    fn get_cell(&self, row: u32, col: u32, display: bool) -> Option<String>;

    fn set_cell(&mut self, row: u32, col: u32, value: &str);

    /// Number of data rows (title row excluded).
    fn row_count(&self) -> u32;

    /// Number of data columns (title column excluded).
    fn col_count(&self) -> u32;

    fn is_row_visible(&self, row: u32) -> bool;

    fn is_col_visible(&self, col: u32) -> bool;

    /// Grow the grid to at least `rows` x `cols` data cells.
    /// Returns false when the host cannot resize.
    fn resize(&mut self, _rows: u32, _cols: u32) -> bool {
        false
    }
}

impl<G: GridAccessor + ?Sized> GridAccessor for &mut G {
    fn get_cell(&self, row: u32, col: u32, display: bool) -> Option<String> {
        (**self).get_cell(row, col, display)
    }

    fn set_cell(&mut self, row: u32, col: u32, value: &str) {
        (**self).set_cell(row, col, value)
    }

    fn row_count(&self) -> u32 {
        (**self).row_count()
    }

    fn col_count(&self) -> u32 {
        (**self).col_count()
    }

    fn is_row_visible(&self, row: u32) -> bool {
        (**self).is_row_visible(row)
    }

    fn is_col_visible(&self, col: u32) -> bool {
        (**self).is_col_visible(col)
    }

    fn resize(&mut self, rows: u32, cols: u32) -> bool {
        (**self).resize(rows, cols)
    }
}

/// Host clipboard: a single opaque text blob.
pub trait ClipboardHost {
    fn get_text(&mut self) -> Option<String>;
    fn set_text(&mut self, text: &str);
}
