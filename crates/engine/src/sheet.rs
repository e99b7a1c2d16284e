use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use gridex_core::GridAccessor;

/// In-memory grid used by the CLI, file import and tests.
///
/// Cells are stored sparsely; an empty string clears a cell. Row 0 and
/// column 0 hold titles. Display values equal the stored value unless the
/// column carries a fixed number of decimals, in which case numeric cells are
/// rendered with that precision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    cells: HashMap<(u32, u32), String>,
    rows: u32,
    cols: u32,
    hidden_rows: HashSet<u32>,
    hidden_cols: HashSet<u32>,
    col_decimals: HashMap<u32, usize>,
    /// Growth limit for paste-driven resizes; `None` means unlimited.
    #[serde(default)]
    max_size: Option<(u32, u32)>,
}

impl Sheet {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            name: String::from("Sheet1"),
            rows,
            cols,
            ..Self::default()
        }
    }

    /// Build a sheet from rows of data cells placed at `(1, 1)`.
    pub fn from_rows<S: AsRef<str>>(data: &[Vec<S>]) -> Self {
        let rows = data.len() as u32;
        let cols = data.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut sheet = Self::new(rows, cols);
        for (r, line) in data.iter().enumerate() {
            for (c, value) in line.iter().enumerate() {
                sheet.set_value(r as u32 + 1, c as u32 + 1, value.as_ref());
            }
        }
        sheet
    }

    pub fn set_value(&mut self, row: u32, col: u32, value: &str) {
        if value.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value.to_string());
        }
    }

    /// Stored value, empty string when the cell is empty.
    pub fn get_raw(&self, row: u32, col: u32) -> String {
        self.cells.get(&(row, col)).cloned().unwrap_or_default()
    }

    pub fn get_display(&self, row: u32, col: u32) -> String {
        let Some(raw) = self.cells.get(&(row, col)) else {
            return String::new();
        };
        match (self.col_decimals.get(&col), raw.trim().parse::<f64>()) {
            (Some(&decimals), Ok(n)) if row > 0 => format!("{n:.decimals$}"),
            _ => raw.clone(),
        }
    }

    pub fn clear_cell(&mut self, row: u32, col: u32) {
        self.cells.remove(&(row, col));
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn set_size(&mut self, rows: u32, cols: u32) {
        self.rows = rows;
        self.cols = cols;
        self.cells.retain(|&(r, c), _| r <= rows && c <= cols);
    }

    pub fn set_max_size(&mut self, max: Option<(u32, u32)>) {
        self.max_size = max;
    }

    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        if hidden {
            self.hidden_rows.insert(row);
        } else {
            self.hidden_rows.remove(&row);
        }
    }

    pub fn set_col_hidden(&mut self, col: u32, hidden: bool) {
        if hidden {
            self.hidden_cols.insert(col);
        } else {
            self.hidden_cols.remove(&col);
        }
    }

    /// Render numeric cells of `col` with a fixed number of decimals.
    pub fn set_col_decimals(&mut self, col: u32, decimals: Option<usize>) {
        match decimals {
            Some(d) => self.col_decimals.insert(col, d),
            None => self.col_decimals.remove(&col),
        };
    }

    /// Iterate over all populated cells
    pub fn cells_iter(&self) -> impl Iterator<Item = (&(u32, u32), &String)> {
        self.cells.iter()
    }

    /// Number of populated cells, titles included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Data cells as rows of display strings (titles excluded).
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        (1..=self.rows)
            .map(|r| (1..=self.cols).map(|c| self.get_display(r, c)).collect())
            .collect()
    }
}

impl GridAccessor for Sheet {
    fn get_cell(&self, row: u32, col: u32, display: bool) -> Option<String> {
        if !self.cells.contains_key(&(row, col)) {
            return None;
        }
        Some(if display { self.get_display(row, col) } else { self.get_raw(row, col) })
    }

    fn set_cell(&mut self, row: u32, col: u32, value: &str) {
        self.set_value(row, col, value);
    }

    fn row_count(&self) -> u32 {
        self.rows
    }

    fn col_count(&self) -> u32 {
        self.cols
    }

    fn is_row_visible(&self, row: u32) -> bool {
        !self.hidden_rows.contains(&row)
    }

    fn is_col_visible(&self, col: u32) -> bool {
        !self.hidden_cols.contains(&col)
    }

    fn resize(&mut self, rows: u32, cols: u32) -> bool {
        if let Some((max_rows, max_cols)) = self.max_size {
            if rows > max_rows || cols > max_cols {
                return false;
            }
        }
        self.rows = self.rows.max(rows);
        self.cols = self.cols.max(cols);
        true
    }
}
