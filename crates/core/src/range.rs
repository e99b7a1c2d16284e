use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// A rectangular range of cells, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl CellRange {
    /// Create a new range, automatically normalizing so start <= end.
    pub fn new(r1: u32, c1: u32, r2: u32, c2: u32) -> Self {
        Self {
            start_row: r1.min(r2),
            start_col: c1.min(c2),
            end_row: r1.max(r2),
            end_col: c1.max(c2),
        }
    }

    /// Create a single-cell range.
    pub fn single(row: u32, col: u32) -> Self {
        Self::new(row, col, row, col)
    }

    /// Every data cell of a `rows` x `cols` grid (titles excluded).
    pub fn all(rows: u32, cols: u32) -> Self {
        Self::new(1, 1, rows.max(1), cols.max(1))
    }

    /// Parse `"r1:c1-r2:c2"` or the literal `"ALL"`.
    ///
    /// The range is clamped to the grid; a range that falls entirely outside
    /// the data area is rejected.
    pub fn parse(text: &str, rows: u32, cols: u32) -> Result<Self, GridError> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("ALL") {
            if rows == 0 || cols == 0 {
                return Err(GridError::NoSelection);
            }
            return Ok(Self::all(rows, cols));
        }

        let invalid = || GridError::InvalidInterval(text.to_string());
        let (from, to) = text.split_once('-').ok_or_else(invalid)?;
        let (r1, c1) = parse_cell(from).ok_or_else(invalid)?;
        let (r2, c2) = parse_cell(to).ok_or_else(invalid)?;

        let range = Self::new(r1, c1, r2, c2);
        if range.start_row == 0 || range.start_col == 0 || range.start_row > rows || range.start_col > cols {
            return Err(invalid());
        }
        Ok(Self {
            end_row: range.end_row.min(rows),
            end_col: range.end_col.min(cols),
            ..range
        })
    }

    /// Check if this range contains a cell.
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    pub fn row_count(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    pub fn col_count(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    /// Number of cells in this range.
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// Iterate over all cells in this range (row-major order).
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> {
        let (start_col, end_col) = (self.start_col, self.end_col);
        (self.start_row..=self.end_row).flat_map(move |r| (start_col..=end_col).map(move |c| (r, c)))
    }
}

impl std::fmt::Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}:{}", self.start_row, self.start_col, self.end_row, self.end_col)
    }
}

fn parse_cell(s: &str) -> Option<(u32, u32)> {
    let (r, c) = s.trim().split_once(':')?;
    Some((r.trim().parse().ok()?, c.trim().parse().ok()?))
}

/// A set of row spans such as `"1-3,5,8-10"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RowInterval {
    spans: Vec<(u32, u32)>,
}

impl RowInterval {
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let invalid = || GridError::InvalidInterval(text.to_string());
        let mut spans = Vec::new();

        for part in text.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid());
            }
            let (from, to) = match part.split_once('-') {
                Some((a, b)) => (a.trim(), b.trim()),
                None => (part, part),
            };
            let from: u32 = from.parse().map_err(|_| invalid())?;
            let to: u32 = to.parse().map_err(|_| invalid())?;
            if from == 0 || to < from {
                return Err(invalid());
            }
            spans.push((from, to));
        }

        Ok(Self { spans })
    }

    pub fn contains(&self, row: u32) -> bool {
        self.spans.iter().any(|&(a, b)| row >= a && row <= b)
    }

    pub fn spans(&self) -> &[(u32, u32)] {
        &self.spans
    }

    /// Rows covered by the interval, clamped to `1..=max_row`, ascending and
    /// without duplicates.
    pub fn rows(&self, max_row: u32) -> Vec<u32> {
        let mut rows: Vec<u32> = self
            .spans
            .iter()
            .flat_map(|&(a, b)| a..=b.min(max_row))
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }
}
