//! Wrap-around cell search.
//!
//! The grid including its title row and column is flattened into a ring of
//! `(rows + 1) * (cols + 1)` slots, row-major or column-major depending on
//! the direction, and walked one slot at a time from the cursor. Title slots
//! and hidden cells are stepped over but still occupy their place in the
//! ring, so a full lap always ends back on the starting slot.

use serde::{Deserialize, Serialize};

use gridex_core::GridAccessor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindDirection {
    /// Row-major, forward.
    #[default]
    LeftTop,
    /// Column-major, forward.
    TopLeft,
    /// Row-major, backward.
    BottomRight,
    /// Column-major, backward.
    RightBottom,
}

impl FindDirection {
    pub const ALL: [FindDirection; 4] = [
        FindDirection::LeftTop,
        FindDirection::TopLeft,
        FindDirection::BottomRight,
        FindDirection::RightBottom,
    ];

    fn column_major(self) -> bool {
        matches!(self, Self::TopLeft | Self::RightBottom)
    }

    fn forward(self) -> bool {
        matches!(self, Self::LeftTop | Self::TopLeft)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lefttop" => Some(Self::LeftTop),
            "topleft" => Some(Self::TopLeft),
            "bottomright" => Some(Self::BottomRight),
            "rightbottom" => Some(Self::RightBottom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FindOptions {
    pub direction: FindDirection,
    pub match_case: bool,
    /// Compare the whole cell instead of searching for a substring.
    pub match_whole_cell: bool,
    /// Only consider cells of this column.
    pub column: Option<u32>,
}

/// Match predicate applied to a display value. Empty cells never match.
pub fn matches(value: &str, text: &str, options: &FindOptions) -> bool {
    if value.is_empty() || text.is_empty() {
        return false;
    }
    match (options.match_case, options.match_whole_cell) {
        (true, true) => value == text,
        (true, false) => value.contains(text),
        (false, true) => value.to_lowercase() == text.to_lowercase(),
        (false, false) => value.to_lowercase().contains(&text.to_lowercase()),
    }
}

struct Ring {
    rows: u32,
    cols: u32,
    column_major: bool,
    total: u64,
}

impl Ring {
    fn new(rows: u32, cols: u32, column_major: bool) -> Self {
        Self {
            rows,
            cols,
            column_major,
            total: (rows as u64 + 1) * (cols as u64 + 1),
        }
    }

    fn index(&self, row: u32, col: u32) -> u64 {
        if self.column_major {
            col as u64 * (self.rows as u64 + 1) + row as u64
        } else {
            row as u64 * (self.cols as u64 + 1) + col as u64
        }
    }

    fn coords(&self, index: u64) -> (u32, u32) {
        if self.column_major {
            let h = self.rows as u64 + 1;
            ((index % h) as u32, (index / h) as u32)
        } else {
            let w = self.cols as u64 + 1;
            ((index / w) as u32, (index % w) as u32)
        }
    }

    fn step(&self, index: u64, forward: bool) -> u64 {
        if forward {
            (index + 1) % self.total
        } else {
            (index + self.total - 1) % self.total
        }
    }
}

/// Search for `text` starting at `from`.
///
/// With `check_current` the starting cell is tested before moving; otherwise
/// it is tested last, once the walk has wrapped all the way round. Visits at
/// most `(rows + 1) * (cols + 1)` slots.
pub fn find<G: GridAccessor + ?Sized>(
    grid: &G,
    text: &str,
    from: (u32, u32),
    options: &FindOptions,
    check_current: bool,
) -> Option<(u32, u32)> {
    let rows = grid.row_count();
    let cols = grid.col_count();
    if rows == 0 || cols == 0 || text.is_empty() {
        return None;
    }

    let ring = Ring::new(rows, cols, options.direction.column_major());
    let forward = options.direction.forward();

    let hit = |index: u64| -> Option<(u32, u32)> {
        let (row, col) = ring.coords(index);
        if row == 0 || col == 0 {
            return None;
        }
        if options.column.is_some_and(|c| c != col) {
            return None;
        }
        if !grid.is_row_visible(row) || !grid.is_col_visible(col) {
            return None;
        }
        let value = grid.get_cell(row, col, true)?;
        matches(&value, text, options).then_some((row, col))
    };

    let start = ring.index(from.0.min(rows), from.1.min(cols));
    if check_current {
        if let Some(found) = hit(start) {
            return Some(found);
        }
    }

    let mut index = start;
    for _ in 0..ring.total {
        index = ring.step(index, forward);
        if index == start {
            return if check_current { None } else { hit(start) };
        }
        if let Some(found) = hit(index) {
            return Some(found);
        }
    }
    None
}

/// Remembers the last hit so a repeated search moves on instead of finding
/// the same cell again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindState {
    last_found: Option<(u32, u32)>,
}

impl FindState {
    /// The current cell is searched first whenever the cursor has moved
    /// away from the last hit.
    pub fn check_current(&self, cursor: (u32, u32)) -> bool {
        self.last_found != Some(cursor)
    }

    pub fn record(&mut self, found: Option<(u32, u32)>) {
        if found.is_some() {
            self.last_found = found;
        }
    }

    pub fn last_found(&self) -> Option<(u32, u32)> {
        self.last_found
    }

    pub fn reset(&mut self) {
        self.last_found = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Sheet;

    fn grid() -> Sheet {
        Sheet::from_rows(&[
            vec!["apple", "Banana", ""],
            vec!["cherry", "apple pie", "date"],
            vec!["", "APPLE", "fig"],
        ])
    }

    fn opts(direction: FindDirection) -> FindOptions {
        FindOptions { direction, ..Default::default() }
    }

    #[test]
    fn predicate_variants() {
        let mut o = FindOptions::default();
        assert!(matches("Apple pie", "apple", &o));
        o.match_case = true;
        assert!(!matches("Apple pie", "apple", &o));
        o.match_whole_cell = true;
        assert!(matches("apple", "apple", &o));
        assert!(!matches("apple pie", "apple", &o));
        o.match_case = false;
        assert!(matches("APPLE", "apple", &o));
        assert!(!matches("", "", &o));
    }

    #[test]
    fn row_major_forward() {
        let g = grid();
        let o = opts(FindDirection::LeftTop);
        assert_eq!(find(&g, "apple", (1, 1), &o, true), Some((1, 1)));
        assert_eq!(find(&g, "apple", (1, 1), &o, false), Some((2, 2)));
        assert_eq!(find(&g, "apple", (2, 2), &o, false), Some((3, 2)));
        // wraps past the title row back to the top
        assert_eq!(find(&g, "apple", (3, 2), &o, false), Some((1, 1)));
    }

    #[test]
    fn column_major_forward() {
        let g = grid();
        let o = opts(FindDirection::TopLeft);
        // column 1 holds only one apple, the next ones are down column 2
        assert_eq!(find(&g, "apple", (1, 1), &o, false), Some((2, 2)));
        assert_eq!(find(&g, "e", (1, 1), &o, false), Some((2, 1)));
    }

    #[test]
    fn backward_directions() {
        let g = grid();
        assert_eq!(find(&g, "apple", (1, 1), &opts(FindDirection::BottomRight), false), Some((3, 2)));
        assert_eq!(find(&g, "apple", (3, 2), &opts(FindDirection::RightBottom), false), Some((2, 2)));
    }

    #[test]
    fn restricted_to_column() {
        let g = grid();
        let o = FindOptions { column: Some(2), match_whole_cell: true, ..Default::default() };
        assert_eq!(find(&g, "apple", (1, 1), &o, false), Some((3, 2)));
        let o = FindOptions { column: Some(3), ..Default::default() };
        assert_eq!(find(&g, "apple", (1, 1), &o, false), None);
    }

    #[test]
    fn only_match_is_the_start_cell() {
        let g = grid();
        let o = opts(FindDirection::LeftTop);
        assert_eq!(find(&g, "fig", (3, 3), &o, false), Some((3, 3)));
        assert_eq!(find(&g, "zzz", (3, 3), &o, true), None);
    }

    #[test]
    fn hidden_cells_are_skipped() {
        let mut g = grid();
        g.set_row_hidden(2, true);
        let o = opts(FindDirection::LeftTop);
        assert_eq!(find(&g, "apple", (1, 1), &o, false), Some((3, 2)));
    }

    #[test]
    fn titles_never_match() {
        let mut g = grid();
        g.set_value(0, 1, "apple");
        g.set_value(1, 0, "apple");
        let o = FindOptions { match_whole_cell: true, match_case: true, ..Default::default() };
        assert_eq!(find(&g, "apple", (3, 3), &o, false), Some((1, 1)));
    }

    #[test]
    fn state_decides_current_cell_check() {
        let mut state = FindState::default();
        assert!(state.check_current((1, 1)));
        state.record(Some((1, 1)));
        assert!(!state.check_current((1, 1)));
        state.record(None);
        assert_eq!(state.last_found(), Some((1, 1)));
        assert!(state.check_current((2, 1)));
    }

    #[test]
    fn direction_names() {
        assert_eq!(FindDirection::parse("TopLeft"), Some(FindDirection::TopLeft));
        assert_eq!(FindDirection::parse("sideways"), None);
    }
}
