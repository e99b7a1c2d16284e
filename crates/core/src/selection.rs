//! Marked-cell selections and their compact string encoding.
//!
//! Three mutually exclusive encodings share one grammar:
//!
//! - `C` followed by one `1`/`0` per column: whole columns are marked
//! - `L` followed by one `1`/`0` per row: whole rows (lines) are marked
//! - no tag, `rows * cols` characters row-major: individual cells are marked
//!
//! Bit positions map to data coordinates starting at 1; title row and
//! column never appear in the encoding.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::range::CellRange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// One flag per column `1..=cols`.
    ColumnSet(Vec<bool>),
    /// One flag per row `1..=rows`.
    LineSet(Vec<bool>),
    /// One flag per data cell, row-major.
    CellMask { rows: u32, cols: u32, bits: Vec<bool> },
}

impl Selection {
    pub fn columns(cols: u32) -> Self {
        Self::ColumnSet(vec![false; cols as usize])
    }

    pub fn lines(rows: u32) -> Self {
        Self::LineSet(vec![false; rows as usize])
    }

    pub fn cells(rows: u32, cols: u32) -> Self {
        Self::CellMask { rows, cols, bits: vec![false; rows as usize * cols as usize] }
    }

    /// Cell mask with exactly the given `(row, col)` cells marked.
    /// Cells outside the grid are ignored.
    pub fn from_cells(rows: u32, cols: u32, marked: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let mut sel = Self::cells(rows, cols);
        for (row, col) in marked {
            sel.set(row, col, true);
        }
        sel
    }

    pub fn decode(s: &str, rows: u32, cols: u32) -> Result<Self, DecodeError> {
        match s.as_bytes().first() {
            Some(b'C') => Ok(Self::ColumnSet(decode_bits(&s[1..], cols as usize, 1)?)),
            Some(b'L') => Ok(Self::LineSet(decode_bits(&s[1..], rows as usize, 1)?)),
            _ => {
                let bits = decode_bits(s, rows as usize * cols as usize, 0)?;
                Ok(Self::CellMask { rows, cols, bits })
            }
        }
    }

    pub fn encode(&self) -> String {
        let (tag, bits) = match self {
            Self::ColumnSet(bits) => (Some('C'), bits),
            Self::LineSet(bits) => (Some('L'), bits),
            Self::CellMask { bits, .. } => (None, bits),
        };
        tag.into_iter()
            .chain(bits.iter().map(|&b| if b { '1' } else { '0' }))
            .collect()
    }

    /// Mark or unmark a cell. For column and line sets only the relevant
    /// coordinate is used.
    pub fn set(&mut self, row: u32, col: u32, marked: bool) {
        match self {
            Self::ColumnSet(bits) => set_bit(bits, col, marked),
            Self::LineSet(bits) => set_bit(bits, row, marked),
            Self::CellMask { rows, cols, bits } => {
                if row >= 1 && col >= 1 && row <= *rows && col <= *cols {
                    set_bit(bits, (row - 1) * *cols + col, marked);
                }
            }
        }
    }

    pub fn is_selected(&self, row: u32, col: u32) -> bool {
        if row == 0 || col == 0 {
            return false;
        }
        match self {
            Self::ColumnSet(bits) => bits.get(col as usize - 1).copied().unwrap_or(false),
            Self::LineSet(bits) => bits.get(row as usize - 1).copied().unwrap_or(false),
            Self::CellMask { rows, cols, bits } => {
                row <= *rows
                    && col <= *cols
                    && bits.get(((row - 1) * *cols + (col - 1)) as usize).copied().unwrap_or(false)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::ColumnSet(bits) | Self::LineSet(bits) | Self::CellMask { bits, .. } => {
                !bits.iter().any(|&b| b)
            }
        }
    }

    /// Number of marked cells in a `rows` x `cols` grid.
    pub fn selected_count(&self, rows: u32, cols: u32) -> u64 {
        let count = |bits: &[bool]| bits.iter().filter(|&&b| b).count() as u64;
        match self {
            Self::ColumnSet(bits) => count(bits) * rows as u64,
            Self::LineSet(bits) => count(bits) * cols as u64,
            Self::CellMask { bits, .. } => count(bits),
        }
    }

    /// Smallest rectangle holding every marked cell, `None` if nothing is marked.
    pub fn bounds(&self, rows: u32, cols: u32) -> Option<CellRange> {
        match self {
            Self::ColumnSet(bits) => {
                let (first, last) = first_last(bits)?;
                (rows > 0).then(|| CellRange::new(1, first, rows, last))
            }
            Self::LineSet(bits) => {
                let (first, last) = first_last(bits)?;
                (cols > 0).then(|| CellRange::new(first, 1, last, cols))
            }
            Self::CellMask { cols: mc, bits, .. } => {
                let mut bounds: Option<CellRange> = None;
                let marked = bits.iter().enumerate().filter_map(|(i, &b)| b.then_some(i as u32));
                for i in marked {
                    let row = i / mc + 1;
                    let col = i % mc + 1;
                    bounds = Some(match bounds {
                        None => CellRange::single(row, col),
                        Some(b) => CellRange::new(
                            b.start_row.min(row),
                            b.start_col.min(col),
                            b.end_row.max(row),
                            b.end_col.max(col),
                        ),
                    });
                }
                bounds
            }
        }
    }

    /// True when every row holding a marked cell has the same column pattern,
    /// so the marked cells pack into a rectangle. Column and line sets are
    /// always consistent.
    pub fn is_consistent(&self) -> bool {
        let Self::CellMask { cols, bits, .. } = self else {
            return true;
        };
        if *cols == 0 {
            return true;
        }
        let mut pattern: Option<&[bool]> = None;
        for row in bits.chunks(*cols as usize) {
            if !row.iter().any(|&b| b) {
                continue;
            }
            match pattern {
                None => pattern = Some(row),
                Some(p) if p != row => return false,
                Some(_) => {}
            }
        }
        true
    }

    /// First marked cell in row-major order.
    pub fn start_cell(&self, rows: u32, cols: u32) -> Option<(u32, u32)> {
        match self {
            Self::ColumnSet(bits) => {
                let (first, _) = first_last(bits)?;
                (rows > 0).then_some((1, first))
            }
            Self::LineSet(bits) => {
                let (first, _) = first_last(bits)?;
                (cols > 0).then_some((first, 1))
            }
            Self::CellMask { cols: mc, bits, .. } => {
                let i = bits.iter().position(|&b| b)? as u32;
                Some((i / mc + 1, i % mc + 1))
            }
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

fn decode_bits(s: &str, expected: usize, offset: usize) -> Result<Vec<bool>, DecodeError> {
    let found = s.chars().count();
    if found != expected {
        return Err(DecodeError::Length { expected, found });
    }
    s.chars()
        .enumerate()
        .map(|(i, ch)| match ch {
            '1' => Ok(true),
            '0' => Ok(false),
            _ => Err(DecodeError::InvalidChar { ch, pos: i + offset }),
        })
        .collect()
}

fn set_bit(bits: &mut [bool], index: u32, marked: bool) {
    if index >= 1 {
        if let Some(b) = bits.get_mut(index as usize - 1) {
            *b = marked;
        }
    }
}

/// 1-based positions of the first and last set flag.
fn first_last(bits: &[bool]) -> Option<(u32, u32)> {
    let first = bits.iter().position(|&b| b)?;
    let last = bits.iter().rposition(|&b| b)?;
    Some((first as u32 + 1, last as u32 + 1))
}
