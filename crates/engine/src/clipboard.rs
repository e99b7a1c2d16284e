//! Clipboard text marshalling.
//!
//! Copy turns a selection or rectangle into separator-delimited lines, each
//! terminated by `\n`. Paste goes the other way: [`infer_dimensions`] works
//! out the shape of incoming text and [`split_fields`] breaks each line into
//! cells. The write loop itself lives on [`Matrix::paste`](crate::matrix::Matrix::paste).

use log::debug;

use gridex_core::{CellRange, GridAccessor, GridError, Selection};

/// What to copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopySource {
    Marked(Selection),
    Range(CellRange),
}

/// Answer of the size-negotiation callback when pasted text does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasteSizeDecision {
    /// Abort the paste.
    Ignore,
    /// Clip to the current grid.
    #[default]
    Default,
    /// Grow the grid to fit.
    Continue,
}

pub type PasteSizeCallback = Box<dyn FnMut(u32, u32) -> PasteSizeDecision>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PasteOptions {
    /// Top-left target cell; defaults to the first marked cell, then `(1, 1)`.
    pub anchor: Option<(u32, u32)>,
    /// Explicit separator; inferred when `None`.
    pub separator: Option<char>,
    /// Explicit `(rows, cols)` of the text; inferred when `None`.
    pub dimensions: Option<(u32, u32)>,
}

/// Candidate separators, tried in order.
const SEPARATORS: [char; 3] = ['\t', ';', ' '];

fn push_field(out: &mut String, value: &str, separator: char) {
    if value.contains(separator) || value.starts_with('"') {
        out.push('"');
        out.push_str(value);
        out.push('"');
    } else {
        out.push_str(value);
    }
}

fn push_line(out: &mut String, fields: &[String], separator: char) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        push_field(out, field, separator);
    }
    out.push('\n');
}

fn display<G: GridAccessor + ?Sized>(grid: &G, row: u32, col: u32) -> String {
    grid.get_cell(row, col, true).unwrap_or_default()
}

/// Serialize visible cells of `source` as delimited text.
///
/// Cell masks must pack into a rectangle unless `keep_structure` is set, in
/// which case unmarked cells inside the bounding box are written as a single
/// space. Hidden rows and columns are left out entirely.
pub fn serialize<G: GridAccessor + ?Sized>(
    grid: &G,
    source: &CopySource,
    separator: char,
    keep_structure: bool,
) -> Result<String, GridError> {
    let rows = grid.row_count();
    let cols = grid.col_count();
    let visible_rows = |r1: u32, r2: u32| (r1..=r2).filter(move |&r| grid.is_row_visible(r));
    let visible_cols = |c1: u32, c2: u32| (c1..=c2).filter(move |&c| grid.is_col_visible(c)).collect::<Vec<_>>();

    let mut out = String::new();
    match source {
        CopySource::Range(range) => {
            if rows == 0 || cols == 0 {
                return Err(GridError::NoSelection);
            }
            let end_row = range.end_row.min(rows);
            let end_col = range.end_col.min(cols);
            if range.start_row == 0 || range.start_col == 0 || range.start_row > end_row || range.start_col > end_col {
                return Err(GridError::InvalidInterval(range.to_string()));
            }
            let cols_out = visible_cols(range.start_col, end_col);
            for row in visible_rows(range.start_row, end_row) {
                let fields: Vec<String> = cols_out.iter().map(|&c| display(grid, row, c)).collect();
                push_line(&mut out, &fields, separator);
            }
        }
        CopySource::Marked(selection) => {
            let bounds = selection.bounds(rows, cols).ok_or(GridError::NoSelection)?;
            match selection {
                Selection::ColumnSet(_) | Selection::LineSet(_) => {
                    let cols_out: Vec<u32> = visible_cols(1, cols)
                        .into_iter()
                        .filter(|&c| match selection {
                            Selection::ColumnSet(_) => selection.is_selected(1, c),
                            _ => true,
                        })
                        .collect();
                    for row in visible_rows(1, rows) {
                        if matches!(selection, Selection::LineSet(_)) && !selection.is_selected(row, 1) {
                            continue;
                        }
                        let fields: Vec<String> = cols_out.iter().map(|&c| display(grid, row, c)).collect();
                        push_line(&mut out, &fields, separator);
                    }
                }
                Selection::CellMask { .. } => {
                    if !keep_structure && !selection.is_consistent() {
                        return Err(GridError::InvalidSelection);
                    }
                    let cols_out = visible_cols(bounds.start_col, bounds.end_col);
                    for row in visible_rows(bounds.start_row, bounds.end_row) {
                        if keep_structure {
                            let fields: Vec<String> = cols_out
                                .iter()
                                .map(|&c| if selection.is_selected(row, c) { display(grid, row, c) } else { " ".to_string() })
                                .collect();
                            push_line(&mut out, &fields, separator);
                        } else {
                            let fields: Vec<String> = cols_out
                                .iter()
                                .filter(|&&c| selection.is_selected(row, c))
                                .map(|&c| display(grid, row, c))
                                .collect();
                            if !fields.is_empty() {
                                push_line(&mut out, &fields, separator);
                            }
                        }
                    }
                }
            }
        }
    }
    debug!("clipboard: serialized {} bytes", out.len());
    Ok(out)
}

/// Lines of pasted text: a final newline does not start another line and
/// `\r\n` endings are accepted.
pub fn split_lines(text: &str) -> Vec<&str> {
    let trimmed = text.strip_suffix('\n').unwrap_or(text);
    if trimmed.is_empty() && text.len() <= 1 {
        return Vec::new();
    }
    trimmed
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

fn count_unquoted(line: &str, separator: char) -> usize {
    split_fields(line, separator).len() - 1
}

/// Work out `(rows, cols, separator)` of pasted text.
///
/// Candidates are tab, `;` and space in that order; the first one found
/// outside quotes a whole multiple of the line count wins. Text without
/// any candidate is one column wide.
pub fn infer_dimensions(text: &str, separator: Option<char>) -> Result<(u32, u32, char), GridError> {
    let lines = split_lines(text);
    if lines.is_empty() {
        return Err(GridError::InvalidData("no lines to paste".into()));
    }
    let line_count = lines.len();
    let total = |sep: char| lines.iter().map(|l| count_unquoted(l, sep)).sum::<usize>();

    let shape = |sep: char, count: usize| -> Option<(u32, u32, char)> {
        (count % line_count == 0).then(|| (line_count as u32, (count / line_count + 1) as u32, sep))
    };

    if let Some(sep) = separator {
        return shape(sep, total(sep))
            .ok_or_else(|| GridError::InvalidData(format!("text is not rectangular for separator {sep:?}")));
    }

    let mut seen_any = false;
    for sep in SEPARATORS {
        let count = total(sep);
        if count == 0 {
            continue;
        }
        seen_any = true;
        if let Some(found) = shape(sep, count) {
            return Ok(found);
        }
    }
    if seen_any {
        Err(GridError::InvalidData("cannot infer a rectangular shape".into()))
    } else {
        Ok((line_count as u32, 1, SEPARATORS[0]))
    }
}

/// Split one line on `separator`.
///
/// A field is quoted only when its first character is `"`; it then runs to
/// the next `"` that sits right before a separator or the end of the line,
/// and that outer pair is dropped. Quotes anywhere else are literal, as is a
/// leading quote that never closes.
pub fn split_fields(line: &str, separator: char) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let n = chars.len();
    let mut fields = Vec::new();
    let mut i = 0;
    loop {
        if chars.get(i) == Some(&'"') {
            let close = (i + 1..n).find(|&j| chars[j] == '"' && (j + 1 == n || chars[j + 1] == separator));
            if let Some(j) = close {
                fields.push(chars[i + 1..j].iter().collect());
                if j + 1 == n {
                    break;
                }
                i = j + 2;
                continue;
            }
        }
        match (i..n).find(|&j| chars[j] == separator) {
            Some(j) => {
                fields.push(chars[i..j].iter().collect());
                i = j + 1;
            }
            None => {
                fields.push(chars[i.min(n)..].iter().collect());
                break;
            }
        }
    }
    fields
}
