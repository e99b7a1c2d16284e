//! Text, HTML and LaTeX export.
//!
//! All three are built on the clipboard serializer: the grid is serialized
//! with a tab separator and the resulting fields are re-emitted in the
//! target format. HTML and LaTeX output is a bare table, not a document.

use std::path::Path;

use log::info;

use gridex_core::{CellRange, GridAccessor, GridError};
use gridex_engine::clipboard::{serialize, split_fields, split_lines, CopySource};

use crate::{IoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Html,
    Latex,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "csv" | "tsv" => Some(Self::Text),
            "html" | "htm" => Some(Self::Html),
            "tex" => Some(Self::Latex),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Detected from the file extension when `None`.
    pub format: Option<Format>,
    /// Separator for text output.
    pub separator: char,
    /// Cells to export; the whole grid when `None`.
    pub source: Option<CopySource>,
    pub keep_structure: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { format: None, separator: '\t', source: None, keep_structure: false }
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_latex(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(ch),
        }
    }
    out
}

fn table_rows(text: &str) -> Vec<Vec<String>> {
    split_lines(text).iter().map(|line| split_fields(line, '\t')).collect()
}

/// Render `source` (or the whole grid) in `format`.
pub fn render<G: GridAccessor + ?Sized>(
    grid: &G,
    source: &CopySource,
    format: Format,
    separator: char,
    keep_structure: bool,
) -> std::result::Result<String, GridError> {
    if format == Format::Text {
        return serialize(grid, source, separator, keep_structure);
    }

    let rows = table_rows(&serialize(grid, source, '\t', keep_structure)?);
    let mut out = String::new();
    match format {
        Format::Html => {
            out.push_str("<table>\n");
            for row in &rows {
                out.push_str("<tr>");
                for cell in row {
                    out.push_str("<td>");
                    out.push_str(&escape_html(cell));
                    out.push_str("</td>");
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</table>\n");
        }
        Format::Latex => {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            out.push_str("\\begin{tabular}{");
            out.push_str(&"l".repeat(width));
            out.push_str("}\n");
            for row in &rows {
                let cells: Vec<String> = row.iter().map(|c| escape_latex(c)).collect();
                out.push_str(&cells.join(" & "));
                out.push_str(" \\\\\n");
            }
            out.push_str("\\end{tabular}\n");
        }
        Format::Text => {}
    }
    Ok(out)
}

pub fn export_file<G: GridAccessor + ?Sized>(grid: &G, path: &Path, options: &ExportOptions) -> Result<()> {
    let format = options
        .format
        .or_else(|| Format::from_path(path))
        .ok_or_else(|| IoError::UnknownFormat(path.to_path_buf()))?;
    let source = options
        .source
        .clone()
        .unwrap_or_else(|| CopySource::Range(CellRange::all(grid.row_count(), grid.col_count())));

    let text = render(grid, &source, format, options.separator, options.keep_structure)?;
    std::fs::write(path, text.as_bytes()).map_err(|e| IoError::save(path, e))?;
    info!("export: {:?} written to {}", format, path.display());
    Ok(())
}
