//! The grid controller.
//!
//! `Matrix` ties a host grid to the undo engine, the busy coordinator, the
//! find state and the unit registry. Every multi-cell operation runs the same
//! way: open a busy session (which opens an undo transaction), write cells
//! one at a time while ticking, close the session and notify listeners.
//! A cancelled operation keeps the cells it already wrote, except a column
//! unit conversion, which is put back whole.
//!
//! Failing operations store their error in a last-error slot instead of
//! returning it, so a host can poll it after a `false`/`None` result.

use log::{debug, warn};

use gridex_core::{CellRange, ClipboardHost, GridAccessor, GridError, RowInterval, Selection};

use crate::busy::{BusyCallback, BusyCoordinator, BusyHost};
use crate::clipboard::{
    infer_dimensions, serialize, split_fields, split_lines, CopySource, PasteOptions, PasteSizeCallback,
    PasteSizeDecision,
};
use crate::column_units::{ColumnUnit, ColumnUnits};
use crate::events::{CellsChangedEvent, EventCallback, GridEvent, UndoStackEvent};
use crate::find::{self, FindOptions, FindState};
use crate::undo::UndoEngine;
use crate::units::{RegistryOptions, UnitId, UnitRegistry};

/// Rows a single cell is copied into by [`Matrix::copy_column_to`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyTarget {
    /// Every other row of the column.
    All,
    /// Rows whose cell in the column is marked.
    Marked(Selection),
    /// Rows listed in the interval.
    Interval(RowInterval),
}

/// Engine-facing view of the user settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixConfig {
    pub separator: char,
    pub keep_structure: bool,
    pub undo_enabled: bool,
    pub undo_max_entries: Option<usize>,
    pub find: FindOptions,
    pub units: RegistryOptions,
    pub progress_threshold: u64,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            separator: '\t',
            keep_structure: false,
            undo_enabled: true,
            undo_max_entries: None,
            find: FindOptions::default(),
            units: RegistryOptions::default(),
            progress_threshold: 1,
        }
    }
}

/// Visible lines from `start` up to `limit`, at most `count` of them, and
/// the last line index a full run would need.
fn visible_run(start: u32, count: u32, limit: u32, visible: impl Fn(u32) -> bool) -> (Vec<u32>, u32) {
    let lines: Vec<u32> = (start..=limit).filter(|&i| visible(i)).take(count as usize).collect();
    let needed = match lines.last() {
        Some(&last) if lines.len() == count as usize => last,
        _ => limit.max(start - 1) + (count - lines.len() as u32),
    };
    (lines, needed)
}

/// The grid as the user sees it. Display reads of data cells in a column
/// bound to a unit are converted to its display unit, and writes there are
/// taken as display-unit values and converted back.
struct DisplayGrid<'a, G: GridAccessor> {
    grid: &'a mut G,
    units: &'a UnitRegistry,
    column_units: &'a ColumnUnits,
}

impl<G: GridAccessor> GridAccessor for DisplayGrid<'_, G> {
    fn get_cell(&self, row: u32, col: u32, display: bool) -> Option<String> {
        if display && row > 0 && self.column_units.get(col).is_some() {
            let stored = self.grid.get_cell(row, col, false)?;
            return Some(self.column_units.display_value(self.units, col, &stored));
        }
        self.grid.get_cell(row, col, display)
    }

    fn set_cell(&mut self, row: u32, col: u32, value: &str) {
        if row > 0 {
            let stored = self.column_units.storage_value(self.units, col, value);
            self.grid.set_cell(row, col, &stored);
        } else {
            self.grid.set_cell(row, col, value);
        }
    }

    fn row_count(&self) -> u32 {
        self.grid.row_count()
    }

    fn col_count(&self) -> u32 {
        self.grid.col_count()
    }

    fn is_row_visible(&self, row: u32) -> bool {
        self.grid.is_row_visible(row)
    }

    fn is_col_visible(&self, col: u32) -> bool {
        self.grid.is_col_visible(col)
    }

    fn resize(&mut self, rows: u32, cols: u32) -> bool {
        self.grid.resize(rows, cols)
    }
}

pub struct Matrix<G: GridAccessor> {
    grid: G,
    undo: UndoEngine,
    undo_enabled: bool,
    busy: BusyCoordinator,
    find_state: FindState,
    find_options: FindOptions,
    focus: (u32, u32),
    selection: Option<Selection>,
    units: UnitRegistry,
    column_units: ColumnUnits,
    separator: char,
    keep_structure: bool,
    last_error: Option<GridError>,
    size_callback: Option<PasteSizeCallback>,
    event_callback: Option<EventCallback>,
}

impl<G: GridAccessor> Matrix<G> {
    pub fn new(grid: G) -> Self {
        let config = MatrixConfig::default();
        Self {
            grid,
            undo: UndoEngine::new(),
            undo_enabled: config.undo_enabled,
            busy: BusyCoordinator::new(),
            find_state: FindState::default(),
            find_options: config.find,
            focus: (1, 1),
            selection: None,
            units: UnitRegistry::new(),
            column_units: ColumnUnits::new(),
            separator: config.separator,
            keep_structure: config.keep_structure,
            last_error: None,
            size_callback: None,
            event_callback: None,
        }
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// Direct grid access. Writes made here bypass undo and events.
    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    pub fn into_grid(self) -> G {
        self.grid
    }

    pub fn apply_settings(&mut self, config: &MatrixConfig) {
        self.separator = config.separator;
        self.keep_structure = config.keep_structure;
        self.undo_enabled = config.undo_enabled;
        if !config.undo_enabled {
            self.undo.clear();
        }
        self.undo.set_max_entries(config.undo_max_entries);
        self.find_options = config.find;
        self.units.set_options(config.units);
        self.busy.set_progress_threshold(config.progress_threshold);
        debug!("matrix: settings applied (separator {:?}, undo {})", self.separator, self.undo_enabled);
    }

    pub fn set_busy_callback(&mut self, callback: Option<BusyCallback>) {
        self.busy.set_callback(callback);
    }

    pub fn set_busy_host(&mut self, host: Option<Box<dyn BusyHost>>) {
        self.busy.set_host(host);
    }

    pub fn set_size_callback(&mut self, callback: Option<PasteSizeCallback>) {
        self.size_callback = callback;
    }

    pub fn set_event_callback(&mut self, callback: Option<EventCallback>) {
        self.event_callback = callback;
    }

    pub fn last_error(&self) -> Option<&GridError> {
        self.last_error.as_ref()
    }

    pub fn take_last_error(&mut self) -> Option<GridError> {
        self.last_error.take()
    }

    fn fail(&mut self, err: GridError) {
        warn!("matrix: {}", err);
        self.last_error = Some(err);
    }

    fn emit(&mut self, event: GridEvent) {
        if let Some(cb) = &mut self.event_callback {
            cb(&event);
        }
    }

    fn emit_undo_state(&mut self) {
        let state = UndoStackEvent { can_undo: self.undo.can_undo(), can_redo: self.undo.can_redo() };
        self.emit(GridEvent::UndoStackChanged(state));
    }

    fn emit_cells(&mut self, op: &str, range: CellRange, count: u64) {
        if count > 0 {
            self.emit(GridEvent::CellsChanged(CellsChangedEvent { op: op.to_string(), range, count }));
        }
    }

    /// Write one cell, recording its previous value when undo is on.
    fn write_cell(&mut self, row: u32, col: u32, value: &str) {
        if self.undo_enabled {
            let previous = self.grid.get_cell(row, col, false);
            self.undo.push_cell(row, col, previous.as_deref());
        }
        self.grid.set_cell(row, col, value);
    }

    fn display_grid(&mut self) -> DisplayGrid<'_, G> {
        DisplayGrid { grid: &mut self.grid, units: &self.units, column_units: &self.column_units }
    }

    fn check_cell(&self, row: u32, col: u32) -> Result<(), GridError> {
        if row > self.grid.row_count() || col > self.grid.col_count() {
            return Err(GridError::InvalidInterval(format!("{row}:{col}")));
        }
        Ok(())
    }

    // Cells

    pub fn cell(&self, row: u32, col: u32) -> Option<String> {
        self.grid.get_cell(row, col, false)
    }

    /// Value as shown, converted to the column's display unit if bound.
    pub fn display_cell(&self, row: u32, col: u32) -> Option<String> {
        if row > 0 && self.column_units.get(col).is_some() {
            let stored = self.grid.get_cell(row, col, false)?;
            return Some(self.column_units.display_value(&self.units, col, &stored));
        }
        self.grid.get_cell(row, col, true)
    }

    /// Store `value` as is. Title cells (row or column 0) are allowed.
    pub fn set_cell(&mut self, row: u32, col: u32, value: &str) -> bool {
        if let Err(err) = self.check_cell(row, col) {
            self.fail(err);
            return false;
        }
        self.write_cell(row, col, value);
        self.emit_cells(crate::undo::SETCELL, CellRange::single(row, col), 1);
        self.emit_undo_state();
        true
    }

    /// Store a value typed in the column's display unit.
    pub fn enter_value(&mut self, row: u32, col: u32, typed: &str) -> bool {
        let stored = if row > 0 {
            self.column_units.storage_value(&self.units, col, typed)
        } else {
            typed.to_string()
        };
        self.set_cell(row, col, &stored)
    }

    // Selection and focus

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// Decode and install a MARKED string for the current grid size.
    pub fn set_marked(&mut self, marked: &str) -> bool {
        match Selection::decode(marked, self.grid.row_count(), self.grid.col_count()) {
            Ok(selection) => {
                self.selection = Some(selection);
                true
            }
            Err(err) => {
                self.fail(err.into());
                false
            }
        }
    }

    pub fn marked(&self) -> Option<String> {
        self.selection.as_ref().map(Selection::encode)
    }

    pub fn focus(&self) -> (u32, u32) {
        self.focus
    }

    pub fn set_focus(&mut self, row: u32, col: u32) {
        self.focus = (row, col);
    }

    // Copy and paste

    pub fn copy(&mut self, source: &CopySource, separator: char, keep_structure: bool) -> Option<String> {
        let shown = serialize(&self.display_grid(), source, separator, keep_structure);
        match shown {
            Ok(text) => Some(text),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    /// Copy the current selection with the configured separator.
    pub fn copy_marked(&mut self) -> Option<String> {
        let Some(selection) = self.selection.clone() else {
            self.fail(GridError::NoSelection);
            return None;
        };
        self.copy(&CopySource::Marked(selection), self.separator, self.keep_structure)
    }

    pub fn copy_to_clipboard(&mut self, host: &mut dyn ClipboardHost, source: &CopySource) -> bool {
        match self.copy(source, self.separator, self.keep_structure) {
            Some(text) => {
                host.set_text(&text);
                true
            }
            None => false,
        }
    }

    pub fn paste_from_clipboard(&mut self, host: &mut dyn ClipboardHost, options: &PasteOptions) -> bool {
        match host.get_text() {
            Some(text) => self.paste(&text, options),
            None => {
                self.fail(GridError::InvalidData("clipboard is empty".into()));
                false
            }
        }
    }

    /// Paste delimited text. Returns false when the paste failed, was
    /// refused by the size callback or was cancelled part way.
    pub fn paste(&mut self, text: &str, options: &PasteOptions) -> bool {
        match self.try_paste(text, options) {
            Ok(done) => done,
            Err(err) => {
                self.fail(err);
                false
            }
        }
    }

    fn try_paste(&mut self, text: &str, options: &PasteOptions) -> Result<bool, GridError> {
        let (rows, cols, separator) = match options.dimensions {
            Some((rows, cols)) => {
                let separator = match options.separator {
                    Some(sep) => sep,
                    None => infer_dimensions(text, None).map(|(_, _, sep)| sep).unwrap_or('\t'),
                };
                (rows, cols, separator)
            }
            None => infer_dimensions(text, options.separator)?,
        };
        let data: Vec<Vec<String>> = split_lines(text)
            .iter()
            .take(rows as usize)
            .map(|line| split_fields(line, separator))
            .collect();
        debug!("paste: {}x{} cells, separator {:?}", rows, cols, separator);
        self.write_block("PASTE", options.anchor, rows, cols, &data)
    }

    /// Write rows of values as one undoable operation, e.g. a file import.
    /// The block is placed like a paste: at `anchor`, the first marked cell
    /// or `(1, 1)`, skipping hidden lines and consulting the size callback.
    pub fn import_rows(&mut self, anchor: Option<(u32, u32)>, data: &[Vec<String>]) -> bool {
        let rows = data.len() as u32;
        let cols = data.iter().map(Vec::len).max().unwrap_or(0) as u32;
        match self.write_block("IMPORT", anchor, rows, cols, data) {
            Ok(done) => done,
            Err(err) => {
                self.fail(err);
                false
            }
        }
    }

    /// Shared write loop of paste and import. Missing fields are written as
    /// empty cells. Values are taken in each column's display unit.
    fn write_block(
        &mut self,
        op: &str,
        anchor: Option<(u32, u32)>,
        rows: u32,
        cols: u32,
        data: &[Vec<String>],
    ) -> Result<bool, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidData(format!("cannot write {rows}x{cols} cells")));
        }

        let grid_rows = self.grid.row_count();
        let grid_cols = self.grid.col_count();
        let (anchor_row, anchor_col) = anchor
            .or_else(|| self.selection.as_ref().and_then(|s| s.start_cell(grid_rows, grid_cols)))
            .unwrap_or((1, 1));
        if anchor_row == 0 || anchor_col == 0 {
            return Err(GridError::InvalidInterval(format!("{anchor_row}:{anchor_col}")));
        }
        debug!("{}: {}x{} cells at {}:{}", op, rows, cols, anchor_row, anchor_col);

        let grid = &self.grid;
        let (mut target_rows, need_rows) = visible_run(anchor_row, rows, grid_rows, |r| grid.is_row_visible(r));
        let (mut target_cols, need_cols) = visible_run(anchor_col, cols, grid_cols, |c| grid.is_col_visible(c));

        if need_rows > grid_rows || need_cols > grid_cols {
            let decision = match &mut self.size_callback {
                Some(cb) => cb(need_rows, need_cols),
                None => PasteSizeDecision::Default,
            };
            match decision {
                PasteSizeDecision::Ignore => {
                    warn!("{}: {}x{} needed, refused", op, need_rows, need_cols);
                    return Ok(false);
                }
                PasteSizeDecision::Continue => {
                    if self.grid.resize(need_rows.max(grid_rows), need_cols.max(grid_cols)) {
                        let grid = &self.grid;
                        let (r, c) = (grid.row_count(), grid.col_count());
                        target_rows = visible_run(anchor_row, rows, r, |i| grid.is_row_visible(i)).0;
                        target_cols = visible_run(anchor_col, cols, c, |i| grid.is_col_visible(i)).0;
                    } else {
                        warn!("{}: grid cannot grow to {}x{}, clipping", op, need_rows, need_cols);
                    }
                }
                PasteSizeDecision::Default => {
                    debug!("{}: clipping to {}x{}", op, grid_rows, grid_cols);
                }
            }
        }

        let (Some(&first_row), Some(&first_col)) = (target_rows.first(), target_cols.first()) else {
            warn!("{}: no visible target cells", op);
            return Ok(false);
        };

        let expected = target_rows.len() as u64 * target_cols.len() as u64;
        let undo = self.undo_enabled.then_some(&mut self.undo);
        self.busy.start(expected, op, undo);

        let mut written = 0u64;
        let mut last = (first_row, first_col);
        'lines: for (fields, &row) in data.iter().zip(&target_rows) {
            for (j, &col) in target_cols.iter().enumerate() {
                let typed = fields.get(j).map(String::as_str).unwrap_or("");
                let value = self.column_units.storage_value(&self.units, col, typed);
                self.write_cell(row, col, &value);
                written += 1;
                last = (row, last.1.max(col));
                if !self.busy.tick() {
                    break 'lines;
                }
            }
        }

        let cancelled = self.busy.is_cancelled();
        self.busy.end(&mut self.undo);
        self.emit_cells(op, CellRange::new(first_row, first_col, last.0, last.1), written);
        self.emit_undo_state();
        self.emit(GridEvent::Redraw);
        Ok(!cancelled)
    }

    /// Copy the cell at `(row, col)` into other rows of the same column.
    pub fn copy_column_to(&mut self, row: u32, col: u32, target: &CopyTarget) -> bool {
        match self.try_copy_column_to(row, col, target) {
            Ok(done) => done,
            Err(err) => {
                self.fail(err);
                false
            }
        }
    }

    fn try_copy_column_to(&mut self, row: u32, col: u32, target: &CopyTarget) -> Result<bool, GridError> {
        let rows = self.grid.row_count();
        if row == 0 || col == 0 || row > rows || col > self.grid.col_count() {
            return Err(GridError::InvalidInterval(format!("{row}:{col}")));
        }
        let value = self.grid.get_cell(row, col, false).unwrap_or_default();

        let candidates: Vec<u32> = match target {
            CopyTarget::All => (1..=rows).collect(),
            CopyTarget::Marked(selection) => (1..=rows).filter(|&r| selection.is_selected(r, col)).collect(),
            CopyTarget::Interval(interval) => interval.rows(rows),
        };
        let targets: Vec<u32> = candidates
            .into_iter()
            .filter(|&r| r != row && self.grid.is_row_visible(r))
            .collect();
        let (Some(&first), Some(&last)) = (targets.first(), targets.last()) else {
            return Err(GridError::NoSelection);
        };

        let undo = self.undo_enabled.then_some(&mut self.undo);
        self.busy.start(targets.len() as u64, "COPYCOLTO", undo);
        let mut written = 0u64;
        for &r in &targets {
            self.write_cell(r, col, &value);
            written += 1;
            if !self.busy.tick() {
                break;
            }
        }
        let cancelled = self.busy.is_cancelled();
        self.busy.end(&mut self.undo);

        self.emit_cells("COPYCOLTO", CellRange::new(first, col, last, col), written);
        self.emit_undo_state();
        self.emit(GridEvent::Redraw);
        Ok(!cancelled)
    }

    // Undo

    pub fn undo_engine(&self) -> &UndoEngine {
        &self.undo
    }

    /// Undo up to `count` transactions. Returns how many were undone.
    pub fn undo(&mut self, count: usize) -> usize {
        if !self.undo.can_undo() {
            return 0;
        }
        let expected = self.undo.undo_cell_count(count);
        self.busy.start(expected, "UNDO", None);
        let busy = &mut self.busy;
        let done = self.undo.undo(&mut self.grid, count, || busy.tick());
        self.busy.end(&mut self.undo);

        debug!("undo: {} of {} entries", done, count);
        self.emit_undo_state();
        self.emit(GridEvent::Redraw);
        done
    }

    /// Redo up to `count` transactions. Returns how many were redone.
    pub fn redo(&mut self, count: usize) -> usize {
        if !self.undo.can_redo() {
            return 0;
        }
        let expected = self.undo.redo_cell_count(count);
        self.busy.start(expected, "REDO", None);
        let busy = &mut self.busy;
        let done = self.undo.redo(&mut self.grid, count, || busy.tick());
        self.busy.end(&mut self.undo);

        debug!("redo: {} of {} entries", done, count);
        self.emit_undo_state();
        self.emit(GridEvent::Redraw);
        done
    }

    pub fn undo_clear(&mut self) {
        self.undo.clear();
        self.emit_undo_state();
    }

    // Find

    pub fn find_options(&self) -> &FindOptions {
        &self.find_options
    }

    /// Search from the focus cell and move the focus to the hit.
    pub fn find(&mut self, text: &str, options: &FindOptions) -> Option<(u32, u32)> {
        let check_current = self.find_state.check_current(self.focus);
        let focus = self.focus;
        let found = find::find(&self.display_grid(), text, focus, options, check_current);
        self.find_state.record(found);
        if let Some(cell) = found {
            self.focus = cell;
        }
        found
    }

    /// [`Matrix::find`] with the configured options.
    pub fn find_next(&mut self, text: &str) -> Option<(u32, u32)> {
        let options = self.find_options;
        self.find(text, &options)
    }

    // Units

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut UnitRegistry {
        &mut self.units
    }

    pub fn column_unit(&self, col: u32) -> Option<&ColumnUnit> {
        self.column_units.get(col)
    }

    pub fn bind_column_unit(&mut self, col: u32, binding: ColumnUnit) -> bool {
        let known = |id: UnitId| self.units.unit(binding.quantity, id).is_some();
        if !known(binding.unit) || !known(binding.display_unit) {
            self.fail(GridError::InvalidData(format!("unknown unit for column {col}")));
            return false;
        }
        self.column_units.bind(col, binding);
        self.emit(GridEvent::Redraw);
        true
    }

    pub fn unbind_column_unit(&mut self, col: u32) {
        if self.column_units.unbind(col).is_some() {
            self.emit(GridEvent::Redraw);
        }
    }

    /// Change the unit a column is shown in. Stored values are untouched.
    pub fn set_display_unit(&mut self, col: u32, unit: UnitId) -> bool {
        let Some(binding) = self.column_units.get(col).copied() else {
            self.fail(GridError::InvalidData(format!("column {col} has no unit")));
            return false;
        };
        self.bind_column_unit(col, ColumnUnit { display_unit: unit, ..binding })
    }

    /// Rewrite the stored values of `col` in `unit` and make it the
    /// column's storage unit.
    pub fn convert_column_unit(&mut self, col: u32, unit: UnitId) -> bool {
        match self.try_convert_column_unit(col, unit) {
            Ok(done) => done,
            Err(err) => {
                self.fail(err);
                false
            }
        }
    }

    fn try_convert_column_unit(&mut self, col: u32, unit: UnitId) -> Result<bool, GridError> {
        let binding = *self
            .column_units
            .get(col)
            .ok_or_else(|| GridError::InvalidData(format!("column {col} has no unit")))?;
        if self.units.unit(binding.quantity, unit).is_none() {
            return Err(GridError::InvalidData(format!("unknown unit for column {col}")));
        }
        if unit == binding.unit {
            return Ok(true);
        }

        let mut changes = Vec::new();
        for row in 1..=self.grid.row_count() {
            let Some(stored) = self.grid.get_cell(row, col, false) else {
                continue;
            };
            let Ok(value) = stored.trim().parse::<f64>() else {
                continue;
            };
            let converted = self
                .units
                .convert(binding.quantity, value, binding.unit, unit)
                .map_err(|e| GridError::InvalidData(e.to_string()))?;
            changes.push((row, stored, crate::column_units::format_number(converted, None)));
        }

        let undo = self.undo_enabled.then_some(&mut self.undo);
        self.busy.start(changes.len() as u64, "CONVERT", undo);
        let mut written = 0;
        for (row, _, converted) in &changes {
            self.write_cell(*row, col, converted);
            written += 1;
            if !self.busy.tick() {
                break;
            }
        }
        let cancelled = self.busy.is_cancelled();
        if cancelled {
            // a half-converted column would not match any unit
            for (row, stored, _) in &changes[..written] {
                self.grid.set_cell(*row, col, stored);
            }
            if self.undo_enabled {
                self.undo.discard();
            }
        }
        self.busy.end(&mut self.undo);

        if !cancelled {
            if let Some(b) = self.column_units.get_mut(col) {
                b.unit = unit;
            }
            let rows = self.grid.row_count().max(1);
            self.emit_cells("CONVERT", CellRange::new(1, col, rows, col), written as u64);
        }
        self.emit_undo_state();
        self.emit(GridEvent::Redraw);
        Ok(!cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::busy::{BusyAction, BusyPhase};
    use crate::events::EventCollector;
    use crate::sheet::Sheet;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn matrix(rows: u32, cols: u32) -> Matrix<Sheet> {
        Matrix::new(Sheet::new(rows, cols))
    }

    fn cancel_at(step: u64) -> Option<BusyCallback> {
        Some(Box::new(move |phase: BusyPhase, count: u64, _label: &str| {
            if phase == BusyPhase::Step && count == step {
                BusyAction::Ignore
            } else {
                BusyAction::Default
            }
        }))
    }

    struct TextClipboard(Option<String>);

    impl ClipboardHost for TextClipboard {
        fn get_text(&mut self) -> Option<String> {
            self.0.clone()
        }

        fn set_text(&mut self, text: &str) {
            self.0 = Some(text.to_string());
        }
    }

    #[test]
    fn paste_then_copy_back() {
        let mut m = matrix(3, 3);
        assert!(m.paste("A\tB\nC\tD\n", &PasteOptions::default()));
        assert_eq!(m.grid().to_rows()[0], vec!["A", "B", ""]);
        let range = CellRange::parse("1:1-2:2", 3, 3).unwrap();
        assert_eq!(m.copy(&CopySource::Range(range), '\t', false).as_deref(), Some("A\tB\nC\tD\n"));
        assert_eq!(m.undo_engine().names(), vec!["PASTE"]);
    }

    #[test]
    fn paste_at_selection_start_skips_hidden_rows() {
        let mut m = matrix(4, 2);
        m.grid_mut().set_row_hidden(2, true);
        m.set_selection(Some(Selection::from_cells(4, 2, [(1, 2), (3, 2)])));
        assert!(m.paste("x\ny\n", &PasteOptions::default()));
        assert_eq!(m.cell(1, 2).as_deref(), Some("x"));
        assert_eq!(m.cell(2, 2), None);
        assert_eq!(m.cell(3, 2).as_deref(), Some("y"));
    }

    #[test]
    fn oversized_paste_decisions() {
        let text = "1;2;3\n4;5;6\n7;8;9\n";

        let mut m = matrix(2, 2);
        m.set_size_callback(Some(Box::new(|_, _| PasteSizeDecision::Ignore)));
        assert!(!m.paste(text, &PasteOptions::default()));
        assert!(m.grid().is_empty());
        assert!(m.last_error().is_none());

        let mut m = matrix(2, 2);
        assert!(m.paste(text, &PasteOptions::default()));
        assert_eq!(m.grid().to_rows(), vec![vec!["1", "2"], vec!["4", "5"]]);

        let mut m = matrix(2, 2);
        let asked = Rc::new(RefCell::new(None));
        let seen = asked.clone();
        m.set_size_callback(Some(Box::new(move |r, c| {
            *seen.borrow_mut() = Some((r, c));
            PasteSizeDecision::Continue
        })));
        assert!(m.paste(text, &PasteOptions::default()));
        assert_eq!(*asked.borrow(), Some((3, 3)));
        assert_eq!(m.grid().rows(), 3);
        assert_eq!(m.cell(3, 3).as_deref(), Some("9"));

        let mut m = matrix(2, 2);
        m.grid_mut().set_max_size(Some((2, 2)));
        m.set_size_callback(Some(Box::new(|_, _| PasteSizeDecision::Continue)));
        assert!(m.paste(text, &PasteOptions::default()));
        assert_eq!(m.grid().len(), 4);
    }

    #[test]
    fn cancelled_paste_keeps_written_cells() {
        let mut m = matrix(2, 2);
        m.set_busy_callback(cancel_at(3));
        assert!(!m.paste("a\tb\nc\td\n", &PasteOptions::default()));
        assert_eq!(m.grid().to_rows(), vec![vec!["a", "b"], vec!["c", ""]]);
        assert_eq!(m.undo_engine().entry(0).map(|e| e.cell_count()), Some(3));
    }

    #[test]
    fn paste_rejects_ragged_text() {
        let mut m = matrix(3, 3);
        assert!(!m.paste("a\tb\tc\nd\te\n", &PasteOptions::default()));
        assert!(matches!(m.take_last_error(), Some(GridError::InvalidData(_))));
        assert!(m.last_error().is_none());
    }

    #[test]
    fn explicit_dimensions_pad_missing_fields() {
        let mut m = matrix(2, 3);
        let options = PasteOptions { dimensions: Some((1, 3)), separator: Some(','), ..Default::default() };
        m.set_cell(1, 3, "old");
        assert!(m.paste("a,b", &options));
        assert_eq!(m.grid().to_rows()[0], vec!["a", "b", ""]);
    }

    #[test]
    fn import_rows_grows_and_records() {
        let mut m = matrix(1, 1);
        m.set_size_callback(Some(Box::new(|_, _| PasteSizeDecision::Continue)));
        let data = vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]];
        assert!(m.import_rows(None, &data));
        assert_eq!(m.grid().to_rows(), vec![vec!["a", "b"], vec!["c", ""]]);
        assert_eq!(m.undo_engine().names(), vec!["IMPORT"]);
        assert!(!m.import_rows(None, &[]));
        assert!(matches!(m.take_last_error(), Some(GridError::InvalidData(_))));
    }

    #[test]
    fn copy_column_targets() {
        let mut m = Matrix::new(Sheet::from_rows(&[vec!["v"], vec![""], vec![""], vec![""], vec![""]]));
        assert!(m.copy_column_to(1, 1, &CopyTarget::Interval(RowInterval::parse("2-3,5").unwrap())));
        assert_eq!(m.grid().to_rows().concat(), vec!["v", "v", "v", "", "v"]);

        m.undo(1);
        let marked = Selection::decode("L00010", 5, 1).unwrap();
        assert!(m.copy_column_to(1, 1, &CopyTarget::Marked(marked)));
        assert_eq!(m.grid().to_rows().concat(), vec!["v", "", "", "v", ""]);

        m.grid_mut().set_row_hidden(2, true);
        assert!(m.copy_column_to(1, 1, &CopyTarget::All));
        assert_eq!(m.cell(2, 1), None);
        assert_eq!(m.cell(5, 1).as_deref(), Some("v"));
    }

    #[test]
    fn copy_column_errors() {
        let mut m = matrix(2, 2);
        assert!(!m.copy_column_to(3, 1, &CopyTarget::All));
        assert!(matches!(m.take_last_error(), Some(GridError::InvalidInterval(_))));
        let only_source = Selection::decode("L10", 2, 2).unwrap();
        assert!(!m.copy_column_to(1, 1, &CopyTarget::Marked(only_source)));
        assert_eq!(m.take_last_error(), Some(GridError::NoSelection));
    }

    #[test]
    fn undo_redo_through_controller() {
        let mut m = matrix(2, 2);
        m.set_cell(1, 1, "a");
        m.paste("x\ty\n", &PasteOptions::default());
        assert_eq!(m.undo(1), 1);
        assert_eq!(m.cell(1, 1).as_deref(), Some("a"));
        assert_eq!(m.cell(1, 2), None);
        assert_eq!(m.redo(5), 1);
        assert_eq!(m.cell(1, 1).as_deref(), Some("x"));
        assert_eq!(m.undo(10), 2);
        assert!(m.grid().is_empty());
        assert_eq!(m.undo(1), 0);
        m.undo_clear();
        assert_eq!(m.redo(1), 0);
    }

    #[test]
    fn cancelled_undo_keeps_entry_whole() {
        let mut m = matrix(2, 2);
        m.paste("a\tb\nc\td\n", &PasteOptions::default());
        m.set_busy_callback(cancel_at(2));
        assert_eq!(m.undo(1), 0);
        assert_eq!(m.grid().to_rows(), vec![vec!["a", "b"], vec!["c", "d"]]);
        assert!(m.undo_engine().can_undo());
    }

    #[test]
    fn disabled_undo_records_nothing() {
        let mut m = matrix(2, 2);
        m.apply_settings(&MatrixConfig { undo_enabled: false, ..Default::default() });
        m.set_cell(1, 1, "a");
        m.paste("b\n", &PasteOptions { anchor: Some((2, 2)), ..Default::default() });
        assert!(m.undo_engine().is_empty());
        assert_eq!(m.undo(1), 0);
    }

    #[test]
    fn find_walks_matches() {
        let mut m = Matrix::new(Sheet::from_rows(&[vec!["cat", "dog"], vec!["dog", "cat"]]));
        let opts = FindOptions::default();
        assert_eq!(m.find("cat", &opts), Some((1, 1)));
        assert_eq!(m.find("cat", &opts), Some((2, 2)));
        assert_eq!(m.find("cat", &opts), Some((1, 1)));
        m.set_focus(1, 2);
        assert_eq!(m.find("dog", &opts), Some((1, 2)));
        assert_eq!(m.focus(), (1, 2));
        assert_eq!(m.find("bird", &opts), None);
        assert_eq!(m.focus(), (1, 2));
    }

    #[test]
    fn column_units_display_and_convert() {
        let mut m = Matrix::new(Sheet::from_rows(&[vec!["1000"], vec!["2500"], vec!["n/a"]]));
        let (q, metre, km) = m.units().find_pair("m", "km").unwrap();
        assert!(m.bind_column_unit(1, ColumnUnit { quantity: q, unit: metre, display_unit: km, decimals: None }));
        assert_eq!(m.display_cell(2, 1).as_deref(), Some("2.5"));

        assert!(m.enter_value(3, 1, "4"));
        assert_eq!(m.cell(3, 1).as_deref(), Some("4000"));

        assert!(m.convert_column_unit(1, km));
        assert_eq!(m.grid().to_rows().concat(), vec!["1", "2.5", "4"]);
        assert_eq!(m.column_unit(1).map(|b| b.unit), Some(km));
        assert_eq!(m.display_cell(1, 1).as_deref(), Some("1"));
        assert_eq!(m.undo_engine().names().last().copied(), Some("CONVERT"));

        assert!(!m.convert_column_unit(2, km));
        assert!(matches!(m.take_last_error(), Some(GridError::InvalidData(_))));
        assert!(!m.convert_column_unit(1, UnitId(99)));
    }

    #[test]
    fn copy_find_and_paste_use_display_units() {
        let mut m = Matrix::new(Sheet::from_rows(&[vec!["1000", "a"], vec!["2500", "b"]]));
        let (q, metre, km) = m.units().find_pair("m", "km").unwrap();
        m.bind_column_unit(1, ColumnUnit { quantity: q, unit: metre, display_unit: km, decimals: None });

        let all = CopySource::Range(CellRange::all(2, 2));
        assert_eq!(m.copy(&all, '\t', false).as_deref(), Some("1\ta\n2.5\tb\n"));

        let whole = FindOptions { match_whole_cell: true, ..Default::default() };
        m.set_focus(0, 0);
        assert_eq!(m.find("2.5", &whole), Some((2, 1)));
        m.set_focus(0, 0);
        assert_eq!(m.find("2500", &whole), None);

        assert!(m.paste("3\tc\n", &PasteOptions { anchor: Some((1, 1)), ..Default::default() }));
        assert_eq!(m.cell(1, 1).as_deref(), Some("3000"));
        assert_eq!(m.cell(1, 2).as_deref(), Some("c"));
        assert_eq!(m.copy(&all, '\t', false).as_deref(), Some("3\tc\n2.5\tb\n"));

        assert_eq!(m.undo(1), 1);
        assert_eq!(m.cell(1, 1).as_deref(), Some("1000"));
    }

    #[test]
    fn paste_past_hidden_columns() {
        let mut m = matrix(2, 4);
        m.grid_mut().set_col_hidden(2, true);
        m.grid_mut().set_col_hidden(3, true);
        assert!(m.paste("x\ty\n", &PasteOptions { anchor: Some((1, 1)), ..Default::default() }));
        assert_eq!(m.cell(1, 1).as_deref(), Some("x"));
        assert_eq!(m.cell(1, 2), None);
        assert_eq!(m.cell(1, 3), None);
        assert_eq!(m.cell(1, 4).as_deref(), Some("y"));
    }

    #[test]
    fn inch_mark_paste_keeps_cells_apart() {
        let mut m = matrix(2, 2);
        assert!(m.paste("5\" pipe\tx\na\tb\n", &PasteOptions::default()));
        assert_eq!(m.grid().to_rows(), vec![vec!["5\" pipe", "x"], vec!["a", "b"]]);

        let mut n = matrix(2, 2);
        let text = m.copy(&CopySource::Range(CellRange::all(2, 2)), '\t', false).unwrap();
        let sized = PasteOptions { dimensions: Some((2, 2)), ..Default::default() };
        assert!(n.paste(&text, &sized));
        assert_eq!(n.grid().to_rows(), m.grid().to_rows());
    }

    #[test]
    fn cancelled_conversion_restores_column() {
        let mut m = Matrix::new(Sheet::from_rows(&[vec!["1"], vec!["2"], vec!["3"]]));
        let (q, km, metre) = m.units().find_pair("km", "m").unwrap();
        m.bind_column_unit(1, ColumnUnit::new(q, km));
        m.set_busy_callback(cancel_at(2));
        assert!(!m.convert_column_unit(1, metre));
        assert_eq!(m.grid().to_rows().concat(), vec!["1", "2", "3"]);
        assert_eq!(m.column_unit(1).map(|b| b.unit), Some(km));
        assert!(m.undo_engine().is_empty());
    }

    #[test]
    fn clipboard_host_round_trip() {
        let mut m = Matrix::new(Sheet::from_rows(&[vec!["a", "b"], vec!["c", "d"]]));
        let mut clip = TextClipboard(None);
        m.apply_settings(&MatrixConfig { separator: ';', ..Default::default() });
        assert!(m.copy_to_clipboard(&mut clip, &CopySource::Range(CellRange::new(1, 1, 1, 2))));
        assert_eq!(clip.0.as_deref(), Some("a;b\n"));

        assert!(m.paste_from_clipboard(&mut clip, &PasteOptions { anchor: Some((2, 1)), ..Default::default() }));
        assert_eq!(m.grid().to_rows(), vec![vec!["a", "b"], vec!["a", "b"]]);

        let mut empty = TextClipboard(None);
        assert!(!m.paste_from_clipboard(&mut empty, &PasteOptions::default()));
    }

    #[test]
    fn marked_strings() {
        let mut m = matrix(2, 2);
        assert!(m.set_marked("1001"));
        assert_eq!(m.marked().as_deref(), Some("1001"));
        assert!(!m.set_marked("10"));
        assert!(matches!(m.take_last_error(), Some(GridError::Decode(_))));
        assert!(m.copy_marked().is_none());
        assert_eq!(m.take_last_error(), Some(GridError::InvalidSelection));
    }

    #[test]
    fn events_are_delivered() {
        let collector = Rc::new(RefCell::new(EventCollector::new()));
        let sink = collector.clone();
        let mut m = matrix(2, 2);
        m.set_event_callback(Some(Box::new(move |e: &GridEvent| sink.borrow_mut().push(e.clone()))));

        m.set_cell(1, 1, "a");
        m.paste("x\ty\n", &PasteOptions { anchor: Some((2, 1)), ..Default::default() });
        m.undo(1);

        let events = collector.borrow();
        let changed = events.cells_changed();
        assert_eq!(changed.len(), 2);
        assert_eq!(changed[1].op, "PASTE");
        assert_eq!(changed[1].range, CellRange::new(2, 1, 2, 2));
        assert_eq!(changed[1].count, 2);
        assert_eq!(events.redraws(), 2);
        assert_eq!(
            events.undo_changes().last().copied(),
            Some(UndoStackEvent { can_undo: true, can_redo: true })
        );
    }

    #[test]
    fn visible_run_counts_missing_lines() {
        let all = |_| true;
        assert_eq!(visible_run(1, 2, 3, all), (vec![1, 2], 2));
        assert_eq!(visible_run(2, 3, 3, all), (vec![2, 3], 4));
        assert_eq!(visible_run(5, 2, 3, all), (vec![], 6));
        assert_eq!(visible_run(1, 2, 3, |i| i != 1), (vec![2, 3], 3));
    }
}
