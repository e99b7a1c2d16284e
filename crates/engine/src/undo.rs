//! Cell-level undo/redo with named transactions.
//!
//! Entries `[0, position)` are applied, entries `[position, len)` are
//! available to redo. Each entry remembers the value a cell held before the
//! transaction first touched it. Undo and redo both *swap* the recorded value
//! with the grid's current one, so an entry always holds exactly the data
//! needed to travel back in the other direction.

use log::debug;
use rustc_hash::FxHashMap;

use gridex_core::GridAccessor;

/// Name used for transactions opened implicitly by a lone `push_cell`.
pub const SETCELL: &str = "SETCELL";

#[derive(Debug, Clone)]
struct CellRecord {
    row: u32,
    col: u32,
    value: Option<String>,
}

/// One named transaction.
#[derive(Debug, Clone)]
pub struct UndoEntry {
    name: String,
    cells: Vec<CellRecord>,
    index: FxHashMap<(u32, u32), usize>,
}

impl UndoEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Recorded value for a cell, `Some(None)` when the cell was empty.
    pub fn recorded(&self, row: u32, col: u32) -> Option<Option<&str>> {
        self.index
            .get(&(row, col))
            .map(|&i| self.cells[i].value.as_deref())
    }

    fn record(&mut self, row: u32, col: u32, previous: Option<&str>) {
        if self.index.contains_key(&(row, col)) {
            return;
        }
        self.index.insert((row, col), self.cells.len());
        self.cells.push(CellRecord {
            row,
            col,
            value: previous.map(str::to_string),
        });
    }
}

fn swap_cell<G: GridAccessor + ?Sized>(grid: &mut G, record: &mut CellRecord) {
    let current = grid.get_cell(record.row, record.col, false);
    grid.set_cell(record.row, record.col, record.value.as_deref().unwrap_or(""));
    record.value = current;
}

/// Swap every cell of `entry`, ticking before each one. On cancellation the
/// cells already swapped are swapped back so the entry stays whole.
fn swap_entry<G, F>(entry: &mut UndoEntry, grid: &mut G, reverse: bool, tick: &mut F) -> bool
where
    G: GridAccessor + ?Sized,
    F: FnMut() -> bool,
{
    let n = entry.cells.len();
    let order: Vec<usize> = if reverse { (0..n).rev().collect() } else { (0..n).collect() };

    for (done, &i) in order.iter().enumerate() {
        if !tick() {
            for &j in order[..done].iter().rev() {
                swap_cell(grid, &mut entry.cells[j]);
            }
            return false;
        }
        swap_cell(grid, &mut entry.cells[i]);
    }
    true
}

#[derive(Debug, Default)]
pub struct UndoEngine {
    entries: Vec<UndoEntry>,
    position: usize,
    current: Option<UndoEntry>,
    suspended: bool,
    max_entries: Option<usize>,
}

impl UndoEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max` applied entries; the oldest are dropped first.
    pub fn set_max_entries(&mut self, max: Option<usize>) {
        self.max_entries = max.filter(|&m| m > 0);
        self.enforce_limit();
    }

    /// Open a transaction. Nested begins collapse into the outer one.
    pub fn push_begin(&mut self, name: &str) {
        if self.suspended {
            return;
        }
        if let Some(current) = &self.current {
            debug!("undo: '{}' folded into open transaction '{}'", name, current.name);
            return;
        }
        self.current = Some(UndoEntry::new(name));
    }

    /// Record the value `(row, col)` held before this transaction changed it.
    /// Only the first call per cell and transaction is kept. Outside a
    /// transaction the change gets its own single-cell entry.
    pub fn push_cell(&mut self, row: u32, col: u32, previous: Option<&str>) {
        if self.suspended {
            return;
        }
        match &mut self.current {
            Some(entry) => entry.record(row, col, previous),
            None => {
                self.push_begin(SETCELL);
                if let Some(entry) = &mut self.current {
                    entry.record(row, col, previous);
                }
                self.push_end();
            }
        }
    }

    /// Close the open transaction. Empty transactions leave no entry.
    pub fn push_end(&mut self) {
        let Some(entry) = self.current.take() else {
            return;
        };
        if entry.cells.is_empty() {
            return;
        }
        if self.position < self.entries.len() {
            debug!("undo: dropping {} redo entries", self.entries.len() - self.position);
            self.entries.truncate(self.position);
        }
        self.entries.push(entry);
        self.position = self.entries.len();
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        let Some(max) = self.max_entries else {
            return;
        };
        if self.position > max {
            let excess = self.position - max;
            self.entries.drain(..excess);
            self.position -= excess;
        }
    }

    /// Undo up to `count` entries, newest first. `tick` is polled before each
    /// cell; when it returns false replay stops. Returns the number of entries
    /// fully undone.
    pub fn undo<G, F>(&mut self, grid: &mut G, count: usize, mut tick: F) -> usize
    where
        G: GridAccessor + ?Sized,
        F: FnMut() -> bool,
    {
        let count = count.min(self.position);
        let was_suspended = std::mem::replace(&mut self.suspended, true);
        let mut done = 0;

        while done < count {
            let idx = self.position - 1;
            if !swap_entry(&mut self.entries[idx], grid, true, &mut tick) {
                debug!("undo: cancelled after {} of {} entries", done, count);
                break;
            }
            self.position = idx;
            done += 1;
        }

        self.suspended = was_suspended;
        done
    }

    /// Redo up to `count` entries, oldest first. Same cancellation rules as
    /// [`UndoEngine::undo`].
    pub fn redo<G, F>(&mut self, grid: &mut G, count: usize, mut tick: F) -> usize
    where
        G: GridAccessor + ?Sized,
        F: FnMut() -> bool,
    {
        let count = count.min(self.entries.len() - self.position);
        let was_suspended = std::mem::replace(&mut self.suspended, true);
        let mut done = 0;

        while done < count {
            let idx = self.position;
            if !swap_entry(&mut self.entries[idx], grid, false, &mut tick) {
                debug!("redo: cancelled after {} of {} entries", done, count);
                break;
            }
            self.position = idx + 1;
            done += 1;
        }

        self.suspended = was_suspended;
        done
    }

    /// Number of cells touched by undoing `count` entries.
    pub fn undo_cell_count(&self, count: usize) -> u64 {
        let start = self.position.saturating_sub(count);
        self.entries[start..self.position]
            .iter()
            .map(|e| e.cells.len() as u64)
            .sum()
    }

    /// Number of cells touched by redoing `count` entries.
    pub fn redo_cell_count(&self, count: usize) -> u64 {
        let end = (self.position + count).min(self.entries.len());
        self.entries[self.position..end]
            .iter()
            .map(|e| e.cells.len() as u64)
            .sum()
    }

    /// Drop the open transaction without keeping an entry. The caller has
    /// already put the grid back.
    pub fn discard(&mut self) {
        if let Some(entry) = self.current.take() {
            debug!("undo: discarded '{}' ({} cells)", entry.name, entry.cells.len());
        }
    }

    /// Drop every entry, including an open transaction.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
        self.position = 0;
    }

    /// Stop recording (replay, bulk loads). Calls do not nest.
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position < self.entries.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&UndoEntry> {
        self.entries.get(index)
    }

    /// Entry names in chronological order, for an undo-list view.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}
