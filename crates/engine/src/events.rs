//! Change notifications emitted by [`Matrix`](crate::matrix::Matrix).
//!
//! Hosts use them to repaint and to refresh undo/redo menu state without
//! polling the controller.

use gridex_core::CellRange;

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Cells changed by an edit, paste, copy-to-column, undo or redo.
    CellsChanged(CellsChangedEvent),

    /// The whole grid should be repainted, e.g. after a unit change.
    Redraw,

    /// Undo or redo availability may have changed.
    UndoStackChanged(UndoStackEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellsChangedEvent {
    /// Operation that produced the change ("SETCELL", "PASTE", ...).
    pub op: String,
    /// Bounding box of the touched cells.
    pub range: CellRange,
    /// Number of cells actually written.
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoStackEvent {
    pub can_undo: bool,
    pub can_redo: bool,
}

pub type EventCallback = Box<dyn FnMut(&GridEvent)>;

/// Simple event collector for testing.
#[derive(Default)]
pub struct EventCollector {
    events: Vec<GridEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: GridEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GridEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn cells_changed(&self) -> Vec<&CellsChangedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::CellsChanged(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn undo_changes(&self) -> Vec<UndoStackEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::UndoStackChanged(u) => Some(*u),
                _ => None,
            })
            .collect()
    }

    pub fn redraws(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, GridEvent::Redraw)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_filtering() {
        let mut collector = EventCollector::new();

        collector.push(GridEvent::CellsChanged(CellsChangedEvent {
            op: "PASTE".into(),
            range: CellRange::new(1, 1, 2, 2),
            count: 4,
        }));
        collector.push(GridEvent::UndoStackChanged(UndoStackEvent { can_undo: true, can_redo: false }));
        collector.push(GridEvent::Redraw);

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.cells_changed().len(), 1);
        assert_eq!(collector.cells_changed()[0].count, 4);
        assert_eq!(collector.undo_changes(), vec![UndoStackEvent { can_undo: true, can_redo: false }]);
        assert_eq!(collector.redraws(), 1);
        collector.clear();
        assert!(collector.is_empty());
    }
}
