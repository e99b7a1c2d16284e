//! Busy sessions for long multi-cell operations.
//!
//! A session is opened with [`BusyCoordinator::start`], polled once per
//! processed cell with [`BusyCoordinator::tick`] and closed with
//! [`BusyCoordinator::end`]. Cancellation is cooperative: it is only
//! observed inside `tick`, and everything written before the cancelling tick
//! stays written.

use log::debug;

use crate::undo::UndoEngine;

/// Phase reported to the application busy callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyPhase {
    Begin,
    Step,
    End,
}

/// Application callback verdict.
///
/// `Ignore` on `Begin` suppresses the host progress indicator; on `Step` it
/// cancels the operation. The verdict for `End` is not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyAction {
    #[default]
    Default,
    Ignore,
}

pub type BusyCallback = Box<dyn FnMut(BusyPhase, u64, &str) -> BusyAction>;

/// Host side of a busy session: cursor, progress indicator, event loop.
pub trait BusyHost {
    fn set_busy_cursor(&mut self, _busy: bool) {}

    fn show_progress(&mut self, _label: &str, _total: u64) {}

    /// Advance the indicator by one step. Returns false when the user asked
    /// to cancel.
    fn advance_progress(&mut self) -> bool {
        true
    }

    fn hide_progress(&mut self) {}

    /// Run one iteration of the host event loop.
    fn pump(&mut self) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyState {
    pub active: bool,
    pub count: u64,
    pub cancel_requested: bool,
}

/// Human-readable label for an operation name.
pub fn busy_label(op: &str) -> String {
    match op {
        "PASTE" => "Pasting",
        "COPYCOLTO" => "Copying to column",
        "UNDO" => "Undoing",
        "REDO" => "Redoing",
        "IMPORT" => "Importing",
        "CONVERT" => "Converting units",
        "SETCELL" => "Setting cells",
        other => other,
    }
    .to_string()
}

pub struct BusyCoordinator {
    state: BusyState,
    label: String,
    expected: u64,
    undo_opened: bool,
    progress_shown: bool,
    progress_threshold: u64,
    callback: Option<BusyCallback>,
    host: Option<Box<dyn BusyHost>>,
}

impl Default for BusyCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyCoordinator {
    pub fn new() -> Self {
        Self {
            state: BusyState::default(),
            label: String::new(),
            expected: 0,
            undo_opened: false,
            progress_shown: false,
            progress_threshold: 1,
            callback: None,
            host: None,
        }
    }

    pub fn set_callback(&mut self, callback: Option<BusyCallback>) {
        self.callback = callback;
    }

    pub fn set_host(&mut self, host: Option<Box<dyn BusyHost>>) {
        self.host = host;
    }

    /// Sessions expecting fewer cells than this show no progress indicator.
    pub fn set_progress_threshold(&mut self, threshold: u64) {
        self.progress_threshold = threshold;
    }

    pub fn state(&self) -> BusyState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancel_requested
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn expected(&self) -> u64 {
        self.expected
    }

    /// Open a session expecting `expected` ticks.
    ///
    /// When `undo` is given, a transaction named `op` is opened on it (and
    /// folds into any transaction already open).
    ///
    /// # Panics
    ///
    /// Panics if a session is already active; busy sessions never nest.
    pub fn start(&mut self, expected: u64, op: &str, undo: Option<&mut UndoEngine>) {
        assert!(!self.state.active, "busy session '{}' already active", self.label);

        self.state = BusyState { active: true, count: 0, cancel_requested: false };
        self.label = busy_label(op);
        self.expected = expected;
        debug!("busy: start '{}' ({} expected)", self.label, expected);

        let verdict = match &mut self.callback {
            Some(cb) => cb(BusyPhase::Begin, expected, &self.label),
            None => BusyAction::Default,
        };

        if let Some(host) = &mut self.host {
            host.set_busy_cursor(true);
            if verdict == BusyAction::Default && expected > 0 && expected >= self.progress_threshold {
                host.show_progress(&self.label, expected);
                self.progress_shown = true;
            }
        }

        if let Some(undo) = undo {
            undo.push_begin(op);
            self.undo_opened = true;
        }
    }

    /// Account for one processed item. Returns false once the operation has
    /// been cancelled; callers must stop at the first false.
    pub fn tick(&mut self) -> bool {
        if !self.state.active {
            return true;
        }
        if self.state.cancel_requested {
            return false;
        }
        self.state.count += 1;

        if let Some(cb) = &mut self.callback {
            if cb(BusyPhase::Step, self.state.count, &self.label) == BusyAction::Ignore {
                self.state.cancel_requested = true;
            }
        }

        if let Some(host) = &mut self.host {
            host.pump();
            if self.progress_shown && !host.advance_progress() {
                self.state.cancel_requested = true;
            }
        }

        if self.state.cancel_requested {
            debug!("busy: '{}' cancelled at {}", self.label, self.state.count);
        }
        !self.state.cancel_requested
    }

    /// Close the session, whether it completed or was cancelled.
    pub fn end(&mut self, undo: &mut UndoEngine) {
        if !self.state.active {
            return;
        }

        if let Some(host) = &mut self.host {
            if self.progress_shown {
                host.hide_progress();
            }
            host.set_busy_cursor(false);
        }

        if let Some(cb) = &mut self.callback {
            cb(BusyPhase::End, self.state.count, &self.label);
        }

        if self.undo_opened {
            undo.push_end();
        }

        debug!(
            "busy: end '{}' after {} of {}{}",
            self.label,
            self.state.count,
            self.expected,
            if self.state.cancel_requested { " (cancelled)" } else { "" }
        );

        self.state = BusyState::default();
        self.label.clear();
        self.expected = 0;
        self.undo_opened = false;
        self.progress_shown = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingHost {
        log: Rc<RefCell<Vec<String>>>,
        cancel_after: Option<u64>,
        steps: u64,
    }

    impl BusyHost for RecordingHost {
        fn set_busy_cursor(&mut self, busy: bool) {
            self.log.borrow_mut().push(format!("cursor {busy}"));
        }

        fn show_progress(&mut self, label: &str, total: u64) {
            self.log.borrow_mut().push(format!("show {label} {total}"));
        }

        fn advance_progress(&mut self) -> bool {
            self.steps += 1;
            self.cancel_after.map_or(true, |n| self.steps < n)
        }

        fn hide_progress(&mut self) {
            self.log.borrow_mut().push("hide".to_string());
        }
    }

    #[test]
    fn session_lifecycle() {
        let host = RecordingHost::default();
        let log = host.log.clone();
        let mut busy = BusyCoordinator::new();
        busy.set_host(Some(Box::new(host)));
        let mut undo = UndoEngine::new();

        busy.start(3, "PASTE", Some(&mut undo));
        assert!(busy.is_active());
        assert!(undo.is_recording());
        assert_eq!(busy.label(), "Pasting");
        assert!(busy.tick());
        assert!(busy.tick());
        assert_eq!(busy.state().count, 2);
        busy.end(&mut undo);

        assert!(!busy.is_active());
        assert!(!undo.is_recording());
        assert_eq!(busy.state(), BusyState::default());
        assert_eq!(
            *log.borrow(),
            vec!["cursor true", "show Pasting 3", "hide", "cursor false"]
        );
    }

    #[test]
    fn user_cancel_from_progress() {
        let host = RecordingHost { cancel_after: Some(2), ..Default::default() };
        let mut busy = BusyCoordinator::new();
        busy.set_host(Some(Box::new(host)));
        let mut undo = UndoEngine::new();

        busy.start(10, "UNDO", None);
        assert!(busy.tick());
        assert!(!busy.tick());
        assert!(!busy.tick(), "cancellation is sticky");
        assert_eq!(busy.state().count, 2);
        assert!(busy.is_cancelled());
        busy.end(&mut undo);
        assert!(!busy.is_cancelled());
    }

    #[test]
    fn callback_can_cancel_and_suppress_progress() {
        let phases = Rc::new(RefCell::new(Vec::new()));
        let seen = phases.clone();
        let host = RecordingHost::default();
        let log = host.log.clone();

        let mut busy = BusyCoordinator::new();
        busy.set_host(Some(Box::new(host)));
        busy.set_callback(Some(Box::new(move |phase, count, _label: &str| {
            seen.borrow_mut().push((phase, count));
            match phase {
                BusyPhase::Begin => BusyAction::Ignore,
                BusyPhase::Step if count == 3 => BusyAction::Ignore,
                _ => BusyAction::Default,
            }
        })));
        let mut undo = UndoEngine::new();

        busy.start(5, "COPYCOLTO", None);
        assert!(busy.tick());
        assert!(busy.tick());
        assert!(!busy.tick());
        busy.end(&mut undo);

        assert!(!log.borrow().iter().any(|l| l.starts_with("show")));
        assert_eq!(
            *phases.borrow(),
            vec![
                (BusyPhase::Begin, 5),
                (BusyPhase::Step, 1),
                (BusyPhase::Step, 2),
                (BusyPhase::Step, 3),
                (BusyPhase::End, 3),
            ]
        );
    }

    #[test]
    fn small_sessions_skip_progress() {
        let host = RecordingHost::default();
        let log = host.log.clone();
        let mut busy = BusyCoordinator::new();
        busy.set_host(Some(Box::new(host)));
        busy.set_progress_threshold(100);
        let mut undo = UndoEngine::new();

        busy.start(10, "PASTE", None);
        busy.end(&mut undo);
        assert_eq!(*log.borrow(), vec!["cursor true", "cursor false"]);
    }

    #[test]
    #[should_panic(expected = "already active")]
    fn nested_start_panics() {
        let mut busy = BusyCoordinator::new();
        busy.start(1, "PASTE", None);
        busy.start(1, "UNDO", None);
    }

    #[test]
    fn tick_outside_session_is_harmless() {
        let mut busy = BusyCoordinator::new();
        assert!(busy.tick());
        assert_eq!(busy.state().count, 0);
    }
}
