use log::{debug, info};
use thiserror::Error;

use crate::document::Document;
use crate::element::CanvasObject;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to capture snapshot: {0}")]
    Capture(#[source] serde_json::Error),

    #[error("failed to restore snapshot: {0}")]
    Restore(#[source] serde_json::Error),
}

/// The full object sequence, serialized with each object's variant tag.
///
/// Canvas size is not part of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn capture(objects: &[CanvasObject]) -> Result<Self, HistoryError> {
        serde_json::to_string(objects)
            .map(Snapshot)
            .map_err(HistoryError::Capture)
    }

    pub fn restore(&self) -> Result<Vec<CanvasObject>, HistoryError> {
        serde_json::from_str(&self.0).map_err(HistoryError::Restore)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Undo/redo stacks of whole-document snapshots.
///
/// Checkpoints are recorded after each action, so the top of the undo stack
/// is normally the live state and undo restores the entry beneath it. If the
/// live state has drifted from the top (an edit that was not checkpointed),
/// undo first returns to the top.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    /// Stack of snapshots that can be restored by undo
    undo_stack: Vec<Snapshot>,
    /// Stack of snapshots that can be restored by redo
    redo_stack: Vec<Snapshot>,
    /// Most snapshots kept per stack
    limit: usize,
}

impl CommandHistory {
    /// Creates a new empty history keeping at most `limit` snapshots
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Pushes a snapshot of `objects` unless it equals the current top.
    ///
    /// Leaves the redo stack alone; see [`commit`](Self::commit).
    pub fn record_checkpoint(&mut self, objects: &[CanvasObject]) -> Result<bool, HistoryError> {
        let snapshot = Snapshot::capture(objects)?;
        if self.undo_stack.last() == Some(&snapshot) {
            return Ok(false);
        }
        self.undo_stack.push(snapshot);
        Self::trim(&mut self.undo_stack, self.limit);
        debug!("checkpoint recorded ({} undo entries)", self.undo_stack.len());
        Ok(true)
    }

    /// Records a checkpoint for a new user action, discarding the redo
    /// branch if anything changed.
    pub fn commit(&mut self, objects: &[CanvasObject]) -> Result<bool, HistoryError> {
        let pushed = self.record_checkpoint(objects)?;
        if pushed {
            self.redo_stack.clear();
        }
        Ok(pushed)
    }

    /// Restores the previous state. `Ok(false)` when there is nothing to undo.
    ///
    /// On error the document and both stacks are left untouched.
    pub fn undo(&mut self, document: &mut Document) -> Result<bool, HistoryError> {
        let current = Snapshot::capture(document.objects())?;
        let len = self.undo_stack.len();

        let Some(top) = self.undo_stack.last() else {
            return Ok(false);
        };
        let restored = if *top == current {
            if len < 2 {
                return Ok(false);
            }
            let objects = self.undo_stack[len - 2].restore()?;
            if let Some(top) = self.undo_stack.pop() {
                self.redo_stack.push(top);
            }
            objects
        } else {
            let objects = top.restore()?;
            self.redo_stack.push(current);
            objects
        };
        Self::trim(&mut self.redo_stack, self.limit);

        document.replace_objects(restored);
        info!("Undo ({} undo, {} redo)", self.undo_stack.len(), self.redo_stack.len());
        Ok(true)
    }

    /// Re-applies the last undone state. `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self, document: &mut Document) -> Result<bool, HistoryError> {
        let Some(next) = self.redo_stack.last() else {
            return Ok(false);
        };
        let restored = next.restore()?;
        let current = Snapshot::capture(document.objects())?;

        if self.undo_stack.last() != Some(&current) {
            self.undo_stack.push(current);
        }
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(next);
        }
        Self::trim(&mut self.undo_stack, self.limit);

        document.replace_objects(restored);
        info!("Redo ({} undo, {} redo)", self.undo_stack.len(), self.redo_stack.len());
        Ok(true)
    }

    /// Returns true if undo would change the document
    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    /// Returns true if there are snapshots that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear the history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Clears both stacks and records `objects` as the new baseline.
    pub fn reset(&mut self, objects: &[CanvasObject]) -> Result<(), HistoryError> {
        self.clear();
        self.record_checkpoint(objects).map(|_| ())
    }

    fn trim(stack: &mut Vec<Snapshot>, limit: usize) {
        if stack.len() > limit {
            let excess = stack.len() - limit;
            stack.drain(..excess);
        }
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(100)
    }
}
