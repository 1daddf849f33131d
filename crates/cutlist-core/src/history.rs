use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::timeline::Timeline;

/// One committed timeline state plus the label of the edit that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub label: String,
    pub state: Timeline,
}

/// Undo/redo history: an ordered stack of timeline snapshots and a cursor.
///
/// The initial timeline load is the first entry, so after N committed edits
/// the stack holds N + 1 snapshots. Only committed edits are recorded;
/// ephemeral drag/trim previews, zoom, selection, and the playhead never
/// appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    pub fn new(initial: &Timeline) -> Self {
        Self {
            entries: vec![HistoryEntry {
                label: "Load timeline".into(),
                state: initial.clone(),
            }],
            cursor: 0,
        }
    }

    /// Record a committed edit, dropping any redo tail past the cursor.
    pub fn record(&mut self, label: impl Into<String>, state: &Timeline) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry {
            label: label.into(),
            state: state.clone(),
        });
        self.cursor = self.entries.len() - 1;
    }

    /// Move the cursor back one entry and return the snapshot to install.
    pub fn undo(&mut self) -> Result<&Timeline> {
        if self.cursor == 0 {
            return Err(EngineError::NothingToUndo);
        }
        self.cursor -= 1;
        Ok(&self.entries[self.cursor].state)
    }

    /// Move the cursor forward one entry and return the snapshot to install.
    pub fn redo(&mut self) -> Result<&Timeline> {
        if self.cursor + 1 >= self.entries.len() {
            return Err(EngineError::NothingToRedo);
        }
        self.cursor += 1;
        Ok(&self.entries[self.cursor].state)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Label of the edit that `undo` would revert.
    pub fn undo_description(&self) -> Option<&str> {
        if self.cursor == 0 {
            None
        } else {
            Some(&self.entries[self.cursor].label)
        }
    }

    /// Label of the edit that `redo` would reapply.
    pub fn redo_description(&self) -> Option<&str> {
        self.entries.get(self.cursor + 1).map(|e| e.label.as_str())
    }
}
