//! Undo chunks.
//!
//! A chunk records the complete scene state as it was before the first edit
//! of the chunk. Undoing restores that state in one step, keeping every
//! handle valid. Chunks opened while another one is open are merged into it.
//!
//! Each chunk also remembers the scene revision it closed at. A chunk can
//! only be undone while the scene is still at that revision; edits made
//! outside any chunk after it closed would otherwise be reverted with it.

use std::collections::VecDeque;

use crate::scene::scene::SceneState;

struct UndoChunk {
    label: String,
    before: SceneState,
    closed_at: Option<u64>,
}

pub(crate) struct UndoStack {
    chunks: VecDeque<UndoChunk>,
    limit: usize,
    depth: usize,
    recording: bool,
}

impl UndoStack {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            chunks: VecDeque::new(),
            limit,
            depth: 0,
            recording: false,
        }
    }

    /// Opens a chunk. Returns `true` if this call opened the outermost chunk.
    pub(crate) fn open(&mut self, label: &str, state: &SceneState) -> bool {
        self.depth += 1;
        if self.depth > 1 {
            return false;
        }
        self.recording = self.limit > 0;
        if !self.recording {
            return true;
        }
        if self.chunks.len() == self.limit {
            self.chunks.pop_front();
        }
        self.chunks.push_back(UndoChunk {
            label: label.to_string(),
            before: state.clone(),
            closed_at: None,
        });
        true
    }

    /// Closes a chunk. The outermost close stamps the chunk with `revision`.
    pub(crate) fn close(&mut self, revision: u64) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 && std::mem::take(&mut self.recording)
            && let Some(chunk) = self.chunks.back_mut()
        {
            chunk.closed_at = Some(revision);
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.depth > 0
    }

    /// Label of the newest chunk and the revision it closed at.
    pub(crate) fn peek(&self) -> Option<(&str, Option<u64>)> {
        self.chunks.back().map(|c| (c.label.as_str(), c.closed_at))
    }

    pub(crate) fn pop(&mut self) -> Option<(String, SceneState)> {
        self.chunks.pop_back().map(|c| (c.label, c.before))
    }

    pub(crate) fn labels(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(|c| c.label.as_str())
    }

    pub(crate) fn clear(&mut self) {
        self.chunks.clear();
    }
}
