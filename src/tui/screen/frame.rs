//! Callbacks deferred until after the next draw

use super::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameCallbackId(u64);

pub type FrameCallback = Box<dyn FnOnce(&mut Screen) + Send + Sync>;

#[derive(Default)]
pub struct FrameQueue {
    pending: Vec<(FrameCallbackId, FrameCallback)>,
    next_id: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: FrameCallback) -> FrameCallbackId {
        let id = FrameCallbackId(self.next_id);
        self.next_id += 1;
        self.pending.push((id, callback));
        id
    }

    /// Returns false when the callback already ran or was cancelled
    pub fn cancel(&mut self, id: FrameCallbackId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(pending, _)| *pending != id);
        self.pending.len() != before
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(super) fn take(&mut self) -> Vec<(FrameCallbackId, FrameCallback)> {
        std::mem::take(&mut self.pending)
    }
}

impl std::fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.pending.len())
            .finish()
    }
}
