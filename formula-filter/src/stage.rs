use crate::types::PendingResult;
use tracing::debug;

/// Single-slot handoff between the send hook and the display hook.
///
/// Writes always replace whatever is there; there is no queue. Both hooks run
/// on the host's dispatch thread and reach the stage through `&mut`, so a
/// `take` can never interleave with a `set`.
#[derive(Debug, Default)]
pub struct PendingStage {
    slot: PendingResult,
}

impl PendingStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, result: PendingResult) {
        if !self.slot.is_empty() {
            debug!("Overwriting unconsumed pending result {:?}", self.slot);
        }
        self.slot = result;
    }

    /// Hand out the staged result and leave the slot empty.
    pub fn take(&mut self) -> PendingResult {
        std::mem::take(&mut self.slot)
    }

    pub fn peek(&self) -> &PendingResult {
        &self.slot
    }

    pub fn clear(&mut self) {
        self.slot = PendingResult::Empty;
    }
}
