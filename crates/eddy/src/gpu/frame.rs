//! Per-frame synchronization slots.
//!
//! Two slots, selected by frame-counter parity, let the control thread
//! prepare one step while the previous one is still executing. A slot holds
//! the submission index of its last step (the fence to wait on before the
//! slot is reused) and the reclamation queue of resources retired during
//! that step.

use super::deletion_queue::DeletionQueue;

/// Number of steps whose GPU work may be outstanding simultaneously.
pub const FRAME_OVERLAP: usize = 2;

#[derive(Default)]
pub struct FrameContext {
    pub submission: Option<wgpu::SubmissionIndex>,
    pub reclaim: DeletionQueue,
}

/// Slot index owning frame number `frame_counter`.
pub fn slot_index(frame_counter: u64) -> usize {
    (frame_counter % FRAME_OVERLAP as u64) as usize
}
