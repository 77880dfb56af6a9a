//! RAII guard that returns an abandoned cycle to `Idle`.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::{CycleState, Shared};

/// Resets the orchestrator on drop unless `release()` is called.
///
/// Covers a submit future dropped mid-await. Only the cycle that created the
/// guard is reset; a newer cycle (higher epoch) is left alone.
pub(super) struct CycleGuard {
    shared: Arc<Mutex<Shared>>,
    epoch: u64,
    released: bool,
}

impl CycleGuard {
    pub(super) fn new(shared: Arc<Mutex<Shared>>, epoch: u64) -> Self {
        Self { shared, epoch, released: false }
    }

    pub(super) fn release(mut self) {
        self.released = true;
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let mut shared = self.shared.lock();
        if shared.epoch == self.epoch && !shared.state.is_idle() {
            debug!("Edit cycle {} abandoned in state {}", self.epoch, shared.state);
            if let Some(token) = shared.cancel.take() {
                token.cancel();
            }
            shared.state = CycleState::Idle;
        }
    }
}
