//! Quiesce coordinator
//!
//! Wraps every operation that needs a stable view of emulated state
//! (snapshot capture/restore, reset, media swap, backend reopen) in the
//! pause protocol:
//!
//! 1. raise the GS vsync backlog bound so the CPU thread cannot block on a
//!    full queue while it is being asked to pause,
//! 2. signal a vsync boundary so in-flight GS work finishes,
//! 3. pause the CPU thread, blocking until it acknowledges,
//! 4. restore the normal backlog bound,
//! 5. wait for the GS thread to drain the command queue,
//! 6. run the guarded operation,
//! 7. resume the CPU thread unconditionally, even on error or panic.
//!
//! Nesting is disallowed by contract: a guarded operation must not invoke
//! another guarded operation.

use crate::core_thread::CoreThreadHandle;
use crate::error::Result;
use crate::gs_bridge::{GsBridgeSender, VSYNC_QUEUE_QUIESCE, VSYNC_QUEUE_RUNNING};

/// Orchestrates pausing and resuming the CPU and GS threads around
/// state-mutating host operations
pub struct QuiesceCoordinator {
    cpu: CoreThreadHandle,
    gs: GsBridgeSender,
}

/// Resumes the CPU thread when dropped, so a guarded operation that
/// returns early or panics never leaves the system paused.
struct ResumeGuard<'a> {
    cpu: &'a CoreThreadHandle,
}

impl Drop for ResumeGuard<'_> {
    fn drop(&mut self) {
        self.cpu.resume();
    }
}

impl QuiesceCoordinator {
    pub fn new(cpu: CoreThreadHandle, gs: GsBridgeSender) -> Self {
        Self { cpu, gs }
    }

    /// Run `op` with the CPU thread paused and the GS queue drained to a
    /// vsync boundary. The CPU thread is resumed on every exit path.
    pub fn with_quiescence<T>(&self, op: impl FnOnce() -> Result<T>) -> Result<T> {
        self.quiesce()?;
        let _resume = ResumeGuard { cpu: &self.cpu };
        op()
    }

    /// Run `op` under quiescence and leave the CPU thread paused
    /// afterwards. Used by session unload, where execution does not
    /// continue.
    pub fn with_suspension<T>(&self, op: impl FnOnce() -> Result<T>) -> Result<T> {
        self.quiesce()?;
        op()
    }

    fn quiesce(&self) -> Result<()> {
        self.gs.set_vsync_queue_size(VSYNC_QUEUE_QUIESCE);
        self.gs.signal_vsync(0);
        let paused = self.cpu.pause();
        self.gs.set_vsync_queue_size(VSYNC_QUEUE_RUNNING);
        paused?;
        // The CPU thread is paused; nothing new enters the queue while the
        // GS thread runs it down.
        if let Err(err) = self.gs.wait_empty() {
            self.cpu.resume();
            return Err(err.into());
        }
        tracing::trace!("System quiesced");
        Ok(())
    }

    /// Resume the CPU thread after a suspension
    pub fn resume(&self) {
        self.cpu.resume();
    }

    /// Whether the CPU thread is currently paused
    pub fn is_paused(&self) -> bool {
        self.cpu.is_paused()
    }
}
