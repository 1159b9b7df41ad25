//! Pause/resume handshake with the CPU/system thread
//!
//! The host side holds a [`CoreThreadHandle`]; the CPU thread holds the
//! matching [`CoreThreadGate`] and calls [`CoreThreadGate::pause_point`] at
//! its safe points (frame boundaries). A pause request blocks the host
//! until the CPU thread acknowledges it from a safe point. There is no
//! timeout: a core that never reaches a safe point is a core bug, not a
//! condition this layer recovers from.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::QuiesceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Running,
    PauseRequested,
    Paused,
    /// The gate was dropped; the core thread is gone
    Detached,
}

struct Handshake {
    state: Mutex<RunState>,
    cond: Condvar,
}

/// Host-side handle to the CPU thread's execution state
pub struct CoreThreadHandle {
    shared: Arc<Handshake>,
}

impl CoreThreadHandle {
    /// Request a pause and block until the CPU thread acknowledges it.
    /// Idempotent: returns immediately if already paused.
    pub fn pause(&self) -> Result<(), QuiesceError> {
        let mut state = self.shared.state.lock();
        loop {
            match *state {
                RunState::Paused => return Ok(()),
                RunState::Detached => return Err(QuiesceError::CoreDetached),
                RunState::Running => {
                    *state = RunState::PauseRequested;
                    self.shared.cond.notify_all();
                }
                RunState::PauseRequested => {}
            }
            self.shared.cond.wait(&mut state);
        }
    }

    /// Resume the CPU thread. Safe to call in any state.
    pub fn resume(&self) {
        let mut state = self.shared.state.lock();
        if matches!(*state, RunState::Paused | RunState::PauseRequested) {
            *state = RunState::Running;
            self.shared.cond.notify_all();
        }
    }

    /// Whether the CPU thread has acknowledged a pause
    pub fn is_paused(&self) -> bool {
        *self.shared.state.lock() == RunState::Paused
    }
}

impl Clone for CoreThreadHandle {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Core-side gate the CPU thread checks at its safe points
pub struct CoreThreadGate {
    shared: Arc<Handshake>,
}

impl CoreThreadGate {
    /// Acknowledge a pending pause request and block until resumed.
    /// Returns immediately when no pause is pending.
    pub fn pause_point(&self) {
        let mut state = self.shared.state.lock();
        if *state == RunState::PauseRequested {
            *state = RunState::Paused;
            self.shared.cond.notify_all();
            tracing::debug!("Core thread paused");
            while *state == RunState::Paused {
                self.shared.cond.wait(&mut state);
            }
            tracing::debug!("Core thread resumed");
        }
    }

    /// Whether a pause has been requested but not yet acknowledged
    pub fn pause_requested(&self) -> bool {
        *self.shared.state.lock() == RunState::PauseRequested
    }
}

impl Drop for CoreThreadGate {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        *state = RunState::Detached;
        self.shared.cond.notify_all();
    }
}

/// Create a new pause/resume handshake pair (host handle, core gate)
pub fn create_core_handshake() -> (CoreThreadHandle, CoreThreadGate) {
    let shared = Arc::new(Handshake {
        state: Mutex::new(RunState::Running),
        cond: Condvar::new(),
    });

    let handle = CoreThreadHandle {
        shared: Arc::clone(&shared),
    };
    let gate = CoreThreadGate { shared };

    (handle, gate)
}
