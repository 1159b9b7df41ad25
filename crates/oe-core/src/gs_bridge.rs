//! GS bridge - command queue between the CPU/system thread and the GS thread
//!
//! The CPU thread produces draw data and vsync boundaries; the GS thread
//! consumes them asynchronously. The queue bounds its backlog by the number
//! of pending vsync boundaries: once the bound is reached the producer
//! blocks until the GS thread catches up. The quiesce protocol temporarily
//! raises the bound so a pause request can never deadlock against a full
//! queue.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::QuiesceError;

/// Normal vsync backlog bound: keeps the GS thread at most two frames
/// behind the CPU thread for low latency.
pub const VSYNC_QUEUE_RUNNING: usize = 2;

/// Enlarged backlog bound used while quiescing, so the CPU thread cannot
/// block on a full queue while it is being asked to pause.
pub const VSYNC_QUEUE_QUIESCE: usize = 100;

/// Message sent across the GS bridge
#[derive(Debug, Clone)]
pub enum GsMessage {
    /// Raw draw data for the GS to consume
    Transfer(Vec<u64>),
    /// End-of-frame boundary; the GS synchronizes here
    Vsync { field: u32 },
}

/// Frameskip settings the run loop forwards to the GS thread every tick
#[derive(Debug, Clone, Copy)]
pub struct GsRuntimeConfig {
    pub frameskip: bool,
    pub frames_to_draw: u32,
    pub frames_to_skip: u32,
}

impl Default for GsRuntimeConfig {
    fn default() -> Self {
        Self {
            frameskip: false,
            frames_to_draw: 1,
            frames_to_skip: 1,
        }
    }
}

struct BridgeState {
    queue: VecDeque<GsMessage>,
    /// Vsync boundaries queued but not yet consumed
    pending_vsyncs: usize,
    /// Current backlog bound; producers block while at or above it
    vsync_queue_size: usize,
    /// False once the receiver is dropped; the queue can never drain then
    receiver_attached: bool,
    runtime_config: GsRuntimeConfig,
}

struct BridgeShared {
    state: Mutex<BridgeState>,
    /// Signaled when a message is queued
    work: Condvar,
    /// Signaled when backlog space frees up or the bound is raised
    space: Condvar,
}

/// The producer side of the GS bridge (used by the CPU/system thread and
/// by the quiesce coordinator)
pub struct GsBridgeSender {
    shared: Arc<BridgeShared>,
}

impl GsBridgeSender {
    /// Queue raw draw data. Never blocks; only vsync boundaries are bounded.
    pub fn send_transfer(&self, data: Vec<u64>) {
        let mut state = self.shared.state.lock();
        state.queue.push_back(GsMessage::Transfer(data));
        self.shared.work.notify_one();
    }

    /// Queue a vsync boundary, blocking while the pending-vsync backlog is
    /// at the current bound.
    pub fn signal_vsync(&self, field: u32) {
        let mut state = self.shared.state.lock();
        while state.pending_vsyncs >= state.vsync_queue_size {
            self.shared.space.wait(&mut state);
        }
        state.pending_vsyncs += 1;
        state.queue.push_back(GsMessage::Vsync { field });
        self.shared.work.notify_one();
    }

    /// Change the backlog bound. Raising it wakes any blocked producer.
    pub fn set_vsync_queue_size(&self, size: usize) {
        let mut state = self.shared.state.lock();
        state.vsync_queue_size = size;
        self.shared.space.notify_all();
    }

    /// Forward frameskip settings to the GS thread
    pub fn set_runtime_config(&self, config: GsRuntimeConfig) {
        let mut state = self.shared.state.lock();
        state.runtime_config = config;
    }

    /// Vsync boundaries queued but not yet consumed
    pub fn pending_vsyncs(&self) -> usize {
        self.shared.state.lock().pending_vsyncs
    }

    /// Whether the queue holds no unconsumed messages
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().queue.is_empty()
    }

    /// Block until the GS thread has consumed every queued message. Fails
    /// when the receiver is gone, since the queue can never drain then.
    pub fn wait_empty(&self) -> Result<(), QuiesceError> {
        let mut state = self.shared.state.lock();
        while !state.queue.is_empty() {
            if !state.receiver_attached {
                return Err(QuiesceError::CoreDetached);
            }
            self.shared.space.wait(&mut state);
        }
        Ok(())
    }
}

impl Clone for GsBridgeSender {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// The consumer side of the GS bridge (owned by the GS thread)
pub struct GsBridgeReceiver {
    shared: Arc<BridgeShared>,
}

impl GsBridgeReceiver {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<GsMessage> {
        let mut state = self.shared.state.lock();
        let message = state.queue.pop_front();
        if message.is_some() {
            if let Some(GsMessage::Vsync { .. }) = message {
                state.pending_vsyncs -= 1;
            }
            // Wakes blocked producers and drain waiters alike.
            self.shared.space.notify_all();
        }
        message
    }

    /// Block until a message is available
    pub fn recv(&self) -> GsMessage {
        let mut state = self.shared.state.lock();
        loop {
            if let Some(message) = state.queue.pop_front() {
                if let GsMessage::Vsync { .. } = message {
                    state.pending_vsyncs -= 1;
                }
                self.shared.space.notify_all();
                return message;
            }
            self.shared.work.wait(&mut state);
        }
    }

    /// Consume messages up to and including the next vsync boundary.
    /// Returns the transfers that preceded it. Blocks until a vsync arrives.
    pub fn recv_until_vsync(&self) -> Vec<GsMessage> {
        let mut drained = Vec::new();
        loop {
            match self.recv() {
                message @ GsMessage::Vsync { .. } => {
                    drained.push(message);
                    return drained;
                }
                message => drained.push(message),
            }
        }
    }

    /// Check if there are pending messages
    pub fn has_pending(&self) -> bool {
        !self.shared.state.lock().queue.is_empty()
    }

    /// Snapshot of the frameskip settings last forwarded by the run loop
    pub fn runtime_config(&self) -> GsRuntimeConfig {
        self.shared.state.lock().runtime_config
    }
}

impl Drop for GsBridgeReceiver {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        state.receiver_attached = false;
        self.shared.space.notify_all();
    }
}

/// Create a new GS bridge pair (sender, receiver)
pub fn create_gs_bridge() -> (GsBridgeSender, GsBridgeReceiver) {
    let shared = Arc::new(BridgeShared {
        state: Mutex::new(BridgeState {
            queue: VecDeque::new(),
            pending_vsyncs: 0,
            vsync_queue_size: VSYNC_QUEUE_RUNNING,
            receiver_attached: true,
            runtime_config: GsRuntimeConfig::default(),
        }),
        work: Condvar::new(),
        space: Condvar::new(),
    });

    let sender = GsBridgeSender {
        shared: Arc::clone(&shared),
    };
    let receiver = GsBridgeReceiver { shared };

    (sender, receiver)
}
