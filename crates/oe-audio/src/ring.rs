//! Bounded audio hand-off buffer
//!
//! Decouples the emulated audio producer (CPU/audio-mixing thread) from
//! the host's pull-based consumption (one drain per run-loop tick). The
//! buffer drops the newest frames on overflow rather than blocking the
//! producer: audible dropouts under sustained overrun, but the producer's
//! real-time budget is never spent waiting.

use bytemuck::{Pod, Zeroable};
use parking_lot::Mutex;

/// One interleaved stereo sample pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct AudioFrame {
    pub left: i16,
    pub right: i16,
}

/// Default buffer capacity in frames
pub const RING_CAPACITY: usize = 0x800;

/// Frames the run loop waits for before handing a batch to the host,
/// amortizing the per-tick hand-off
pub const DRAIN_THRESHOLD: usize = 0x200;

/// Fixed-capacity frame queue under a single short-held lock
pub struct AudioRingBuffer {
    frames: Mutex<Vec<AudioFrame>>,
    capacity: usize,
}

impl AudioRingBuffer {
    pub fn new() -> Self {
        Self::with_capacity(RING_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append one frame. Returns false when the buffer is full and the
    /// frame was dropped; overflow is not an error.
    pub fn push(&self, frame: AudioFrame) -> bool {
        let mut frames = self.frames.lock();
        if frames.len() < self.capacity {
            frames.push(frame);
            true
        } else {
            false
        }
    }

    /// Hand back all buffered frames as one batch and empty the buffer
    pub fn drain(&self) -> Vec<AudioFrame> {
        let mut frames = self.frames.lock();
        std::mem::take(&mut *frames)
    }

    /// Frames currently buffered
    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard buffered frames (session start, reset)
    pub fn reset(&self) {
        self.frames.lock().clear();
    }
}

impl Default for AudioRingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// View a frame batch as interleaved L/R samples, the shape batch audio
/// callbacks expect
pub fn interleave(frames: &[AudioFrame]) -> &[i16] {
    bytemuck::cast_slice(frames)
}
