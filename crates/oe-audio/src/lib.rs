//! Bounded audio hand-off buffer for the oxidized-emotion PS2 frontend layer

pub mod ring;

pub use ring::{interleave, AudioFrame, AudioRingBuffer, DRAIN_THRESHOLD, RING_CAPACITY};
