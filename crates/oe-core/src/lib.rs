//! Core synchronization logic for the oxidized-emotion PS2 frontend layer
//!
//! This crate provides the foundational types, error handling,
//! configuration, the GS command bridge, and the quiesce protocol used
//! around every state-mutating host operation.

pub mod config;
pub mod core_thread;
pub mod error;
pub mod gs_bridge;
pub mod quiesce;

pub use config::{Config, Region, Renderer, SharedConfig};
pub use core_thread::{create_core_handshake, CoreThreadGate, CoreThreadHandle};
pub use error::{EmulatorError, MediaError, QuiesceError, Result, StateError};
pub use gs_bridge::{
    create_gs_bridge, GsBridgeReceiver, GsBridgeSender, GsMessage, GsRuntimeConfig,
    VSYNC_QUEUE_QUIESCE, VSYNC_QUEUE_RUNNING,
};
pub use quiesce::QuiesceCoordinator;
