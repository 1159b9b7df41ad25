//! Oxidized-Emotion - PS2 frontend synchronization and state-capture layer
//!
//! Facade over the workspace crates: host runners depend on this crate and
//! drive a [`Session`] once per output frame.

pub use oe_audio::{interleave, AudioFrame, AudioRingBuffer, DRAIN_THRESHOLD, RING_CAPACITY};
pub use oe_core::{
    Config, EmulatorError, MediaError, QuiesceCoordinator, QuiesceError, Region, Renderer, Result,
    SharedConfig, StateError,
};
pub use oe_media::{MediaEntry, MediaIndex, MediaSource, NullDrive, OpticalDrive};
pub use oe_runtime::{
    CoreEndpoints, FrameStepper, HostSink, NullBackend, OutputGeometry, RenderBackend, Session,
    TimingInfo,
};
pub use oe_state::{capture, restore, snapshot_len, AudioStateBlock, RegionSet, REGION_SEQUENCE};

/// Initialize logging for embedding hosts. Honors `RUST_LOG`, defaults to
/// `info`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Oxidized-Emotion frontend layer initialized");
}
