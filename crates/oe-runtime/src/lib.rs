//! Session run loop and guarded host operations for the oxidized-emotion
//! PS2 frontend layer
//!
//! Ties the other crates together: one [`Session`] owns the quiesce
//! coordinator, the render backend, the media catalog, and the shared
//! machine memory, and exposes the per-tick run loop plus the guarded
//! operations the host calls.

pub mod backend;
pub mod host;
pub mod session;

pub use backend::{NullBackend, RenderBackend};
pub use host::{HostSink, OutputGeometry, TimingInfo};
pub use session::{CoreEndpoints, FrameStepper, Session};
