//! Render-backend attachment contract
//!
//! The actual rendering backends live outside this layer; the session only
//! needs to open and close them around guarded operations and ensure one
//! is attached before stepping a frame.

use oe_core::Result;

/// Narrow interface to a GS render backend
pub trait RenderBackend: Send {
    /// Attach the backend. Idempotent: opening an open backend is a no-op.
    fn open(&mut self) -> Result<()>;

    /// Detach the backend
    fn close(&mut self);

    /// Whether the backend is currently attached
    fn is_open(&self) -> bool;
}

/// Backend stub that renders nothing. Used for headless sessions and tests.
#[derive(Debug, Default)]
pub struct NullBackend {
    open: bool,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderBackend for NullBackend {
    fn open(&mut self) -> Result<()> {
        if !self.open {
            self.open = true;
            tracing::info!("Null render backend opened");
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            tracing::info!("Null render backend closed");
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
