//! Optical-drive collaborator contract
//!
//! The emulated CDVD drive lives outside this layer; the tray model talks
//! to it through this narrow interface. Tray open/close calls are routed
//! through the quiesce protocol by the session, since they touch
//! core-visible device state.

use std::path::PathBuf;

use oe_core::MediaError;

/// What the drive reads from after the tray closes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MediaSource {
    /// Tray closed on an empty slot
    #[default]
    NoDisc,
    /// Tray closed on a disc image
    Iso(PathBuf),
}

/// Narrow interface to the emulated optical drive
pub trait OpticalDrive: Send {
    /// Open the tray, detaching the mounted medium
    fn tray_open(&mut self) -> Result<(), MediaError>;

    /// Close the tray on the given medium
    fn tray_close(&mut self, source: MediaSource) -> Result<(), MediaError>;
}

/// Drive stub that only records tray state. Stands in for the real CDVD
/// collaborator in tests and headless sessions.
#[derive(Debug, Default)]
pub struct NullDrive {
    pub tray_open: bool,
    pub mounted: MediaSource,
}

impl NullDrive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OpticalDrive for NullDrive {
    fn tray_open(&mut self) -> Result<(), MediaError> {
        self.tray_open = true;
        self.mounted = MediaSource::NoDisc;
        tracing::debug!("Drive tray opened");
        Ok(())
    }

    fn tray_close(&mut self, source: MediaSource) -> Result<(), MediaError> {
        self.tray_open = false;
        tracing::debug!("Drive tray closed on {:?}", source);
        self.mounted = source;
        Ok(())
    }
}
