//! Emulated session: per-tick run loop and guarded host operations
//!
//! The host drives [`Session::run_frame`] once per output frame and calls
//! the guarded operations (serialize, unserialize, reset, unload, media
//! swap) at arbitrary times. Every guarded operation goes through the
//! quiesce coordinator so the CPU thread never observes half-applied
//! state.

use std::sync::Arc;

use parking_lot::RwLock;

use oe_audio::{AudioRingBuffer, DRAIN_THRESHOLD};
use oe_core::gs_bridge::GsRuntimeConfig;
use oe_core::{
    create_core_handshake, create_gs_bridge, CoreThreadGate, GsBridgeReceiver, GsBridgeSender,
    QuiesceCoordinator, Result, SharedConfig,
};
use oe_media::{MediaIndex, OpticalDrive};
use oe_state::{snapshot_len, AudioStateBlock, RegionSet};

use crate::backend::RenderBackend;
use crate::host::{HostSink, OutputGeometry, TimingInfo};

/// Narrow interface to the external CPU/GS core for frame advancement
pub trait FrameStepper: Send {
    /// Advance the core by exactly one output frame. Failure is fatal for
    /// the session and is not retried here.
    fn step_frame(&mut self) -> Result<()>;

    /// Quick in-place reset of the core's execution state. Called under
    /// quiescence; machine memory is cleared separately.
    fn reset_quick(&mut self) -> Result<()>;
}

/// Worker-side endpoints handed to the external core when a session is
/// created: the pause gate and GS producer for the CPU thread, the
/// command queue for the GS thread, and the shared machine memory and
/// audio buffer.
pub struct CoreEndpoints {
    pub gate: CoreThreadGate,
    pub gs_producer: GsBridgeSender,
    pub gs: GsBridgeReceiver,
    pub regions: Arc<RwLock<RegionSet>>,
    pub audio: Arc<AudioRingBuffer>,
}

/// One emulated session
pub struct Session {
    config: SharedConfig,
    coordinator: QuiesceCoordinator,
    gs: GsBridgeSender,
    backend: Box<dyn RenderBackend>,
    stepper: Box<dyn FrameStepper>,
    drive: Box<dyn OpticalDrive>,
    media: MediaIndex,
    audio: Arc<AudioRingBuffer>,
    regions: Arc<RwLock<RegionSet>>,
    spu2: Box<dyn AudioStateBlock + Send>,
    /// Geometry last pushed to the host, to detect live option changes
    last_geometry: OutputGeometry,
}

impl Session {
    /// Create a session and the endpoints the external core threads run on
    pub fn new(
        config: SharedConfig,
        backend: Box<dyn RenderBackend>,
        stepper: Box<dyn FrameStepper>,
        drive: Box<dyn OpticalDrive>,
        spu2: Box<dyn AudioStateBlock + Send>,
    ) -> (Self, CoreEndpoints) {
        let (cpu_handle, cpu_gate) = create_core_handshake();
        let (gs_sender, gs_receiver) = create_gs_bridge();
        let regions = Arc::new(RwLock::new(RegionSet::new()));
        let audio = Arc::new(AudioRingBuffer::new());

        let last_geometry = OutputGeometry::from_config(&config.read());
        let coordinator = QuiesceCoordinator::new(cpu_handle, gs_sender.clone());

        tracing::info!("Session created");

        let session = Self {
            config,
            coordinator,
            gs: gs_sender,
            backend,
            stepper,
            drive,
            media: MediaIndex::new(),
            audio: Arc::clone(&audio),
            regions: Arc::clone(&regions),
            spu2,
            last_geometry,
        };
        let endpoints = CoreEndpoints {
            gate: cpu_gate,
            gs_producer: session.gs.clone(),
            gs: gs_receiver,
            regions,
            audio,
        };
        (session, endpoints)
    }

    /// Per-tick entry point, called by the host once per output frame
    pub fn run_frame(&mut self, host: &mut dyn HostSink) -> Result<()> {
        let (geometry, gs_config) = {
            let config = self.config.read();
            (
                OutputGeometry::from_config(&config),
                GsRuntimeConfig {
                    frameskip: config.video.frameskip,
                    frames_to_draw: config.video.frames_to_draw,
                    frames_to_skip: config.video.frames_to_skip,
                },
            )
        };

        self.gs.set_runtime_config(gs_config);
        if geometry != self.last_geometry {
            tracing::info!(
                "Output geometry changed: {}x{}",
                geometry.width,
                geometry.height
            );
            self.last_geometry = geometry;
            host.set_geometry(geometry);
        }

        self.backend.open()?;
        self.stepper.step_frame()?;

        if self.audio.len() >= DRAIN_THRESHOLD {
            let frames = self.audio.drain();
            host.play_samples(&frames);
        }

        Ok(())
    }

    /// Currently negotiated output geometry
    pub fn output_geometry(&self) -> OutputGeometry {
        OutputGeometry::from_config(&self.config.read())
    }

    /// Frame rate and audio sample rate for the host's scheduler
    pub fn timing_info(&self) -> TimingInfo {
        TimingInfo::from_config(&self.config.read())
    }

    /// Size in bytes a snapshot will occupy right now
    pub fn serialize_size(&self) -> usize {
        snapshot_len(self.spu2.as_ref())
    }

    /// Capture a full-machine snapshot under quiescence
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let regions = &self.regions;
        let spu2 = &self.spu2;
        self.coordinator.with_quiescence(|| {
            let regions = regions.read();
            Ok(oe_state::capture(&regions, spu2.as_ref()))
        })
    }

    /// Restore a full-machine snapshot under quiescence. A short buffer
    /// fails without mutating any region.
    pub fn unserialize(&mut self, data: &[u8]) -> Result<()> {
        let regions = &self.regions;
        let spu2 = &mut self.spu2;
        self.coordinator.with_quiescence(|| {
            let mut regions = regions.write();
            oe_state::restore(&mut regions, spu2.as_mut(), data)?;
            Ok(())
        })
    }

    /// Reset the machine: reopen the render backend around a quick core
    /// reset, force the tray shut, and discard buffered audio.
    pub fn reset(&mut self) -> Result<()> {
        tracing::info!("Resetting session");
        let backend = &mut self.backend;
        let stepper = &mut self.stepper;
        let regions = &self.regions;
        let media = &mut self.media;
        let drive = &mut self.drive;
        let audio = &self.audio;
        self.coordinator.with_quiescence(|| {
            backend.close();
            regions.write().clear();
            stepper.reset_quick()?;
            media.close_tray(drive.as_mut())?;
            audio.reset();
            backend.open()
        })
    }

    /// Tear the session down: suspend the core (it does not resume), close
    /// the render backend, and zero media and audio state.
    pub fn unload(&mut self) -> Result<()> {
        tracing::info!("Unloading session");
        let backend = &mut self.backend;
        self.coordinator.with_suspension(|| {
            backend.close();
            Ok(())
        })?;
        self.media.reset();
        self.audio.reset();
        Ok(())
    }

    /// Resume the core after an unload suspension, for hosts that restart
    /// a session without recreating the core threads
    pub fn resume(&self) {
        self.coordinator.resume();
    }

    // --- disk-control surface ---

    /// Open or close the tray. The mount/unmount touches core-visible
    /// device state, so it runs under quiescence. Returns whether the
    /// state changed.
    pub fn set_eject_state(&mut self, ejected: bool) -> Result<bool> {
        if self.media.ejected() == ejected {
            return Ok(false);
        }
        let media = &mut self.media;
        let drive = &mut self.drive;
        self.coordinator.with_quiescence(|| {
            media
                .set_ejected(ejected, drive.as_mut())
                .map_err(Into::into)
        })
    }

    pub fn eject_state(&self) -> bool {
        self.media.ejected()
    }

    pub fn image_index(&self) -> Option<usize> {
        self.media.current_index()
    }

    /// Select a catalog slot; only accepted while the tray is open
    pub fn set_image_index(&mut self, index: usize) -> bool {
        self.media.set_current_index(index)
    }

    pub fn image_count(&self) -> usize {
        self.media.image_count()
    }

    /// Overwrite or remove a catalog slot
    pub fn replace_image(&mut self, index: usize, path: Option<std::path::PathBuf>) -> bool {
        self.media.replace_entry(index, path)
    }

    /// Append an empty catalog slot
    pub fn add_image_slot(&mut self) {
        self.media.append_empty_entry();
    }

    /// Select the boot image before the session starts
    pub fn set_initial_image(&mut self, index: usize) {
        self.media.set_initial_index(index);
    }

    pub fn image_path(&self, index: usize) -> Option<&std::path::Path> {
        self.media.path_at(index)
    }

    pub fn image_label(&self, index: usize) -> Option<String> {
        self.media.label_at(index)
    }
}
