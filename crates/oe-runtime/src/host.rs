//! Host-facing output contracts
//!
//! The host runner negotiates output geometry and pulls audio batches; the
//! session pushes both through this interface.

use oe_audio::AudioFrame;
use oe_core::config::{AUDIO_SAMPLE_RATE, BASE_HEIGHT, BASE_WIDTH};
use oe_core::Config;

/// Negotiated video output geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputGeometry {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f32,
}

impl OutputGeometry {
    /// Geometry for the current configuration. Software and null rendering
    /// force base resolution; otherwise the upscale multiplier applies.
    pub fn from_config(config: &Config) -> Self {
        let scale = if config.video.renderer.forces_base_resolution() {
            1
        } else {
            config.video.upscale_multiplier.max(1)
        };
        Self {
            width: BASE_WIDTH * scale,
            height: BASE_HEIGHT * scale,
            aspect_ratio: 4.0 / 3.0,
        }
    }
}

/// Timing the host schedules ticks and audio around
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingInfo {
    pub fps: f64,
    pub sample_rate: u32,
}

impl TimingInfo {
    pub fn from_config(config: &Config) -> Self {
        Self {
            fps: config.general.region.fps(),
            sample_rate: AUDIO_SAMPLE_RATE,
        }
    }
}

/// Where the session delivers geometry changes and audio batches
pub trait HostSink {
    /// Called when a live configuration change invalidated the negotiated
    /// geometry; no session restart required
    fn set_geometry(&mut self, geometry: OutputGeometry);

    /// Called once per tick with the drained audio batch, interleaved
    /// 16-bit stereo
    fn play_samples(&mut self, frames: &[AudioFrame]);
}
