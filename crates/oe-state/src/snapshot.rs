//! Snapshot codec
//!
//! Serializes the region sequence to a contiguous buffer with no headers,
//! separators, or padding, followed by the audio subsystem's opaque state
//! block. The format carries no version tag: it is only valid between
//! builds that agree on the region sequence, and callers version snapshots
//! externally if they need portability.

use oe_core::StateError;

use crate::regions::{fixed_total, RegionSet};

/// Freeze/thaw contract for the audio subsystem's state block, appended
/// after the fixed regions as an opaque blob of a size it declares.
pub trait AudioStateBlock {
    /// Size in bytes of the frozen block
    fn frozen_len(&self) -> usize;

    /// Append the frozen block to `out`
    fn freeze(&self, out: &mut Vec<u8>);

    /// Restore internal state from a previously frozen block
    fn thaw(&mut self, data: &[u8]) -> Result<(), StateError>;
}

/// Total snapshot size for the current machine and audio state
pub fn snapshot_len(audio: &dyn AudioStateBlock) -> usize {
    fixed_total() + audio.frozen_len()
}

/// Capture a full-machine snapshot. Must be called under quiescence.
pub fn capture(regions: &RegionSet, audio: &dyn AudioStateBlock) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(snapshot_len(audio));
    for ordinal in 0..regions.region_count() {
        buffer.extend_from_slice(regions.region(ordinal));
    }
    audio.freeze(&mut buffer);
    tracing::debug!("Captured snapshot: {} bytes", buffer.len());
    buffer
}

/// Restore a full-machine snapshot. Must be called under quiescence.
///
/// Validates the buffer length against the fixed regions before mutating
/// anything; a short buffer fails with `SizeMismatch` and leaves every
/// region untouched. Trailing bytes past the fixed regions are handed to
/// the audio subsystem as its opaque block.
pub fn restore(
    regions: &mut RegionSet,
    audio: &mut dyn AudioStateBlock,
    data: &[u8],
) -> Result<(), StateError> {
    let required = fixed_total();
    if data.len() < required {
        return Err(StateError::SizeMismatch {
            required,
            actual: data.len(),
        });
    }

    let mut offset = 0;
    for ordinal in 0..regions.region_count() {
        let target = regions.region_mut(ordinal);
        target.copy_from_slice(&data[offset..offset + target.len()]);
        offset += target.len();
    }

    audio.thaw(&data[offset..])?;
    tracing::debug!("Restored snapshot: {} bytes", data.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Audio collaborator stub with a variable-size blob
    struct StubAudioBlock {
        state: Vec<u8>,
    }

    impl AudioStateBlock for StubAudioBlock {
        fn frozen_len(&self) -> usize {
            self.state.len()
        }

        fn freeze(&self, out: &mut Vec<u8>) {
            out.extend_from_slice(&self.state);
        }

        fn thaw(&mut self, data: &[u8]) -> Result<(), StateError> {
            self.state = data.to_vec();
            Ok(())
        }
    }

    fn patterned_regions() -> RegionSet {
        let mut regions = RegionSet::new();
        for ordinal in 0..regions.region_count() {
            let seed = ordinal as u8;
            for (i, byte) in regions.region_mut(ordinal).iter_mut().enumerate() {
                *byte = seed.wrapping_add(i as u8);
            }
        }
        regions
    }

    #[test]
    fn test_round_trip_is_byte_exact() {
        let source = patterned_regions();
        let audio = StubAudioBlock {
            state: vec![0xA5; 37],
        };

        let snapshot = capture(&source, &audio);
        assert_eq!(snapshot.len(), fixed_total() + 37);

        let mut target = RegionSet::new();
        let mut target_audio = StubAudioBlock { state: Vec::new() };
        restore(&mut target, &mut target_audio, &snapshot).unwrap();

        for ordinal in 0..source.region_count() {
            assert_eq!(
                source.region(ordinal),
                target.region(ordinal),
                "region {} differs",
                ordinal
            );
        }
        assert_eq!(target_audio.state, vec![0xA5; 37]);
    }

    #[test]
    fn test_short_buffer_fails_without_mutation() {
        let snapshot = vec![0xFF; fixed_total() - 1];

        let mut regions = RegionSet::new();
        let mut audio = StubAudioBlock { state: Vec::new() };
        let result = restore(&mut regions, &mut audio, &snapshot);

        assert!(matches!(
            result,
            Err(StateError::SizeMismatch { required, actual })
                if required == fixed_total() && actual == fixed_total() - 1
        ));
        // No region was partially applied.
        for ordinal in 0..regions.region_count() {
            assert!(regions.region(ordinal).iter().all(|&b| b == 0));
        }
        assert!(audio.state.is_empty());
    }

    #[test]
    fn test_empty_audio_block() {
        let regions = patterned_regions();
        let audio = StubAudioBlock { state: Vec::new() };

        let snapshot = capture(&regions, &audio);
        assert_eq!(snapshot.len(), fixed_total());

        let mut target = RegionSet::new();
        let mut target_audio = StubAudioBlock {
            state: vec![1, 2, 3],
        };
        restore(&mut target, &mut target_audio, &snapshot).unwrap();
        assert!(target_audio.state.is_empty());
    }

    #[test]
    fn test_snapshot_len_declares_audio_size() {
        let audio = StubAudioBlock {
            state: vec![0; 128],
        };
        assert_eq!(snapshot_len(&audio), fixed_total() + 128);
    }
}
