//! Fixed memory-region sequence composing a full-machine snapshot
//!
//! The sequence and each region's byte size must be identical between the
//! build that captured a snapshot and the build that restores it; the
//! codec never reorders or pads between regions. Sizes follow the PS2
//! memory map.

/// A named memory region within the snapshot sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    pub name: &'static str,
    pub len: usize,
}

/// The fixed, totally ordered region sequence. The variable-size audio
/// subsystem block is appended after these by the codec.
pub const REGION_SEQUENCE: [MemoryRegion; 10] = [
    MemoryRegion { name: "main-ram", len: 0x0200_0000 },
    MemoryRegion { name: "scratchpad", len: 0x4000 },
    MemoryRegion { name: "hw-regs", len: 0x1_0000 },
    MemoryRegion { name: "iop-ram", len: 0x0020_0000 },
    MemoryRegion { name: "iop-hw-regs", len: 0x1_0000 },
    MemoryRegion { name: "vu0-micro", len: 0x1000 },
    MemoryRegion { name: "vu0-mem", len: 0x1000 },
    MemoryRegion { name: "vu1-micro", len: 0x4000 },
    MemoryRegion { name: "vu1-mem", len: 0x4000 },
    MemoryRegion { name: "reserved", len: 0x0080_0000 },
];

/// Total size in bytes of all fixed regions
pub const fn fixed_total() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < REGION_SEQUENCE.len() {
        total += REGION_SEQUENCE[i].len;
        i += 1;
    }
    total
}

/// Storage for the region contents of one emulated machine.
///
/// The CPU thread mutates these buffers while running; the host side only
/// touches them through quiesce-protected operations.
pub struct RegionSet {
    buffers: Vec<Box<[u8]>>,
}

impl RegionSet {
    /// Allocate all regions zero-filled
    pub fn new() -> Self {
        let buffers = REGION_SEQUENCE
            .iter()
            .map(|region| vec![0u8; region.len].into_boxed_slice())
            .collect();
        Self { buffers }
    }

    /// Number of regions in the sequence
    pub fn region_count(&self) -> usize {
        self.buffers.len()
    }

    /// Region contents by ordinal position in the sequence
    pub fn region(&self, ordinal: usize) -> &[u8] {
        &self.buffers[ordinal]
    }

    /// Mutable region contents by ordinal position in the sequence
    pub fn region_mut(&mut self, ordinal: usize) -> &mut [u8] {
        &mut self.buffers[ordinal]
    }

    /// Zero every region (quick machine reset)
    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0);
        }
    }
}

impl Default for RegionSet {
    fn default() -> Self {
        Self::new()
    }
}
