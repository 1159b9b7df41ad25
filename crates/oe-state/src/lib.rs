//! Full-machine snapshot layout and codec for the oxidized-emotion
//! PS2 frontend layer

pub mod regions;
pub mod snapshot;

pub use regions::{fixed_total, MemoryRegion, RegionSet, REGION_SEQUENCE};
pub use snapshot::{capture, restore, snapshot_len, AudioStateBlock};
