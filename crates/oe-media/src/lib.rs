//! Removable-media tray model for the oxidized-emotion PS2 frontend layer

pub mod drive;
pub mod tray;

pub use drive::{MediaSource, NullDrive, OpticalDrive};
pub use tray::{MediaEntry, MediaIndex};
