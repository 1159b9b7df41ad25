//! Removable-media tray state machine
//!
//! Models a single tray shared by at most one disc at a time, plus an
//! ordered catalog of available images. Matches the host runner's
//! disk-control surface: eject/insert, enumerate, hot-swap mid-session.
//! The medium can only be changed while the tray is open.

use std::path::{Path, PathBuf};

use oe_core::MediaError;

use crate::drive::{MediaSource, OpticalDrive};

/// One catalog slot; `None` is an empty slot awaiting a path
pub type MediaEntry = Option<PathBuf>;

/// Ordered media catalog plus tray state
#[derive(Debug, Default)]
pub struct MediaIndex {
    entries: Vec<MediaEntry>,
    current: Option<usize>,
    ejected: bool,
}

impl MediaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open or close the tray. Returns `Ok(false)` without side effects
    /// when the requested state equals the current state; otherwise opens
    /// the drive tray (detaching the medium) or closes it on the currently
    /// selected image.
    pub fn set_ejected(
        &mut self,
        ejected: bool,
        drive: &mut dyn OpticalDrive,
    ) -> Result<bool, MediaError> {
        if self.ejected == ejected {
            return Ok(false);
        }

        // The flag follows the drive: a failed tray action leaves it
        // unchanged.
        if ejected {
            drive.tray_open()?;
            self.ejected = true;
        } else {
            self.close_tray(drive)?;
        }
        Ok(true)
    }

    /// Close the tray on the currently selected image, or on no disc when
    /// nothing valid is selected. Also used by session reset, which forces
    /// the tray shut.
    pub fn close_tray(&mut self, drive: &mut dyn OpticalDrive) -> Result<(), MediaError> {
        let source = self.selected_source();
        tracing::info!("Closing tray on {:?}", source);
        drive.tray_close(source)?;
        self.ejected = false;
        Ok(())
    }

    fn selected_source(&self) -> MediaSource {
        match self.current.and_then(|i| self.entries.get(i)) {
            Some(Some(path)) => MediaSource::Iso(path.clone()),
            _ => MediaSource::NoDisc,
        }
    }

    /// Whether the tray is open
    pub fn ejected(&self) -> bool {
        self.ejected
    }

    /// Select a catalog slot. Only accepted while the tray is open; the
    /// return value is the eject flag, so a caller can distinguish
    /// "rejected because inserted" from "accepted". An out-of-range index
    /// selects nothing (closing the tray then mounts no disc).
    pub fn set_current_index(&mut self, index: usize) -> bool {
        if self.ejected {
            self.current = if index < self.entries.len() {
                Some(index)
            } else {
                None
            };
        }
        self.ejected
    }

    /// Currently selected slot, if any
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Select the slot to boot from, before the session starts. An
    /// out-of-range index falls back to slot 0.
    pub fn set_initial_index(&mut self, index: usize) {
        self.current = if self.entries.is_empty() {
            None
        } else if index < self.entries.len() {
            Some(index)
        } else {
            Some(0)
        };
    }

    /// Number of catalog slots, including empty ones
    pub fn image_count(&self) -> usize {
        self.entries.len()
    }

    /// Overwrite slot `index` with a new path, or remove the slot when
    /// `entry` is `None`. Returns false when `index` is out of range.
    ///
    /// Removal shifts the selection so it keeps referring to the same
    /// image: a removed slot strictly before the selection decrements it;
    /// removing the selected slot keeps the index (now referring to the
    /// next image) unless no later slot exists, in which case the
    /// selection clears.
    pub fn replace_entry(&mut self, index: usize, entry: MediaEntry) -> bool {
        if index >= self.entries.len() {
            return false;
        }

        match entry {
            Some(path) => {
                self.entries[index] = Some(path);
            }
            None => {
                self.entries.remove(index);
                self.current = match self.current {
                    Some(_) if self.entries.is_empty() => None,
                    Some(c) if index < c => Some(c - 1),
                    Some(c) if index == c && c >= self.entries.len() => None,
                    other => other,
                };
            }
        }
        true
    }

    /// Append an empty slot awaiting a path. Always succeeds.
    pub fn append_empty_entry(&mut self) {
        self.entries.push(None);
    }

    /// Path stored at slot `index`; `None` when out of range or empty
    pub fn path_at(&self, index: usize) -> Option<&Path> {
        self.entries.get(index)?.as_deref()
    }

    /// Display label for slot `index`: the file stem when available,
    /// otherwise the full path text
    pub fn label_at(&self, index: usize) -> Option<String> {
        let path = self.path_at(index)?;
        let label = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Some(label)
    }

    /// Clear the catalog and zero tray state (session unload)
    pub fn reset(&mut self) {
        self.entries.clear();
        self.current = None;
        self.ejected = false;
    }
}
