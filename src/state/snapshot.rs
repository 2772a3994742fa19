//! Point-in-time copies of artifact files.

use std::{borrow::Cow, fs, path::Path};

/// Content of a file at capture time.
///
/// Compared byte for byte. An empty file and a missing file are different
/// states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Present(Vec<u8>),
    Absent,
}

impl Snapshot {
    /// Capture a file. Any read failure counts as absence.
    pub fn capture(path: &Path) -> Self {
        match fs::read(path) {
            Ok(bytes) => Self::Present(bytes),
            Err(_) => Self::Absent,
        }
    }

    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Content decoded as UTF-8 for pattern scanning, invalid bytes replaced.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Present(bytes) => Some(String::from_utf8_lossy(bytes)),
            Self::Absent => None,
        }
    }
}
