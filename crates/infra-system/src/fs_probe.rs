// Filesystem probe implementation

use std::path::Path;

use tracing::debug;

use vigil_core::domain::PathState;
use vigil_core::port::PathProbe;

/// Filesystem stat adapter
///
/// Symlinks are followed, so a link to a directory counts as a directory.
/// Every call performs a fresh stat.
pub struct SystemPathProbe;

impl PathProbe for SystemPathProbe {
    fn probe(&self, path: &Path) -> PathState {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => PathState::File,
            Ok(meta) if meta.is_dir() => PathState::Directory,
            Ok(_) => PathState::Other,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Path not statable, treating as missing");
                PathState::Missing
            }
        }
    }
}
