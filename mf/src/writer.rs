//! Atomic page writes

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ModfixError, Result};

/// Replace `path` with `content` atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Fsync the temporary file
/// 3. Persist over the target (rename)
/// 4. Fsync the parent directory (Unix only)
///
/// If any step fails the temporary file is removed on drop and the target is
/// left as it was.
pub fn write_atomic(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    debug!(?path, bytes = content.len(), "write_atomic: called");
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let write_err = |source: std::io::Error| ModfixError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut temp_file = NamedTempFile::new_in(parent).map_err(write_err)?;
    temp_file.write_all(content.as_bytes()).map_err(write_err)?;
    temp_file.as_file().sync_all().map_err(write_err)?;
    temp_file.persist(path).map_err(|e| write_err(e.error))?;

    #[cfg(unix)]
    {
        let dir = File::open(parent).map_err(write_err)?;
        dir.sync_all().map_err(write_err)?;
    }

    debug!(?path, "write_atomic: persisted");
    Ok(())
}
