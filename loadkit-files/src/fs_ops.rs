use loadkit_common::{LoadKitError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::debug;

/// `true` if `path` does not exist or has zero length.
pub fn is_file_empty(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len() == 0),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
        Err(e) => Err(LoadKitError::io(path, e)),
    }
}

/// Create or truncate `path` and write `s` into it.
pub fn write_string(path: impl AsRef<Path>, s: &str) -> Result<()> {
    write_bytes(path, s.as_bytes())
}

/// Append `s` to `path`, creating the file if absent.
pub fn append_string(path: impl AsRef<Path>, s: &str) -> Result<()> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| LoadKitError::io(path, e))?;
    file.write_all(s.as_bytes()).map_err(|e| LoadKitError::io(path, e))?;
    debug!(path = %path.display(), bytes = s.len(), "appended");
    Ok(())
}

/// Create or truncate `path` and write `bytes` into it.
pub fn write_bytes(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, bytes).map_err(|e| LoadKitError::io(path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote");
    Ok(())
}

/// Truncate an existing file to zero length. Fails if `path` does not exist.
pub fn clear_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| LoadKitError::io(path, e))?;
    file.set_len(0).map_err(|e| LoadKitError::io(path, e))
}

pub fn rename_file(old_path: impl AsRef<Path>, new_path: impl AsRef<Path>) -> Result<()> {
    let old_path = old_path.as_ref();
    fs::rename(old_path, new_path.as_ref()).map_err(|e| LoadKitError::io(old_path, e))
}

pub fn delete_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::remove_file(path).map_err(|e| LoadKitError::io(path, e))
}
