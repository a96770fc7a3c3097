//! Scoped read-modify-write of keyed JSON documents.
//!
//! All aggregation artifacts go through [`JsonDocument`]: acquire the document
//! (creating it if absent), mutate it in memory, then persist it by writing a
//! temporary file next to the target and renaming it over the target. A
//! document that exists but does not parse is never replaced.

use crate::error::{ProcessingError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub struct JsonDocument<T> {
    path: PathBuf,
    value: T,
    original: Option<Vec<u8>>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Open the document at `path`, or start from `init()` if it does not exist.
    pub fn acquire(path: &Path, init: impl FnOnce() -> T) -> Result<Self> {
        match read_document(path)? {
            Some((value, bytes)) => Ok(Self {
                path: path.to_path_buf(),
                value,
                original: Some(bytes),
            }),
            None => Ok(Self {
                path: path.to_path_buf(),
                value: init(),
                original: None,
            }),
        }
    }

    pub fn exists_on_disk(&self) -> bool {
        self.original.is_some()
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Write the document back. Skipped when the content is unchanged.
    /// Returns true if the file was written.
    pub fn persist(self) -> Result<bool> {
        let bytes = to_bytes(&self.value)?;
        if self.original.as_deref() == Some(bytes.as_slice()) {
            debug!(path = %self.path.display(), "document unchanged");
            return Ok(false);
        }
        write_bytes_atomic(&self.path, &bytes)?;
        Ok(true)
    }
}

/// Create the document with `init()` if and only if it does not exist.
/// Returns true if it was created.
pub fn ensure_document<T>(path: &Path, init: impl FnOnce() -> T) -> Result<bool>
where
    T: Serialize + DeserializeOwned,
{
    if path.is_file() {
        return Ok(false);
    }
    write_atomic(path, &init())?;
    Ok(true)
}

/// Acquire, mutate and persist in one scope.
pub fn update_document<T, R>(
    path: &Path,
    init: impl FnOnce() -> T,
    mutate: impl FnOnce(&mut T) -> R,
) -> Result<R>
where
    T: Serialize + DeserializeOwned,
{
    let mut document = JsonDocument::acquire(path, init)?;
    let result = mutate(document.value_mut());
    document.persist()?;
    Ok(result)
}

/// Replace the document wholesale. An existing file must still parse as `T`.
pub fn replace_document<T>(path: &Path, value: &T) -> Result<bool>
where
    T: Serialize + DeserializeOwned,
{
    let original = read_document::<T>(path)?.map(|(_, bytes)| bytes);
    let bytes = to_bytes(value)?;
    if original.as_deref() == Some(bytes.as_slice()) {
        return Ok(false);
    }
    write_bytes_atomic(path, &bytes)?;
    Ok(true)
}

fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = to_bytes(value)?;
    write_bytes_atomic(path, &bytes)
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<(T, Vec<u8>)>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let value = serde_json::from_slice(&bytes).map_err(|source| ProcessingError::CorruptArtifact {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some((value, bytes)))
}

fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        writer.write_all(bytes)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| ProcessingError::Io(e.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "document written");
    Ok(())
}
